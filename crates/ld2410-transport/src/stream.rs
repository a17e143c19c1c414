use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;

/// A connected sensor stream — implements Read + Write.
///
/// This is the fundamental I/O type returned by transport operations.
/// The serial variant wraps a platform serial port; the Unix-stream
/// variant lets tests and emulators stand in for a device over a socket
/// pair.
pub struct SensorStream {
    inner: SensorStreamInner,
}

enum SensorStreamInner {
    Serial(Box<dyn serialport::SerialPort>),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for SensorStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            SensorStreamInner::Serial(port) => port.read(buf),
            #[cfg(unix)]
            SensorStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for SensorStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            SensorStreamInner::Serial(port) => port.write(buf),
            #[cfg(unix)]
            SensorStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            SensorStreamInner::Serial(port) => port.flush(),
            #[cfg(unix)]
            SensorStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl SensorStream {
    pub(crate) fn from_serial(port: Box<dyn serialport::SerialPort>) -> Self {
        Self {
            inner: SensorStreamInner::Serial(port),
        }
    }

    /// Wrap a Unix stream (tests and device emulators).
    #[cfg(unix)]
    pub fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: SensorStreamInner::Unix(stream),
        }
    }

    /// Set the read timeout on the underlying stream.
    ///
    /// Reads that hit the timeout fail with `TimedOut`/`WouldBlock`; the
    /// background reader treats those as "no data yet", so a finite
    /// timeout is what lets it poll its shutdown flag.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            // The serial layer has a single timeout covering reads.
            SensorStreamInner::Serial(port) => {
                port.set_timeout(timeout.unwrap_or(Duration::ZERO))?;
                Ok(())
            }
            #[cfg(unix)]
            SensorStreamInner::Unix(stream) => {
                stream.set_read_timeout(timeout)?;
                Ok(())
            }
        }
    }

    /// Try to clone this stream (creates a second handle to the device).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            SensorStreamInner::Serial(port) => Ok(Self::from_serial(port.try_clone()?)),
            #[cfg(unix)]
            SensorStreamInner::Unix(stream) => Ok(Self::from_unix(stream.try_clone()?)),
        }
    }
}

impl std::fmt::Debug for SensorStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.inner {
            SensorStreamInner::Serial(_) => "serial",
            #[cfg(unix)]
            SensorStreamInner::Unix(_) => "unix",
        };
        f.debug_struct("SensorStream").field("type", &kind).finish()
    }
}
