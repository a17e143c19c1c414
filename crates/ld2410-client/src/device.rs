use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use ld2410_frame::FrameKind;
use ld2410_protocol::{encode_command, Command, CommandCode, Reply, ReplyData, Report};
use tracing::warn;

use crate::conn::Connection;
use crate::error::{ClientError, Result};
use crate::slot::ReplyEvent;

/// Configuration for an [`Ld2410`] client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Serial baud rate. The factory default is 256000.
    pub baud_rate: u32,
    /// How long to wait for a command reply; `None` waits indefinitely.
    pub command_timeout: Option<Duration>,
    /// Read timeout applied to the transport. Must be finite: the
    /// background reader polls its stop flag between timed-out reads.
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            baud_rate: ld2410_transport::DEFAULT_BAUD_RATE,
            command_timeout: Some(Duration::from_secs(2)),
            read_timeout: ld2410_transport::DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Client for one LD2410 presence-radar module.
///
/// A background thread pumps frames off the serial link for the lifetime
/// of a connection: replies feed the single pending-request waiter,
/// detection reports feed the latest-report channel. Commands are
/// strictly one at a time; a second concurrent request waits for the
/// first full round trip.
///
/// Configuration commands are only reachable through
/// [`configure`](Ld2410::configure), which runs the device's
/// enter/exit configuration-mode protocol around a closure.
pub struct Ld2410 {
    device: Option<PathBuf>,
    config: ClientConfig,
    conn: Mutex<Option<Arc<Connection>>>,
    request_gate: Mutex<()>,
    pub(crate) session_gate: Mutex<()>,
    pub(crate) session_active: AtomicBool,
    pub(crate) session_restarted: AtomicBool,
}

impl Ld2410 {
    /// Open the serial device and connect with default configuration.
    pub fn open(device: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(device, ClientConfig::default())
    }

    /// Open the serial device and connect with explicit configuration.
    pub fn open_with_config(device: impl AsRef<Path>, config: ClientConfig) -> Result<Self> {
        let client = Self {
            device: Some(device.as_ref().to_path_buf()),
            config,
            conn: Mutex::new(None),
            request_gate: Mutex::new(()),
            session_gate: Mutex::new(()),
            session_active: AtomicBool::new(false),
            session_restarted: AtomicBool::new(false),
        };
        client.connect()?;
        Ok(client)
    }

    /// Build a connected client over arbitrary transport halves.
    ///
    /// Used by tests and device emulators. The read half must have a
    /// finite read timeout, or teardown will block on the reader thread.
    /// A client built this way cannot [`connect`](Ld2410::connect) again
    /// after [`close`](Ld2410::close).
    pub fn from_parts(
        reader: Box<dyn Read + Send>,
        writer: Box<dyn Write + Send>,
        config: ClientConfig,
    ) -> Result<Self> {
        let conn = Connection::spawn(reader, writer)
            .map_err(ld2410_transport::TransportError::from)?;
        Ok(Self {
            device: None,
            config,
            conn: Mutex::new(Some(conn)),
            request_gate: Mutex::new(()),
            session_gate: Mutex::new(()),
            session_active: AtomicBool::new(false),
            session_restarted: AtomicBool::new(false),
        })
    }

    /// (Re)connect to the configured serial device.
    ///
    /// Fails with [`ClientError::AlreadyConnected`] when a live
    /// connection exists, and with [`ClientError::NotConnected`] on
    /// clients built from raw transport halves.
    pub fn connect(&self) -> Result<()> {
        let mut slot = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(conn) = slot.as_ref() {
            if conn.is_connected() {
                return Err(ClientError::AlreadyConnected);
            }
            // A dead handle from a previous connection: tear it down first.
            conn.shutdown();
            *slot = None;
        }

        let device = self.device.as_ref().ok_or(ClientError::NotConnected)?;
        let mut stream = ld2410_transport::open(device, self.config.baud_rate)?;
        stream
            .set_read_timeout(Some(self.config.read_timeout))
            .map_err(ClientError::Transport)?;
        let reader = stream.try_clone().map_err(ClientError::Transport)?;
        let conn = Connection::spawn(Box::new(reader), Box::new(stream))
            .map_err(ld2410_transport::TransportError::from)?;
        *slot = Some(conn);
        Ok(())
    }

    /// Tear the connection down and join the background reader.
    ///
    /// Any in-flight request resolves with a disconnection error first.
    pub fn close(&self) {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(conn) = conn {
            conn.shutdown();
        }
    }

    /// Whether a live connection to the device exists.
    pub fn connected(&self) -> bool {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|conn| conn.is_connected())
    }

    /// Whether a usable configuration session is currently entered.
    ///
    /// False once the device restarted inside the session, even though
    /// the session scope has not unwound yet.
    pub fn configuring(&self) -> bool {
        self.session_active.load(Ordering::SeqCst)
            && !self.session_restarted.load(Ordering::SeqCst)
    }

    fn live(&self) -> Result<Arc<Connection>> {
        let slot = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(conn) if conn.is_connected() => Ok(Arc::clone(conn)),
            _ => Err(ClientError::NotConnected),
        }
    }

    /// Send a raw command and return the success-reply payload.
    ///
    /// The generic request primitive: body layout and reply payload are
    /// the caller's business. Most callers want the typed operations on
    /// [`ConfigSession`](crate::ConfigSession) instead.
    pub fn request(&self, code: CommandCode, args: &[u8]) -> Result<Bytes> {
        Ok(self.request_raw(code, args)?.data)
    }

    /// Send a typed command and decode its reply payload.
    pub(crate) fn command<C: Command>(&self, cmd: &C) -> Result<C::Reply> {
        let mut args = BytesMut::new();
        cmd.encode_args(&mut args);
        let reply = self.request_raw(C::CODE, &args)?;
        Ok(C::Reply::decode(&reply.data)?)
    }

    fn request_raw(&self, code: CommandCode, args: &[u8]) -> Result<Reply> {
        // One request in flight at a time, for the full round trip.
        let _gate = self
            .request_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let conn = self.live()?;

        let deadline = self.config.command_timeout.map(|t| Instant::now() + t);
        let mut body = BytesMut::new();
        encode_command(code, args, &mut body);
        {
            let mut writer = conn.writer.lock().unwrap_or_else(PoisonError::into_inner);
            writer.send(FrameKind::Command, &body)?;
        }

        loop {
            match conn.shared.replies.wait(deadline) {
                None => {
                    return Err(ClientError::Timeout(
                        self.config.command_timeout.unwrap_or_default(),
                    ));
                }
                Some(ReplyEvent::Disconnected) => return Err(ClientError::Disconnected),
                Some(ReplyEvent::Reply(reply)) => {
                    if reply.code != code {
                        // A stale reply from an earlier timed-out request.
                        warn!(got = %reply.code, want = %code, "discarding mismatched reply");
                        continue;
                    }
                    if !reply.is_success() {
                        return Err(ClientError::CommandFailed {
                            code,
                            status: reply.status,
                        });
                    }
                    return Ok(reply);
                }
            }
        }
    }

    /// The most recent detection report, if any arrived yet.
    ///
    /// Never blocks. The value can be stale after a long configuration
    /// session, since the device emits no reports in configuration mode.
    pub fn last_report(&self) -> Option<Report> {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|conn| conn.shared.reports.latest())
    }

    /// Wait for the next detection report.
    ///
    /// Every concurrent waiter wakes on the same report. Resolves with
    /// [`ClientError::Disconnected`] if the connection drops while
    /// waiting.
    pub fn next_report(&self) -> Result<Report> {
        let conn = self.live()?;
        conn.shared.reports.wait_next(None)
    }

    /// Like [`next_report`](Ld2410::next_report) but bounded.
    ///
    /// A timeout here is not a connectivity fault: the device suppresses
    /// reports while a configuration session is open.
    pub fn next_report_timeout(&self, timeout: Duration) -> Result<Report> {
        let conn = self.live()?;
        conn.shared.reports.wait_next(Some(timeout))
    }
}

impl Drop for Ld2410 {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Ld2410 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ld2410")
            .field("device", &self.device)
            .field("connected", &self.connected())
            .field("configuring", &self.configuring())
            .finish()
    }
}
