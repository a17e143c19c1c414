use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::error::{Result, TransportError};
use crate::stream::SensorStream;

/// Factory default baud rate of the LD2410 module.
pub const DEFAULT_BAUD_RATE: u32 = 256_000;

/// Read timeout applied to freshly opened ports.
///
/// Must be finite: the background reader relies on periodic read timeouts
/// to notice shutdown requests.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(200);

/// Open a serial device for talking to the sensor.
///
/// Applies 8-N-1 framing (the serialport defaults) at the given baud rate
/// and [`DEFAULT_READ_TIMEOUT`]; adjust afterwards with
/// [`SensorStream::set_read_timeout`] if needed.
pub fn open(path: impl AsRef<Path>, baud_rate: u32) -> Result<SensorStream> {
    let path = path.as_ref();
    let port = serialport::new(path.to_string_lossy(), baud_rate)
        .timeout(DEFAULT_READ_TIMEOUT)
        .open()
        .map_err(|source| TransportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    info!(?path, baud_rate, "opened serial device");
    Ok(SensorStream::from_serial(port))
}
