use std::time::Duration;

use ld2410_protocol::{CommandCode, ReplyStatus};

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] ld2410_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] ld2410_frame::FrameError),

    /// A reply payload did not match the opcode's expected layout.
    #[error("protocol error: {0}")]
    Protocol(#[from] ld2410_protocol::ProtocolError),

    /// A request was attempted with no live connection.
    #[error("not connected to the device")]
    NotConnected,

    /// `connect` was called on a client that is already connected.
    #[error("already connected to the device")]
    AlreadyConnected,

    /// The connection dropped while an operation was in flight.
    #[error("device disconnected")]
    Disconnected,

    /// No matching reply arrived within the configured deadline.
    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    /// A configuration-gated command was issued without a usable session.
    #[error("command requires a configuration session ({0})")]
    WrongContext(&'static str),

    /// A caller-supplied argument is outside the device's accepted range.
    #[error("bad parameter: {0}")]
    BadParameter(String),

    /// The device acknowledged the command with a failure status.
    #[error("command {code} failed with status {status}")]
    CommandFailed {
        code: CommandCode,
        status: ReplyStatus,
    },

    /// The module is restarting.
    ///
    /// Not an ordinary failure: raised by
    /// [`ConfigSession::restart_module`](crate::ConfigSession::restart_module)
    /// when asked to close the surrounding session, and propagated out of
    /// [`Ld2410::configure`](crate::Ld2410::configure) after the
    /// abbreviated session teardown.
    #[error("module restarted")]
    ModuleRestarted,
}

pub type Result<T> = std::result::Result<T, ClientError>;
