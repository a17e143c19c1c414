use crate::codec::FrameKind;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The first four buffered bytes match neither frame header.
    #[error("unrecognized frame header: {0:02x?}")]
    UnrecognizedHeader([u8; 4]),

    /// Header and length were fine but the footer bytes do not match.
    #[error("footer mismatch on {kind:?} frame: {found:02x?}")]
    FooterMismatch { kind: FrameKind, found: [u8; 4] },

    /// The body exceeds what the 16-bit length field can describe.
    #[error("frame body too large ({size} bytes, max {max})")]
    BodyTooLarge { size: usize, max: usize },

    /// An I/O error occurred while writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a complete frame could be written.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
