/// Errors raised while interpreting payload bytes against a known layout.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The payload ended before the layout was satisfied.
    #[error("truncated payload: need {need} bytes, got {got}")]
    Truncated { need: usize, got: usize },

    /// A fixed marker byte did not hold its expected value.
    #[error("bad {field} marker: expected {expected:#04x}, found {found:#04x}")]
    BadMarker {
        field: &'static str,
        expected: u8,
        found: u8,
    },

    /// The opcode byte does not name any known command.
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),

    /// A field carried a value outside its enumerated range.
    #[error("unknown {field} value {value}")]
    UnknownValue { field: &'static str, value: u32 },

    /// Trailing bytes remained after the layout was fully read.
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
