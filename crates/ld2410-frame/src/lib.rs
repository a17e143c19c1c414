//! Frame codec and byte-stream reassembly for the LD2410 serial protocol.
//!
//! The device speaks two frame classes over the same serial link, each
//! delimited by its own fixed header/footer pair with a little-endian
//! 16-bit length in between:
//!
//! - command/reply frames (`FD FC FB FA` ... `04 03 02 01`)
//! - detection report frames (`F4 F3 F2 F1` ... `F8 F7 F6 F5`)
//!
//! [`FrameStream`] turns an arbitrarily chunked, possibly corrupted byte
//! stream into whole [`Frame`]s, resynchronizing on header constants.
//! Frame bodies are opaque here; interpreting them is the protocol
//! crate's concern.

pub mod codec;
pub mod error;
pub mod stream;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, Frame, FrameKind, COMMAND_FOOTER, COMMAND_HEADER, FOOTER_LEN,
    HEADER_LEN, LENGTH_LEN, MIN_FRAME_LEN, REPORT_FOOTER, REPORT_HEADER,
};
pub use error::{FrameError, Result};
pub use stream::{FrameStream, Frames};
pub use writer::FrameWriter;
