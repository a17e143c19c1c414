//! Serial transport abstraction for the LD2410 client.
//!
//! Provides a unified stream type over the mechanisms a sensor can be
//! reached through:
//! - a real serial device (USB-UART adapter or on-board UART)
//! - a Unix stream, so tests can emulate the device over a socket pair
//!
//! This is the lowest layer of the workspace. Everything else builds on
//! the [`SensorStream`] type provided here.

pub mod error;
pub mod serial;
pub mod stream;

pub use error::{Result, TransportError};
pub use serial::{open, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
pub use stream::SensorStream;
