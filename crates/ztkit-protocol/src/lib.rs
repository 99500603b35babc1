//! Zero Touch Kit protocol
//!
//! This crate implements the host side of the kit protocol spoken by the
//! Zero Touch secure element board. The board exchanges fixed-size reports
//! with the host; on top of those reports rides a newline-terminated ASCII
//! framing, and on top of the framing a JSON command/response contract.
//!
//! # Protocol Overview
//!
//! The protocol is layered, leaf first:
//!
//! - **Reports**: fixed 64-byte buffers, the atomic unit exchanged with the
//!   device (see [`ReportDevice`] and [`ReportTransport`]).
//! - **Frames**: printable ASCII lines of the form `target(hexdata)\n` for
//!   commands and `SS(hexdata)\n` for replies, where `SS` is a two-digit
//!   hex status byte.
//! - **Application commands**: JSON bodies `{"method", "params", "id"}`
//!   correlated to JSON responses by id (see [`KitChannel`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use ztkit_protocol::{KitChannel, KIT_VERSION};
//!
//! let mut kit = KitChannel::new(device);
//! kit.open()?;
//! let info = kit.init(KIT_VERSION)?;
//! println!("serial: {}", info.device_sn);
//! ```

mod channel;
mod constants;
mod error;
mod frame;
mod transport;
mod types;

pub use channel::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use transport::*;
pub use types::*;
