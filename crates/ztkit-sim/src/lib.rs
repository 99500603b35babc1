//! Simulated Zero Touch Kit device
//!
//! This crate provides a software stand-in for the Zero Touch kit board.
//! It implements the device side of the kit protocol behind the same
//! [`ReportDevice`](ztkit_protocol::ReportDevice) trait the hardware
//! uses, so a [`KitChannel`](ztkit_protocol::KitChannel) cannot tell the
//! difference at the protocol level.
//!
//! The simulator keeps its provisioning state in a JSON file and its
//! device key in a seed file next to it; both survive across runs, so a
//! reconstructed simulator behaves like a board that was power-cycled.
//!
//! # Example
//!
//! ```rust,ignore
//! use ztkit_protocol::{KitChannel, KIT_VERSION};
//! use ztkit_sim::SimKitDevice;
//!
//! let device = SimKitDevice::new(state_dir)?;
//! let mut kit = KitChannel::new(device);
//! kit.open()?;
//! let info = kit.init(KIT_VERSION)?;
//! ```

mod csr;
mod device;
mod error;
mod state;

pub use csr::*;
pub use device::*;
pub use error::*;
pub use state::*;
