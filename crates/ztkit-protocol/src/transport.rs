//! Report-level transport.
//!
//! The kit exchanges fixed-size reports with the host. Host-to-device
//! reports carry a report-id tag byte followed by up to
//! [`REPORT_PAYLOAD_SIZE`] payload bytes, right-padded with
//! [`REPORT_PAD`]:
//!
//! ```text
//! +------+---------------------+------------------+
//! | 0x00 | payload[0..n]       | 0x04 ... (pad)   |
//! +------+---------------------+------------------+
//! ```
//!
//! Device-to-host reports are delivered as opaque byte buffers; the frame
//! layer is responsible for discarding padding and noise around frames.

use std::time::Duration;

use crate::constants::{REPORT_ID, REPORT_PAD, REPORT_PAYLOAD_SIZE, REPORT_SIZE};
use crate::error::{KitError, KitResult};

/// A device that exchanges fixed-size reports with the host.
///
/// Implemented by the hardware-backed HID device and by the in-process
/// simulator; everything above this trait is device-agnostic.
pub trait ReportDevice {
    /// Prepare the device for use.
    fn open(&mut self) -> KitResult<()>;

    /// Deliver one complete report to the device.
    fn write_report(&mut self, report: &[u8]) -> KitResult<()>;

    /// Read the next available report.
    ///
    /// Returns an empty buffer when nothing arrived within `timeout`.
    fn read_report(&mut self, timeout: Duration) -> KitResult<Vec<u8>>;
}

/// Report chunking layer over a [`ReportDevice`].
///
/// Fragments arbitrary byte sequences into successive reports of exactly
/// [`REPORT_SIZE`] bytes and surfaces empty reads as timeouts. No report
/// is ever partially delivered.
#[derive(Debug)]
pub struct ReportTransport<D> {
    device: D,
}

impl<D: ReportDevice> ReportTransport<D> {
    /// Create a transport owning the given device.
    pub fn new(device: D) -> Self {
        ReportTransport { device }
    }

    /// Open the underlying device.
    pub fn open(&mut self) -> KitResult<()> {
        self.device.open()
    }

    /// Write an arbitrary number of bytes as a series of fixed-size reports.
    pub fn write(&mut self, data: &[u8]) -> KitResult<()> {
        for chunk in data.chunks(REPORT_PAYLOAD_SIZE) {
            let mut report = Vec::with_capacity(REPORT_SIZE);
            report.push(REPORT_ID);
            report.extend_from_slice(chunk);
            report.resize(REPORT_SIZE, REPORT_PAD);
            self.device.write_report(&report)?;
        }
        Ok(())
    }

    /// Read the next report's bytes.
    ///
    /// An empty read from the device means nothing arrived within the
    /// timeout and is surfaced as [`KitError::Timeout`].
    pub fn read(&mut self, timeout: Duration) -> KitResult<Vec<u8>> {
        let report = self.device.read_report(timeout)?;
        if report.is_empty() {
            return Err(KitError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        Ok(report)
    }

    /// Access the underlying device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutably access the underlying device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}
