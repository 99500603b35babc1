//! Kit protocol constants
//!
//! These constants define the report geometry, frame targets, status
//! bytes, and application error codes shared between the host-side
//! channel and any device implementation.

// ============================================================================
// Device Identification
// ============================================================================

/// USB vendor id of the Zero Touch kit board.
pub const DEVICE_HID_VID: u16 = 0x04d8;
/// USB product id of the Zero Touch kit board.
pub const DEVICE_HID_PID: u16 = 0x0f32;

/// Kit firmware version the host protocol targets.
pub const KIT_VERSION: &str = "2.0.0";

// ============================================================================
// Report Geometry
// ============================================================================

/// Total size of one report on the wire.
pub const REPORT_SIZE: usize = 64;
/// Report-id tag prepended to every host-to-device report.
pub const REPORT_ID: u8 = 0x00;
/// Filler byte padding short host-to-device reports out to [`REPORT_SIZE`].
pub const REPORT_PAD: u8 = 0x04;
/// Payload capacity of one host-to-device report.
pub const REPORT_PAYLOAD_SIZE: usize = REPORT_SIZE - 1;

// ============================================================================
// Frame Targets and Status Bytes
// ============================================================================

/// Frame target addressing the board application.
pub const APP_TARGET: &str = "board:app";

/// Reply status byte for success.
pub const STATUS_OK: u8 = 0x00;
/// Reply status byte for a command target the board does not handle.
pub const STATUS_UNKNOWN_TARGET: u8 = 0xC0;

// ============================================================================
// Application Error Codes
// ============================================================================

/// Command parameters were missing or of the wrong shape.
pub const ERR_CODE_INVALID_PARAMS: u32 = 1;
/// Command method name is not recognized by the board.
pub const ERR_CODE_UNKNOWN_METHOD: u32 = 2;
/// `init` requested a protocol version the board does not support.
pub const ERR_CODE_BAD_VERSION: u32 = 256;

// ============================================================================
// Defaults
// ============================================================================

/// Default per-report read timeout in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5_000;
