//! Kit frame encoding/decoding.
//!
//! Commands and replies travel as newline-terminated printable ASCII
//! frames on top of the report transport:
//!
//! - **Commands** (host → board): `target(hexdata)\n`, e.g.
//!   `board:app(7b2e2e2e7d)\n`
//! - **Replies** (board → host): `SS(hexdata)\n` where `SS` is a
//!   two-digit hex status byte, e.g. `00(7b2e2e2e7d)\n`
//!
//! Payload bytes are never embedded raw, only hex-encoded, so a frame is
//! delimited solely by its trailing newline.

use bytes::BytesMut;

use crate::error::{KitError, KitResult};

/// Encode a command frame for the given target.
///
/// The result is written to the transport as one logical write, which
/// the transport chunks into reports.
pub fn encode_frame(target: &str, payload: &[u8]) -> Vec<u8> {
    format!("{}({})\n", target, hex::encode(payload)).into_bytes()
}

/// Accumulates report bytes until a complete frame is available.
///
/// Leading non-printable bytes (transport noise or padding left over
/// from a previous frame) are discarded until the first printable
/// character of a frame is seen.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buffer: BytesMut,
}

impl FrameBuffer {
    /// Create an empty frame buffer.
    pub fn new() -> Self {
        FrameBuffer {
            buffer: BytesMut::new(),
        }
    }

    /// Add received report bytes to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        let mut data = data;
        if self.buffer.is_empty() {
            // Disregard noise ahead of the frame's first printable byte.
            while let Some(&byte) = data.first() {
                if byte > 0x20 {
                    break;
                }
                data = &data[1..];
            }
        }
        self.buffer.extend_from_slice(data);
    }

    /// Take the completed frame text if a newline has been buffered.
    ///
    /// The returned text runs through the newline inclusive; anything
    /// buffered after it (report padding) is dropped so the next frame
    /// starts clean.
    pub fn take_frame(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let text = String::from_utf8_lossy(&self.buffer[..=pos]).into_owned();
        self.buffer.clear();
        Some(text)
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

/// A parsed kit reply frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitReply {
    /// Status byte; zero means success.
    pub status: u8,
    /// Hex-encoded payload text between the parentheses.
    pub data: String,
}

impl KitReply {
    /// Parse a reply frame against the grammar `SS(hexdata)`.
    ///
    /// The status token must be exactly two hex digits and the payload
    /// must use the hex alphabet; trailing bytes after the closing
    /// parenthesis (the newline) are ignored.
    pub fn parse(text: &str) -> KitResult<KitReply> {
        let malformed = || KitError::Parse(text.to_string());

        let open = text.find('(').ok_or_else(malformed)?;
        let status_text = &text[..open];
        if status_text.len() != 2 || !status_text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        let status = u8::from_str_radix(status_text, 16).map_err(|_| malformed())?;

        let rest = &text[open + 1..];
        let close = rest.find(')').ok_or_else(malformed)?;
        let data = &rest[..close];
        if !data.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }

        Ok(KitReply {
            status,
            data: data.to_string(),
        })
    }

    /// Decode the hex payload into raw bytes.
    pub fn payload(&self) -> KitResult<Vec<u8>> {
        Ok(hex::decode(&self.data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame_format() {
        let frame = encode_frame("board:app", &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(frame, b"board:app(deadbeef)\n");
    }

    #[test]
    fn test_encode_frame_empty_payload() {
        let frame = encode_frame("board:app", &[]);
        assert_eq!(frame, b"board:app()\n");
    }

    #[test]
    fn test_reply_round_trip() {
        let payload = b"arbitrary \x00 bytes \xff here";
        let text = format!("00({})\n", hex::encode(payload));

        let reply = KitReply::parse(&text).expect("should parse");
        assert_eq!(reply.status, 0);
        assert_eq!(reply.payload().expect("valid hex"), payload);
    }

    #[test]
    fn test_parse_nonzero_status() {
        let reply = KitReply::parse("c0()\n").expect("should parse");
        assert_eq!(reply.status, 0xC0);
        assert!(reply.data.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_status_token() {
        assert!(KitReply::parse("0(ab)\n").is_err());
        assert!(KitReply::parse("000(ab)\n").is_err());
        assert!(KitReply::parse("zz(ab)\n").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_parens() {
        assert!(KitReply::parse("00\n").is_err());
        assert!(KitReply::parse("00(abcd\n").is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex_payload() {
        assert!(KitReply::parse("00(xyz)\n").is_err());
    }

    #[test]
    fn test_frame_buffer_strips_leading_noise() {
        let mut buf = FrameBuffer::new();
        buf.push(b"\x00\x00\x0400(abcd)\n");

        let text = buf.take_frame().expect("complete frame");
        assert_eq!(text, "00(abcd)\n");
    }

    #[test]
    fn test_frame_buffer_noise_only_chunk_keeps_waiting() {
        let mut buf = FrameBuffer::new();
        buf.push(&[0x00, 0x04, 0x04]);
        assert_eq!(buf.buffered_len(), 0);

        buf.push(b"00(ab)\n");
        assert_eq!(buf.take_frame().expect("complete frame"), "00(ab)\n");
    }

    #[test]
    fn test_frame_buffer_accumulates_across_pushes() {
        let mut buf = FrameBuffer::new();
        buf.push(b"00(ab");
        assert!(buf.take_frame().is_none());

        buf.push(b"cd)\n");
        assert_eq!(buf.take_frame().expect("complete frame"), "00(abcd)\n");
    }

    #[test]
    fn test_frame_buffer_drops_bytes_after_newline() {
        let mut buf = FrameBuffer::new();
        buf.push(b"00(ab)\n\x04\x04\x04");

        assert_eq!(buf.take_frame().expect("complete frame"), "00(ab)\n");
        assert_eq!(buf.buffered_len(), 0);
    }

    #[test]
    fn test_frame_buffer_keeps_interior_noise() {
        // Only noise ahead of the first printable byte is stripped;
        // padding mid-frame would corrupt the hex payload and must
        // surface as a parse failure rather than vanish silently.
        let mut buf = FrameBuffer::new();
        buf.push(b"00(ab");
        buf.push(b"\x04cd)\n");

        let text = buf.take_frame().expect("complete frame");
        assert!(KitReply::parse(&text).is_err());
    }
}
