use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Header length in bytes.
pub const HEADER_LEN: usize = 4;
/// Length-field width in bytes (little-endian u16).
pub const LENGTH_LEN: usize = 2;
/// Footer length in bytes.
pub const FOOTER_LEN: usize = 4;
/// Smallest decodable frame: header + length + empty body + footer.
pub const MIN_FRAME_LEN: usize = HEADER_LEN + LENGTH_LEN + FOOTER_LEN;

/// Header bytes of a command/reply frame.
pub const COMMAND_HEADER: [u8; 4] = [0xFD, 0xFC, 0xFB, 0xFA];
/// Footer bytes of a command/reply frame.
pub const COMMAND_FOOTER: [u8; 4] = [0x04, 0x03, 0x02, 0x01];
/// Header bytes of a report frame.
pub const REPORT_HEADER: [u8; 4] = [0xF4, 0xF3, 0xF2, 0xF1];
/// Footer bytes of a report frame.
pub const REPORT_FOOTER: [u8; 4] = [0xF8, 0xF7, 0xF6, 0xF5];

/// The two frame classes on the wire, selected by header/footer constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Commands sent to the device and their acknowledgements.
    Command,
    /// Unsolicited detection reports emitted by the device.
    Report,
}

impl FrameKind {
    /// The fixed header bytes for this frame kind.
    pub const fn header(self) -> [u8; 4] {
        match self {
            FrameKind::Command => COMMAND_HEADER,
            FrameKind::Report => REPORT_HEADER,
        }
    }

    /// The fixed footer bytes for this frame kind.
    pub const fn footer(self) -> [u8; 4] {
        match self {
            FrameKind::Command => COMMAND_FOOTER,
            FrameKind::Report => REPORT_FOOTER,
        }
    }

    /// Classify a 4-byte header, if it matches either kind.
    pub fn from_header(header: &[u8]) -> Option<Self> {
        if header == COMMAND_HEADER {
            Some(FrameKind::Command)
        } else if header == REPORT_HEADER {
            Some(FrameKind::Report)
        } else {
            None
        }
    }
}

/// A decoded frame: kind plus body bytes, envelope stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Which header/footer pair delimited this frame.
    pub kind: FrameKind,
    /// The frame body (length-field bytes of payload).
    pub body: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(kind: FrameKind, body: impl Into<Bytes>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }

    /// The total wire size of this frame (envelope + body).
    pub fn wire_size(&self) -> usize {
        MIN_FRAME_LEN + self.body.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────────┬─────────────┬────────────────┬─────────────┐
/// │ Header (4B) │ Length      │ Body           │ Footer (4B) │
/// │ per kind    │ (2B LE)     │ (Length bytes) │ per kind    │
/// └─────────────┴─────────────┴────────────────┴─────────────┘
/// ```
///
/// The length field is always recomputed from the actual body.
pub fn encode_frame(kind: FrameKind, body: &[u8], dst: &mut BytesMut) -> Result<()> {
    if body.len() > u16::MAX as usize {
        return Err(FrameError::BodyTooLarge {
            size: body.len(),
            max: u16::MAX as usize,
        });
    }
    dst.reserve(MIN_FRAME_LEN + body.len());
    dst.put_slice(&kind.header());
    dst.put_u16_le(body.len() as u16);
    dst.put_slice(body);
    dst.put_slice(&kind.footer());
    Ok(())
}

/// Try to decode one frame from the start of `src` without consuming it.
///
/// Returns `Ok(None)` when `src` does not yet hold a complete frame; the
/// length field is never trusted beyond what is actually buffered. On
/// success, returns the frame and the number of bytes it occupied.
pub fn decode_frame(src: &[u8]) -> Result<Option<(Frame, usize)>> {
    if src.len() < HEADER_LEN {
        return Ok(None);
    }

    let mut header = [0u8; 4];
    header.copy_from_slice(&src[..HEADER_LEN]);
    let kind =
        FrameKind::from_header(&header).ok_or(FrameError::UnrecognizedHeader(header))?;

    if src.len() < HEADER_LEN + LENGTH_LEN {
        return Ok(None);
    }

    let body_len = u16::from_le_bytes([src[HEADER_LEN], src[HEADER_LEN + 1]]) as usize;
    let total = MIN_FRAME_LEN + body_len;
    if src.len() < total {
        return Ok(None);
    }

    let body_start = HEADER_LEN + LENGTH_LEN;
    let mut footer = [0u8; 4];
    footer.copy_from_slice(&src[body_start + body_len..total]);
    if footer != kind.footer() {
        return Err(FrameError::FooterMismatch { kind, found: footer });
    }

    let body = Bytes::copy_from_slice(&src[body_start..body_start + body_len]);
    Ok(Some((Frame { kind, body }, total)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        encode_frame(FrameKind::Command, b"\xFE\x00", &mut buf).unwrap();

        let (frame, consumed) = decode_frame(&buf).unwrap().unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(frame.kind, FrameKind::Command);
        assert_eq!(frame.body.as_ref(), b"\xFE\x00");
    }

    #[test]
    fn known_command_frame_bytes() {
        // Two-byte body FE 00 inside a command-class envelope.
        let wire = [
            0xFD, 0xFC, 0xFB, 0xFA, 0x02, 0x00, 0xFE, 0x00, 0x04, 0x03, 0x02, 0x01,
        ];
        let (frame, consumed) = decode_frame(&wire).unwrap().unwrap();
        assert_eq!(consumed, 12);
        assert_eq!(frame.kind, FrameKind::Command);
        assert_eq!(frame.body.as_ref(), &[0xFE, 0x00]);

        let mut reencoded = BytesMut::new();
        encode_frame(frame.kind, &frame.body, &mut reencoded).unwrap();
        assert_eq!(reencoded.as_ref(), &wire);
    }

    #[test]
    fn report_frame_roundtrip() {
        let mut buf = BytesMut::new();
        encode_frame(FrameKind::Report, b"\x02\xAA\x00\x55\x00", &mut buf).unwrap();
        assert_eq!(&buf[..4], &REPORT_HEADER);
        assert_eq!(&buf[buf.len() - 4..], &REPORT_FOOTER);

        let (frame, _) = decode_frame(&buf).unwrap().unwrap();
        assert_eq!(frame.kind, FrameKind::Report);
        assert_eq!(frame.body.len(), 5);
    }

    #[test]
    fn empty_body_is_minimum_frame() {
        let mut buf = BytesMut::new();
        encode_frame(FrameKind::Command, b"", &mut buf).unwrap();
        assert_eq!(buf.len(), MIN_FRAME_LEN);

        let (frame, consumed) = decode_frame(&buf).unwrap().unwrap();
        assert_eq!(consumed, MIN_FRAME_LEN);
        assert!(frame.body.is_empty());
    }

    #[test]
    fn length_field_recomputed_on_encode() {
        let body = vec![0xAB; 300];
        let mut buf = BytesMut::new();
        encode_frame(FrameKind::Command, &body, &mut buf).unwrap();
        assert_eq!(u16::from_le_bytes([buf[4], buf[5]]), 300);
    }

    #[test]
    fn incomplete_header_needs_more() {
        assert!(decode_frame(&[0xFD, 0xFC]).unwrap().is_none());
    }

    #[test]
    fn incomplete_body_needs_more() {
        let mut buf = BytesMut::new();
        encode_frame(FrameKind::Command, b"abcdef", &mut buf).unwrap();
        assert!(decode_frame(&buf[..buf.len() - 1]).unwrap().is_none());
    }

    #[test]
    fn truncated_exactly_at_footer_needs_more() {
        let mut buf = BytesMut::new();
        encode_frame(FrameKind::Report, b"xy", &mut buf).unwrap();
        // Header + length + body present, footer missing entirely.
        assert!(decode_frame(&buf[..HEADER_LEN + LENGTH_LEN + 2]).unwrap().is_none());
    }

    #[test]
    fn unrecognized_header_rejected() {
        let err = decode_frame(&[0x00, 0x01, 0x02, 0x03, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, FrameError::UnrecognizedHeader(_)));
    }

    #[test]
    fn footer_mismatch_rejected() {
        let mut buf = BytesMut::new();
        encode_frame(FrameKind::Command, b"zz", &mut buf).unwrap();
        let last = buf.len() - 1;
        buf[last] ^= 0xFF;
        let err = decode_frame(&buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::FooterMismatch {
                kind: FrameKind::Command,
                ..
            }
        ));
    }

    #[test]
    fn mixed_kind_footer_rejected() {
        // Command header with a report footer must not decode.
        let mut wire = Vec::new();
        wire.extend_from_slice(&COMMAND_HEADER);
        wire.extend_from_slice(&[0x00, 0x00]);
        wire.extend_from_slice(&REPORT_FOOTER);
        let err = decode_frame(&wire).unwrap_err();
        assert!(matches!(err, FrameError::FooterMismatch { .. }));
    }

    #[test]
    fn oversized_body_rejected_on_encode() {
        let body = vec![0u8; u16::MAX as usize + 1];
        let mut buf = BytesMut::new();
        let err = encode_frame(FrameKind::Command, &body, &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::BodyTooLarge { .. }));
    }
}
