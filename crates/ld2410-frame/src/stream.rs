use bytes::BytesMut;
use tracing::warn;

use crate::codec::{decode_frame, Frame, FrameKind, HEADER_LEN, MIN_FRAME_LEN};
use crate::error::FrameError;

const INITIAL_BUFFER_CAPACITY: usize = 2 * 1024;

/// Reassembles frames from an arbitrarily chunked byte stream.
///
/// Bytes are appended with [`push`](FrameStream::push) as they arrive from
/// the transport; [`frames`](FrameStream::frames) drains every complete
/// frame currently buffered. Garbage between frames and corrupted frames
/// are skipped with resynchronization on the next header constant; a
/// trailing partial frame stays buffered until more data arrives.
#[derive(Debug, Default)]
pub struct FrameStream {
    buf: BytesMut,
    cursor: usize,
    skipped_bytes: u64,
    corrupted_frames: u64,
}

impl FrameStream {
    /// Create an empty reassembly buffer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            cursor: 0,
            skipped_bytes: 0,
            corrupted_frames: 0,
        }
    }

    /// Create a buffer seeded with `data`.
    pub fn with_data(data: &[u8]) -> Self {
        let mut stream = Self::new();
        stream.push(data);
        stream
    }

    /// Append bytes without disturbing the read cursor.
    ///
    /// Returns the number of bytes appended.
    pub fn push(&mut self, data: &[u8]) -> usize {
        self.buf.extend_from_slice(data);
        data.len()
    }

    /// Number of unconsumed bytes currently buffered.
    pub fn pending(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// Total garbage bytes skipped during resynchronization so far.
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped_bytes
    }

    /// Number of corrupted-but-recognizable frames skipped so far.
    pub fn corrupted_frames(&self) -> u64 {
        self.corrupted_frames
    }

    /// Iterate over the complete frames currently buffered.
    ///
    /// The iterator is lazy and finite: it ends when the remaining bytes
    /// cannot yet form a frame. A fresh call resumes from the current
    /// cursor, so interleaving `push` and `frames` is fine.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { stream: self }
    }

    fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let remaining = &self.buf[self.cursor..];
            match decode_frame(remaining) {
                Ok(Some((frame, consumed))) => {
                    self.cursor += consumed;
                    return Some(frame);
                }
                Ok(None) => {
                    // Not enough data for a complete frame; compact once
                    // everything buffered has been consumed.
                    if self.cursor == self.buf.len() {
                        self.buf.clear();
                        self.cursor = 0;
                    }
                    return None;
                }
                Err(FrameError::FooterMismatch { .. }) => {
                    // Header matched but the frame around it is corrupted.
                    // Skip the header to resynchronize on whatever follows.
                    warn!(
                        header = %hex_bytes(&remaining[..HEADER_LEN]),
                        "skipping corrupted frame header"
                    );
                    self.corrupted_frames += 1;
                    self.cursor += HEADER_LEN;
                }
                Err(_) => {
                    if remaining.len() < MIN_FRAME_LEN {
                        return None;
                    }
                    match find_header(remaining) {
                        Some(pos) if pos > 0 => {
                            warn!(
                                count = pos,
                                bytes = %hex_bytes(&remaining[..pos]),
                                "skipping garbage bytes"
                            );
                            self.skipped_bytes += pos as u64;
                            self.cursor += pos;
                        }
                        Some(_) => {
                            // Header at offset zero yet decode failed with an
                            // unrecognized-header error: cannot happen, but
                            // never spin on it.
                            self.cursor += HEADER_LEN;
                        }
                        None => {
                            // No header anywhere. This may still be the front
                            // of a split header, so retain everything.
                            return None;
                        }
                    }
                }
            }
        }
    }
}

/// Borrowing iterator over decoded frames. See [`FrameStream::frames`].
pub struct Frames<'a> {
    stream: &'a mut FrameStream,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.stream.next_frame()
    }
}

/// Find the earliest offset at which either kind's header constant begins.
fn find_header(data: &[u8]) -> Option<usize> {
    if data.len() < HEADER_LEN {
        return None;
    }
    (0..=data.len() - HEADER_LEN).find(|&i| FrameKind::from_header(&data[i..i + HEADER_LEN]).is_some())
}

fn hex_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, byte) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::encode_frame;

    fn command_frame(body: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(FrameKind::Command, body, &mut buf).unwrap();
        buf.to_vec()
    }

    fn report_frame(body: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(FrameKind::Report, body, &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn only_garbage_yields_nothing() {
        let mut stream = FrameStream::with_data(b"This is garbage data");
        assert_eq!(stream.frames().count(), 0);
        // Retained: a header could still start inside it once more arrives.
        assert_eq!(stream.pending(), 20);
    }

    #[test]
    fn garbage_then_frame() {
        let junk = b"This is junk data";
        let mut stream = FrameStream::with_data(junk);
        stream.push(&command_frame(b"STUFF"));

        let frames: Vec<_> = stream.frames().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body.as_ref(), b"STUFF");
        assert_eq!(stream.skipped_bytes(), junk.len() as u64);
    }

    #[test]
    fn full_then_partial_frame() {
        let frame = command_frame(b"STUFF");
        let mut stream = FrameStream::with_data(&frame);
        stream.push(&frame[..10]);
        assert_eq!(stream.frames().count(), 1);
        assert_eq!(stream.pending(), 10);
    }

    #[test]
    fn partial_then_complete_at_every_split_point() {
        let frame = command_frame(b"STUFF");
        for split in 1..frame.len() {
            let mut stream = FrameStream::new();
            stream.push(&frame[..split]);
            assert_eq!(stream.frames().count(), 0, "split at {split}");
            stream.push(&frame[split..]);
            let frames: Vec<_> = stream.frames().collect();
            assert_eq!(frames.len(), 1, "split at {split}");
            assert_eq!(frames[0].body.as_ref(), b"STUFF");
        }
    }

    #[test]
    fn corrupted_footer_then_valid_frame() {
        let frame = command_frame(b"STUFF");
        // First copy loses its last footer byte: recognizable header,
        // inconsistent remainder.
        let mut stream = FrameStream::with_data(&frame[..frame.len() - 1]);
        stream.push(&frame);

        let frames: Vec<_> = stream.frames().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body.as_ref(), b"STUFF");
        assert!(stream.corrupted_frames() >= 1);
    }

    #[test]
    fn chunking_independence() {
        let mut wire = Vec::new();
        wire.extend_from_slice(b"lead-in junk");
        wire.extend_from_slice(&command_frame(b"one"));
        wire.extend_from_slice(&report_frame(b"\x02\xAA"));
        wire.extend_from_slice(&command_frame(b""));
        wire.extend_from_slice(&command_frame(&[0u8; 40]));

        let mut all_at_once = FrameStream::with_data(&wire);
        let expected: Vec<_> = all_at_once.frames().collect();
        assert_eq!(expected.len(), 4);

        for chunk_size in [1, 2, 3, 7, 11] {
            let mut stream = FrameStream::new();
            let mut got = Vec::new();
            for chunk in wire.chunks(chunk_size) {
                stream.push(chunk);
                got.extend(stream.frames());
            }
            assert_eq!(got, expected, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn iteration_is_restartable() {
        let mut stream = FrameStream::new();
        stream.push(&command_frame(b"a"));
        assert_eq!(stream.frames().count(), 1);

        stream.push(&command_frame(b"b"));
        let frames: Vec<_> = stream.frames().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body.as_ref(), b"b");
    }

    #[test]
    fn buffer_compacts_when_drained() {
        let mut stream = FrameStream::new();
        stream.push(&command_frame(b"payload"));
        assert_eq!(stream.frames().count(), 1);
        assert_eq!(stream.pending(), 0);
        // Internal cursor reset: next push starts from a clean buffer.
        stream.push(&command_frame(b"next"));
        assert_eq!(stream.frames().count(), 1);
    }

    #[test]
    fn short_garbage_is_retained_without_scan() {
        // Fewer than MIN_FRAME_LEN bytes are never declared garbage.
        let mut stream = FrameStream::with_data(b"junk!");
        assert_eq!(stream.frames().count(), 0);
        assert_eq!(stream.skipped_bytes(), 0);
        assert_eq!(stream.pending(), 5);
    }

    #[test]
    fn split_header_across_pushes() {
        let frame = report_frame(b"\x02\xAA\x01");
        let mut stream = FrameStream::new();
        // Garbage whose tail is the first half of a real header.
        stream.push(b"xxxxxxxx");
        stream.push(&frame[..2]);
        assert_eq!(stream.frames().count(), 0);
        stream.push(&frame[2..]);
        let frames: Vec<_> = stream.frames().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].kind, FrameKind::Report);
    }

    #[test]
    fn declared_length_is_awaited_not_trusted() {
        let mut wire = command_frame(b"abcdef");
        // Inflate declared length beyond the buffered bytes.
        wire[4] = 0xF0;
        let mut stream = FrameStream::with_data(&wire);
        // Full declared frame not buffered yet: wait, do not resync.
        assert_eq!(stream.frames().count(), 0);
        assert_eq!(stream.corrupted_frames(), 0);
        assert_eq!(stream.pending(), wire.len());
    }

    #[test]
    fn mixed_kinds_in_order() {
        let mut stream = FrameStream::new();
        stream.push(&command_frame(b"cmd"));
        stream.push(&report_frame(b"rpt"));
        let frames: Vec<_> = stream.frames().collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].kind, FrameKind::Command);
        assert_eq!(frames[1].kind, FrameKind::Report);
    }
}
