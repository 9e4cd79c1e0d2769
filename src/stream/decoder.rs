//! Incremental text/event-stream frame decoding.
//!
//! The backend frames events per the Server-Sent-Events convention: frames
//! are separated by a blank line, and each frame is made of `event:` and
//! `data:` prefixed lines. Chunks arriving off the wire may split a frame
//! anywhere, including inside a multi-byte UTF-8 sequence, or carry several
//! complete frames at once.

use tracing::debug;

/// One blank-line-delimited unit of the event-stream wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Event type; `"message"` when the frame carries no `event:` line.
    pub event: String,
    /// Newline-joined `data:` payload fragments.
    pub data: String,
}

/// Incremental frame decoder with carry-over across chunks.
///
/// Incomplete input (a partial UTF-8 sequence or an unterminated frame) is
/// buffered until the next [`feed`](FrameDecoder::feed). One decoder serves
/// exactly one session; a new session starts with a fresh decoder.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Undecoded bytes: at most one incomplete trailing UTF-8 sequence.
    pending: Vec<u8>,
    /// Decoded text not yet terminated by a blank line.
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of the response body, returning every frame it
    /// completes (possibly none).
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RawFrame> {
        self.decode_text(chunk);

        let mut frames = Vec::new();
        while let Some(boundary) = self.buffer.find("\n\n") {
            let rest = self.buffer.split_off(boundary + 2);
            let raw = std::mem::replace(&mut self.buffer, rest);
            frames.push(parse_frame(&raw[..boundary]));
        }
        frames
    }

    /// Consume the decoder at stream end.
    ///
    /// Any unterminated trailing frame is discarded: the backend closes every
    /// frame before ending the stream, so leftovers indicate truncation.
    /// Returns the discarded text for the caller's logs.
    pub fn finish(self) -> Option<String> {
        let mut leftover = self.buffer;
        if !self.pending.is_empty() {
            leftover.push_str(&String::from_utf8_lossy(&self.pending));
        }

        let trimmed = leftover.trim();
        if trimmed.is_empty() {
            None
        } else {
            debug!(leftover = %trimmed, "discarding incomplete trailing frame");
            Some(trimmed.to_string())
        }
    }

    /// Append a chunk to the text buffer, holding back an incomplete
    /// trailing UTF-8 sequence and substituting U+FFFD for invalid bytes.
    fn decode_text(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                        Some(len) => {
                            self.buffer.push('\u{FFFD}');
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }
}

/// Classify the lines of one raw frame.
fn parse_frame(raw: &str) -> RawFrame {
    let mut event = String::from("message");
    let mut data_lines: Vec<&str> = Vec::new();

    for line in raw.split('\n') {
        if let Some(rest) = line.strip_prefix("event:") {
            event = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim());
        }
    }

    RawFrame {
        event,
        data: data_lines.join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_single_frame() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"event: progress\ndata: {\"stage\":\"searching\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "progress");
        assert_eq!(frames[0].data, r#"{"stage":"searching"}"#);
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"event: a\ndata: 1\n\nevent: b\ndata: 2\n\nevent: c\ndata: 3\n\n");
        let events: Vec<_> = frames.iter().map(|f| f.event.as_str()).collect();
        assert_eq!(events, ["a", "b", "c"]);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"event: result\nda").is_empty());
        assert!(decoder.feed(b"ta: {\"x\":1}\n").is_empty());
        let frames = decoder.feed(b"\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "result");
        assert_eq!(frames[0].data, r#"{"x":1}"#);
    }

    #[test]
    fn test_chunk_boundary_independence() {
        // Splitting the same byte sequence at every possible position must
        // always yield the same two frames, even when the cut lands inside
        // the blank-line separator or a multi-byte character.
        let body = "event: progress\ndata: {\"message\":\"検索中\"}\n\nevent: complete\ndata: {}\n\n"
            .as_bytes();

        for split in 0..=body.len() {
            let mut decoder = FrameDecoder::new();
            let mut frames = decoder.feed(&body[..split]);
            frames.extend(decoder.feed(&body[split..]));

            assert_eq!(frames.len(), 2, "split at byte {split}");
            assert_eq!(frames[0].event, "progress");
            assert_eq!(frames[0].data, "{\"message\":\"検索中\"}");
            assert_eq!(frames[1].event, "complete");
        }
    }

    #[test]
    fn test_utf8_sequence_split_across_chunks() {
        let body = "data: 東京\n\n".as_bytes();
        // Cut inside the three-byte encoding of 東.
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(&body[..7]).is_empty());
        let frames = decoder.feed(&body[7..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "東京");
    }

    #[test]
    fn test_multiple_data_lines_are_newline_joined() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data: first\ndata: second\n\n");
        assert_eq!(frames[0].data, "first\nsecond");
        assert_eq!(frames[0].event, "message");
    }

    #[test]
    fn test_unknown_line_prefixes_are_ignored() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"id: 7\nretry: 100\nevent: complete\ndata: {}\n\n");
        assert_eq!(frames[0].event, "complete");
        assert_eq!(frames[0].data, "{}");
    }

    #[test]
    fn test_finish_discards_incomplete_trailing_frame() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"event: complete\ndata: {}\n\nevent: progress\ndata: {\"st");
        assert_eq!(frames.len(), 1);

        let leftover = decoder.finish().expect("leftover buffer");
        assert!(leftover.contains("event: progress"));
    }

    #[test]
    fn test_finish_on_clean_end_is_empty() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(b"event: complete\ndata: {}\n\n");
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_invalid_utf8_is_substituted_not_fatal() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data: a\xFF\xFEb\n\n");
        assert_eq!(frames.len(), 1);
        assert!(frames[0].data.contains('\u{FFFD}'));
    }
}
