//! Incremental decoder for `text/event-stream` bodies.

/// Splits a byte stream into event payloads.
///
/// Only `data` fields are kept; multiple `data` lines in one event are joined
/// with newlines. Comments (keep-alives) and other fields are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Feed a chunk; returns the payloads of every event it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data
                    .push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b"data: {\"type\":\"start\"}\n\n");
        assert_eq!(events, vec![r#"{"type":"start"}"#]);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed(b"data: {\"type\":").is_empty());
        assert!(decoder.feed(b"\"progress\"}\n").is_empty());
        let events = decoder.feed(b"\ndata: x\n\n");
        assert_eq!(events, vec![r#"{"type":"progress"}"#, "x"]);
    }

    #[test]
    fn test_keep_alive_comments_skipped() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b":\n\n: ping\n\ndata: a\r\n\r\n");
        assert_eq!(events, vec!["a"]);
    }

    #[test]
    fn test_multiline_data_joined() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b"event: progress\ndata: one\ndata:two\n\n");
        assert_eq!(events, vec!["one\ntwo"]);
    }

    #[test]
    fn test_multibyte_char_split() {
        let mut decoder = SseDecoder::default();
        let bytes = "data: é\n\n".as_bytes();
        assert!(decoder.feed(&bytes[..7]).is_empty());
        assert_eq!(decoder.feed(&bytes[7..]), vec!["é"]);
    }
}
