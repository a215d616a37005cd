//! Line framing over the raw serial byte stream.

/// Longest line kept while waiting for a terminator. The sensor peer sends
/// short JSON objects; anything past this without a newline is junk.
const MAX_PENDING: usize = 4096;

/// Accumulates raw bytes and yields trimmed, non-empty lines. Bytes after
/// the last terminator are retained for the next tick, so a line split
/// across reads still comes out whole.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: Vec<u8>,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        if self.buf.len() > MAX_PENDING && !self.buf.contains(&b'\n') {
            log::warn!(
                "discarding {} unterminated bytes from serial peer",
                self.buf.len()
            );
            self.buf.clear();
        }
    }

    /// Next complete line, stripped of surrounding whitespace. Blank lines
    /// are swallowed. Returns `None` once no terminator is pending.
    pub fn next_line(&mut self) -> Option<String> {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_trimmed_line() {
        let mut frames = FrameReader::new();
        frames.extend(b"  {\"id\":\"s1\"}  \r\n");
        assert_eq!(frames.next_line().as_deref(), Some("{\"id\":\"s1\"}"));
        assert_eq!(frames.next_line(), None);
    }

    #[test]
    fn retains_partial_line_across_reads() {
        let mut frames = FrameReader::new();
        frames.extend(b"{\"id\":");
        assert_eq!(frames.next_line(), None);
        frames.extend(b"\"s1\"}\n");
        assert_eq!(frames.next_line().as_deref(), Some("{\"id\":\"s1\"}"));
    }

    #[test]
    fn yields_multiple_lines_from_one_read() {
        let mut frames = FrameReader::new();
        frames.extend(b"one\ntwo\nthree");
        assert_eq!(frames.next_line().as_deref(), Some("one"));
        assert_eq!(frames.next_line().as_deref(), Some("two"));
        assert_eq!(frames.next_line(), None);
        frames.extend(b"\n");
        assert_eq!(frames.next_line().as_deref(), Some("three"));
    }

    #[test]
    fn swallows_blank_lines() {
        let mut frames = FrameReader::new();
        frames.extend(b"\n   \r\n\nreal\n");
        assert_eq!(frames.next_line().as_deref(), Some("real"));
        assert_eq!(frames.next_line(), None);
    }

    #[test]
    fn drops_unterminated_junk() {
        let mut frames = FrameReader::new();
        frames.extend(&vec![b'x'; MAX_PENDING + 1]);
        assert_eq!(frames.next_line(), None);
        // A fresh line still comes through after the junk is discarded.
        frames.extend(b"ok\n");
        assert_eq!(frames.next_line().as_deref(), Some("ok"));
    }
}
