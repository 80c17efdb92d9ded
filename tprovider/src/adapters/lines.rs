//! Newline framing over raw response bytes.

use crate::ProviderError;

/// Accumulates network chunks and hands out complete lines.
///
/// Bytes are decoded only once a line is whole, so a multi-byte character split across two
/// chunks survives intact.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    /// Next complete line, trailing newline included.
    pub(crate) fn next_line(&mut self) -> Option<Result<String, ProviderError>> {
        let end = self.pending.iter().position(|byte| *byte == b'\n')?;
        let line = self.pending.drain(..=end).collect::<Vec<_>>();
        Some(decode(line))
    }

    /// Whatever is left after the body ended without a final newline.
    pub(crate) fn finish(&mut self) -> Option<Result<String, ProviderError>> {
        if self.pending.is_empty() {
            return None;
        }
        Some(decode(std::mem::take(&mut self.pending)))
    }
}

fn decode(bytes: Vec<u8>) -> Result<String, ProviderError> {
    String::from_utf8(bytes)
        .map_err(|err| ProviderError::transport(format!("invalid utf-8 in stream: {err}")))
}

#[cfg(test)]
mod tests {
    use super::LineBuffer;
    use crate::ProviderErrorKind;

    #[test]
    fn character_split_across_chunks_is_decoded_whole() {
        let line = "data: café\n".as_bytes();
        let split = line
            .iter()
            .position(|byte| *byte == 0xC3)
            .expect("first byte of é")
            + 1;

        let mut buffer = LineBuffer::new();
        buffer.push(&line[..split]);
        assert!(buffer.next_line().is_none());

        buffer.push(&line[split..]);
        assert_eq!(
            buffer.next_line().expect("complete line").expect("valid utf-8"),
            "data: café\n"
        );
        assert!(buffer.next_line().is_none());
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn several_lines_in_one_chunk_come_out_in_order() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"one\ntwo\nthr");

        assert_eq!(buffer.next_line().expect("one").expect("utf-8"), "one\n");
        assert_eq!(buffer.next_line().expect("two").expect("utf-8"), "two\n");
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.finish().expect("rest").expect("utf-8"), "thr");
    }

    #[test]
    fn invalid_bytes_in_a_complete_line_are_a_transport_error() {
        let mut buffer = LineBuffer::new();
        buffer.push(&[0x66, 0xFF, b'\n']);

        let err = buffer
            .next_line()
            .expect("line")
            .expect_err("invalid utf-8");
        assert_eq!(err.kind, ProviderErrorKind::Transport);
    }
}
