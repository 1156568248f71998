use std::str;

use crate::errors::{ClientResult, LogViewerError};

/// Reassembles `\n`-terminated lines from arbitrarily chunked bytes.
///
/// Decoding is incremental: an incomplete UTF-8 sequence at the end of one
/// chunk is held back and completed by the next. Likewise a line fragment
/// without a terminator is held until one arrives or the stream ends.
#[derive(Debug, Default)]
pub struct LineAssembler {
    undecoded: Vec<u8>,
    partial_line: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the lines it completed, terminators stripped.
    pub fn push(&mut self, chunk: &[u8]) -> ClientResult<Vec<String>> {
        self.undecoded.extend_from_slice(chunk);

        let decoded_len = match str::from_utf8(&self.undecoded) {
            Ok(_) => self.undecoded.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(LogViewerError::StreamDecodeError(format!(
                    "invalid UTF-8 in response body: {}",
                    e
                )))
            }
        };

        let rest = self.undecoded.split_off(decoded_len);
        let bytes = std::mem::replace(&mut self.undecoded, rest);
        // Validated above
        let text = String::from_utf8(bytes)
            .map_err(|e| LogViewerError::StreamDecodeError(e.to_string()))?;

        Ok(self.split_lines(&text))
    }

    /// Signals end-of-stream. Returns the trailing unterminated fragment, if any.
    pub fn finish(&mut self) -> ClientResult<Option<String>> {
        if !self.undecoded.is_empty() {
            let dangling = self.undecoded.len();
            self.undecoded.clear();
            return Err(LogViewerError::StreamDecodeError(format!(
                "stream ended inside a UTF-8 sequence ({} dangling bytes)",
                dangling
            )));
        }

        let last = std::mem::take(&mut self.partial_line);
        Ok(if last.is_empty() { None } else { Some(last) })
    }

    fn split_lines(&mut self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = text;

        while let Some(idx) = rest.find('\n') {
            self.partial_line.push_str(&rest[..idx]);
            lines.push(std::mem::take(&mut self.partial_line));
            rest = &rest[idx + 1..];
        }
        self.partial_line.push_str(rest);

        lines
    }
}
