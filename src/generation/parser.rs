//! Incremental parser for streamed generation responses
//!
//! The streaming endpoint emits one JSON object per token fragment, but
//! network chunks split at arbitrary byte boundaries. This parser
//! accumulates bytes and extracts every complete object via single-pass
//! brace matching (string-aware, so braces inside fragment text do not
//! confuse it).

use crate::errors::{AssistantError, Result};

/// Maximum accumulation buffer (1MB)
pub const MAX_BUFFER_SIZE: usize = 1_048_576;

/// Brace-matching extractor over a byte stream
#[derive(Debug, Default)]
pub struct StreamParser {
    buffer: Vec<u8>,
}

impl StreamParser {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Feed a network chunk, returning every complete JSON object that
    /// became available, in emission order.
    ///
    /// # Errors
    /// - Buffer overflow (the backend is emitting garbage)
    /// - More closing than opening braces
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>> {
        if self.buffer.len() + bytes.len() > MAX_BUFFER_SIZE {
            return Err(AssistantError::GenerationError(format!(
                "stream buffer overflow: {} bytes exceeds maximum {}",
                self.buffer.len() + bytes.len(),
                MAX_BUFFER_SIZE
            )));
        }

        self.buffer.extend_from_slice(bytes);

        let mut objects = Vec::new();
        while let Some((start, end)) = self.find_complete_object()? {
            let object = String::from_utf8_lossy(&self.buffer[start..=end]).to_string();
            self.buffer.drain(..=end);
            objects.push(object);
        }

        Ok(objects)
    }

    /// Bytes still waiting for their closing brace
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Locate the first complete `{...}` object in the buffer
    fn find_complete_object(&self) -> Result<Option<(usize, usize)>> {
        let mut depth = 0i32;
        let mut start: Option<usize> = None;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, &byte) in self.buffer.iter().enumerate() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match byte {
                b'\\' if in_string => escape_next = true,
                b'"' => in_string = !in_string,
                b'{' if !in_string => {
                    if depth == 0 {
                        start = Some(i);
                    }
                    depth += 1;
                }
                b'}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(start) = start {
                            return Ok(Some((start, i)));
                        }
                    }
                    if depth < 0 {
                        return Err(AssistantError::GenerationError(
                            "malformed stream: unbalanced braces".to_string(),
                        ));
                    }
                }
                _ => {}
            }
        }

        Ok(None)
    }
}
