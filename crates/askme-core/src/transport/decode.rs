//! Incremental UTF-8 decoding of streamed reply bodies.
//!
//! Network reads split the body at arbitrary byte offsets, so a multi-byte
//! character may straddle two chunks. `Utf8ChunkDecoder` keeps the incomplete
//! tail of each chunk and prepends it to the next one; only complete
//! characters are ever emitted.

use futures_util::{Stream, StreamExt};

use askme_types::error::ChatError;

use super::port::TextStream;

/// Longest byte sequence of a single UTF-8 scalar value.
const MAX_UTF8_LEN: usize = 4;

/// Stateful decoder that buffers partial UTF-8 sequences between chunks.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `chunk` (plus any carried-over bytes) as possible.
    ///
    /// Returns `Ok(None)` when nothing complete is available yet.
    ///
    /// # Errors
    ///
    /// [`ChatError::Decode`] if the bytes can never form valid UTF-8.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<String>, ChatError> {
        self.pending.extend_from_slice(chunk);

        let valid_len = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) => {
                if let Some(bad_len) = e.error_len() {
                    return Err(ChatError::Decode(format!(
                        "invalid UTF-8: {bad_len} bad byte(s) after {} valid",
                        e.valid_up_to()
                    )));
                }
                // Incomplete sequence at the end; keep it for the next chunk.
                e.valid_up_to()
            }
        };
        debug_assert!(self.pending.len() - valid_len < MAX_UTF8_LEN);

        if valid_len == 0 {
            return Ok(None);
        }

        let tail = self.pending.split_off(valid_len);
        let complete = std::mem::replace(&mut self.pending, tail);
        let text = String::from_utf8(complete)
            .map_err(|e| ChatError::Decode(format!("invalid UTF-8: {e}")))?;
        Ok(Some(text))
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Signal end of input.
    ///
    /// # Errors
    ///
    /// [`ChatError::Decode`] if the body ended in the middle of a character.
    pub fn finish(self) -> Result<(), ChatError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(ChatError::Decode(format!(
                "stream ended inside a multi-byte character ({} byte(s) pending)",
                self.pending.len()
            )))
        }
    }
}

/// Map a stream of raw body chunks to a [`TextStream`] of decoded fragments.
///
/// Read errors from `bytes` are forwarded unchanged, so a
/// [`ChatError::SessionNotFound`] raised upstream keeps its identity.
/// Chunks that complete no character produce no fragment.
pub fn decode_text_stream<S, B>(bytes: S) -> TextStream
where
    S: Stream<Item = Result<B, ChatError>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    Box::pin(async_stream::try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut decoder = Utf8ChunkDecoder::new();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            if let Some(text) = decoder.feed(chunk.as_ref())? {
                yield text;
            }
        }

        decoder.finish()?;
    })
}
