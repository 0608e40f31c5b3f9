//! Reply body adapter.
//!
//! The stream endpoint answers with a chunked `text/plain` body and no
//! framing: every byte belongs to the reply. Chunks are guarded by an idle
//! timeout and then handed to the core UTF-8 decoder.

use std::time::Duration;

use futures_util::StreamExt;

use askme_core::transport::{TextStream, decode_text_stream};
use askme_types::error::ChatError;

/// Turn an accepted stream response into a [`TextStream`].
///
/// Each wait for the next chunk is bounded by `idle_timeout`; expiry ends the
/// stream with [`ChatError::Timeout`]. Body read failures become
/// [`ChatError::Transport`].
pub fn create_reply_stream(response: reqwest::Response, idle_timeout: Duration) -> TextStream {
    let chunks = async_stream::try_stream! {
        let mut byte_stream = Box::pin(response.bytes_stream());

        loop {
            let next = tokio::time::timeout(idle_timeout, byte_stream.next())
                .await
                .map_err(|_| ChatError::Timeout(idle_timeout))?;

            let Some(chunk_result) = next else {
                break;
            };
            let chunk = chunk_result
                .map_err(|e| ChatError::Transport(format!("response body read: {e}")))?;
            tracing::trace!(bytes = chunk.len(), "reply chunk received");
            yield chunk;
        }
    };

    decode_text_stream(chunks)
}
