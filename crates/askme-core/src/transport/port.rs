//! ChatTransport trait definition.
//!
//! Uses RPITIT for all three calls. `open_stream` resolves once the response
//! head has arrived, so a rejected session surfaces before any text does.

use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;

use askme_types::chat::SessionId;
use askme_types::error::ChatError;
use askme_types::persona::{Persona, PersonaId};

/// Lazy, finite, non-restartable sequence of decoded reply fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send + 'static>>;

/// Backend operations the conversation controller depends on.
///
/// Implementations live in askme-infra (e.g., `HttpChatTransport`).
pub trait ChatTransport: Send + Sync {
    /// Fetch the persona currently published by the backend.
    fn fetch_persona(&self) -> impl Future<Output = Result<Persona, ChatError>> + Send;

    /// Open a new server-side session for `persona_id`.
    fn init_session(
        &self,
        persona_id: &PersonaId,
    ) -> impl Future<Output = Result<SessionId, ChatError>> + Send;

    /// Submit `text` to `session_id` and return the streamed reply.
    ///
    /// Must fail with [`ChatError::SessionNotFound`] when the backend no
    /// longer knows the session, and with another variant for every other
    /// failure.
    fn open_stream(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> impl Future<Output = Result<TextStream, ChatError>> + Send;
}
