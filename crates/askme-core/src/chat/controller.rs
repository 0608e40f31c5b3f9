//! Conversation controller.
//!
//! Drives startup (persona + session), the per-message request/response
//! cycle, and recovery when the backend reports the session as gone.
//!
//! State is published through a `tokio::sync::watch` channel. Writers are
//! confined to this module; presentation layers hold receivers and only
//! influence the conversation through [`ChatController::on_send`].

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use askme_types::chat::{Message, SessionId};
use askme_types::error::ChatError;

use crate::transport::ChatTransport;

use super::state::{ChatState, ConnectionState};

/// Shown after a lost session was replaced by a new one.
pub const SESSION_RESET_NOTICE: &str =
    "Sorry, the session was reset. Please try sending your message again.";

/// Shown when a lost session could not be replaced.
pub const CONNECTION_LOST_NOTICE: &str =
    "Sorry, I couldn't establish a connection. Please refresh the page.";

/// Shown for every other failed exchange.
pub const GENERIC_ERROR_NOTICE: &str = "Sorry, I encountered an error.";

/// How a call to [`ChatController::on_send`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent: empty text, no session, or an exchange in flight.
    Ignored,
    /// The reply streamed to completion.
    Completed,
    /// The session was gone and a fresh one replaced it.
    SessionReset,
    /// The session was gone and no replacement could be opened.
    ConnectionLost,
    /// Any other failure; a notice was appended.
    Failed,
    /// The caller cancelled the exchange.
    Cancelled,
}

/// Clears the in-flight markers when an exchange ends, including when the
/// `on_send` future is dropped before completion.
struct ExchangeGuard<'a> {
    state: &'a watch::Sender<ChatState>,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            let dirty = s.loading || !s.streaming.is_empty();
            s.loading = false;
            s.streaming.clear();
            dirty
        });
    }
}

/// Owns one conversation with one persona.
///
/// `on_send` takes `&mut self`, so at most one exchange can be in flight per
/// controller.
pub struct ChatController<T> {
    transport: T,
    state: watch::Sender<ChatState>,
}

impl<T: ChatTransport> ChatController<T> {
    pub fn new(transport: T) -> Self {
        let (state, _) = watch::channel(ChatState::default());
        Self { transport, state }
    }

    /// Receiver that observes every published state change.
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    /// Borrow the current state.
    ///
    /// Do not hold the returned guard across an `.await`.
    pub fn state(&self) -> watch::Ref<'_, ChatState> {
        self.state.borrow()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the persona and open a session.
    ///
    /// On success the controller is `Online` and the log holds only the
    /// persona's welcome message (if any). If either call fails the
    /// controller ends `Offline` with no persona and no session. Calling
    /// this again after a failure is the only way back online.
    pub async fn on_startup(&mut self) -> bool {
        let persona = match self.transport.fetch_persona().await {
            Ok(persona) => persona,
            Err(e) => {
                warn!(error = %e, "Failed to fetch persona");
                self.go_offline_without_persona();
                return false;
            }
        };
        info!(persona_id = %persona.id, name = %persona.public_name, "Persona loaded");

        let session = match self.transport.init_session(&persona.id).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, persona_id = %persona.id, "Failed to initialize chat session");
                self.go_offline_without_persona();
                return false;
            }
        };
        info!(session = %session.short(), "Chat session initialized");

        self.state.send_modify(|s| {
            s.messages.clear();
            s.streaming.clear();
            s.loading = false;
            if let Some(welcome) = persona.welcome() {
                s.messages.push(Message::bot(welcome));
            }
            s.persona = Some(persona);
            s.connection = ConnectionState::Online(session);
        });
        true
    }

    /// Send `text` and stream the reply into the state.
    pub async fn on_send(&mut self, text: &str) -> SendOutcome {
        self.on_send_cancellable(text, &CancellationToken::new()).await
    }

    /// Like [`on_send`](Self::on_send), abandoning the exchange when `cancel`
    /// fires. A cancelled exchange discards its partial reply and appends no
    /// notice.
    pub async fn on_send_cancellable(
        &mut self,
        text: &str,
        cancel: &CancellationToken,
    ) -> SendOutcome {
        let Some(session_id) = self.admit(text) else {
            debug!("Send ignored");
            return SendOutcome::Ignored;
        };
        let _guard = ExchangeGuard { state: &self.state };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ChatError::Cancelled),
            result = self.stream_reply(&session_id, text) => result,
        };

        match result {
            Ok(()) => {
                self.state.send_modify(|s| {
                    let reply = std::mem::take(&mut s.streaming);
                    if !reply.is_empty() {
                        s.messages.push(Message::bot(reply));
                    }
                });
                SendOutcome::Completed
            }
            Err(ChatError::Cancelled) => {
                info!(session = %session_id.short(), "Exchange cancelled");
                SendOutcome::Cancelled
            }
            Err(e) if e.is_session_not_found() => self.recover_session(&session_id).await,
            Err(e) => {
                warn!(error = %e, session = %session_id.short(), "Chat exchange failed");
                self.state.send_modify(|s| {
                    s.streaming.clear();
                    s.messages.push(Message::bot(GENERIC_ERROR_NOTICE));
                });
                SendOutcome::Failed
            }
        }
    }

    /// Admission check plus the optimistic user message.
    ///
    /// Returns the session id captured for this exchange, or `None` if the
    /// send must be ignored (in which case nothing is published).
    fn admit(&self, text: &str) -> Option<SessionId> {
        let mut admitted = None;
        self.state.send_if_modified(|s| {
            if text.trim().is_empty() || !s.can_send() {
                return false;
            }
            let Some(session_id) = s.session_id().cloned() else {
                return false;
            };
            s.messages.push(Message::user(text));
            s.loading = true;
            s.streaming.clear();
            admitted = Some(session_id);
            true
        });
        admitted
    }

    async fn stream_reply(&self, session_id: &SessionId, text: &str) -> Result<(), ChatError> {
        let mut stream = self.transport.open_stream(session_id, text).await?;
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            self.state.send_modify(|s| s.streaming.push_str(&fragment));
        }
        Ok(())
    }

    /// One re-initialization attempt for the persona of a lost session.
    async fn recover_session(&self, lost: &SessionId) -> SendOutcome {
        info!(session = %lost.short(), "Session not found, reinitializing");

        // The lost id must not survive if this future is dropped mid-recovery.
        let persona = self.state.borrow().persona.clone();
        self.state.send_modify(|s| {
            s.messages.clear();
            s.streaming.clear();
            s.connection = ConnectionState::Uninitialized;
        });

        let Some(persona) = persona else {
            self.state.send_modify(|s| {
                s.messages.push(Message::bot(CONNECTION_LOST_NOTICE));
                s.connection = ConnectionState::Offline;
            });
            return SendOutcome::ConnectionLost;
        };

        match self.transport.init_session(&persona.id).await {
            Ok(session) => {
                info!(session = %session.short(), "Chat session reinitialized");
                self.state.send_modify(|s| {
                    if let Some(welcome) = persona.welcome() {
                        s.messages.push(Message::bot(welcome));
                    }
                    s.messages.push(Message::bot(SESSION_RESET_NOTICE));
                    s.connection = ConnectionState::Online(session);
                });
                SendOutcome::SessionReset
            }
            Err(e) => {
                warn!(error = %e, persona_id = %persona.id, "Failed to reinitialize chat session");
                self.state.send_modify(|s| {
                    s.messages.push(Message::bot(CONNECTION_LOST_NOTICE));
                    s.connection = ConnectionState::Offline;
                });
                SendOutcome::ConnectionLost
            }
        }
    }

    fn go_offline_without_persona(&self) {
        self.state.send_modify(|s| {
            s.persona = None;
            s.connection = ConnectionState::Offline;
            s.streaming.clear();
            s.loading = false;
        });
    }
}
