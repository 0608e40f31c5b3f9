//! Conversation state and the controller that drives it.
//!
//! `ChatController` owns the conversation; UI layers observe `ChatState`
//! snapshots and feed input back only through `on_send`.

pub mod controller;
pub mod state;

pub use controller::{
    CONNECTION_LOST_NOTICE, ChatController, GENERIC_ERROR_NOTICE, SESSION_RESET_NOTICE,
    SendOutcome,
};
pub use state::{ChatState, ConnectionState};
