//! Conversation logic and transport abstractions for askme.
//!
//! This crate defines the "port" (the `ChatTransport` trait) that the
//! infrastructure layer implements, the byte-to-text stream consumer, and the
//! `ChatController` that drives a conversation. It depends only on
//! `askme-types` -- never on `askme-infra` or any HTTP crate.

pub mod chat;
pub mod transport;
