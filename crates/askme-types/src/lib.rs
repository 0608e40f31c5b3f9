//! Shared domain types for askme.
//!
//! This crate contains the core domain types used across the client:
//! Persona, Session, Message, client configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod persona;
