//! HTTP transport for the Ask-Me-Anything backend.
//!
//! [`HttpChatTransport`] implements
//! [`ChatTransport`](askme_core::transport::ChatTransport) over the three
//! `/v1` endpoints, streaming reply bodies as plain UTF-8 text.

pub mod client;
pub mod streaming;

pub use client::HttpChatTransport;
