//! Infrastructure layer for askme.
//!
//! Contains the HTTP implementation of the `ChatTransport` port defined in
//! `askme-core`, plus loading of `config.toml` from the askme home directory.

pub mod config;
pub mod http;
