//! Transport abstractions for askme.
//!
//! - `ChatTransport`: RPITIT trait for the three backend calls
//! - `decode_text_stream`: turns a raw byte stream into text fragments

pub mod decode;
pub mod port;

pub use decode::{Utf8ChunkDecoder, decode_text_stream};
pub use port::{ChatTransport, TextStream};
