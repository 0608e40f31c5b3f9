//! Interactive terminal chat.
//!
//! Streams replies live with a typing spinner, prints a persona header,
//! and handles slash commands. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
