//! Terminal rendering of chat messages and streamed replies.

use std::io::{self, Write};

use console::style;

use askme_types::chat::{Message, Sender};

/// Longest message text shown per line by `/history`.
const HISTORY_PREVIEW_CHARS: usize = 100;

/// Tracks how much of the reply in flight has already been written.
///
/// Published snapshots can coalesce, so the printer works on the whole
/// buffer each time and emits only the unseen suffix.
#[derive(Debug, Default)]
pub struct ReplyPrinter {
    printed: usize,
}

impl ReplyPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Part of `text` not yet printed. `text` must extend what was seen
    /// before; anything else yields `None`.
    pub fn next_delta<'a>(&mut self, text: &'a str) -> Option<&'a str> {
        let delta = text.get(self.printed..).filter(|d| !d.is_empty())?;
        self.printed = text.len();
        Some(delta)
    }

    pub fn has_printed(&self) -> bool {
        self.printed > 0
    }
}

/// Label that starts a bot reply line.
pub fn bot_label(name: &str) -> String {
    format!("{}", style(format!("{name} >")).cyan().bold())
}

fn user_label() -> String {
    format!("{}", style("You >").green().bold())
}

/// Write one message on its own line.
pub fn write_message(out: &mut impl Write, bot_name: &str, message: &Message) -> io::Result<()> {
    let label = match message.sender {
        Sender::User => user_label(),
        Sender::Bot => bot_label(bot_name),
    };
    writeln!(out, "  {} {}", label, message.text)
}

/// Write a notice the controller appended after a failed exchange.
pub fn write_notice(out: &mut impl Write, bot_name: &str, text: &str) -> io::Result<()> {
    writeln!(out, "  {} {}", bot_label(bot_name), style(text).yellow())
}

/// Write the conversation log with long messages shortened.
pub fn write_history(out: &mut impl Write, bot_name: &str, messages: &[Message]) -> io::Result<()> {
    writeln!(out)?;
    if messages.is_empty() {
        writeln!(out, "  {}", style("No messages yet.").dim())?;
    }
    for message in messages {
        let label = match message.sender {
            Sender::User => user_label(),
            Sender::Bot => bot_label(bot_name),
        };
        let time = message.created_at.format("%H:%M:%S");
        writeln!(
            out,
            "  {} {} {}",
            style(time).dim(),
            label,
            preview(&message.text, HISTORY_PREVIEW_CHARS)
        )?;
    }
    writeln!(out)
}

/// First line of `text`, cut to at most `max_chars` characters.
fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    let truncated = first_line.chars().count() > max_chars || text.lines().nth(1).is_some();
    if !truncated {
        return first_line.to_string();
    }
    let kept: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
