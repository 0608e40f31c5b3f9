//! Persona header shown when a chat starts or reconnects.

use std::io::{self, Write};

use console::style;

use askme_core::chat::{ChatState, ConnectionState};

/// Write the header: persona name, connection indicator, page title,
/// avatar and session.
pub fn write_header(out: &mut impl Write, state: &ChatState) -> io::Result<()> {
    let badge = connection_badge(&state.connection);

    writeln!(out)?;
    match &state.persona {
        Some(persona) => {
            writeln!(out, "  {} {}", style(&persona.public_name).cyan().bold(), badge)?;
            if let Some(tagline) = &persona.tagline {
                writeln!(out, "  {}", style(tagline).dim())?;
            }
            writeln!(out)?;
            writeln!(out, "  {}    {}", style("Title:").bold(), style(persona.page_title()).dim())?;
            writeln!(out, "  {}   {}", style("Avatar:").bold(), style(persona.avatar_url()).dim())?;
        }
        None => {
            writeln!(out, "  {} {}", style("Ask Me Anything").cyan().bold(), badge)?;
        }
    }
    if let Some(session) = state.session_id() {
        writeln!(out, "  {}  {}", style("Session:").bold(), style(session.short()).dim())?;
    }
    writeln!(out)?;
    writeln!(out, "  {}", style("Type /help for commands, Ctrl+D to exit").dim())?;
    writeln!(out, "  {}", style("---").dim())?;
    writeln!(out)
}

fn connection_badge(connection: &ConnectionState) -> String {
    match connection {
        ConnectionState::Online(_) => format!("{}", style("● online").green()),
        ConnectionState::Offline => format!("{}", style("○ offline").red()),
        ConnectionState::Uninitialized => format!("{}", style("◌ connecting").yellow()),
    }
}
