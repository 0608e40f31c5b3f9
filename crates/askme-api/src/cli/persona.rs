//! `askme persona` -- fetch and display the published persona.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use askme_core::transport::ChatTransport;
use askme_infra::http::HttpChatTransport;
use askme_types::config::ClientConfig;
use askme_types::persona::Persona;

pub async fn show_persona(config: &ClientConfig, json: bool) -> Result<()> {
    let transport = HttpChatTransport::from_config(config)?;
    let persona = transport.fetch_persona().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&persona_json(&persona)?)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&persona.public_name).cyan().bold());
    if let Some(tagline) = &persona.tagline {
        println!("  {}", style(tagline).dim());
    }
    println!();
    println!("{}", persona_table(&persona));
    println!();

    Ok(())
}

/// The persona as sent by the backend, plus the derived display fields.
fn persona_json(persona: &Persona) -> serde_json::Result<serde_json::Value> {
    let mut value = serde_json::to_value(persona)?;
    if let Some(map) = value.as_object_mut() {
        map.insert("page_title".to_string(), persona.page_title().into());
        map.insert("avatar_url".to_string(), persona.avatar_url().into());
    }
    Ok(value)
}

fn persona_table(persona: &Persona) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut row = |label: &str, value: &str| {
        table.add_row(vec![
            Cell::new(label).fg(Color::White),
            Cell::new(value),
        ]);
    };

    row("ID", persona.id.as_str());
    if let Some(username) = &persona.username {
        row("Username", username);
    }
    row("Page title", &persona.page_title());
    row("Avatar", persona.avatar_url());
    if let Some(bio) = &persona.bio {
        row("Bio", bio);
    }
    row("Welcome", persona.welcome().unwrap_or("(none)"));

    table
}
