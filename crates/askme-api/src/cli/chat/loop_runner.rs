//! Main chat loop orchestration.
//!
//! Connects the controller, prints the header and welcome message, then
//! reads lines until Ctrl+D or `/exit`. While a reply streams, the loop
//! watches three things at once: the exchange itself, published state (to
//! print new text), and the keyboard (Ctrl+C cancels the reply).

use std::io::Write;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline_async::SharedWriter;
use tokio_util::sync::CancellationToken;

use askme_core::chat::{ChatController, ChatState, SendOutcome};
use askme_core::transport::ChatTransport;
use askme_infra::http::HttpChatTransport;
use askme_types::chat::Sender;
use askme_types::config::ClientConfig;

use super::banner::write_header;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{self, ReplyPrinter, bot_label};

/// Printed under the header when startup or `/reconnect` fails.
const STARTUP_FAILED_MESSAGE: &str = "Could not connect to the chat backend.";

/// Whether the loop should keep reading after an exchange.
#[derive(Debug, PartialEq, Eq)]
enum AfterExchange {
    Continue,
    Exit,
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn prompt_for(online: bool) -> String {
    if online {
        format!("  {} ", style("You >").green().bold())
    } else {
        format!("  {} ", style("offline >").red().bold())
    }
}

fn bot_name(state: &ChatState) -> String {
    state
        .persona
        .as_ref()
        .map_or_else(|| "Bot".to_string(), |p| p.public_name.clone())
}

/// Header, welcome message, and an offline warning if startup failed.
fn write_intro(out: &mut impl Write, state: &ChatState) -> std::io::Result<()> {
    write_header(out, state)?;
    let name = bot_name(state);
    for message in &state.messages {
        renderer::write_message(out, &name, message)?;
    }
    if !state.online() {
        writeln!(out, "  {} {}", style("!").red().bold(), STARTUP_FAILED_MESSAGE)?;
        writeln!(out, "  {}", style("Type /reconnect to try again.").dim())?;
    }
    writeln!(out)
}

/// Run the interactive chat loop against the configured backend.
pub async fn run_chat_loop(config: &ClientConfig) -> anyhow::Result<()> {
    let transport = HttpChatTransport::from_config(config)?;
    let mut controller = ChatController::new(transport);

    let connecting = spinner("connecting...".to_string());
    let online = controller.on_startup().await;
    connecting.finish_and_clear();

    let (mut input, mut out) = ChatInput::new(prompt_for(online))
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    write_intro(&mut out, &controller.state())?;

    loop {
        match input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                writeln!(out, "  {}", style("Press Ctrl+D to exit, or keep chatting.").dim())?;
            }
            InputEvent::Message(text) => {
                if text.trim().is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::write_help(&mut out)?,
                        ChatCommand::Clear => input.clear(),
                        ChatCommand::Exit => break,
                        ChatCommand::History => {
                            let state = controller.state();
                            renderer::write_history(&mut out, &bot_name(&state), &state.messages)?;
                        }
                        ChatCommand::Reconnect => {
                            reconnect(&mut controller, &mut input, &mut out).await?;
                        }
                        ChatCommand::Unknown(name) => {
                            writeln!(
                                out,
                                "  {} Unknown command: {}. Type /help for available commands.",
                                style("?").yellow().bold(),
                                style(name).dim()
                            )?;
                        }
                    }
                    continue;
                }

                let next = run_exchange(&mut controller, &mut input, &mut out, &text).await?;
                if next == AfterExchange::Exit {
                    break;
                }
            }
        }
    }

    writeln!(out, "\n  {}", style("Chat ended.").dim())?;
    input.flush();
    Ok(())
}

async fn reconnect<T: ChatTransport>(
    controller: &mut ChatController<T>,
    input: &mut ChatInput,
    out: &mut SharedWriter,
) -> anyhow::Result<()> {
    if controller.state().online() {
        writeln!(out, "  {}", style("Already connected.").dim())?;
        return Ok(());
    }

    let connecting = spinner("reconnecting...".to_string());
    let online = controller.on_startup().await;
    connecting.finish_and_clear();

    input.update_prompt(&prompt_for(online));
    write_intro(out, &controller.state())?;
    Ok(())
}

/// Send one message and render the streamed reply.
async fn run_exchange<T: ChatTransport>(
    controller: &mut ChatController<T>,
    input: &mut ChatInput,
    out: &mut SharedWriter,
    text: &str,
) -> anyhow::Result<AfterExchange> {
    let name = bot_name(&controller.state());
    let mut rx = controller.subscribe();
    let cancel = CancellationToken::new();
    let mut printer = ReplyPrinter::new();
    let mut label_written = false;
    let mut after = AfterExchange::Continue;
    let typing = spinner(format!("{name} is typing..."));

    let outcome = {
        let exchange = controller.on_send_cancellable(text, &cancel);
        tokio::pin!(exchange);

        loop {
            tokio::select! {
                outcome = &mut exchange => break outcome,

                Ok(()) = rx.changed() => {
                    let delta = printer
                        .next_delta(&rx.borrow_and_update().streaming)
                        .map(str::to_owned);
                    if let Some(delta) = delta {
                        if !label_written {
                            typing.finish_and_clear();
                            write!(out, "  {} ", bot_label(&name))?;
                            label_written = true;
                        }
                        write!(out, "{delta}")?;
                        out.flush()?;
                    }
                }

                event = input.read_line() => match event {
                    InputEvent::Interrupted => cancel.cancel(),
                    InputEvent::Eof => {
                        after = AfterExchange::Exit;
                        cancel.cancel();
                    }
                    InputEvent::Message(_) => {
                        writeln!(
                            out,
                            "\n  {}",
                            style("Still replying; that line was not sent.").dim()
                        )?;
                    }
                },
            }
        }
    };
    typing.finish_and_clear();

    let state = controller.state();
    match outcome {
        SendOutcome::Completed => {
            let reply = state
                .messages
                .last()
                .filter(|m| m.sender == Sender::Bot)
                .map(|m| m.text.as_str());
            let rest = reply.and_then(|r| printer.next_delta(r)).map(str::to_owned);
            if let Some(rest) = rest {
                if !label_written {
                    write!(out, "  {} ", bot_label(&name))?;
                }
                write!(out, "{rest}")?;
            }
            if printer.has_printed() {
                writeln!(out)?;
            } else {
                writeln!(out, "  {}", style("(empty reply)").dim())?;
            }
        }
        SendOutcome::Cancelled => {
            if printer.has_printed() {
                writeln!(out)?;
            }
            writeln!(out, "  {}", style("(reply cancelled)").dim())?;
        }
        SendOutcome::SessionReset | SendOutcome::ConnectionLost | SendOutcome::Failed => {
            if printer.has_printed() {
                writeln!(out)?;
            }
            if let Some(notice) = state.messages.last() {
                renderer::write_notice(out, &name, &notice.text)?;
            }
            if matches!(outcome, SendOutcome::ConnectionLost) {
                writeln!(out, "  {}", style("Type /reconnect to try again.").dim())?;
                input.update_prompt(&prompt_for(false));
            }
        }
        SendOutcome::Ignored => {
            if !state.online() {
                writeln!(
                    out,
                    "  {}",
                    style("Not connected. Type /reconnect to try again.").dim()
                )?;
            }
        }
    }
    writeln!(out)?;

    Ok(after)
}
