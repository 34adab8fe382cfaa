//! PTY (console) comms channel. Reads lines from stdin, runs each through
//! the session pipeline, prints the reply to stdout.
//!
//! Runs until the member types `quit` / `exit` / `bye`, stdin is closed, or
//! the `shutdown` token is cancelled (Ctrl-C). The loop itself is
//! [`run_console`], generic over its reader and writer so tests can drive
//! it without a terminal.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::pipeline::MessagePipeline;
use crate::runtime::{Component, ComponentFuture};

use super::state::CommsState;

pub const FAREWELL: &str =
    "Thanks for chatting! Remember to check out our upcoming events. Keep coding! 💪";

const RULE: &str = "--------------------------------------------------";

// ── Commands ─────────────────────────────────────────────────────────────────

/// One line of console input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand<'a> {
    Quit,
    Clear,
    Empty,
    Message(&'a str),
}

impl<'a> ConsoleCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ConsoleCommand::Empty;
        }
        match trimmed.to_lowercase().as_str() {
            "quit" | "exit" | "bye" => ConsoleCommand::Quit,
            "clear" => ConsoleCommand::Clear,
            _ => ConsoleCommand::Message(trimmed),
        }
    }
}

/// Why the console loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Quit,
    Eof,
    Shutdown,
}

// ── PtyChannel ───────────────────────────────────────────────────────────────

pub struct PtyChannel {
    channel_id: String,
    state: Arc<CommsState>,
}

impl PtyChannel {
    pub fn new(channel_id: impl Into<String>, state: Arc<CommsState>) -> Self {
        Self { channel_id: channel_id.into(), state }
    }
}

impl Component for PtyChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn ends_session(&self) -> bool {
        true
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_pty(self.channel_id, self.state, shutdown))
    }
}

async fn run_pty(channel_id: String, state: Arc<CommsState>, shutdown: CancellationToken) -> Result<(), AppError> {
    info!(%channel_id, "pty channel started");
    let mut pipeline = state.new_pipeline();

    let reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    let exit = run_console(reader, &mut writer, &mut pipeline, state.bot_name(), &shutdown).await?;

    info!(%channel_id, ?exit, turns = pipeline.buffer().len(), "pty channel closed");
    Ok(())
}

// ── run_console ──────────────────────────────────────────────────────────────

/// Drive one console conversation over `reader` / `writer`.
///
/// A turn in flight is abandoned when `shutdown` fires; the buffer is left
/// as it was before that turn.
pub async fn run_console<R, W>(
    reader: R,
    writer: &mut W,
    pipeline: &mut MessagePipeline,
    bot_name: &str,
    shutdown: &CancellationToken,
) -> Result<ConsoleExit, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    let banner = format!(
        "🌟 Welcome to {bot_name}! 🌟\nAsk me anything about Women Coding Community!\nType 'quit' to exit, 'clear' to start over\n\n"
    );
    writer.write_all(banner.as_bytes()).await?;

    loop {
        writer.write_all(b"You: ").await?;
        writer.flush().await?;

        let line = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                writer.write_all(b"\n").await?;
                return Ok(ConsoleExit::Shutdown);
            }

            line = lines.next_line() => line,
        };

        let input = match line {
            Err(e) => {
                warn!("pty read error: {e}");
                return Ok(ConsoleExit::Eof);
            }
            Ok(None) => {
                debug!("pty stdin closed");
                writer.write_all(b"\n").await?;
                return Ok(ConsoleExit::Eof);
            }
            Ok(Some(input)) => input,
        };

        match ConsoleCommand::parse(&input) {
            ConsoleCommand::Empty => continue,
            ConsoleCommand::Quit => {
                writer.write_all(format!("{bot_name}: {FAREWELL}\n").as_bytes()).await?;
                writer.flush().await?;
                return Ok(ConsoleExit::Quit);
            }
            ConsoleCommand::Clear => {
                pipeline.clear();
                writer.write_all(b"Conversation history cleared.\n\n").await?;
            }
            ConsoleCommand::Message(text) => {
                debug!(chars = text.len(), "pty received line");

                let result = tokio::select! {
                    biased;

                    _ = shutdown.cancelled() => {
                        writer.write_all(b"\n").await?;
                        return Ok(ConsoleExit::Shutdown);
                    }

                    result = pipeline.process(text) => result,
                };

                let mut out = format!("\n{bot_name}: {}\n", result.response_text);
                if let Some(query) = &result.search_query {
                    out.push_str(&format!("[Used search for: {query}]\n"));
                }
                out.push_str(RULE);
                out.push_str("\n\n");
                writer.write_all(out.as_bytes()).await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProvider;
    use crate::llm::providers::scripted::ScriptedProvider;
    use crate::pipeline::PipelineBuilder;

    fn pipeline(reply: &str) -> (ScriptedProvider, MessagePipeline) {
        let stub = ScriptedProvider::replying(reply);
        let p = PipelineBuilder::new(LlmProvider::Scripted(stub.clone())).build();
        (stub, p)
    }

    async fn drive(input: &str, pipeline: &mut MessagePipeline) -> (ConsoleExit, String) {
        let mut out = Vec::new();
        let exit = run_console(input.as_bytes(), &mut out, pipeline, "WCC Bot", &CancellationToken::new())
            .await
            .unwrap();
        (exit, String::from_utf8(out).unwrap())
    }

    #[test]
    fn parse_commands() {
        assert_eq!(ConsoleCommand::parse("  QUIT "), ConsoleCommand::Quit);
        assert_eq!(ConsoleCommand::parse("Bye"), ConsoleCommand::Quit);
        assert_eq!(ConsoleCommand::parse("exit"), ConsoleCommand::Quit);
        assert_eq!(ConsoleCommand::parse("clear"), ConsoleCommand::Clear);
        assert_eq!(ConsoleCommand::parse("   "), ConsoleCommand::Empty);
        assert_eq!(ConsoleCommand::parse(" hi there "), ConsoleCommand::Message("hi there"));
    }

    #[tokio::test]
    async fn message_then_quit() {
        let (stub, mut p) = pipeline("We run mentorship.");
        let (exit, out) = drive("What is WCC?\n\nquit\nnever read\n", &mut p).await;
        assert_eq!(exit, ConsoleExit::Quit);
        assert!(out.contains("WCC Bot: We run mentorship."));
        assert!(out.contains(FAREWELL));
        assert_eq!(stub.call_count(), 1);
        assert_eq!(p.buffer().len(), 2);
    }

    #[tokio::test]
    async fn clear_resets_history() {
        let (_, mut p) = pipeline("ok");
        let (exit, out) = drive("one\nclear\n", &mut p).await;
        assert_eq!(exit, ConsoleExit::Eof);
        assert!(out.contains("Conversation history cleared."));
        assert!(p.buffer().is_empty());
    }

    #[tokio::test]
    async fn search_query_is_echoed() {
        let stub = ScriptedProvider::replying("Events!");
        let mut p = PipelineBuilder::new(LlmProvider::Scripted(stub)).search(true).build();
        let (_, out) = drive("Any upcoming events?\n", &mut p).await;
        assert!(out.contains("[Used search for: Any upcoming events?]"));
    }

    #[tokio::test]
    async fn cancelled_before_input() {
        let (stub, mut p) = pipeline("unused");
        let token = CancellationToken::new();
        token.cancel();
        let mut out = Vec::new();
        let exit = run_console(&b"hello\n"[..], &mut out, &mut p, "WCC Bot", &token).await.unwrap();
        assert_eq!(exit, ConsoleExit::Shutdown);
        assert_eq!(stub.call_count(), 0);
    }
}
