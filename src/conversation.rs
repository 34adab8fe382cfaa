//! Conversation history for one session.
//!
//! Storage grows without eviction; only the rendered context window is
//! capped. A buffer belongs to exactly one pipeline and is never shared.
//!
//! A turn keeps what was said (`text`, shown in history) apart from what
//! later prompts may quote ([`Turn::prompt_text`]). Redacted user turns and
//! display-only turns such as the web greeting differ between the two.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How many recent turns are rendered into follow-up prompts.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Replaces `text` in follow-up prompts.
    #[serde(skip)]
    redacted: Option<String>,
    #[serde(skip)]
    display_only: bool,
}

impl Turn {
    pub fn new(role: Speaker, text: impl Into<String>) -> Self {
        Self { role, text: text.into(), timestamp: Utc::now(), redacted: None, display_only: false }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    /// Quote `redacted` instead of `text` when this turn is rendered as context.
    pub fn with_redacted(mut self, redacted: impl Into<String>) -> Self {
        let redacted = redacted.into();
        self.redacted = (redacted != self.text).then_some(redacted);
        self
    }

    /// Kept in history but never rendered into a prompt.
    pub fn display_only(mut self) -> Self {
        self.display_only = true;
        self
    }

    pub fn is_display_only(&self) -> bool {
        self.display_only
    }

    /// The text follow-up prompts see.
    pub fn prompt_text(&self) -> &str {
        self.redacted.as_deref().unwrap_or(&self.text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConversationBuffer {
    turns: Vec<Turn>,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// At most the last `k` turns, oldest first.
    pub fn recent(&self, k: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(k);
        &self.turns[start..]
    }

    /// The last `k` turns that may be quoted in a prompt, oldest first.
    pub fn context(&self, k: usize) -> Vec<&Turn> {
        let mut turns: Vec<&Turn> = self.turns.iter().rev().filter(|t| !t.display_only).take(k).collect();
        turns.reverse();
        turns
    }

    /// Every stored turn, for display.
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
