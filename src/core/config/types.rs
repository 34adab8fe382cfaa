//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the rest of the crate
//! consumes. Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;
use std::time::Duration;

use crate::llm::GenerationConfig;
use crate::prompt::PatternKind;

// ── Comms ───────────────────────────────────────────────────────────────────

/// PTY (console) channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Whether the PTY channel is explicitly enabled.
    pub enabled: bool,
}

/// Axum HTTP channel configuration (web widget).
#[derive(Debug, Clone)]
pub struct AxumChannelConfig {
    /// Whether the axum channel is explicitly enabled.
    pub enabled: bool,
    /// Socket address to bind the axum listener to.
    pub bind: String,
    /// Web sessions untouched for this long are dropped.
    pub session_idle: Duration,
}

#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub pty: PtyConfig,
    pub axum_channel: AxumChannelConfig,
}

// ── LLM ──────────────────────────────────────────────────────────────────────

/// Google Generative Language API settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL up to and including the API version, e.g. `…/v1beta`.
    pub api_base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

/// OpenAI-compatible chat completion settings.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full endpoint URL, e.g. `https://api.openai.com/v1/chat/completions`.
    pub api_base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Active backend: `gemini`, `openai` or `dummy`.
    pub provider: String,
    /// Name of the env var holding the API key.
    pub api_key_env: String,
    pub gemini: GeminiConfig,
    pub openai: OpenAiConfig,
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub pattern: PatternKind,
    /// Wire input/output screening into the pipeline.
    pub secure: bool,
    /// Number of prior turns rendered into follow-up prompts.
    pub context_window: usize,
    /// Consult the mock search table for recency queries.
    pub search: bool,
}

// ── Top-level ────────────────────────────────────────────────────────────────

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    pub log_level: String,
    pub llm: LlmConfig,
    pub generation: GenerationConfig,
    pub pipeline: PipelineConfig,
    /// FAQ JSON file folded into the system instruction.
    pub knowledge_file: Option<PathBuf>,
    pub comms: CommsConfig,
    /// Read from the env var named by `llm.api_key_env`, never from TOML.
    pub llm_api_key: Option<String>,
}
