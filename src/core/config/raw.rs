//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape, the serde target before resolution.
#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub app: RawApp,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub generation: RawGeneration,
    #[serde(default)]
    pub pipeline: RawPipeline,
    #[serde(default)]
    pub knowledge: RawKnowledge,
    #[serde(default)]
    pub comms: RawComms,
}

#[derive(Deserialize)]
pub(super) struct RawApp {
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RawApp {
    fn default() -> Self {
        Self { bot_name: default_bot_name(), log_level: default_log_level() }
    }
}

// ── LLM ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub gemini: RawGeminiConfig,
    #[serde(default)]
    pub openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key_env: default_api_key_env(),
            gemini: RawGeminiConfig::default(),
            openai: RawOpenAiConfig::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawGeminiConfig {
    #[serde(default = "default_gemini_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawGeminiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_gemini_api_base_url(),
            model: default_gemini_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// ── Generation ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawGeneration {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for RawGeneration {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            top_p: default_top_p(),
        }
    }
}

// ── Pipeline ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawPipeline {
    #[serde(default = "default_pattern")]
    pub pattern: String,
    #[serde(default = "default_true")]
    pub secure: bool,
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    #[serde(default = "default_true")]
    pub search: bool,
}

impl Default for RawPipeline {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            secure: true,
            context_window: default_context_window(),
            search: true,
        }
    }
}

#[derive(Deserialize, Default)]
pub(super) struct RawKnowledge {
    #[serde(default)]
    pub faq_file: Option<String>,
}

// ── Comms ───────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawComms {
    #[serde(default)]
    pub pty: RawPty,
    #[serde(default)]
    pub axum_channel: RawAxumChannel,
}

#[derive(Deserialize)]
pub(super) struct RawPty {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for RawPty {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Deserialize)]
pub(super) struct RawAxumChannel {
    #[serde(default = "default_false")]
    pub enabled: bool,
    #[serde(default = "default_http_bind")]
    pub bind: String,
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,
}

impl Default for RawAxumChannel {
    fn default() -> Self {
        Self { enabled: false, bind: default_http_bind(), session_idle_minutes: default_session_idle_minutes() }
    }
}

// ── Defaults ────────────────────────────────────────────────────────────────

fn default_bot_name() -> String {
    "WCC Alexa".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_openai_api_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_temperature() -> f32 {
    crate::llm::GenerationConfig::DEFAULT_TEMPERATURE
}

fn default_max_output_tokens() -> u32 {
    crate::llm::GenerationConfig::DEFAULT_MAX_OUTPUT_TOKENS
}

fn default_top_p() -> f32 {
    crate::llm::GenerationConfig::DEFAULT_TOP_P
}

fn default_pattern() -> String {
    "guarded".to_string()
}

fn default_context_window() -> usize {
    crate::conversation::DEFAULT_CONTEXT_WINDOW
}

fn default_http_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_session_idle_minutes() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}
