//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `WCC_BOT_LOG_LEVEL` and `WCC_BOT_PATTERN` env overrides.
//!
//! # Module layout
//!
//! - **types**: Public configuration structs (`Config`, `LlmConfig`,
//!   `PipelineConfig`, etc.).
//! - **raw**: Raw TOML deserialization types (`RawConfig`, `RawLlm`, …).
//!   These mirror the file shape and use serde defaults; kept private.
//! - **load**: Loading logic: `merge_toml`, `read_layered`, `load`,
//!   `load_from`, `expand_home`.

mod load;
mod raw;
mod types;

use std::time::Duration;

pub use load::{expand_home, load, load_from};
pub use types::*;

impl Config {
    /// Safe `Config` for tests and offline runs: dummy LLM, no API key,
    /// no external calls.
    pub fn test_default() -> Self {
        Self {
            bot_name: "test".into(),
            log_level: "info".into(),
            llm: LlmConfig {
                provider: "dummy".into(),
                api_key_env: "GEMINI_API_KEY".into(),
                gemini: GeminiConfig {
                    api_base_url: "http://localhost:0/v1beta".into(),
                    model: "gemini-test".into(),
                    timeout_seconds: 1,
                },
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                },
            },
            generation: crate::llm::GenerationConfig::default(),
            pipeline: PipelineConfig {
                pattern: crate::prompt::PatternKind::Guarded,
                secure: true,
                context_window: crate::conversation::DEFAULT_CONTEXT_WINDOW,
                search: true,
            },
            knowledge_file: None,
            comms: CommsConfig {
                pty: PtyConfig { enabled: true },
                axum_channel: AxumChannelConfig {
                    enabled: false,
                    bind: "127.0.0.1:0".into(),
                    session_idle: Duration::from_secs(30 * 60),
                },
            },
            llm_api_key: None,
        }
    }
}
