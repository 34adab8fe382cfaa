//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory, called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod gemini;
pub mod openai_compatible;
pub mod scripted;

use crate::config::LlmConfig;
use crate::llm::{GenerationError, LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and an optional API key.
///
/// `api_key` is sourced from the env var named by `[llm] api_key_env`
/// (never TOML). Startup has already rejected a missing key for backends
/// that need one.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "gemini" => {
            let g = &config.gemini;
            let key = api_key.ok_or_else(|| {
                ProviderError::Setup(format!("{} is required for the gemini provider", config.api_key_env))
            })?;
            let p = gemini::GeminiProvider::new(
                g.api_base_url.clone(),
                g.model.clone(),
                g.timeout_seconds,
                key,
            )?;
            Ok(LlmProvider::Gemini(p))
        }
        "openai" | "openai-compatible" => {
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                oai.api_base_url.clone(),
                oai.model.clone(),
                oai.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

/// Whether the named backend refuses to start without an API key.
pub fn requires_api_key(provider: &str) -> bool {
    matches!(provider, "gemini" | "openai" | "openai-compatible")
}

/// Map a non-success HTTP status (plus its flattened error text) to a
/// [`GenerationError`] kind.
pub(crate) fn classify_status(status: u16, message: String) -> GenerationError {
    let upper = message.to_ascii_uppercase();
    match status {
        401 | 403 => GenerationError::InvalidCredential(message),
        429 => GenerationError::QuotaExceeded(message),
        408 | 504 => GenerationError::Timeout(message),
        _ if upper.contains("RESOURCE_EXHAUSTED") || upper.contains("QUOTA") => {
            GenerationError::QuotaExceeded(message)
        }
        _ if upper.contains("API KEY") || upper.contains("API_KEY") => {
            GenerationError::InvalidCredential(message)
        }
        _ => GenerationError::ServiceError(message),
    }
}

pub(crate) fn classify_transport(e: &reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout(e.to_string())
    } else {
        GenerationError::ServiceError(e.to_string())
    }
}
