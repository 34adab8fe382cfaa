//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are immutable; clone them freely.
//! Every call takes its [`GenerationConfig`] by value; providers keep no
//! per-conversation state between calls.

pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure of a single generation call. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation timed out: {0}")]
    Timeout(String),
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    #[error("service error: {0}")]
    ServiceError(String),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider setup failed: {0}")]
    Setup(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationConfigError {
    #[error("temperature must be within [0, 2], got {0}")]
    Temperature(f32),
    #[error("max_output_tokens must be > 0")]
    MaxOutputTokens,
    #[error("top_p must be within (0, 1], got {0}")]
    TopP(f32),
}

// ── GenerationConfig ──────────────────────────────────────────────────────────

/// Sampling parameters for one generation call.
///
/// Fields are private so every instance has passed [`GenerationConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
}

impl GenerationConfig {
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 200;
    pub const DEFAULT_TOP_P: f32 = 0.9;

    pub fn new(temperature: f32, max_output_tokens: u32, top_p: f32) -> Result<Self, GenerationConfigError> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(GenerationConfigError::Temperature(temperature));
        }
        if max_output_tokens == 0 {
            return Err(GenerationConfigError::MaxOutputTokens);
        }
        if !(top_p > 0.0 && top_p <= 1.0) {
            return Err(GenerationConfigError::TopP(top_p));
        }
        Ok(Self { temperature, max_output_tokens, top_p })
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: Self::DEFAULT_TEMPERATURE,
            max_output_tokens: Self::DEFAULT_MAX_OUTPUT_TOKENS,
            top_p: Self::DEFAULT_TOP_P,
        }
    }
}

// ── Response ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Option<LlmUsage>,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `generate` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    Scripted(providers::scripted::ScriptedProvider),
    Gemini(providers::gemini::GeminiProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl LlmProvider {
    /// Send `prompt` to the provider and return its text reply.
    ///
    /// `system` is passed as the provider's native system instruction when
    /// the backend supports one.
    pub async fn generate(
        &self,
        prompt: &str,
        config: GenerationConfig,
        system: Option<&str>,
    ) -> Result<LlmResponse, GenerationError> {
        match self {
            LlmProvider::Dummy(p) => p.generate(prompt, config, system).await,
            LlmProvider::Scripted(p) => p.generate(prompt, config, system).await,
            LlmProvider::Gemini(p) => p.generate(prompt, config, system).await,
            LlmProvider::OpenAiCompatible(p) => p.generate(prompt, config, system).await,
        }
    }

    /// Short backend name for logs and status output.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::Scripted(_) => "scripted",
            LlmProvider::Gemini(_) => "gemini",
            LlmProvider::OpenAiCompatible(_) => "openai",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_widget_defaults() {
        let c = GenerationConfig::default();
        assert_eq!(c.temperature(), 0.7);
        assert_eq!(c.max_output_tokens(), 200);
        assert_eq!(c.top_p(), 0.9);
    }

    #[test]
    fn closed_bounds_are_accepted() {
        assert!(GenerationConfig::new(0.0, 1, 1.0).is_ok());
        assert!(GenerationConfig::new(2.0, 500, 0.1).is_ok());
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert_eq!(
            GenerationConfig::new(2.1, 200, 0.9),
            Err(GenerationConfigError::Temperature(2.1))
        );
        assert_eq!(
            GenerationConfig::new(-0.1, 200, 0.9),
            Err(GenerationConfigError::Temperature(-0.1))
        );
        assert_eq!(
            GenerationConfig::new(0.7, 0, 0.9),
            Err(GenerationConfigError::MaxOutputTokens)
        );
        assert_eq!(GenerationConfig::new(0.7, 200, 0.0), Err(GenerationConfigError::TopP(0.0)));
        assert_eq!(GenerationConfig::new(0.7, 200, 1.5), Err(GenerationConfigError::TopP(1.5)));
    }

    #[test]
    fn nan_temperature_rejected() {
        assert!(GenerationConfig::new(f32::NAN, 200, 0.9).is_err());
        assert!(GenerationConfig::new(0.7, 200, f32::NAN).is_err());
    }

    #[tokio::test]
    async fn provider_name_matches_variant() {
        let p = LlmProvider::Dummy(providers::dummy::DummyProvider);
        assert_eq!(p.name(), "dummy");
        let reply = p.generate("hi", GenerationConfig::default(), None).await.unwrap();
        assert_eq!(reply.text, "[echo] hi");
    }
}
