//! Dummy LLM provider: echoes the prompt back prefixed with `[echo]`.
//! Used for running the console end-to-end without a real API key.

use crate::llm::{GenerationConfig, GenerationError, LlmResponse};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn generate(
        &self,
        prompt: &str,
        _config: GenerationConfig,
        _system: Option<&str>,
    ) -> Result<LlmResponse, GenerationError> {
        Ok(LlmResponse {
            text: format!("[echo] {prompt}"),
            usage: None,
        })
    }
}
