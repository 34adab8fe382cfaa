//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! One request per turn: an optional `system` message followed by the
//! rendered prompt as the `user` message. History is already folded into
//! the prompt by the registry.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use super::{classify_status, classify_transport};
use crate::llm::{GenerationConfig, GenerationError, LlmResponse, LlmUsage, ProviderError};

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    endpoint: String,
    model: String,
    /// `None` for keyless local servers.
    bearer: Option<String>,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        endpoint: String,
        model: String,
        timeout_seconds: u64,
        bearer: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Setup(format!("openai http client: {e}")))?;
        Ok(Self { client, endpoint, model, bearer })
    }

    pub async fn generate(
        &self,
        prompt: &str,
        config: GenerationConfig,
        system: Option<&str>,
    ) -> Result<LlmResponse, GenerationError> {
        let body = CompletionRequest::new(&self.model, prompt, config, system);
        debug!(
            model = %self.model,
            temperature = body.temperature,
            max_tokens = body.max_tokens,
            prompt_len = prompt.len(),
            "sending openai request"
        );
        trace!(body = ?body, "openai request body");

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!(endpoint = %self.endpoint, error = %e, "openai request failed to send");
            classify_transport(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = describe_failure(status, &raw);
            error!(%status, %message, "openai returned an error status");
            return Err(classify_status(status.as_u16(), message));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ServiceError(format!("unreadable openai response: {e}")))?;
        trace!(completion = ?completion, "openai response body");

        completion.into_llm_response()
    }
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl<'a> CompletionRequest<'a> {
    fn new(model: &'a str, prompt: &'a str, config: GenerationConfig, system: Option<&'a str>) -> Self {
        let messages = system
            .map(|content| ChatMessage { role: "system", content })
            .into_iter()
            .chain(std::iter::once(ChatMessage { role: "user", content: prompt }))
            .collect();
        Self {
            model,
            messages,
            temperature: config.temperature(),
            max_tokens: config.max_output_tokens(),
            top_p: config.top_p(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl CompletionResponse {
    fn into_llm_response(self) -> Result<LlmResponse, GenerationError> {
        let usage = self.usage.map(|u| LlmUsage { input_tokens: u.prompt_tokens, output_tokens: u.completion_tokens });
        let text = self
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(GenerationError::ServiceError("openai reply had no text".into()));
        }
        Ok(LlmResponse { text, usage })
    }
}

/// `{"error": {"message", "code"}}` flattened to one line; raw body otherwise.
fn describe_failure(status: StatusCode, raw: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        message: String,
        code: Option<serde_json::Value>,
    }

    match serde_json::from_str::<Envelope>(raw) {
        Ok(Envelope { error: Detail { message, code: Some(serde_json::Value::String(code)) } }) => {
            format!("HTTP {status} [code={code}]: {message}")
        }
        Ok(Envelope { error: Detail { message, code: Some(code) } }) => {
            format!("HTTP {status} [code={code}]: {message}")
        }
        Ok(Envelope { error: Detail { message, code: None } }) => format!("HTTP {status}: {message}"),
        Err(_) => format!("HTTP {status}: {raw}"),
    }
}
