//! Google Gemini provider (`models/{model}:generateContent`).
//!
//! The API key travels in the `x-goog-api-key` header. The system
//! instruction uses Gemini's native `systemInstruction` field instead of
//! being prepended to the user text.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use super::{classify_status, classify_transport};
use crate::llm::{GenerationConfig, GenerationError, LlmResponse, LlmUsage, ProviderError};

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(
        api_base_url: String,
        model: String,
        timeout_seconds: u64,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::Setup("gemini API key is empty".into()));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Setup(format!("failed to build HTTP client: {e}")))?;

        let endpoint = format!("{}/models/{}:generateContent", api_base_url.trim_end_matches('/'), model);
        Ok(Self { client, endpoint, model, api_key })
    }

    pub async fn generate(
        &self,
        prompt: &str,
        config: GenerationConfig,
        system: Option<&str>,
    ) -> Result<LlmResponse, GenerationError> {
        let payload = build_request(prompt, config, system);

        debug!(
            model = %self.model,
            temperature = config.temperature(),
            max_output_tokens = config.max_output_tokens(),
            prompt_len = prompt.len(),
            "sending gemini request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full gemini request payload");
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "gemini HTTP request failed (transport)");
                classify_transport(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            let message = error_message(status, &body);
            error!(%status, %message, "gemini request returned HTTP error");
            return Err(classify_status(status.as_u16(), message));
        }

        let parsed = response.json::<GenerateContentResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize gemini response");
            GenerationError::ServiceError(format!("failed to parse response body: {e}"))
        })?;

        into_response(parsed)
    }
}

fn build_request(prompt: &str, config: GenerationConfig, system: Option<&str>) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".into()),
            parts: vec![Part { text: prompt.to_string() }],
        }],
        system_instruction: system.map(|s| Content {
            role: None,
            parts: vec![Part { text: s.to_string() }],
        }),
        generation_config: WireGenerationConfig {
            temperature: config.temperature(),
            max_output_tokens: config.max_output_tokens(),
            top_p: config.top_p(),
        },
    }
}

fn into_response(parsed: GenerateContentResponse) -> Result<LlmResponse, GenerationError> {
    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::ServiceError(format!("prompt blocked by provider: {reason}")));
    }

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(GenerationError::ServiceError("empty or missing content in response".into()));
    }

    let usage = parsed.usage_metadata.map(|u| LlmUsage {
        input_tokens: u.prompt_token_count,
        output_tokens: u.candidates_token_count,
    });

    Ok(LlmResponse { text, usage })
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => {
            let code = env.error.status.map(|s| format!(" [status={s}]")).unwrap_or_default();
            format!("HTTP {status}{code}: {}", env.error.message)
        }
        Err(_) => format!("HTTP {status}: {body}"),
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_rejected() {
        let err = GeminiProvider::new("http://x".into(), "m".into(), 1, "  ".into()).unwrap_err();
        assert!(matches!(err, ProviderError::Setup(_)));
    }

    #[test]
    fn endpoint_joins_model() {
        let p = GeminiProvider::new("http://x/v1beta/".into(), "gemini-2.0-flash".into(), 1, "k".into())
            .unwrap();
        assert_eq!(p.endpoint, "http://x/v1beta/models/gemini-2.0-flash:generateContent");
    }

    #[test]
    fn request_uses_camel_case_wire_names() {
        let cfg = GenerationConfig::new(0.3, 150, 0.8).unwrap();
        let v = serde_json::to_value(build_request("hi", cfg, Some("persona"))).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(v["systemInstruction"]["parts"][0]["text"], "persona");
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 150);
        assert!(v["generationConfig"]["topP"].as_f64().unwrap() > 0.79);
    }

    #[test]
    fn system_instruction_omitted_when_absent() {
        let v = serde_json::to_value(build_request("hi", GenerationConfig::default(), None)).unwrap();
        assert!(v.get("systemInstruction").is_none());
    }

    #[test]
    fn parses_candidate_parts_and_usage() {
        let body = r#"{
            "candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"there"}]}}],
            "usageMetadata":{"promptTokenCount":12,"candidatesTokenCount":4}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let r = into_response(parsed).unwrap();
        assert_eq!(r.text, "Hello there");
        assert_eq!(r.usage, Some(LlmUsage { input_tokens: 12, output_tokens: 4 }));
    }

    #[test]
    fn blocked_prompt_is_service_error() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let err = into_response(parsed).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn quota_error_body_classified() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let m = error_message(reqwest::StatusCode::TOO_MANY_REQUESTS, body);
        assert!(m.contains("RESOURCE_EXHAUSTED"));
        assert!(matches!(classify_status(429, m), GenerationError::QuotaExceeded(_)));
    }
}
