//! Scripted LLM provider. Replays a canned reply (or failure) for every call.
//!
//! Clones share one call log, so a test can hand a clone to the pipeline
//! and keep the original to inspect how many calls were made and which
//! prompts were sent. Usage is reported as whitespace-separated word counts.

use std::sync::{Arc, Mutex};

use crate::llm::{GenerationConfig, GenerationError, LlmResponse, LlmUsage};

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Fail(GenerationError),
}

/// One recorded `generate` call.
#[derive(Debug, Clone)]
pub struct ScriptedCall {
    pub prompt: String,
    pub system: Option<String>,
    pub config: GenerationConfig,
}

#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    reply: ScriptedReply,
    calls: Arc<Mutex<Vec<ScriptedCall>>>,
}

impl ScriptedProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(ScriptedReply::Text(text.into()))
    }

    pub fn failing(error: GenerationError) -> Self {
        Self::new(ScriptedReply::Fail(error))
    }

    pub fn new(reply: ScriptedReply) -> Self {
        Self { reply, calls: Arc::new(Mutex::new(Vec::new())) }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        config: GenerationConfig,
        system: Option<&str>,
    ) -> Result<LlmResponse, GenerationError> {
        // A poisoned log only means a panicking test thread; keep recording.
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.push(ScriptedCall {
            prompt: prompt.to_string(),
            system: system.map(str::to_string),
            config,
        });
        drop(calls);

        match &self.reply {
            ScriptedReply::Text(text) => Ok(LlmResponse {
                text: text.clone(),
                usage: Some(LlmUsage {
                    input_tokens: prompt.split_whitespace().count() as u64,
                    output_tokens: text.split_whitespace().count() as u64,
                }),
            }),
            ScriptedReply::Fail(e) => Err(e.clone()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_else(|e| e.into_inner().len())
    }

    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls().last().map(|c| c.prompt.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_the_call_log() {
        let p = ScriptedProvider::replying("ok");
        let handle = p.clone();
        p.generate("one", GenerationConfig::default(), None).await.unwrap();
        p.generate("two", GenerationConfig::default(), Some("sys")).await.unwrap();
        assert_eq!(handle.call_count(), 2);
        assert_eq!(handle.last_prompt().as_deref(), Some("two"));
        assert_eq!(handle.calls()[1].system.as_deref(), Some("sys"));
    }

    #[tokio::test]
    async fn failing_reply_is_returned_every_time() {
        let p = ScriptedProvider::failing(GenerationError::QuotaExceeded("429".into()));
        for _ in 0..2 {
            let err = p.generate("x", GenerationConfig::default(), None).await.unwrap_err();
            assert!(matches!(err, GenerationError::QuotaExceeded(_)));
        }
        assert_eq!(p.call_count(), 2);
    }
}
