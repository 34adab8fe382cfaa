//! Shared state for the comms channels.
//!
//! Channels receive an `Arc<CommsState>` and build their per-session
//! pipelines from the shared blueprint. Nothing here is mutable; each
//! channel owns the pipelines it creates.

use crate::pipeline::{MessagePipeline, PipelineBuilder};

/// Shared state passed as `Arc<CommsState>` to every channel task.
pub struct CommsState {
    blueprint: PipelineBuilder,
    bot_name: String,
}

impl CommsState {
    pub fn new(blueprint: PipelineBuilder, bot_name: impl Into<String>) -> Self {
        Self { blueprint, bot_name: bot_name.into() }
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    pub fn blueprint(&self) -> &PipelineBuilder {
        &self.blueprint
    }

    /// A fresh pipeline with its own empty conversation.
    pub fn new_pipeline(&self) -> MessagePipeline {
        self.blueprint.build()
    }
}
