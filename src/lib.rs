// Library root. The binary entry point is src/main.rs.

pub mod core;
pub mod bootstrap;
pub mod llm;
pub mod prompt;
pub mod conversation;
pub mod knowledge;
pub mod pipeline;
pub mod runtime;
pub mod comms;
pub mod demo;

pub use core::{config, error};
