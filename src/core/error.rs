//! Application-wide error types.
//!
//! Everything here is fatal at startup. Per-turn failures (generation,
//! screening) never surface as `AppError`; the pipeline turns them into a
//! [`TurnResult`](crate::pipeline::TurnResult) instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("comms error: {0}")]
    Comms(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::prompt::PatternError> for AppError {
    fn from(e: crate::prompt::PatternError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<crate::llm::GenerationConfigError> for AppError {
    fn from(e: crate::llm::GenerationConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("GEMINI_API_KEY not set".into());
        assert!(e.to_string().starts_with("config error"));
        assert!(e.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn logger_error_display() {
        let e = AppError::Logger("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn unknown_pattern_becomes_config_error() {
        let e: AppError = crate::prompt::PatternError::UnknownPattern("socratic".into()).into();
        assert!(matches!(e, AppError::Config(_)));
        assert!(e.to_string().contains("socratic"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
