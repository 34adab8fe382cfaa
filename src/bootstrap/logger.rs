//! tracing-subscriber setup.
//!
//! Logs go to stderr; stdout belongs to the console channel.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// HTTP client internals stay at `warn` unless `RUST_LOG` names them.
const QUIET_DEPENDENCIES: &[&str] = &["hyper_util=warn", "reqwest=warn", "h2=warn"];

/// Install the global subscriber. Call once, after config is resolved.
///
/// With `cli_override` set (a `-v` flag was given) `level` wins over
/// `RUST_LOG`; otherwise `RUST_LOG` wins and `level` is the fallback.
pub fn init(level: &str, cli_override: bool) -> Result<(), AppError> {
    let filter = resolve_filter(level, cli_override)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

fn resolve_filter(level: &str, cli_override: bool) -> Result<EnvFilter, AppError> {
    let from_level = EnvFilter::try_new(level);
    let filter = if cli_override {
        from_level.or_else(|level_err| {
            EnvFilter::try_from_default_env().map_err(|env_err| {
                AppError::Logger(format!("bad log level '{level}' ({level_err}) and bad RUST_LOG ({env_err})"))
            })
        })?
    } else {
        EnvFilter::try_from_default_env()
            .or(from_level)
            .map_err(|e| AppError::Logger(format!("bad log level '{level}': {e}")))?
    };

    Ok(QUIET_DEPENDENCIES
        .iter()
        .filter_map(|d| d.parse().ok())
        .fold(filter, |f, d| f.add_directive(d)))
}

/// `-v` count to level: one is warn, two info, three debug, more is trace
/// (trace also dumps prompts and provider payloads).
pub fn level_for_verbosity(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_is_used_when_valid() {
        let filter = resolve_filter("debug", true).unwrap();
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    fn http_dependencies_are_quieted() {
        let rendered = resolve_filter("trace", true).unwrap().to_string();
        assert!(rendered.contains("reqwest=warn"));
        assert!(rendered.contains("hyper_util=warn"));
    }

    #[test]
    fn verbosity_tiers() {
        assert_eq!(level_for_verbosity(0), None);
        assert_eq!(level_for_verbosity(1), Some("warn"));
        assert_eq!(level_for_verbosity(2), Some("info"));
        assert_eq!(level_for_verbosity(3), Some("debug"));
        assert_eq!(level_for_verbosity(9), Some("trace"));
    }

    #[test]
    fn second_init_reports_subscriber_error() {
        let _ = init("info", false);
        match init("info", false) {
            Err(AppError::Logger(msg)) => assert!(msg.contains("set subscriber")),
            other => panic!("expected logger error, got {other:?}"),
        }
    }
}
