//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies `WCC_BOT_LOG_LEVEL` and `WCC_BOT_PATTERN` env overrides.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::AppError;
use crate::llm::GenerationConfig;
use crate::prompt::PatternKind;

use super::raw::RawConfig;
use super::types::*;

/// Accepted when the configured key variable is the Gemini default and unset.
const FALLBACK_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Overlay wins key by key inside tables; any other value is replaced whole.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut merged), toml::Value::Table(changes)) => {
            for (key, value) in changes {
                let value = match merged.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            toml::Value::Table(merged)
        }
        (_, replacement) => replacement,
    }
}

/// `[meta] base`, resolved relative to the file that names it.
fn base_of(path: &Path, doc: &toml::Value) -> Option<PathBuf> {
    let base = doc.get("meta")?.get("base")?.as_str()?;
    let base = Path::new(base);
    if base.is_absolute() {
        Some(base.to_path_buf())
    } else {
        Some(path.parent().unwrap_or(Path::new(".")).join(base))
    }
}

/// Parse `path` and everything beneath it in its base chain, merged bottom-up.
fn read_layered(path: &Path, seen: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !seen.insert(key) {
        return Err(AppError::Config(format!("config base chain loops back to {}", path.display())));
    }

    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    let doc: toml::Value =
        toml::from_str(&text).map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;

    match base_of(path, &doc) {
        Some(base) => Ok(merge_toml(read_layered(&base, seen)?, doc)),
        None => Ok(doc),
    }
}

/// Load `config_path`, or `config/default.toml` when it exists, or the
/// built-in defaults. `WCC_BOT_LOG_LEVEL` and `WCC_BOT_PATTERN` are applied
/// on top.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let log_level = env::var("WCC_BOT_LOG_LEVEL").ok();
    let pattern = env::var("WCC_BOT_PATTERN").ok();

    let path = match config_path {
        Some(p) => Path::new(p),
        None => Path::new("config/default.toml"),
    };
    if config_path.is_none() && !path.exists() {
        return resolve(RawConfig::default(), log_level.as_deref(), pattern.as_deref(), env_lookup);
    }
    load_from(path, log_level.as_deref(), pattern.as_deref())
}

/// Load a specific file with explicit overrides; tests use this instead of
/// setting env vars.
pub fn load_from(
    path: &Path,
    log_level_override: Option<&str>,
    pattern_override: Option<&str>,
) -> Result<Config, AppError> {
    let layered = read_layered(path, &mut HashSet::new())?;
    let parsed = RawConfig::deserialize(layered)
        .map_err(|e| AppError::Config(format!("config error in {}: {e}", path.display())))?;
    resolve(parsed, log_level_override, pattern_override, env_lookup)
}

fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn resolve(
    parsed: RawConfig,
    log_level_override: Option<&str>,
    pattern_override: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, AppError> {
    let log_level = log_level_override.unwrap_or(&parsed.app.log_level).to_string();

    let pattern: PatternKind = pattern_override.unwrap_or(&parsed.pipeline.pattern).parse()?;

    let g = parsed.generation;
    let generation = GenerationConfig::new(g.temperature, g.max_output_tokens, g.top_p)?;

    if parsed.pipeline.context_window == 0 {
        return Err(AppError::Config("pipeline.context_window must be > 0".into()));
    }
    if parsed.comms.axum_channel.session_idle_minutes == 0 {
        return Err(AppError::Config("comms.axum_channel.session_idle_minutes must be > 0".into()));
    }

    let llm_api_key = resolve_api_key(&parsed.llm.api_key_env, lookup);

    Ok(Config {
        bot_name: parsed.app.bot_name,
        log_level,
        llm: LlmConfig {
            provider: parsed.llm.provider,
            api_key_env: parsed.llm.api_key_env,
            gemini: GeminiConfig {
                api_base_url: parsed.llm.gemini.api_base_url,
                model: parsed.llm.gemini.model,
                timeout_seconds: parsed.llm.gemini.timeout_seconds,
            },
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        generation,
        pipeline: PipelineConfig {
            pattern,
            secure: parsed.pipeline.secure,
            context_window: parsed.pipeline.context_window,
            search: parsed.pipeline.search,
        },
        knowledge_file: parsed.knowledge.faq_file.as_deref().map(expand_home),
        comms: CommsConfig {
            pty: PtyConfig { enabled: parsed.comms.pty.enabled },
            axum_channel: AxumChannelConfig {
                enabled: parsed.comms.axum_channel.enabled,
                bind: parsed.comms.axum_channel.bind,
                session_idle: Duration::from_secs(parsed.comms.axum_channel.session_idle_minutes * 60),
            },
        },
        llm_api_key,
    })
}

/// Look up the API key in `env_name`, falling back to `GOOGLE_API_KEY` for
/// the default Gemini variable. Blank values count as unset.
fn resolve_api_key(env_name: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    present(env_name).or_else(|| {
        if env_name == "GEMINI_API_KEY" {
            present(FALLBACK_API_KEY_ENV)
        } else {
            None
        }
    })
}

/// `~` or `~/...` under the home directory; anything else as given.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') => match dirs::home_dir() {
            Some(h) => h.join(&rest[1..]),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    }
}
