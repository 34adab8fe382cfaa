//! Prompt layer: named template strategies plus the system instruction.
//!
//! - **patterns**: the six template bodies and their default exemplars.
//! - **registry**: [`PromptTemplateRegistry`]: `PatternKind` → rendered prompt,
//!   optionally prefixed with recent conversation context.
//! - **builder**: [`PromptBuilder`]: layered fragments with single-pass
//!   `{{var}}` substitution.
//! - **system**: [`SystemInstruction`]: persona + knowledge, date-stamped.
//! - **json**: best-effort JSON extraction for `structured_output` replies.

pub mod builder;
pub mod json;
pub mod patterns;
pub mod registry;
pub mod system;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

pub use builder::PromptBuilder;
pub use json::{JsonExtractError, extract_json};
pub use patterns::Exemplar;
pub use registry::PromptTemplateRegistry;
pub use system::SystemInstruction;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unknown prompt pattern: '{0}' (expected one of: zero_shot, few_shot, chain_of_thought, role_based, structured_output, guarded)")]
    UnknownPattern(String),
}

/// Closed set of prompt strategies. Each maps to exactly one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    ZeroShot,
    FewShot,
    ChainOfThought,
    RoleBased,
    StructuredOutput,
    Guarded,
}

impl PatternKind {
    pub const ALL: [PatternKind; 6] = [
        PatternKind::ZeroShot,
        PatternKind::FewShot,
        PatternKind::ChainOfThought,
        PatternKind::RoleBased,
        PatternKind::StructuredOutput,
        PatternKind::Guarded,
    ];

    /// Canonical configuration key.
    pub fn key(self) -> &'static str {
        match self {
            PatternKind::ZeroShot => "zero_shot",
            PatternKind::FewShot => "few_shot",
            PatternKind::ChainOfThought => "chain_of_thought",
            PatternKind::RoleBased => "role_based",
            PatternKind::StructuredOutput => "structured_output",
            PatternKind::Guarded => "guarded",
        }
    }

    /// Human-readable name for demo output.
    pub fn label(self) -> &'static str {
        match self {
            PatternKind::ZeroShot => "Zero-Shot",
            PatternKind::FewShot => "Few-Shot",
            PatternKind::ChainOfThought => "Chain-of-Thought",
            PatternKind::RoleBased => "Role-Based",
            PatternKind::StructuredOutput => "Structured Output",
            PatternKind::Guarded => "Guarded",
        }
    }
}

impl FromStr for PatternKind {
    type Err = PatternError;

    /// Accepts the canonical keys plus the `cot` and `advanced` aliases.
    /// Matching is case-insensitive and `-` is treated as `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "zero_shot" => Ok(PatternKind::ZeroShot),
            "few_shot" => Ok(PatternKind::FewShot),
            "chain_of_thought" | "cot" => Ok(PatternKind::ChainOfThought),
            "role_based" => Ok(PatternKind::RoleBased),
            "structured_output" => Ok(PatternKind::StructuredOutput),
            "guarded" | "advanced" => Ok(PatternKind::Guarded),
            _ => Err(PatternError::UnknownPattern(s.to_string())),
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for kind in PatternKind::ALL {
            assert_eq!(kind.key().parse::<PatternKind>(), Ok(kind));
        }
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!("cot".parse::<PatternKind>(), Ok(PatternKind::ChainOfThought));
        assert_eq!("advanced".parse::<PatternKind>(), Ok(PatternKind::Guarded));
        assert_eq!("Few-Shot".parse::<PatternKind>(), Ok(PatternKind::FewShot));
    }

    #[test]
    fn unknown_key_never_falls_back() {
        let err = "socratic".parse::<PatternKind>().unwrap_err();
        assert_eq!(err, PatternError::UnknownPattern("socratic".into()));
        assert!("".parse::<PatternKind>().is_err());
    }

    #[test]
    fn serializes_as_key() {
        let v = serde_json::to_value(PatternKind::StructuredOutput).unwrap();
        assert_eq!(v, serde_json::json!("structured_output"));
    }
}
