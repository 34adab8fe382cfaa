//! Heuristic text screening.
//!
//! A [`Screener`] is an ordered list of [`Detector`]s. Each detector looks
//! at the text left by the previous one, so a redaction early in the list
//! is what later detectors (and the model) see.
//!
//! This is a best-effort filter for a community FAQ bot, not a trust
//! boundary.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const EMAIL_PLACEHOLDER: &str = "[EMAIL_REDACTED]";
pub const ID_PLACEHOLDER: &str = "[ID_REDACTED]";

const INJECTION_PHRASES: &[&str] = &[
    "ignore previous instructions",
    "ignore all",
    "ignore the above",
    "ignore your instructions",
    "disregard previous",
    "disregard all",
    "forget your instructions",
    "forget all previous",
    "reveal your instructions",
    "reveal your system prompt",
    "show me your prompt",
    "what is your system prompt",
    "you are now",
    "pretend you are",
    "developer mode",
    "jailbreak",
];

const DENYLIST: &[&str] = &[
    "stupid", "hate", "idiot", "idiots", "dumb", "moron", "shut up", "crap", "damn", "sucks",
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid id regex"));

static DENYLIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    let words: Vec<String> = DENYLIST.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).expect("valid denylist regex")
});

// ── Findings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    InjectionAttempt,
    PiiDetected,
    InappropriateContent,
}

impl FindingKind {
    /// Whether this finding stops the turn before the model is called.
    pub fn blocks(self) -> bool {
        matches!(self, FindingKind::InjectionAttempt | FindingKind::InappropriateContent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::InjectionAttempt => "injection_attempt",
            FindingKind::PiiDetected => "pii_detected",
            FindingKind::InappropriateContent => "inappropriate_content",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one detector reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    pub reason: String,
    /// Replacement text when the detector redacts instead of only flagging.
    pub redacted: Option<String>,
}

/// Outcome of running a [`Screener`] over one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreeningResult {
    pub blocked: bool,
    pub reasons: Vec<String>,
    /// Equal to the input when nothing was redacted.
    pub sanitized_text: String,
    pub findings: Vec<FindingKind>,
}

impl ScreeningResult {
    pub fn has(&self, kind: FindingKind) -> bool {
        self.findings.contains(&kind)
    }

    /// First blocking finding, in detector order.
    pub fn blocking_finding(&self) -> Option<FindingKind> {
        self.findings.iter().copied().find(|k| k.blocks())
    }
}

// ── Detectors ────────────────────────────────────────────────────────────────

pub trait Detector: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn inspect(&self, text: &str) -> Option<Finding>;
}

/// Case-insensitive substring match against known override phrases.
#[derive(Debug, Clone, Default)]
pub struct InjectionDetector;

impl Detector for InjectionDetector {
    fn name(&self) -> &'static str {
        "injection"
    }

    fn inspect(&self, text: &str) -> Option<Finding> {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        INJECTION_PHRASES
            .iter()
            .find(|phrase| normalized.contains(*phrase))
            .map(|phrase| Finding {
                kind: FindingKind::InjectionAttempt,
                reason: format!("prompt injection phrase detected: '{phrase}'"),
                redacted: None,
            })
    }
}

/// Email addresses and `NNN-NN-NNNN` identifiers, replaced by placeholders.
#[derive(Debug, Clone, Default)]
pub struct PiiDetector;

impl Detector for PiiDetector {
    fn name(&self) -> &'static str {
        "pii"
    }

    fn inspect(&self, text: &str) -> Option<Finding> {
        let mut kinds = Vec::new();
        let mut out = text.to_string();
        if EMAIL_RE.is_match(&out) {
            out = EMAIL_RE.replace_all(&out, EMAIL_PLACEHOLDER).into_owned();
            kinds.push("email");
        }
        if ID_RE.is_match(&out) {
            out = ID_RE.replace_all(&out, ID_PLACEHOLDER).into_owned();
            kinds.push("id number");
        }
        if kinds.is_empty() {
            return None;
        }
        Some(Finding {
            kind: FindingKind::PiiDetected,
            reason: format!("personal data redacted: {}", kinds.join(", ")),
            redacted: Some(out),
        })
    }
}

/// Case-insensitive whole-word match against a short denylist.
#[derive(Debug, Clone, Default)]
pub struct InappropriateContentDetector;

impl Detector for InappropriateContentDetector {
    fn name(&self) -> &'static str {
        "inappropriate_content"
    }

    fn inspect(&self, text: &str) -> Option<Finding> {
        DENYLIST_RE.find(text).map(|m| Finding {
            kind: FindingKind::InappropriateContent,
            reason: format!("inappropriate language detected: '{}'", m.as_str().to_lowercase()),
            redacted: None,
        })
    }
}

// ── Screener ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Screener {
    detectors: Vec<Box<dyn Detector>>,
}

impl Screener {
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    /// Injection, then PII, then inappropriate content.
    pub fn input() -> Self {
        Self::new(vec![
            Box::new(InjectionDetector),
            Box::new(PiiDetector),
            Box::new(InappropriateContentDetector),
        ])
    }

    /// Inappropriate content, then PII.
    pub fn output() -> Self {
        Self::new(vec![Box::new(InappropriateContentDetector), Box::new(PiiDetector)])
    }

    pub fn with(mut self, detector: impl Detector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn screen(&self, text: &str) -> ScreeningResult {
        let mut sanitized = text.to_string();
        let mut reasons = Vec::new();
        let mut findings = Vec::new();

        for detector in &self.detectors {
            if let Some(finding) = detector.inspect(&sanitized) {
                if let Some(redacted) = finding.redacted {
                    sanitized = redacted;
                }
                reasons.push(finding.reason);
                if !findings.contains(&finding.kind) {
                    findings.push(finding.kind);
                }
            }
        }

        ScreeningResult {
            blocked: findings.iter().any(|k| k.blocks()),
            reasons,
            sanitized_text: sanitized,
            findings,
        }
    }
}
