//! FAQ knowledge file, folded into the system instruction at startup.
//!
//! File shape:
//!
//! ```json
//! { "faqs": [ { "question": "Is WCC free?", "answer": "Yes!" } ] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

impl Faq {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), answer: answer.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    faqs: Vec<Faq>,
}

impl KnowledgeBase {
    pub fn new(faqs: Vec<Faq>) -> Self {
        Self { faqs }
    }

    /// Load and parse a knowledge file. Missing or malformed files are fatal.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read knowledge file {}: {e}", path.display()))
        })?;
        let kb = Self::parse(&raw).map_err(|e| match e {
            AppError::Config(msg) => AppError::Config(format!("{msg} ({})", path.display())),
            other => other,
        })?;
        info!(path = %path.display(), faqs = kb.faqs.len(), "knowledge file loaded");
        Ok(kb)
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let kb: KnowledgeBase = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("malformed knowledge file: {e}")))?;
        if let Some(i) = kb.faqs.iter().position(|f| f.question.trim().is_empty()) {
            return Err(AppError::Config(format!("knowledge entry {i} has an empty question")));
        }
        Ok(kb)
    }

    pub fn faqs(&self) -> &[Faq] {
        &self.faqs
    }

    pub fn len(&self) -> usize {
        self.faqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faqs.is_empty()
    }

    /// `Q: …` / `A: …` pairs separated by blank lines.
    pub fn render(&self) -> String {
        self.faqs
            .iter()
            .map(|f| format!("Q: {}\nA: {}", f.question.trim(), f.answer.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_and_renders_pairs() {
        let kb = KnowledgeBase::parse(
            r#"{"faqs":[{"question":"Is WCC free?","answer":"Yes."},{"question":"Where?","answer":"London and online."}]}"#,
        )
        .unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.render(), "Q: Is WCC free?\nA: Yes.\n\nQ: Where?\nA: London and online.");
    }

    #[test]
    fn missing_faqs_key_is_empty() {
        let kb = KnowledgeBase::parse("{}").unwrap();
        assert!(kb.is_empty());
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = KnowledgeBase::parse("{\"faqs\": [").unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("malformed")));
    }

    #[test]
    fn blank_question_rejected() {
        let err = KnowledgeBase::parse(r#"{"faqs":[{"question":" ","answer":"x"}]}"#).unwrap_err();
        assert!(err.to_string().contains("entry 0"));
    }

    #[test]
    fn load_reads_file_and_reports_missing() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(br#"{"faqs":[{"question":"Q","answer":"A"}]}"#).unwrap();
        assert_eq!(KnowledgeBase::load(f.path()).unwrap().faqs()[0], Faq::new("Q", "A"));

        let err = KnowledgeBase::load(Path::new("/nonexistent/faqs.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read knowledge file"));
    }
}
