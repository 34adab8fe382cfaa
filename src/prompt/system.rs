//! System instruction assembly: persona + optional FAQ knowledge.

use chrono::NaiveDate;

use crate::knowledge::KnowledgeBase;

use super::builder::PromptBuilder;

/// WCC assistant personality used when no other persona is supplied.
pub const DEFAULT_PERSONA: &str = "You are a helpful and enthusiastic assistant for the Women Coding Community (WCC).

ABOUT WCC:
- WCC is a vibrant community supporting women in technology
- We provide mentorship, networking, skill development workshops, and career guidance
- Our mission is to create an inclusive space for women to grow in tech careers
- We host regular events: technical workshops, mentorship sessions, networking meetups

PERSONALITY:
- Friendly, encouraging, and supportive
- Use inclusive language and be welcoming
- Be enthusiastic about WCC's mission
- Always try to connect answers back to community engagement

HOW TO HELP:
- Answer questions about WCC programs and events
- Encourage participation and community involvement
- Provide supportive advice for women in tech
- If you don't know something specific, suggest they check our Slack or website";

const KNOWLEDGE_LAYER: &str = "KNOWLEDGE BASE (frequently asked questions):
{{knowledge}}";

const DATE_LAYER: &str = "Current date: {{date}}";

/// Immutable system instruction text, built once and shared by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInstruction {
    text: String,
}

impl SystemInstruction {
    /// Build with today's local date.
    pub fn build(persona: &str, knowledge: Option<&KnowledgeBase>) -> Self {
        Self::build_on(persona, knowledge, chrono::Local::now().date_naive())
    }

    pub fn build_on(persona: &str, knowledge: Option<&KnowledgeBase>, date: NaiveDate) -> Self {
        let mut builder = PromptBuilder::new().append(persona);
        if let Some(kb) = knowledge.filter(|kb| !kb.is_empty()) {
            builder = builder.append(KNOWLEDGE_LAYER).var("knowledge", kb.render());
        }
        let text = builder
            .append(DATE_LAYER)
            .var("date", date.format("%Y-%m-%d").to_string())
            .build();
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for SystemInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Faq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 5).unwrap()
    }

    #[test]
    fn persona_is_date_stamped() {
        let s = SystemInstruction::build_on(DEFAULT_PERSONA, None, date());
        assert!(s.as_str().starts_with("You are a helpful and enthusiastic assistant"));
        assert!(s.as_str().ends_with("Current date: 2025-11-05"));
        assert!(!s.as_str().contains("KNOWLEDGE BASE"));
    }

    #[test]
    fn knowledge_layer_sits_between_persona_and_date() {
        let kb = KnowledgeBase::new(vec![Faq::new("Is WCC free?", "Yes, joining is free.")]);
        let s = SystemInstruction::build_on("Persona.", Some(&kb), date());
        assert_eq!(
            s.as_str(),
            "Persona.\n\nKNOWLEDGE BASE (frequently asked questions):\nQ: Is WCC free?\nA: Yes, joining is free.\n\nCurrent date: 2025-11-05"
        );
    }

    #[test]
    fn empty_knowledge_is_skipped() {
        let kb = KnowledgeBase::new(vec![]);
        let s = SystemInstruction::build_on("Persona.", Some(&kb), date());
        assert_eq!(s.as_str(), "Persona.\n\nCurrent date: 2025-11-05");
    }
}
