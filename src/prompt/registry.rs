//! Pattern → prompt rendering.

use std::collections::HashMap;

use crate::conversation::{ConversationBuffer, DEFAULT_CONTEXT_WINDOW, Speaker};

use super::builder::substitute;
use super::patterns::{self, Exemplar};
use super::{PatternError, PatternKind};

const CONTEXT_HEADER: &str = "Conversation so far:";

/// Maps each [`PatternKind`] to its template and renders it for a query.
///
/// Rendering is pure: identical pattern, query and context contents give
/// byte-identical output. The registry holds no per-conversation state and
/// is shared across sessions behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PromptTemplateRegistry {
    few_shot: Vec<Exemplar>,
    guarded: Vec<Exemplar>,
    context_window: usize,
}

impl Default for PromptTemplateRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_WINDOW)
    }
}

impl PromptTemplateRegistry {
    /// Registry with the built-in exemplars and a context window of
    /// `context_window` turns (clamped to at least 1).
    pub fn new(context_window: usize) -> Self {
        Self {
            few_shot: patterns::default_few_shot_exemplars(),
            guarded: patterns::default_guarded_exemplars(),
            context_window: context_window.max(1),
        }
    }

    pub fn with_few_shot_exemplars(mut self, exemplars: Vec<Exemplar>) -> Self {
        self.few_shot = exemplars;
        self
    }

    pub fn with_guarded_exemplars(mut self, exemplars: Vec<Exemplar>) -> Self {
        self.guarded = exemplars;
        self
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }

    /// Exemplars embedded by `pattern` (empty for patterns without examples).
    pub fn exemplars(&self, pattern: PatternKind) -> &[Exemplar] {
        match pattern {
            PatternKind::FewShot => &self.few_shot,
            PatternKind::Guarded => &self.guarded,
            _ => &[],
        }
    }

    /// Render `pattern` for `user_query`.
    ///
    /// When `context` holds quotable turns, the most recent `context_window`
    /// of them are prepended as a `Conversation so far:` block, using each
    /// turn's [`prompt_text`](crate::conversation::Turn::prompt_text).
    pub fn render(
        &self,
        pattern: PatternKind,
        user_query: &str,
        context: Option<&ConversationBuffer>,
    ) -> String {
        let (template, exemplars) = match pattern {
            PatternKind::ZeroShot => (patterns::ZERO_SHOT, None),
            PatternKind::FewShot => (patterns::FEW_SHOT, Some(("EXAMPLE", &self.few_shot))),
            PatternKind::ChainOfThought => (patterns::CHAIN_OF_THOUGHT, None),
            PatternKind::RoleBased => (patterns::ROLE_BASED, None),
            PatternKind::StructuredOutput => (patterns::STRUCTURED_OUTPUT, None),
            PatternKind::Guarded => (patterns::GUARDED, Some(("Example", &self.guarded))),
        };

        let mut vars = HashMap::with_capacity(2);
        vars.insert("query".to_string(), user_query.to_string());
        if let Some((label, list)) = exemplars {
            vars.insert("exemplars".to_string(), patterns::render_exemplars(label, list));
        }
        let body = substitute(template, &vars);

        match context.map(|c| self.render_context(c)) {
            Some(block) if !block.is_empty() => format!("{block}\n\n{body}"),
            _ => body,
        }
    }

    /// Resolve `key` and render. Unknown keys fail; there is no default pattern.
    pub fn render_named(
        &self,
        key: &str,
        user_query: &str,
        context: Option<&ConversationBuffer>,
    ) -> Result<String, PatternError> {
        let pattern: PatternKind = key.parse()?;
        Ok(self.render(pattern, user_query, context))
    }

    fn render_context(&self, buffer: &ConversationBuffer) -> String {
        let recent = buffer.context(self.context_window);
        if recent.is_empty() {
            return String::new();
        }
        let mut block = String::from(CONTEXT_HEADER);
        for turn in recent {
            let who = match turn.role {
                Speaker::User => "User",
                Speaker::Assistant => "Assistant",
            };
            block.push('\n');
            block.push_str(who);
            block.push_str(": ");
            block.push_str(turn.prompt_text());
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Turn;

    #[test]
    fn zero_shot_exact_shape() {
        let r = PromptTemplateRegistry::default();
        let out = r.render(PatternKind::ZeroShot, "How do I join?", None);
        assert_eq!(
            out,
            "What is Women Coding Community (WCC)?\n\nMember Question: How do I join?\n\nAnswer:"
        );
    }

    #[test]
    fn guarded_embeds_exemplars_and_rules() {
        let r = PromptTemplateRegistry::default();
        let out = r.render(PatternKind::Guarded, "hi", None);
        assert!(out.contains("Example 1:\nMember: \"What programs do you offer?\""));
        assert!(out.contains("Example 2:"));
        assert!(out.contains("SECURITY RULES:"));
        assert!(out.ends_with("Member Question: hi\n\nWCC Alexa:"));
    }

    #[test]
    fn custom_exemplars_replace_defaults() {
        let r = PromptTemplateRegistry::default()
            .with_few_shot_exemplars(vec![Exemplar::new("Q?", "A!")]);
        let out = r.render(PatternKind::FewShot, "x", None);
        assert!(out.contains("EXAMPLE 1:\nMember: \"Q?\"\nAssistant: \"A!\""));
        assert!(!out.contains("EXAMPLE 2:"));
        assert_eq!(r.exemplars(PatternKind::FewShot).len(), 1);
        assert!(r.exemplars(PatternKind::ZeroShot).is_empty());
    }

    #[test]
    fn empty_context_adds_nothing() {
        let r = PromptTemplateRegistry::default();
        let buf = ConversationBuffer::new();
        assert_eq!(
            r.render(PatternKind::RoleBased, "q", Some(&buf)),
            r.render(PatternKind::RoleBased, "q", None)
        );
    }

    #[test]
    fn context_window_limits_rendered_turns() {
        let r = PromptTemplateRegistry::new(2);
        let mut buf = ConversationBuffer::new();
        buf.append(Turn::user("first"));
        buf.append(Turn::assistant("second"));
        buf.append(Turn::user("third"));
        let out = r.render(PatternKind::ZeroShot, "q", Some(&buf));
        assert!(out.starts_with("Conversation so far:\nAssistant: second\nUser: third\n\n"));
        assert!(!out.contains("first"));
    }

    #[test]
    fn context_quotes_redacted_text_and_skips_greeting() {
        let r = PromptTemplateRegistry::default();
        let mut buf = ConversationBuffer::new();
        buf.append(Turn::assistant("Hello!").display_only());
        buf.append(Turn::user("I'm jo@x.org").with_redacted("I'm [EMAIL_REDACTED]"));
        buf.append(Turn::assistant("Thanks!"));
        let out = r.render(PatternKind::ZeroShot, "q", Some(&buf));
        assert!(out.starts_with("Conversation so far:\nUser: I'm [EMAIL_REDACTED]\nAssistant: Thanks!\n\n"));
        assert!(!out.contains("jo@x.org"));
    }

    #[test]
    fn greeting_alone_adds_no_context_block() {
        let r = PromptTemplateRegistry::default();
        let mut buf = ConversationBuffer::new();
        buf.append(Turn::assistant("Hello!").display_only());
        assert_eq!(r.render(PatternKind::Guarded, "q", Some(&buf)), r.render(PatternKind::Guarded, "q", None));
    }

    #[test]
    fn render_named_rejects_unknown() {
        let r = PromptTemplateRegistry::default();
        assert!(r.render_named("cot", "q", None).unwrap().ends_with("Step 1:"));
        assert_eq!(
            r.render_named("socratic", "q", None),
            Err(PatternError::UnknownPattern("socratic".into()))
        );
    }
}
