//! Prompt pattern registry properties.

use wcc_bot::conversation::{ConversationBuffer, Turn};
use wcc_bot::prompt::{Exemplar, PatternError, PatternKind, PromptTemplateRegistry, extract_json};

const QUERY: &str = "How do I find a mentor through WCC?";

#[test]
fn test_every_pattern_contains_query_verbatim() {
    let registry = PromptTemplateRegistry::default();
    for kind in PatternKind::ALL {
        let prompt = registry.render(kind, QUERY, None);
        assert!(prompt.contains(QUERY), "{kind} dropped the query");
    }
}

#[test]
fn test_render_is_deterministic() {
    let registry = PromptTemplateRegistry::default();
    let mut buffer = ConversationBuffer::new();
    buffer.append(Turn::user("hi"));
    buffer.append(Turn::assistant("hello"));
    for kind in PatternKind::ALL {
        assert_eq!(registry.render(kind, QUERY, Some(&buffer)), registry.render(kind, QUERY, Some(&buffer)));
    }
}

#[test]
fn test_patterns_render_distinct_prompts() {
    let registry = PromptTemplateRegistry::default();
    let mut prompts: Vec<String> = PatternKind::ALL.iter().map(|k| registry.render(*k, QUERY, None)).collect();
    prompts.sort();
    prompts.dedup();
    assert_eq!(prompts.len(), PatternKind::ALL.len());
}

#[test]
fn test_query_with_braces_is_not_substituted() {
    let registry = PromptTemplateRegistry::default();
    let tricky = "what does {{exemplars}} mean?";
    let prompt = registry.render(PatternKind::ZeroShot, tricky, None);
    assert!(prompt.contains(tricky));
}

#[test]
fn test_custom_exemplars_are_rendered() {
    let registry = PromptTemplateRegistry::default()
        .with_few_shot_exemplars(vec![Exemplar::new("Is there a book club?", "Yes! Join #book-club on Slack.")]);
    let prompt = registry.render(PatternKind::FewShot, QUERY, None);
    assert!(prompt.contains("EXAMPLE 1:\nMember: \"Is there a book club?\""));
    assert!(!prompt.contains("EXAMPLE 2:"));
}

#[test]
fn test_unknown_pattern_is_rejected() {
    let registry = PromptTemplateRegistry::default();
    let err = registry.render_named("socratic", QUERY, None).unwrap_err();
    assert_eq!(err, PatternError::UnknownPattern("socratic".into()));
    assert!(registry.render_named("few_shot", QUERY, None).is_ok());
}

#[test]
fn test_empty_buffer_adds_no_context_block() {
    let registry = PromptTemplateRegistry::default();
    let buffer = ConversationBuffer::new();
    assert_eq!(
        registry.render(PatternKind::Guarded, QUERY, Some(&buffer)),
        registry.render(PatternKind::Guarded, QUERY, None)
    );
}

#[test]
fn test_structured_reply_json_is_extracted() {
    let reply = "Sure!\n```json\n{\"answer\": \"Join Slack\", \"category\": \"programs\"}\n```";
    let value = extract_json(reply).unwrap();
    assert_eq!(value["category"], "programs");
}
