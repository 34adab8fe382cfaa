//! The shipped config and knowledge files load cleanly.

use std::fs;
use std::path::Path;

use wcc_bot::config::load_from;
use wcc_bot::knowledge::KnowledgeBase;
use wcc_bot::prompt::PatternKind;

#[test]
fn test_default_config_loads() {
    let cfg = load_from(Path::new("config/default.toml"), None, None).unwrap();
    assert_eq!(cfg.bot_name, "WCC Alexa");
    assert_eq!(cfg.llm.provider, "gemini");
    assert_eq!(cfg.pipeline.pattern, PatternKind::Guarded);
    assert!(cfg.pipeline.secure);
    assert_eq!(cfg.generation.max_output_tokens(), 200);
    assert!(!cfg.comms.axum_channel.enabled);
}

#[test]
fn test_offline_overlay_switches_to_dummy() {
    let cfg = load_from(Path::new("config/offline.toml"), None, None).unwrap();
    assert_eq!(cfg.llm.provider, "dummy");
    assert!(cfg.comms.axum_channel.enabled);
    assert_eq!(cfg.bot_name, "WCC Alexa");
}

#[test]
fn test_pattern_override_wins() {
    let cfg = load_from(Path::new("config/default.toml"), None, Some("cot")).unwrap();
    assert_eq!(cfg.pipeline.pattern, PatternKind::ChainOfThought);
}

#[test]
fn test_faq_file_parses() {
    let kb = KnowledgeBase::load(Path::new("config/knowledge/wcc_faqs.json")).unwrap();
    assert!(kb.len() >= 5);
    assert!(kb.render().contains("Q: How do I join WCC?"));
}

#[test]
fn test_default_config_points_at_shipped_faqs() {
    let text = fs::read_to_string("config/default.toml").unwrap();
    assert!(text.contains("faq_file = \"config/knowledge/wcc_faqs.json\""));
}
