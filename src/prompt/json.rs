//! Best-effort JSON extraction for `structured_output` replies.
//!
//! Models frequently wrap the requested object in a Markdown code fence or
//! add a sentence before it. The pipeline attaches the parsed value to
//! `structured_output` turns but never rejects a reply that has none.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonExtractError {
    #[error("no JSON object found in reply")]
    NotFound,
    #[error("reply contains malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Pull the first JSON object out of `reply`.
///
/// Tries, in order: the whole trimmed reply, the contents of a ```` ```json ````
/// fence, and the span from the first `{` to the last `}`.
pub fn extract_json(reply: &str) -> Result<serde_json::Value, JsonExtractError> {
    let trimmed = reply.trim();
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if v.is_object() {
            return Ok(v);
        }
    }

    if let Some(fenced) = fenced_block(trimmed) {
        if let Ok(v) = serde_json::from_str::<serde_json::Value>(fenced) {
            return Ok(v);
        }
    }

    let start = trimmed.find('{').ok_or(JsonExtractError::NotFound)?;
    let end = trimmed.rfind('}').ok_or(JsonExtractError::NotFound)?;
    if end < start {
        return Err(JsonExtractError::NotFound);
    }
    Ok(serde_json::from_str(&trimmed[start..=end])?)
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    // Skip an optional language tag on the fence line.
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object() {
        let v = extract_json(r#"{"answer":"yes","confidence":0.9}"#).unwrap();
        assert_eq!(v["answer"], "yes");
    }

    #[test]
    fn fenced_object() {
        let reply = "Here you go:\n```json\n{\"category\": \"events\"}\n```\nThanks!";
        let v = extract_json(reply).unwrap();
        assert_eq!(v["category"], "events");
    }

    #[test]
    fn object_with_surrounding_prose() {
        let v = extract_json("Sure! {\"requires_human_followup\": true} Hope that helps.").unwrap();
        assert_eq!(v["requires_human_followup"], true);
    }

    #[test]
    fn plain_text_is_not_found() {
        assert!(matches!(extract_json("WCC offers mentorship."), Err(JsonExtractError::NotFound)));
    }

    #[test]
    fn broken_object_is_malformed() {
        assert!(matches!(extract_json("{\"answer\": }"), Err(JsonExtractError::Malformed(_))));
    }
}
