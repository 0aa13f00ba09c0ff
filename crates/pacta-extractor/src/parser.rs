//! Parse model replies into span candidates
//!
//! The expected reply convention is a natural-language explanation
//! followed by one fenced ```json block containing an array of
//! span-shaped objects, but the parser accepts any number of tagged
//! blocks and falls back to treating the whole reply as JSON when no
//! tagged block exists.

use pacta_domain::Span;
use serde_json::Value;
use tracing::warn;

/// Extract candidate objects from a model reply.
///
/// Scans for fenced code blocks explicitly tagged `json` and parses
/// each as a single object or an array of objects; a block that fails
/// to parse is skipped, never aborting the whole extraction. When the
/// reply contains no tagged block at all, the entire text is tried as
/// JSON instead.
pub fn extract_candidates(text: &str) -> Vec<Value> {
    let blocks = tagged_json_blocks(text);

    let mut candidates = Vec::new();
    if blocks.is_empty() {
        collect_parsed(text.trim(), &mut candidates);
    } else {
        for block in &blocks {
            collect_parsed(block, &mut candidates);
        }
    }
    candidates
}

/// Parse one chunk as an object or array of objects and append the
/// results; on failure, log and move on.
fn collect_parsed(chunk: &str, out: &mut Vec<Value>) {
    match serde_json::from_str::<Value>(chunk) {
        Ok(Value::Array(items)) => {
            for item in items {
                if item.is_object() {
                    out.push(item);
                } else {
                    warn!("skipping non-object array element in extraction");
                }
            }
        }
        Ok(item @ Value::Object(_)) => out.push(item),
        Ok(_) => warn!("skipping JSON chunk that is neither object nor array"),
        Err(e) => warn!("skipping malformed JSON chunk: {}", e),
    }
}

/// Collect the contents of all fenced blocks tagged `json`.
///
/// Untagged blocks are ignored (their contents are not scanned for
/// nested fences either). An unterminated block is dropped.
fn tagged_json_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;
    let mut in_untagged = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(lines) = current.as_mut() {
            if trimmed.starts_with("```") {
                blocks.push(lines.join("\n"));
                current = None;
            } else {
                lines.push(line);
            }
        } else if in_untagged {
            if trimmed.starts_with("```") {
                in_untagged = false;
            }
        } else if let Some(tag) = trimmed.strip_prefix("```") {
            if tag.trim().eq_ignore_ascii_case("json") {
                current = Some(Vec::new());
            } else {
                in_untagged = true;
            }
        }
    }

    blocks
}

/// Structural minimum for treating an extracted object as a span:
/// string `id`, `trace_id`, `type`, and `entity`; `body` an object
/// with a string `action`; `integrity` an object with a string
/// `version`.
pub fn is_valid_span(candidate: &Value) -> bool {
    let Some(obj) = candidate.as_object() else {
        return false;
    };

    let has_str = |key: &str| obj.get(key).is_some_and(Value::is_string);
    if !has_str("id") || !has_str("trace_id") || !has_str("type") || !has_str("entity") {
        return false;
    }

    let body_ok = obj
        .get("body")
        .and_then(Value::as_object)
        .is_some_and(|b| b.get("action").is_some_and(Value::is_string));
    if !body_ok {
        return false;
    }

    obj.get("integrity")
        .and_then(Value::as_object)
        .is_some_and(|i| i.get("version").is_some_and(Value::is_string))
}

/// Extract structurally valid spans from a model reply.
///
/// Applies [`is_valid_span`] to every candidate and deserializes the
/// survivors; a candidate that passes the gate but still fails full
/// deserialization is logged and skipped.
pub fn extract_spans(text: &str) -> Vec<Span> {
    extract_candidates(text)
        .into_iter()
        .filter(is_valid_span)
        .filter_map(|candidate| match serde_json::from_value::<Span>(candidate) {
            Ok(span) => Some(span),
            Err(e) => {
                warn!("skipping candidate that failed span deserialization: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn span_json(id: &str) -> String {
        json!({
            "id": id,
            "trace_id": "t1",
            "type": "contract.created",
            "entity": "minicontrato",
            "body": {"action": "create_contract", "input": {}},
            "started_at": "2025-01-01T00:00:00Z",
            "integrity": {"hash": "", "version": "1.0.0"}
        })
        .to_string()
    }

    #[test]
    fn test_extract_from_tagged_block() {
        let reply = format!(
            "Aqui está o contrato:\n```json\n[{},{}]\n```\nQualquer dúvida, avise.",
            span_json("s1"),
            span_json("s2")
        );
        let candidates = extract_candidates(&reply);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0]["id"], "s1");
        assert_eq!(candidates[1]["id"], "s2");
    }

    #[test]
    fn test_extract_single_object_block() {
        let reply = format!("```json\n{}\n```", span_json("s1"));
        let candidates = extract_candidates(&reply);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_malformed_block_is_skipped_not_fatal() {
        // One valid two-element array, one broken block: exactly the
        // two valid candidates survive and nothing panics.
        let reply = format!(
            "```json\n[{},{}]\n```\nE também:\n```json\n{{broken json!!\n```",
            span_json("s1"),
            span_json("s2")
        );
        let candidates = extract_candidates(&reply);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_whole_text_fallback() {
        let reply = format!("[{}]", span_json("s1"));
        let candidates = extract_candidates(&reply);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_no_fallback_when_tagged_block_exists() {
        // A tagged block that parses to nothing does not trigger the
        // whole-text fallback.
        let reply = "```json\nnot json\n```";
        assert!(extract_candidates(reply).is_empty());
    }

    #[test]
    fn test_untagged_blocks_are_ignored() {
        let reply = format!("```\n{}\n```", span_json("s1"));
        assert!(extract_candidates(&reply).is_empty());
    }

    #[test]
    fn test_plain_prose_yields_nothing() {
        assert!(extract_candidates("Não consegui montar o contrato.").is_empty());
    }

    #[test]
    fn test_non_object_array_elements_are_dropped() {
        let reply = format!("```json\n[{}, 42, \"texto\"]\n```", span_json("s1"));
        let candidates = extract_candidates(&reply);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_is_valid_span_accepts_minimum() {
        let candidate = json!({
            "id": "s1",
            "trace_id": "t1",
            "type": "contract.created",
            "entity": "minicontrato",
            "body": {"action": "create_contract"},
            "integrity": {"version": "1.0.0"}
        });
        assert!(is_valid_span(&candidate));
    }

    #[test]
    fn test_is_valid_span_rejects_missing_fields() {
        let mut candidate = json!({
            "id": "s1",
            "trace_id": "t1",
            "type": "contract.created",
            "entity": "minicontrato",
            "body": {"action": "create_contract"},
            "integrity": {"version": "1.0.0"}
        });

        for key in ["id", "trace_id", "type", "entity", "body", "integrity"] {
            let mut broken = candidate.clone();
            broken.as_object_mut().unwrap().remove(key);
            assert!(!is_valid_span(&broken), "should reject missing '{}'", key);
        }

        // Wrong types
        candidate["id"] = json!(42);
        assert!(!is_valid_span(&candidate));
        assert!(!is_valid_span(&json!("just a string")));
        assert!(!is_valid_span(&json!({"body": {"action": 1}})));
    }

    #[test]
    fn test_is_valid_span_requires_body_action_and_integrity_version() {
        let no_action = json!({
            "id": "s1", "trace_id": "t1", "type": "x", "entity": "e",
            "body": {"input": {}},
            "integrity": {"version": "1.0.0"}
        });
        assert!(!is_valid_span(&no_action));

        let no_version = json!({
            "id": "s1", "trace_id": "t1", "type": "x", "entity": "e",
            "body": {"action": "a"},
            "integrity": {"hash": ""}
        });
        assert!(!is_valid_span(&no_version));
    }

    #[test]
    fn test_extract_spans_filters_and_deserializes() {
        let invalid = json!({"id": "s9", "note": "missing everything"}).to_string();
        let reply = format!("```json\n[{},{}]\n```", span_json("s1"), invalid);

        let spans = extract_spans(&reply);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].id.as_str(), "s1");
        assert_eq!(spans[0].span_type, "contract.created");
        assert_eq!(spans[0].integrity.hash, "");
    }

    #[test]
    fn test_extract_spans_tolerates_missing_optional_fields() {
        // The structural gate does not require started_at or
        // integrity.hash; deserialization still needs started_at.
        let minimal = json!({
            "id": "s1",
            "trace_id": "t1",
            "type": "contract.created",
            "entity": "minicontrato",
            "body": {"action": "create_contract"},
            "started_at": "2025-01-01T00:00:00Z",
            "integrity": {"version": "1.0.0"}
        })
        .to_string();
        let reply = format!("```json\n{}\n```", minimal);
        let spans = extract_spans(&reply);
        assert_eq!(spans.len(), 1);
        assert!(spans[0].integrity.hash.is_empty());
    }
}
