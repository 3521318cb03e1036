use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use super::document::CorridorDocument;
use crate::core::domain::Corridor;

/// Keys under which intersections have been stored by different UI versions.
const INTERSECTION_KEYS: &[&str] = &["intersections", "Intersections", "nodes"];

/// Parse a corridor JSON file.
pub fn parse_corridor_json(json_path: &Path) -> Result<Corridor> {
    let json_content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read JSON file: {}", json_path.display()))?;

    parse_corridor_json_str(&json_content)
}

/// Parse a corridor from a JSON string.
///
/// Accepts either a corridor object or a bare array of intersections. Field
/// errors report the path of the offending value, e.g.
/// `intersections[1].greenPhases[0].duration`.
pub fn parse_corridor_json_str(json_str: &str) -> Result<Corridor> {
    let json_value: Value = serde_json::from_str(json_str).with_context(|| {
        let preview = if json_str.len() > 500 {
            let mut end = 500;
            while !json_str.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &json_str[..end])
        } else {
            json_str.to_string()
        };
        format!("Invalid JSON syntax. First 500 chars: {}", preview)
    })?;

    let document_value = normalize_document(json_value)?;

    let document: CorridorDocument = serde_path_to_error::deserialize(document_value)
        .map_err(|err| {
            let path = err.path().to_string();
            anyhow::anyhow!("JSON deserialization error at '{}': {}", path, err.into_inner())
        })?;

    document.into_corridor()
}

/// Bring legacy layouts into the canonical `{"intersections": [...]}` shape.
fn normalize_document(value: Value) -> Result<Value> {
    match value {
        Value::Array(items) => Ok(serde_json::json!({ "intersections": items })),
        Value::Object(mut object) => {
            if object.contains_key("intersections") {
                return Ok(Value::Object(object));
            }

            let found = INTERSECTION_KEYS
                .iter()
                .find(|key| object.contains_key(**key))
                .copied();

            match found {
                Some(key) => {
                    if let Some(items) = object.remove(key) {
                        object.insert("intersections".to_string(), items);
                    }
                    Ok(Value::Object(object))
                }
                None => anyhow::bail!(
                    "JSON must contain an 'intersections' key. Found keys: {:?}",
                    object.keys().collect::<Vec<_>>()
                ),
            }
        }
        other => anyhow::bail!(
            "JSON corridor must be an object or an array, got {}",
            match other {
                Value::Null => "null",
                Value::Bool(_) => "a boolean",
                Value::Number(_) => "a number",
                _ => "a string",
            }
        ),
    }
}
