//! JSON import/export of the whole scene graph.
//!
//! The document shape is `{"scenes": [...]}`. Export is deterministic: the
//! same graph always produces the same bytes.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;

use crate::schema::scene::Scene;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// Valid JSON, but not a scene document.
    #[error("invalid document format: {0}")]
    Format(String),
    #[error("failed to encode document: {0}")]
    Encode(String),
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    scenes: &'a [Scene],
}

/// Serialize `scenes` as a pretty-printed document indented by `indent`
/// spaces per level. No trailing newline.
pub fn export(scenes: &[Scene], indent: usize) -> Result<String, CodecError> {
    let indent = vec![b' '; indent];
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
    DocumentRef { scenes }
        .serialize(&mut serializer)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Parse a document into its scenes.
///
/// Only the document shape is checked here. Duplicate ids and dangling
/// targets pass through; see `crate::core::integrity::inspect`. Fields
/// missing from a scene entry take their defaults.
pub fn import(input: &str) -> Result<Vec<Scene>, CodecError> {
    let value: Value = serde_json::from_str(input)?;

    let items = match value {
        Value::Object(mut map) => match map.remove("scenes") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(CodecError::Format(
                    "\"scenes\" must be an array".to_string(),
                ))
            }
            None => {
                return Err(CodecError::Format(
                    "document must have a \"scenes\" array".to_string(),
                ))
            }
        },
        _ => {
            return Err(CodecError::Format(
                "top-level value must be an object".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<Scene>(item)
                .map_err(|e| CodecError::Format(format!("scene #{}: {}", i, e)))
        })
        .collect()
}
