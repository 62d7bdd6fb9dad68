//! Record codec: one BSON document per line of text.
//!
//! Documents are serialized as compact canonical Extended JSON, which keeps
//! type information (ObjectId, DateTime, Int64, Decimal128, Binary) intact
//! across a file round trip. One line is the atomic transfer unit; a record
//! has no identity beyond its serialized content.

use bson::{Bson, Document};

use crate::error::{CodecError, Result};

/// Codec converting between a [`Document`] and one line of JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl LineCodec {
    /// Create a new line codec.
    pub fn new() -> Self {
        Self
    }

    /// Serialize one document to a single line of canonical Extended JSON.
    ///
    /// The output never contains a newline; compact serialization keeps the
    /// whole document on one line.
    pub fn encode(&self, doc: &Document) -> Result<String> {
        let value = Bson::Document(doc.clone()).into_canonical_extjson();
        let line = value.to_string();
        if line.contains('\n') {
            return Err(CodecError::Encode(
                "serialized document spans multiple lines".to_string(),
            )
            .into());
        }
        Ok(line)
    }

    /// Parse one line of Extended JSON back into a document.
    pub fn decode(&self, line: &str) -> Result<Document> {
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| CodecError::Decode(format!("invalid JSON: {}", e)))?;

        let map = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(CodecError::Decode(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                ))
                .into());
            }
        };

        Document::try_from(map)
            .map_err(|e| CodecError::Decode(format!("invalid Extended JSON: {}", e)).into())
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
