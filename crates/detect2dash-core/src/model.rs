//! Wire and storage types for detection batches.

use crate::error::IngestError;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Server-side timestamp layout, e.g. `2024-01-01 10:00:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One object reported by the vision pipeline.
///
/// Fields other than the class name are kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedObject {
    #[serde(rename = "classe")]
    pub class_name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DetectedObject {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            attributes: Map::new(),
        }
    }

    /// Build from a raw JSON element; `None` unless it is an object with a
    /// string `classe`.
    fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut attributes) = value else {
            return None;
        };
        match attributes.remove("classe") {
            Some(Value::String(class_name)) => Some(Self {
                class_name,
                attributes,
            }),
            _ => None,
        }
    }
}

/// One accepted ingestion. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionBatch {
    pub timestamp: String,
    #[serde(rename = "objetos")]
    pub objects: Vec<DetectedObject>,
    #[serde(rename = "tempo_ms")]
    pub inference_time_ms: Number,
}

/// Parsed ingestion payload.
///
/// `objects` may still be empty and `inference_time_ms` absent; the retention
/// buffer decides whether the batch is complete.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestRequest {
    pub objects: Vec<DetectedObject>,
    pub inference_time_ms: Option<Number>,
}

impl IngestRequest {
    /// Decode a request body.
    ///
    /// Non-JSON or non-object bodies are [`IngestError::InvalidPayload`].
    /// A present `objetos` that is not a list of objects with a string
    /// `classe`, or a present `tempo_ms` that is not a number, is
    /// [`IngestError::Incomplete`].
    pub fn from_slice(body: &[u8]) -> Result<Self, IngestError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| IngestError::InvalidPayload(e.to_string()))?;
        let Value::Object(mut fields) = value else {
            return Err(IngestError::InvalidPayload(
                "expected a JSON object".to_string(),
            ));
        };

        let objects = match fields.remove("objetos") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(DetectedObject::from_value)
                .collect::<Option<Vec<_>>>()
                .ok_or(IngestError::Incomplete)?,
            Some(_) => return Err(IngestError::Incomplete),
        };

        let inference_time_ms = match fields.remove("tempo_ms") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(n),
            Some(_) => return Err(IngestError::Incomplete),
        };

        Ok(Self {
            objects,
            inference_time_ms,
        })
    }
}
