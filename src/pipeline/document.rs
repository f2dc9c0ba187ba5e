use crate::error::{IngestError, IngestResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Metadata key holding the message of the most recent stage failure
pub const ON_FAILURE_MESSAGE_FIELD: &str = "failure_message";

/// Metadata key holding the type tag of the most recently failed stage
pub const ON_FAILURE_PROCESSOR_FIELD: &str = "failure_processor_tag";

/// Document flowing through a pipeline
///
/// `data` is the payload stages read and rewrite. `metadata` is reserved for
/// failure diagnostics: it only ever holds [`ON_FAILURE_MESSAGE_FIELD`] and
/// [`ON_FAILURE_PROCESSOR_FIELD`], written together by [`Document::record_failure`].
///
/// # Example
/// ```
/// use ingest_pipeline::pipeline::Document;
///
/// let mut document = Document::new();
/// document.set_string("message", "hello");
/// assert_eq!(document.get_string("message").unwrap(), "hello");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    data: HashMap<String, Value>,

    metadata: HashMap<String, String>,

    /// Number of failures recorded over the document's lifetime
    #[serde(skip)]
    failure_count: u64,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from a payload map
    pub fn with_data(data: HashMap<String, Value>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Create a document whose payload is the given JSON object
    pub fn from_value(value: Value) -> IngestResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::with_data(map.into_iter().collect())),
            _ => Err(IngestError::FieldType {
                field: "_source".to_string(),
                expected: "JSON object",
            }),
        }
    }

    /// Parse a JSON object into a document payload
    pub fn from_json(json: &str) -> IngestResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Set a value in the payload
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the payload
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Get a value from the payload or return an error if not found
    pub fn get_required(&self, key: &str) -> IngestResult<&Value> {
        self.data
            .get(key)
            .ok_or_else(|| IngestError::FieldNotFound(key.to_string()))
    }

    /// Set a string value
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), Value::String(value.into()));
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> IngestResult<String> {
        match self.get_required(key)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(type_error(key, "string")),
        }
    }

    /// Set a boolean value
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.data.insert(key.into(), Value::Bool(value));
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> IngestResult<bool> {
        match self.get_required(key)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(type_error(key, "boolean")),
        }
    }

    /// Set a number value
    ///
    /// JSON has no representation for NaN or infinity; those are stored as null.
    pub fn set_number(&mut self, key: impl Into<String>, value: f64) {
        let value = serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.data.insert(key.into(), value);
    }

    /// Get a number value
    pub fn get_number(&self, key: &str) -> IngestResult<f64> {
        match self.get_required(key)? {
            Value::Number(n) => n.as_f64().ok_or_else(|| type_error(key, "valid number")),
            _ => Err(type_error(key, "number")),
        }
    }

    /// Check if a key exists in the payload
    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the payload
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Get all payload keys
    pub fn keys(&self) -> Vec<&String> {
        self.data.keys().collect()
    }

    /// Get the whole payload
    pub fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    /// Overwrite the failure snapshot with `message` and `tag`
    ///
    /// Both keys are replaced on every call; earlier failures are not kept.
    pub fn record_failure(&mut self, message: impl Into<String>, tag: impl Into<String>) {
        self.metadata
            .insert(ON_FAILURE_MESSAGE_FIELD.to_string(), message.into());
        self.metadata
            .insert(ON_FAILURE_PROCESSOR_FIELD.to_string(), tag.into());
        self.failure_count += 1;
    }

    /// Get a metadata value
    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }

    /// Get all metadata
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Message of the last recorded failure
    pub fn failure_message(&self) -> Option<&str> {
        self.get_metadata(ON_FAILURE_MESSAGE_FIELD)
    }

    /// Type tag of the last stage that failed
    pub fn failure_tag(&self) -> Option<&str> {
        self.get_metadata(ON_FAILURE_PROCESSOR_FIELD)
    }

    /// Number of times a failure has been recorded on this document
    ///
    /// Compare before and after a run to tell whether that run failed anywhere.
    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }
}

fn type_error(key: &str, expected: &'static str) -> IngestError {
    IngestError::FieldType {
        field: key.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_creation() {
        let document = Document::new();
        assert!(document.keys().is_empty());
        assert!(document.metadata().is_empty());
    }

    #[test]
    fn test_string_operations() {
        let mut document = Document::new();
        document.set_string("key1", "value1");

        assert!(document.has("key1"));
        assert_eq!(document.get_string("key1").unwrap(), "value1");
    }

    #[test]
    fn test_bool_operations() {
        let mut document = Document::new();
        document.set_bool("enabled", true);

        assert!(document.get_bool("enabled").unwrap());
    }

    #[test]
    fn test_number_operations() {
        let mut document = Document::new();
        document.set_number("duration", 60.5);

        assert_eq!(document.get_number("duration").unwrap(), 60.5);
    }

    #[test]
    fn test_non_finite_number_stored_as_null() {
        let mut document = Document::new();
        document.set_number("ratio", f64::NAN);

        assert_eq!(document.get("ratio"), Some(&Value::Null));
        assert!(document.get_number("ratio").is_err());
    }

    #[test]
    fn test_missing_key() {
        let document = Document::new();
        let result = document.get_string("missing");

        assert!(matches!(result, Err(IngestError::FieldNotFound(ref k)) if k == "missing"));
    }

    #[test]
    fn test_wrong_type() {
        let mut document = Document::new();
        document.set_string("key1", "value1");

        let result = document.get_bool("key1");
        assert!(matches!(result, Err(IngestError::FieldType { .. })));
    }

    #[test]
    fn test_remove() {
        let mut document = Document::new();
        document.set_string("key1", "value1");

        assert!(document.has("key1"));
        document.remove("key1");
        assert!(!document.has("key1"));
    }

    #[test]
    fn test_record_failure_overwrites() {
        let mut document = Document::new();
        document.record_failure("first error", "first");
        document.record_failure("second error", "second");

        assert_eq!(document.metadata().len(), 2);
        assert_eq!(document.failure_message(), Some("second error"));
        assert_eq!(document.failure_tag(), Some("second"));
        assert_eq!(document.failure_count(), 2);
    }

    #[test]
    fn test_record_failure_leaves_data_alone() {
        let mut document = Document::new();
        document.set_string("field", "value");
        document.record_failure("error", "tag");

        assert_eq!(document.keys().len(), 1);
        assert_eq!(document.get_string("field").unwrap(), "value");
    }

    #[test]
    fn test_from_json() {
        let document = Document::from_json(r#"{"name": "doc", "count": 3}"#).unwrap();

        assert_eq!(document.get_string("name").unwrap(), "doc");
        assert_eq!(document.get_number("count").unwrap(), 3.0);
        assert!(document.metadata().is_empty());
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let result = Document::from_value(json!([1, 2, 3]));
        assert!(matches!(result, Err(IngestError::FieldType { .. })));
    }

    #[test]
    fn test_from_json_invalid() {
        let result = Document::from_json("{not json");
        assert!(matches!(result, Err(IngestError::Json(_))));
    }

    #[test]
    fn test_serialize_includes_metadata() {
        let mut document = Document::new();
        document.set_string("field", "value");
        document.record_failure("error", "tag");

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(
            value,
            json!({
                "data": { "field": "value" },
                "metadata": {
                    "failure_message": "error",
                    "failure_processor_tag": "tag"
                }
            })
        );
    }
}
