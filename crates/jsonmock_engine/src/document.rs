/* 📖 # Why wrap the JSON object in a Document type?

The data file is both the route table and the data: its top-level keys are the
endpoints, in file order, and first match wins. Key order therefore matters,
which is why serde_json is built with `preserve_order` and the map is never
re-sorted. Wrapping it keeps the "top level is an object" rule in one place.
*/

use jsonmock_base::{JsonMockError, JsonMockResult};
use serde_json::{Map, Value};

/// The whole mock database: endpoint keys mapped to collections or scalars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Map<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from JSON text.
    ///
    /// Fails when the text is not JSON or its top level is not an object.
    pub fn parse(text: &str) -> JsonMockResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| Box::new(JsonMockError::json(e)))?;
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(Box::new(JsonMockError::config(format!(
                "top level of the data document must be a JSON object, found {}",
                json_type_name(&other)
            )))),
        }
    }

    /// Top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Set the value of a key. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Serialize for writing back to the data file.
    pub fn to_json_pretty(&self) -> JsonMockResult<String> {
        serde_json::to_string_pretty(&self.entries).map_err(|e| Box::new(JsonMockError::json(e)))
    }
}

impl From<Map<String, Value>> for Document {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

/// Human readable JSON type name, for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_keeps_key_order() {
        let doc = Document::parse(r#"{"zebra": [], "apple": 1, "mango/:id": []}"#).unwrap();
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["zebra", "apple", "mango/:id"]);
        assert_eq!(doc.get("apple"), Some(&json!(1)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = Document::parse("[1, 2]").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: top level of the data document must be a JSON object, found an array"
        );
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = Document::parse("{\"items\": [").unwrap_err();
        assert!(err.to_string().starts_with("JSON error: "));
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut doc = Document::parse(r#"{"a": [], "b": []}"#).unwrap();
        doc.insert("a", json!([{"id": 1}]));
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(doc.get("a"), Some(&json!([{"id": 1}])));
    }

    #[test]
    fn test_reparse_is_identical() {
        let doc = Document::parse(r#"{"users/:name": [{"id": 1, "name": "x"}], "config": {"debug": true}, "items": []}"#)
            .unwrap();
        let reparsed = Document::parse(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(reparsed, doc);
        assert_eq!(
            reparsed.keys().collect::<Vec<_>>(),
            vec!["users/:name", "config", "items"]
        );
    }
}
