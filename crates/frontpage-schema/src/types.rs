//! Document and field definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Top-level document stored in a dataset.
    Document,
    /// Object embedded in a document.
    Object,
}

/// Value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single-line string.
    String,
    /// Multi-line string.
    Text,
    /// Integer or floating point number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// RFC 3339 timestamp.
    Datetime,
    /// Absolute `http(s)` or `mailto` URL.
    Url,
}

impl FieldType {
    /// Name used in the JSON description.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Url => "url",
        }
    }

    /// Check whether a JSON value is acceptable for this field type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String | Self::Text, Value::String(_)) => true,
            (Self::Number, Value::Number(_)) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Datetime, Value::String(s)) => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
            (Self::Url, Value::String(s)) => {
                ["http://", "https://", "mailto:"]
                    .iter()
                    .any(|scheme| s.starts_with(scheme))
            }
            _ => false,
        }
    }
}

/// A single field of a schema type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field key in the stored document.
    pub name: String,

    /// Label shown to authors.
    pub title: String,

    /// Value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDefinition {
    /// Create a field definition.
    pub fn new(name: impl Into<String>, title: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            field_type,
        }
    }
}

/// A named content type with its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTypeDefinition {
    /// Type name, matched against a document's `_type`.
    pub name: String,

    /// Label shown to authors.
    pub title: String,

    /// Document or embedded object.
    #[serde(rename = "type")]
    pub kind: SchemaKind,

    /// Declared fields, in authoring order.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl SchemaTypeDefinition {
    /// Create a document type with no fields.
    pub fn document(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            kind: SchemaKind::Document,
            fields: Vec::new(),
        }
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_field_type_accepts() {
        assert!(FieldType::String.accepts(&json!("hello")));
        assert!(!FieldType::String.accepts(&json!(3)));
        assert!(FieldType::Number.accepts(&json!(3.5)));
        assert!(FieldType::Boolean.accepts(&json!(false)));
        assert!(FieldType::Datetime.accepts(&json!("2024-03-01T10:00:00Z")));
        assert!(!FieldType::Datetime.accepts(&json!("yesterday")));
        assert!(FieldType::Url.accepts(&json!("https://example.com")));
        assert!(!FieldType::Url.accepts(&json!("example.com")));
    }

    #[test]
    fn test_definition_serializes_with_type_key() {
        let def = SchemaTypeDefinition::document("post", "Post").field(FieldDefinition::new(
            "title",
            "Title",
            FieldType::String,
        ));

        let value = serde_json::to_value(&def).expect("serialize");
        assert_eq!(value["type"], "document");
        assert_eq!(value["fields"][0]["type"], "string");
        assert_eq!(def.get_field("title").map(|f| f.field_type), Some(FieldType::String));
        assert!(def.get_field("body").is_none());
    }
}
