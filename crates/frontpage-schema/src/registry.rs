//! Schema registry.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::{
    documents,
    error::{Result, SchemaError},
    types::SchemaTypeDefinition,
};

/// Registered schema types, exported to the authoring backend.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    types: Vec<SchemaTypeDefinition>,
}

impl Schema {
    /// Build a registry, rejecting duplicate or malformed names.
    pub fn new(types: Vec<SchemaTypeDefinition>) -> Result<Self> {
        let mut type_names = HashSet::new();

        for def in &types {
            check_name(&def.name)?;
            if !type_names.insert(def.name.as_str()) {
                return Err(SchemaError::DuplicateType(def.name.clone()));
            }

            let mut field_names = HashSet::new();
            for field in &def.fields {
                check_name(&field.name)?;
                if !field_names.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        type_name: def.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        tracing::debug!(types = types.len(), "schema registry built");
        Ok(Self { types })
    }

    /// All registered types, in registration order.
    pub fn types(&self) -> &[SchemaTypeDefinition] {
        &self.types
    }

    /// Look up a type by name.
    pub fn get(&self, name: &str) -> Option<&SchemaTypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Declarative JSON description consumed by the authoring backend.
    pub fn to_json(&self) -> Value {
        serde_json::json!({ "types": self.types })
    }

    /// Validate a document against the type named by its `_type`.
    ///
    /// Keys starting with `_` are system attributes and are not checked.
    /// `null` values are treated as unset.
    pub fn validate_document(&self, document: &Value) -> Result<()> {
        let Some(object) = document.as_object() else {
            return Err(SchemaError::Validation {
                type_name: String::new(),
                issues: vec!["document must be a JSON object".to_string()],
            });
        };

        let type_name = object
            .get("_type")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Validation {
                type_name: String::new(),
                issues: vec!["missing `_type`".to_string()],
            })?;

        let def = self
            .get(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))?;

        let mut issues = Vec::new();
        for (key, value) in object {
            if key.starts_with('_') || value.is_null() {
                continue;
            }
            match def.get_field(key) {
                None => issues.push(format!("unknown field `{key}`")),
                Some(field) if !field.field_type.accepts(value) => issues.push(format!(
                    "field `{key}` expects {}",
                    field.field_type.as_str()
                )),
                Some(_) => {}
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Validation {
                type_name: type_name.to_string(),
                issues,
            })
        }
    }
}

/// The site's schema: every document type authored for it.
pub fn site_schema() -> Result<Schema> {
    Schema::new(vec![documents::front_page()])
}

fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidName(name.to_string()))
    }
}
