//! Document types authored for the site.

use crate::types::{FieldDefinition, FieldType, SchemaTypeDefinition};

/// The `frontPage` document: the landing page content.
pub fn front_page() -> SchemaTypeDefinition {
    SchemaTypeDefinition::document("frontPage", "Frontpage").field(FieldDefinition::new(
        "title",
        "Title",
        FieldType::String,
    ))
}
