//! Frontpage Schema Library
//!
//! Declarative descriptions of the documents authored in the content store.
//! The registry is exported as JSON for the authoring backend, which uses it to
//! build editing forms and validate input. Nothing here is consulted when
//! content is fetched.
//!
//! # Modules
//!
//! - [`types`] - Document and field definitions
//! - [`documents`] - The site's document types
//! - [`registry`] - The schema registry, JSON export and document validation

pub mod documents;
pub mod error;
pub mod registry;
pub mod types;

pub use documents::front_page;
pub use error::{Result, SchemaError};
pub use registry::{Schema, site_schema};
pub use types::{FieldDefinition, FieldType, SchemaKind, SchemaTypeDefinition};
