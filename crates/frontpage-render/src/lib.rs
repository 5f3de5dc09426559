//! Frontpage Render Library
//!
//! Turns fetched content into HTML.
//!
//! # Modules
//!
//! - [`template`] - Parsed HTML templates with named slots
//! - [`page`] - Page renderers built on the default templates

pub mod page;
pub mod template;

pub use page::PageRenderer;
pub use template::{Template, TemplateError, TemplateRegistry, TemplateVars, escape_html};
