//! Frontpage Core Library
//!
//! Configuration, error handling and the content types rendered by the Frontpage site.

pub mod config;
pub mod content;
pub mod error;

pub use config::Config;
pub use content::{FRONT_PAGE_QUERY, FRONT_PAGE_TAG, FrontPage};
pub use error::{CoreError, Result};
