//! Content types observed by the site.
//!
//! Documents are owned by the external content store; these are read-only
//! snapshots decoded from query results.

use serde::{Deserialize, Serialize};

/// Query selecting the title of the first `frontPage` document.
pub const FRONT_PAGE_QUERY: &str = r#"*[_type == "frontPage"][0]{title}"#;

/// Cache tag attached to every front page fetch.
pub const FRONT_PAGE_TAG: &str = "frontPage";

/// The `frontPage` document as returned by [`FRONT_PAGE_QUERY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontPage {
    /// Page heading. Authors may leave it unset.
    #[serde(default)]
    pub title: Option<String>,
}

impl FrontPage {
    /// Title to display, empty when the document has none.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}
