//! Caller-side description of a content query.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::request::TransportChoice;

/// Named query parameters, referenced as `$name` inside the query.
pub type QueryParams = BTreeMap<String, Value>;

/// A single query against the content store, built fresh by each caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentQuery {
    /// Query text in the store's query language.
    pub query: String,

    /// Parameter values.
    pub params: QueryParams,

    /// Cache-invalidation tags forwarded to the rendering layer.
    pub tags: Option<Vec<String>>,

    /// Read through the CDN-backed transport.
    pub use_cdn: bool,
}

impl ContentQuery {
    /// Create a query with no parameters, no tags and the direct transport.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Bind a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Replace all parameters.
    #[must_use]
    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    /// Set the cache tags.
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Choose the CDN-backed transport.
    #[must_use]
    pub fn use_cdn(mut self, use_cdn: bool) -> Self {
        self.use_cdn = use_cdn;
        self
    }

    /// Transport selected by the CDN preference.
    pub fn transport(&self) -> TransportChoice {
        TransportChoice::from_use_cdn(self.use_cdn)
    }
}
