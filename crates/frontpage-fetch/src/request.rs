//! Fetch modes, perspectives, tokens and the outbound request.

use std::fmt;

use crate::query::QueryParams;

/// Which version of content a call reads, derived from draft-mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Last published content.
    Published,
    /// Unpublished drafts layered over published content.
    Draft,
}

impl FetchMode {
    /// Classify the caller's draft-mode flag.
    pub fn from_draft_mode(enabled: bool) -> Self {
        if enabled { Self::Draft } else { Self::Published }
    }

    /// Perspective sent to the store for this mode.
    pub fn perspective(&self) -> Perspective {
        match self {
            Self::Published => Perspective::Published,
            Self::Draft => Perspective::PreviewDrafts,
        }
    }
}

/// The store's name for which version of content to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    /// `published`
    Published,
    /// `previewDrafts`
    PreviewDrafts,
}

impl Perspective {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::PreviewDrafts => "previewDrafts",
        }
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read path to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportChoice {
    /// Uncached API, always current.
    Direct,
    /// CDN-cached API, may lag behind the store.
    CdnBacked,
}

impl TransportChoice {
    /// Select a transport from a CDN preference.
    pub fn from_use_cdn(use_cdn: bool) -> Self {
        if use_cdn { Self::CdnBacked } else { Self::Direct }
    }
}

/// Read token for the store. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a token. Blank tokens are treated as absent.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// The raw secret, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Fully resolved request handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Query text.
    pub query: String,

    /// Parameter values.
    pub params: QueryParams,

    /// Content version to read.
    pub perspective: Perspective,

    /// Token to authenticate with, if any.
    pub token: Option<AuthToken>,

    /// Cache tags for the rendering layer. Not sent to the store.
    pub tags: Option<Vec<String>>,
}
