//! The content fetch gateway.

use std::{sync::Arc, time::Duration};

use frontpage_core::Config;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{FetchError, Result},
    query::ContentQuery,
    request::{AuthToken, FetchMode, QueryRequest, TransportChoice},
    transport::{HttpTransport, Transport},
};

/// Mediates every content read between the rendering layer and the store.
///
/// Holds the two long-lived transports and the optional read token; nothing
/// else is kept between calls, so a gateway can be cloned into concurrent
/// request handlers freely.
#[derive(Clone)]
pub struct ContentGateway {
    direct: Arc<dyn Transport>,
    cdn: Arc<dyn Transport>,
    token: Option<AuthToken>,
}

impl ContentGateway {
    /// Create a gateway from explicitly constructed transports.
    pub fn new(
        direct: Arc<dyn Transport>,
        cdn: Arc<dyn Transport>,
        token: Option<AuthToken>,
    ) -> Self {
        Self { direct, cdn, token }
    }

    /// Build the direct and CDN-backed HTTP transports from configuration.
    pub fn from_config(config: &Config, token: Option<AuthToken>) -> Result<Self> {
        let timeout = Duration::from_secs(config.server.request_timeout_secs);
        let direct = HttpTransport::new(
            config.api_base_url(),
            config.api_version(),
            &config.store.dataset,
            TransportChoice::Direct,
            timeout,
        )?;
        let cdn = HttpTransport::new(
            config.cdn_base_url(),
            config.api_version(),
            &config.store.dataset,
            TransportChoice::CdnBacked,
            timeout,
        )?;

        tracing::info!(
            direct = %direct.query_url(),
            cdn = %cdn.query_url(),
            has_token = token.is_some(),
            "content gateway configured"
        );

        Ok(Self::new(Arc::new(direct), Arc::new(cdn), token))
    }

    /// Whether a read token is available.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// The transport serving `choice`.
    pub fn transport(&self, choice: TransportChoice) -> &Arc<dyn Transport> {
        match choice {
            TransportChoice::Direct => &self.direct,
            TransportChoice::CdnBacked => &self.cdn,
        }
    }

    /// Resolve the outbound request for `query` in `mode`.
    ///
    /// Published reads carry the token when one is configured. Draft reads
    /// switch to the preview perspective and require it.
    pub fn request_for(&self, mode: FetchMode, query: &ContentQuery) -> Result<QueryRequest> {
        if mode == FetchMode::Draft && self.token.is_none() {
            return Err(FetchError::AuthenticationRequired);
        }

        Ok(QueryRequest {
            query: query.query.clone(),
            params: query.params.clone(),
            perspective: mode.perspective(),
            token: self.token.clone(),
            tags: query.tags.clone(),
        })
    }

    /// Run `query` and return the raw result.
    pub async fn fetch(&self, mode: FetchMode, query: &ContentQuery) -> Result<Value> {
        let request = self.request_for(mode, query)?;
        let choice = query.transport();

        tracing::debug!(
            ?mode,
            transport = ?choice,
            perspective = %request.perspective,
            tags = ?request.tags,
            "issuing content query"
        );

        Ok(self.transport(choice).execute(&request).await?)
    }

    /// Run `query` and decode the result into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        mode: FetchMode,
        query: &ContentQuery,
    ) -> Result<T> {
        let value = self.fetch(mode, query).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl std::fmt::Debug for ContentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentGateway")
            .field("direct", &self.direct.choice())
            .field("cdn", &self.cdn.choice())
            .field("token", &self.token)
            .finish()
    }
}
