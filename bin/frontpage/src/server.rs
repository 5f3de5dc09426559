//! HTTP server rendering the front page.
//!
//! Draft mode is carried per request in a cookie whose value is a random
//! bypass token generated when the server starts. Published renders are kept
//! in a tag-indexed cache until a revalidation request evicts their tags.

use std::{collections::HashMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use frontpage_core::{FRONT_PAGE_QUERY, FRONT_PAGE_TAG, FrontPage};
use frontpage_fetch::{ContentGateway, ContentQuery, FetchError, FetchMode};
use frontpage_render::PageRenderer;
use serde::Deserialize;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Cookie marking a request as draft mode.
pub const DRAFT_COOKIE: &str = "frontpage_draft";

/// A rendered page and the cache tags it was fetched with.
#[derive(Debug, Clone)]
struct CachedPage {
    html: String,
    tags: Vec<String>,
}

#[derive(Debug, Default)]
struct CacheEntries {
    pages: HashMap<String, CachedPage>,
    /// Bumped on every revalidation of a tag.
    generations: HashMap<String, u64>,
}

impl CacheEntries {
    fn generation(&self, tags: &[String]) -> u64 {
        tags.iter()
            .map(|tag| self.generations.get(tag).copied().unwrap_or(0))
            .sum()
    }
}

/// Rendered published pages keyed by path.
///
/// Each tag carries a generation counter. A render is only stored if none of
/// its tags were revalidated between the start of its fetch and the insert.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: RwLock<CacheEntries>,
}

impl RenderCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached HTML for `path`.
    pub async fn get(&self, path: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .pages
            .get(path)
            .map(|p| p.html.clone())
    }

    /// Current generation of `tags`. Take it before fetching the content
    /// that will be passed to [`RenderCache::insert_if_current`].
    pub async fn generation(&self, tags: &[String]) -> u64 {
        self.entries.read().await.generation(tags)
    }

    /// Store a render under `path` unless one of `tags` was revalidated since
    /// `generation` was taken. Returns whether the render was stored.
    pub async fn insert_if_current(
        &self,
        path: impl Into<String>,
        html: String,
        tags: Vec<String>,
        generation: u64,
    ) -> bool {
        let mut entries = self.entries.write().await;
        if entries.generation(&tags) != generation {
            return false;
        }
        entries.pages.insert(path.into(), CachedPage { html, tags });
        true
    }

    /// Evict every page carrying `tag`. Returns the number evicted.
    pub async fn revalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.entries.write().await;
        *entries.generations.entry(tag.to_string()).or_default() += 1;

        let before = entries.pages.len();
        entries
            .pages
            .retain(|_, page| !page.tags.iter().any(|t| t == tag));
        before - entries.pages.len()
    }

    /// Number of cached pages.
    pub async fn len(&self) -> usize {
        self.entries.read().await.pages.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Shared server state.
pub struct ServerState {
    /// Content gateway.
    pub gateway: ContentGateway,
    /// Page renderer.
    pub renderer: PageRenderer,
    /// Secret for `/api/draft`.
    pub draft_secret: Option<String>,
    /// Secret for `/api/revalidate`.
    pub revalidate_secret: Option<String>,
    /// Published render cache.
    pub cache: RenderCache,
    /// Draft cookie value, unique to this process.
    draft_bypass: String,
}

impl ServerState {
    /// Create server state with an empty cache and a fresh draft bypass value.
    pub fn new(
        gateway: ContentGateway,
        renderer: PageRenderer,
        draft_secret: Option<String>,
        revalidate_secret: Option<String>,
    ) -> Self {
        Self {
            gateway,
            renderer,
            draft_secret: draft_secret.filter(|s| !s.is_empty()),
            revalidate_secret: revalidate_secret.filter(|s| !s.is_empty()),
            cache: RenderCache::new(),
            draft_bypass: Uuid::new_v4().simple().to_string(),
        }
    }

    /// Whether the request carries this server's draft cookie.
    pub fn is_draft_mode(&self, headers: &HeaderMap) -> bool {
        is_draft_mode(headers, &self.draft_bypass)
    }
}

/// Create the site router.
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/api/draft", get(enable_draft_handler))
        .route("/api/disable-draft", get(disable_draft_handler))
        .route("/api/revalidate", post(revalidate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Whether the request carries the draft cookie with the value `bypass`.
pub fn is_draft_mode(headers: &HeaderMap, bypass: &str) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == DRAFT_COOKIE && constant_time_compare(value, bypass))
}

/// Compare two strings without short-circuiting on the first differing byte.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

async fn home_handler(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let draft = state.is_draft_mode(&headers);

    if !draft {
        if let Some(html) = state.cache.get("/").await {
            return Html(html).into_response();
        }
    }

    let query = ContentQuery::new(FRONT_PAGE_QUERY).tags([FRONT_PAGE_TAG]);
    let tags = query.tags.clone().unwrap_or_default();
    let generation = state.cache.generation(&tags).await;
    let mode = FetchMode::from_draft_mode(draft);

    let page = match state
        .gateway
        .fetch_as::<Option<FrontPage>>(mode, &query)
        .await
    {
        Ok(page) => page.unwrap_or_default(),
        Err(err) => return fetch_error_response(&state, &err),
    };

    match state.renderer.render_home(&page, draft) {
        Ok(html) => {
            if !draft
                && !state
                    .cache
                    .insert_if_current("/", html.clone(), tags, generation)
                    .await
            {
                tracing::debug!("front page revalidated during fetch; render not cached");
            }
            Html(html).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to render home page");
            (StatusCode::INTERNAL_SERVER_ERROR, "render error").into_response()
        }
    }
}

fn fetch_error_response(state: &ServerState, err: &FetchError) -> Response {
    let status = match err {
        FetchError::AuthenticationRequired => StatusCode::INTERNAL_SERVER_ERROR,
        FetchError::Transport(_) | FetchError::Decode(_) => StatusCode::BAD_GATEWAY,
    };
    tracing::error!(error = %err, status = status.as_u16(), "front page fetch failed");

    let message = if err.is_configuration_error() {
        "The site is not configured for draft mode."
    } else {
        "The content store could not be reached."
    };

    match state.renderer.render_error(status.as_u16(), message) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => (status, message).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct SecretParams {
    secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RevalidateParams {
    tag: String,
    secret: Option<String>,
}

/// Check a request secret against the configured one.
fn check_secret(configured: Option<&str>, given: Option<&str>) -> Result<(), StatusCode> {
    match (configured, given) {
        (None, _) => Err(StatusCode::NOT_FOUND),
        (Some(expected), Some(given)) if constant_time_compare(given, expected) => Ok(()),
        (Some(_), _) => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn enable_draft_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SecretParams>,
) -> Response {
    if let Err(status) = check_secret(state.draft_secret.as_deref(), params.secret.as_deref()) {
        tracing::warn!(status = status.as_u16(), "draft mode request rejected");
        return status.into_response();
    }

    tracing::info!("draft mode enabled");
    let cookie = format!(
        "{DRAFT_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        state.draft_bypass
    );
    ([(header::SET_COOKIE, cookie)], Redirect::temporary("/")).into_response()
}

async fn disable_draft_handler() -> Response {
    tracing::info!("draft mode disabled");
    let cookie = format!("{DRAFT_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");
    ([(header::SET_COOKIE, cookie)], Redirect::temporary("/")).into_response()
}

async fn revalidate_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<RevalidateParams>,
) -> Response {
    if let Err(status) = check_secret(
        state.revalidate_secret.as_deref(),
        params.secret.as_deref(),
    ) {
        tracing::warn!(status = status.as_u16(), "revalidation request rejected");
        return status.into_response();
    }

    let evicted = state.cache.revalidate_tag(&params.tag).await;
    tracing::info!(tag = %params.tag, evicted, "revalidated cache tag");

    Json(serde_json::json!({
        "revalidated": true,
        "tag": params.tag,
        "evicted": evicted,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use frontpage_core::config::SiteConfig;
    use frontpage_fetch::{
        AuthToken, Perspective, QueryRequest, Transport, TransportChoice, TransportError,
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use super::*;

    /// Store fake answering with a title that depends on the perspective.
    ///
    /// With [`FakeStore::hold_next`] set, the next call reads the title, then
    /// waits for `release` before answering.
    struct FakeStore {
        calls: AtomicUsize,
        published_title: Mutex<String>,
        hold: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    impl FakeStore {
        fn new(title: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                published_title: Mutex::new(title.to_string()),
                hold: AtomicBool::new(false),
                entered: Notify::new(),
                release: Notify::new(),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn publish(&self, title: &str) {
            *self.published_title.lock().expect("lock") = title.to_string();
        }

        fn hold_next(&self) {
            self.hold.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Transport for FakeStore {
        fn choice(&self) -> TransportChoice {
            TransportChoice::Direct
        }

        async fn execute(&self, request: &QueryRequest) -> Result<Value, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let title = match request.perspective {
                Perspective::Published => self.published_title.lock().expect("lock").clone(),
                Perspective::PreviewDrafts => "Draft Title".to_string(),
            };

            if self.hold.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(json!({ "title": title }))
        }
    }

    fn app(store: Arc<FakeStore>, token: Option<&str>) -> (Router, Arc<ServerState>) {
        let gateway = ContentGateway::new(store.clone(), store, token.and_then(AuthToken::new));
        let state = Arc::new(ServerState::new(
            gateway,
            PageRenderer::new(SiteConfig::default()),
            Some("let-me-in".to_string()),
            Some("refresh".to_string()),
        ));
        (create_router(state.clone()), state)
    }

    async fn get(
        router: &Router,
        uri: &str,
        cookie: Option<&str>,
    ) -> (StatusCode, HeaderMap, String) {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = router
            .clone()
            .oneshot(request.body(Body::empty()).expect("request"))
            .await
            .expect("response");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.expect("body").to_bytes();
        (status, headers, String::from_utf8_lossy(&body).to_string())
    }

    async fn post(router: &Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let status = response.status();
        let body = response.into_body().collect().await.expect("body").to_bytes();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    fn set_cookie(headers: &HeaderMap) -> String {
        headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("set-cookie")
            .to_string()
    }

    /// Enable draft mode through the endpoint and return the `name=value` pair.
    async fn draft_cookie(router: &Router) -> String {
        let (status, headers, _) = get(router, "/api/draft?secret=let-me-in", None).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        let cookie = set_cookie(&headers);
        cookie.split(';').next().expect("cookie pair").to_string()
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hell", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_is_draft_mode() {
        let bypass = "3f2a9c";
        let mut headers = HeaderMap::new();
        assert!(!is_draft_mode(&headers, bypass));

        headers.insert(
            header::COOKIE,
            "theme=dark; frontpage_draft=3f2a9c".parse().expect("header"),
        );
        assert!(is_draft_mode(&headers, bypass));

        headers.insert(header::COOKIE, "frontpage_draft=1".parse().expect("header"));
        assert!(!is_draft_mode(&headers, bypass));

        headers.insert(header::COOKIE, "frontpage_draft=".parse().expect("header"));
        assert!(!is_draft_mode(&headers, bypass));
    }

    #[test]
    fn test_check_secret() {
        assert_eq!(check_secret(None, Some("x")), Err(StatusCode::NOT_FOUND));
        assert_eq!(check_secret(Some("x"), None), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(check_secret(Some("x"), Some("y")), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(check_secret(Some("x"), Some("xx")), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(check_secret(Some("x"), Some("x")), Ok(()));
    }

    #[tokio::test]
    async fn test_render_cache_skips_insert_after_revalidation() {
        let cache = RenderCache::new();
        let tags = vec!["frontPage".to_string()];

        let generation = cache.generation(&tags).await;
        cache.revalidate_tag("frontPage").await;
        let stored = cache
            .insert_if_current("/", "old".to_string(), tags.clone(), generation)
            .await;
        assert!(!stored);
        assert!(cache.is_empty().await);

        let generation = cache.generation(&tags).await;
        cache.revalidate_tag("other").await;
        let stored = cache
            .insert_if_current("/", "new".to_string(), tags, generation)
            .await;
        assert!(stored);
        assert_eq!(cache.get("/").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_home_renders_published_title() {
        let store = FakeStore::new("Welcome");
        let (router, _) = app(store.clone(), None);

        let (status, _, body) = get(&router, "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<h1 class="headline">Welcome</h1>"#));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_home_serves_cached_render_until_revalidated() {
        let store = FakeStore::new("Welcome");
        let (router, state) = app(store.clone(), None);

        get(&router, "/", None).await;
        store.publish("Updated");
        let (_, _, body) = get(&router, "/", None).await;
        assert!(body.contains("Welcome"));
        assert_eq!(store.calls(), 1);

        let (status, body) = post(&router, "/api/revalidate?tag=frontPage&secret=refresh").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(json["evicted"], 1);
        assert!(state.cache.is_empty().await);

        let (_, _, body) = get(&router, "/", None).await;
        assert!(body.contains("Updated"));
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_in_flight_during_revalidation_is_not_cached() {
        let store = FakeStore::new("Old");
        let (router, state) = app(store.clone(), None);

        store.hold_next();
        let in_flight = tokio::spawn({
            let router = router.clone();
            async move { get(&router, "/", None).await }
        });
        store.entered.notified().await;

        store.publish("New");
        let (status, body) = post(&router, "/api/revalidate?tag=frontPage&secret=refresh").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(json["evicted"], 0);

        store.release.notify_one();
        let (status, _, body) = in_flight.await.expect("join");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Old"));
        assert!(state.cache.is_empty().await);

        let (_, _, body) = get(&router, "/", None).await;
        assert!(body.contains("New"));
        assert!(!body.contains("Old"));
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_revalidate_requires_secret() {
        let (router, _) = app(FakeStore::new("Welcome"), None);

        let (status, _) = post(&router, "/api/revalidate?tag=frontPage&secret=nope").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_draft_mode_with_token_shows_drafts_and_skips_cache() {
        let store = FakeStore::new("Welcome");
        let (router, state) = app(store.clone(), Some("sk-read"));

        let cookie = draft_cookie(&router).await;
        let (status, _, body) = get(&router, "/", Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Draft Title"));
        assert!(body.contains("draft-banner\">"));
        assert!(state.cache.is_empty().await);

        get(&router, "/", Some(&cookie)).await;
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_guessed_draft_cookie_gets_published_content() {
        let store = FakeStore::new("Welcome");
        let (router, _) = app(store.clone(), Some("sk-read"));

        let (status, _, body) = get(&router, "/", Some("frontpage_draft=1")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Welcome"));
        assert!(!body.contains("Draft Title"));
        assert!(!body.contains("draft-banner\">"));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_draft_cookie_is_unique_per_server() {
        let (first, _) = app(FakeStore::new("Welcome"), Some("sk-read"));
        let (second, _) = app(FakeStore::new("Welcome"), Some("sk-read"));

        let first_cookie = draft_cookie(&first).await;
        assert_ne!(first_cookie, draft_cookie(&second).await);

        let (_, _, body) = get(&second, "/", Some(&first_cookie)).await;
        assert!(!body.contains("Draft Title"));
    }

    #[tokio::test]
    async fn test_draft_mode_without_token_fails_without_fetching() {
        let store = FakeStore::new("Welcome");
        let (router, _) = app(store.clone(), None);

        let cookie = draft_cookie(&router).await;
        let (status, _, body) = get(&router, "/", Some(&cookie)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("not configured for draft mode"));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_enable_and_disable_draft() {
        let (router, state) = app(FakeStore::new("Welcome"), Some("sk-read"));

        let (status, _, _) = get(&router, "/api/draft?secret=wrong", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, headers, _) = get(&router, "/api/draft?secret=let-me-in", None).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        let cookie = set_cookie(&headers);
        assert!(cookie.starts_with(&format!("frontpage_draft={};", state.draft_bypass)));
        assert!(!cookie.starts_with("frontpage_draft=1;"));
        assert!(cookie.contains("HttpOnly"));

        let (status, headers, _) = get(&router, "/api/disable-draft", None).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert!(set_cookie(&headers).contains("Max-Age=0"));
    }
}
