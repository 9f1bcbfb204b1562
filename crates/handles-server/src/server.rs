//! HTTP server for handle verification and redirects
//!
//! Every request is routed on its path alone:
//! - `/healthz` answers `OK` without looking at the handle
//! - `/.well-known/atproto-did` answers with the DID of the handle in `Host`
//! - anything else redirects to the Bluesky profile, or to the fallback URL
//!   when the handle is not registered

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use handle_resolver::{Did, Resolver};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::{FallbackTemplate, DEFAULT_RESOLVE_TIMEOUT};
use crate::error::RequestError;

pub const HEALTH_PATH: &str = "/healthz";
pub const DID_PATH: &str = "/.well-known/atproto-did";
pub const PROFILE_URL: &str = "https://bsky.app/profile/";

pub const HEALTHY_BODY: &str = "OK";
pub const NOT_VERIFIED_BODY: &str = "Handle cannot be verified, did not found.";

/// Shared state for the HTTP server
pub struct ServerState {
    pub resolver: Arc<dyn Resolver>,
    pub fallback_url: FallbackTemplate,
    pub resolve_timeout: Duration,
}

impl ServerState {
    pub fn new(resolver: Arc<dyn Resolver>, fallback_url: FallbackTemplate) -> Self {
        Self {
            resolver,
            fallback_url,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    pub fn with_resolve_timeout(mut self, resolve_timeout: Duration) -> Self {
        self.resolve_timeout = resolve_timeout;
        self
    }
}

pub type SharedState = Arc<ServerState>;

/// The handle named by a request's `Host` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedHandle {
    pub handle: String,
    /// The handle without its leftmost label, lower-cased
    pub domain: String,
}

impl RequestedHandle {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, RequestError> {
        let handle = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let domain = handle
            .split_once('.')
            .map(|(_, domain)| domain.to_lowercase())
            .unwrap_or_default();

        if handle.is_empty() || domain.is_empty() {
            return Err(RequestError::MissingHandle);
        }

        Ok(Self {
            handle: handle.to_string(),
            domain,
        })
    }
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route(HEALTH_PATH, any(health))
        .route(DID_PATH, any(verify_handle))
        .fallback(redirect_handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, addr: SocketAddr) -> std::io::Result<()> {
    let router = create_router(state);
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

async fn health() -> &'static str {
    HEALTHY_BODY
}

async fn resolve(
    state: &ServerState,
    requested: &RequestedHandle,
) -> Result<Option<Did>, RequestError> {
    let lookup = state.resolver.resolve(&requested.handle);
    let did = tokio::time::timeout(state.resolve_timeout, lookup)
        .await
        .map_err(|_| RequestError::Timeout)?
        .map_err(RequestError::Unavailable)?;

    debug!(
        handle = %requested.handle,
        domain = %requested.domain,
        provider = state.resolver.provider(),
        did = did.as_ref().map(Did::as_str),
        "Obtained did from provider"
    );
    Ok(did)
}

async fn verify_handle(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Response, RequestError> {
    let requested = RequestedHandle::from_headers(&headers)?;

    match resolve(&state, &requested).await? {
        Some(did) => {
            debug!(handle = %requested.handle, "Verified handle");
            Ok(did.into_inner().into_response())
        }
        None => {
            debug!(handle = %requested.handle, "Denied verification, no did");
            Ok((StatusCode::NOT_FOUND, NOT_VERIFIED_BODY).into_response())
        }
    }
}

async fn redirect_handle(
    State(state): State<SharedState>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, RequestError> {
    let requested = RequestedHandle::from_headers(&headers)?;

    let location = match resolve(&state, &requested).await? {
        Some(_) => format!("{PROFILE_URL}{}", requested.handle),
        None => state
            .fallback_url
            .render(&requested.domain, &requested.handle),
    };

    debug!(
        handle = %requested.handle,
        path = uri.path(),
        location = %location,
        "Redirecting"
    );
    redirect(location)
}

fn redirect(location: String) -> Result<Response, RequestError> {
    let value = HeaderValue::try_from(location.as_str())
        .map_err(|_| RequestError::InvalidRedirect(location.clone()))?;

    Ok((
        StatusCode::TEMPORARY_REDIRECT,
        [
            (header::LOCATION, value),
            (header::CONTENT_TYPE, HeaderValue::from_static("text/plain")),
        ],
    )
        .into_response())
}
