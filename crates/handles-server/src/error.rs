//! Error types for the handles server

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use handle_resolver::ResolverError;
use tracing::{error, warn};

#[derive(Debug)]
pub enum ServerError {
    Config(String),
    Resolver(ResolverError),
    Io(Box<std::io::Error>),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ServerError::Resolver(err) => write!(f, "Resolver error: {}", err),
            ServerError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Resolver(err) => Some(err),
            ServerError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ResolverError> for ServerError {
    fn from(err: ResolverError) -> Self {
        ServerError::Resolver(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

pub const MISSING_HANDLE_BODY: &str = "A request must include a Handle in the `host` header.";
pub const UNAVAILABLE_BODY: &str = "Handle could not be resolved, the provider is unavailable.";
pub const TIMEOUT_BODY: &str = "Handle could not be resolved in time.";
pub const INVALID_REDIRECT_BODY: &str = "Handle could not be redirected.";

/// Failures while answering a single request.
///
/// Clients only ever see the fixed body for each variant; details go to the
/// log.
#[derive(Debug)]
pub enum RequestError {
    MissingHandle,
    Unavailable(ResolverError),
    Timeout,
    InvalidRedirect(String),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RequestError::MissingHandle => (StatusCode::BAD_REQUEST, MISSING_HANDLE_BODY),
            RequestError::Unavailable(err) => {
                error!(error = %err, "Resolver failed");
                (StatusCode::BAD_GATEWAY, UNAVAILABLE_BODY)
            }
            RequestError::Timeout => {
                warn!("Resolver timed out");
                (StatusCode::GATEWAY_TIMEOUT, TIMEOUT_BODY)
            }
            RequestError::InvalidRedirect(location) => {
                error!(location = %location, "Redirect target is not a valid header value");
                (StatusCode::INTERNAL_SERVER_ERROR, INVALID_REDIRECT_BODY)
            }
        };

        (status, body).into_response()
    }
}
