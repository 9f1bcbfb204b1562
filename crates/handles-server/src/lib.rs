//! Handles Server Library
//!
//! Serves `/.well-known/atproto-did` for a set of handles and redirects
//! browsers visiting a handle to its profile.

pub mod config;
pub mod error;
pub mod server;

pub use config::{Config, FallbackTemplate};
pub use error::{RequestError, Result, ServerError};
pub use server::{create_router, start_server, ServerState, SharedState};
