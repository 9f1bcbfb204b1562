//! Handles Server - atproto handle verification and redirects
//!
//! Resolves the handle in each request's `Host` header with the provider
//! selected by `HANDLES_PROVIDER`.

use std::sync::Arc;

use handle_resolver::ResolverFactory;
use handles_server::{start_server, Config, Result, ServerState, SharedState};
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env()
        .add_directive("handles_server=info".parse()?)
        .add_directive("handle_resolver=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting handles server...");

    let config = Config::from_env().inspect_err(|e| error!("{}", e))?;
    info!("Address: {}", config.addr());
    info!("Fallback URL: {}", config.fallback_url.as_str());
    info!("Resolve timeout: {} ms", config.resolve_timeout.as_millis());

    let resolver = ResolverFactory::default()
        .build(config.provider.as_deref(), &config.provider_options())
        .inspect_err(|e| error!("Failed to build resolver: {}", e))?;

    let state: SharedState = Arc::new(
        ServerState::new(resolver, config.fallback_url.clone())
            .with_resolve_timeout(config.resolve_timeout),
    );

    start_server(state, config.addr()).await?;

    Ok(())
}
