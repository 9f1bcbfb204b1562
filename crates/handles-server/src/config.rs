//! Configuration for the handles server

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use handle_resolver::ProviderOptions;
use url::Url;

use crate::error::{Result, ServerError};

pub const DEFAULT_FALLBACK_URL: &str = "https://{domain}?utm_source=handles-server&utm_medium=http&utm_campaign=redirect&utm_term={handle}";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_millis(5000);

const DOMAIN_TOKEN: &str = "{domain}";
const HANDLE_TOKEN: &str = "{handle}";

/// Redirect target for handles without a DID
///
/// Every `{domain}` and `{handle}` in the template is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTemplate(String);

impl FallbackTemplate {
    /// Accept a template only if it renders to an absolute http(s) URL.
    pub fn parse(template: &str) -> Result<Self> {
        let template = Self(template.to_string());
        let sample = template.render("example.com", "alice.example.com");

        let url = Url::parse(&sample).map_err(|e| {
            ServerError::Config(format!("Fallback URL '{}' is not a URL: {}", template.0, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ServerError::Config(format!(
                "Fallback URL '{}' must use http or https",
                template.0
            )));
        }

        Ok(template)
    }

    pub fn render(&self, domain: &str, handle: &str) -> String {
        self.0
            .replace(DOMAIN_TOKEN, domain)
            .replace(HANDLE_TOKEN, handle)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FallbackTemplate {
    fn default() -> Self {
        Self(DEFAULT_FALLBACK_URL.to_string())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// `provider:config` selection string, checked when the resolver is built
    pub provider: Option<String>,
    pub fallback_url: FallbackTemplate,
    pub table: Option<String>,
    pub resolve_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            provider: None,
            fallback_url: FallbackTemplate::default(),
            table: None,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parse configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let host = match var("HOST") {
            Some(value) => value.parse::<IpAddr>().map_err(|_| {
                ServerError::Config(format!("HOST must be an IP address, got '{}'", value))
            })?,
            None => DEFAULT_HOST,
        };

        let port = match var("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| {
                ServerError::Config(format!("PORT must be a port number, got '{}'", value))
            })?,
            None => DEFAULT_PORT,
        };

        let fallback_url = match var("HANDLES_FALLBACK_URL") {
            Some(value) => FallbackTemplate::parse(&value)?,
            None => FallbackTemplate::default(),
        };

        let resolve_timeout = match var("HANDLES_RESOLVE_TIMEOUT_MS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or_else(|| {
                    ServerError::Config(format!(
                        "HANDLES_RESOLVE_TIMEOUT_MS must be a positive number of milliseconds, got '{}'",
                        value
                    ))
                })?,
            None => DEFAULT_RESOLVE_TIMEOUT,
        };

        Ok(Self {
            host,
            port,
            provider: var("HANDLES_PROVIDER"),
            fallback_url,
            table: var("HANDLES_TABLE"),
            resolve_timeout,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn provider_options(&self) -> ProviderOptions {
        ProviderOptions {
            table: self.table.clone(),
            ..ProviderOptions::default()
        }
    }
}
