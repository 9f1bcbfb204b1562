//! Resolver selection from a `provider:config` string
//!
//! The part before the first colon picks a registered constructor, which
//! receives everything after it (further colons included).

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::error::{ResolverError, Result};
use crate::map::{self, MapResolver};
use crate::postgres::{self, RelationalResolver};
use crate::resolver::Resolver;

/// Builds a resolver from the provider-specific part of the configuration
pub type Constructor = fn(&str, &ProviderOptions) -> Result<Arc<dyn Resolver>>;

/// Settings shared by all providers that do not fit in the selection string
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Table holding handles for the relational provider
    pub table: Option<String>,
    /// Reads a named variable, used when a relational descriptor refers to
    /// another variable instead of holding a connection string.
    pub lookup_variable: fn(&str) -> Option<String>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            table: None,
            lookup_variable: env_variable,
        }
    }
}

fn env_variable(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Split a selection string at its first colon.
pub fn parse_provider_config(value: Option<&str>) -> Result<(&str, &str)> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or(ResolverError::MissingConfiguration)?;

    value
        .split_once(':')
        .ok_or_else(|| ResolverError::MalformedConfiguration(value.to_string()))
}

/// Registry of resolver constructors keyed by provider name
#[derive(Debug, Clone)]
pub struct ResolverFactory {
    constructors: HashMap<&'static str, Constructor>,
}

impl ResolverFactory {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    pub fn register(&mut self, key: &'static str, constructor: Constructor) -> &mut Self {
        self.constructors.insert(key, constructor);
        self
    }

    /// Registered provider keys, sorted
    pub fn providers(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.constructors.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Parse `config` and build the resolver it selects.
    pub fn build(
        &self,
        config: Option<&str>,
        options: &ProviderOptions,
    ) -> Result<Arc<dyn Resolver>> {
        let (key, body) = parse_provider_config(config)?;
        let constructor = self
            .constructors
            .get(key)
            .ok_or_else(|| ResolverError::UnknownProvider(key.to_string()))?;

        info!(provider = key, "Resolved configuration to provider");
        let resolver = constructor(body, options)?;
        info!(provider = key, "Instantiated provider");

        Ok(resolver)
    }
}

impl Default for ResolverFactory {
    fn default() -> Self {
        let mut factory = Self::new();
        factory
            .register(map::PROVIDER_KEY, build_map)
            .register(postgres::PROVIDER_KEY, build_relational);
        factory
    }
}

fn build_map(config: &str, _options: &ProviderOptions) -> Result<Arc<dyn Resolver>> {
    Ok(Arc::new(MapResolver::from_config(config)?))
}

fn build_relational(config: &str, options: &ProviderOptions) -> Result<Arc<dyn Resolver>> {
    let descriptor = if is_variable_name(config) {
        (options.lookup_variable)(config).filter(|value| !value.is_empty())
    } else {
        None
    }
    .unwrap_or_else(|| config.to_string());

    Ok(Arc::new(RelationalResolver::connect(
        &descriptor,
        options.table.as_deref(),
    )?))
}

fn is_variable_name(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Did;

    fn no_variables(_name: &str) -> Option<String> {
        None
    }

    fn options() -> ProviderOptions {
        ProviderOptions {
            table: None,
            lookup_variable: no_variables,
        }
    }

    fn build(config: Option<&str>) -> Result<Arc<dyn Resolver>> {
        ResolverFactory::default().build(config, &options())
    }

    #[test]
    fn test_parse_splits_at_first_colon() {
        assert_eq!(
            parse_provider_config(Some("map:alice.example.com->did:plc:example1")).unwrap(),
            ("map", "alice.example.com->did:plc:example1")
        );
        assert_eq!(
            parse_provider_config(Some("relational:postgres://u:p@db:5432/h")).unwrap(),
            ("relational", "postgres://u:p@db:5432/h")
        );
        assert_eq!(parse_provider_config(Some("map:")).unwrap(), ("map", ""));
    }

    #[test]
    fn test_parse_requires_configuration() {
        assert!(matches!(
            parse_provider_config(None),
            Err(ResolverError::MissingConfiguration)
        ));
        assert!(matches!(
            parse_provider_config(Some("")),
            Err(ResolverError::MissingConfiguration)
        ));
    }

    #[test]
    fn test_parse_requires_delimiter() {
        assert!(matches!(
            parse_provider_config(Some("map")),
            Err(ResolverError::MalformedConfiguration(_))
        ));
    }

    #[test]
    fn test_default_providers() {
        assert_eq!(
            ResolverFactory::default().providers(),
            vec!["map", "relational"]
        );
        assert!(ResolverFactory::new().providers().is_empty());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = build(Some("redis:localhost")).err().unwrap();
        assert!(matches!(err, ResolverError::UnknownProvider(ref key) if key == "redis"));

        let err = build(Some(":alice.example.com->did:plc:example1"))
            .err()
            .unwrap();
        assert!(matches!(err, ResolverError::UnknownProvider(_)));
    }

    #[test]
    fn test_builds_map_provider() {
        let resolver = build(Some(
            "map:alice.example.com->did:plc:example1,bob.example.com->did:web:bob.example.com",
        ))
        .unwrap();

        assert_eq!(resolver.provider(), "map");
        let did = tokio_test::block_on(resolver.resolve("bob.example.com")).unwrap();
        assert_eq!(did, Did::parse("did:web:bob.example.com"));
    }

    #[test]
    fn test_map_construction_failure_propagates() {
        let err = build(Some("map:alice.example.com@did:plc:example1"))
            .err()
            .unwrap();
        assert!(matches!(err, ResolverError::InvalidMapEntry { .. }));
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_builds_relational_provider() {
        let resolver = build(Some("relational:postgres://localhost:5432/handles")).unwrap();
        assert_eq!(resolver.provider(), "relational");
    }

    #[tokio::test]
    async fn test_relational_descriptor_indirection() {
        fn lookup(name: &str) -> Option<String> {
            (name == "DATABASE_URL").then(|| "postgres://localhost/handles".to_string())
        }

        let options = ProviderOptions {
            table: Some("identity.handles".to_string()),
            lookup_variable: lookup,
        };
        let resolver = ResolverFactory::default()
            .build(Some("relational:DATABASE_URL"), &options)
            .unwrap();
        assert_eq!(resolver.provider(), "relational");
    }

    #[tokio::test]
    async fn test_unset_variable_is_used_as_descriptor() {
        let err = build(Some("relational:DATABASE_URL")).err().unwrap();
        assert!(matches!(err, ResolverError::InvalidDescriptor(_)));
    }

    #[tokio::test]
    async fn test_relational_rejects_unsafe_table() {
        let options = ProviderOptions {
            table: Some("handles; drop table handles".to_string()),
            lookup_variable: no_variables,
        };
        let err = ResolverFactory::default()
            .build(Some("relational:postgres://localhost/handles"), &options)
            .err()
            .unwrap();
        assert!(matches!(err, ResolverError::InvalidTableName(_)));
    }

    #[test]
    fn test_custom_constructor_can_be_registered() {
        fn build_empty(_config: &str, _options: &ProviderOptions) -> Result<Arc<dyn Resolver>> {
            Ok(Arc::new(MapResolver::default()))
        }

        let mut factory = ResolverFactory::new();
        factory.register("empty", build_empty);

        let resolver = factory.build(Some("empty:"), &options()).unwrap();
        assert_eq!(resolver.provider(), "map");
    }

    #[test]
    fn test_variable_names() {
        assert!(is_variable_name("DATABASE_URL"));
        assert!(is_variable_name("_PG"));
        assert!(!is_variable_name(""));
        assert!(!is_variable_name("1PG"));
        assert!(!is_variable_name("postgres://localhost/handles?sslmode=require"));
    }
}
