//! Error types for handle resolution

use std::fmt;

#[derive(Debug)]
pub enum ResolverError {
    /// No provider selection string was supplied.
    MissingConfiguration,
    /// The selection string is not a `provider:config` tuple.
    MalformedConfiguration(String),
    UnknownProvider(String),
    InvalidMapEntry {
        index: usize,
        entry: String,
        reason: String,
    },
    InvalidTableName(String),
    InvalidDescriptor(Box<sqlx::Error>),
    Database(Box<sqlx::Error>),
    /// A stored row carried a DID that does not pass validation.
    InvalidRecord(String),
}

impl ResolverError {
    /// Whether this error can only arise while building a resolver.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            ResolverError::Database(_) | ResolverError::InvalidRecord(_)
        )
    }
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverError::MissingConfiguration => {
                write!(f, "A provider configuration (provider:config) is required")
            }
            ResolverError::MalformedConfiguration(value) => write!(
                f,
                "Provider configuration must be a provider:config tuple, got '{}'",
                value
            ),
            ResolverError::UnknownProvider(key) => write!(f, "Unknown provider '{}'", key),
            ResolverError::InvalidMapEntry {
                index,
                entry,
                reason,
            } => write!(f, "Invalid map entry {} ('{}'): {}", index, entry, reason),
            ResolverError::InvalidTableName(name) => write!(f, "Invalid table name '{}'", name),
            ResolverError::InvalidDescriptor(err) => {
                write!(f, "Invalid connection descriptor: {}", err)
            }
            ResolverError::Database(err) => write!(f, "Database error: {}", err),
            ResolverError::InvalidRecord(msg) => write!(f, "Invalid stored record: {}", msg),
        }
    }
}

impl std::error::Error for ResolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolverError::InvalidDescriptor(err) | ResolverError::Database(err) => {
                Some(err.as_ref())
            }
            _ => None,
        }
    }
}

impl From<sqlx::Error> for ResolverError {
    fn from(err: sqlx::Error) -> Self {
        ResolverError::Database(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;
