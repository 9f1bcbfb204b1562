//! Static handle map built from a `handle->did,handle->did` string

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ResolverError, Result};
use crate::resolver::Resolver;
use crate::syntax::{is_valid_handle, Did};

pub const PROVIDER_KEY: &str = "map";

const ENTRY_SEPARATOR: char = ',';
const PAIR_SEPARATOR: &str = "->";

/// Resolves handles from a fixed, case-sensitive in-memory map
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    dids: HashMap<String, Did>,
}

impl MapResolver {
    pub fn new(dids: HashMap<String, Did>) -> Self {
        Self { dids }
    }

    /// Parse comma-separated `handle->did` entries.
    ///
    /// The whole configuration is rejected on the first entry that is not a
    /// valid handle and DID pair. When a handle appears more than once the
    /// last entry wins.
    pub fn from_config(config: &str) -> Result<Self> {
        let mut dids = HashMap::new();

        for (index, entry) in config.split(ENTRY_SEPARATOR).enumerate() {
            let (handle, did) =
                parse_entry(entry).map_err(|reason| ResolverError::InvalidMapEntry {
                    index,
                    entry: entry.to_string(),
                    reason,
                })?;
            dids.insert(handle, did);
        }

        debug!(handles = dids.len(), "Parsed handle map");
        Ok(Self { dids })
    }

    pub fn len(&self) -> usize {
        self.dids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dids.is_empty()
    }
}

fn parse_entry(entry: &str) -> std::result::Result<(String, Did), String> {
    let parts: Vec<&str> = entry.split(PAIR_SEPARATOR).collect();
    let [handle, did] = parts.as_slice() else {
        return Err("each entry must be in the format handle->did".to_string());
    };

    if !is_valid_handle(handle) {
        return Err(format!("'{handle}' is not a valid domain name"));
    }
    let did = Did::parse(did).ok_or_else(|| format!("'{did}' is not a valid atproto DID"))?;

    Ok((handle.to_string(), did))
}

#[async_trait]
impl Resolver for MapResolver {
    async fn resolve(&self, handle: &str) -> Result<Option<Did>> {
        Ok(self.dids.get(handle).cloned())
    }

    fn provider(&self) -> &'static str {
        PROVIDER_KEY
    }
}
