use async_trait::async_trait;

use crate::error::Result;
use crate::syntax::Did;

/// Looks up the DID registered for a handle.
///
/// An unregistered handle resolves to `Ok(None)`. Errors are reserved for
/// faults in the backing store and are never used to signal absence.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, handle: &str) -> Result<Option<Did>>;

    /// Provider key this resolver was built from, used in logs.
    fn provider(&self) -> &'static str;
}
