//! Syntax checks for handles and DIDs
//!
//! Handles are DNS-style domain names (`alice.example.com`), DIDs take the
//! form `did:<method>:<method-specific-id>`.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const MIN_LABELS: usize = 2;
const MAX_LABELS: usize = 10;

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").unwrap()
});

static DID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^did:[a-z]+:[A-Za-z0-9._:%-]*[A-Za-z0-9]$").unwrap());

/// Check that `value` is a domain of 2-10 labels, each 1-63 alphanumeric or
/// hyphen characters that neither start nor end with a hyphen.
pub fn is_valid_handle(value: &str) -> bool {
    let labels: Vec<&str> = value.split('.').collect();
    (MIN_LABELS..=MAX_LABELS).contains(&labels.len())
        && labels.iter().all(|label| LABEL_RE.is_match(label))
}

pub fn is_valid_did(value: &str) -> bool {
    DID_RE.is_match(value)
}

/// A syntactically valid decentralized identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Did(String);

impl Did {
    /// Parse a DID like "did:plc:ewvi7nxzyoun6zhxrhs64oiz"
    pub fn parse(value: &str) -> Option<Self> {
        is_valid_did(value).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
