//! File owner resolution.

use std::collections::HashMap;
use std::fs::Metadata;

use compact_str::CompactString;
use thiserror::Error;

use filescope_core::UNKNOWN_OWNER;

/// Why an owner name could not be resolved.
#[derive(Debug, Clone, Error)]
pub enum OwnerError {
    /// The uid has no entry in the user database.
    #[error("no user entry for uid {uid}")]
    NoEntry { uid: u32 },

    /// The user database lookup itself failed.
    #[cfg(unix)]
    #[error("user lookup for uid {uid} failed: {source}")]
    Lookup {
        uid: u32,
        #[source]
        source: nix::Error,
    },

    /// The platform has no uid to name mapping.
    #[error("owner lookup is not supported on this platform")]
    Unsupported,
}

/// Maps file owners to principal names, caching one lookup per uid.
///
/// Unresolvable owners map to [`UNKNOWN_OWNER`].
#[derive(Debug, Default)]
pub struct OwnerResolver {
    cache: HashMap<u32, Option<CompactString>>,
}

impl OwnerResolver {
    /// Create a new resolver with an empty cache.
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Resolve the owner of a file.
    ///
    /// The error is only returned the first time a given owner fails, so
    /// callers can warn once per uid instead of once per file.
    #[cfg(unix)]
    pub fn resolve(&mut self, metadata: &Metadata) -> (CompactString, Option<OwnerError>) {
        use std::os::unix::fs::MetadataExt;

        let uid = metadata.uid();
        if let Some(cached) = self.cache.get(&uid) {
            let name = cached.clone().unwrap_or_else(|| CompactString::new(UNKNOWN_OWNER));
            return (name, None);
        }

        match lookup(uid) {
            Ok(name) => {
                self.cache.insert(uid, Some(name.clone()));
                (name, None)
            }
            Err(err) => {
                self.cache.insert(uid, None);
                (CompactString::new(UNKNOWN_OWNER), Some(err))
            }
        }
    }

    #[cfg(not(unix))]
    pub fn resolve(&mut self, _metadata: &Metadata) -> (CompactString, Option<OwnerError>) {
        let first = self.cache.is_empty();
        self.cache.insert(0, None);
        (
            CompactString::new(UNKNOWN_OWNER),
            first.then_some(OwnerError::Unsupported),
        )
    }

    /// Number of distinct owners looked up so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if no owner has been looked up yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(unix)]
fn lookup(uid: u32) -> Result<CompactString, OwnerError> {
    use nix::unistd::{Uid, User};

    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => Ok(CompactString::new(user.name)),
        Ok(None) => Err(OwnerError::NoEntry { uid }),
        Err(source) => Err(OwnerError::Lookup { uid, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_resolve_caches_per_owner() {
        let first = NamedTempFile::new().unwrap();
        let second = NamedTempFile::new().unwrap();
        let mut resolver = OwnerResolver::new();

        let (name_a, _) = resolver.resolve(&first.as_file().metadata().unwrap());
        let (name_b, err) = resolver.resolve(&second.as_file().metadata().unwrap());

        assert!(!name_a.is_empty());
        assert_eq!(name_a, name_b);
        // Same owner twice: the second lookup is served from the cache.
        assert!(err.is_none());
        assert_eq!(resolver.len(), 1);
    }
}
