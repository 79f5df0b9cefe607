use std::fmt;

use crate::key::CompleteKey;

/// A concrete package as seen by the atom matcher
pub trait Package {
    type Version;

    fn key(&self) -> &CompleteKey;
    fn version(&self) -> &Self::Version;
    /// Full slot, including any sub-slot (`0/1`).
    fn slot(&self) -> &str;
    fn repository(&self) -> &str;
}

/// A package available in a repository of an [`Environment`](crate::Environment)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord<V> {
    pub key: CompleteKey,
    pub version: V,
    pub slot: String,
    pub repository: String,
}

impl<V> PackageRecord<V> {
    pub fn new(
        key: CompleteKey,
        version: V,
        slot: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        PackageRecord {
            key,
            version,
            slot: slot.into(),
            repository: repository.into(),
        }
    }
}

impl<V> Package for PackageRecord<V> {
    type Version = V;

    fn key(&self) -> &CompleteKey {
        &self.key
    }

    fn version(&self) -> &V {
        &self.version
    }

    fn slot(&self) -> &str {
        &self.slot
    }

    fn repository(&self) -> &str {
        &self.repository
    }
}

impl<V: fmt::Display> fmt::Display for PackageRecord<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}-{}:{}::{}",
            self.key, self.version, self.slot, self.repository
        )
    }
}
