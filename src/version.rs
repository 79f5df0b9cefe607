use std::cmp::Ordering;
use std::fmt;

use crate::backend::Backend;
use crate::error::{Error, Result};

/// A backend version viewed through the common model
///
/// Ordering and equality are the backend's version comparison, not
/// string comparison: `1.2_rc1 < 1.2 < 1.2_p1 < 1.2-r1`.
pub struct PackageVersion<'b, B: Backend> {
    backend: &'b B,
    version: B::Version,
}

impl<'b, B: Backend> PackageVersion<'b, B> {
    pub fn new(backend: &'b B, version: B::Version) -> Self {
        PackageVersion { backend, version }
    }

    /// Parse a version string with `backend`'s grammar.
    pub fn parse(backend: &'b B, input: &str) -> Result<Self> {
        Ok(Self::new(backend, backend.parse_version(input)?))
    }

    /// The version with its trailing revision stripped (`1.2-r3` → `1.2`).
    pub fn without_revision(&self) -> String {
        self.backend.remove_revision(&self.version)
    }

    /// The revision number, `0` when absent.
    ///
    /// Fails with [`Error::MalformedRevision`] if the backend hands back
    /// something other than `r<digits>`.
    pub fn revision(&self) -> Result<u64> {
        let revision = self.backend.revision_only(&self.version);
        let parsed: Option<u64> = revision
            .strip_prefix('r')
            .and_then(|digits| digits.parse().ok());
        parsed.ok_or_else(|| Error::MalformedRevision {
            backend: self.backend.name(),
            revision,
        })
    }

    pub fn inner(&self) -> &B::Version {
        &self.version
    }

    pub fn into_inner(self) -> B::Version {
        self.version
    }
}

impl<B: Backend> Clone for PackageVersion<'_, B> {
    fn clone(&self) -> Self {
        PackageVersion {
            backend: self.backend,
            version: self.version.clone(),
        }
    }
}

impl<B: Backend> fmt::Debug for PackageVersion<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("PackageVersion").field(&self.version).finish()
    }
}

impl<B: Backend> fmt::Display for PackageVersion<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

impl<B: Backend> PartialEq for PackageVersion<'_, B> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<B: Backend> Eq for PackageVersion<'_, B> {}

impl<B: Backend> PartialOrd for PackageVersion<'_, B> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<B: Backend> Ord for PackageVersion<'_, B> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.backend.compare_versions(&self.version, &other.version)
    }
}
