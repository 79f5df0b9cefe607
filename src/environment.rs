//! The package set atoms are parsed against and matched within.
//!
//! An environment can be assembled by hand or loaded from a TOML
//! description:
//!
//! ```toml
//! [[repository]]
//! name = "gentoo"
//!
//! [[repository.package]]
//! id = "a/single-1"
//!
//! [[repository.package]]
//! id = "a/subslotted-1"
//! slot = "0/1"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::atom::Atom;
use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::package::PackageRecord;

/// Environment definition as read from TOML
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    #[serde(default, rename = "repository")]
    pub repositories: Vec<RepositoryConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    pub name: String,
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Package id, e.g. `dev-lang/rust-1.75.0-r1`.
    pub id: String,
    #[serde(default = "default_slot")]
    pub slot: String,
}

fn default_slot() -> String {
    "0".to_string()
}

impl EnvironmentConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// A backend plus the packages it knows about
///
/// Read-only once built; atoms borrow it for their whole lifetime.
#[derive(Debug, Clone)]
pub struct Environment<B: Backend> {
    backend: B,
    packages: Vec<PackageRecord<B::Version>>,
}

impl<B: Backend> Environment<B> {
    pub fn new(backend: B) -> Self {
        Environment {
            backend,
            packages: Vec::new(),
        }
    }

    /// Build an environment from a parsed configuration, resolving every
    /// package id with `backend`.
    pub fn from_config(backend: B, config: &EnvironmentConfig) -> Result<Self> {
        let mut env = Environment::new(backend);
        for repo in &config.repositories {
            if repo.name.is_empty() {
                return Err(Error::Config("repository without a name".to_string()));
            }
            for package in &repo.packages {
                env.add(&package.id, &package.slot, &repo.name)?;
            }
            tracing::debug!(
                backend = env.backend.name(),
                repository = %repo.name,
                packages = repo.packages.len(),
                "loaded repository"
            );
        }
        Ok(env)
    }

    pub fn from_toml_str(backend: B, content: &str) -> Result<Self> {
        Self::from_config(backend, &EnvironmentConfig::from_toml_str(content)?)
    }

    pub fn from_file(backend: B, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(backend, &content)
    }

    /// Add the package `id` (e.g. `a/single-1`) to `repository`.
    pub fn add(&mut self, id: &str, slot: &str, repository: &str) -> Result<()> {
        let (key, version) = self.backend.parse_package_id(id)?;
        self.packages
            .push(PackageRecord::new(key, version, slot, repository));
        Ok(())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn packages(&self) -> &[PackageRecord<B::Version>] {
        &self.packages
    }

    /// Parse `specifier` against this environment. See [`Atom::parse`].
    pub fn atom(&self, specifier: &str) -> Result<Atom<'_, B>> {
        Atom::parse(self, specifier)
    }

    /// All packages `atom` matches, in insertion order.
    pub fn select<'a>(
        &'a self,
        atom: &'a Atom<'a, B>,
    ) -> impl Iterator<Item = &'a PackageRecord<B::Version>> + 'a {
        self.packages.iter().filter(move |pkg| atom.matches(*pkg))
    }
}
