//! Conformance suite shared by every [`Backend`].
//!
//! [`Conformance`] runs a fixed set of checks against the bundled fixture
//! environment. Each check reports a [`Failure`] tagged with the backend
//! under test. [`conformance_suite!`](crate::conformance_suite) turns the
//! checks into one `#[test]` per check for a given backend:
//!
//! ```ignore
//! pm_atom::conformance_suite!(pms, pm_atom::testing::fixture_environment(pm_atom::Pms).unwrap());
//! ```

use std::collections::BTreeSet;

use crate::atom::Atom;
use crate::backend::Backend;
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::package::Package;
use crate::version::PackageVersion;

/// Package names used by the suite. Swap them here if one of them stops
/// having the documented property in the fixture environment.
pub struct PackageNames;

impl PackageNames {
    /// Incomplete atom matching a single package.
    pub const SINGLE: &'static str = "single";
    /// Complete atom matching a single package.
    pub const SINGLE_COMPLETE: &'static str = "a/single";
    /// Incomplete atom matching multiple packages.
    pub const MULTIPLE: &'static str = "multi";
    /// Atom matching no packages.
    pub const EMPTY: &'static str = "a/nonexist";
    /// Atom matching packages with distinct sub-slots.
    pub const SUBSLOTTED: &'static str = "a/subslotted";
    /// Atom matching several versions and revisions of one package.
    pub const VERSIONED: &'static str = "a/versioned";
    /// USE flag for a USE dependency on [`SINGLE_COMPLETE`](Self::SINGLE_COMPLETE).
    pub const SINGLE_USE: &'static str = "example-flag";
    /// Repository name guaranteed to match.
    pub const REPOSITORY: &'static str = "gentoo";
}

/// Environment definition backing the suite
pub const FIXTURE: &str = include_str!("../fixtures/environment.toml");

/// Load [`FIXTURE`] with `backend`.
pub fn fixture_environment<B: Backend>(backend: B) -> Result<Environment<B>> {
    Environment::from_toml_str(backend, FIXTURE)
}

/// A failed conformance check
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("[{backend}] {check}: {message}")]
pub struct Failure {
    pub backend: &'static str,
    pub check: &'static str,
    pub message: String,
}

pub type CheckResult = std::result::Result<(), Failure>;

/// The conformance checks, run against one environment
pub struct Conformance<'e, B: Backend> {
    env: &'e Environment<B>,
}

impl<'e, B: Backend> Conformance<'e, B> {
    pub fn new(env: &'e Environment<B>) -> Self {
        Conformance { env }
    }

    /// Every check, by name.
    pub fn checks() -> Vec<(&'static str, fn(&Self) -> CheckResult)> {
        let checks: &[(&'static str, fn(&Self) -> CheckResult)] = &[
            ("single_incomplete", Self::single_incomplete),
            ("single_complete", Self::single_complete),
            ("multiple", Self::multiple),
            ("empty", Self::empty),
            ("subslotted", Self::subslotted),
            ("repository", Self::repository),
            ("version_requirement", Self::version_requirement),
            ("version_decomposition", Self::version_decomposition),
            ("version_ordering", Self::version_ordering),
            ("round_trip", Self::round_trip),
            ("invalid_specifier", Self::invalid_specifier),
            ("use_dependency", Self::use_dependency),
        ];
        checks.to_vec()
    }

    /// Run every check and collect the failures.
    pub fn run(&self) -> Vec<Failure> {
        Self::checks()
            .into_iter()
            .filter_map(|(_, check)| check(self).err())
            .collect()
    }

    fn failure(&self, check: &'static str, message: impl Into<String>) -> Failure {
        Failure {
            backend: self.env.backend().name(),
            check,
            message: message.into(),
        }
    }

    fn ensure(
        &self,
        check: &'static str,
        ok: bool,
        message: impl FnOnce() -> String,
    ) -> CheckResult {
        if ok {
            Ok(())
        } else {
            Err(self.failure(check, message()))
        }
    }

    fn atom(
        &self,
        check: &'static str,
        specifier: &str,
    ) -> std::result::Result<Atom<'e, B>, Failure> {
        Atom::parse(self.env, specifier)
            .map_err(|e| self.failure(check, format!("parsing {:?}: {}", specifier, e)))
    }

    fn version(
        &self,
        check: &'static str,
        version: &str,
    ) -> std::result::Result<PackageVersion<'e, B>, Failure> {
        PackageVersion::parse(self.env.backend(), version)
            .map_err(|e| self.failure(check, format!("parsing version {:?}: {}", version, e)))
    }

    /// Ids (`cat/pkg-ver::repo`) of the packages `atom` selects.
    fn selected(&self, atom: &Atom<'e, B>) -> BTreeSet<String> {
        self.env
            .select(atom)
            .map(|pkg| format!("{}-{}::{}", pkg.key(), pkg.version(), pkg.repository()))
            .collect()
    }

    pub fn single_incomplete(&self) -> CheckResult {
        const CHECK: &str = "single_incomplete";
        let atom = self.atom(CHECK, PackageNames::SINGLE)?;
        self.ensure(CHECK, !atom.is_complete(), || {
            format!("{:?} parsed as a complete atom", PackageNames::SINGLE)
        })?;
        self.ensure(CHECK, atom.key().category().is_none(), || {
            "incomplete atom exposes a category".to_string()
        })?;
        let stringified = atom.to_spec_string();
        self.ensure(
            CHECK,
            matches!(stringified, Err(Error::IncompleteAtom(_))),
            || format!("stringifying gave {:?}", stringified),
        )?;
        let selected = self.selected(&atom);
        self.ensure(CHECK, selected.len() == 1, || {
            format!("expected exactly one match, got {:?}", selected)
        })
    }

    pub fn single_complete(&self) -> CheckResult {
        const CHECK: &str = "single_complete";
        let atom = self.atom(CHECK, PackageNames::SINGLE_COMPLETE)?;
        let key = atom.key();
        self.ensure(
            CHECK,
            key.category() == Some("a") && key.package() == "single",
            || format!("unexpected key {:?}", key),
        )?;
        let selected = self.selected(&atom);
        self.ensure(CHECK, selected.len() == 1, || {
            format!("expected exactly one match, got {:?}", selected)
        })?;
        let incomplete = self.atom(CHECK, PackageNames::SINGLE)?;
        let by_name = self.selected(&incomplete);
        self.ensure(CHECK, selected == by_name, || {
            format!(
                "{:?} and {:?} disagree",
                PackageNames::SINGLE_COMPLETE,
                PackageNames::SINGLE
            )
        })
    }

    pub fn multiple(&self) -> CheckResult {
        const CHECK: &str = "multiple";
        let atom = self.atom(CHECK, PackageNames::MULTIPLE)?;
        let selected = self.selected(&atom);
        self.ensure(CHECK, selected.len() > 1, || {
            format!("expected several matches, got {:?}", selected)
        })
    }

    pub fn empty(&self) -> CheckResult {
        const CHECK: &str = "empty";
        let atom = self.atom(CHECK, PackageNames::EMPTY)?;
        self.ensure(CHECK, atom.is_complete(), || "atom is incomplete".to_string())?;
        let matched: Vec<String> = self
            .env
            .packages()
            .iter()
            .filter(|pkg| atom.matches(*pkg))
            .map(|pkg| pkg.key().to_string())
            .collect();
        self.ensure(CHECK, matched.is_empty(), || {
            format!("expected no match, got {:?}", matched)
        })
    }

    pub fn subslotted(&self) -> CheckResult {
        const CHECK: &str = "subslotted";
        let specifier = format!("{}:0/1", PackageNames::SUBSLOTTED);
        let atom = self.atom(CHECK, &specifier)?;
        self.ensure(CHECK, atom.slot().as_deref() == Some("0/1"), || {
            format!("slot requirement is {:?}", atom.slot())
        })?;
        let selected: Vec<_> = self.env.select(&atom).collect();
        self.ensure(CHECK, !selected.is_empty(), || "no match".to_string())?;
        self.ensure(CHECK, selected.iter().all(|pkg| pkg.slot() == "0/1"), || {
            let slots: Vec<_> = selected.iter().map(|pkg| pkg.slot()).collect();
            format!("matched slots {:?}", slots)
        })?;
        let unconstrained = self.atom(CHECK, PackageNames::SUBSLOTTED)?;
        let all = self.env.select(&unconstrained).count();
        self.ensure(CHECK, all > selected.len(), || {
            "slot requirement filtered nothing".to_string()
        })
    }

    pub fn repository(&self) -> CheckResult {
        const CHECK: &str = "repository";
        let atom = self.atom(
            CHECK,
            &format!("{}::{}", PackageNames::SINGLE_COMPLETE, PackageNames::REPOSITORY),
        )?;
        self.ensure(CHECK, atom.repository() == Some(PackageNames::REPOSITORY), || {
            format!("repository requirement is {:?}", atom.repository())
        })?;
        let count = self.env.select(&atom).count();
        self.ensure(CHECK, count == 1, || format!("expected one match, got {}", count))?;
        let elsewhere = self.atom(
            CHECK,
            &format!("{}::nonexistent-repo", PackageNames::SINGLE_COMPLETE),
        )?;
        let count = self.env.select(&elsewhere).count();
        self.ensure(CHECK, count == 0, || format!("expected no match, got {}", count))
    }

    pub fn version_requirement(&self) -> CheckResult {
        const CHECK: &str = "version_requirement";
        let atom = self.atom(CHECK, &format!("={}-1.2", PackageNames::VERSIONED))?;
        let versions: Vec<String> = self
            .env
            .select(&atom)
            .map(|pkg| pkg.version().to_string())
            .collect();
        self.ensure(CHECK, versions == ["1.2"], || {
            format!("=1.2 matched {:?}", versions)
        })?;

        let identity = self.atom(CHECK, PackageNames::VERSIONED)?;
        let all = self.env.select(&identity).count();
        self.ensure(CHECK, all > 1, || {
            format!("identity atom matched {} versions", all)
        })?;

        let atom = self.atom(CHECK, &format!("~{}-1.2", PackageNames::VERSIONED))?;
        let count = self.env.select(&atom).count();
        self.ensure(CHECK, count == 3, || {
            format!("~1.2 matched {} packages, expected every revision", count)
        })
    }

    pub fn version_decomposition(&self) -> CheckResult {
        const CHECK: &str = "version_decomposition";
        let revised = self.version(CHECK, "1.2-r3")?;
        let revision = revised.revision().map_err(|e| self.failure(CHECK, e.to_string()))?;
        self.ensure(CHECK, revision == 3, || format!("revision of 1.2-r3 is {}", revision))?;
        self.ensure(CHECK, revised.without_revision() == "1.2", || {
            format!("1.2-r3 without revision is {:?}", revised.without_revision())
        })?;
        let plain = self.version(CHECK, "1.2")?;
        let revision = plain.revision().map_err(|e| self.failure(CHECK, e.to_string()))?;
        self.ensure(CHECK, revision == 0, || format!("revision of 1.2 is {}", revision))
    }

    pub fn version_ordering(&self) -> CheckResult {
        const CHECK: &str = "version_ordering";
        for (lower, higher) in [("1.2", "1.3"), ("1.2-r1", "1.2-r2"), ("1.2", "1.2-r1")] {
            let (a, b) = (self.version(CHECK, lower)?, self.version(CHECK, higher)?);
            self.ensure(CHECK, a < b, || format!("{} is not below {}", lower, higher))?;
        }
        Ok(())
    }

    pub fn round_trip(&self) -> CheckResult {
        const CHECK: &str = "round_trip";
        let specifiers = [
            PackageNames::SINGLE_COMPLETE.to_string(),
            PackageNames::EMPTY.to_string(),
            format!("{}:0/1", PackageNames::SUBSLOTTED),
            format!(">={}-1.2-r1::{}", PackageNames::VERSIONED, PackageNames::REPOSITORY),
            format!("~{}-1.2", PackageNames::VERSIONED),
            format!("{}[{}]", PackageNames::SINGLE_COMPLETE, PackageNames::SINGLE_USE),
        ];
        for specifier in &specifiers {
            let atom = self.atom(CHECK, specifier)?;
            let stringified = atom
                .to_spec_string()
                .map_err(|e| self.failure(CHECK, format!("{}: {}", specifier, e)))?;
            let again = self.atom(CHECK, &stringified)?;
            let (before, after) = (self.selected(&atom), self.selected(&again));
            self.ensure(CHECK, before == after, || {
                format!("{} -> {}: {:?} != {:?}", specifier, stringified, before, after)
            })?;
        }
        Ok(())
    }

    pub fn invalid_specifier(&self) -> CheckResult {
        const CHECK: &str = "invalid_specifier";
        for specifier in ["", "<>", "a/b/c"] {
            let parsed = Atom::parse(self.env, specifier);
            let expected = Error::InvalidAtomSpecifier(specifier.to_string());
            self.ensure(CHECK, parsed.as_ref().err() == Some(&expected), || {
                format!("{:?} gave {:?}", specifier, parsed)
            })?;
        }
        Ok(())
    }

    pub fn use_dependency(&self) -> CheckResult {
        const CHECK: &str = "use_dependency";
        let specifier = format!(
            "{}[{}]",
            PackageNames::SINGLE_COMPLETE,
            PackageNames::SINGLE_USE
        );
        let atom = self.atom(CHECK, &specifier)?;
        let stringified = atom.to_spec_string();
        self.ensure(CHECK, stringified.as_deref() == Ok(specifier.as_str()), || {
            format!("{} stringified as {:?}", specifier, stringified)
        })?;
        let plain = self.atom(CHECK, PackageNames::SINGLE_COMPLETE)?;
        let (with_use, without) = (self.selected(&atom), self.selected(&plain));
        self.ensure(CHECK, !with_use.is_empty() && with_use == without, || {
            format!("{} matched {:?}, expected {:?}", specifier, with_use, without)
        })
    }
}

/// Generate one `#[test]` per conformance check for a backend.
///
/// `$env` is evaluated afresh in every test and must yield an
/// [`Environment`](crate::Environment) built on the fixture set.
#[macro_export]
macro_rules! conformance_suite {
    ($name:ident, $env:expr) => {
        mod $name {
            #[allow(unused_imports)]
            use super::*;

            $crate::conformance_suite!(@checks $env;
                single_incomplete,
                single_complete,
                multiple,
                empty,
                subslotted,
                repository,
                version_requirement,
                version_decomposition,
                version_ordering,
                round_trip,
                invalid_specifier,
                use_dependency,
            );
        }
    };
    (@checks $env:expr; $($check:ident),* $(,)?) => {
        $(
            #[test]
            fn $check() {
                let env = $env;
                if let Err(failure) = $crate::testing::Conformance::new(&env).$check() {
                    panic!("{}", failure);
                }
            }
        )*
    };
}
