use std::fmt;

use crate::backend::{Backend, DepSpec, Operator, ParseOptions};
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::key::{CompleteKey, IncompleteKey, PackageKey};
use crate::package::Package;
use crate::use_dep::UseDep;
use crate::version::PackageVersion;

/// Blocker prefix of an atom, kept for display only
///
/// See [PMS 8.3.2](https://projects.gentoo.org/pms/9/pms.html#block-operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blocker {
    /// `!`
    Weak,
    /// `!!`
    Strong,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Blocker::Weak => "!",
            Blocker::Strong => "!!",
        })
    }
}

/// Insert `*/` before the first word character of `specifier`.
fn with_category_wildcard(specifier: &str) -> Option<String> {
    let at = specifier.find(|c: char| c.is_alphanumeric() || c == '_')?;
    Some(format!("{}*/{}", &specifier[..at], &specifier[at..]))
}

/// A dependency specifier parsed by a backend, ready for matching
///
/// Atoms are immutable and borrow the [`Environment`] they were parsed in.
/// An atom whose specifier lacked a category is *incomplete*: it still
/// matches packages by name, but cannot be turned back into a string.
pub struct Atom<'e, B: Backend> {
    env: &'e Environment<B>,
    key: PackageKey,
    spec: DepSpec<B::Version>,
    blocker: Option<Blocker>,
}

impl<'e, B: Backend> Atom<'e, B> {
    /// Parse `specifier` with the environment's backend.
    ///
    /// A strict parse is tried first. If it fails, a category wildcard is
    /// inserted before the first word character and the parse retried with
    /// wildcards allowed; success there yields an incomplete atom.
    pub fn parse(env: &'e Environment<B>, specifier: &str) -> Result<Self> {
        Self::parse_with_blocker(env, specifier, None)
    }

    /// As [`Atom::parse`], remembering `blocker` for display.
    pub fn parse_blocking(
        env: &'e Environment<B>,
        specifier: &str,
        blocker: Blocker,
    ) -> Result<Self> {
        Self::parse_with_blocker(env, specifier, Some(blocker))
    }

    fn parse_with_blocker(
        env: &'e Environment<B>,
        specifier: &str,
        blocker: Option<Blocker>,
    ) -> Result<Self> {
        let backend = env.backend();
        let spec = match backend.parse_spec(specifier, ParseOptions::strict()) {
            Ok(spec) => spec,
            Err(_) => {
                let wildcarded = with_category_wildcard(specifier)
                    .ok_or_else(|| Error::InvalidAtomSpecifier(specifier.to_string()))?;
                tracing::trace!(
                    backend = backend.name(),
                    specifier,
                    retry = %wildcarded,
                    "strict parse failed, retrying with category wildcard"
                );
                backend
                    .parse_spec(&wildcarded, ParseOptions::wildcards())
                    .map_err(|_| Error::InvalidAtomSpecifier(specifier.to_string()))?
            }
        };
        Ok(Self::from_spec(env, spec, blocker))
    }

    /// Wrap an already parsed specifier. A missing category makes the atom
    /// incomplete.
    pub fn from_spec(
        env: &'e Environment<B>,
        spec: DepSpec<B::Version>,
        blocker: Option<Blocker>,
    ) -> Self {
        let key: PackageKey = match &spec.category {
            Some(category) => CompleteKey::new(category.as_str(), spec.package.as_str()).into(),
            None => IncompleteKey::new(spec.package.as_str()).into(),
        };
        Atom {
            env,
            key,
            spec,
            blocker,
        }
    }

    pub fn key(&self) -> &PackageKey {
        &self.key
    }

    pub fn is_complete(&self) -> bool {
        self.key.is_complete()
    }

    pub fn blocker(&self) -> Option<Blocker> {
        self.blocker
    }

    /// Target version of the version requirement, if any.
    pub fn version(&self) -> Option<PackageVersion<'e, B>> {
        let req = self.spec.version.as_ref()?;
        Some(PackageVersion::new(self.env.backend(), req.version.clone()))
    }

    pub fn version_operator(&self) -> Option<Operator> {
        self.spec.version.as_ref().map(|req| req.op)
    }

    /// Required slot, including any sub-slot (`0/1`). A bare slot operator
    /// (`:=`, `:*`) requires nothing.
    pub fn slot(&self) -> Option<String> {
        self.spec
            .slot
            .as_ref()
            .and_then(|dep| dep.slot())
            .map(|slot| slot.to_string())
    }

    pub fn repository(&self) -> Option<&str> {
        self.spec.repository.as_deref()
    }

    /// USE dependencies, kept for display only.
    pub fn use_deps(&self) -> &[UseDep] {
        &self.spec.use_deps
    }

    /// The backend specifier this atom wraps.
    pub fn spec(&self) -> &DepSpec<B::Version> {
        &self.spec
    }

    /// Whether `package` satisfies every constraint this atom carries.
    ///
    /// Category (when known), package name, version requirement, slot and
    /// repository are checked in that order; an absent constraint accepts
    /// anything. USE dependencies are not considered.
    pub fn matches<P>(&self, package: &P) -> bool
    where
        P: Package<Version = B::Version> + ?Sized,
    {
        let key = package.key();
        if let Some(category) = self.key.category() {
            if category != key.category() {
                return false;
            }
        }
        if self.key.package() != key.package() {
            return false;
        }
        if let Some(req) = &self.spec.version {
            if !self
                .env
                .backend()
                .version_matches(req.op, package.version(), &req.version)
            {
                return false;
            }
        }
        if let Some(slot) = self.slot() {
            if slot != package.slot() {
                return false;
            }
        }
        if let Some(repository) = self.repository() {
            if repository != package.repository() {
                return false;
            }
        }
        true
    }

    /// View of this atom as a complete one, which can be displayed.
    ///
    /// Fails with [`Error::IncompleteAtom`] when the category is unknown.
    pub fn as_complete(&self) -> Result<CompleteAtom<'_, 'e, B>> {
        match &self.key {
            PackageKey::Complete(key) => Ok(CompleteAtom { atom: self, key }),
            PackageKey::Incomplete(key) => Err(Error::IncompleteAtom(key.to_string())),
        }
    }

    /// `as_complete()?.to_string()`
    pub fn to_spec_string(&self) -> Result<String> {
        Ok(self.as_complete()?.to_string())
    }
}

impl<B: Backend> Clone for Atom<'_, B> {
    fn clone(&self) -> Self {
        Atom {
            env: self.env,
            key: self.key.clone(),
            spec: self.spec.clone(),
            blocker: self.blocker,
        }
    }
}

impl<B: Backend> fmt::Debug for Atom<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Atom")
            .field("backend", &self.env.backend().name())
            .field("key", &self.key)
            .field("spec", &self.spec)
            .field("blocker", &self.blocker)
            .finish()
    }
}

/// An atom known to have a category
///
/// Displays as `<blocker><specifier>` in the backend's canonical form.
pub struct CompleteAtom<'a, 'e, B: Backend> {
    atom: &'a Atom<'e, B>,
    key: &'a CompleteKey,
}

impl<'a, 'e, B: Backend> CompleteAtom<'a, 'e, B> {
    pub fn key(&self) -> &'a CompleteKey {
        self.key
    }

    pub fn atom(&self) -> &'a Atom<'e, B> {
        self.atom
    }
}

impl<B: Backend> fmt::Display for CompleteAtom<'_, '_, B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(blocker) = self.atom.blocker {
            write!(f, "{}", blocker)?;
        }
        f.write_str(&self.atom.env.backend().format_spec(&self.atom.spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageRecord;
    use crate::pms::{Pms, Version};

    fn env() -> Environment<Pms> {
        let mut env = Environment::new(Pms);
        for (id, slot, repo) in [
            ("a/single-1", "0", "gentoo"),
            ("a/multi-1.2", "1", "gentoo"),
            ("a/multi-1.3", "1", "gentoo"),
            ("b/multi-2-r1", "2", "overlay"),
            ("a/subslotted-1", "0/1", "gentoo"),
            ("a/subslotted-2", "0/2", "gentoo"),
        ] {
            env.add(id, slot, repo).unwrap();
        }
        env
    }

    fn matching(env: &Environment<Pms>, specifier: &str) -> Vec<String> {
        let atom = Atom::parse(env, specifier).unwrap();
        env.select(&atom).map(|pkg| pkg.to_string()).collect()
    }

    #[test]
    fn test_with_category_wildcard() {
        assert_eq!(with_category_wildcard("single").as_deref(), Some("*/single"));
        assert_eq!(
            with_category_wildcard(">=single-1").as_deref(),
            Some(">=*/single-1")
        );
        assert_eq!(with_category_wildcard("<>"), None);
        assert_eq!(
            with_category_wildcard("~élan-2").as_deref(),
            Some("~*/élan-2")
        );
        assert_eq!(with_category_wildcard("=_x").as_deref(), Some("=*/_x"));
    }

    #[test]
    fn test_complete_atom() {
        let env = env();
        let atom = Atom::parse(&env, "a/single").unwrap();
        assert!(atom.is_complete());
        assert_eq!(atom.key().category(), Some("a"));
        assert_eq!(atom.key().package(), "single");
        assert!(atom.version().is_none());
        assert!(atom.slot().is_none());
        assert!(atom.repository().is_none());
        assert_eq!(atom.to_spec_string().unwrap(), "a/single");
        assert_eq!(atom.as_complete().unwrap().key().to_string(), "a/single");
    }

    #[test]
    fn test_incomplete_atom() {
        let env = env();
        let atom = Atom::parse(&env, "single").unwrap();
        assert!(!atom.is_complete());
        assert_eq!(atom.key().category(), None);
        assert_eq!(atom.key().package(), "single");
        assert_eq!(
            atom.to_spec_string(),
            Err(Error::IncompleteAtom("single".to_string()))
        );
        assert_eq!(matching(&env, "single"), ["a/single-1:0::gentoo"]);
    }

    #[test]
    fn test_incomplete_atom_keeps_constraints() {
        let env = env();
        let atom = Atom::parse(&env, ">=multi-1.3:1").unwrap();
        assert!(!atom.is_complete());
        assert_eq!(atom.version_operator(), Some(Operator::GreaterOrEqual));
        assert_eq!(atom.slot().as_deref(), Some("1"));
        assert_eq!(matching(&env, ">=multi-1.3:1"), ["a/multi-1.3:1::gentoo"]);
    }

    #[test]
    fn test_invalid_specifier() {
        let env = env();
        for specifier in ["", "<>", "a/b/c", ">=a/single", "!a/single", "*/*/x"] {
            assert_eq!(
                Atom::parse(&env, specifier).unwrap_err(),
                Error::InvalidAtomSpecifier(specifier.to_string()),
                "{specifier}"
            );
        }
    }

    #[test]
    fn test_identity_matching_ignores_version() {
        let env = env();
        assert_eq!(
            matching(&env, "a/multi"),
            ["a/multi-1.2:1::gentoo", "a/multi-1.3:1::gentoo"]
        );
        assert_eq!(matching(&env, "multi").len(), 3);
        assert!(matching(&env, "a/nonexist").is_empty());
    }

    #[test]
    fn test_version_requirement() {
        let env = env();
        assert_eq!(matching(&env, "=a/multi-1.2"), ["a/multi-1.2:1::gentoo"]);
        assert_eq!(matching(&env, "<a/multi-1.3"), ["a/multi-1.2:1::gentoo"]);
        assert_eq!(matching(&env, "=a/multi-1*").len(), 2);
        assert_eq!(matching(&env, "~b/multi-2"), ["b/multi-2-r1:2::overlay"]);
        assert!(matching(&env, "=b/multi-2").is_empty());

        let atom = Atom::parse(&env, "=a/multi-1.2").unwrap();
        let record = PackageRecord::new(
            CompleteKey::new("a", "multi"),
            Version::parse("1.3").unwrap(),
            "1",
            "gentoo",
        );
        assert!(!atom.matches(&record));
        assert_eq!(atom.version().unwrap().to_string(), "1.2");
    }

    #[test]
    fn test_slot_requirement() {
        let env = env();
        assert_eq!(matching(&env, "a/subslotted:0/1"), ["a/subslotted-1:0/1::gentoo"]);
        assert!(matching(&env, "a/subslotted:0").is_empty());
        assert_eq!(matching(&env, "a/subslotted:=").len(), 2);
        assert_eq!(matching(&env, "a/multi:1=").len(), 2);
    }

    #[test]
    fn test_repository_requirement() {
        let env = env();
        assert_eq!(matching(&env, "multi::overlay"), ["b/multi-2-r1:2::overlay"]);
        assert!(matching(&env, "a/single::overlay").is_empty());
    }

    #[test]
    fn test_blocker_display() {
        let env = env();
        let atom = Atom::parse_blocking(&env, ">=a/multi-1.3:1::gentoo", Blocker::Strong).unwrap();
        assert_eq!(atom.blocker(), Some(Blocker::Strong));
        assert_eq!(atom.to_spec_string().unwrap(), "!!>=a/multi-1.3:1::gentoo");

        let atom = Atom::parse_blocking(&env, "single", Blocker::Weak).unwrap();
        assert!(matches!(atom.to_spec_string(), Err(Error::IncompleteAtom(_))));
    }

    #[test]
    fn test_round_trip_preserves_matches() {
        let env = env();
        for specifier in [
            "a/multi",
            "<=a/multi-1.2::gentoo",
            "=a/multi-1*",
            "a/subslotted:0/1",
            "~b/multi-2:2",
            "a/single[example-flag]",
        ] {
            let atom = Atom::parse(&env, specifier).unwrap();
            let again = Atom::parse(&env, &atom.to_spec_string().unwrap()).unwrap();
            let first: Vec<_> = env.select(&atom).collect();
            let second: Vec<_> = env.select(&again).collect();
            assert_eq!(first, second, "{specifier}");
        }
    }

    #[test]
    fn test_use_deps_are_kept_but_not_matched() {
        let env = env();
        let atom = Atom::parse(&env, "a/single[example-flag,-doc]").unwrap();
        assert_eq!(atom.use_deps().len(), 2);
        assert_eq!(atom.to_spec_string().unwrap(), "a/single[example-flag,-doc]");
        assert_eq!(matching(&env, "a/single[example-flag]"), ["a/single-1:0::gentoo"]);

        let atom = Atom::parse(&env, "single[example-flag]").unwrap();
        assert!(!atom.is_complete());
        assert_eq!(env.select(&atom).count(), 1);
    }

    #[test]
    fn test_leading_zero_versions() {
        let mut env = Environment::new(Pms);
        env.add("a/foo-1.1", "0", "gentoo").unwrap();
        env.add("a/foo-1.01", "0", "gentoo").unwrap();

        let atom = Atom::parse(&env, "=a/foo-1.01").unwrap();
        assert_eq!(atom.to_spec_string().unwrap(), "=a/foo-1.01");
        assert_eq!(matching(&env, "=a/foo-1.01"), ["a/foo-1.01:0::gentoo"]);
        assert_eq!(matching(&env, "<a/foo-1.1"), ["a/foo-1.01:0::gentoo"]);
        assert_eq!(matching(&env, "=a/foo-1.010"), ["a/foo-1.01:0::gentoo"]);
    }

    #[test]
    fn test_suffix_versions() {
        let mut env = Environment::new(Pms);
        env.add("a/foo-1_rc", "0", "gentoo").unwrap();
        env.add("a/foo-1.2_rc1", "0", "gentoo").unwrap();
        env.add("a/foo-20240101000000000000", "0", "gentoo").unwrap();

        assert_eq!(matching(&env, "=a/foo-1_rc0"), ["a/foo-1_rc:0::gentoo"]);
        assert_eq!(matching(&env, "=a/foo-1.2_rc*"), ["a/foo-1.2_rc1:0::gentoo"]);
        assert_eq!(
            matching(&env, ">=a/foo-20240101000000000000"),
            ["a/foo-20240101000000000000:0::gentoo"]
        );
    }

    #[test]
    fn test_from_spec() {
        let env = env();
        let spec = env
            .backend()
            .parse_spec("*/single", ParseOptions::wildcards())
            .unwrap();
        let atom = Atom::from_spec(&env, spec, None);
        assert!(!atom.is_complete());
        assert_eq!(env.select(&atom).count(), 1);
    }
}
