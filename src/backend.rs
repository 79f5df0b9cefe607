//! The capability interface a package-manager backend provides.
//!
//! The atom layer never parses specifiers or compares versions itself: it
//! asks a [`Backend`] to do so and only inspects the common [`DepSpec`]
//! model the backend hands back.

use std::cmp::Ordering;
use std::fmt;

use crate::error::Result;
use crate::key::CompleteKey;
use crate::slot::SlotDep;
use crate::use_dep::UseDep;

/// Version comparison operator of a version requirement
///
/// See [PMS 8.3.1](https://projects.gentoo.org/pms/9/pms.html#operators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `=`; a target version ending in `*` makes it a prefix match.
    Equal,
    /// `~`: same version, any revision.
    Approximate,
    /// `>=`
    GreaterOrEqual,
    /// `>`
    Greater,
}

impl Operator {
    /// Whether an ordering of `candidate` relative to the target satisfies
    /// this operator. `Equal` and `Approximate` need more than an ordering
    /// for globs and revisions; backends handle those themselves.
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Less => ordering == Ordering::Less,
            Operator::LessOrEqual => ordering != Ordering::Greater,
            Operator::Equal | Operator::Approximate => ordering == Ordering::Equal,
            Operator::GreaterOrEqual => ordering != Ordering::Less,
            Operator::Greater => ordering == Ordering::Greater,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Equal => "=",
            Operator::Approximate => "~",
            Operator::GreaterOrEqual => ">=",
            Operator::Greater => ">",
        })
    }
}

/// An operator paired with the version it compares against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequirement<V> {
    pub op: Operator,
    pub version: V,
}

/// Flags passed to [`Backend::parse_spec`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accept `*` in place of the category.
    pub allow_wildcards: bool,
}

impl ParseOptions {
    /// No wildcards, no disambiguation.
    pub fn strict() -> Self {
        ParseOptions::default()
    }

    pub fn wildcards() -> Self {
        ParseOptions {
            allow_wildcards: true,
        }
    }
}

/// A parsed dependency specifier in backend-neutral form
///
/// At most one version requirement is carried; backends with richer
/// version ranges must reject what they cannot express here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepSpec<V> {
    /// `None` when the category was a wildcard.
    pub category: Option<String>,
    pub package: String,
    pub version: Option<VersionRequirement<V>>,
    pub slot: Option<SlotDep>,
    pub repository: Option<String>,
    /// Kept for display; never consulted when matching.
    pub use_deps: Vec<UseDep>,
}

impl<V> DepSpec<V> {
    pub fn new(category: Option<String>, package: impl Into<String>) -> Self {
        DepSpec {
            category,
            package: package.into(),
            version: None,
            slot: None,
            repository: None,
            use_deps: Vec::new(),
        }
    }
}

/// A package-manager backend: specifier grammar plus version semantics
pub trait Backend {
    /// The backend's own version representation.
    type Version: Clone + fmt::Debug + fmt::Display;

    /// Short name used to tag diagnostics, e.g. `pms`.
    fn name(&self) -> &'static str;

    /// Parse a user dependency specifier. Must never disambiguate a
    /// missing category on its own.
    fn parse_spec(&self, input: &str, options: ParseOptions) -> Result<DepSpec<Self::Version>>;

    /// Parse a concrete package id such as `dev-lang/rust-1.75.0-r1`.
    fn parse_package_id(&self, input: &str) -> Result<(CompleteKey, Self::Version)>;

    fn parse_version(&self, input: &str) -> Result<Self::Version>;

    fn compare_versions(&self, a: &Self::Version, b: &Self::Version) -> Ordering;

    /// Whether `candidate` satisfies `op target`.
    fn version_matches(&self, op: Operator, candidate: &Self::Version, target: &Self::Version)
        -> bool;

    /// The version with its revision component stripped.
    fn remove_revision(&self, version: &Self::Version) -> String;

    /// The revision component alone, as `r<digits>`.
    fn revision_only(&self, version: &Self::Version) -> String;

    /// Canonical specifier string.
    fn format_spec(&self, spec: &DepSpec<Self::Version>) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_accepts() {
        assert!(Operator::Less.accepts(Ordering::Less));
        assert!(!Operator::Less.accepts(Ordering::Equal));
        assert!(Operator::LessOrEqual.accepts(Ordering::Equal));
        assert!(!Operator::LessOrEqual.accepts(Ordering::Greater));
        assert!(Operator::GreaterOrEqual.accepts(Ordering::Greater));
        assert!(!Operator::Greater.accepts(Ordering::Equal));
        assert!(Operator::Equal.accepts(Ordering::Equal));
    }

    #[test]
    fn test_operator_display() {
        let ops = [
            Operator::Less,
            Operator::LessOrEqual,
            Operator::Equal,
            Operator::Approximate,
            Operator::GreaterOrEqual,
            Operator::Greater,
        ];
        let rendered: Vec<String> = ops.iter().map(|op| op.to_string()).collect();
        assert_eq!(rendered, ["<", "<=", "=", "~", ">=", ">"]);
    }

    #[test]
    fn test_parse_options() {
        assert!(!ParseOptions::strict().allow_wildcards);
        assert!(ParseOptions::wildcards().allow_wildcards);
    }
}
