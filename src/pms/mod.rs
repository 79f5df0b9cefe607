//! Backend for the Gentoo [Package Manager Specification][PMS].
//!
//! [PMS]: https://projects.gentoo.org/pms/latest/pms.html

mod name;
mod spec;
mod version;

use std::cmp::Ordering;

pub use name::package_id;
pub use spec::dep_spec;
pub use version::{Revision, Suffix, SuffixKind, Version};

use crate::backend::{Backend, DepSpec, Operator, ParseOptions};
use crate::error::Result;
use crate::key::CompleteKey;

/// PMS specifier grammar and Algorithm 3.1 version semantics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pms;

impl Pms {
    pub fn new() -> Self {
        Pms
    }
}

impl Backend for Pms {
    type Version = Version;

    fn name(&self) -> &'static str {
        "pms"
    }

    fn parse_spec(&self, input: &str, options: ParseOptions) -> Result<DepSpec<Version>> {
        dep_spec(input, options)
    }

    fn parse_package_id(&self, input: &str) -> Result<(CompleteKey, Version)> {
        package_id(input)
    }

    fn parse_version(&self, input: &str) -> Result<Version> {
        Version::parse(input)
    }

    fn compare_versions(&self, a: &Version, b: &Version) -> Ordering {
        a.cmp(b)
    }

    fn version_matches(&self, op: Operator, candidate: &Version, target: &Version) -> bool {
        match op {
            Operator::Equal if target.glob => target.prefix_matches(candidate),
            Operator::Approximate => candidate.without_revision() == target.without_revision(),
            _ => op.accepts(candidate.cmp(target)),
        }
    }

    fn remove_revision(&self, version: &Version) -> String {
        version.without_revision().to_string()
    }

    fn revision_only(&self, version: &Version) -> String {
        format!("r{}", version.revision.0)
    }

    fn format_spec(&self, spec: &DepSpec<Version>) -> String {
        spec::Formatted(spec).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_matches() {
        let pms = Pms;
        assert!(pms.version_matches(Operator::Equal, &v("1.2"), &v("1.2")));
        assert!(!pms.version_matches(Operator::Equal, &v("1.3"), &v("1.2")));
        assert!(!pms.version_matches(Operator::Equal, &v("1.2-r1"), &v("1.2")));
        assert!(pms.version_matches(Operator::Approximate, &v("1.2-r1"), &v("1.2")));
        assert!(pms.version_matches(Operator::Approximate, &v("1.2"), &v("1.2-r3")));
        assert!(!pms.version_matches(Operator::Approximate, &v("1.2.1"), &v("1.2")));
        assert!(pms.version_matches(Operator::Equal, &v("1.2.5"), &v("1.2*")));
        assert!(pms.version_matches(Operator::Less, &v("1.2"), &v("1.3")));
        assert!(pms.version_matches(Operator::LessOrEqual, &v("1.3"), &v("1.3")));
        assert!(pms.version_matches(Operator::GreaterOrEqual, &v("2"), &v("1.3")));
        assert!(!pms.version_matches(Operator::Greater, &v("1.3"), &v("1.3")));
    }

    #[test]
    fn test_version_matches_by_pms_rules() {
        let pms = Pms;
        assert!(!pms.version_matches(Operator::Equal, &v("1.1"), &v("1.01")));
        assert!(pms.version_matches(Operator::Equal, &v("1.010"), &v("1.01")));
        assert!(pms.version_matches(Operator::Less, &v("1.01"), &v("1.1")));
        assert!(pms.version_matches(Operator::Equal, &v("1_rc"), &v("1_rc0")));
        assert!(pms.version_matches(Operator::Equal, &v("1.2_rc1"), &v("1.2_rc*")));
    }

    #[test]
    fn test_revision_strings() {
        let pms = Pms;
        assert_eq!(pms.revision_only(&v("1.2-r3")), "r3");
        assert_eq!(pms.revision_only(&v("1.2")), "r0");
        assert_eq!(pms.remove_revision(&v("1.2-r3")), "1.2");
    }

    #[test]
    fn test_format_spec_round_trip() {
        let pms = Pms;
        let spec = pms
            .parse_spec("<a/multi-2_rc1:1::gentoo", ParseOptions::strict())
            .unwrap();
        assert_eq!(pms.format_spec(&spec), "<a/multi-2_rc1:1::gentoo");
    }
}
