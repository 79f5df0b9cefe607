use std::fmt;

/// Fully qualified package key, e.g. `dev-lang/rust`
///
/// See [PMS 3.1](https://projects.gentoo.org/pms/latest/pms.html#restrictions-upon-names)
/// for category and package naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompleteKey {
    category: String,
    package: String,
}

impl CompleteKey {
    pub fn new(category: impl Into<String>, package: impl Into<String>) -> Self {
        CompleteKey {
            category: category.into(),
            package: package.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn package(&self) -> &str {
        &self.package
    }
}

impl fmt::Display for CompleteKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.package)
    }
}

/// Package key whose category was never given
///
/// Has no category accessor at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IncompleteKey {
    package: String,
}

impl IncompleteKey {
    pub fn new(package: impl Into<String>) -> Self {
        IncompleteKey {
            package: package.into(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }
}

impl fmt::Display for IncompleteKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.package)
    }
}

/// Key of an atom: complete, or incomplete when the category was
/// wildcard-substituted during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackageKey {
    Complete(CompleteKey),
    Incomplete(IncompleteKey),
}

impl PackageKey {
    pub fn package(&self) -> &str {
        match self {
            PackageKey::Complete(key) => key.package(),
            PackageKey::Incomplete(key) => key.package(),
        }
    }

    /// The category, when known.
    pub fn category(&self) -> Option<&str> {
        match self {
            PackageKey::Complete(key) => Some(key.category()),
            PackageKey::Incomplete(_) => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PackageKey::Complete(_))
    }

    pub fn as_complete(&self) -> Option<&CompleteKey> {
        match self {
            PackageKey::Complete(key) => Some(key),
            PackageKey::Incomplete(_) => None,
        }
    }
}

impl From<CompleteKey> for PackageKey {
    fn from(key: CompleteKey) -> Self {
        PackageKey::Complete(key)
    }
}

impl From<IncompleteKey> for PackageKey {
    fn from(key: IncompleteKey) -> Self {
        PackageKey::Incomplete(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_key() {
        let key = CompleteKey::new("dev-lang", "rust");
        assert_eq!(key.category(), "dev-lang");
        assert_eq!(key.package(), "rust");
        assert_eq!(key.to_string(), "dev-lang/rust");
    }

    #[test]
    fn test_complete_key_ordering() {
        let foo = CompleteKey::new("app-misc", "foo");
        let bar = CompleteKey::new("app-misc", "bar");
        let rust = CompleteKey::new("dev-lang", "rust");
        assert!(bar < foo);
        assert!(foo < rust);
    }

    #[test]
    fn test_package_key_variants() {
        let complete = PackageKey::from(CompleteKey::new("a", "single"));
        assert!(complete.is_complete());
        assert_eq!(complete.category(), Some("a"));
        assert_eq!(complete.package(), "single");

        let incomplete = PackageKey::from(IncompleteKey::new("single"));
        assert!(!incomplete.is_complete());
        assert_eq!(incomplete.category(), None);
        assert!(incomplete.as_complete().is_none());
        assert_eq!(incomplete.package(), "single");
    }
}
