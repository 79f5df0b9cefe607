use std::fmt;

/// Value assumed for a flag the dependency does not declare
///
/// See [PMS 8.3.4](https://projects.gentoo.org/pms/9/pms.html#style-and-style-use-dependencies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseDefault {
    /// `(+)`
    Enabled,
    /// `(-)`
    Disabled,
}

impl fmt::Display for UseDefault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            UseDefault::Enabled => "(+)",
            UseDefault::Disabled => "(-)",
        })
    }
}

/// Constraint a USE dependency places on its flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseDepKind {
    /// `[flag]`
    Enabled,
    /// `[-flag]`
    Disabled,
    /// `[flag?]`: enabled if the parent has it enabled.
    Conditional,
    /// `[!flag?]`: enabled if the parent has it disabled.
    ConditionalInverse,
    /// `[flag=]`: same state as the parent.
    Equal,
    /// `[!flag=]`: opposite state to the parent.
    EqualInverse,
}

/// One flag inside the `[...]` block of an atom
///
/// Atoms keep their USE dependencies so they survive stringification, but
/// matching never looks at them: a package record carries no flag state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UseDep {
    pub flag: String,
    pub kind: UseDepKind,
    pub default: Option<UseDefault>,
}

impl UseDep {
    pub fn new(flag: impl Into<String>, kind: UseDepKind) -> Self {
        UseDep {
            flag: flag.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(flag: impl Into<String>, kind: UseDepKind, default: UseDefault) -> Self {
        UseDep {
            default: Some(default),
            ..UseDep::new(flag, kind)
        }
    }
}

impl fmt::Display for UseDep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            UseDepKind::Disabled => f.write_str("-")?,
            UseDepKind::ConditionalInverse | UseDepKind::EqualInverse => f.write_str("!")?,
            _ => {}
        }
        f.write_str(&self.flag)?;
        // the default sits between the flag and any ?/= marker
        if let Some(default) = self.default {
            write!(f, "{}", default)?;
        }
        match self.kind {
            UseDepKind::Conditional | UseDepKind::ConditionalInverse => f.write_str("?"),
            UseDepKind::Equal | UseDepKind::EqualInverse => f.write_str("="),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(UseDep::new("ssl", UseDepKind::Enabled).to_string(), "ssl");
        assert_eq!(UseDep::new("debug", UseDepKind::Disabled).to_string(), "-debug");
        assert_eq!(
            UseDep::new("python", UseDepKind::ConditionalInverse).to_string(),
            "!python?"
        );
        assert_eq!(
            UseDep::with_default("icu", UseDepKind::EqualInverse, UseDefault::Enabled).to_string(),
            "!icu(+)="
        );
        assert_eq!(
            UseDep::with_default("unicode", UseDepKind::Enabled, UseDefault::Disabled).to_string(),
            "unicode(-)"
        );
    }
}
