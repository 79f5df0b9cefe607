use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use winnow::ascii::digit1;
use winnow::combinator::{alt, cut_err, opt, preceded, repeat, separated};
use winnow::error::{ContextError, ErrMode, StrContext};
use winnow::prelude::*;
use winnow::token::one_of;

use crate::error::{Error, Result};

/// Package revision (`-r1`, `-r2`, ...); `0` is implicit and not displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Revision(pub u64);

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            0 => Ok(()),
            n => write!(f, "-r{}", n),
        }
    }
}

/// Version suffix kind
///
/// `Alpha`, `Beta`, `Pre` and `Rc` sort below the unsuffixed version,
/// `P` (patchlevel) sorts above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuffixKind {
    Alpha,
    Beta,
    Pre,
    Rc,
    P,
}

impl SuffixKind {
    fn rank(self) -> i8 {
        match self {
            SuffixKind::Alpha => -4,
            SuffixKind::Beta => -3,
            SuffixKind::Pre => -2,
            SuffixKind::Rc => -1,
            SuffixKind::P => 1,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SuffixKind::Alpha => "alpha",
            SuffixKind::Beta => "beta",
            SuffixKind::Pre => "pre",
            SuffixKind::Rc => "rc",
            SuffixKind::P => "p",
        }
    }
}

impl fmt::Display for SuffixKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "_{}", self.as_str())
    }
}

/// One `_alpha`, `_beta`, `_pre`, `_rc` or `_p` segment with its optional number
///
/// The number is kept as written; a missing number equals `0`, so `_rc`,
/// `_rc0` and `_rc00` are the same suffix.
#[derive(Debug, Clone)]
pub struct Suffix {
    pub kind: SuffixKind,
    pub number: Option<String>,
}

impl Suffix {
    fn value(&self) -> &str {
        self.number.as_deref().map_or("", |n| n.trim_start_matches('0'))
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(n) = &self.number {
            f.write_str(n)?;
        }
        Ok(())
    }
}

impl PartialEq for Suffix {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value() == other.value()
    }
}

impl Eq for Suffix {}

impl Hash for Suffix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.value().hash(state);
    }
}

impl PartialOrd for Suffix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Suffix {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .rank()
            .cmp(&other.kind.rank())
            .then_with(|| cmp_integers(self.value(), other.value()))
    }
}

/// Compare two digit strings as unbounded unsigned integers.
fn cmp_integers(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.trim_start_matches('0'), b.trim_start_matches('0'));
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Algorithm 3.2: a component with a leading zero compares as a string,
/// trailing zeros ignored.
fn cmp_component(a: &str, b: &str) -> Ordering {
    if a.starts_with('0') || b.starts_with('0') {
        a.trim_end_matches('0').cmp(b.trim_end_matches('0'))
    } else {
        cmp_integers(a, b)
    }
}

/// The part of a component that takes part in comparison.
fn component_key(index: usize, component: &str) -> &str {
    if index == 0 {
        component.trim_start_matches('0')
    } else if component.starts_with('0') {
        component.trim_end_matches('0')
    } else {
        component
    }
}

/// Package version according to PMS
///
/// Represents e.g. `1.2.3a_alpha4_p5-r6`. A trailing `*` marks a glob,
/// only meaningful as the target of an `=` requirement.
///
/// Ordering follows [Algorithm 3.1](https://projects.gentoo.org/pms/9/pms.html#version-comparison):
/// numeric components, then the letter, then suffixes, then the revision.
/// Numeric components keep their digits as written, so `1.01` displays as
/// `1.01` and sorts below `1.1`.
#[derive(Debug, Clone)]
pub struct Version {
    pub numbers: Vec<String>,
    pub letter: Option<char>,
    pub suffixes: Vec<Suffix>,
    pub revision: Revision,
    pub glob: bool,
}

impl Version {
    pub fn parse(input: &str) -> Result<Self> {
        parse_version()
            .parse(input)
            .map_err(|e| Error::InvalidVersion(format!("{}: {}", input, e)))
    }

    /// Same version with revision `0` and no glob.
    pub fn without_revision(&self) -> Self {
        Version {
            revision: Revision::default(),
            glob: false,
            ..self.clone()
        }
    }

    /// Component-wise prefix match of `candidate` against this version
    /// used as an `=ver*` pattern. A trailing suffix without a number
    /// matches any number of that kind.
    pub fn prefix_matches(&self, candidate: &Version) -> bool {
        if !candidate.numbers.starts_with(&self.numbers) {
            return false;
        }
        if self.letter.is_none() && self.suffixes.is_empty() && self.revision.0 == 0 {
            return true;
        }
        // anything after the numbers must line up exactly
        if candidate.numbers.len() != self.numbers.len() || candidate.letter != self.letter {
            return false;
        }
        if let Some((last, init)) = self.suffixes.split_last() {
            let Some(theirs) = candidate.suffixes.get(init.len()) else {
                return false;
            };
            if !candidate.suffixes.starts_with(init) {
                return false;
            }
            let open = last.number.is_none() && self.revision.0 == 0;
            if theirs.kind != last.kind || (!open && theirs != last) {
                return false;
            }
        }
        if self.revision.0 == 0 {
            return true;
        }
        candidate.suffixes.len() == self.suffixes.len() && candidate.revision == self.revision
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.numbers.join("."))?;
        if let Some(letter) = self.letter {
            write!(f, "{}", letter)?;
        }
        for suffix in &self.suffixes {
            write!(f, "{}", suffix)?;
        }
        write!(f, "{}", self.revision)?;
        if self.glob {
            f.write_str("*")?;
        }
        Ok(())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (i, n) in self.numbers.iter().enumerate() {
            component_key(i, n).hash(state);
        }
        self.letter.hash(state);
        self.suffixes.hash(state);
        self.revision.hash(state);
        self.glob.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Numbers: the first as integers, the rest by Algorithm 3.2, then
        // the longer list wins (1.0 < 1.0.0).
        let numbers = self
            .numbers
            .iter()
            .zip(&other.numbers)
            .enumerate()
            .map(|(i, (a, b))| match i {
                0 => cmp_integers(a, b),
                _ => cmp_component(a, b),
            })
            .find(|o| o.is_ne())
            .unwrap_or_else(|| self.numbers.len().cmp(&other.numbers.len()));
        if numbers.is_ne() {
            return numbers;
        }

        match self.letter.cmp(&other.letter) {
            Ordering::Equal => {}
            o => return o,
        }

        let mut ours = self.suffixes.iter();
        let mut theirs = other.suffixes.iter();
        loop {
            match (ours.next(), theirs.next()) {
                (Some(a), Some(b)) => match a.cmp(b) {
                    Ordering::Equal => continue,
                    o => return o,
                },
                // an extra _p raises the version, any other suffix lowers it
                (Some(extra), None) => {
                    return if extra.kind == SuffixKind::P {
                        Ordering::Greater
                    } else {
                        Ordering::Less
                    };
                }
                (None, Some(extra)) => {
                    return if extra.kind == SuffixKind::P {
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    };
                }
                (None, None) => break,
            }
        }

        self.revision
            .cmp(&other.revision)
            .then(self.glob.cmp(&other.glob))
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// Winnow parsers

fn number<'s>() -> impl Parser<&'s str, String, ErrMode<ContextError>> {
    digit1.map(str::to_owned)
}

fn suffix<'s>() -> impl Parser<&'s str, Suffix, ErrMode<ContextError>> {
    let kind = alt((
        "alpha".value(SuffixKind::Alpha),
        "beta".value(SuffixKind::Beta),
        "pre".value(SuffixKind::Pre),
        "rc".value(SuffixKind::Rc),
        "p".value(SuffixKind::P),
    ));
    preceded('_', cut_err((kind, opt(number())))).map(|(kind, number)| Suffix { kind, number })
}

fn revision<'s>() -> impl Parser<&'s str, Revision, ErrMode<ContextError>> {
    preceded("-r", cut_err(digit1.try_map(|s: &str| s.parse::<u64>()))).map(Revision)
}

/// `numbers[letter][_suffix...][-rN][*]`
pub(crate) fn parse_version<'s>() -> impl Parser<&'s str, Version, ErrMode<ContextError>> {
    (
        separated(1.., number(), '.'),
        opt(one_of('a'..='z')),
        repeat(0.., suffix()),
        opt(revision()),
        opt('*'),
    )
        .map(|(numbers, letter, suffixes, revision, glob)| Version {
            numbers,
            letter,
            suffixes,
            revision: revision.unwrap_or_default(),
            glob: glob.is_some(),
        })
        .context(StrContext::Label("version"))
}
