use winnow::combinator::cut_err;
use winnow::error::{ContextError, ErrMode, StrContext};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::error::{Error, Result};
use crate::key::CompleteKey;
use crate::pms::version::{parse_version, Version};

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+')
}

fn starts_well(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// PMS: category names use `[A-Za-z0-9+_.-]` and may not start with
/// hyphen, dot or plus.
pub(crate) fn parse_category<'s>() -> impl Parser<&'s str, String, ErrMode<ContextError>> {
    take_while(1.., |c: char| is_name_char(c) || c == '.')
        .verify(|s: &str| starts_well(s))
        .map(str::to_owned)
        .context(StrContext::Label("category"))
}

/// Whether `name` ends in `-<version>`, which PMS forbids for package names.
fn ends_in_version(name: &str) -> bool {
    name.match_indices('-')
        .any(|(i, _)| parse_version().parse(&name[i + 1..]).is_ok_and(|v| !v.glob))
}

/// PMS: package names use `[A-Za-z0-9+_-]`, may not start with hyphen or
/// plus, and may not end in a hyphen followed by a valid version.
pub(crate) fn parse_package<'s>() -> impl Parser<&'s str, String, ErrMode<ContextError>> {
    take_while(1.., is_name_char)
        .verify(|s: &str| starts_well(s) && !ends_in_version(s))
        .map(str::to_owned)
        .context(StrContext::Label("package"))
}

/// `name-version` with the version split off at the last `-` that is
/// followed by a valid version.
pub(crate) fn parse_package_version<'s>(
) -> impl Parser<&'s str, (String, Version), ErrMode<ContextError>> {
    take_while(1.., |c: char| is_name_char(c) || matches!(c, '.' | '*'))
        .verify_map(|s: &str| {
            s.match_indices('-').rev().find_map(|(i, _)| {
                let version = parse_version().parse(&s[i + 1..]).ok()?;
                let package = parse_package().parse(&s[..i]).ok()?;
                Some((package, version))
            })
        })
        .context(StrContext::Label("package-version"))
}

/// `category/package-version`
pub(crate) fn parse_package_id<'s>(
) -> impl Parser<&'s str, (CompleteKey, Version), ErrMode<ContextError>> {
    (parse_category(), '/', cut_err(parse_package_version()))
        .map(|(category, _, (package, version))| (CompleteKey::new(category, package), version))
        .context(StrContext::Label("package id"))
}

/// Parse a concrete package id such as `dev-lang/rust-1.75.0-r1`.
pub fn package_id(input: &str) -> Result<(CompleteKey, Version)> {
    let (key, version) = parse_package_id()
        .parse(input)
        .map_err(|e| Error::InvalidPackageId(format!("{}: {}", input, e)))?;
    if version.glob {
        return Err(Error::InvalidPackageId(format!(
            "{}: glob not allowed in a package id",
            input
        )));
    }
    Ok((key, version))
}
