//! PMS user dependency specifier grammar:
//! `[op]category/package[-version][:slot][::repository][[use,...]]`.

use std::fmt;

use winnow::combinator::{alt, cut_err, delimited, fail, opt, preceded, separated, terminated};
use winnow::error::{ContextError, ErrMode, StrContext};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::backend::{DepSpec, Operator, ParseOptions, VersionRequirement};
use crate::error::{Error, Result};
use crate::pms::name::{parse_category, parse_package, parse_package_version};
use crate::pms::version::Version;
use crate::slot::{Slot, SlotDep, SlotOperator};
use crate::use_dep::{UseDefault, UseDep, UseDepKind};

pub(crate) fn parse_operator<'s>() -> impl Parser<&'s str, Operator, ErrMode<ContextError>> {
    alt((
        "<=".value(Operator::LessOrEqual),
        "<".value(Operator::Less),
        ">=".value(Operator::GreaterOrEqual),
        ">".value(Operator::Greater),
        "~".value(Operator::Approximate),
        "=".value(Operator::Equal),
    ))
    .context(StrContext::Label("operator"))
}

/// Category, or `*` (yielding `None`) when wildcards are allowed.
fn category_part<'s>(
    options: ParseOptions,
) -> impl Parser<&'s str, Option<String>, ErrMode<ContextError>> {
    move |input: &mut &'s str| {
        if options.allow_wildcards {
            alt(('*'.value(None), parse_category().map(Some))).parse_next(input)
        } else {
            parse_category().map(Some).parse_next(input)
        }
    }
}

fn slot_name<'s>() -> impl Parser<&'s str, String, ErrMode<ContextError>> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.')
    })
    .verify(|s: &str| !s.starts_with(['-', '.', '+']))
    .map(str::to_owned)
}

fn slot_operator<'s>() -> impl Parser<&'s str, SlotOperator, ErrMode<ContextError>> {
    alt(('='.value(SlotOperator::Equal), '*'.value(SlotOperator::Star)))
}

/// Slot part after the `:`: `0`, `0/1.2`, `0=`, `=`, `*`
pub(crate) fn parse_slot_dep<'s>() -> impl Parser<&'s str, SlotDep, ErrMode<ContextError>> {
    alt((
        slot_operator().map(SlotDep::Operator),
        (
            slot_name(),
            opt(preceded('/', slot_name())),
            opt(slot_operator()),
        )
            .map(|(slot, subslot, op)| SlotDep::Named {
                slot: Slot { slot, subslot },
                op,
            }),
    ))
    .context(StrContext::Label("slot"))
}

fn repository<'s>() -> impl Parser<&'s str, String, ErrMode<ContextError>> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
    })
    .verify(|s: &str| !s.starts_with('-'))
    .map(str::to_owned)
    .context(StrContext::Label("repository"))
}

fn use_flag<'s>() -> impl Parser<&'s str, String, ErrMode<ContextError>> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '@')
    })
    .verify(|s: &str| s.starts_with(|c: char| c.is_ascii_alphanumeric()))
    .map(str::to_owned)
}

fn use_default<'s>() -> impl Parser<&'s str, UseDefault, ErrMode<ContextError>> {
    alt((
        "(+)".value(UseDefault::Enabled),
        "(-)".value(UseDefault::Disabled),
    ))
}

/// One item of a USE block: `flag`, `-flag`, `flag?`, `!flag?`, `flag=`,
/// `!flag=`, each with an optional `(+)`/`(-)` default after the name.
fn use_dep_item<'s>() -> impl Parser<&'s str, UseDep, ErrMode<ContextError>> {
    (
        opt(one_of(['!', '-'])),
        use_flag(),
        opt(use_default()),
        opt(one_of(['?', '='])),
    )
        .verify_map(|(prefix, flag, default, marker)| {
            let kind = match (prefix, marker) {
                (None, None) => UseDepKind::Enabled,
                (Some('-'), None) => UseDepKind::Disabled,
                (None, Some('?')) => UseDepKind::Conditional,
                (Some('!'), Some('?')) => UseDepKind::ConditionalInverse,
                (None, Some('=')) => UseDepKind::Equal,
                (Some('!'), Some('=')) => UseDepKind::EqualInverse,
                _ => return None,
            };
            Some(UseDep {
                flag,
                kind,
                default,
            })
        })
}

/// `[ssl,-debug,python?]`, tolerating a trailing comma
pub(crate) fn parse_use_deps<'s>() -> impl Parser<&'s str, Vec<UseDep>, ErrMode<ContextError>> {
    delimited(
        '[',
        cut_err(terminated(separated(1.., use_dep_item(), ','), opt(','))),
        cut_err(']'),
    )
    .context(StrContext::Label("use deps"))
}

pub(crate) fn parse_dep_spec<'s>(
    options: ParseOptions,
) -> impl Parser<&'s str, DepSpec<Version>, ErrMode<ContextError>> {
    move |input: &mut &'s str| {
        let op = opt(parse_operator()).parse_next(input)?;
        let (category, _) = (category_part(options), '/').parse_next(input)?;

        let mut spec = match op {
            // an operator commits us to a versioned package
            Some(op) => {
                let (package, version) = cut_err(parse_package_version())
                    .context(StrContext::Label("versioned atom"))
                    .parse_next(input)?;
                let mut spec = DepSpec::new(category, package);
                spec.version = Some(VersionRequirement { op, version });
                spec
            }
            None => DepSpec::new(category, parse_package().parse_next(input)?),
        };

        if let Some(req) = &spec.version {
            if req.version.glob && req.op != Operator::Equal {
                return fail.parse_next(input);
            }
        }

        spec.slot = opt(preceded(':', parse_slot_dep())).parse_next(input)?;
        spec.repository = opt(preceded("::", repository())).parse_next(input)?;
        spec.use_deps = opt(parse_use_deps()).parse_next(input)?.unwrap_or_default();
        Ok(spec)
    }
}

/// Parse a user specifier with the given options.
pub fn dep_spec(input: &str, options: ParseOptions) -> Result<DepSpec<Version>> {
    parse_dep_spec(options)
        .parse(input)
        .map_err(|e| Error::InvalidSpec(format!("{}: {}", input, e)))
}

/// Canonical rendering of a PMS specifier
pub(crate) struct Formatted<'a>(pub(crate) &'a DepSpec<Version>);

impl fmt::Display for Formatted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let spec = self.0;
        if let Some(req) = &spec.version {
            write!(f, "{}", req.op)?;
        }
        match &spec.category {
            Some(category) => write!(f, "{}/{}", category, spec.package)?,
            None => write!(f, "*/{}", spec.package)?,
        }
        if let Some(req) = &spec.version {
            write!(f, "-{}", req.version)?;
        }
        if let Some(slot) = &spec.slot {
            write!(f, ":{}", slot)?;
        }
        if let Some(repo) = &spec.repository {
            write!(f, "::{}", repo)?;
        }
        if let Some((first, rest)) = spec.use_deps.split_first() {
            write!(f, "[{}", first)?;
            for dep in rest {
                write!(f, ",{}", dep)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
