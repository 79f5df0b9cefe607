//! Backend-neutral package atom matching
//!
//! This crate exposes a package manager backend's dependency specifier
//! ("atom") semantics through one common model: an [`Atom`] parsed by a
//! [`Backend`], matched against [`Package`]s, with [`PackageKey`] and
//! [`PackageVersion`] views over the backend's own data.
//!
//! The bundled [`Pms`] backend implements the Gentoo
//! [Package Manager Specification (PMS)][PMS] grammar and version rules.
//!
//! [PMS]: https://projects.gentoo.org/pms/latest/pms.html
//!
//! # Examples
//!
//! Parse and match a complete atom:
//! ```
//! use pm_atom::{Atom, Environment, Pms};
//!
//! let mut env = Environment::new(Pms);
//! env.add("dev-lang/rust-1.75.0", "0", "gentoo").unwrap();
//! env.add("dev-lang/rust-1.76.0", "0", "gentoo").unwrap();
//!
//! let atom = Atom::parse(&env, ">=dev-lang/rust-1.76.0::gentoo").unwrap();
//! assert!(atom.is_complete());
//! assert_eq!(env.select(&atom).count(), 1);
//! assert_eq!(atom.to_spec_string().unwrap(), ">=dev-lang/rust-1.76.0::gentoo");
//! ```
//!
//! A bare package name parses into an incomplete atom, which matches by
//! name but cannot be stringified:
//! ```
//! use pm_atom::{Atom, Environment, Error, Pms};
//!
//! let mut env = Environment::new(Pms);
//! env.add("dev-lang/rust-1.75.0", "0", "gentoo").unwrap();
//!
//! let atom = Atom::parse(&env, "rust").unwrap();
//! assert!(!atom.is_complete());
//! assert_eq!(env.select(&atom).count(), 1);
//! assert!(matches!(atom.to_spec_string(), Err(Error::IncompleteAtom(_))));
//! ```
//!
//! Compare versions:
//! ```
//! use pm_atom::{PackageVersion, Pms};
//!
//! let v = PackageVersion::parse(&Pms, "1.2-r3").unwrap();
//! assert_eq!(v.revision().unwrap(), 3);
//! assert_eq!(v.without_revision(), "1.2");
//! assert!(PackageVersion::parse(&Pms, "1.2_rc1").unwrap() < v);
//! ```

mod atom;
mod backend;
mod environment;
mod error;
mod key;
mod package;
pub mod pms;
mod slot;
pub mod testing;
mod use_dep;
mod version;

// Re-export main types
pub use atom::{Atom, Blocker, CompleteAtom};
pub use backend::{Backend, DepSpec, Operator, ParseOptions, VersionRequirement};
pub use environment::{Environment, EnvironmentConfig, PackageConfig, RepositoryConfig};
pub use error::{Error, Result};
pub use key::{CompleteKey, IncompleteKey, PackageKey};
pub use package::{Package, PackageRecord};
pub use pms::Pms;
pub use slot::{Slot, SlotDep, SlotOperator};
pub use use_dep::{UseDefault, UseDep, UseDepKind};
pub use version::PackageVersion;
