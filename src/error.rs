/// Error type for atom parsing, matching and environment loading
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("invalid package id: {0}")]
    InvalidPackageId(String),

    #[error("invalid dependency specifier: {0}")]
    InvalidSpec(String),

    /// The specifier could not be parsed, neither strictly nor with a
    /// category wildcard.
    #[error("incorrect atom: {0}")]
    InvalidAtomSpecifier(String),

    /// An operation needing a category was invoked on an incomplete atom.
    #[error("unable to stringify incomplete atom: {0}")]
    IncompleteAtom(String),

    /// The backend broke its revision contract (`r<digits>`).
    #[error("{backend} backend returned malformed revision {revision:?}")]
    MalformedRevision {
        backend: &'static str,
        revision: String,
    },

    #[error("invalid environment config: {0}")]
    Config(String),
}

/// Result type for pm-atom operations
pub type Result<T> = std::result::Result<T, Error>;
