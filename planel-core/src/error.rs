//! Error types for planel operations.

use thiserror::Error;

/// Result type alias using planel Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure taxonomy shared by every error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unsupported element, quadrature, material or domain setup.
    Configuration,
    /// Zero or near-zero pivot during elimination.
    Numerical,
    /// Unreadable or malformed mesh/solution file.
    Io,
}

/// Errors that can occur during planel operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Unsupported element/quadrature combination or invalid argument.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid material properties.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// Mesh connectivity or geometry errors.
    #[error("mesh error: {0}")]
    Mesh(String),

    /// No boundary domain with that name.
    #[error("undefined domain: {0:?}")]
    UnknownDomain(String),

    /// Two domains would share a name.
    #[error("cannot use the same name for two domains: {0:?}")]
    DuplicateDomain(String),

    /// A dof is already fixed to a different value by another condition.
    #[error("dof {dof} already constrained to {existing:e}, refusing {requested:e}")]
    ConflictingConstraint {
        dof: usize,
        existing: f64,
        requested: f64,
    },

    /// Matrix singularity detected during elimination.
    #[error("singular matrix: pivot {index} has value {pivot:e}")]
    SingularMatrix { index: usize, pivot: f64 },

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed text input.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl Error {
    /// Which branch of the failure taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_)
            | Error::InvalidMaterial(_)
            | Error::Mesh(_)
            | Error::UnknownDomain(_)
            | Error::DuplicateDomain(_)
            | Error::ConflictingConstraint { .. } => ErrorKind::Configuration,
            Error::SingularMatrix { .. } => ErrorKind::Numerical,
            Error::Io(_) | Error::Parse { .. } => ErrorKind::Io,
        }
    }
}
