//! Error types for `hashdict`.
//!
//! A single error type covers every dictionary operation. Variants fall into
//! the three caller-visible families reported by [`Error::kind`]:
//! configuration errors (bad names, bad key shapes), load errors (empty or
//! failing sources) and type errors (incompatible output representation).

use thiserror::Error;

use crate::types::ValueType;

/// Result type alias for `hashdict` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error family, used by callers that decide whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied something that does not match the dictionary structure.
    Configuration,
    /// The source could not produce (enough) data.
    Load,
    /// The requested output type does not match the attribute type.
    Type,
    /// Broken internal invariant.
    Internal,
}

/// Errors that can occur in `hashdict` operations.
///
/// Error codes follow the pattern `HDICT-XXX`.
#[derive(Error, Debug)]
pub enum Error {
    /// Attribute not declared in the dictionary structure (HDICT-001).
    #[error("[HDICT-001] No such attribute '{0}'")]
    UnknownAttribute(String),

    /// Wrong number of key columns (HDICT-002).
    #[error("[HDICT-002] Key arity mismatch: expected {expected} key columns, got {actual}")]
    KeyArityMismatch {
        /// Declared key column count.
        expected: usize,
        /// Supplied key column count.
        actual: usize,
    },

    /// Key column of the wrong type (HDICT-003).
    #[error("[HDICT-003] Key type mismatch at position {position}: expected {expected}, got {actual}")]
    KeyTypeMismatch {
        /// Zero-based key column position.
        position: usize,
        /// Declared type.
        expected: ValueType,
        /// Supplied type.
        actual: ValueType,
    },

    /// Output type incompatible with the attribute type (HDICT-004).
    #[error("[HDICT-004] Type mismatch for attribute '{attribute}': attribute is {expected}, requested {requested}")]
    TypeMismatch {
        /// Attribute name.
        attribute: String,
        /// Declared attribute type.
        expected: ValueType,
        /// Requested output type name.
        requested: &'static str,
    },

    /// Per-row defaults do not cover every key row (HDICT-005).
    #[error("[HDICT-005] Default array has {actual} values for {expected} key rows")]
    DefaultsLengthMismatch {
        /// Number of key rows.
        expected: usize,
        /// Number of defaults supplied.
        actual: usize,
    },

    /// Source produced no rows while the dictionary requires data (HDICT-006).
    #[error("[HDICT-006] Dictionary source of '{0}' is empty and 'require_nonempty' is set")]
    EmptySource(String),

    /// Source failure while loading or updating (HDICT-007).
    #[error("[HDICT-007] Source error: {0}")]
    Source(String),

    /// Invalid dictionary structure (HDICT-008).
    #[error("[HDICT-008] Invalid dictionary structure: {0}")]
    InvalidStructure(String),

    /// Literal that cannot be represented in the target type (HDICT-009).
    #[error("[HDICT-009] Cannot convert '{literal}' to {value_type}: {reason}")]
    InvalidLiteral {
        /// Offending literal, rendered as text.
        literal: String,
        /// Target type.
        value_type: ValueType,
        /// Human-readable reason.
        reason: String,
    },

    /// Configuration error (HDICT-010).
    #[error("[HDICT-010] Configuration error: {0}")]
    Config(String),

    /// IO error (HDICT-011).
    #[error("[HDICT-011] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tuple width does not match the column list (HDICT-012).
    #[error("[HDICT-012] Values size should match with number of columns: expected {expected}, got {actual}")]
    ValuesSizeMismatch {
        /// Column count.
        expected: usize,
        /// Tuple width.
        actual: usize,
    },

    /// Column batch that does not fit the declared layout (HDICT-013).
    #[error("[HDICT-013] Malformed block: {0}")]
    MalformedBlock(String),

    /// Operation not supported by a source (HDICT-014).
    #[error("[HDICT-014] Unsupported operation: {0}")]
    Unsupported(String),

    /// Internal error (HDICT-015).
    ///
    /// Indicates an unexpected internal error. Please report if encountered.
    #[error("[HDICT-015] Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code (e.g., "HDICT-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownAttribute(_) => "HDICT-001",
            Self::KeyArityMismatch { .. } => "HDICT-002",
            Self::KeyTypeMismatch { .. } => "HDICT-003",
            Self::TypeMismatch { .. } => "HDICT-004",
            Self::DefaultsLengthMismatch { .. } => "HDICT-005",
            Self::EmptySource(_) => "HDICT-006",
            Self::Source(_) => "HDICT-007",
            Self::InvalidStructure(_) => "HDICT-008",
            Self::InvalidLiteral { .. } => "HDICT-009",
            Self::Config(_) => "HDICT-010",
            Self::Io(_) => "HDICT-011",
            Self::ValuesSizeMismatch { .. } => "HDICT-012",
            Self::MalformedBlock(_) => "HDICT-013",
            Self::Unsupported(_) => "HDICT-014",
            Self::Internal(_) => "HDICT-015",
        }
    }

    /// Returns the error family.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAttribute(_)
            | Self::KeyArityMismatch { .. }
            | Self::KeyTypeMismatch { .. }
            | Self::DefaultsLengthMismatch { .. }
            | Self::InvalidStructure(_)
            | Self::InvalidLiteral { .. }
            | Self::Config(_)
            | Self::ValuesSizeMismatch { .. } => ErrorKind::Configuration,
            Self::EmptySource(_)
            | Self::Source(_)
            | Self::Io(_)
            | Self::MalformedBlock(_)
            | Self::Unsupported(_) => ErrorKind::Load,
            Self::TypeMismatch { .. } => ErrorKind::Type,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if retrying later may succeed.
    ///
    /// Only load failures qualify: a caller error stays wrong until the
    /// caller changes its request.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Load)
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
