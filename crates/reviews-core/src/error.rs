//! Error taxonomy for discovery and decoding.
//!
//! Per-record errors ([`DecodeError`]) skip one account; per-category errors
//! ([`CategoryError`]) drop every record of one kind; [`AssemblyError`] is
//! reserved for programming mistakes that make the whole call meaningless.
//! Every error maps to a reportable [`FailureKind`].

use std::fmt;

use reviews_transport::ScanError;
use serde::Serialize;

use crate::discriminator::Discriminator;
use crate::records::RecordKind;

/// Reportable category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    #[serde(rename = "NetworkError")]
    Network,
    InvalidFilter,
    SchemaMismatch,
    TruncatedPayload,
    UnknownType,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Network => "NetworkError",
            FailureKind::InvalidFilter => "InvalidFilter",
            FailureKind::SchemaMismatch => "SchemaMismatch",
            FailureKind::TruncatedPayload => "TruncatedPayload",
            FailureKind::UnknownType => "UnknownType",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ScanError> for FailureKind {
    fn from(err: &ScanError) -> Self {
        match err {
            ScanError::InvalidFilter { .. } => FailureKind::InvalidFilter,
            ScanError::Network { .. } | ScanError::Rpc { .. } => FailureKind::Network,
        }
    }
}

/// Why a payload could not be turned into a record.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The interface description does not declare this account type.
    UnknownType { type_name: String },
    /// The cursor would run past the end of the payload.
    TruncatedPayload {
        type_name: String,
        /// Dotted path of the field being read (`"discriminator"` for the tag).
        field: String,
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// Payload or decoded fields disagree with the declared layout.
    SchemaMismatch { type_name: String, reason: String },
    /// The tag matches none of the known record kinds.
    UnrecognizedDiscriminator { found: Discriminator },
}

impl DecodeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DecodeError::UnknownType { .. } => FailureKind::UnknownType,
            DecodeError::TruncatedPayload { .. } => FailureKind::TruncatedPayload,
            DecodeError::SchemaMismatch { .. } | DecodeError::UnrecognizedDiscriminator { .. } => {
                FailureKind::SchemaMismatch
            }
        }
    }

    pub(crate) fn mismatch(type_name: &str, reason: impl Into<String>) -> Self {
        DecodeError::SchemaMismatch {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownType { type_name } => {
                write!(f, "UnknownType: '{}' is not declared in the IDL", type_name)
            }
            DecodeError::TruncatedPayload {
                type_name,
                field,
                offset,
                needed,
                available,
            } => write!(
                f,
                "TruncatedPayload: {}.{} needs {} bytes at offset {}, {} available",
                type_name, field, needed, offset, available
            ),
            DecodeError::SchemaMismatch { type_name, reason } => {
                write!(f, "SchemaMismatch: {}: {}", type_name, reason)
            }
            DecodeError::UnrecognizedDiscriminator { found } => {
                write!(f, "SchemaMismatch: unrecognized discriminator {}", found)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Failure that removes a whole record kind from the result.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryError {
    Scan(ScanError),
    Schema(DecodeError),
}

impl CategoryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CategoryError::Scan(err) => FailureKind::from(err),
            CategoryError::Schema(err) => err.kind(),
        }
    }
}

impl fmt::Display for CategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryError::Scan(err) => err.fmt(f),
            CategoryError::Schema(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CategoryError {}

/// Fatal assembler errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyError {
    /// A scan filter could not be built, or the scanner refused it.
    InvalidFilter { kind: RecordKind, reason: String },
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyError::InvalidFilter { kind, reason } => {
                write!(f, "InvalidFilter for {} scan: {}", kind, reason)
            }
        }
    }
}

impl std::error::Error for AssemblyError {}
