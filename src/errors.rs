//! Error types for wrapper generation.
//!
//! Every stage of the pipeline fails fast with a [`GenError`]. Each variant
//! maps to an [`ErrorKind`] and a stable [`ErrorCode`] so callers can handle
//! failures programmatically and the CLI can print `error[E010]: ...`.
//!
//! # Error Codes
//!
//! - E001-E009: package location
//! - E010-E019: parsing and declaration-level type checking
//! - E020-E029: type lookup
//! - E030-E039: method extraction
//! - E040-E049: I/O
//! - E050-E059: internal invariant violations

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error code for documentation and programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorCode(&'static str);

impl ErrorCode {
    pub const PACKAGE_NOT_FOUND: ErrorCode = ErrorCode("E001");
    pub const TYPE_CHECK: ErrorCode = ErrorCode("E010");
    pub const TYPE_NOT_FOUND: ErrorCode = ErrorCode("E020");
    pub const NOT_A_NAMED_TYPE: ErrorCode = ErrorCode("E021");
    pub const UNSUPPORTED_TYPE: ErrorCode = ErrorCode("E022");
    pub const NO_METHODS: ErrorCode = ErrorCode("E030");
    pub const MALFORMED_SIGNATURE: ErrorCode = ErrorCode("E031");
    pub const IO: ErrorCode = ErrorCode("E040");
    pub const FORMAT: ErrorCode = ErrorCode("E050");

    /// Get the error code string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse classification of a [`GenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    PackageNotFound,
    TypeCheckError,
    TypeNotFound,
    NotANamedType,
    UnsupportedType,
    NoMethods,
    MalformedSignature,
    Io,
    Format,
}

/// Main error type for wrapper generation
#[derive(Debug, Error)]
pub enum GenError {
    /// The package identifier could not be resolved to a directory of Go sources
    #[error("cannot find package {identifier:?}{}", searched_suffix(.searched))]
    PackageNotFound {
        identifier: String,
        searched: Vec<PathBuf>,
    },

    /// Syntax or declaration-level type error in the loaded package
    #[error("{}:{line}:{column}: {message}", .file.display())]
    TypeCheck {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// No exported package-level type with the requested name
    #[error("type {package}.{name} does not exist")]
    TypeNotFound { package: String, name: String },

    /// The requested symbol exists but is not a type declaration
    #[error("{package}.{name} is a {kind}, not a type")]
    NotANamedType {
        package: String,
        name: String,
        kind: String,
    },

    /// The type exists but cannot be wrapped
    #[error("type {name} is not supported: {reason}")]
    UnsupportedType { name: String, reason: String },

    /// The type cannot bear methods
    #[error("type {name} has no method set: {reason}")]
    NoMethods { name: String, reason: String },

    /// A method's declaration does not expose a parameter/result tuple
    #[error("method {method}: malformed signature: {reason}")]
    MalformedSignature { method: String, reason: String },

    /// File system errors
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The formatter rejected generated source
    #[error("internal error: generated source was rejected by the formatter: {0}")]
    Format(String),
}

fn searched_suffix(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return String::new();
    }
    let dirs: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
    format!(" (searched {})", dirs.join(", "))
}

impl GenError {
    /// Create a type-check error at a source location (1-indexed)
    pub fn type_check(
        file: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::TypeCheck {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSignature {
            method: method.into(),
            reason: reason.into(),
        }
    }

    pub fn no_methods(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NoMethods {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PackageNotFound { .. } => ErrorKind::PackageNotFound,
            Self::TypeCheck { .. } => ErrorKind::TypeCheckError,
            Self::TypeNotFound { .. } => ErrorKind::TypeNotFound,
            Self::NotANamedType { .. } => ErrorKind::NotANamedType,
            Self::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Self::NoMethods { .. } => ErrorKind::NoMethods,
            Self::MalformedSignature { .. } => ErrorKind::MalformedSignature,
            Self::Io { .. } => ErrorKind::Io,
            Self::Format(_) => ErrorKind::Format,
        }
    }

    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self.kind() {
            ErrorKind::PackageNotFound => ErrorCode::PACKAGE_NOT_FOUND,
            ErrorKind::TypeCheckError => ErrorCode::TYPE_CHECK,
            ErrorKind::TypeNotFound => ErrorCode::TYPE_NOT_FOUND,
            ErrorKind::NotANamedType => ErrorCode::NOT_A_NAMED_TYPE,
            ErrorKind::UnsupportedType => ErrorCode::UNSUPPORTED_TYPE,
            ErrorKind::NoMethods => ErrorCode::NO_METHODS,
            ErrorKind::MalformedSignature => ErrorCode::MALFORMED_SIGNATURE,
            ErrorKind::Io => ErrorCode::IO,
            ErrorKind::Format => ErrorCode::FORMAT,
        }
    }

    /// True when the failure comes from the input package rather than from
    /// this tool.
    #[must_use]
    pub fn is_user_fixable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Format | ErrorKind::Io)
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, GenError>;
