//! Unified application error type.
//! Every module (models, core, files, cli) returns AppError so that the
//! controller can map any failure onto the small set of kinds the UI knows.

use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Write failed for {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot decode {0}")]
    Decode(String),

    // ---------------------------
    // Paths and lots
    // ---------------------------
    #[error("Invalid lot number: {0}")]
    InvalidLotNumber(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("File is locked: {0}")]
    Locked(String),

    // ---------------------------
    // Navigation / validation
    // ---------------------------
    #[error("No such board: {0}")]
    NoSuchBoard(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Error categories that cross the boundary into the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidLotNumber,
    InvalidPath,
    NotFound,
    PermissionDenied,
    DecodeError,
    IntegrityWarning,
    IoFailure,
    NoSuchBoard,
    ValidationError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidLotNumber => "invalid_lot_number",
            ErrorKind::InvalidPath => "invalid_path",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::DecodeError => "decode_error",
            ErrorKind::IntegrityWarning => "integrity_warning",
            ErrorKind::IoFailure => "io_failure",
            ErrorKind::NoSuchBoard => "no_such_board",
            ErrorKind::ValidationError => "validation_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Io(e) if e.kind() == io::ErrorKind::NotFound => ErrorKind::NotFound,
            AppError::Io(_) | AppError::WriteFailed { .. } | AppError::Locked(_) => {
                ErrorKind::IoFailure
            }
            AppError::Json(_) | AppError::Decode(_) => ErrorKind::DecodeError,
            AppError::Yaml(_) | AppError::Config(_) | AppError::Validation(_) => {
                ErrorKind::ValidationError
            }
            AppError::Csv(_) | AppError::Other(_) => ErrorKind::IoFailure,
            AppError::InvalidLotNumber(_) => ErrorKind::InvalidLotNumber,
            AppError::InvalidPath(_) => ErrorKind::InvalidPath,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            AppError::NoSuchBoard(_) => ErrorKind::NoSuchBoard,
        }
    }

    /// Failures that must drop the bound document path of the current board.
    pub fn invalidates_binding(&self) -> bool {
        self.kind() == ErrorKind::IoFailure
    }
}
