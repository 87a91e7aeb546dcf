//! Error handling for the WRT engine
//!
//! Every fallible operation in the crate returns [`WrtResult`]. Errors are
//! always detected before a namespace is mutated, so an `Err` never leaves a
//! graph half-updated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a submitted matrix was rejected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformDefect {
    /// `R * R^T - I` exceeds the configured tolerance (Frobenius norm)
    NotOrthonormal { deviation: f64 },
    /// Orthonormal but a reflection, or scaled: `det(R) != +1`
    NotProperRotation { determinant: f64 },
    /// Bottom row of the homogeneous matrix is not `[0, 0, 0, 1]`
    BadHomogeneousRow,
    /// NaN or infinite component
    NonFinite,
}

impl std::fmt::Display for TransformDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformDefect::NotOrthonormal { deviation } => {
                write!(f, "rotation is not orthonormal (|R*R^T - I| = {:e})", deviation)
            }
            TransformDefect::NotProperRotation { determinant } => {
                write!(f, "rotation determinant is {} instead of 1", determinant)
            }
            TransformDefect::BadHomogeneousRow => {
                write!(f, "last row of the matrix must be [0, 0, 0, 1]")
            }
            TransformDefect::NonFinite => write!(f, "matrix contains NaN or infinite values"),
        }
    }
}

/// What kind of identifier failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameKind {
    Namespace,
    Frame,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameKind::Namespace => write!(f, "namespace"),
            NameKind::Frame => write!(f, "frame"),
        }
    }
}

/// WRT error types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WrtError {
    #[error("Frame '{0}' does not exist in this namespace")]
    UnknownFrame(String),

    #[error("Basis frame '{0}' does not exist in this namespace")]
    UnknownBasisFrame(String),

    #[error("Invalid transform: {0}")]
    InvalidTransform(TransformDefect),

    #[error("Frame '{frame}' cannot be defined with respect to '{basis}': it would close a loop")]
    CyclicReference { frame: String, basis: String },

    #[error("Frame '{0}' is reserved and cannot be set")]
    ReservedFrame(String),

    #[error("Invalid {kind} name '{name}'")]
    InvalidName { kind: NameKind, name: String },

    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Frame graph invariant violated: {0}")]
    Inconsistent(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WrtError {
    pub fn config(msg: impl Into<String>) -> Self {
        WrtError::Config(msg.into())
    }

    /// True for the errors a caller fixes by resending different data.
    ///
    /// `Config` and `Inconsistent` are not caused by the request itself.
    pub fn is_request_error(&self) -> bool {
        !matches!(self, WrtError::Config(_) | WrtError::Inconsistent(_))
    }
}

impl From<TransformDefect> for WrtError {
    fn from(defect: TransformDefect) -> Self {
        WrtError::InvalidTransform(defect)
    }
}

impl From<serde_json::Error> for WrtError {
    fn from(err: serde_json::Error) -> Self {
        WrtError::Malformed(err.to_string())
    }
}

impl From<toml::de::Error> for WrtError {
    fn from(err: toml::de::Error) -> Self {
        WrtError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<serde_yaml::Error> for WrtError {
    fn from(err: serde_yaml::Error) -> Self {
        WrtError::Config(format!("YAML parse error: {}", err))
    }
}

/// Result type for WRT operations
pub type WrtResult<T> = Result<T, WrtError>;
