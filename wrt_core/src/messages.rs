//! Request and response messages
//!
//! Serializable forms of the two operations and their outcomes. Transforms
//! travel as 4x4 row-major homogeneous matrices; errors travel as a kind plus
//! a human-readable message.

use serde::{Deserialize, Serialize};

use crate::error::{WrtError, WrtResult};
use crate::node::ROOT_FRAME;
use crate::transform::{Matrix4, RigidTransform};

/// 4x4 row-major homogeneous matrix as sent over the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireTransform(pub Matrix4);

impl WireTransform {
    pub fn identity() -> Self {
        Self(RigidTransform::identity().to_matrix())
    }

    pub fn matrix(&self) -> &Matrix4 {
        &self.0
    }

    /// Validate and convert into a [`RigidTransform`]
    pub fn to_transform(&self, tolerance: f64) -> WrtResult<RigidTransform> {
        RigidTransform::from_matrix(&self.0, tolerance)
    }
}

impl From<RigidTransform> for WireTransform {
    fn from(tf: RigidTransform) -> Self {
        Self(tf.to_matrix())
    }
}

impl From<Matrix4> for WireTransform {
    fn from(m: Matrix4) -> Self {
        Self(m)
    }
}

fn default_frame() -> String {
    ROOT_FRAME.to_string()
}

/// One operation against a namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Store the pose of `subject` relative to `basis`
    Set {
        namespace: String,
        subject: String,
        #[serde(default = "default_frame")]
        basis: String,
        /// Axes the matrix is written in; defaults to `basis`
        #[serde(default)]
        expressed_in: Option<String>,
        transform: WireTransform,
    },
    /// Read the pose of `subject` relative to `basis`
    Get {
        namespace: String,
        subject: String,
        #[serde(default = "default_frame")]
        basis: String,
        #[serde(default)]
        expressed_in: Option<String>,
    },
}

impl Request {
    pub fn set(
        namespace: impl Into<String>,
        subject: impl Into<String>,
        basis: impl Into<String>,
        transform: impl Into<WireTransform>,
    ) -> Self {
        Request::Set {
            namespace: namespace.into(),
            subject: subject.into(),
            basis: basis.into(),
            expressed_in: None,
            transform: transform.into(),
        }
    }

    pub fn get(
        namespace: impl Into<String>,
        subject: impl Into<String>,
        basis: impl Into<String>,
    ) -> Self {
        Request::Get {
            namespace: namespace.into(),
            subject: subject.into(),
            basis: basis.into(),
            expressed_in: None,
        }
    }

    /// Set the expressed-in frame of either variant
    pub fn expressed_in(mut self, frame: impl Into<String>) -> Self {
        match &mut self {
            Request::Set { expressed_in, .. } | Request::Get { expressed_in, .. } => {
                *expressed_in = Some(frame.into());
            }
        }
        self
    }

    pub fn namespace(&self) -> &str {
        match self {
            Request::Set { namespace, .. } | Request::Get { namespace, .. } => namespace,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Request::Set { .. })
    }

    pub fn to_json(&self) -> WrtResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> WrtResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Serializable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownFrame,
    UnknownBasisFrame,
    InvalidTransform,
    CyclicReference,
    ReservedFrame,
    InvalidName,
    Malformed,
    Internal,
}

impl From<&WrtError> for ErrorKind {
    fn from(err: &WrtError) -> Self {
        match err {
            WrtError::UnknownFrame(_) => ErrorKind::UnknownFrame,
            WrtError::UnknownBasisFrame(_) => ErrorKind::UnknownBasisFrame,
            WrtError::InvalidTransform(_) => ErrorKind::InvalidTransform,
            WrtError::CyclicReference { .. } => ErrorKind::CyclicReference,
            WrtError::ReservedFrame(_) => ErrorKind::ReservedFrame,
            WrtError::InvalidName { .. } => ErrorKind::InvalidName,
            WrtError::Malformed(_) => ErrorKind::Malformed,
            WrtError::Inconsistent(_) | WrtError::Config(_) => ErrorKind::Internal,
        }
    }
}

/// Error as reported to a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&WrtError> for BoundaryError {
    fn from(err: &WrtError) -> Self {
        Self {
            kind: err.into(),
            message: err.to_string(),
        }
    }
}

impl From<WrtError> for BoundaryError {
    fn from(err: WrtError) -> Self {
        (&err).into()
    }
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for BoundaryError {}

/// Outcome of a [`Request`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// Committed; the frame's new version
    Set { version: u64 },
    /// Resolved pose
    Get { transform: WireTransform },
    Error(BoundaryError),
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    pub fn error(&self) -> Option<&BoundaryError> {
        match self {
            Response::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn to_json(&self) -> WrtResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> WrtResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
