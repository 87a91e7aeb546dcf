//! Frame nodes stored in a graph's arena

use serde::{Deserialize, Serialize};

use crate::transform::RigidTransform;

/// Index of a node in its graph's arena
///
/// Ids are stable for the lifetime of a namespace: nodes are never removed,
/// only updated, so an id handed out once keeps naming the same frame.
pub type FrameId = u32;

/// Id of the implicit `world` root in every graph
pub const ROOT_ID: FrameId = 0;

/// Reserved name of the root frame
pub const ROOT_FRAME: &str = "world";

/// One vertex of the frame tree
///
/// Holds the single incoming edge (parent id + pose of this frame in the
/// parent) and bookkeeping. Immutable once published in a snapshot; writes
/// replace the node with an updated copy.
#[derive(Debug, Clone)]
pub struct FrameNode {
    pub name: String,
    /// `None` only for the root
    pub parent: Option<FrameId>,
    /// Pose of this frame in its parent
    pub transform: RigidTransform,
    /// Successful writes to this frame, starting at 1
    pub version: u64,
    /// Number of edges between this frame and the root
    pub depth: u32,
    pub children: Vec<FrameId>,
    /// Nanoseconds since UNIX epoch
    pub created_ns: u64,
    pub updated_ns: u64,
}

impl FrameNode {
    pub(crate) fn root(now_ns: u64) -> Self {
        Self {
            name: ROOT_FRAME.to_string(),
            parent: None,
            transform: RigidTransform::identity(),
            version: 0,
            depth: 0,
            children: Vec::new(),
            created_ns: now_ns,
            updated_ns: now_ns,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Read-only copy of a node, with the parent resolved to its name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub name: String,
    /// `None` for `world`
    pub parent: Option<String>,
    pub transform: RigidTransform,
    pub version: u64,
    pub depth: u32,
    pub created_ns: u64,
    pub updated_ns: u64,
}

/// Which way an edge is traversed on a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Child to parent: the stored transform applies as-is
    Up,
    /// Parent to child: the stored transform must be inverted
    Down,
}

/// One edge on a path through the tree
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    /// The child end of the edge
    pub frame: String,
    /// Pose of `frame` in its parent
    pub transform: RigidTransform,
    pub direction: Direction,
}

/// Get current timestamp in nanoseconds
pub fn timestamp_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
