//! # wrt_core - Named Frame Transform Engine
//!
//! Stores trees of named coordinate frames, one tree per namespace, and
//! answers "where is frame A with respect to frame B, written in the axes of
//! frame C" for any three frames of a namespace.
//!
//! ## Key Features
//!
//! - **Snapshot reads**: every query runs on an immutable snapshot; reads never
//!   block each other and never see a half-applied write
//! - **Atomic writes**: validate first, then publish the next snapshot with one
//!   pointer swap; a rejected write leaves the namespace untouched
//! - **Short paths**: resolution visits only the edges between the two frames
//!   and their lowest common ancestor
//! - **Isolated namespaces**: one independently locked graph per namespace
//! - **f64 everywhere**, with periodic re-orthonormalization on long chains
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Router            Set / Get / handle(Request) -> Response   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  NamespaceRegistry      DashMap<String, Arc<FrameGraph>>     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  FrameGraph        RwLock<Arc<GraphSnapshot>> + writer lock  │
//! │    └─ GraphSnapshot     arena: Vec<Arc<FrameNode>>           │
//! │         └─ Resolver     LCA walk + chain composition         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use wrt_core::{RigidTransform, Router};
//!
//! let router = Router::default();
//! let offset = RigidTransform::from_translation([1.0, 1.0, 1.0]);
//! router.set("cell", "base", "world", "world", &offset)?;
//!
//! let pose = router.get("cell", "world", "base", "base")?;
//! assert_eq!(pose.translation, [-1.0, -1.0, -1.0]);
//! # Ok::<(), wrt_core::WrtError>(())
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod messages;
pub mod node;
pub mod registry;
pub mod resolver;
pub mod router;
pub mod transform;

pub use config::{NamePolicy, WrtConfig};
pub use error::{NameKind, TransformDefect, WrtError, WrtResult};
pub use graph::{Commit, FrameGraph, GraphExport, GraphSnapshot};
pub use messages::{BoundaryError, ErrorKind, Request, Response, WireTransform};
pub use node::{Direction, FrameId, NodeView, PathStep, ROOT_FRAME, ROOT_ID};
pub use registry::NamespaceRegistry;
pub use resolver::Resolver;
pub use router::Router;
pub use transform::{Matrix4, RigidTransform, Rotation};
