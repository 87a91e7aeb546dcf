//! # WRT - With Respect To
//!
//! Client-side entry point to the frame engine. Poses are read and written
//! with a chain that names every frame involved:
//!
//! ```rust
//! use wrt::prelude::*;
//!
//! let db = Database::new();
//! let pose = [
//!     [1.0, 0.0, 0.0, 1.0],
//!     [0.0, 1.0, 0.0, 1.0],
//!     [0.0, 0.0, 1.0, 1.0],
//!     [0.0, 0.0, 0.0, 1.0],
//! ];
//! db.in_ns("test").set("a").wrt("world").ei("world").as_matrix(&pose)?;
//!
//! let back = db.in_ns("test").get("a").wrt("world").ei("world")?;
//! assert_eq!(back.to_matrix(), pose);
//! # Ok::<(), WrtError>(())
//! ```
//!
//! - `in_ns`: namespace, created by its first `set`
//! - `set` / `get`: subject frame
//! - `wrt`: basis frame the pose is relative to
//! - `ei`: frame whose axes the numbers are written in

mod builder;

use std::path::Path;
use std::sync::Arc;

pub use builder::{GetEi, GetWrt, In, SetAs, SetEi, SetWrt};
pub use wrt_core::{self, RigidTransform, WrtConfig, WrtError, WrtResult};

use wrt_core::{NamespaceRegistry, Router};

/// Handle to a set of namespaces
///
/// Cloning is cheap and clones share the same namespaces.
#[derive(Debug, Clone, Default)]
pub struct Database {
    router: Router,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WrtConfig) -> Self {
        Self {
            router: Router::new(config),
        }
    }

    /// Load a TOML or YAML config file and open a database with it
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> WrtResult<Self> {
        let config = WrtConfig::from_file(path)?;
        log::info!(
            "Opening WRT database ({:?} names, tolerance {:e})",
            config.name_policy,
            config.orthonormal_tolerance
        );
        Ok(Self::with_config(config))
    }

    /// Share namespaces with an existing registry
    pub fn with_registry(registry: Arc<NamespaceRegistry>) -> Self {
        Self {
            router: Router::with_registry(registry),
        }
    }

    pub fn in_ns<'a>(&'a self, namespace: &'a str) -> In<'a> {
        In::new(&self.router, namespace)
    }

    /// The router behind this handle, for wire-level requests
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.router.registry().namespaces()
    }
}

/// Everything needed for `db.in_ns(..).get(..).wrt(..).ei(..)`
pub mod prelude {
    pub use crate::{Database, In};
    pub use wrt_core::{Matrix4, RigidTransform, WrtConfig, WrtError, WrtResult};
}
