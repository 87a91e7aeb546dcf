//! Per-namespace frame tree with copy-on-write snapshots
//!
//! A [`FrameGraph`] publishes immutable [`GraphSnapshot`]s. Readers clone the
//! current `Arc<GraphSnapshot>` once and resolve against it without further
//! locking, so a `Get` never waits on another `Get` and never observes a
//! half-applied `Set`. Writers are serialized by a per-graph mutex, build the
//! next snapshot from the current one, and publish it with a single pointer
//! swap.
//!
//! ```text
//!   writer ── lock(writer) ── validate ── clone arena ── mutate ── swap ──┐
//!                                                                        v
//!   current: RwLock<Arc<GraphSnapshot>>  (held only to clone/replace the Arc)
//!                                                                        ^
//!   reader ────────────────────── snapshot() ── resolve on Arc ──────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::config::WrtConfig;
use crate::error::{NameKind, WrtError, WrtResult};
use crate::node::{
    timestamp_now, Direction, FrameId, FrameNode, NodeView, PathStep, ROOT_FRAME, ROOT_ID,
};
use crate::resolver::Resolver;
use crate::transform::RigidTransform;

/// Immutable view of one namespace's tree at a given generation
///
/// Nodes live in an arena indexed by [`FrameId`]. Cloning a snapshot to
/// derive the next one copies `Arc` pointers, not nodes.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    nodes: Vec<Arc<FrameNode>>,
    names: Arc<HashMap<String, FrameId>>,
    generation: u64,
}

impl GraphSnapshot {
    /// A tree containing only `world`
    pub fn seeded() -> Self {
        let mut names = HashMap::new();
        names.insert(ROOT_FRAME.to_string(), ROOT_ID);
        Self {
            nodes: vec![Arc::new(FrameNode::root(timestamp_now()))],
            names: Arc::new(names),
            generation: 0,
        }
    }

    /// Number of commits that produced this snapshot
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of frames, `world` included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: `world` is always present
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn id(&self, name: &str) -> Option<FrameId> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Frame id or `UnknownFrame`
    #[inline]
    pub fn require(&self, name: &str) -> WrtResult<FrameId> {
        self.id(name)
            .ok_or_else(|| WrtError::UnknownFrame(name.to_string()))
    }

    /// Node by id; ids come from this snapshot so they are always in range
    #[inline]
    pub fn node(&self, id: FrameId) -> &FrameNode {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn parent_of(&self, id: FrameId) -> Option<FrameId> {
        self.node(id).parent
    }

    /// Read-only copy of a frame
    pub fn lookup(&self, name: &str) -> WrtResult<NodeView> {
        let id = self.require(name)?;
        Ok(self.view(id))
    }

    fn view(&self, id: FrameId) -> NodeView {
        let node = self.node(id);
        NodeView {
            name: node.name.clone(),
            parent: node.parent.map(|p| self.node(p).name.clone()),
            transform: node.transform,
            version: node.version,
            depth: node.depth,
            created_ns: node.created_ns,
            updated_ns: node.updated_ns,
        }
    }

    /// Edges from `name` up to `world`, closest edge first
    ///
    /// Every step is [`Direction::Up`]; `world` itself contributes no edge,
    /// so the path of `world` is empty.
    pub fn path_to_root(&self, name: &str) -> WrtResult<Vec<PathStep>> {
        let mut current = self.require(name)?;
        let mut path = Vec::with_capacity(self.node(current).depth as usize);

        while let Some(parent) = self.parent_of(current) {
            let node = self.node(current);
            path.push(PathStep {
                frame: node.name.clone(),
                transform: node.transform,
                direction: Direction::Up,
            });
            current = parent;
        }

        Ok(path)
    }

    /// Edges from `from` up to the common ancestor, then down to `to`
    ///
    /// Composing the path in order (stored transforms as-is on
    /// [`Direction::Up`] steps, inverted on [`Direction::Down`] steps) gives
    /// the pose of `from` in `to`.
    pub fn path_between(&self, from: &str, to: &str) -> WrtResult<Vec<PathStep>> {
        let from = self.require(from)?;
        let to = self.require(to)?;
        Ok(self
            .edges_between(from, to)
            .into_iter()
            .map(|(id, direction)| {
                let node = self.node(id);
                PathStep {
                    frame: node.name.clone(),
                    transform: node.transform,
                    direction,
                }
            })
            .collect())
    }

    /// Id form of [`path_between`](GraphSnapshot::path_between)
    ///
    /// Each entry names the child end of an edge. Visits only the edges
    /// between the two frames, never the part above their common ancestor.
    pub fn edges_between(&self, from: FrameId, to: FrameId) -> Vec<(FrameId, Direction)> {
        let lca = self.common_ancestor(from, to);
        let mut edges = Vec::new();

        let mut current = from;
        while current != lca {
            edges.push((current, Direction::Up));
            current = self.parent_of(current).unwrap_or(ROOT_ID);
        }

        let descent = edges.len();
        let mut current = to;
        while current != lca {
            edges.push((current, Direction::Down));
            current = self.parent_of(current).unwrap_or(ROOT_ID);
        }
        edges[descent..].reverse();
        edges
    }

    /// Names from `world` down to `name`, both included
    pub fn ancestry(&self, name: &str) -> WrtResult<Vec<String>> {
        let mut current = self.require(name)?;
        let mut chain = vec![self.node(current).name.clone()];
        while let Some(parent) = self.parent_of(current) {
            chain.push(self.node(parent).name.clone());
            current = parent;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Deepest frame that is an ancestor of (or equal to) both `a` and `b`
    pub fn lowest_common_ancestor(&self, a: &str, b: &str) -> WrtResult<String> {
        let a = self.require(a)?;
        let b = self.require(b)?;
        Ok(self.node(self.common_ancestor(a, b)).name.clone())
    }

    /// Climbs the deeper frame to the other's depth, then both together
    ///
    /// Cost is the number of edges between `a` and `b`, independent of how
    /// deep their common ancestor sits.
    pub fn common_ancestor(&self, mut a: FrameId, mut b: FrameId) -> FrameId {
        while self.node(a).depth > self.node(b).depth {
            a = self.parent_of(a).unwrap_or(ROOT_ID);
        }
        while self.node(b).depth > self.node(a).depth {
            b = self.parent_of(b).unwrap_or(ROOT_ID);
        }
        while a != b {
            a = self.parent_of(a).unwrap_or(ROOT_ID);
            b = self.parent_of(b).unwrap_or(ROOT_ID);
        }
        a
    }

    /// True if `ancestor` lies on the path from `id` to `world` (or is `id`)
    pub fn is_ancestor_or_self(&self, ancestor: FrameId, id: FrameId) -> bool {
        let target_depth = self.node(ancestor).depth;
        let mut current = id;
        while self.node(current).depth > target_depth {
            current = self.parent_of(current).unwrap_or(ROOT_ID);
        }
        current == ancestor
    }

    /// All frame names, in creation order
    pub fn frames(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.name.clone()).collect()
    }

    /// Direct children of a frame
    pub fn children(&self, name: &str) -> WrtResult<Vec<String>> {
        let id = self.require(name)?;
        Ok(self
            .node(id)
            .children
            .iter()
            .map(|&c| self.node(c).name.clone())
            .collect())
    }

    /// Re-check every structural invariant of the tree
    pub fn validate(&self, tolerance: f64) -> WrtResult<()> {
        let broken = |msg: String| -> WrtResult<()> { Err(WrtError::Inconsistent(msg)) };

        if self.names.len() != self.nodes.len() {
            return broken(format!(
                "{} names for {} nodes",
                self.names.len(),
                self.nodes.len()
            ));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            let id = idx as FrameId;
            if self.id(&node.name) != Some(id) {
                return broken(format!("name index does not point at '{}'", node.name));
            }

            match node.parent {
                None if id != ROOT_ID => {
                    return broken(format!("'{}' has no parent", node.name));
                }
                None => {}
                Some(parent) => {
                    if parent as usize >= self.nodes.len() {
                        return broken(format!("'{}' points at a missing parent", node.name));
                    }
                    let p = self.node(parent);
                    if p.depth + 1 != node.depth {
                        return broken(format!("depth of '{}' is stale", node.name));
                    }
                    if !p.children.contains(&id) {
                        return broken(format!(
                            "'{}' is missing from the children of '{}'",
                            node.name, p.name
                        ));
                    }
                }
            }

            for &child in &node.children {
                if self.nodes.get(child as usize).and_then(|c| c.parent) != Some(id) {
                    return broken(format!("stale child entry under '{}'", node.name));
                }
            }

            if let Err(defect) = node.transform.validate(tolerance) {
                return broken(format!("'{}' stores an invalid transform: {}", node.name, defect));
            }
        }

        // Depth strictly decreases towards the root, so every walk ends at world.
        Ok(())
    }

    /// Serializable dump of every frame
    pub fn export(&self, namespace: &str) -> GraphExport {
        GraphExport {
            namespace: namespace.to_string(),
            generation: self.generation,
            frames: (0..self.nodes.len() as FrameId).map(|id| self.view(id)).collect(),
        }
    }
}

/// Diagnostic dump of a namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub namespace: String,
    pub generation: u64,
    pub frames: Vec<NodeView>,
}

impl GraphExport {
    pub fn to_json(&self) -> WrtResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Outcome of a committed write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    pub version: u64,
    pub generation: u64,
    pub created: bool,
    pub reparented: bool,
}

/// One namespace's frame tree
///
/// Independently lockable: operations on different graphs never contend.
pub struct FrameGraph {
    namespace: String,
    current: RwLock<Arc<GraphSnapshot>>,
    writer: Mutex<()>,
    config: Arc<WrtConfig>,
}

impl FrameGraph {
    /// A graph seeded with `world`
    pub fn new(namespace: impl Into<String>, config: Arc<WrtConfig>) -> Self {
        Self {
            namespace: namespace.into(),
            current: RwLock::new(Arc::new(GraphSnapshot::seeded())),
            writer: Mutex::new(()),
            config,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn config(&self) -> &WrtConfig {
        &self.config
    }

    /// The state as of the last completed commit
    #[inline]
    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        self.current.read().clone()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn lookup(&self, name: &str) -> WrtResult<NodeView> {
        self.snapshot().lookup(name)
    }

    pub fn path_to_root(&self, name: &str) -> WrtResult<Vec<PathStep>> {
        self.snapshot().path_to_root(name)
    }

    pub fn path_between(&self, from: &str, to: &str) -> WrtResult<Vec<PathStep>> {
        self.snapshot().path_between(from, to)
    }

    pub fn lowest_common_ancestor(&self, a: &str, b: &str) -> WrtResult<String> {
        self.snapshot().lowest_common_ancestor(a, b)
    }

    pub fn validate(&self) -> WrtResult<()> {
        self.snapshot().validate(self.config.orthonormal_tolerance)
    }

    pub fn export(&self) -> GraphExport {
        self.snapshot().export(&self.namespace)
    }

    /// Pose of `subject` in `basis`, written in `expressed_in`'s axes
    pub fn resolve(
        &self,
        subject: &str,
        basis: &str,
        expressed_in: &str,
    ) -> WrtResult<RigidTransform> {
        let snapshot = self.snapshot();
        Resolver::new(&snapshot, &self.config).resolve(subject, basis, expressed_in)
    }

    /// Insert or update `name` with its pose in `basis`
    ///
    /// Returns the node's new version.
    pub fn upsert(&self, name: &str, basis: &str, transform: &RigidTransform) -> WrtResult<u64> {
        self.upsert_expressed(name, basis, basis, transform)
            .map(|commit| commit.version)
    }

    /// Insert or update `name` with a pose in `basis` written in
    /// `expressed_in`'s axes
    ///
    /// Validation happens before anything is published: on `Err` the graph
    /// is unchanged. An existing frame cannot be written in the axes of itself
    /// or one of its descendants (`CyclicReference`), since those axes move
    /// with the write.
    ///
    /// Cost: the next snapshot copies the arena's `Arc` pointers, O(frames).
    /// Creating a frame also copies the name index; updates share it.
    pub fn upsert_expressed(
        &self,
        name: &str,
        basis: &str,
        expressed_in: &str,
        transform: &RigidTransform,
    ) -> WrtResult<Commit> {
        let policy = self.config.name_policy;
        policy.check(NameKind::Frame, name)?;
        policy.check(NameKind::Frame, basis)?;
        policy.check(NameKind::Frame, expressed_in)?;

        if name == ROOT_FRAME {
            return Err(WrtError::ReservedFrame(name.to_string()));
        }
        if name == basis {
            return Err(WrtError::CyclicReference {
                frame: name.to_string(),
                basis: basis.to_string(),
            });
        }
        transform.validate(self.config.orthonormal_tolerance)?;

        let _guard = self.writer.lock();
        let base = self.snapshot();

        let basis_id = base
            .id(basis)
            .ok_or_else(|| WrtError::UnknownBasisFrame(basis.to_string()))?;
        let existing = base.id(name);

        if let Some(id) = existing {
            if base.is_ancestor_or_self(id, basis_id) {
                return Err(WrtError::CyclicReference {
                    frame: name.to_string(),
                    basis: basis.to_string(),
                });
            }
        }

        let mut stored = if expressed_in == basis {
            *transform
        } else {
            let expressed_id = base.require(expressed_in)?;
            if let Some(id) = existing {
                // Axes that move with the frame being written cannot describe it
                if base.is_ancestor_or_self(id, expressed_id) {
                    return Err(WrtError::CyclicReference {
                        frame: name.to_string(),
                        basis: expressed_in.to_string(),
                    });
                }
            }
            let axes = Resolver::new(&base, &self.config).canonical(expressed_id, basis_id);
            transform.rotated_by(&axes.rotation)
        };
        stored.orthonormalize();
        stored.snap(self.config.snap_epsilon);

        let (next, commit) = apply_upsert(&base, name, basis_id, existing, stored);
        *self.current.write() = Arc::new(next);

        log::debug!(
            "[{}] {} '{}' wrt '{}' (version {}, generation {})",
            self.namespace,
            if commit.created { "created" } else if commit.reparented { "reparented" } else { "updated" },
            name,
            basis,
            commit.version,
            commit.generation
        );

        Ok(commit)
    }
}

impl std::fmt::Debug for FrameGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("FrameGraph")
            .field("namespace", &self.namespace)
            .field("frames", &snapshot.len())
            .field("generation", &snapshot.generation())
            .finish()
    }
}

/// Derive the next snapshot with `name` stored under `basis_id`
fn apply_upsert(
    base: &GraphSnapshot,
    name: &str,
    basis_id: FrameId,
    existing: Option<FrameId>,
    transform: RigidTransform,
) -> (GraphSnapshot, Commit) {
    let now = timestamp_now();
    let mut next = base.clone();
    next.generation += 1;

    let commit = match existing {
        None => {
            let id = next.nodes.len() as FrameId;
            let node = FrameNode {
                name: name.to_string(),
                parent: Some(basis_id),
                transform,
                version: 1,
                depth: next.node(basis_id).depth + 1,
                children: Vec::new(),
                created_ns: now,
                updated_ns: now,
            };
            next.nodes.push(Arc::new(node));
            Arc::make_mut(&mut next.nodes[basis_id as usize]).children.push(id);
            Arc::make_mut(&mut next.names).insert(name.to_string(), id);

            Commit {
                version: 1,
                generation: next.generation,
                created: true,
                reparented: false,
            }
        }
        Some(id) => {
            let old_parent = next.node(id).parent;
            let reparented = old_parent != Some(basis_id);

            if reparented {
                if let Some(old) = old_parent {
                    Arc::make_mut(&mut next.nodes[old as usize])
                        .children
                        .retain(|&c| c != id);
                }
                Arc::make_mut(&mut next.nodes[basis_id as usize]).children.push(id);
            }

            let depth = next.node(basis_id).depth + 1;
            let node = Arc::make_mut(&mut next.nodes[id as usize]);
            node.parent = Some(basis_id);
            node.transform = transform;
            node.version += 1;
            node.updated_ns = now;
            node.depth = depth;
            let version = node.version;

            if reparented {
                refresh_depths(&mut next.nodes, id);
            }

            Commit {
                version,
                generation: next.generation,
                created: false,
                reparented,
            }
        }
    };

    (next, commit)
}

/// Recompute depths below `top` after it moved
fn refresh_depths(nodes: &mut [Arc<FrameNode>], top: FrameId) {
    let mut stack = vec![top];
    while let Some(id) = stack.pop() {
        let depth = nodes[id as usize].depth + 1;
        let children = nodes[id as usize].children.clone();
        for child in children {
            let node = Arc::make_mut(&mut nodes[child as usize]);
            node.depth = depth;
            stack.push(child);
        }
    }
}
