//! Relative pose resolution over a snapshot
//!
//! Given three frames of one namespace, computes the pose of a subject in a
//! basis with both components written in the axes of a third frame:
//!
//! ```text
//!   canonical(S, B) = X_B_L^-1 * X_S_L        L = lowest common ancestor
//!                   = d_1^-1 * .. * d_n^-1 * u_m * .. * u_1
//!   resolve(S, B, E) = (R_EB^T * R_SB, R_EB^T * t_SB)
//! ```
//!
//! where `u` are the edges climbed from `S` and `d` the edges descended to
//! `B` (see [`GraphSnapshot::path_between`]), and `R_EB` is the orientation
//! of `E` in `B`. When `E == B` no re-expression happens and the canonical
//! pose is returned unchanged.
//!
//! Only the edges between the two frames and their common ancestor are
//! visited, never the path from the ancestor up to `world`.

use crate::config::WrtConfig;
use crate::error::WrtResult;
use crate::graph::GraphSnapshot;
use crate::node::{Direction, FrameId};
use crate::transform::RigidTransform;

/// Read-only resolver bound to one snapshot
pub struct Resolver<'a> {
    snapshot: &'a GraphSnapshot,
    renormalize_interval: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a GraphSnapshot, config: &WrtConfig) -> Self {
        Self {
            snapshot,
            renormalize_interval: config.renormalize_interval.max(1),
        }
    }

    /// Pose of `subject` wrt `basis`, expressed in `expressed_in`
    ///
    /// Names are checked in argument order and the first missing one is
    /// reported as `UnknownFrame`.
    pub fn resolve(
        &self,
        subject: &str,
        basis: &str,
        expressed_in: &str,
    ) -> WrtResult<RigidTransform> {
        let s = self.snapshot.require(subject)?;
        let b = self.snapshot.require(basis)?;
        let e = self.snapshot.require(expressed_in)?;

        if s == b {
            return Ok(RigidTransform::identity());
        }

        let pose = self.canonical(s, b);
        let result = if e == b {
            pose
        } else {
            let axes = self.canonical(e, b);
            pose.rotated_by_inverse(&axes.rotation)
        };

        log::trace!(
            "resolved '{}' wrt '{}' ei '{}': t = {:?}",
            subject,
            basis,
            expressed_in,
            result.translation
        );
        Ok(result)
    }

    /// Pose of frame `s` in frame `b`, in `b`'s own axes
    ///
    /// Folds the path from `s` to `b`: stored edges as-is on the way up to
    /// the common ancestor, inverted on the way down.
    pub fn canonical(&self, s: FrameId, b: FrameId) -> RigidTransform {
        let mut acc = RigidTransform::identity();
        let edges = self.snapshot.edges_between(s, b);
        for (steps, (id, direction)) in edges.into_iter().enumerate() {
            let edge = &self.snapshot.node(id).transform;
            acc = match direction {
                Direction::Up => edge.compose(&acc),
                Direction::Down => edge.inverse().compose(&acc),
            };
            if (steps + 1) % self.renormalize_interval == 0 {
                acc.orthonormalize();
            }
        }
        acc
    }
}
