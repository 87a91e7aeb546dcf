//! Request builders behind [`Database::in_ns`](crate::Database::in_ns)
//!
//! Each step fixes one field and returns the next step, so a request can
//! only be sent once subject, basis and expressed-in frame are all named.

use wrt_core::{GraphExport, Matrix4, RigidTransform, Router, WrtResult};

/// A namespace selected with `in_ns`
#[derive(Debug, Clone, Copy)]
pub struct In<'a> {
    router: &'a Router,
    namespace: &'a str,
}

impl<'a> In<'a> {
    pub(crate) fn new(router: &'a Router, namespace: &'a str) -> Self {
        Self { router, namespace }
    }

    pub fn set(self, subject: &'a str) -> SetWrt<'a> {
        SetWrt {
            ns: self,
            subject,
        }
    }

    pub fn get(self, subject: &'a str) -> GetWrt<'a> {
        GetWrt {
            ns: self,
            subject,
        }
    }

    /// Frame names of this namespace in creation order, `world` first
    pub fn frames(self) -> WrtResult<Vec<String>> {
        let snapshot = self.router.registry().snapshot(self.namespace)?;
        Ok(snapshot.frames())
    }

    /// Every frame with its parent, pose and version
    pub fn export(self) -> WrtResult<GraphExport> {
        let snapshot = self.router.registry().snapshot(self.namespace)?;
        Ok(snapshot.export(self.namespace))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SetWrt<'a> {
    ns: In<'a>,
    subject: &'a str,
}

impl<'a> SetWrt<'a> {
    pub fn wrt(self, basis: &'a str) -> SetEi<'a> {
        SetEi { set: self, basis }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SetEi<'a> {
    set: SetWrt<'a>,
    basis: &'a str,
}

impl<'a> SetEi<'a> {
    pub fn ei(self, expressed_in: &'a str) -> SetAs<'a> {
        SetAs {
            ei: self,
            expressed_in,
        }
    }
}

/// Fully addressed Set, waiting for its pose
#[derive(Debug, Clone, Copy)]
pub struct SetAs<'a> {
    ei: SetEi<'a>,
    expressed_in: &'a str,
}

impl SetAs<'_> {
    /// Store a 4x4 row-major homogeneous matrix; returns the frame's version
    pub fn as_matrix(self, matrix: &Matrix4) -> WrtResult<u64> {
        let router = self.ei.set.ns.router;
        let tf = RigidTransform::from_matrix(matrix, router.registry().config().orthonormal_tolerance)?;
        self.as_transform(&tf)
    }

    pub fn as_transform(self, transform: &RigidTransform) -> WrtResult<u64> {
        let SetEi { set, basis } = self.ei;
        set.ns
            .router
            .set(set.ns.namespace, set.subject, basis, self.expressed_in, transform)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetWrt<'a> {
    ns: In<'a>,
    subject: &'a str,
}

impl<'a> GetWrt<'a> {
    pub fn wrt(self, basis: &'a str) -> GetEi<'a> {
        GetEi { get: self, basis }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetEi<'a> {
    get: GetWrt<'a>,
    basis: &'a str,
}

impl GetEi<'_> {
    /// Resolve the pose, written in `expressed_in`'s axes
    pub fn ei(self, expressed_in: &str) -> WrtResult<RigidTransform> {
        let GetWrt { ns, subject } = self.get;
        ns.router.get(ns.namespace, subject, self.basis, expressed_in)
    }
}
