//! Request dispatch
//!
//! The [`Router`] is the single entry point for Set and Get. It resolves the
//! namespace, hands the fully-formed request to that namespace's graph, and
//! turns core errors into [`BoundaryError`]s. Requests for different
//! namespaces share nothing but the registry map.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::WrtConfig;
use crate::error::WrtResult;
use crate::messages::{Request, Response, WireTransform};
use crate::registry::NamespaceRegistry;
use crate::resolver::Resolver;
use crate::transform::RigidTransform;

#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<NamespaceRegistry>,
}

impl Router {
    pub fn new(config: WrtConfig) -> Self {
        Self::with_registry(Arc::new(NamespaceRegistry::new(config)))
    }

    pub fn with_registry(registry: Arc<NamespaceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<NamespaceRegistry> {
        &self.registry
    }

    /// Store `subject`'s pose in `basis`, written in `expressed_in`'s axes
    ///
    /// Returns the subject's new version.
    pub fn set(
        &self,
        namespace: &str,
        subject: &str,
        basis: &str,
        expressed_in: &str,
        transform: &RigidTransform,
    ) -> WrtResult<u64> {
        let graph = self.registry.get_or_create(namespace)?;
        let commit = graph.upsert_expressed(subject, basis, expressed_in, transform)?;
        Ok(commit.version)
    }

    /// Pose of `subject` in `basis`, written in `expressed_in`'s axes
    ///
    /// Never creates the namespace: an unknown one holds only `world`.
    pub fn get(
        &self,
        namespace: &str,
        subject: &str,
        basis: &str,
        expressed_in: &str,
    ) -> WrtResult<RigidTransform> {
        let snapshot = self.registry.snapshot(namespace)?;
        Resolver::new(&snapshot, self.registry.config()).resolve(subject, basis, expressed_in)
    }

    /// Execute a wire request
    pub fn handle(&self, request: Request) -> Response {
        let outcome = match &request {
            Request::Set {
                namespace,
                subject,
                basis,
                expressed_in,
                transform,
            } => transform
                .to_transform(self.registry.config().orthonormal_tolerance)
                .and_then(|tf| {
                    let ei = expressed_in.as_deref().unwrap_or(basis);
                    self.set(namespace, subject, basis, ei, &tf)
                })
                .map(|version| Response::Set { version }),
            Request::Get {
                namespace,
                subject,
                basis,
                expressed_in,
            } => {
                let ei = expressed_in.as_deref().unwrap_or(basis);
                self.get(namespace, subject, basis, ei)
                    .map(|tf| Response::Get {
                        transform: WireTransform::from(tf),
                    })
            }
        };

        match outcome {
            Ok(response) => response,
            Err(err) => {
                if err.is_request_error() {
                    log::warn!("[{}] rejected request: {}", request.namespace(), err);
                } else {
                    log::error!("[{}] request failed: {}", request.namespace(), err);
                }
                Response::Error(err.into())
            }
        }
    }

    /// Execute a request unless the caller has already given up
    ///
    /// The request always runs to completion once started; `cancelled` is
    /// checked before and after, and `None` means the response was dropped.
    /// A Set that committed stays committed.
    pub fn handle_cancellable(&self, request: Request, cancelled: &AtomicBool) -> Option<Response> {
        if cancelled.load(Ordering::Acquire) {
            log::debug!("[{}] request cancelled before start", request.namespace());
            return None;
        }
        let namespace = request.namespace().to_string();
        let response = self.handle(request);
        if cancelled.load(Ordering::Acquire) {
            log::debug!("[{}] response dropped after cancellation", namespace);
            return None;
        }
        Some(response)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(WrtConfig::default())
    }
}
