//! # WRT Benchmark Suite
//!
//! Shared scene builders for the criterion benchmarks in `benches/`.
//!
//! - **resolve_depth**: Get latency against the distance between subject and
//!   basis, and against namespace size at a fixed distance
//! - **concurrent_get**: Get latency while other threads read or write the
//!   same namespace
//!
//! ```bash
//! cargo bench -p wrt_benchmarks --bench resolve_depth
//! cargo bench -p wrt_benchmarks --bench concurrent_get -- "with_writer"
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wrt_core::{RigidTransform, Router};

/// Chain depths measured by the depth benchmarks
pub const DEPTHS: &[usize] = &[1, 4, 16, 64, 256];

/// Namespace sizes measured at a fixed query distance
pub const NAMESPACE_SIZES: &[usize] = &[16, 256, 4096];

pub fn random_pose(rng: &mut StdRng) -> RigidTransform {
    let t = [
        rng.gen_range(-10.0..10.0),
        rng.gen_range(-10.0..10.0),
        rng.gen_range(-10.0..10.0),
    ];
    let rpy = [
        rng.gen_range(-3.1..3.1),
        rng.gen_range(-1.5..1.5),
        rng.gen_range(-3.1..3.1),
    ];
    RigidTransform::from_euler(t, rpy)
}

/// Link names used by [`build_chain`]
pub fn link(i: usize) -> String {
    format!("link-{}", i)
}

/// `world -> link-0 -> ... -> link-{depth-1}` with random poses
///
/// Returns the name of the deepest link.
pub fn build_chain(router: &Router, namespace: &str, depth: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut parent = "world".to_string();
    for i in 0..depth {
        let name = link(i);
        router
            .set(namespace, &name, &parent, &parent, &random_pose(&mut rng))
            .unwrap_or_else(|e| panic!("failed to build chain at {}: {}", name, e));
        parent = name;
    }
    parent
}

/// Adds `extra` frames hanging off `world` that no benchmark query touches
pub fn add_bystanders(router: &Router, namespace: &str, extra: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for i in 0..extra {
        let name = format!("bystander-{}", i);
        router
            .set(namespace, &name, "world", "world", &random_pose(&mut rng))
            .unwrap_or_else(|e| panic!("failed to add {}: {}", name, e));
    }
}
