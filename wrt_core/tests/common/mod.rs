//! Shared helpers for wrt_core integration tests

#![allow(dead_code)]

use std::f64::consts::FRAC_PI_2;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wrt_core::{RigidTransform, Router};

/// Install a test logger once per process
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Populate `namespace` with the four-frame reference scene:
///
/// ```text
/// world ── a (1,1,1) ── b Rx(90) ─┬─ c (1,0,0)
///                                 └─ d Rz(90) + (1,1,0)
/// ```
pub fn reference_scene(router: &Router, namespace: &str) {
    let x = [1.0, 0.0, 0.0];
    let z = [0.0, 0.0, 1.0];
    let frames = [
        ("a", "world", RigidTransform::from_translation([1.0, 1.0, 1.0])),
        ("b", "a", RigidTransform::from_axis_angle([0.0; 3], x, FRAC_PI_2)),
        ("c", "b", RigidTransform::from_translation([1.0, 0.0, 0.0])),
        ("d", "b", RigidTransform::from_axis_angle([1.0, 1.0, 0.0], z, FRAC_PI_2)),
    ];
    for (name, basis, tf) in frames {
        router
            .set(namespace, name, basis, basis, &tf)
            .expect("reference scene frame rejected");
    }
}

pub fn random_pose(rng: &mut StdRng) -> RigidTransform {
    let t = [
        rng.gen_range(-5.0..5.0),
        rng.gen_range(-5.0..5.0),
        rng.gen_range(-5.0..5.0),
    ];
    let rpy = [
        rng.gen_range(-3.1..3.1),
        rng.gen_range(-1.5..1.5),
        rng.gen_range(-3.1..3.1),
    ];
    RigidTransform::from_euler(t, rpy)
}

/// Build a random tree of `count` frames named `f0..f{count-1}`
///
/// Each frame picks a random earlier frame (or `world`) as its basis.
/// Returns every frame name, `world` first.
pub fn random_tree(router: &Router, namespace: &str, count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut names = vec!["world".to_string()];
    for i in 0..count {
        let name = format!("f{}", i);
        let basis = names[rng.gen_range(0..names.len())].clone();
        let pose = random_pose(&mut rng);
        router
            .set(namespace, &name, &basis, &basis, &pose)
            .expect("random tree frame rejected");
        names.push(name);
    }
    names
}

/// Assert two transforms agree component-wise
pub fn assert_close(actual: &RigidTransform, expected: &RigidTransform, eps: f64) {
    assert!(
        actual.approx_eq(expected, eps),
        "transforms differ by more than {}:\n  actual:   {:?}\n  expected: {:?}",
        eps,
        actual,
        expected
    );
}

pub fn assert_vec_close(actual: [f64; 3], expected: [f64; 3], eps: f64) {
    for i in 0..3 {
        approx::assert_abs_diff_eq!(actual[i], expected[i], epsilon = eps);
    }
}
