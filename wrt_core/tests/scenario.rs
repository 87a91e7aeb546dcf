//! End-to-end scenarios through the router

mod common;

use std::sync::atomic::AtomicBool;

use common::{assert_close, init_logging, reference_scene};
use wrt_core::{
    ErrorKind, RigidTransform, Request, Response, Router, WireTransform, WrtConfig, WrtError,
};

#[test]
fn test_reference_scene() {
    // Given: the four-frame reference scene
    // When: each frame is queried against the others
    // Then: the results match the hand-computed poses
    init_logging();
    let router = Router::default();
    reference_scene(&router, "test");

    let a_in_b = router.get("test", "a", "b", "b").unwrap();
    assert_close(
        &a_in_b,
        &RigidTransform::new(
            [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]],
            [0.0, 0.0, 0.0],
        ),
        1e-12,
    );

    let a_in_b_axes_a = router.get("test", "a", "b", "a").unwrap();
    assert_close(&a_in_b_axes_a, &RigidTransform::identity(), 1e-12);

    let c_in_world = RigidTransform::new(
        [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]],
        [2.0, 1.0, 1.0],
    );
    assert_close(&router.get("test", "c", "world", "world").unwrap(), &c_in_world, 1e-12);
    assert_close(&router.get("test", "c", "world", "a").unwrap(), &c_in_world, 1e-12);

    let c_in_world_axes_c = router.get("test", "c", "world", "c").unwrap();
    assert_close(
        &c_in_world_axes_c,
        &RigidTransform::from_translation([2.0, 1.0, -1.0]),
        1e-12,
    );

    let d_in_a = router.get("test", "d", "a", "a").unwrap();
    assert_close(
        &d_in_a,
        &RigidTransform::new(
            [[0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]],
            [1.0, 0.0, 1.0],
        ),
        1e-12,
    );
}

#[test]
fn test_reference_scene_over_the_wire() {
    init_logging();
    let router = Router::default();
    reference_scene(&router, "wire");

    let json = r#"{"op":"get","namespace":"wire","subject":"c","basis":"world"}"#;
    let request = Request::from_json(json).unwrap();
    let response = router.handle(request);

    let Response::Get { transform } = &response else {
        panic!("expected a pose, got {:?}", response);
    };
    let m = transform.matrix();
    assert!((m[0][3] - 2.0).abs() < 1e-12);
    assert!((m[1][3] - 1.0).abs() < 1e-12);
    assert!((m[2][3] - 1.0).abs() < 1e-12);
    assert_eq!(m[3], [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_set_expressed_in_round_trips() {
    // Given: a pose written in c's axes but relative to world
    // When: it is read back with the same triple
    // Then: the same numbers come back
    let router = Router::default();
    reference_scene(&router, "ei");

    let pose = RigidTransform::from_euler([0.3, -1.2, 2.0], [0.2, 0.4, -0.9]);
    router.set("ei", "tool", "world", "c", &pose).unwrap();

    let back = router.get("ei", "tool", "world", "c").unwrap();
    assert_close(&back, &pose, 1e-9);

    // The stored edge is the canonical pose in world
    let canonical = router.get("ei", "tool", "world", "world").unwrap();
    let c_axes = router.get("ei", "c", "world", "world").unwrap();
    assert_close(&canonical, &pose.rotated_by(&c_axes.rotation), 1e-9);
}

#[test]
fn test_rejected_writes_leave_namespace_unchanged() {
    let router = Router::default();
    reference_scene(&router, "guard");
    let graph = router.registry().get("guard").unwrap();
    let before = graph.export();

    let mut sheared = RigidTransform::identity();
    sheared.rotation[0][1] = 0.2;
    let attempts = [
        router.set("guard", "e", "missing", "missing", &RigidTransform::identity()),
        router.set("guard", "e", "world", "missing", &RigidTransform::identity()),
        router.set("guard", "a", "c", "c", &RigidTransform::identity()),
        router.set("guard", "a", "a", "a", &RigidTransform::identity()),
        router.set("guard", "world", "a", "a", &RigidTransform::identity()),
        router.set("guard", "e", "world", "world", &sheared),
    ];
    for attempt in &attempts {
        assert!(attempt.is_err(), "write should have been rejected");
    }
    assert!(matches!(attempts[0], Err(WrtError::UnknownBasisFrame(_))));
    assert!(matches!(attempts[1], Err(WrtError::UnknownFrame(_))));
    assert!(matches!(attempts[2], Err(WrtError::CyclicReference { .. })));
    assert!(matches!(attempts[3], Err(WrtError::CyclicReference { .. })));
    assert!(matches!(attempts[4], Err(WrtError::ReservedFrame(_))));
    assert!(matches!(attempts[5], Err(WrtError::InvalidTransform(_))));

    assert_eq!(graph.export(), before);
    graph.validate().unwrap();
}

#[test]
fn test_unknown_names_never_resolve() {
    let router = Router::default();
    reference_scene(&router, "names");

    for (s, b, e) in [("x", "a", "a"), ("a", "x", "a"), ("a", "b", "x")] {
        assert_eq!(
            router.get("names", s, b, e).unwrap_err(),
            WrtError::UnknownFrame("x".into())
        );
    }

    // Names are case-sensitive
    assert!(router.get("names", "A", "world", "world").is_err());
    // Frames from another namespace are invisible
    assert!(router.get("other", "a", "world", "world").is_err());
}

#[test]
fn test_strict_router_rejects_bad_names() {
    let router = Router::new(WrtConfig::strict());
    let resp = router.handle(Request::set(
        "Cell",
        "a",
        "world",
        WireTransform::identity(),
    ));
    assert_eq!(resp.error().unwrap().kind, ErrorKind::InvalidName);

    let resp = router.handle(Request::set(
        "cell",
        "base_link",
        "world",
        WireTransform::identity(),
    ));
    assert_eq!(resp.error().unwrap().kind, ErrorKind::InvalidName);
    assert!(router.registry().get("cell").unwrap().lookup("base_link").is_err());
}

#[test]
fn test_cancelled_set_still_commits() {
    // A request that was already running commits even when its response is dropped
    let router = Router::default();
    let cancelled = AtomicBool::new(false);
    let request = Request::set("cancel", "a", "world", RigidTransform::identity());

    let response = router.handle_cancellable(request, &cancelled);
    assert_eq!(response, Some(Response::Set { version: 1 }));

    cancelled.store(true, std::sync::atomic::Ordering::Release);
    let request = Request::set("cancel", "a", "world", RigidTransform::identity());
    assert!(router.handle_cancellable(request, &cancelled).is_none());
    assert_eq!(router.registry().get("cancel").unwrap().lookup("a").unwrap().version, 1);
}
