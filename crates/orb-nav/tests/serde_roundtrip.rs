#![cfg(feature = "serde")]

use orb_core::{IVec3, Vec3};
use orb_nav::{GridBounds, OccupancyGrid, PathFollower, PathOptions, Pathfinder};

#[test]
fn config_values_roundtrip_via_serde() {
    let bounds = GridBounds::new(IVec3::new(-8, 0, -8), IVec3::new(8, 8, 8));
    let options = PathOptions {
        allow_diagonals: false,
        ..PathOptions::default()
    };

    let json = serde_json::to_string(&(bounds, options)).expect("serialize");
    let (bounds2, options2): (GridBounds, PathOptions) =
        serde_json::from_str(&json).expect("deserialize");

    assert_eq!(bounds2, bounds);
    assert_eq!(options2, options);
}

#[test]
fn missing_path_options_take_defaults() {
    let options: PathOptions =
        serde_json::from_str(r#"{"max_iterations": 50}"#).expect("deserialize");
    assert_eq!(options.max_iterations, 50);
    assert!(options.allow_diagonals);
    assert!(options.smooth_path);
}

#[test]
fn follower_resumes_after_roundtrip() {
    let grid = OccupancyGrid::new(GridBounds::new(IVec3::new(-8, 0, -8), IVec3::new(8, 8, 8)));
    let start = Vec3::new(0.5, 2.5, 0.5);
    let path = Pathfinder::new(&grid).find_path(
        start,
        Vec3::new(5.5, 2.5, 0.5),
        &PathOptions::default(),
    );
    assert!(!path.is_empty());

    let mut follower = PathFollower::new(4.0);
    follower.set_path(path, 4.0);
    let step = follower.advance(start, 0.25);

    let json = serde_json::to_string(&follower).expect("serialize follower");
    let mut back: PathFollower = serde_json::from_str(&json).expect("deserialize follower");
    assert_eq!(back, follower);

    let a = follower.advance(step.position, 0.25);
    let b = back.advance(step.position, 0.25);
    assert_eq!(a, b);
}
