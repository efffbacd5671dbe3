use std::path::PathBuf;

use orb_brain::{OrbBrain, OrbConfig};
use orb_core::{IVec3, Vec3};

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("orb-brain-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn partial_yaml_overrides_only_what_it_names() {
    let path = scratch_file(
        "partial.yaml",
        r#"
brain:
  seed: 42
  behavior_tick_rate_ms: 250
  spawn_position: { x: 4.0, y: 10.0, z: -2.0 }
goals:
  follow_speed: 10.0
pathfinding:
  allow_diagonals: false
world:
  min: { x: -16, y: 0, z: -16 }
  max: { x: 16, y: 32, z: 16 }
"#,
    );

    let config = OrbConfig::load(&path).unwrap();
    let defaults = OrbConfig::default();

    assert_eq!(config.brain.seed, 42);
    assert_eq!(config.brain.behavior_tick_rate_ms, 250);
    assert_eq!(config.brain.spawn_position, Vec3::new(4.0, 10.0, -2.0));
    assert_eq!(config.brain.default_speed, defaults.brain.default_speed);
    assert_eq!(config.goals.follow_speed, 10.0);
    assert_eq!(config.goals.default_speed, defaults.goals.default_speed);
    assert!(!config.pathfinding.allow_diagonals);
    assert_eq!(config.pathfinding.max_iterations, defaults.pathfinding.max_iterations);
    assert_eq!(config.world.min, IVec3::new(-16, 0, -16));
    assert_eq!(config.perception, defaults.perception);
}

#[test]
fn brain_starts_where_the_config_says() {
    let mut config = OrbConfig::default();
    config.brain.spawn_position = Vec3::new(1.0, 2.0, 3.0);
    config.brain.default_speed = 7.5;
    config.brain.autonomy = false;

    let brain = OrbBrain::new(&config);

    assert_eq!(brain.position(), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(brain.state_ref().movement_speed, 7.5);
    assert_eq!(brain.engine().config().default_speed, 7.5);
    assert!(!brain.state_ref().autonomy);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let path = std::env::temp_dir().join("orb-brain-config-does-not-exist.yaml");
    let config = OrbConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config, OrbConfig::default());
    assert_eq!(OrbConfig::load_or_default(None).unwrap(), OrbConfig::default());
}

#[test]
fn malformed_yaml_names_the_file() {
    let path = scratch_file("broken.yaml", "brain: [not, a, map");
    let err = OrbConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.yaml"));
}

#[test]
fn defaults_round_trip_through_yaml() {
    let config = OrbConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let back: OrbConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, config);
}
