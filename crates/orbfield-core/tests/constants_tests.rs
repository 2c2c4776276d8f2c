// Host-side tests for tuning constants and the relationships between them.

use orbfield_core::*;
use std::f32::consts::PI;

#[test]
#[allow(clippy::assertions_on_constants)]
fn speckle_alpha_ranges_nest() {
    assert!(SPECKLE_ALPHA_MIN <= SPECKLE_ALPHA_INIT.0);
    assert!(SPECKLE_ALPHA_INIT.0 < SPECKLE_ALPHA_INIT.1);
    assert!(SPECKLE_ALPHA_INIT.1 <= SPECKLE_ALPHA_MAX);
    assert!(SPECKLE_ALPHA_JITTER > 0.0);
    assert!(SPECKLE_MAX_SPEED < SPECKLE_BOUND);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn orb_lifecycle_constants_are_consistent() {
    // Spawned orbs must outgrow the eviction floor.
    assert!(ORB_MIN_SIZE < ORB_TARGET_SIZE);
    assert!(ORB_GROW_LERP > 0.0 && ORB_GROW_LERP < 1.0);
    assert!(ORB_SHRINK_FACTOR > 0.0 && ORB_SHRINK_FACTOR < 1.0);
    assert!(ORB_SNAP_EPSILON < ORB_TARGET_SIZE - ORB_MIN_SIZE);
    assert!(ORB_SPAWN_MIN < ORB_SPAWN_MAX_EXCLUSIVE);
    assert!(ORB_SPAWN_INTERVAL > 0);
    assert!(ORB_POPULATION_SOFT_CAP > 0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn camera_limits_leave_room_to_orbit() {
    assert!(CAMERA_PHI_MARGIN > 0.0 && CAMERA_PHI_MARGIN < PI / 2.0);
    assert!(CAMERA_PHI_INIT > CAMERA_PHI_MARGIN && CAMERA_PHI_INIT < PI - CAMERA_PHI_MARGIN);
    assert!(CAMERA_RADIUS_INIT >= CAMERA_RADIUS_MIN);
    assert!(DRIFT_FRICTION > 0.0 && DRIFT_FRICTION < 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn flash_constants() {
    assert!(FLASH_CHANCE > 0.0 && FLASH_CHANCE < 1.0);
    assert!(FLASH_DURATION > 0);
    assert!(FLASH_SCALE > 0.0 && FLASH_SCALE <= 1.0);
}

#[test]
fn colours_are_byte_scaled() {
    for c in NEON_GREEN.iter().chain(BACKGROUND.iter()) {
        assert!((0.0..=255.0).contains(c));
    }
    assert!((0.0..=255.0).contains(&AMBIENT_LIGHT));
}
