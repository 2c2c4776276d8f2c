use std::f32::consts::PI;

// Shared tuning constants for the scene and its front-ends.
// Distances are in world units, alphas on a 0..=255 scale, rates per frame.

// Background speckles
pub const SPECKLE_COUNT: usize = 600;
pub const SPECKLE_BOUND: f32 = 1000.0; // positions wrap at +/- this on every axis
pub const SPECKLE_MAX_SPEED: f32 = 0.03; // per-axis velocity drawn from +/- this
pub const SPECKLE_ALPHA_INIT: (f32, f32) = (50.0, 200.0);
pub const SPECKLE_ALPHA_MIN: f32 = 50.0;
pub const SPECKLE_ALPHA_MAX: f32 = 255.0;
pub const SPECKLE_ALPHA_JITTER: f32 = 0.3;
pub const SPECKLE_DIAMETER: f32 = 2.0;
pub const SPECKLE_GREY: f32 = 200.0;

// Orb lifecycle
pub const ORB_SPAWN_EXTENT: f32 = 400.0; // spawn positions in [-extent, extent)^3
pub const ORB_SPAWN_INTERVAL: u64 = 60; // frames between spawn ticks
pub const ORB_SPAWN_MIN: u32 = 1;
pub const ORB_SPAWN_MAX_EXCLUSIVE: u32 = 3;
pub const ORB_MIN_SIZE: f32 = 0.05; // spawn size and eviction floor
pub const ORB_TARGET_SIZE: f32 = 3.0;
pub const ORB_TARGET_ALPHA: f32 = 255.0;
pub const ORB_GROW_LERP: f32 = 0.05;
pub const ORB_SNAP_EPSILON: f32 = 0.01;
pub const ORB_SHRINK_FACTOR: f32 = 0.85;
pub const ORB_ALPHA_DECAY: f32 = 10.0;
pub const ORB_POPULATION_SOFT_CAP: usize = 300;
pub const ORB_DIAMETER_FACTOR: f32 = 4.0; // drawn diameter = size * factor

// Connections
pub const CONNECTION_DISTANCE: f32 = 300.0; // strict upper bound on link length
pub const MAX_CONNECTIONS_PER_ORB: usize = 2;
pub const CONNECTION_SHRINK_PULL: f32 = 0.1; // endpoint pull toward partner when shrinking

// Camera orbit
pub const CAMERA_THETA_INIT: f32 = 0.0;
pub const CAMERA_PHI_INIT: f32 = PI / 4.0;
pub const CAMERA_RADIUS_INIT: f32 = 500.0;
pub const CAMERA_PHI_MARGIN: f32 = 0.2; // phi stays in [margin, PI - margin]
pub const CAMERA_RADIUS_MIN: f32 = 200.0;
pub const CAMERA_RADIUS_MARGIN: f32 = 100.0; // zoom-out headroom past the farthest orb
pub const DRIFT_BASE_THETA: f32 = 0.001;
pub const DRIFT_BASE_PHI: f32 = 0.0005;
pub const DRIFT_FRICTION: f32 = 0.99; // drift = drift*f + base*(1-f)
pub const DRAG_SENSITIVITY: f32 = 0.001;
pub const WHEEL_SENSITIVITY: f32 = 0.5;

// Flash overlay
pub const FLASH_CHANCE: f32 = 1.0 / 300.0;
pub const FLASH_DURATION: u32 = 30; // frames
pub const FLASH_SCALE: f32 = 0.8; // fraction of the viewport covered

// Assets
pub const IMAGE_COUNT: usize = 50;

// Colours (0..=255)
pub const NEON_GREEN: [f32; 3] = [57.0, 255.0, 20.0];
pub const BACKGROUND: [f32; 3] = [255.0, 255.0, 255.0];
pub const AMBIENT_LIGHT: f32 = 255.0;
