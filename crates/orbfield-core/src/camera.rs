//! Orbiting camera with drifting angular velocity.
//!
//! Input never moves the camera directly: drags nudge the drift velocities,
//! which relax back toward a slow baseline rotation every frame.

use crate::constants::{
    CAMERA_PHI_INIT, CAMERA_PHI_MARGIN, CAMERA_RADIUS_INIT, CAMERA_RADIUS_MARGIN,
    CAMERA_RADIUS_MIN, CAMERA_THETA_INIT, DRAG_SENSITIVITY, DRIFT_BASE_PHI, DRIFT_BASE_THETA,
    DRIFT_FRICTION, WHEEL_SENSITIVITY,
};
use glam::{Mat4, Vec3};
use std::f32::consts::PI;

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[derive(Clone, Debug)]
pub struct CameraRig {
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
    pub drift_theta: f32,
    pub drift_phi: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            theta: CAMERA_THETA_INIT,
            phi: CAMERA_PHI_INIT,
            radius: CAMERA_RADIUS_INIT,
            drift_theta: DRIFT_BASE_THETA,
            drift_phi: DRIFT_BASE_PHI,
        }
    }
}

impl CameraRig {
    /// Integrate drift into the orbit angles, then relax drift toward baseline.
    pub fn update(&mut self) {
        self.theta += self.drift_theta;
        self.phi = clamp_phi(self.phi + self.drift_phi);
        self.drift_theta = relax(self.drift_theta, DRIFT_BASE_THETA);
        self.drift_phi = relax(self.drift_phi, DRIFT_BASE_PHI);
    }

    /// Pointer drag in screen pixels.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.drift_theta += dx * DRAG_SENSITIVITY;
        self.drift_phi += dy * DRAG_SENSITIVITY;
    }

    /// Wheel delta (positive zooms out). The upper bound always leaves room to
    /// see the farthest orb.
    pub fn zoom(&mut self, delta: f32, max_orb_distance: f32) {
        let max = max_radius(max_orb_distance);
        self.radius = (self.radius + delta * WHEEL_SENSITIVITY).clamp(CAMERA_RADIUS_MIN, max);
    }

    /// Spherical to Cartesian, orbiting the origin.
    pub fn eye(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.radius * sin_phi * cos_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * sin_theta,
        )
    }

    pub fn camera(&self, aspect: f32) -> Camera {
        look_from(self.eye(), aspect)
    }
}

/// Camera at `eye` looking at the origin with +Y up.
pub fn look_from(eye: Vec3, aspect: f32) -> Camera {
    Camera {
        eye,
        target: Vec3::ZERO,
        up: Vec3::Y,
        aspect: aspect.max(1e-6),
        fovy_radians: PI / 3.0,
        znear: 1.0,
        zfar: 10_000.0,
    }
}

#[inline]
pub fn max_radius(max_orb_distance: f32) -> f32 {
    (max_orb_distance + CAMERA_RADIUS_MARGIN).max(CAMERA_RADIUS_MIN)
}

#[inline]
fn clamp_phi(phi: f32) -> f32 {
    phi.clamp(CAMERA_PHI_MARGIN, PI - CAMERA_PHI_MARGIN)
}

#[inline]
fn relax(drift: f32, base: f32) -> f32 {
    drift * DRIFT_FRICTION + base * (1.0 - DRIFT_FRICTION)
}
