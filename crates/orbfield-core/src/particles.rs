//! Ambient background speckles.
//!
//! A fixed population drifts slowly through a cube and teleports to the
//! opposite face when it leaves. Alpha follows a clamped random walk.

use crate::constants::{
    SPECKLE_ALPHA_INIT, SPECKLE_ALPHA_JITTER, SPECKLE_ALPHA_MAX, SPECKLE_ALPHA_MIN,
    SPECKLE_BOUND, SPECKLE_MAX_SPEED,
};
use glam::Vec3;
use rand::Rng;

#[derive(Clone, Debug)]
pub struct Speckle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub alpha: f32,
}

#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    speckles: Vec<Speckle>,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let speckles = (0..count)
            .map(|_| Speckle {
                position: random_vec3(rng, SPECKLE_BOUND),
                velocity: random_vec3(rng, SPECKLE_MAX_SPEED),
                alpha: rng.gen_range(SPECKLE_ALPHA_INIT.0..SPECKLE_ALPHA_INIT.1),
            })
            .collect();
        Self { speckles }
    }

    /// Build a field from explicit speckles.
    pub fn from_speckles(speckles: Vec<Speckle>) -> Self {
        Self { speckles }
    }

    /// Advance every speckle by one frame.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for s in &mut self.speckles {
            s.position += s.velocity;
            s.position = Vec3::new(
                wrap_axis(s.position.x),
                wrap_axis(s.position.y),
                wrap_axis(s.position.z),
            );
            s.alpha += rng.gen_range(-SPECKLE_ALPHA_JITTER..SPECKLE_ALPHA_JITTER);
            s.alpha = s.alpha.clamp(SPECKLE_ALPHA_MIN, SPECKLE_ALPHA_MAX);
        }
    }

    pub fn speckles(&self) -> &[Speckle] {
        &self.speckles
    }

    pub fn len(&self) -> usize {
        self.speckles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speckles.is_empty()
    }
}

// Teleport, not reflect.
#[inline]
fn wrap_axis(v: f32) -> f32 {
    if v > SPECKLE_BOUND {
        -SPECKLE_BOUND
    } else if v < -SPECKLE_BOUND {
        SPECKLE_BOUND
    } else {
        v
    }
}

#[inline]
pub(crate) fn random_vec3<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}
