//! Orb lifecycle and proximity connections.

use crate::assets::{AssetCatalog, ImageId};
use crate::constants::{
    CONNECTION_DISTANCE, CONNECTION_SHRINK_PULL, MAX_CONNECTIONS_PER_ORB, ORB_ALPHA_DECAY,
    ORB_GROW_LERP, ORB_MIN_SIZE, ORB_POPULATION_SOFT_CAP, ORB_SHRINK_FACTOR, ORB_SNAP_EPSILON,
    ORB_SPAWN_EXTENT, ORB_SPAWN_INTERVAL, ORB_SPAWN_MAX_EXCLUSIVE, ORB_SPAWN_MIN,
    ORB_TARGET_ALPHA, ORB_TARGET_SIZE,
};
use crate::particles::random_vec3;
use crate::pool::ImagePool;
use glam::{Quat, Vec3};
use rand::Rng;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbPhase {
    Growing,
    Steady,
    Shrinking,
}

#[derive(Clone, Debug)]
pub struct Orb {
    pub position: Vec3,
    pub size: f32,
    pub alpha: f32,
    pub phase: OrbPhase,
    pub image: ImageId,
}

impl Orb {
    pub fn spawn(position: Vec3, image: ImageId) -> Self {
        Self {
            position,
            size: ORB_MIN_SIZE,
            alpha: 0.0,
            phase: OrbPhase::Growing,
            image,
        }
    }

    pub fn is_growing(&self) -> bool {
        self.phase == OrbPhase::Growing
    }

    pub fn is_shrinking(&self) -> bool {
        self.phase == OrbPhase::Shrinking
    }

    /// One frame of easing.
    pub fn step(&mut self) {
        match self.phase {
            OrbPhase::Growing => {
                self.size = lerp(self.size, ORB_TARGET_SIZE, ORB_GROW_LERP);
                self.alpha = lerp(self.alpha, ORB_TARGET_ALPHA, ORB_GROW_LERP);
                if (self.size - ORB_TARGET_SIZE).abs() < ORB_SNAP_EPSILON {
                    self.size = ORB_TARGET_SIZE;
                    self.alpha = ORB_TARGET_ALPHA;
                    self.phase = OrbPhase::Steady;
                }
            }
            OrbPhase::Shrinking => {
                self.size *= ORB_SHRINK_FACTOR;
                self.alpha = (self.alpha - ORB_ALPHA_DECAY).max(0.0);
            }
            OrbPhase::Steady => {}
        }
    }

    pub fn is_spent(&self) -> bool {
        self.size <= ORB_MIN_SIZE
    }
}

/// Link from one orb to one of its nearest neighbours, by index into the live
/// set for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Billboard {
    pub yaw: f32,
    pub pitch: f32,
}

impl Billboard {
    /// Orientation that turns a quad in the XY plane toward `eye`.
    pub fn facing(position: Vec3, eye: Vec3) -> Self {
        let dir = eye - position;
        Self {
            yaw: dir.x.atan2(dir.z),
            pitch: -dir.y.atan2((dir.x * dir.x + dir.z * dir.z).sqrt()),
        }
    }

    /// Yaw about Y, then pitch about the yawed X axis.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }
}

#[derive(Clone, Debug)]
pub struct OrbParams {
    pub spawn_extent: f32,
    pub spawn_interval: u64,
    pub spawn_count: (u32, u32),
    pub population_soft_cap: usize,
    pub connection_distance: f32,
    pub max_connections: usize,
}

impl Default for OrbParams {
    fn default() -> Self {
        Self {
            spawn_extent: ORB_SPAWN_EXTENT,
            spawn_interval: ORB_SPAWN_INTERVAL,
            spawn_count: (ORB_SPAWN_MIN, ORB_SPAWN_MAX_EXCLUSIVE),
            population_soft_cap: ORB_POPULATION_SOFT_CAP,
            connection_distance: CONNECTION_DISTANCE,
            max_connections: MAX_CONNECTIONS_PER_ORB,
        }
    }
}

pub struct OrbManager {
    orbs: Vec<Orb>,
    pool: ImagePool,
    params: OrbParams,
    nearby: SmallVec<[(usize, f32); 8]>,
}

impl OrbManager {
    pub fn new(pool: ImagePool, params: OrbParams) -> Self {
        Self {
            orbs: Vec::new(),
            pool,
            params,
            nearby: SmallVec::new(),
        }
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    pub fn orbs_mut(&mut self) -> &mut Vec<Orb> {
        &mut self.orbs
    }

    pub fn pool(&self) -> &ImagePool {
        &self.pool
    }

    /// Spawn new orbs when `frame` lands on the spawn interval. Returns how
    /// many were created.
    pub fn spawn_tick<R, A>(&mut self, frame: u64, rng: &mut R, assets: &A) -> usize
    where
        R: Rng + ?Sized,
        A: AssetCatalog + ?Sized,
    {
        if self.params.spawn_interval == 0 || frame % self.params.spawn_interval != 0 {
            return 0;
        }
        let (lo, hi) = self.params.spawn_count;
        let count = if hi > lo { rng.gen_range(lo..hi) } else { lo };
        let mut spawned = 0;
        for _ in 0..count {
            if self.spawn_one(rng, assets).is_some() {
                spawned += 1;
            }
        }
        spawned
    }

    /// Place a single orb with the next pooled image. `None` when there are
    /// no usable images to draw from.
    pub fn spawn_one<R, A>(&mut self, rng: &mut R, assets: &A) -> Option<ImageId>
    where
        R: Rng + ?Sized,
        A: AssetCatalog + ?Sized,
    {
        let image = self.pool.next(rng, assets)?;
        let position = random_vec3(rng, self.params.spawn_extent);
        self.orbs.push(Orb::spawn(position, image));
        log::debug!(
            "[orbs] spawn image={} at ({:.0},{:.0},{:.0}) live={}",
            image,
            position.x,
            position.y,
            position.z,
            self.orbs.len()
        );
        if self.orbs.len() > self.params.population_soft_cap {
            if let Some(orb) = self.orbs.iter_mut().find(|o| o.phase == OrbPhase::Steady) {
                orb.phase = OrbPhase::Shrinking;
            }
        }
        Some(image)
    }

    pub fn update(&mut self) {
        for orb in &mut self.orbs {
            orb.step();
        }
    }

    /// Drop every orb that has shrunk to the floor. Returns how many went.
    pub fn evict(&mut self) -> usize {
        let before = self.orbs.len();
        self.orbs.retain(|o| !o.is_spent());
        let removed = before - self.orbs.len();
        if removed > 0 {
            log::debug!("[orbs] evicted {} live={}", removed, self.orbs.len());
        }
        removed
    }

    /// Drop orbs whose image failed to load after they spawned.
    pub fn discard_failed<A: AssetCatalog + ?Sized>(&mut self, assets: &A) -> usize {
        let before = self.orbs.len();
        self.orbs.retain(|o| !assets.is_failed(o.image));
        let removed = before - self.orbs.len();
        if removed > 0 {
            log::debug!("[orbs] discarded {} with failed images", removed);
        }
        removed
    }

    /// Distance from the origin to the farthest live orb, 0 when empty.
    pub fn max_distance(&self) -> f32 {
        self.orbs
            .iter()
            .map(|o| o.position.length())
            .fold(0.0, f32::max)
    }

    /// For each orb, up to `max_connections` nearest others within the
    /// connection distance, nearest first. Not symmetric: A may list B while B
    /// has closer neighbours of its own.
    pub fn connections(&mut self, out: &mut Vec<Connection>) {
        out.clear();
        let limit = self.params.connection_distance;
        for (i, a) in self.orbs.iter().enumerate() {
            self.nearby.clear();
            for (j, b) in self.orbs.iter().enumerate() {
                if i == j {
                    continue;
                }
                let d = a.position.distance(b.position);
                if d < limit {
                    self.nearby.push((j, d));
                }
            }
            // Stable sort keeps scan order for exact ties.
            self.nearby.sort_by(|x, y| x.1.total_cmp(&y.1));
            out.extend(
                self.nearby
                    .iter()
                    .take(self.params.max_connections)
                    .map(|&(j, d)| Connection {
                        from: i,
                        to: j,
                        distance: d,
                    }),
            );
        }
    }
}

/// Line endpoints for a connection. A shrinking orb's endpoint is pulled a
/// little toward its partner so the link retracts with it.
pub fn line_endpoints(a: &Orb, b: &Orb) -> (Vec3, Vec3) {
    let mut from = a.position;
    let mut to = b.position;
    if a.is_shrinking() {
        from = a.position.lerp(b.position, CONNECTION_SHRINK_PULL);
    }
    if b.is_shrinking() {
        to = b.position.lerp(a.position, CONNECTION_SHRINK_PULL);
    }
    (from, to)
}

/// Line alpha is capped by the fainter endpoint.
#[inline]
pub fn line_alpha(a: &Orb, b: &Orb) -> f32 {
    a.alpha.min(b.alpha)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
