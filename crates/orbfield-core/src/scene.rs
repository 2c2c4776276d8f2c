//! Per-frame orchestration.
//!
//! [`Scene::tick`] applies the input gathered since the last frame, advances
//! every component once, and writes what to draw into [`FrameCommands`] in
//! painter's order. Front-ends only translate those commands into GPU work.

use crate::assets::{AssetCatalog, ImageId};
use crate::camera::CameraRig;
use crate::constants::{AMBIENT_LIGHT, BACKGROUND, IMAGE_COUNT, ORB_DIAMETER_FACTOR, SPECKLE_COUNT};
use crate::flash::FlashOverlay;
use crate::orbs::{line_alpha, line_endpoints, Billboard, Connection, OrbManager, OrbParams};
use crate::particles::ParticleField;
use crate::pool::ImagePool;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Clone, Debug)]
pub struct SceneParams {
    pub image_count: usize,
    pub speckle_count: usize,
    pub orbs: OrbParams,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            image_count: IMAGE_COUNT,
            speckle_count: SPECKLE_COUNT,
            orbs: OrbParams::default(),
        }
    }
}

/// Pointer input delivered between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer moved by (dx, dy) pixels with the button held.
    Drag { dx: f32, dy: f32 },
    /// Scroll amount; positive zooms out.
    Wheel { delta: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlashDraw {
    pub image: ImageId,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeckleDraw {
    pub position: Vec3,
    pub alpha: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineDraw {
    pub from: Vec3,
    pub to: Vec3,
    pub alpha: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbDraw {
    pub image: ImageId,
    pub position: Vec3,
    pub diameter: f32,
    pub billboard: Billboard,
}

/// Everything needed to draw one frame, in layer order.
#[derive(Clone, Debug, Default)]
pub struct FrameCommands {
    pub frame: u64,
    pub background: [f32; 3],
    pub flash: Option<FlashDraw>,
    /// Camera position; it always looks at the origin with +Y up.
    pub eye: Vec3,
    pub speckles: Vec<SpeckleDraw>,
    pub ambient_light: f32,
    pub lines: Vec<LineDraw>,
    pub orbs: Vec<OrbDraw>,
}

impl FrameCommands {
    pub fn clear(&mut self) {
        self.flash = None;
        self.speckles.clear();
        self.lines.clear();
        self.orbs.clear();
    }
}

pub struct Scene {
    params: SceneParams,
    rng: StdRng,
    frame: u64,
    camera: CameraRig,
    particles: ParticleField,
    orbs: OrbManager,
    flash: FlashOverlay,
    connections: Vec<Connection>,
}

impl Scene {
    pub fn new(params: SceneParams, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = ParticleField::new(params.speckle_count, &mut rng);
        let pool = ImagePool::new(params.image_count, &mut rng);
        let orbs = OrbManager::new(pool, params.orbs.clone());
        Self {
            params,
            rng,
            frame: 0,
            camera: CameraRig::default(),
            particles,
            orbs,
            flash: FlashOverlay::default(),
            connections: Vec::new(),
        }
    }

    pub fn params(&self) -> &SceneParams {
        &self.params
    }

    /// Frames ticked so far; the first tick is frame 1.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraRig {
        &mut self.camera
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn orbs(&self) -> &OrbManager {
        &self.orbs
    }

    pub fn orbs_mut(&mut self) -> &mut OrbManager {
        &mut self.orbs
    }

    pub fn flash(&self) -> &FlashOverlay {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut FlashOverlay {
        &mut self.flash
    }

    /// Connections computed during the last tick.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn apply_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Drag { dx, dy } => self.camera.drag(dx, dy),
            InputEvent::Wheel { delta } => {
                let max_orb_distance = self.orbs.max_distance();
                self.camera.zoom(delta, max_orb_distance);
            }
        }
    }

    pub fn tick<A: AssetCatalog + ?Sized>(
        &mut self,
        events: &[InputEvent],
        assets: &A,
        out: &mut FrameCommands,
    ) {
        self.frame += 1;
        for ev in events {
            self.apply_input(*ev);
        }

        out.clear();
        out.frame = self.frame;
        out.background = BACKGROUND;

        // Flash sits behind the 3D layers.
        self.flash.maybe_trigger(&mut self.rng, self.params.image_count);
        if let Some(image) = self.flash.image() {
            if assets.is_ready(image) {
                out.flash = Some(FlashDraw {
                    image,
                    opacity: self.flash.opacity(),
                });
            }
        }
        self.flash.update();

        self.camera.update();
        let eye = self.camera.eye();
        out.eye = eye;

        self.particles.update(&mut self.rng);
        out.speckles.extend(self.particles.speckles().iter().map(|s| SpeckleDraw {
            position: s.position,
            alpha: s.alpha,
        }));

        out.ambient_light = AMBIENT_LIGHT;

        self.orbs.spawn_tick(self.frame, &mut self.rng, assets);
        self.orbs.discard_failed(assets);
        self.orbs.update();
        self.orbs.evict();

        self.orbs.connections(&mut self.connections);
        let live = self.orbs.orbs();
        out.lines.extend(self.connections.iter().map(|c| {
            let (a, b) = (&live[c.from], &live[c.to]);
            let (from, to) = line_endpoints(a, b);
            LineDraw {
                from,
                to,
                alpha: line_alpha(a, b),
            }
        }));

        out.orbs.extend(
            live.iter()
                .filter(|o| assets.is_ready(o.image))
                .map(|o| OrbDraw {
                    image: o.image,
                    position: o.position,
                    diameter: o.size * ORB_DIAMETER_FACTOR,
                    billboard: Billboard::facing(o.position, eye),
                }),
        );
    }
}
