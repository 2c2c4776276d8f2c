// Host-side tests for the per-frame scene orchestration.

use glam::Vec3;
use orbfield_core::*;

struct AllReady;

impl AssetCatalog for AllReady {
    fn len(&self) -> usize {
        IMAGE_COUNT
    }

    fn is_ready(&self, _id: ImageId) -> bool {
        true
    }
}

struct NoneReady;

impl AssetCatalog for NoneReady {
    fn len(&self) -> usize {
        IMAGE_COUNT
    }

    fn is_ready(&self, _id: ImageId) -> bool {
        false
    }
}

// Even slots never load, odd slots are ready.
struct OddOnly;

impl AssetCatalog for OddOnly {
    fn len(&self) -> usize {
        IMAGE_COUNT
    }

    fn is_ready(&self, id: ImageId) -> bool {
        id.0 % 2 == 1
    }

    fn is_failed(&self, id: ImageId) -> bool {
        id.0 % 2 == 0
    }
}

fn quiet_params() -> SceneParams {
    SceneParams {
        orbs: OrbParams {
            spawn_interval: 0,
            ..OrbParams::default()
        },
        ..SceneParams::default()
    }
}

fn run(scene: &mut Scene, frames: usize, out: &mut FrameCommands) {
    for _ in 0..frames {
        scene.tick(&[], &AllReady, out);
    }
}

#[test]
fn same_seed_gives_same_frames() {
    let mut a = Scene::new(SceneParams::default(), 99);
    let mut b = Scene::new(SceneParams::default(), 99);
    let (mut out_a, mut out_b) = (FrameCommands::default(), FrameCommands::default());
    let drag = [InputEvent::Drag { dx: 4.0, dy: -2.0 }];
    for frame in 0..600 {
        let events: &[InputEvent] = if frame % 50 == 0 { &drag } else { &[] };
        a.tick(events, &AllReady, &mut out_a);
        b.tick(events, &AllReady, &mut out_b);
        assert_eq!(out_a.eye, out_b.eye);
        assert_eq!(out_a.flash, out_b.flash);
        assert_eq!(out_a.speckles, out_b.speckles);
        assert_eq!(out_a.lines, out_b.lines);
        assert_eq!(out_a.orbs, out_b.orbs);
    }
}

#[test]
fn different_seeds_diverge() {
    let mut a = Scene::new(SceneParams::default(), 1);
    let mut b = Scene::new(SceneParams::default(), 2);
    let (mut out_a, mut out_b) = (FrameCommands::default(), FrameCommands::default());
    a.tick(&[], &AllReady, &mut out_a);
    b.tick(&[], &AllReady, &mut out_b);
    assert_ne!(out_a.speckles, out_b.speckles);
}

#[test]
fn frame_layers_are_filled_every_tick() {
    let mut scene = Scene::new(SceneParams::default(), 7);
    let mut out = FrameCommands::default();
    scene.tick(&[], &AllReady, &mut out);
    assert_eq!(out.frame, 1);
    assert_eq!(scene.frame(), 1);
    assert_eq!(out.background, BACKGROUND);
    assert_eq!(out.ambient_light, AMBIENT_LIGHT);
    assert_eq!(out.speckles.len(), 600);
    assert_eq!(out.eye, scene.camera().eye());

    scene.tick(&[], &AllReady, &mut out);
    assert_eq!(out.speckles.len(), 600, "layers are replaced, not appended");
}

#[test]
fn first_orbs_appear_on_frame_sixty() {
    let mut scene = Scene::new(SceneParams::default(), 8);
    let mut out = FrameCommands::default();
    run(&mut scene, 59, &mut out);
    assert!(scene.orbs().orbs().is_empty());
    assert!(out.orbs.is_empty());

    scene.tick(&[], &AllReady, &mut out);
    let live = scene.orbs().orbs().len();
    assert!((1..=2).contains(&live));
    assert_eq!(out.orbs.len(), live);
    for draw in &out.orbs {
        assert!(draw.diameter > ORB_MIN_SIZE * ORB_DIAMETER_FACTOR);
    }
}

#[test]
fn unready_images_are_not_drawn() {
    let mut scene = Scene::new(SceneParams::default(), 9);
    let mut out = FrameCommands::default();
    scene.flash_mut().trigger(ImageId(4));
    for _ in 0..120 {
        scene.tick(&[], &NoneReady, &mut out);
        assert!(out.orbs.is_empty());
        assert!(out.flash.is_none());
    }
    assert!(!scene.orbs().orbs().is_empty(), "pending orbs still live off-screen");
}

#[test]
fn failed_images_never_spawn_or_link() {
    let mut scene = Scene::new(SceneParams::default(), 17);
    let mut out = FrameCommands::default();
    for _ in 0..600 {
        scene.tick(&[], &OddOnly, &mut out);
        let live = scene.orbs().orbs();
        assert!(live.iter().all(|o| o.image.0 % 2 == 1));
        assert_eq!(out.orbs.len(), live.len());
        assert_eq!(out.lines.len(), scene.connections().len());
        for c in scene.connections() {
            assert!(live[c.from].image.0 % 2 == 1 && live[c.to].image.0 % 2 == 1);
        }
    }
    assert!(!scene.orbs().orbs().is_empty());
}

#[test]
fn all_failed_scene_stays_empty() {
    let mut manifest = AssetManifest::sequential(IMAGE_COUNT);
    for id in manifest.ids().collect::<Vec<_>>() {
        manifest.mark_failed(id).unwrap();
    }
    let mut scene = Scene::new(SceneParams::default(), 18);
    let mut out = FrameCommands::default();
    for _ in 0..600 {
        scene.tick(&[], &manifest, &mut out);
        assert!(out.orbs.is_empty());
        assert!(out.lines.is_empty());
    }
    assert!(scene.orbs().orbs().is_empty());
}

#[test]
fn orb_is_dropped_when_its_image_fails_later() {
    let mut scene = Scene::new(quiet_params(), 19);
    let mut out = FrameCommands::default();
    {
        let orbs = scene.orbs_mut().orbs_mut();
        orbs.push(Orb::spawn(Vec3::ZERO, ImageId(4)));
        orbs.push(Orb::spawn(Vec3::new(50.0, 0.0, 0.0), ImageId(5)));
    }
    scene.tick(&[], &AllReady, &mut out);
    assert_eq!(out.lines.len(), 2);

    scene.tick(&[], &OddOnly, &mut out);
    assert_eq!(scene.orbs().orbs().len(), 1);
    assert_eq!(scene.orbs().orbs()[0].image, ImageId(5));
    assert!(out.lines.is_empty());
}

#[test]
fn triggered_flash_starts_opaque_and_fades() {
    let mut scene = Scene::new(quiet_params(), 10);
    let mut out = FrameCommands::default();
    scene.flash_mut().trigger(ImageId(3));

    scene.tick(&[], &AllReady, &mut out);
    assert_eq!(
        out.flash,
        Some(FlashDraw {
            image: ImageId(3),
            opacity: 255.0
        })
    );

    scene.tick(&[], &AllReady, &mut out);
    let second = out.flash.map(|f| f.opacity);
    assert_eq!(second, Some(255.0 * 29.0 / 30.0));

    run(&mut scene, 28, &mut out);
    assert_eq!(scene.flash().countdown(), 0);
    assert_eq!(scene.flash().image(), None);
}

#[test]
fn wheel_zoom_is_limited_by_farthest_orb() {
    let mut scene = Scene::new(quiet_params(), 11);
    scene
        .orbs_mut()
        .orbs_mut()
        .push(Orb::spawn(Vec3::new(600.0, 0.0, 0.0), ImageId(0)));
    scene.apply_input(InputEvent::Wheel { delta: 10_000.0 });
    assert_eq!(scene.camera().radius, 700.0);

    scene.orbs_mut().orbs_mut().clear();
    scene
        .orbs_mut()
        .orbs_mut()
        .push(Orb::spawn(Vec3::ZERO, ImageId(0)));
    scene.apply_input(InputEvent::Wheel { delta: -10_000.0 });
    assert_eq!(scene.camera().radius, 200.0);
    scene.apply_input(InputEvent::Wheel { delta: 10_000.0 });
    assert_eq!(scene.camera().radius, 200.0, "floor wins over a tiny field");
}

#[test]
fn wheel_in_tick_applies_before_camera_moves() {
    let mut scene = Scene::new(quiet_params(), 12);
    let mut out = FrameCommands::default();
    scene
        .orbs_mut()
        .orbs_mut()
        .push(Orb::spawn(Vec3::new(1000.0, 0.0, 0.0), ImageId(0)));
    scene.tick(&[InputEvent::Wheel { delta: -200.0 }], &AllReady, &mut out);
    assert_eq!(scene.camera().radius, 400.0);
    assert!((out.eye.length() - 400.0).abs() < 1e-2);
}

#[test]
fn lone_orb_grows_while_drag_kicks_the_orbit() {
    let mut scene = Scene::new(quiet_params(), 13);
    let mut out = FrameCommands::default();
    scene
        .orbs_mut()
        .orbs_mut()
        .push(Orb::spawn(Vec3::ZERO, ImageId(2)));

    let before = scene.camera().drift_theta;
    scene.apply_input(InputEvent::Drag { dx: 100.0, dy: 0.0 });
    assert!((scene.camera().drift_theta - (before + 0.1)).abs() < 1e-6);

    let theta0 = scene.camera().theta;
    let mut last_drift = scene.camera().drift_theta;
    for _ in 0..10 {
        scene.tick(&[], &AllReady, &mut out);
        let drift = scene.camera().drift_theta;
        assert!(drift < last_drift && drift > DRIFT_BASE_THETA);
        last_drift = drift;
    }
    assert!(scene.camera().theta - theta0 > 0.5);

    run(&mut scene, 150, &mut out);
    let orb = &scene.orbs().orbs()[0];
    assert_eq!(orb.phase, OrbPhase::Steady);
    assert_eq!(out.orbs.len(), 1);
    assert_eq!(out.orbs[0].diameter, 12.0);
    assert!(out.lines.is_empty(), "a single orb has no partners");
}

#[test]
fn lines_follow_connections() {
    let mut scene = Scene::new(quiet_params(), 14);
    let mut out = FrameCommands::default();
    {
        let orbs = scene.orbs_mut().orbs_mut();
        orbs.push(Orb::spawn(Vec3::ZERO, ImageId(0)));
        orbs.push(Orb::spawn(Vec3::new(100.0, 0.0, 0.0), ImageId(1)));
        orbs.push(Orb::spawn(Vec3::new(0.0, 0.0, 900.0), ImageId(2)));
    }
    scene.tick(&[], &AllReady, &mut out);
    assert_eq!(scene.connections().len(), 2);
    assert_eq!(out.lines.len(), 2);
    let orbs = scene.orbs().orbs();
    for line in &out.lines {
        assert_eq!(line.alpha, orbs[0].alpha.min(orbs[1].alpha));
        assert!(line.from.z.abs() < 1e-6 && line.to.z.abs() < 1e-6);
    }
}

#[test]
fn long_run_stays_within_bounds() {
    let mut scene = Scene::new(SceneParams::default(), 15);
    let mut out = FrameCommands::default();
    for frame in 0..3000 {
        let events = [InputEvent::Drag {
            dx: if frame % 2 == 0 { 40.0 } else { -25.0 },
            dy: 30.0,
        }];
        scene.tick(&events, &AllReady, &mut out);

        let cam = scene.camera();
        assert!(cam.phi >= CAMERA_PHI_MARGIN);
        assert!(cam.phi <= std::f32::consts::PI - CAMERA_PHI_MARGIN);
        assert!(out
            .speckles
            .iter()
            .all(|s| s.position.abs().max_element() <= SPECKLE_BOUND));
        assert!(scene.orbs().orbs().iter().all(|o| o.size > ORB_MIN_SIZE));

        let mut per_orb = vec![0usize; scene.orbs().orbs().len()];
        for c in scene.connections() {
            per_orb[c.from] += 1;
            assert!(c.distance < CONNECTION_DISTANCE);
        }
        assert!(per_orb.iter().all(|&n| n <= MAX_CONNECTIONS_PER_ORB));
    }
    assert!(scene.orbs().orbs().len() >= 50);
}

#[test]
fn soft_cap_keeps_population_bounded() {
    let params = SceneParams {
        orbs: OrbParams {
            spawn_interval: 5,
            population_soft_cap: 10,
            ..OrbParams::default()
        },
        ..SceneParams::default()
    };
    let mut scene = Scene::new(params, 16);
    let mut out = FrameCommands::default();
    let mut saw_shrinking = false;
    for _ in 0..4000 {
        scene.tick(&[], &AllReady, &mut out);
        assert!(scene.orbs().orbs().len() < 120);
        saw_shrinking |= scene.orbs().orbs().iter().any(|o| o.is_shrinking());
    }
    assert!(saw_shrinking);
    assert!(scene.orbs().pool().refills() > 0);
}
