use clap::Parser;
use orbfield_core::{AssetManifest, FrameCommands, InputEvent, Scene, SceneParams, IMAGE_COUNT};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

mod assets;
mod input;
mod render;

#[derive(Parser, Debug)]
#[command(name = "orbfield", about = "Image orbs drifting through a speckle field")]
struct Args {
    /// Directory holding 01.jpg, 02.jpg, ...
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    /// Number of sequentially named images to load
    #[arg(long, default_value_t = IMAGE_COUNT)]
    images: usize,
    /// Seed for the scene's random source (defaults to the clock)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(clock_seed);
    log::info!(
        "orbfield starting: assets={} images={} seed={}",
        args.assets.display(),
        args.images,
        seed
    );

    let mut manifest = AssetManifest::sequential(args.images);
    let mut scene = Scene::new(
        SceneParams {
            image_count: args.images,
            ..SceneParams::default()
        },
        seed,
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let window = WindowBuilder::new()
        .with_title("orbfield")
        .build(&event_loop)?;

    let mut gpu = pollster::block_on(render::GpuState::new(&window, args.images))?;
    let mut loader =
        assets::AssetLoader::spawn(&args.assets, &manifest, gpu.max_texture_dimension())?;
    let mut mouse = input::MouseState::default();
    let mut pending: Vec<InputEvent> = Vec::new();
    let mut commands = FrameCommands::default();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => gpu.resize(size),
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => mouse.button(state),
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(drag) = mouse.moved(position, gpu.window.scale_factor()) {
                    pending.push(drag);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => pending.push(input::wheel_event(delta)),
            _ => {}
        },
        Event::AboutToWait => {
            for loaded in loader.drain() {
                let uploaded = loaded
                    .result
                    .map_err(anyhow::Error::from)
                    .and_then(|img| gpu.upload_image(loaded.id, &img));
                let marked = match uploaded {
                    Ok(()) => {
                        log::info!("loaded: {}", loaded.name);
                        manifest.mark_ready(loaded.id)
                    }
                    Err(e) => {
                        log::error!("failed to load: {} ({:#})", loaded.name, e);
                        manifest.mark_failed(loaded.id)
                    }
                };
                if let Err(e) = marked {
                    log::warn!("{}", e);
                }
            }

            scene.tick(&pending, &manifest, &mut commands);
            pending.clear();

            match gpu.render(&commands) {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("surface out of memory");
                    elwt.exit()
                }
                Err(e) => log::warn!("frame skipped: {:?}", e),
            }
        }
        _ => {}
    })?;
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}
