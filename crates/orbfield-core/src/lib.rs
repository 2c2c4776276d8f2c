pub mod assets;
pub mod camera;
pub mod constants;
pub mod flash;
pub mod orbs;
pub mod particles;
pub mod pool;
pub mod scene;

pub static SPRITE_WGSL: &str = include_str!("../shaders/sprite.wgsl");
pub static LINE_WGSL: &str = include_str!("../shaders/line.wgsl");

pub use assets::*;
pub use camera::*;
pub use constants::*;
pub use flash::*;
pub use orbs::*;
pub use particles::*;
pub use pool::*;
pub use scene::*;
