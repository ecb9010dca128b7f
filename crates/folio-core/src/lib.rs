pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod gltf_import;
pub mod interaction;
pub mod particles;
pub mod picking;
pub mod scene;
pub mod session;
pub mod theme;

pub use camera::*;
pub use config::*;
pub use constants::*;
pub use error::{Result, ViewerError};
pub use interaction::{Commands, InteractionState};
pub use particles::*;
pub use picking::*;
pub use scene::*;
pub use session::*;
pub use theme::*;

// Shaders bundled as string constants
pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");
