use glam::Vec3;

// Shared tuning constants for the viewer. Values are kept as-is; callers should
// go through `ViewerConfig` when they need to override any of them.

// Asset and DOM contract
pub const MODEL_PATH: &str = "./modelo/escritorio/portafolio.gltf";
pub const MOUNT_ELEMENT_ID: &str = "three-canvas-container";
pub const THEME_TOGGLE_ID: &str = "theme-toggle";
pub const PARTICLE_BUTTON_ID: &str = "btn-particulas";
pub const DARK_CLASS: &str = "dark";
pub const MODEL_ATTRIBUTE: &str = "data-model";

// Interaction
pub const PICKABLE_NAME: &str = "Monitor"; // exact, case-sensitive node name
pub const EMISSIVE_ON_COLOR: u32 = 0x00aaff;
pub const EMISSIVE_ON_INTENSITY: f32 = 2.0;
pub const EMISSIVE_OFF_COLOR: u32 = 0x000000;
pub const EMISSIVE_OFF_INTENSITY: f32 = 0.0;

// Particle burst
pub const PARTICLE_COUNT: usize = 80;
pub const PARTICLE_HALF_WIDTH: f32 = 0.25; // x and z sampled in [-0.25, 0.25)
pub const PARTICLE_HEIGHT: f32 = 0.7; // y sampled in [0, 0.7)
pub const PARTICLE_SIZE: f32 = 0.06;
pub const PARTICLE_COLOR: u32 = 0x6366f1;
pub const PARTICLE_FADE_INTERVAL_MS: u64 = 50;
pub const PARTICLE_FADE_STEP: f32 = 0.05;

// Lighting presets
pub const DARK_DIRECTIONAL_COLOR: u32 = 0xaaaaee;
pub const DARK_DIRECTIONAL_INTENSITY: f32 = 2.0;
pub const DARK_AMBIENT_INTENSITY: f32 = 1.2;
pub const LIGHT_DIRECTIONAL_COLOR: u32 = 0xffffff;
pub const LIGHT_DIRECTIONAL_INTENSITY: f32 = 1.5;
pub const LIGHT_AMBIENT_INTENSITY: f32 = 0.8;
pub const AMBIENT_COLOR: u32 = 0xffffff;
pub const DIRECTIONAL_LIGHT_POSITION: Vec3 = Vec3::new(5.0, 10.0, 7.0);

// Camera
pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_EYE: Vec3 = Vec3::new(0.0, 1.5, 3.0);
pub const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 0.5, 0.0);

// Orbit controls
pub const ORBIT_DAMPING_FACTOR: f32 = 0.05;
pub const ORBIT_MIN_DISTANCE: f32 = 1.0;
pub const ORBIT_MAX_DISTANCE: f32 = 10.0;
pub const ORBIT_ROTATE_SPEED: f32 = 1.0;
pub const ORBIT_ZOOM_STEP: f32 = 0.95; // radius multiplier per wheel notch
pub const ORBIT_POLAR_EPSILON: f32 = 1e-4; // keeps the camera off the poles

/// Unpack a `0xRRGGBB` value into an RGB vector in [0, 1].
#[inline]
pub fn rgb_from_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}
