//! Viewer configuration.
//!
//! Every field defaults to the matching value in [`crate::constants`]; the web
//! front-end only overrides the model path (from the mount element) and leaves
//! the rest alone.

use crate::constants::*;
use crate::error::{Result, ViewerError};
use glam::Vec3;

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub eye: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: CAMERA_FOV_DEG,
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
            eye: CAMERA_EYE,
            target: CAMERA_TARGET,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrbitConfig {
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_step: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping_factor: ORBIT_DAMPING_FACTOR,
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
            rotate_speed: ORBIT_ROTATE_SPEED,
            zoom_step: ORBIT_ZOOM_STEP,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub model_path: String,
    pub mount_id: String,
    pub pickable_name: String,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    /// Fixed seed for particle sampling; `None` draws one from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_path: MODEL_PATH.to_string(),
            mount_id: MOUNT_ELEMENT_ID.to_string(),
            pickable_name: PICKABLE_NAME.to_string(),
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            rng_seed: None,
        }
    }
}

impl ViewerConfig {
    pub fn with_model_path(mut self, path: impl Into<String>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_path.trim().is_empty() {
            return Err(ViewerError::InvalidConfig("model path is empty".into()));
        }
        if self.pickable_name.is_empty() {
            return Err(ViewerError::InvalidConfig("pickable name is empty".into()));
        }
        let cam = &self.camera;
        if !(cam.fovy_degrees > 0.0 && cam.fovy_degrees < 180.0) {
            return Err(ViewerError::InvalidConfig(format!(
                "fovy {} outside (0, 180)",
                cam.fovy_degrees
            )));
        }
        if !(cam.znear > 0.0 && cam.zfar > cam.znear) {
            return Err(ViewerError::InvalidConfig(format!(
                "clip range {}..{} is not increasing",
                cam.znear, cam.zfar
            )));
        }
        let orbit = &self.orbit;
        if !(orbit.damping_factor > 0.0 && orbit.damping_factor <= 1.0) {
            return Err(ViewerError::InvalidConfig(format!(
                "damping factor {} outside (0, 1]",
                orbit.damping_factor
            )));
        }
        if !(orbit.min_distance > 0.0 && orbit.max_distance >= orbit.min_distance) {
            return Err(ViewerError::InvalidConfig(format!(
                "orbit distance range {}..{} is invalid",
                orbit.min_distance, orbit.max_distance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_model_path_is_rejected() {
        let cfg = ViewerConfig::default().with_model_path("  ");
        assert!(matches!(cfg.validate(), Err(ViewerError::InvalidConfig(_))));
    }

    #[test]
    fn inverted_orbit_range_is_rejected() {
        let mut cfg = ViewerConfig::default();
        cfg.orbit.min_distance = 5.0;
        cfg.orbit.max_distance = 2.0;
        assert!(cfg.validate().is_err());
    }
}
