use crate::constants::*;
use glam::Vec3;

/// Light parameters derived from the theme flag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingProfile {
    pub directional_color: Vec3,
    pub directional_intensity: f32,
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
}

impl LightingProfile {
    /// Direction from the scene towards the directional light.
    pub fn light_direction(&self) -> Vec3 {
        DIRECTIONAL_LIGHT_POSITION.normalize()
    }
}

/// Pure mapping from the theme flag to its lighting preset.
pub fn lighting_profile(is_dark: bool) -> LightingProfile {
    if is_dark {
        LightingProfile {
            directional_color: rgb_from_hex(DARK_DIRECTIONAL_COLOR),
            directional_intensity: DARK_DIRECTIONAL_INTENSITY,
            ambient_color: rgb_from_hex(AMBIENT_COLOR),
            ambient_intensity: DARK_AMBIENT_INTENSITY,
        }
    } else {
        LightingProfile {
            directional_color: rgb_from_hex(LIGHT_DIRECTIONAL_COLOR),
            directional_intensity: LIGHT_DIRECTIONAL_INTENSITY,
            ambient_color: rgb_from_hex(AMBIENT_COLOR),
            ambient_intensity: LIGHT_AMBIENT_INTENSITY,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThemeState {
    pub is_dark: bool,
}

impl ThemeState {
    pub fn new(is_dark: bool) -> Self {
        Self { is_dark }
    }

    pub fn profile(&self) -> LightingProfile {
        lighting_profile(self.is_dark)
    }

    pub fn set(&mut self, is_dark: bool) -> LightingProfile {
        self.is_dark = is_dark;
        self.profile()
    }

    pub fn toggle(&mut self) -> LightingProfile {
        self.set(!self.is_dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_alternates_between_presets() {
        let mut t = ThemeState::new(false);
        assert_eq!(t.toggle(), lighting_profile(true));
        assert!(t.is_dark);
        assert_eq!(t.toggle(), lighting_profile(false));
        assert!(!t.is_dark);
    }

    #[test]
    fn light_direction_points_up_and_towards_viewer() {
        let d = lighting_profile(false).light_direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!(d.y > 0.0 && d.z > 0.0);
    }
}
