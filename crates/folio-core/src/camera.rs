//! Perspective camera and damped orbit controls.
//!
//! The orbit model keeps the eye on a sphere around `target`. Input only adds
//! to pending deltas; [`OrbitCamera::update`] applies a damped share of those
//! deltas once per frame and writes the resulting eye back into the camera.

use crate::config::{CameraConfig, OrbitConfig};
use crate::constants::ORBIT_POLAR_EPSILON;
use crate::picking::Ray;
use glam::{Mat4, Vec2, Vec3, Vec4};
use std::f32::consts::{PI, TAU};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn from_config(cfg: &CameraConfig, aspect: f32) -> Self {
        Self {
            eye: cfg.eye,
            target: cfg.target,
            up: Vec3::Y,
            aspect,
            fovy_radians: cfg.fovy_degrees.to_radians(),
            znear: cfg.znear,
            zfar: cfg.zfar,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray from the eye through an NDC point.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let far: Vec3 = far.truncate() / far.w;
        Ray::new(self.eye, far - self.eye)
    }

    /// Unit vectors spanning the view plane, used for camera-facing sprites.
    pub fn billboard_axes(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.eye).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward);
        (right, up)
    }
}

/// Spherical offset of the eye relative to the orbit target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Angle from +Y.
    pub polar: f32,
    /// Angle around +Y, measured from +Z.
    pub azimuth: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self { radius: 0.0, polar: 0.0, azimuth: 0.0 };
        }
        Self {
            radius,
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let s = self.polar.sin() * self.radius;
        Vec3::new(s * self.azimuth.sin(), self.polar.cos() * self.radius, s * self.azimuth.cos())
    }
}

#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub camera: Camera,
    cfg: OrbitConfig,
    spherical: Spherical,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_scale: f32,
}

impl OrbitCamera {
    pub fn new(camera: Camera, cfg: OrbitConfig) -> Self {
        let spherical = Spherical::from_offset(camera.eye - camera.target);
        let mut orbit = Self {
            camera,
            cfg,
            spherical,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_scale: 1.0,
        };
        orbit.update();
        orbit
    }

    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    /// Queue a rotation from a pointer drag of `dx`/`dy` pixels.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let k = TAU * self.cfg.rotate_speed / viewport_height;
        self.pending_azimuth -= dx * k;
        self.pending_polar -= dy * k;
    }

    /// Queue a zoom step from a wheel delta. Positive deltas move away from the target.
    pub fn zoom(&mut self, delta_y: f32) {
        if delta_y > 0.0 {
            self.pending_scale /= self.cfg.zoom_step;
        } else if delta_y < 0.0 {
            self.pending_scale *= self.cfg.zoom_step;
        }
    }

    /// Apply one damped step. Returns true while rotation is still settling.
    pub fn update(&mut self) -> bool {
        let damping = self.cfg.damping_factor;
        let s = &mut self.spherical;
        s.azimuth = (s.azimuth + self.pending_azimuth * damping) % TAU;
        s.polar = (s.polar + self.pending_polar * damping)
            .clamp(ORBIT_POLAR_EPSILON, PI - ORBIT_POLAR_EPSILON);
        s.radius = (s.radius * self.pending_scale)
            .clamp(self.cfg.min_distance, self.cfg.max_distance);

        self.pending_azimuth *= 1.0 - damping;
        self.pending_polar *= 1.0 - damping;
        self.pending_scale = 1.0;

        self.camera.eye = self.camera.target + s.to_offset();
        self.pending_azimuth.abs() > 1e-6 || self.pending_polar.abs() > 1e-6
    }
}
