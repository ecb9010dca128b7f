//! Pointer to scene-object resolution.
//!
//! `pick` maps a pointer position to NDC, builds a world-space ray from the
//! camera and returns the nearest object whose triangles the ray hits.

use crate::camera::Camera;
use crate::scene::{ObjectId, Scene};
use glam::{Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Always unit length (or zero for a degenerate ray).
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir: dir.normalize_or_zero() }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb { min: Vec3::splat(f32::INFINITY), max: Vec3::splat(f32::NEG_INFINITY) };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |b, p| Aabb { min: b.min.min(p), max: b.max.max(p) })
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }
}

/// Client-space rectangle of the render surface (CSS pixels).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Map pointer pixels to normalized device coordinates. Positions outside the
/// viewport land outside [-1, 1]; that is not an error.
#[inline]
pub fn pointer_to_ndc(x: f32, y: f32, viewport: &Viewport) -> Option<Vec2> {
    if viewport.is_degenerate() {
        return None;
    }
    Some(Vec2::new(
        ((x - viewport.left) / viewport.width) * 2.0 - 1.0,
        -((y - viewport.top) / viewport.height) * 2.0 + 1.0,
    ))
}

/// Slab test. Returns the entry distance (clamped to 0 when the origin is inside).
#[inline]
pub fn ray_aabb(ray: &Ray, bounds: &Aabb) -> Option<f32> {
    if bounds.is_empty() {
        return None;
    }
    let inv = ray.dir.recip();
    let t0 = (bounds.min - ray.origin) * inv;
    let t1 = (bounds.max - ray.origin) * inv;
    let t_near = t0.min(t1).max_element();
    let t_far = t0.max(t1).min_element();
    if t_far < 0.0 || t_near > t_far || t_near.is_nan() || t_far.is_nan() {
        return None;
    }
    Some(t_near.max(0.0))
}

/// Möller–Trumbore intersection. Counter-clockwise triangles face the viewer;
/// back faces are rejected unless `double_sided`.
#[inline]
pub fn ray_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3, double_sided: bool) -> Option<f32> {
    const EPS: f32 = 1e-7;
    let e1 = b - a;
    let e2 = c - a;
    let p = ray.dir.cross(e2);
    let det = e1.dot(p);
    // det scales with triangle area, so the parallel test is relative to the edges.
    if det.abs() <= f32::EPSILON * e1.length() * e2.length() {
        return None;
    }
    if det < 0.0 && !double_sided {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = ray.dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t > EPS).then_some(t)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub object: ObjectId,
    pub distance: f32,
    pub point: Vec3,
}

/// Nearest hit along `ray` across every object in the scene.
pub fn raycast(ray: &Ray, scene: &Scene) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for obj in scene.objects() {
        let Some(entry) = ray_aabb(ray, &obj.bounds) else {
            continue;
        };
        if matches!(best, Some(h) if entry >= h.distance) {
            continue;
        }
        let double_sided = obj.material.double_sided;
        for tri in obj.indices.chunks_exact(3) {
            let a = obj.position(tri[0]);
            let b = obj.position(tri[1]);
            let c = obj.position(tri[2]);
            if let Some(t) = ray_triangle(ray, a, b, c, double_sided) {
                match best {
                    Some(h) if t >= h.distance => {}
                    _ => {
                        best = Some(Hit { object: obj.id, distance: t, point: ray.at(t) })
                    }
                }
            }
        }
    }
    best
}

/// Resolve a pointer position to the nearest object under it.
pub fn pick(
    pointer_x: f32,
    pointer_y: f32,
    viewport: &Viewport,
    camera: &Camera,
    scene: Option<&Scene>,
) -> Option<Hit> {
    let scene = scene?;
    let ndc = pointer_to_ndc(pointer_x, pointer_y, viewport)?;
    let ray = camera.ray_from_ndc(ndc);
    if ray.dir == Vec3::ZERO {
        return None;
    }
    raycast(&ray, scene)
}
