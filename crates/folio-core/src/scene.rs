//! CPU-side scene model.
//!
//! Geometry is flattened into world space at import time so that picking and
//! rendering share the same vertex data without per-object transforms.

use crate::constants::{
    rgb_from_hex, EMISSIVE_OFF_COLOR, EMISSIVE_OFF_INTENSITY, EMISSIVE_ON_COLOR,
    EMISSIVE_ON_INTENSITY,
};
use crate::picking::Aabb;
use fnv::FnvHashMap;
use glam::{Vec3, Vec4};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position: position.to_array(), normal: normal.to_array() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub base_color: Vec4,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self { base_color: Vec4::ONE, double_sided: false }
    }
}

/// Self-illumination added on top of lit color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emissive {
    pub color: Vec3,
    pub intensity: f32,
}

impl Emissive {
    pub fn from_hex(hex: u32, intensity: f32) -> Self {
        Self { color: rgb_from_hex(hex), intensity }
    }

    /// Highlight applied while the pickable object is activated.
    pub fn on() -> Self {
        Self::from_hex(EMISSIVE_ON_COLOR, EMISSIVE_ON_INTENSITY)
    }

    pub fn off() -> Self {
        Self::from_hex(EMISSIVE_OFF_COLOR, EMISSIVE_OFF_INTENSITY)
    }

    /// Color pre-multiplied by intensity, as the shader consumes it.
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

impl Default for Emissive {
    fn default() -> Self {
        Self::off()
    }
}

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
    pub material: Material,
    pub emissive: Emissive,
}

impl SceneObject {
    /// Build an object from world-space vertices. Bounds are derived here.
    ///
    /// Triangles referencing a vertex past the end of `vertices` are dropped,
    /// as is any trailing partial triangle.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        mut indices: Vec<u32>,
        material: Material,
        emissive: Emissive,
    ) -> Self {
        let len = vertices.len();
        if indices.len() % 3 != 0 || indices.iter().any(|&i| i as usize >= len) {
            let before = indices.len() / 3;
            indices = indices
                .chunks_exact(3)
                .filter(|tri| tri.iter().all(|&i| (i as usize) < len))
                .flatten()
                .copied()
                .collect();
            log::warn!(
                "[scene] dropped {} malformed triangles",
                before - indices.len() / 3
            );
        }
        let bounds = Aabb::from_points(vertices.iter().map(|v| Vec3::from_array(v.position)));
        Self { id: ObjectId(0), name: name.into(), vertices, indices, bounds, material, emissive }
    }

    /// Axis-aligned box with outward, counter-clockwise faces.
    pub fn cuboid(name: impl Into<String>, center: Vec3, half_extents: Vec3, material: Material) -> Self {
        // (normal, u, v) with u x v == normal
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (n, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = center + (n + u * su + v * sv) * half_extents;
                vertices.push(Vertex::new(p, n));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new(name, vertices, indices, material, Emissive::off())
    }

    #[inline]
    pub fn position(&self, index: u32) -> Vec3 {
        Vec3::from_array(self.vertices[index as usize].position)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    by_name: FnvHashMap<String, SmallVec<[ObjectId; 4]>>,
    bounds: Option<Aabb>,
}

impl Scene {
    pub fn from_objects(objects: impl IntoIterator<Item = SceneObject>) -> Self {
        let mut scene = Scene::default();
        for obj in objects {
            scene.push(obj);
        }
        scene
    }

    pub fn push(&mut self, mut obj: SceneObject) -> ObjectId {
        let id = ObjectId(self.objects.len());
        obj.id = id;
        self.by_name.entry(obj.name.clone()).or_default().push(id);
        if !obj.bounds.is_empty() {
            let b = self.bounds.get_or_insert(obj.bounds);
            b.min = b.min.min(obj.bounds.min);
            b.max = b.max.max(obj.bounds.max);
        }
        self.objects.push(obj);
        id
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    /// All objects carrying `name` (a glTF node with several primitives maps to several objects).
    pub fn ids_named(&self, name: &str) -> &[ObjectId] {
        self.by_name.get(name).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.ids_named(name).first().and_then(|id| self.object(*id))
    }

    /// Set emissive on every object named `name`. Returns how many were touched.
    pub fn set_emissive_named(&mut self, name: &str, emissive: Emissive) -> usize {
        let ids: SmallVec<[ObjectId; 4]> = self.ids_named(name).into();
        for id in &ids {
            if let Some(obj) = self.objects.get_mut(id.0) {
                obj.emissive = emissive;
            }
        }
        ids.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(SceneObject::triangle_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_has_expected_shape() {
        let b = SceneObject::cuboid("Box", Vec3::new(1.0, 2.0, 3.0), Vec3::splat(0.5), Material::default());
        assert_eq!(b.vertices.len(), 24);
        assert_eq!(b.triangle_count(), 12);
        assert_eq!(b.bounds.min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(b.bounds.max, Vec3::new(1.5, 2.5, 3.5));
    }

    #[test]
    fn push_assigns_sequential_ids_and_indexes_names() {
        let m = Material::default();
        let scene = Scene::from_objects([
            SceneObject::cuboid("Desk", Vec3::ZERO, Vec3::ONE, m.clone()),
            SceneObject::cuboid("Monitor", Vec3::Y * 2.0, Vec3::splat(0.3), m.clone()),
            SceneObject::cuboid("Monitor", Vec3::Y * 2.5, Vec3::splat(0.1), m),
        ]);
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.ids_named("Monitor"), &[ObjectId(1), ObjectId(2)]);
        assert!(scene.ids_named("monitor").is_empty());
        assert_eq!(scene.find_by_name("Desk").map(|o| o.id), Some(ObjectId(0)));
    }

    #[test]
    fn set_emissive_named_touches_only_matching_objects() {
        let m = Material::default();
        let mut scene = Scene::from_objects([
            SceneObject::cuboid("Desk", Vec3::ZERO, Vec3::ONE, m.clone()),
            SceneObject::cuboid("Monitor", Vec3::Y * 2.0, Vec3::splat(0.3), m),
        ]);
        assert_eq!(scene.set_emissive_named("Monitor", Emissive::on()), 1);
        assert_eq!(scene.find_by_name("Monitor").unwrap().emissive, Emissive::on());
        assert_eq!(scene.find_by_name("Desk").unwrap().emissive, Emissive::off());
    }

    #[test]
    fn new_drops_triangles_with_out_of_range_indices() {
        let vertices = vec![
            Vertex::new(Vec3::ZERO, Vec3::Z),
            Vertex::new(Vec3::X, Vec3::Z),
            Vertex::new(Vec3::Y, Vec3::Z),
        ];
        let obj = SceneObject::new(
            "Loose",
            vertices,
            vec![0, 1, 2, 0, 2, 7, 1, 2],
            Material::default(),
            Emissive::off(),
        );
        assert_eq!(obj.indices, vec![0, 1, 2]);
        for &i in &obj.indices {
            obj.position(i);
        }
    }

    #[test]
    fn emissive_presets_match_constants() {
        let on = Emissive::on();
        assert_eq!(on.intensity, 2.0);
        assert_eq!(on.color, rgb_from_hex(0x00aaff));
        let off = Emissive::off();
        assert_eq!(off.intensity, 0.0);
        assert_eq!(off.color, Vec3::ZERO);
        assert_eq!(off.radiance(), Vec3::ZERO);
    }
}
