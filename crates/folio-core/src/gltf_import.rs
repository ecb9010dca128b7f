//! glTF/GLB import into the flattened [`Scene`] model.
//!
//! Loading is split in two so the host can do its own I/O: [`parse`] the
//! document, fetch whatever [`external_buffer_uris`] reports, then hand both
//! to [`import_scene`]. GLB blobs and `data:` URIs need no extra fetches.

use crate::error::{Result, ViewerError};
use crate::scene::{Emissive, Material, Scene, SceneObject, Vertex};
use fnv::FnvHashMap;
use glam::{Mat3, Mat4, Vec3, Vec4};
use gltf::buffer::Source;

/// Bytes for external buffer URIs, keyed by the URI exactly as written in the document.
pub type ExternalBuffers = FnvHashMap<String, Vec<u8>>;

pub fn parse(bytes: &[u8]) -> Result<gltf::Gltf> {
    Ok(gltf::Gltf::from_slice(bytes)?)
}

#[inline]
pub fn is_data_uri(uri: &str) -> bool {
    uri.starts_with("data:")
}

/// URIs of buffers that live outside the document (neither GLB blob nor `data:`).
pub fn external_buffer_uris(document: &gltf::Document) -> Vec<String> {
    document
        .buffers()
        .filter_map(|b| match b.source() {
            Source::Uri(uri) if !is_data_uri(uri) => Some(uri.to_string()),
            _ => None,
        })
        .collect()
}

/// Resolve a buffer URI against the directory of the model path.
pub fn resolve_relative(model_path: &str, uri: &str) -> String {
    if uri.starts_with('/') || uri.contains("://") {
        return uri.to_string();
    }
    match model_path.rfind('/') {
        Some(i) => format!("{}{}", &model_path[..=i], uri),
        None => uri.to_string(),
    }
}

/// Build a [`Scene`] from a parsed document and any externally fetched buffers.
pub fn import_scene(gltf: gltf::Gltf, external: &ExternalBuffers) -> Result<Scene> {
    let gltf::Gltf { document, blob } = gltf;
    let buffers = load_buffers(&document, blob, external)?;

    let root = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(ViewerError::EmptyScene)?;

    let mut scene = Scene::default();
    for node in root.nodes() {
        visit_node(&node, Mat4::IDENTITY, &buffers, &mut scene)?;
    }
    if scene.is_empty() {
        return Err(ViewerError::EmptyScene);
    }
    log::info!(
        "[scene] imported {} objects, {} triangles",
        scene.len(),
        scene.triangle_count()
    );
    Ok(scene)
}

fn load_buffers(
    document: &gltf::Document,
    blob: Option<Vec<u8>>,
    external: &ExternalBuffers,
) -> Result<Vec<Vec<u8>>> {
    if external_buffer_uris(document).is_empty() {
        // Only GLB blobs and data URIs: the gltf crate resolves these itself.
        let data = gltf::import_buffers(document, None, blob)?;
        return Ok(data.into_iter().map(|d| d.0).collect());
    }

    let mut blob = blob;
    let mut out = Vec::with_capacity(document.buffers().len());
    for buffer in document.buffers() {
        let index = buffer.index();
        let bytes = match buffer.source() {
            Source::Bin => blob.take().ok_or_else(|| ViewerError::MissingBuffer {
                index,
                uri: "<glb blob>".into(),
            })?,
            Source::Uri(uri) => external
                .get(uri)
                .cloned()
                .ok_or_else(|| ViewerError::MissingBuffer { index, uri: uri.to_string() })?,
        };
        if bytes.len() < buffer.length() {
            return Err(ViewerError::BufferTooShort {
                index,
                expected: buffer.length(),
                actual: bytes.len(),
            });
        }
        out.push(bytes);
    }
    Ok(out)
}

fn visit_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[Vec<u8>],
    scene: &mut Scene,
) -> Result<()> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        let name = node.name().or_else(|| mesh.name()).unwrap_or_default();
        for (i, prim) in mesh.primitives().enumerate() {
            if let Some(obj) = import_primitive(name, i, &prim, world, buffers)? {
                scene.push(obj);
            }
        }
    }
    for child in node.children() {
        visit_node(&child, world, buffers, scene)?;
    }
    Ok(())
}

fn import_primitive(
    name: &str,
    index: usize,
    prim: &gltf::Primitive<'_>,
    world: Mat4,
    buffers: &[Vec<u8>],
) -> Result<Option<SceneObject>> {
    if !matches!(prim.mode(), gltf::mesh::Mode::Triangles) {
        log::warn!("[scene] skipping non-triangle primitive {} of `{}`", index, name);
        return Ok(None);
    }
    let reader = prim.reader(|b| buffers.get(b.index()).map(|d| d.as_slice()));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .ok_or_else(|| ViewerError::MissingPositions { mesh: name.to_string(), primitive: index })?
        .map(|p| world.transform_point3(Vec3::from_array(p)))
        .collect();

    let mut indices: Vec<u32> = match reader.read_indices() {
        Some(read) => read.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    indices.truncate(indices.len() / 3 * 3);
    if indices.iter().any(|&i| i as usize >= positions.len()) {
        log::warn!("[scene] primitive {} of `{}` has out-of-range indices", index, name);
        return Ok(None);
    }
    // A mirroring transform flips winding; restore counter-clockwise front faces.
    if world.determinant() < 0.0 {
        for tri in indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let normals: Option<Vec<Vec3>> = reader
        .read_normals()
        .map(|it| it.map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero()).collect());

    let (vertices, indices) = match normals {
        Some(normals) if normals.len() == positions.len() => {
            let vertices = positions.iter().zip(&normals).map(|(p, n)| Vertex::new(*p, *n)).collect();
            (vertices, indices)
        }
        _ => flat_shaded(&positions, &indices),
    };

    let material = prim.material();
    let emissive_color = Vec3::from_array(material.emissive_factor());
    let emissive = Emissive {
        color: emissive_color,
        intensity: if emissive_color == Vec3::ZERO { 0.0 } else { 1.0 },
    };
    let material = Material {
        base_color: Vec4::from_array(material.pbr_metallic_roughness().base_color_factor()),
        double_sided: material.double_sided(),
    };
    log::debug!("[scene] `{}` primitive {}: {} tris", name, index, indices.len() / 3);
    Ok(Some(SceneObject::new(name, vertices, indices, material, emissive)))
}

/// Expand indexed triangles so each face gets its own geometric normal.
fn flat_shaded(positions: &[Vec3], indices: &[u32]) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(indices.len());
    for tri in indices.chunks_exact(3) {
        let a = positions[tri[0] as usize];
        let b = positions[tri[1] as usize];
        let c = positions[tri[2] as usize];
        let n = (b - a).cross(c - a).normalize_or_zero();
        vertices.extend([Vertex::new(a, n), Vertex::new(b, n), Vertex::new(c, n)]);
    }
    let indices = (0..vertices.len() as u32).collect();
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_uris_resolve_next_to_model() {
        assert_eq!(
            resolve_relative("./modelo/escritorio/portafolio.gltf", "portafolio.bin"),
            "./modelo/escritorio/portafolio.bin"
        );
        assert_eq!(resolve_relative("scene.gltf", "scene.bin"), "scene.bin");
        assert_eq!(
            resolve_relative("./a/b.gltf", "https://cdn.example/x.bin"),
            "https://cdn.example/x.bin"
        );
        assert_eq!(resolve_relative("./a/b.gltf", "/abs/x.bin"), "/abs/x.bin");
    }

    #[test]
    fn flat_shading_expands_and_orients_normals() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let (v, i) = flat_shaded(&positions, &[0, 1, 2]);
        assert_eq!(v.len(), 3);
        assert_eq!(i, vec![0, 1, 2]);
        assert_eq!(Vec3::from_array(v[0].normal), Vec3::Z);
    }

    #[test]
    fn data_uris_are_not_external() {
        assert!(is_data_uri("data:application/octet-stream;base64,AAAA"));
        assert!(!is_data_uri("scene.bin"));
    }
}
