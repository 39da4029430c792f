//! glTF import into the engine-independent scene graph

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use glam::{Quat, Vec3};
use tracing::{debug, warn};

use crate::asset_source::{AssetLoader, LoadError};
use crate::scene_graph::{NodeTransform, SceneGraph, SceneNode, Surface, SurfaceMaterial};

/// Loads `.gltf` / `.glb` files relative to an asset root
#[derive(Debug, Clone)]
pub struct GltfLoader {
    root: PathBuf,
}

impl GltfLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for GltfLoader {
    fn load(&self, path: &str) -> BoxFuture<'static, Result<SceneGraph, LoadError>> {
        let full_path = self.root.join(path);
        let path = path.to_string();

        async move {
            let bytes = tokio::fs::read(&full_path).await.map_err(|e| LoadError::Io {
                path: path.clone(),
                source: Arc::new(e),
            })?;
            debug!(path = %path, bytes = bytes.len(), "Read model file");

            let base = full_path.parent().map(Path::to_path_buf);
            let parse_path = path.clone();
            tokio::task::spawn_blocking(move || parse_gltf(&parse_path, &bytes, base.as_deref()))
                .await
                .map_err(|_| LoadError::Aborted { path: path.clone() })?
        }
        .boxed()
    }
}

fn map_gltf_error(path: &str, error: gltf::Error) -> LoadError {
    match error {
        gltf::Error::Io(e) => LoadError::Io {
            path: path.to_string(),
            source: Arc::new(e),
        },
        other => LoadError::Parse {
            path: path.to_string(),
            message: other.to_string(),
        },
    }
}

/// Parse glTF bytes and convert the default scene (or the first one)
pub fn parse_gltf(path: &str, bytes: &[u8], base: Option<&Path>) -> Result<SceneGraph, LoadError> {
    let gltf = gltf::Gltf::from_slice(bytes).map_err(|e| map_gltf_error(path, e))?;
    let gltf::Gltf { document, blob } = gltf;
    let buffers =
        gltf::import_buffers(&document, base, blob).map_err(|e| map_gltf_error(path, e))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LoadError::NoScene {
            path: path.to_string(),
        })?;

    let mut root = SceneNode {
        name: scene.name().map(str::to_string),
        ..Default::default()
    };
    for node in scene.nodes() {
        root.children.push(convert_node(path, &node, &buffers));
    }
    Ok(SceneGraph::new(root))
}

fn convert_node(path: &str, node: &gltf::Node, buffers: &[gltf::buffer::Data]) -> SceneNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let mut converted = SceneNode {
        name: node.name().map(str::to_string),
        transform: NodeTransform {
            translation: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from_array(scale),
        },
        surfaces: Vec::new(),
        children: Vec::new(),
    };

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!(path, mode = ?primitive.mode(), "Skipping non-triangle primitive");
                continue;
            }
            if let Some(surface) = convert_primitive(mesh.name(), &primitive, buffers) {
                converted.surfaces.push(surface);
            }
        }
    }

    for child in node.children() {
        converted.children.push(convert_node(path, &child, buffers));
    }
    converted
}

fn convert_primitive(
    mesh_name: Option<&str>,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Option<Surface> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals = reader
        .read_normals()
        .map(|normals| normals.collect::<Vec<_>>())
        .filter(|normals| normals.len() == positions.len())
        .unwrap_or_default();
    let indices = reader
        .read_indices()
        .map(|indices| indices.into_u32().collect());

    let material = primitive.material();
    let pbr = material.pbr_metallic_roughness();
    // The implicit default material carries no authored PBR values
    let authored = material.index().is_some();

    Some(Surface {
        name: mesh_name.map(str::to_string),
        positions,
        normals,
        indices,
        material: SurfaceMaterial {
            base_color: pbr.base_color_factor(),
            metallic: authored.then(|| pbr.metallic_factor()),
            roughness: authored.then(|| pbr.roughness_factor()),
            ..Default::default()
        },
    })
}
