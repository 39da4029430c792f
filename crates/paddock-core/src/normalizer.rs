//! Geometry normalization
//!
//! Turns a cached scene graph into an independently owned presentation copy
//! that is unrotated, centered on the origin, and carries a measured extent.
//! The cached graph behind the `AssetHandle` is only ever read.

use glam::{Quat, Vec3};
use thiserror::Error;
use tracing::debug;

use crate::asset_source::AssetHandle;
use crate::scene_graph::SceneGraph;

/// Padding applied to the largest bounding axis
pub const EXTENT_PADDING: f32 = 1.2;
/// Metalness for surfaces whose asset left it unspecified
pub const DEFAULT_METALNESS: f32 = 0.3;
/// Roughness for surfaces whose asset left it unspecified
pub const DEFAULT_ROUGHNESS: f32 = 0.7;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error("model has no geometry")]
    EmptyGeometry,
    #[error("model has degenerate bounds {size:?}")]
    Degenerate { size: [f32; 3] },
}

/// Largest padded bounding axis of a normalized model; always finite and positive
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Extent(f32);

impl Extent {
    pub fn new(value: f32) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    /// Padded extent of a bounding box with the given per-axis size
    pub fn from_size(size: Vec3) -> Option<Self> {
        if !size.is_finite() {
            return None;
        }
        Self::new(size.max_element() * EXTENT_PADDING)
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

/// Output of normalization, ready to become a presentation instance
#[derive(Debug, Clone)]
pub struct NormalizedModel {
    pub graph: SceneGraph,
    pub extent: Extent,
    /// Bounding center before recentering
    pub source_center: Vec3,
    /// Bounding size of the unrotated model
    pub size: Vec3,
}

pub fn normalize(handle: &AssetHandle) -> Result<NormalizedModel, NormalizationError> {
    let model = normalize_graph(handle.graph())?;
    debug!(
        path = handle.path(),
        extent = model.extent.value(),
        "Normalized model"
    );
    Ok(model)
}

/// Normalize a deep copy of `source`, leaving `source` untouched.
///
/// Root rotation and translation are discarded before measuring; root scale
/// is kept. Materials are flagged for rebuild, missing PBR parameters are
/// backfilled and every surface casts and receives shadows.
pub fn normalize_graph(source: &SceneGraph) -> Result<NormalizedModel, NormalizationError> {
    let mut graph = source.clone();
    graph.root.transform.rotation = Quat::IDENTITY;
    graph.root.transform.translation = Vec3::ZERO;

    let bounds = graph.bounds().ok_or(NormalizationError::EmptyGeometry)?;
    let center = bounds.center();
    let size = bounds.size();
    let extent = Extent::from_size(size).ok_or(NormalizationError::Degenerate {
        size: size.to_array(),
    })?;
    if !center.is_finite() {
        return Err(NormalizationError::Degenerate {
            size: size.to_array(),
        });
    }

    graph.root.transform.translation = -center;

    graph.for_each_surface_mut(|surface| {
        let material = &mut surface.material;
        material.needs_update = true;
        material.metallic.get_or_insert(DEFAULT_METALNESS);
        material.roughness.get_or_insert(DEFAULT_ROUGHNESS);
        material.cast_shadows = true;
        material.receive_shadows = true;
    });

    Ok(NormalizedModel {
        graph,
        extent,
        source_center: center,
        size,
    })
}
