//! Paddock Core - Viewing session controller
//!
//! This crate holds everything about browsing the vehicle catalogue that does
//! not depend on a particular rendering engine:
//! - Catalogue of teams and cars, loaded from TOML
//! - Engine-independent scene graph and glTF import
//! - Asset source that memoizes loaded scene graphs by path
//! - Geometry normalization into a centered, unrotated presentation copy
//! - Camera framing derived from the measured extent
//! - Rotation animator and navigation state machine
//! - The viewing session that owns all of the above and discards stale results

pub mod animator;
pub mod asset_source;
pub mod catalogue;
pub mod framing;
pub mod import;
pub mod navigation;
pub mod normalizer;
pub mod pipeline;
pub mod scene_graph;
pub mod session;
pub mod stage;

#[cfg(test)]
pub(crate) mod testing;

pub use glam;

pub use animator::SpinTask;
pub use asset_source::{AssetHandle, AssetLoader, AssetSource, AssetState, LoadError};
pub use catalogue::{CarDescriptor, CarSpecs, Catalogue, CatalogueError, RaceStats, Team};
pub use framing::{frame, CameraPose, OrbitLimits};
pub use import::GltfLoader;
pub use navigation::{Generation, NavigationState};
pub use normalizer::{normalize, Extent, NormalizationError, NormalizedModel};
pub use pipeline::{PipelineError, PipelineOutcome, PipelineRequest};
pub use scene_graph::{Aabb, NodeTransform, SceneGraph, SceneNode, Surface, SurfaceMaterial};
pub use session::{Completion, SessionError, SessionSettings, ViewStatus, ViewingSession};
pub use stage::{InstanceId, PresentationInstance, Stage};
