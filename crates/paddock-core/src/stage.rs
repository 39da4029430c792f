//! Presentation instances and the render-tree seam they attach to

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Quat;

use crate::normalizer::{Extent, NormalizedModel};
use crate::scene_graph::SceneGraph;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a presentation instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance-{}", self.0)
    }
}

/// A normalized, independently owned copy of one catalogue model.
///
/// `orientation` is a presentation-only yaw applied on top of the graph's
/// root transform; the graph itself never changes after construction.
#[derive(Debug, Clone)]
pub struct PresentationInstance {
    id: InstanceId,
    path: String,
    graph: SceneGraph,
    extent: Extent,
    orientation: Quat,
}

impl PresentationInstance {
    pub fn new(path: impl Into<String>, model: NormalizedModel) -> Self {
        Self {
            id: InstanceId::next(),
            path: path.into(),
            graph: model.graph,
            extent: model.extent,
            orientation: Quat::IDENTITY,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub(crate) fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
    }
}

/// Render tree that presentation instances are attached to.
///
/// The session guarantees that `detach` of the previous instance always
/// precedes `attach` of the next one.
pub trait Stage {
    fn attach(&mut self, instance: &PresentationInstance);
    fn detach(&mut self, id: InstanceId);
}
