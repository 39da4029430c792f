//! Shared fixtures for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt};
use glam::Vec3;

use crate::asset_source::{AssetLoader, LoadError};
use crate::catalogue::Catalogue;
use crate::scene_graph::{NodeTransform, SceneGraph, SceneNode, Surface};
use crate::stage::{InstanceId, PresentationInstance, Stage};

/// Eight-corner box surface spanning `min..max`
pub fn box_surface(min: Vec3, max: Vec3) -> Surface {
    let mut positions = Vec::with_capacity(8);
    for &x in &[min.x, max.x] {
        for &y in &[min.y, max.y] {
            for &z in &[min.z, max.z] {
                positions.push([x, y, z]);
            }
        }
    }
    Surface {
        name: Some("box".to_string()),
        positions,
        normals: Vec::new(),
        indices: Some(vec![
            0, 1, 3, 0, 3, 2, 4, 6, 7, 4, 7, 5, 0, 4, 5, 0, 5, 1, 2, 3, 7, 2, 7, 6, 0, 2, 6, 0,
            6, 4, 1, 5, 7, 1, 7, 3,
        ]),
        material: Default::default(),
    }
}

/// An off-center, rotated car-like model: body plus four wheels
pub fn car_graph(offset: Vec3, length: f32) -> SceneGraph {
    let half = length * 0.5;
    let mut body = SceneNode::named("body")
        .with_surface(box_surface(Vec3::new(-half, 0.2, -0.8), Vec3::new(half, 1.0, 0.8)));
    for (i, (x, z)) in [(-half, -0.9), (-half, 0.9), (half, -0.9), (half, 0.9)]
        .into_iter()
        .enumerate()
    {
        body = body.with_child(
            SceneNode::named(format!("wheel_{i}"))
                .with_transform(NodeTransform::from_translation(Vec3::new(x, 0.35, z)))
                .with_surface(box_surface(Vec3::splat(-0.35), Vec3::splat(0.35))),
        );
    }
    let root = SceneNode::named("car")
        .with_transform(
            NodeTransform::from_translation(offset)
                .with_rotation(glam::Quat::from_rotation_y(0.7)),
        )
        .with_child(body);
    SceneGraph::new(root)
}

/// Loader serving graphs from memory and counting how often each path is fetched
#[derive(Default)]
pub struct MemoryLoader {
    graphs: HashMap<String, SceneGraph>,
    failing: Mutex<HashSet<String>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
    total: Arc<AtomicUsize>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(mut self, path: &str, graph: SceneGraph) -> Self {
        self.graphs.insert(path.to_string(), graph);
        self
    }

    pub fn failing(self, path: &str) -> Self {
        self.failing.lock().unwrap().insert(path.to_string());
        self
    }

    pub fn set_failing(&self, path: &str, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(path.to_string());
        } else {
            set.remove(path);
        }
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

impl AssetLoader for MemoryLoader {
    fn load(&self, path: &str) -> BoxFuture<'static, Result<SceneGraph, LoadError>> {
        *self.calls.lock().unwrap().entry(path.to_string()).or_default() += 1;
        self.total.fetch_add(1, Ordering::SeqCst);

        let path = path.to_string();
        let result = if self.failing.lock().unwrap().contains(&path) {
            Err(LoadError::Parse {
                path: path.clone(),
                message: "corrupt asset".to_string(),
            })
        } else {
            self.graphs
                .get(&path)
                .cloned()
                .ok_or_else(|| LoadError::Io {
                    path: path.clone(),
                    source: Arc::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
                })
        };
        async move {
            tokio::task::yield_now().await;
            result
        }
        .boxed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    Attach(InstanceId),
    Detach(InstanceId),
}

/// Stage double that records every call and the peak number of attached instances
#[derive(Debug, Default)]
pub struct RecordingStage {
    pub attached: Vec<InstanceId>,
    pub events: Vec<StageEvent>,
    pub peak: usize,
}

impl Stage for RecordingStage {
    fn attach(&mut self, instance: &PresentationInstance) {
        self.attached.push(instance.id());
        self.events.push(StageEvent::Attach(instance.id()));
        self.peak = self.peak.max(self.attached.len());
    }

    fn detach(&mut self, id: InstanceId) {
        self.attached.retain(|attached| *attached != id);
        self.events.push(StageEvent::Detach(id));
    }
}

pub const TEST_CATALOGUE: &str = r##"
[[team]]
key = "a"
name = "Team A"
accent_color = "#112233"

[[team.car]]
name = "A1"
path = "a1"
year = 2021

[[team.car]]
name = "A2"
path = "a2"
year = 2022

[[team]]
key = "b"
name = "Team B"
accent_color = "#445566"

[[team.car]]
name = "B1"
path = "b1"
year = 2023

[[team.car]]
name = "B2"
path = "b2"
year = 2023

[[team.car]]
name = "B3"
path = "b3"
year = 2024
"##;

pub fn test_catalogue() -> Arc<Catalogue> {
    Arc::new(Catalogue::from_toml(TEST_CATALOGUE).unwrap())
}

/// Loader with a distinct model for every path in the test catalogue
pub fn catalogue_loader() -> MemoryLoader {
    let mut loader = MemoryLoader::new();
    for (i, path) in ["a1", "a2", "b1", "b2", "b3"].into_iter().enumerate() {
        let offset = Vec3::new(i as f32 * 3.0, 1.0 + i as f32, -2.0);
        loader = loader.with_graph(path, car_graph(offset, 4.0 + i as f32));
    }
    loader
}
