//! Asset source with path-keyed memoization
//!
//! Every catalogue path is loaded at most once per process. Concurrent
//! requests for the same path share a single in-flight load, and the loaded
//! scene graph is handed out as an `AssetHandle` that consumers can only
//! read. Handles are never evicted; the catalogue is bounded.
//!
//! A failed load is not memoized: the next explicit `load` for that path
//! issues a fresh fetch. Nothing retries on its own.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalogue::Catalogue;
use crate::scene_graph::SceneGraph;

#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: Arc<std::io::Error>,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("{path} contains no scene")]
    NoScene { path: String },
    #[error("load of {path} was aborted")]
    Aborted { path: String },
}

impl LoadError {
    pub fn path(&self) -> &str {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::NoScene { path }
            | LoadError::Aborted { path } => path,
        }
    }
}

/// Capability that turns a path into a scene graph
pub trait AssetLoader: Send + Sync + 'static {
    fn load(&self, path: &str) -> BoxFuture<'static, Result<SceneGraph, LoadError>>;
}

/// Shared, read-only scene graph for one catalogue path
#[derive(Clone)]
pub struct AssetHandle {
    path: Arc<str>,
    graph: Arc<SceneGraph>,
}

impl AssetHandle {
    pub fn new(path: impl Into<Arc<str>>, graph: SceneGraph) -> Self {
        Self {
            path: path.into(),
            graph: Arc::new(graph),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// True when both handles point at the same cached scene graph
    pub fn ptr_eq(&self, other: &AssetHandle) -> bool {
        Arc::ptr_eq(&self.graph, &other.graph)
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("path", &self.path)
            .field("vertices", &self.graph.vertex_count())
            .finish()
    }
}

/// Future resolving to the cached handle for one path
pub type PendingAsset = Shared<BoxFuture<'static, Result<AssetHandle, LoadError>>>;

/// Cache state of a single path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    Absent,
    Pending,
    Loaded,
    Failed,
}

pub struct AssetSource {
    loader: Arc<dyn AssetLoader>,
    entries: Mutex<HashMap<String, PendingAsset>>,
}

impl AssetSource {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, PendingAsset>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve `path` to its cached handle, starting a load if needed.
    ///
    /// The returned future is `'static` and can be awaited on any executor.
    pub fn load(&self, path: &str) -> PendingAsset {
        let mut entries = self.entries();

        if let Some(existing) = entries.get(path) {
            match existing.peek() {
                Some(Err(_)) => debug!(path, "Previous load failed, fetching again"),
                Some(Ok(_)) => {
                    debug!(path, "Asset cache hit");
                    return existing.clone();
                }
                None => {
                    debug!(path, "Joining in-flight load");
                    return existing.clone();
                }
            }
        }

        info!(path, "Starting asset load");
        let key: Arc<str> = Arc::from(path);
        let fetch = self.loader.load(path);
        let pending = async move {
            let graph = fetch.await?;
            info!(path = %key, vertices = graph.vertex_count(), "Asset loaded");
            Ok::<_, LoadError>(AssetHandle {
                path: key,
                graph: Arc::new(graph),
            })
        }
        .boxed()
        .shared();

        entries.insert(path.to_string(), pending.clone());
        pending
    }

    /// Start loading `path` in the background without waiting for it.
    ///
    /// Must be called from within a Tokio runtime; otherwise the load is only
    /// registered and runs when first awaited.
    pub fn preload(&self, path: &str) {
        let pending = self.load(path);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let path = path.to_string();
                runtime.spawn(async move {
                    if let Err(e) = pending.await {
                        warn!(path = %path, error = %e, "Preload failed");
                    }
                });
            }
            Err(_) => warn!(path, "No async runtime available, preload deferred"),
        }
    }

    /// Warm every car of every team
    pub fn preload_catalogue(&self, catalogue: &Catalogue) {
        let mut count = 0;
        for path in catalogue.paths() {
            self.preload(path);
            count += 1;
        }
        info!(count, "Preloading catalogue");
    }

    pub fn state(&self, path: &str) -> AssetState {
        match self.entries().get(path).map(|pending| pending.peek()) {
            None => AssetState::Absent,
            Some(None) => AssetState::Pending,
            Some(Some(Ok(_))) => AssetState::Loaded,
            Some(Some(Err(_))) => AssetState::Failed,
        }
    }

    /// Number of paths with a cache entry (pending, loaded or failed)
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetSource")
            .field("entries", &self.len())
            .finish()
    }
}
