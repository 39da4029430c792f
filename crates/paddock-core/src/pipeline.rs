//! Load-then-normalize for a single navigation transition

use std::future::Future;

use thiserror::Error;
use tracing::debug;

use crate::asset_source::{AssetSource, LoadError};
use crate::navigation::Generation;
use crate::normalizer::{normalize, NormalizationError, NormalizedModel};

#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

/// Work the session asks its caller to run after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub generation: Generation,
    pub path: String,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub request: PipelineRequest,
    pub result: Result<NormalizedModel, PipelineError>,
}

/// Resolve the request's asset and normalize it.
///
/// The returned future owns everything it needs, so it can be spawned on a
/// runtime while the session keeps running on the main loop.
pub fn run(
    source: &AssetSource,
    request: PipelineRequest,
) -> impl Future<Output = PipelineOutcome> + Send + 'static {
    let pending = source.load(&request.path);
    async move {
        debug!(generation = %request.generation, path = %request.path, "Pipeline run started");
        let result = match pending.await {
            Ok(handle) => normalize(&handle).map_err(PipelineError::from),
            Err(e) => Err(PipelineError::from(e)),
        };
        PipelineOutcome { request, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::{SceneGraph, SceneNode};
    use crate::testing::{catalogue_loader, MemoryLoader};
    use std::sync::Arc;

    fn request(path: &str) -> PipelineRequest {
        PipelineRequest {
            generation: Generation::default().next(),
            path: path.to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_produces_normalized_model() {
        let source = AssetSource::new(Arc::new(catalogue_loader()));
        let outcome = run(&source, request("b2")).await;

        assert_eq!(outcome.request, request("b2"));
        let model = outcome.result.unwrap();
        assert!(model.graph.bounds().unwrap().center().length() < 1e-4);
    }

    #[tokio::test]
    async fn test_run_reports_load_failure() {
        let source = AssetSource::new(Arc::new(MemoryLoader::new()));
        let outcome = run(&source, request("ghost")).await;
        assert!(matches!(outcome.result, Err(PipelineError::Load(_))));
    }

    #[tokio::test]
    async fn test_run_reports_normalization_failure() {
        let loader = MemoryLoader::new().with_graph("hollow", SceneGraph::new(SceneNode::named("hollow")));
        let source = AssetSource::new(Arc::new(loader));
        let outcome = run(&source, request("hollow")).await;
        assert!(matches!(
            outcome.result,
            Err(PipelineError::Normalization(NormalizationError::EmptyGeometry))
        ));
    }

    #[tokio::test]
    async fn test_run_can_be_spawned() {
        let source = AssetSource::new(Arc::new(catalogue_loader()));
        let outcome = tokio::spawn(run(&source, request("a1"))).await.unwrap();
        assert!(outcome.result.is_ok());
    }
}
