//! Bevy glue around the viewing session
//!
//! The session lives in a resource and is only touched from systems on the
//! main schedule. Pipeline runs go to a Tokio runtime and their outcomes come
//! back over a channel that `receive_outcomes` drains once per frame.

use std::sync::Arc;

use bevy::prelude::*;
use paddock_core::pipeline;
use paddock_core::{
    AssetSource, Catalogue, Completion, PipelineOutcome, PipelineRequest, ViewingSession,
};
use paddock_scene::convert;
use paddock_scene::{ActiveFraming, PresentationRoot, SceneStage};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// User request coming from the UI or the keyboard
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    SelectTeam(String),
    Next,
    Previous,
    ToggleInfo,
}

/// The single viewing session of the app
#[derive(Resource)]
pub struct SessionState(pub ViewingSession);

/// Runs pipeline requests off the main loop
#[derive(Resource)]
pub struct PipelineRuntime {
    runtime: Runtime,
    source: Arc<AssetSource>,
    sender: UnboundedSender<PipelineOutcome>,
    receiver: UnboundedReceiver<PipelineOutcome>,
    preload: bool,
}

impl PipelineRuntime {
    pub fn new(runtime: Runtime, source: Arc<AssetSource>, preload: bool) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            runtime,
            source,
            sender,
            receiver,
            preload,
        }
    }

    pub fn dispatch(&self, request: PipelineRequest) {
        let run = pipeline::run(&self.source, request);
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let outcome = run.await;
            if sender.send(outcome).is_err() {
                tracing::debug!("Session gone, dropping pipeline outcome");
            }
        });
    }

    /// Start background loads for every car in `catalogue`
    pub fn preload_catalogue(&self, catalogue: &Catalogue) {
        let _guard = self.runtime.enter();
        self.source.preload_catalogue(catalogue);
    }

    fn try_recv(&mut self) -> Option<PipelineOutcome> {
        self.receiver.try_recv().ok()
    }
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<NavigationIntent>()
            .add_systems(Startup, start_session)
            .add_systems(
                Update,
                (
                    process_navigation,
                    receive_outcomes,
                    spin_presentation,
                    sync_framing,
                    teardown_session,
                )
                    .chain(),
            );
    }
}

fn start_session(
    mut session: ResMut<SessionState>,
    runtime: Res<PipelineRuntime>,
    mut stage: SceneStage,
) {
    if runtime.preload {
        runtime.preload_catalogue(session.0.catalogue());
    }
    let request = session.0.start(&mut stage);
    runtime.dispatch(request);
}

fn process_navigation(
    mut intents: MessageReader<NavigationIntent>,
    mut session: ResMut<SessionState>,
    runtime: Res<PipelineRuntime>,
    mut stage: SceneStage,
) {
    for intent in intents.read() {
        let request = match intent {
            NavigationIntent::SelectTeam(key) => match session.0.select_team(key, &mut stage) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!("{}", e);
                    continue;
                }
            },
            NavigationIntent::Next => session.0.next(&mut stage),
            NavigationIntent::Previous => session.0.previous(&mut stage),
            NavigationIntent::ToggleInfo => {
                session.0.toggle_info();
                continue;
            }
        };
        runtime.dispatch(request);
    }
}

fn receive_outcomes(
    mut runtime: ResMut<PipelineRuntime>,
    mut session: ResMut<SessionState>,
    mut stage: SceneStage,
) {
    while let Some(outcome) = runtime.try_recv() {
        match session.0.complete(outcome, &mut stage) {
            Completion::Applied(id) => tracing::debug!(instance = %id, "Presentation ready"),
            Completion::Discarded { .. } => {}
            Completion::Failed(e) => tracing::debug!(error = %e, "Showing failure overlay"),
        }
    }
}

fn spin_presentation(
    mut session: ResMut<SessionState>,
    mut roots: Query<(&PresentationRoot, &mut Transform)>,
) {
    let Some((id, rotation)) = session.0.tick() else {
        return;
    };
    for (root, mut transform) in &mut roots {
        if root.id == id {
            transform.rotation = convert::quat(rotation);
        }
    }
}

fn sync_framing(session: Res<SessionState>, mut framing: ResMut<ActiveFraming>) {
    framing.set_if_neq(ActiveFraming(*session.0.camera()));
}

fn teardown_session(
    mut exits: MessageReader<AppExit>,
    mut session: ResMut<SessionState>,
    mut stage: SceneStage,
) {
    if exits.read().next().is_some() {
        session.0.teardown(&mut stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::{BoxFuture, FutureExt};
    use paddock_core::{
        AssetLoader, LoadError, SceneGraph, SceneNode, SessionSettings, Surface, ViewStatus,
    };
    use paddock_scene::stage::StagePlugin;
    use paddock_scene::StageRegistry;
    use std::time::Duration;

    const CATALOGUE: &str = r##"
[[team]]
key = "rbr"
name = "Red Bull Racing"
accent_color = "#1E41FF"

[[team.car]]
name = "RB19"
path = "rb19"
year = 2023

[[team.car]]
name = "RB18"
path = "rb18"
year = 2022

[[team]]
key = "sf"
name = "Scuderia Ferrari"
accent_color = "#DC0000"

[[team.car]]
name = "SF-23"
path = "sf23"
year = 2023

[[team]]
key = "ghost"
name = "Ghost Racing"
accent_color = "#777777"

[[team.car]]
name = "G1"
path = "missing"
year = 2023
"##;

    /// Serves a single triangle for every path except "missing"
    struct TriangleLoader;

    impl AssetLoader for TriangleLoader {
        fn load(&self, path: &str) -> BoxFuture<'static, Result<SceneGraph, LoadError>> {
            let result = if path == "missing" {
                Err(LoadError::NoScene {
                    path: path.to_string(),
                })
            } else {
                let surface = Surface {
                    positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 1.0]],
                    ..Default::default()
                };
                Ok(SceneGraph::new(SceneNode::named(path).with_surface(surface)))
            };
            async move { result }.boxed()
        }
    }

    fn test_app() -> App {
        let catalogue = Arc::new(Catalogue::from_toml(CATALOGUE).unwrap());
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let source = Arc::new(AssetSource::new(Arc::new(TriangleLoader)));

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(StagePlugin)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<ActiveFraming>()
            .insert_resource(SessionState(ViewingSession::new(
                catalogue,
                SessionSettings::default(),
            )))
            .insert_resource(PipelineRuntime::new(runtime, source, true))
            .add_plugins(SessionPlugin);
        app
    }

    fn settle(app: &mut App) {
        for _ in 0..200 {
            app.update();
            if !app.world().resource::<SessionState>().0.status().is_loading() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("pipeline did not settle");
    }

    fn roots(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query::<&PresentationRoot>().iter(world).count()
    }

    #[test]
    fn test_startup_presents_first_car() {
        let mut app = test_app();
        settle(&mut app);

        let session = &app.world().resource::<SessionState>().0;
        assert!(matches!(session.status(), ViewStatus::Ready { .. }));
        assert_eq!(session.instance().unwrap().path(), "rb19");
        let camera = *session.camera();

        app.update();
        assert_eq!(app.world().resource::<ActiveFraming>().0, camera);
        assert_eq!(app.world().resource::<StageRegistry>().len(), 1);
        assert_eq!(roots(&mut app), 1);
    }

    #[test]
    fn test_navigation_replaces_presentation() {
        let mut app = test_app();
        settle(&mut app);

        app.world_mut().write_message(NavigationIntent::Next);
        settle(&mut app);
        assert_eq!(
            app.world().resource::<SessionState>().0.instance().unwrap().path(),
            "rb18"
        );

        app.world_mut()
            .write_message(NavigationIntent::SelectTeam("sf".to_string()));
        settle(&mut app);
        app.update();

        assert_eq!(
            app.world().resource::<SessionState>().0.instance().unwrap().path(),
            "sf23"
        );
        assert_eq!(app.world().resource::<StageRegistry>().len(), 1);
        assert_eq!(roots(&mut app), 1);
    }

    #[test]
    fn test_failed_load_keeps_navigation_live() {
        let mut app = test_app();
        settle(&mut app);

        app.world_mut()
            .write_message(NavigationIntent::SelectTeam("ghost".to_string()));
        settle(&mut app);
        assert!(matches!(
            app.world().resource::<SessionState>().0.status(),
            ViewStatus::Failed { .. }
        ));
        app.update();
        assert_eq!(roots(&mut app), 0);

        app.world_mut()
            .write_message(NavigationIntent::SelectTeam("rbr".to_string()));
        settle(&mut app);
        assert!(matches!(
            app.world().resource::<SessionState>().0.status(),
            ViewStatus::Ready { .. }
        ));
    }

    #[test]
    fn test_spin_rotates_presentation_root() {
        let mut app = test_app();
        settle(&mut app);
        for _ in 0..5 {
            app.update();
        }

        let world = app.world_mut();
        let transform = world
            .query_filtered::<&Transform, With<PresentationRoot>>()
            .single(world)
            .unwrap();
        assert!(transform.rotation.angle_between(Quat::IDENTITY) > 0.0);
    }

    #[test]
    fn test_exit_tears_down_session() {
        let mut app = test_app();
        settle(&mut app);

        app.world_mut().write_message(AppExit::Success);
        app.update();
        app.update();

        assert!(app.world().resource::<StageRegistry>().is_empty());
        assert_eq!(roots(&mut app), 0);
    }
}
