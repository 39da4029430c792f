//! Bevy application setup

use std::sync::Arc;

use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use paddock_core::{AssetSource, Catalogue, GltfLoader, ViewingSession};
use paddock_scene::PaddockScenePlugin;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::session::{PipelineRuntime, SessionPlugin, SessionState};
use crate::ui::UiPlugin;

pub fn run(config: Config, catalogue: Arc<Catalogue>, runtime: Runtime) -> AppExit {
    let loader = GltfLoader::new(&config.assets.root);
    let source = Arc::new(AssetSource::new(Arc::new(loader)));
    let pipeline = PipelineRuntime::new(runtime, source, config.assets.preload);
    let session = ViewingSession::new(catalogue, config.session_settings());

    App::new()
        .insert_resource(ClearColor(Color::WHITE))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: config.window.title.clone(),
                resolution: WindowResolution::new(config.window.width, config.window.height),
                ..default()
            }),
            ..default()
        }))
        // Picking must be added before EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(PaddockScenePlugin)
        .insert_resource(pipeline)
        .insert_resource(SessionState(session))
        .add_plugins(SessionPlugin)
        .add_plugins(UiPlugin)
        .run()
}
