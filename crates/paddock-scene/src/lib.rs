//! Paddock Scene - Bevy side of the viewer
//!
//! Renders whatever the viewing session attaches: an orbit camera driven by
//! the session's framing, the fixed studio lighting, and a `Stage`
//! implementation that turns presentation instances into entity hierarchies.

pub mod camera;
pub mod convert;
pub mod scene;
pub mod stage;

use bevy::prelude::*;

/// Plugin that sets up camera, lighting and the presentation stage
pub struct PaddockScenePlugin;

impl Plugin for PaddockScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(stage::StagePlugin);
    }
}

pub use camera::{ActiveFraming, CameraSettings, MainCamera};
pub use stage::{PresentationRoot, SceneStage, StageRegistry};
