//! Scene setup - studio lighting

use bevy::prelude::*;

/// Relative intensities of the studio lights
const AMBIENT_INTENSITY: f32 = 0.7;
const KEY_INTENSITY: f32 = 1.0;
const FILL_INTENSITY: f32 = 0.5;

/// Photometric scale applied to the relative intensities
const AMBIENT_BRIGHTNESS_SCALE: f32 = 400.0;
const KEY_ILLUMINANCE_SCALE: f32 = 8_000.0;
const FILL_LUMENS_SCALE: f32 = 2_000_000.0;

const KEY_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);
const FILL_POSITION: Vec3 = Vec3::new(-10.0, -10.0, -10.0);

/// Marker component for the key (directional) light
#[derive(Component)]
pub struct KeyLight;

/// Marker component for the fill (point) light
#[derive(Component)]
pub struct FillLight;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_lighting);
    }
}

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: AMBIENT_INTENSITY * AMBIENT_BRIGHTNESS_SCALE,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: KEY_INTENSITY * KEY_ILLUMINANCE_SCALE,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(KEY_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        KeyLight,
    ));

    // The fill sits far enough out that range must cover the whole stage
    commands.spawn((
        PointLight {
            intensity: FILL_INTENSITY * FILL_LUMENS_SCALE,
            range: 100.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(FILL_POSITION),
        FillLight,
    ));
}
