//! Camera controls and orbit navigation
//!
//! The orbit always looks at the origin, where the normalized model sits.
//! Distance limits come only from the framing pose the session publishes.

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use paddock_core::framing::DEFAULT_FOV_DEGREES;
use paddock_core::{CameraPose, OrbitLimits};

use crate::convert;

/// Elevation is kept just short of the poles
const MAX_ELEVATION: f32 = 1.5;
/// Pixel scroll deltas per line step
const PIXELS_PER_LINE: f32 = 100.0;

/// Camera pose published by the viewing session
#[derive(Debug, Clone, PartialEq, Resource)]
pub struct ActiveFraming(pub CameraPose);

impl Default for ActiveFraming {
    fn default() -> Self {
        Self(CameraPose::fallback(DEFAULT_FOV_DEGREES))
    }
}

/// Orbit controller state
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub limits: OrbitLimits,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        let mut settings = Self {
            distance: 0.0,
            target_distance: 0.0,
            azimuth: 0.0,
            elevation: 0.0,
            limits: OrbitLimits::UNBOUNDED,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
        };
        settings.snap_to(&ActiveFraming::default().0);
        settings
    }
}

impl CameraSettings {
    /// Jump straight to `pose`, dropping any zoom in progress
    pub fn snap_to(&mut self, pose: &CameraPose) {
        let offset = pose.position - pose.target;
        let distance = offset.length();
        self.azimuth = offset.x.atan2(offset.z);
        self.elevation = if distance > 0.0 {
            (offset.y / distance).clamp(-1.0, 1.0).asin()
        } else {
            0.0
        };
        self.distance = distance;
        self.target_distance = distance;
        self.limits = pose.limits;
    }

    /// Camera offset from the orbit target (Y up)
    pub fn offset(&self) -> Vec3 {
        Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        )
    }

    fn zoom(&mut self, factor: f32) {
        self.target_distance = self.limits.clamp(self.target_distance * factor);
    }

    fn orbit(&mut self, delta: Vec2) {
        self.azimuth -= delta.x * self.sensitivity;
        self.elevation =
            (self.elevation - delta.y * self.sensitivity).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .init_resource::<ActiveFraming>()
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (
                    apply_framing.run_if(resource_changed::<ActiveFraming>),
                    update_camera,
                )
                    .chain(),
            );
    }
}

fn spawn_camera(mut commands: Commands, framing: Res<ActiveFraming>) {
    let pose = &framing.0;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: pose.fov,
            near: pose.near,
            far: pose.far,
            ..default()
        }),
        Transform::from_translation(convert::vec3(pose.position))
            .looking_at(convert::vec3(pose.target), Vec3::Y),
        MainCamera,
    ));
}

/// Reset orbit and projection whenever the session publishes a new pose
fn apply_framing(
    framing: Res<ActiveFraming>,
    mut settings: ResMut<CameraSettings>,
    mut projections: Query<&mut Projection, With<MainCamera>>,
) {
    let pose = &framing.0;
    settings.snap_to(pose);

    for mut projection in &mut projections {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.fov = pose.fov;
            perspective.near = pose.near;
            perspective.far = pose.far;
        }
    }
    tracing::debug!(
        distance = settings.distance,
        near = pose.near,
        far = pose.far,
        "Applied camera framing"
    );
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    mut contexts: bevy_egui::EguiContexts,
) {
    // Don't steal input from egui panels
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    if !egui_wants_pointer {
        if mouse_button.pressed(MouseButton::Left) {
            settings.orbit(mouse_motion.delta);
        }

        let scroll = match mouse_scroll.unit {
            MouseScrollUnit::Line => mouse_scroll.delta.y,
            MouseScrollUnit::Pixel => mouse_scroll.delta.y / PIXELS_PER_LINE,
        };
        if scroll != 0.0 {
            let factor = 1.0 - scroll * settings.zoom_speed;
            settings.zoom(factor.max(0.1));
        }

        let touches: Vec<_> = touch_input.iter().collect();
        match touches.as_slice() {
            [touch] => settings.orbit(touch.delta()),
            [t1, t2] => {
                let curr_dist = t1.position().distance(t2.position());
                let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
                settings.zoom(prev_dist / curr_dist.max(1.0));
            }
            _ => {}
        }
    }

    let dt = time.delta_secs();
    let lerp_factor = 1.0 - (-settings.smooth_factor * 60.0 * dt).exp();
    settings.distance += (settings.target_distance - settings.distance) * lerp_factor;

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = settings.offset();
        transform.look_at(Vec3::ZERO, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_core::{frame, Extent};

    #[test]
    fn test_snap_reproduces_pose_position() {
        let pose = frame(Extent::new(6.0).unwrap(), 50.0);
        let mut settings = CameraSettings::default();
        settings.snap_to(&pose);

        let offset = settings.offset();
        assert!(offset.abs_diff_eq(convert::vec3(pose.position), 1e-4));
        assert_eq!(settings.limits, pose.limits);
        assert_eq!(settings.distance, settings.target_distance);
    }

    #[test]
    fn test_default_matches_fallback_pose() {
        let settings = CameraSettings::default();
        assert!(settings.offset().abs_diff_eq(Vec3::new(0.0, 1.4, 6.0), 1e-4));
        assert_eq!(settings.limits, OrbitLimits::UNBOUNDED);
    }

    #[test]
    fn test_zoom_respects_framing_limits() {
        let pose = frame(Extent::new(4.0).unwrap(), 50.0);
        let mut settings = CameraSettings::default();
        settings.snap_to(&pose);

        settings.zoom(0.01);
        assert_eq!(settings.target_distance, 2.0);
        settings.zoom(1_000.0);
        assert_eq!(settings.target_distance, 12.0);
    }

    #[test]
    fn test_orbit_clamps_elevation() {
        let mut settings = CameraSettings::default();
        settings.orbit(Vec2::new(0.0, -10_000.0));
        assert_eq!(settings.elevation, MAX_ELEVATION);
        settings.orbit(Vec2::new(0.0, 10_000.0));
        assert_eq!(settings.elevation, -MAX_ELEVATION);
    }

    #[test]
    fn test_framing_change_updates_projection() {
        let mut app = App::new();
        app.init_resource::<CameraSettings>()
            .init_resource::<ActiveFraming>()
            .add_systems(Update, apply_framing.run_if(resource_changed::<ActiveFraming>));
        let camera = app
            .world_mut()
            .spawn((Projection::Perspective(PerspectiveProjection::default()), MainCamera))
            .id();

        let pose = frame(Extent::new(6.0).unwrap(), 50.0);
        app.world_mut().resource_mut::<ActiveFraming>().0 = pose;
        app.update();

        let Projection::Perspective(perspective) = app.world().get::<Projection>(camera).unwrap()
        else {
            panic!("expected a perspective projection");
        };
        assert_eq!(perspective.near, pose.near);
        assert_eq!(perspective.far, pose.far);
        assert_eq!(app.world().resource::<CameraSettings>().limits, pose.limits);
    }
}
