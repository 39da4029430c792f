//! Camera framing derived from a model's extent
//!
//! Pure functions: the same extent and field of view always produce the same
//! pose. The orbit control reads its distance limits from the pose only.

use glam::Vec3;

use crate::normalizer::Extent;

/// Fraction of the frustum the model should roughly fill
pub const FILL_RATIO: f32 = 0.38;
/// Horizontal angle of the framed camera around the Y axis
pub const AZIMUTH: f32 = std::f32::consts::FRAC_PI_4;
/// Camera height as a fraction of the extent
pub const ELEVATION_FACTOR: f32 = 0.35;
pub const NEAR_FACTOR: f32 = 0.01;
pub const FAR_FACTOR: f32 = 5.0;
pub const MIN_DISTANCE_FACTOR: f32 = 0.5;
pub const MAX_DISTANCE_FACTOR: f32 = 3.0;

pub const DEFAULT_FOV_DEGREES: f32 = 50.0;

/// Pose used until the first model has been measured
pub const FALLBACK_POSITION: Vec3 = Vec3::new(0.0, 1.4, 6.0);
pub const FALLBACK_NEAR: f32 = 0.1;
pub const FALLBACK_FAR: f32 = 1000.0;

/// Allowed orbit distance range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLimits {
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitLimits {
    pub const UNBOUNDED: Self = Self {
        min_distance: 0.0,
        max_distance: f32::INFINITY,
    };

    pub fn clamp(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from `position` to `target`
    pub distance: f32,
    pub limits: OrbitLimits,
}

impl CameraPose {
    pub fn fallback(fov_degrees: f32) -> Self {
        Self {
            position: FALLBACK_POSITION,
            target: Vec3::ZERO,
            fov: fov_degrees.to_radians(),
            near: FALLBACK_NEAR,
            far: FALLBACK_FAR,
            distance: FALLBACK_POSITION.length(),
            limits: OrbitLimits::UNBOUNDED,
        }
    }
}

/// Orbit distance at which a model of `extent` fills the view
pub fn framing_distance(extent: Extent, fov: f32) -> f32 {
    (extent.value() / (fov * 0.5).sin()).abs() * FILL_RATIO
}

/// Camera pose that frames a model of `extent`, looking at the origin
pub fn frame(extent: Extent, fov_degrees: f32) -> CameraPose {
    let fov = fov_degrees.to_radians();
    let distance = framing_distance(extent, fov);
    let position = Vec3::new(
        distance * AZIMUTH.sin(),
        extent.value() * ELEVATION_FACTOR,
        distance * AZIMUTH.cos(),
    );

    CameraPose {
        position,
        target: Vec3::ZERO,
        fov,
        near: distance * NEAR_FACTOR,
        far: distance * FAR_FACTOR,
        distance,
        limits: OrbitLimits {
            min_distance: extent.value() * MIN_DISTANCE_FACTOR,
            max_distance: extent.value() * MAX_DISTANCE_FACTOR,
        },
    }
}
