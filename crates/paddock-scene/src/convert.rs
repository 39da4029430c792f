//! Conversions from core geometry types into Bevy's math types
//!
//! Core and Bevy may resolve different `glam` versions, so values cross the
//! boundary as plain arrays.

use bevy::prelude::*;
use paddock_core::glam;

pub fn vec3(v: glam::Vec3) -> Vec3 {
    Vec3::from_array(v.to_array())
}

pub fn quat(q: glam::Quat) -> Quat {
    Quat::from_array(q.to_array())
}

pub fn transform(t: &paddock_core::NodeTransform) -> Transform {
    Transform {
        translation: vec3(t.translation),
        rotation: quat(t.rotation),
        scale: vec3(t.scale),
    }
}
