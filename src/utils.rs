use bevy::prelude::*;

pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Interpolation factor for a per-second `rate` over one frame, limited to 0 -> 1.
/// Non-finite products are treated as no movement, except +∞ which snaps.
pub fn lerp_factor(rate: f32, delta_seconds: f32) -> f32 {
    let factor = rate * delta_seconds;
    if factor.is_nan() {
        return 0.0;
    }
    clamp(factor, 0.0, 1.0)
}

/// Converts a world space position into the local space of `parent`, or returns it
/// unchanged for root entities.
pub fn world_to_local_translation(position: Vec3, parent: Option<&GlobalTransform>) -> Vec3 {
    match parent {
        Some(parent) => parent.compute_matrix().inverse().transform_point3(position),
        None => position,
    }
}

pub fn world_to_local_rotation(rotation: Quat, parent: Option<&GlobalTransform>) -> Quat {
    match parent {
        Some(parent) => (parent.compute_transform().rotation.inverse() * rotation).normalize(),
        None => rotation,
    }
}
