use bevy::prelude::*;

/// Angle in degrees between two vectors, signed by which side of the plane
/// `plane_normal` their cross product points to. Ranges from -180 to 180.
pub fn signed_angle(vector1: Vec3, vector2: Vec3, plane_normal: Vec3) -> f32 {
    if vector1.length_squared() < f32::EPSILON * f32::EPSILON
        || vector2.length_squared() < f32::EPSILON * f32::EPSILON
    {
        return 0.0;
    }
    let angle = vector1.angle_between(vector2).to_degrees();
    // Zero counts as positive
    let sign = if plane_normal.dot(vector1.cross(vector2)) < 0.0 {
        -1.0
    } else {
        1.0
    };
    angle * sign
}

/// Length of the part of `vector` pointing along `direction`.
pub fn scalar_projection(vector: Vec3, direction: Vec3) -> f32 {
    vector.dot(unit(direction))
}

/// `vector` with everything pointing along `direction` removed.
pub fn reject_along(vector: Vec3, direction: Vec3) -> Vec3 {
    let direction = unit(direction);
    vector - direction * vector.dot(direction)
}

/// The part of `vector` pointing along `direction`.
pub fn project_along(vector: Vec3, direction: Vec3) -> Vec3 {
    let direction = unit(direction);
    direction * vector.dot(direction)
}

/// Rotates `vector` by the shortest arc taking `up_direction` onto `plane_normal`.
pub fn rotate_onto_plane(vector: Vec3, plane_normal: Vec3, up_direction: Vec3) -> Vec3 {
    let from = up_direction.normalize_or_zero();
    let to = plane_normal.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return vector;
    }
    Quat::from_rotation_arc(from, to) * vector
}

pub fn project_point_onto_line(line_origin: Vec3, line_direction: Vec3, point: Vec3) -> Vec3 {
    line_origin + project_along(point - line_origin, line_direction)
}

/// Moves `current` toward `target` by at most `max_delta` without overshooting.
pub fn move_toward(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let to_target = target - current;
    let distance = to_target.length();
    let max_delta = max_delta.max(0.0);
    if distance <= max_delta || distance == 0.0 {
        return target;
    }
    current + to_target / distance * max_delta
}

pub fn increment_toward(current: Vec3, speed: f32, delta_seconds: f32, target: Vec3) -> Vec3 {
    move_toward(current, target, speed * delta_seconds)
}

/// Critically damped approach of `current` to `target`, roughly reaching it after
/// `smooth_time` seconds. `velocity` carries state between calls and must be kept
/// by the caller. Never overshoots the target.
pub fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    max_speed: f32,
    delta_seconds: f32,
) -> Vec3 {
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * delta_seconds;
    // Taylor approximation of e^-x
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let original_target = target;
    let mut change = current - target;
    if max_speed.is_finite() {
        change = change.clamp_length_max(max_speed.max(0.0) * smooth_time);
    }
    let target = current - change;

    let temp = (*velocity + omega * change) * delta_seconds;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (original_target - current).dot(output - original_target) > 0.0 {
        output = original_target;
        *velocity = Vec3::ZERO;
    }
    output
}

fn unit(direction: Vec3) -> Vec3 {
    if (direction.length_squared() - 1.0).abs() < 1e-6 {
        direction
    } else {
        direction.normalize_or_zero()
    }
}
