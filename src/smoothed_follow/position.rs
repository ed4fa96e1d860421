use bevy::prelude::*;

use super::{default_target, parent_transform, resolve_target, FollowPhase};
use crate::utils;
use crate::vector_math;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothType {
    /// Frame-rate scaled linear interpolation at `lerp_speed`
    #[default]
    Lerp,
    /// Spring-like approach over `smooth_damp_time` seconds that never overshoots
    SmoothDamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PositionState {
    /// Smoothed position in world space
    current: Vec3,
    /// Local translation captured at initialization, applied relative to the follower
    local_offset: Vec3,
    velocity: Vec3,
}

/// Smoothly moves an entity toward its target's world position, keeping the local
/// offset the entity started with.
#[derive(Component, Debug, Clone)]
pub struct SmoothPositionFollow {
    /// Entity to follow. Defaults to the parent when unset at initialization.
    pub target: Option<Entity>,
    pub lerp_speed: f32,
    pub smooth_damp_time: f32,
    /// Project the target ahead to compensate for the lag smoothing introduces
    pub extrapolate: bool,
    pub smooth_type: SmoothType,
    pub update_phase: FollowPhase,
    pub enabled: bool,
    state: Option<PositionState>,
    active: bool,
    reset_pending: bool,
    warned_unresolved: bool,
}

impl Default for SmoothPositionFollow {
    fn default() -> Self {
        Self {
            target: None,
            lerp_speed: 20.0,
            smooth_damp_time: 0.02,
            extrapolate: false,
            smooth_type: SmoothType::Lerp,
            update_phase: FollowPhase::Update,
            enabled: true,
            state: None,
            active: false,
            reset_pending: false,
            warned_unresolved: false,
        }
    }
}

impl SmoothPositionFollow {
    pub fn new(target: Entity) -> Self {
        Self {
            target: Some(target),
            ..default()
        }
    }

    pub fn with_smooth_type(mut self, smooth_type: SmoothType) -> Self {
        self.smooth_type = smooth_type;
        self
    }

    pub fn with_lerp_speed(mut self, lerp_speed: f32) -> Self {
        self.lerp_speed = lerp_speed;
        self
    }

    pub fn with_smooth_damp_time(mut self, smooth_damp_time: f32) -> Self {
        self.smooth_damp_time = smooth_damp_time;
        self
    }

    pub fn with_extrapolation(mut self, extrapolate: bool) -> Self {
        self.extrapolate = extrapolate;
        self
    }

    pub fn with_update_phase(mut self, update_phase: FollowPhase) -> Self {
        self.update_phase = update_phase;
        self
    }

    /// Drops any interpolation history and snaps to the target on the next update.
    /// Call after the target has moved a large distance at once.
    pub fn reset_to_target(&mut self) {
        self.reset_pending = true;
        if let Some(state) = &mut self.state {
            state.velocity = Vec3::ZERO;
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.state.is_some()
    }

    /// Whether a snap to the target is waiting for the next update.
    pub fn is_reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Smoothed world position as of the last update. After `reset_to_target` this
    /// still holds the pre-reset value until the follower's phase system runs again,
    /// see `is_reset_pending`.
    pub fn current_position(&self) -> Option<Vec3> {
        self.state.map(|state| state.current)
    }

    pub fn local_offset(&self) -> Option<Vec3> {
        self.state.map(|state| state.local_offset)
    }

    fn initialize(&mut self, world_position: Vec3, local_offset: Vec3) {
        self.state = Some(PositionState {
            current: world_position,
            local_offset,
            velocity: Vec3::ZERO,
        });
    }

    /// Advances the smoothed position one frame toward `target_position`.
    /// `local_to_world` is the follower's own world matrix, used to orient the offset.
    fn advance(&mut self, target_position: Vec3, local_to_world: Mat4, delta_seconds: f32) -> Option<Vec3> {
        let state = self.state.as_mut()?;
        let offset = local_to_world.transform_vector3(state.local_offset);

        if self.reset_pending {
            self.reset_pending = false;
            state.velocity = Vec3::ZERO;
            state.current = target_position + offset;
            return Some(state.current);
        }

        let mut goal = target_position;
        if self.extrapolate {
            goal += target_position - (state.current - offset);
        }
        goal += offset;

        state.current = match self.smooth_type {
            SmoothType::Lerp => state
                .current
                .lerp(goal, utils::lerp_factor(self.lerp_speed, delta_seconds)),
            SmoothType::SmoothDamp => vector_math::smooth_damp(
                state.current,
                goal,
                &mut state.velocity,
                self.smooth_damp_time,
                f32::INFINITY,
                delta_seconds,
            ),
        };
        Some(state.current)
    }
}

type FollowerQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut SmoothPositionFollow,
        &'static mut Transform,
        &'static GlobalTransform,
        Option<&'static Parent>,
    ),
>;

/// Targets that are not themselves followers of this kind, read from their local
/// `Transform` so moves made earlier in the frame are seen.
type TargetQuery<'w, 's> =
    Query<'w, 's, (&'static Transform, Option<&'static Parent>), Without<SmoothPositionFollow>>;

pub fn follow_position_early(
    time: Res<Time>,
    follower_query: FollowerQuery,
    target_query: TargetQuery,
    transform_query: Query<&GlobalTransform>,
) {
    follow_position(FollowPhase::Update, time.delta_seconds(), follower_query, &target_query, &transform_query);
}

pub fn follow_position_late(
    time: Res<Time>,
    follower_query: FollowerQuery,
    target_query: TargetQuery,
    transform_query: Query<&GlobalTransform>,
) {
    follow_position(FollowPhase::LateUpdate, time.delta_seconds(), follower_query, &target_query, &transform_query);
}

fn follow_position(
    phase: FollowPhase,
    delta_seconds: f32,
    mut follower_query: FollowerQuery,
    target_query: &TargetQuery,
    transform_query: &Query<&GlobalTransform>,
) {
    for (entity, mut follow, mut transform, global_transform, parent) in follower_query.iter_mut() {
        if follow.update_phase != phase {
            continue;
        }
        if !follow.enabled {
            if follow.active {
                follow.active = false;
            }
            continue;
        }

        if !follow.is_tracking() {
            let configured = follow.target;
            let target = default_target(entity, configured, parent, &mut follow.warned_unresolved);
            follow.target = target;
            follow.initialize(global_transform.translation(), transform.translation);
            debug!("{:?} started following {:?}", entity, follow.target);
        }
        if !follow.active {
            follow.active = true;
            follow.reset_to_target();
        }

        let target = follow.target;
        let target_local = target.and_then(|target| target_query.get(target).ok());
        let target_position = match resolve_target(
            entity,
            target,
            target_local,
            transform_query,
            &mut follow.warned_unresolved,
        ) {
            Some(target_transform) => target_transform.translation(),
            None => continue,
        };

        if let Some(position) = follow.advance(target_position, global_transform.compute_matrix(), delta_seconds) {
            transform.translation =
                utils::world_to_local_translation(position, parent_transform(parent, transform_query));
        }
    }
}
