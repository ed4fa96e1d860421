use bevy::prelude::*;

use super::{default_target, parent_transform, resolve_target, FollowPhase};
use crate::utils;

/// Above this angle extrapolation is skipped, doubling the delta would spin the
/// follower the long way round.
const MAX_EXTRAPOLATION_ANGLE: f32 = std::f32::consts::FRAC_PI_2;

/// Smoothly rotates an entity toward its target's world rotation.
#[derive(Component, Debug, Clone)]
pub struct SmoothRotationFollow {
    pub target: Option<Entity>,
    pub smooth_speed: f32,
    pub extrapolate: bool,
    pub update_phase: FollowPhase,
    pub enabled: bool,
    current: Option<Quat>,
    active: bool,
    reset_pending: bool,
    warned_unresolved: bool,
}

impl Default for SmoothRotationFollow {
    fn default() -> Self {
        Self {
            target: None,
            smooth_speed: 20.0,
            extrapolate: false,
            update_phase: FollowPhase::Update,
            enabled: true,
            current: None,
            active: false,
            reset_pending: false,
            warned_unresolved: false,
        }
    }
}

impl SmoothRotationFollow {
    pub fn new(target: Entity) -> Self {
        Self {
            target: Some(target),
            ..default()
        }
    }

    pub fn with_smooth_speed(mut self, smooth_speed: f32) -> Self {
        self.smooth_speed = smooth_speed;
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

    /// Snaps to the target's rotation on the next update, without interpolating.
    pub fn reset_to_target(&mut self) {
        self.reset_pending = true;
    }

    pub fn is_tracking(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Smoothed world rotation as of the last update. Not affected by
    /// `reset_to_target` until the next update runs.
    pub fn current_rotation(&self) -> Option<Quat> {
        self.current
    }

    fn advance(&mut self, target_rotation: Quat, delta_seconds: f32) -> Option<Quat> {
        let current = self.current?;
        let next = if self.reset_pending {
            self.reset_pending = false;
            target_rotation
        } else {
            let mut goal = target_rotation;
            if self.extrapolate && current.angle_between(target_rotation) < MAX_EXTRAPOLATION_ANGLE {
                let difference = target_rotation * current.inverse();
                goal = (target_rotation * difference).normalize();
            }
            current.slerp(goal, utils::lerp_factor(self.smooth_speed, delta_seconds))
        };
        self.current = Some(next);
        Some(next)
    }
}

type FollowerQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut SmoothRotationFollow,
        &'static mut Transform,
        &'static GlobalTransform,
        Option<&'static Parent>,
    ),
>;

/// Targets that are not themselves followers of this kind, read from their local
/// `Transform` so moves made earlier in the frame are seen.
type TargetQuery<'w, 's> =
    Query<'w, 's, (&'static Transform, Option<&'static Parent>), Without<SmoothRotationFollow>>;

pub fn follow_rotation_early(
    time: Res<Time>,
    follower_query: FollowerQuery,
    target_query: TargetQuery,
    transform_query: Query<&GlobalTransform>,
) {
    follow_rotation(FollowPhase::Update, time.delta_seconds(), follower_query, &target_query, &transform_query);
}

pub fn follow_rotation_late(
    time: Res<Time>,
    follower_query: FollowerQuery,
    target_query: TargetQuery,
    transform_query: Query<&GlobalTransform>,
) {
    follow_rotation(FollowPhase::LateUpdate, time.delta_seconds(), follower_query, &target_query, &transform_query);
}

fn follow_rotation(
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
            follow.current = Some(global_transform.compute_transform().rotation);
            debug!("{:?} started following rotation of {:?}", entity, follow.target);
        }
        if !follow.active {
            follow.active = true;
            follow.reset_to_target();
        }

        let target = follow.target;
        let target_local = target.and_then(|target| target_query.get(target).ok());
        let target_rotation = match resolve_target(
            entity,
            target,
            target_local,
            transform_query,
            &mut follow.warned_unresolved,
        ) {
            Some(target_transform) => target_transform.compute_transform().rotation,
            None => continue,
        };

        if let Some(rotation) = follow.advance(target_rotation, delta_seconds) {
            transform.rotation =
                utils::world_to_local_rotation(rotation, parent_transform(parent, transform_query));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothed_follow::test_utils::*;
    use crate::smoothed_follow::ResetFollowEvent;

    fn tracking(follow: SmoothRotationFollow, start: Quat) -> SmoothRotationFollow {
        let mut follow = follow;
        follow.current = Some(start);
        follow
    }

    /// `angle_between` goes through acos, which is too coarse near zero in f32,
    /// so compare the quaternions directly, either sign being the same rotation.
    fn rotations_match(actual: Quat, expected: Quat) -> bool {
        actual.dot(expected).abs() > 1.0 - 1e-6
    }

    fn assert_rotation_eq(actual: Quat, expected: Quat) {
        assert!(rotations_match(actual, expected), "{:?} != {:?}", actual, expected);
    }

    #[test]
    fn slerps_fraction_of_the_way() {
        let target = Quat::from_rotation_y(60f32.to_radians());
        let mut follow = tracking(SmoothRotationFollow::default().with_smooth_speed(0.5), Quat::IDENTITY);

        let rotation = follow.advance(target, 1.0).unwrap();

        assert_rotation_eq(rotation, Quat::from_rotation_y(30f32.to_radians()));
    }

    #[test]
    fn extrapolation_doubles_small_deltas() {
        let target = Quat::from_rotation_y(30f32.to_radians());
        let mut follow = tracking(
            SmoothRotationFollow::default().with_smooth_speed(0.5).with_extrapolation(true),
            Quat::IDENTITY,
        );

        let rotation = follow.advance(target, 1.0).unwrap();

        assert_rotation_eq(rotation, Quat::from_rotation_y(30f32.to_radians()));
    }

    #[test]
    fn extrapolation_skipped_past_ninety_degrees() {
        let target = Quat::from_rotation_y(120f32.to_radians());
        let mut plain = tracking(SmoothRotationFollow::default().with_smooth_speed(0.25), Quat::IDENTITY);
        let mut extrapolated = tracking(
            SmoothRotationFollow::default().with_smooth_speed(0.25).with_extrapolation(true),
            Quat::IDENTITY,
        );

        let expected = plain.advance(target, 1.0).unwrap();
        let rotation = extrapolated.advance(target, 1.0).unwrap();

        assert_rotation_eq(rotation, expected);
        assert_rotation_eq(rotation, Quat::from_rotation_y(30f32.to_radians()));
    }

    #[test]
    fn converges_on_stationary_target() {
        let target = Quat::from_euler(EulerRot::XYZ, 0.3, -1.2, 0.8);
        let mut follow = tracking(SmoothRotationFollow::default().with_smooth_speed(10.0), Quat::IDENTITY);
        for _ in 0..600 {
            follow.advance(target, 1.0 / 60.0);
        }
        assert_rotation_eq(follow.current_rotation().unwrap(), target);
    }

    #[test]
    fn reset_snaps_without_interpolation() {
        let target = Quat::from_rotation_x(2.0);
        let mut follow = tracking(SmoothRotationFollow::default(), Quat::IDENTITY);
        follow.reset_to_target();

        assert_eq!(follow.advance(target, 0.0), Some(target));
        assert_eq!(follow.current_rotation(), Some(target));
    }

    #[test]
    fn activation_snaps_to_target_rotation() {
        let mut app = test_app();
        let target_rotation = Quat::from_rotation_z(1.0);
        let target = spawn_at(&mut app, Transform::from_rotation(target_rotation));
        let follower = spawn_at(&mut app, Transform::default());
        app.world.entity_mut(follower).insert(SmoothRotationFollow::new(target));

        app.update();

        assert_rotation_eq(app.world.get::<Transform>(follower).unwrap().rotation, target_rotation);
    }

    #[test]
    fn reset_to_target_follows_instant_rotation() {
        let mut app = test_app();
        let target = spawn_at(&mut app, Transform::default());
        let follower = spawn_at(&mut app, Transform::default());
        app.world.entity_mut(follower).insert(SmoothRotationFollow::new(target));
        app.update();

        let flipped = Quat::from_rotation_y(std::f32::consts::PI);
        teleport(&mut app, target, Transform::from_rotation(flipped));
        app.world
            .get_mut::<SmoothRotationFollow>(follower)
            .unwrap()
            .reset_to_target();
        app.update();

        assert_rotation_eq(app.world.get::<Transform>(follower).unwrap().rotation, flipped);
    }

    #[test]
    fn unresolved_target_is_a_no_op() {
        let mut app = test_app();
        let follower = spawn_at(&mut app, Transform::from_rotation(Quat::from_rotation_x(0.5)));
        app.world.entity_mut(follower).insert(SmoothRotationFollow::default());

        app.update();

        let follow = app.world.get::<SmoothRotationFollow>(follower).unwrap();
        assert_eq!(follow.target, None);
        assert_rotation_eq(
            app.world.get::<Transform>(follower).unwrap().rotation,
            Quat::from_rotation_x(0.5),
        );
    }

    #[test]
    fn extrapolation_differs_from_plain_slerp_below_ninety_degrees() {
        let target = Quat::from_rotation_y(45f32.to_radians());
        let mut plain = tracking(SmoothRotationFollow::default().with_smooth_speed(0.25), Quat::IDENTITY);
        let mut extrapolated = tracking(
            SmoothRotationFollow::default().with_smooth_speed(0.25).with_extrapolation(true),
            Quat::IDENTITY,
        );

        let plain_rotation = plain.advance(target, 1.0).unwrap();
        let rotation = extrapolated.advance(target, 1.0).unwrap();

        assert!(!rotations_match(rotation, plain_rotation));
        assert_rotation_eq(rotation, Quat::from_rotation_y(22.5f32.to_radians()));
    }

    #[test]
    fn reset_event_snaps_follower() {
        let mut app = test_app();
        let target = spawn_at(&mut app, Transform::default());
        let follower = spawn_at(&mut app, Transform::default());
        app.world.entity_mut(follower).insert(SmoothRotationFollow::new(target));
        app.update();

        let turned = Quat::from_rotation_x(1.2);
        teleport(&mut app, target, Transform::from_rotation(turned));
        app.world
            .resource_mut::<Events<ResetFollowEvent>>()
            .send(ResetFollowEvent { entity: follower });
        app.update();

        assert_rotation_eq(app.world.get::<Transform>(follower).unwrap().rotation, turned);
    }

    #[test]
    fn late_followers_update_in_post_update() {
        let mut app = test_app();
        let target_rotation = Quat::from_rotation_y(-0.7);
        let target = spawn_at(&mut app, Transform::from_rotation(target_rotation));
        let follower = spawn_at(&mut app, Transform::default());
        app.world
            .entity_mut(follower)
            .insert(SmoothRotationFollow::new(target).with_update_phase(FollowPhase::LateUpdate));

        app.update();

        assert_rotation_eq(app.world.get::<Transform>(follower).unwrap().rotation, target_rotation);
    }

    #[test]
    fn early_phase_ignores_late_followers() {
        let mut app = App::new();
        app.insert_resource(Time::default());
        app.add_system(follow_rotation_early);
        let target = spawn_at(&mut app, Transform::default());
        let late = spawn_at(&mut app, Transform::default());
        app.world
            .entity_mut(late)
            .insert(SmoothRotationFollow::new(target).with_update_phase(FollowPhase::LateUpdate));

        app.update();

        assert!(!app.world.get::<SmoothRotationFollow>(late).unwrap().is_tracking());
    }

    #[test]
    fn re_enabling_snaps_to_target() {
        let mut app = test_app();
        let target = spawn_at(&mut app, Transform::default());
        let follower = spawn_at(&mut app, Transform::default());
        let mut follow = SmoothRotationFollow::new(target);
        follow.enabled = false;
        app.world.entity_mut(follower).insert(follow);

        app.update();
        assert!(!app.world.get::<SmoothRotationFollow>(follower).unwrap().is_tracking());

        let turned = Quat::from_rotation_z(-2.0);
        teleport(&mut app, target, Transform::from_rotation(turned));
        app.world.get_mut::<SmoothRotationFollow>(follower).unwrap().enabled = true;
        app.update();

        assert_rotation_eq(app.world.get::<Transform>(follower).unwrap().rotation, turned);
    }

    #[test]
    fn reset_uses_target_rotated_earlier_this_frame() {
        let mut app = propagating_app();
        let target = spawn_at(&mut app, Transform::default());
        let follower = spawn_at(&mut app, Transform::default());
        app.world.entity_mut(follower).insert(SmoothRotationFollow::new(target));
        app.update();

        let flipped = Quat::from_rotation_y(std::f32::consts::PI);
        app.world.get_mut::<Transform>(target).unwrap().rotation = flipped;
        app.world
            .get_mut::<SmoothRotationFollow>(follower)
            .unwrap()
            .reset_to_target();
        app.update();

        assert_rotation_eq(app.world.get::<Transform>(follower).unwrap().rotation, flipped);
    }

    #[test]
    fn pending_reset_keeps_last_rotation_until_update() {
        let mut follow = tracking(SmoothRotationFollow::default(), Quat::IDENTITY);
        follow.reset_to_target();

        assert!(follow.is_reset_pending());
        assert_eq!(follow.current_rotation(), Some(Quat::IDENTITY));
    }
}
