use bevy::prelude::*;
use bevy::transform::TransformSystem;

pub mod position;
pub mod rotation;

pub use position::{SmoothPositionFollow, SmoothType};
pub use rotation::SmoothRotationFollow;

/// Which part of the frame a follower smooths in. `LateUpdate` runs after the regular
/// update pass, so targets moved during `Update` are caught in the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowPhase {
    #[default]
    Update,
    LateUpdate,
}

#[derive(SystemLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FollowSystem {
    Reset,
    Early,
    Late,
}

/// Snaps every follow component on `entity` to its target on the next update,
/// e.g. after the target has been teleported.
pub struct ResetFollowEvent {
    pub entity: Entity,
}

pub struct SmoothFollowPlugin;

impl Plugin for SmoothFollowPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ResetFollowEvent>()
            .add_system(
                handle_reset_events
                    .label(FollowSystem::Reset)
                    .before(FollowSystem::Early),
            )
            .add_system(position::follow_position_early.label(FollowSystem::Early))
            .add_system(rotation::follow_rotation_early.label(FollowSystem::Early))
            .add_system_to_stage(
                CoreStage::PostUpdate,
                position::follow_position_late
                    .label(FollowSystem::Late)
                    .before(TransformSystem::TransformPropagate),
            )
            .add_system_to_stage(
                CoreStage::PostUpdate,
                rotation::follow_rotation_late
                    .label(FollowSystem::Late)
                    .before(TransformSystem::TransformPropagate),
            );
    }
}

fn handle_reset_events(
    mut reset_event_reader: EventReader<ResetFollowEvent>,
    mut position_query: Query<&mut SmoothPositionFollow>,
    mut rotation_query: Query<&mut SmoothRotationFollow>,
) {
    for event in reset_event_reader.iter() {
        if let Ok(mut follow) = position_query.get_mut(event.entity) {
            follow.reset_to_target();
        }
        if let Ok(mut follow) = rotation_query.get_mut(event.entity) {
            follow.reset_to_target();
        }
    }
}

/// Target to use when a follower initializes: the configured one, else its parent.
/// Marks `warned` when there is neither, so the unresolved target is not reported twice.
fn default_target(
    follower: Entity,
    target: Option<Entity>,
    parent: Option<&Parent>,
    warned: &mut bool,
) -> Option<Entity> {
    let target = target.or_else(|| parent.map(|parent| parent.get()));
    if target.is_none() {
        warn!("{:?} has no follow target and no parent to fall back on, it will not move", follower);
        *warned = true;
    }
    target
}

/// Looks up the target's world transform. Warns once per run of misses and clears
/// the flag once the target resolves again.
///
/// `target_local` is the target's own `Transform` and `Parent` when available. It is
/// composed with the parent's `GlobalTransform` so moves made earlier in the frame are
/// seen before propagation. Without it the last propagated `GlobalTransform` is used.
fn resolve_target(
    follower: Entity,
    target: Option<Entity>,
    target_local: Option<(&Transform, Option<&Parent>)>,
    transform_query: &Query<&GlobalTransform>,
    warned: &mut bool,
) -> Option<GlobalTransform> {
    let world_transform = target.and_then(|target| match target_local {
        Some((local, parent)) => Some(match parent_transform(parent, transform_query) {
            Some(parent_transform) => parent_transform.mul_transform(*local),
            None => GlobalTransform::from(*local),
        }),
        None => transform_query.get(target).ok().copied(),
    });
    match world_transform {
        Some(world_transform) => {
            *warned = false;
            Some(world_transform)
        }
        None => {
            if !*warned {
                warn!("Follow target of {:?} could not be resolved, skipping update", follower);
                *warned = true;
            }
            None
        }
    }
}

fn parent_transform<'a>(
    parent: Option<&Parent>,
    transform_query: &'a Query<&GlobalTransform>,
) -> Option<&'a GlobalTransform> {
    parent.and_then(|parent| transform_query.get(parent.get()).ok())
}
