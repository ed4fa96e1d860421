//! Which follower settings an authoring panel shows, in display order.

use bevy::prelude::*;

use crate::smoothed_follow::{SmoothPositionFollow, SmoothRotationFollow, SmoothType};

#[cfg(feature = "editor")]
pub mod panel;

#[cfg(feature = "editor")]
pub use panel::FollowInspectorPlugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorField {
    FollowTarget,
    SmoothType,
    LerpSpeed,
    SmoothDampTime,
    SmoothSpeed,
    ExtrapolatePosition,
    ExtrapolateRotation,
    UpdatePhase,
}

impl InspectorField {
    pub fn label(self) -> &'static str {
        match self {
            InspectorField::FollowTarget => "Follow Target",
            InspectorField::SmoothType => "Smooth Type",
            InspectorField::LerpSpeed | InspectorField::SmoothSpeed => "Smooth Speed",
            InspectorField::SmoothDampTime => "Smooth Damp Time",
            InspectorField::ExtrapolatePosition => "Extrapolate Position",
            InspectorField::ExtrapolateRotation => "Extrapolate Rotation",
            InspectorField::UpdatePhase => "Update Phase",
        }
    }

    pub fn tooltip(self) -> Option<&'static str> {
        match self {
            InspectorField::SmoothType => Some(
                "Lerp: Linearly interpolates toward the target.\n\
                 SmoothDamp: Gradually changes toward the target with a spring-damper like function that never overshoots.",
            ),
            InspectorField::LerpSpeed => Some("How fast the position is smoothed toward the target when using Lerp."),
            InspectorField::SmoothDampTime => Some("Roughly how long, in seconds, SmoothDamp takes to reach the target."),
            InspectorField::ExtrapolatePosition => {
                Some("Should position values be extrapolated to compensate for delay caused by smoothing.")
            }
            InspectorField::ExtrapolateRotation => {
                Some("Should rotation values be extrapolated to compensate for delay caused by smoothing.")
            }
            InspectorField::UpdatePhase => Some("Which update pass to run smoothing in."),
            InspectorField::FollowTarget | InspectorField::SmoothSpeed => None,
        }
    }
}

pub fn position_fields(follow: &SmoothPositionFollow) -> Vec<InspectorField> {
    let speed_field = match follow.smooth_type {
        SmoothType::Lerp => InspectorField::LerpSpeed,
        SmoothType::SmoothDamp => InspectorField::SmoothDampTime,
    };
    vec![
        InspectorField::FollowTarget,
        InspectorField::SmoothType,
        speed_field,
        InspectorField::ExtrapolatePosition,
        InspectorField::UpdatePhase,
    ]
}

pub fn rotation_fields(_follow: &SmoothRotationFollow) -> Vec<InspectorField> {
    vec![
        InspectorField::FollowTarget,
        InspectorField::SmoothSpeed,
        InspectorField::ExtrapolateRotation,
        InspectorField::UpdatePhase,
    ]
}

/// Help text shown beside an empty target slot.
pub fn target_warning(target: Option<Entity>) -> Option<&'static str> {
    match target {
        Some(_) => None,
        None => Some("If no target is specified, the component will follow its parent."),
    }
}

pub fn target_label(entity: Entity, name: Option<&Name>) -> String {
    match name {
        Some(name) => format!("{} ({:?})", name.as_str(), entity),
        None => format!("{:?}", entity),
    }
}

/// Entries for the target picker: "None" first, then every candidate except the
/// follower itself, ordered by entity id.
pub fn target_choices<'a>(
    follower: Entity,
    candidates: impl IntoIterator<Item = (Entity, Option<&'a Name>)>,
) -> Vec<(Option<Entity>, String)> {
    let mut entities: Vec<(Entity, Option<&'a Name>)> = candidates
        .into_iter()
        .filter(|(entity, _)| *entity != follower)
        .collect();
    entities.sort_by_key(|(entity, _)| entity.id());

    let mut choices = vec![(None, "None".to_string())];
    choices.extend(
        entities
            .into_iter()
            .map(|(entity, name)| (Some(entity), target_label(entity, name))),
    );
    choices
}
