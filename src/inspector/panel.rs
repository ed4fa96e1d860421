use bevy::prelude::*;
use bevy_egui::{egui, EguiContext};

use super::{position_fields, rotation_fields, target_choices, target_warning, InspectorField};
use crate::smoothed_follow::{FollowPhase, SmoothPositionFollow, SmoothRotationFollow, SmoothType};

/// Draws an egui window for editing every follower in the world.
/// Requires `bevy_egui::EguiPlugin`.
pub struct FollowInspectorPlugin;

impl Plugin for FollowInspectorPlugin {
    fn build(&self, app: &mut App) {
        app.add_system(draw_follow_inspector);
    }
}

fn draw_follow_inspector(
    mut egui_context: ResMut<EguiContext>,
    candidate_query: Query<(Entity, Option<&Name>), With<GlobalTransform>>,
    mut position_query: Query<(Entity, Option<&Name>, &mut SmoothPositionFollow)>,
    mut rotation_query: Query<(Entity, Option<&Name>, &mut SmoothRotationFollow)>,
) {
    egui::Window::new("Smooth Follow").show(egui_context.ctx_mut(), |ui| {
        for (entity, name, mut follow) in position_query.iter_mut() {
            let choices = target_choices(entity, candidate_query.iter());
            ui.collapsing(header("Position", entity, name), |ui| {
                let mut edited = follow.clone();
                if position_ui(ui, &mut edited, &choices) {
                    if edited.target != follow.target {
                        edited.reset_to_target();
                    }
                    *follow = edited;
                }
            });
        }
        for (entity, name, mut follow) in rotation_query.iter_mut() {
            let choices = target_choices(entity, candidate_query.iter());
            ui.collapsing(header("Rotation", entity, name), |ui| {
                let mut edited = follow.clone();
                if rotation_ui(ui, &mut edited, &choices) {
                    if edited.target != follow.target {
                        edited.reset_to_target();
                    }
                    *follow = edited;
                }
            });
        }
    });
}

fn header(kind: &str, entity: Entity, name: Option<&Name>) -> String {
    match name {
        Some(name) => format!("{} - {}", name.as_str(), kind),
        None => format!("{:?} - {}", entity, kind),
    }
}

/// Returns true if anything was edited.
fn position_ui(ui: &mut egui::Ui, follow: &mut SmoothPositionFollow, choices: &[(Option<Entity>, String)]) -> bool {
    let mut changed = false;
    for field in position_fields(follow) {
        changed |= match field {
            InspectorField::FollowTarget => target_ui(ui, field, &mut follow.target, choices),
            InspectorField::SmoothType => {
                let previous = follow.smooth_type;
                labelled(ui, field, |ui| {
                    egui::ComboBox::from_id_source("smooth_type")
                        .selected_text(format!("{:?}", follow.smooth_type))
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut follow.smooth_type, SmoothType::Lerp, "Lerp");
                            ui.selectable_value(&mut follow.smooth_type, SmoothType::SmoothDamp, "SmoothDamp");
                        });
                });
                previous != follow.smooth_type
            }
            InspectorField::LerpSpeed => drag_value(ui, field, &mut follow.lerp_speed, 0.1),
            InspectorField::SmoothDampTime => drag_value(ui, field, &mut follow.smooth_damp_time, 0.005),
            InspectorField::ExtrapolatePosition => checkbox(ui, field, &mut follow.extrapolate),
            InspectorField::UpdatePhase => phase_ui(ui, field, &mut follow.update_phase),
            _ => false,
        };
    }
    changed
}

fn rotation_ui(ui: &mut egui::Ui, follow: &mut SmoothRotationFollow, choices: &[(Option<Entity>, String)]) -> bool {
    let mut changed = false;
    for field in rotation_fields(follow) {
        changed |= match field {
            InspectorField::FollowTarget => target_ui(ui, field, &mut follow.target, choices),
            InspectorField::SmoothSpeed => drag_value(ui, field, &mut follow.smooth_speed, 0.1),
            InspectorField::ExtrapolateRotation => checkbox(ui, field, &mut follow.extrapolate),
            InspectorField::UpdatePhase => phase_ui(ui, field, &mut follow.update_phase),
            _ => false,
        };
    }
    changed
}

fn labelled(ui: &mut egui::Ui, field: InspectorField, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.horizontal(|ui| {
        let label = ui.label(field.label());
        if let Some(tooltip) = field.tooltip() {
            label.on_hover_text(tooltip);
        }
        add_contents(ui);
    });
}

fn target_ui(
    ui: &mut egui::Ui,
    field: InspectorField,
    target: &mut Option<Entity>,
    choices: &[(Option<Entity>, String)],
) -> bool {
    let previous = *target;
    let selected = choices
        .iter()
        .find(|(choice, _)| *choice == previous)
        .map(|(_, label)| label.clone())
        .unwrap_or_else(|| format!("{:?} (missing)", previous));
    labelled(ui, field, |ui| {
        egui::ComboBox::from_id_source("follow_target")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for (choice, label) in choices {
                    ui.selectable_value(target, *choice, label.as_str());
                }
            });
    });
    if let Some(warning) = target_warning(*target) {
        ui.colored_label(egui::Color32::YELLOW, warning);
    }
    ui.separator();
    previous != *target
}

fn drag_value(ui: &mut egui::Ui, field: InspectorField, value: &mut f32, speed: f64) -> bool {
    let mut changed = false;
    labelled(ui, field, |ui| {
        changed = ui
            .add(egui::DragValue::new(value).speed(speed).clamp_range(0.0..=f32::MAX))
            .changed();
    });
    changed
}

fn checkbox(ui: &mut egui::Ui, field: InspectorField, value: &mut bool) -> bool {
    let mut response = ui.checkbox(value, field.label());
    if let Some(tooltip) = field.tooltip() {
        response = response.on_hover_text(tooltip);
    }
    response.changed()
}

fn phase_ui(ui: &mut egui::Ui, field: InspectorField, phase: &mut FollowPhase) -> bool {
    let previous = *phase;
    labelled(ui, field, |ui| {
        ui.radio_value(phase, FollowPhase::Update, "Update");
        ui.radio_value(phase, FollowPhase::LateUpdate, "Late Update");
    });
    previous != *phase
}
