//! Settings dropdown and loading overlay using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use hangar_core::menu::{DROPDOWN_ID, SETTINGS_TRIGGER_ID};

use crate::types::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // Runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
        app.add_systems(EguiPrimaryContextPass, (settings_menu_ui, loading_overlay_ui));
    }
}

fn settings_menu_ui(
    mut contexts: EguiContexts,
    mut viewer: ResMut<ViewerState>,
    mut toggles: MessageWriter<ToggleRequested>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let viewer = &mut viewer.0;

    let mut clicked: Option<&'static str> = None;

    egui::Area::new(egui::Id::new(SETTINGS_TRIGGER_ID))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
        .show(ctx, |ui| {
            if ui.button("⚙ Settings").clicked() {
                clicked = Some(SETTINGS_TRIGGER_ID);
            }

            if !viewer.menu().is_open() {
                return;
            }
            ui.push_id(DROPDOWN_ID, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    for binding in viewer.toggles().bindings() {
                        let active = viewer.is_active(binding.id);
                        let text =
                            format!("{} ({})", binding.label, if active { "on" } else { "off" });
                        if ui.button(text).clicked() {
                            toggles.write(ToggleRequested(binding.id));
                            clicked = Some(binding.trigger_id);
                        }
                    }
                });
            });
        });

    // Any click that did not land on the settings trigger closes the menu
    if clicked.is_some() || ctx.input(|i| i.pointer.primary_clicked()) {
        viewer.menu_mut().click(clicked);
    }
}

fn loading_overlay_ui(mut contexts: EguiContexts, viewer: Res<ViewerState>) {
    let Some(progress) = viewer.0.loading_overlay() else { return };
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::Area::new(egui::Id::new("loading_overlay"))
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                match progress.percent() {
                    Some(percent) => {
                        ui.label(format!("Loading {:.0}%", percent));
                        ui.add(egui::ProgressBar::new(percent / 100.0).desired_width(240.0));
                    }
                    None => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Loading");
                        });
                    }
                }
            });
        });
}
