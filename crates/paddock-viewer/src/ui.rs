//! UI overlays using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use paddock_core::{CarDescriptor, Team, ViewStatus};

use crate::session::{NavigationIntent, SessionState};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, keyboard_navigation)
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

fn accent(team: &Team) -> egui::Color32 {
    team.accent_rgb()
        .map(|[r, g, b]| egui::Color32::from_rgb(r, g, b))
        .unwrap_or(egui::Color32::GRAY)
}

fn ui_system(
    mut contexts: EguiContexts,
    session: Res<SessionState>,
    mut intents: MessageWriter<NavigationIntent>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let session = &session.0;
    let current_team = session.current_team();
    let current_car = session.current_car();

    // Team selector
    egui::TopBottomPanel::top("teams").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            for team in session.catalogue().teams() {
                let selected = team.key == current_team.key;
                let mut text = egui::RichText::new(&team.name).color(accent(team));
                if selected {
                    text = text.strong();
                }
                if ui.selectable_label(selected, text).clicked() {
                    intents.write(NavigationIntent::SelectTeam(team.key.clone()));
                }
            }
        });
    });

    // Car navigation
    egui::TopBottomPanel::bottom("car_navigation").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("◀").on_hover_text("Previous car").clicked() {
                intents.write(NavigationIntent::Previous);
            }

            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new(&current_car.name)
                        .heading()
                        .color(accent(current_team)),
                );
                ui.label(format!(
                    "{} · {} · {}/{}",
                    current_team.name,
                    current_car.year,
                    session.navigation().car_index() + 1,
                    current_team.cars.len()
                ));
            });

            if ui.button("▶").on_hover_text("Next car").clicked() {
                intents.write(NavigationIntent::Next);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if session.info_visible() { "Hide info" } else { "Info" };
                if ui.button(label).clicked() {
                    intents.write(NavigationIntent::ToggleInfo);
                }
            });
        });
    });

    if session.info_visible() {
        egui::Window::new(format!("{} {}", current_car.name, current_car.year))
            .id(egui::Id::new("car_info"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| car_info(ui, current_car));
    }

    status_overlay(ctx, session.status(), current_car);
}

fn car_info(ui: &mut egui::Ui, car: &CarDescriptor) {
    let specs = car.specs.as_ref().map(|s| s.entries()).unwrap_or_default();
    let stats = car.race_stats.as_ref().map(|s| s.entries()).unwrap_or_default();

    if specs.is_empty() && stats.is_empty() {
        ui.label("No details available");
        return;
    }

    if !specs.is_empty() {
        ui.strong("Specifications");
        egui::Grid::new("specs").num_columns(2).striped(true).show(ui, |ui| {
            for (label, value) in specs {
                ui.label(label);
                ui.label(value);
                ui.end_row();
            }
        });
    }

    if !stats.is_empty() {
        ui.add_space(6.0);
        ui.strong("Race statistics");
        egui::Grid::new("race_stats").num_columns(2).striped(true).show(ui, |ui| {
            for (label, value) in stats {
                ui.label(label);
                ui.label(value.to_string());
                ui.end_row();
            }
        });
    }
}

/// Loading or failed placeholder in the middle of the viewport
fn status_overlay(ctx: &egui::Context, status: &ViewStatus, car: &CarDescriptor) {
    let (text, color) = match status {
        ViewStatus::Loading { .. } => ("Loading model…".to_string(), egui::Color32::DARK_GRAY),
        ViewStatus::Failed { error, .. } => (
            format!("Failed to load {}: {}", car.name, error),
            egui::Color32::from_rgb(200, 40, 40),
        ),
        ViewStatus::Idle | ViewStatus::Ready { .. } => return,
    };

    egui::Area::new(egui::Id::new("status_overlay"))
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(text).size(18.0).color(color));
            if matches!(status, ViewStatus::Loading { .. }) {
                ui.vertical_centered(|ui| ui.spinner());
            }
        });
}

/// Arrow keys cycle cars, `I` toggles info, digits pick a team
fn keyboard_navigation(
    keys: Res<ButtonInput<KeyCode>>,
    session: Res<SessionState>,
    mut intents: MessageWriter<NavigationIntent>,
    mut contexts: EguiContexts,
) {
    let egui_wants_keyboard = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false);
    if egui_wants_keyboard {
        return;
    }

    if keys.just_pressed(KeyCode::ArrowRight) {
        intents.write(NavigationIntent::Next);
    }
    if keys.just_pressed(KeyCode::ArrowLeft) {
        intents.write(NavigationIntent::Previous);
    }
    if keys.just_pressed(KeyCode::KeyI) {
        intents.write(NavigationIntent::ToggleInfo);
    }

    const TEAM_KEYS: [KeyCode; 9] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    let teams = session.0.catalogue().teams();
    for (key, team) in TEAM_KEYS.iter().zip(teams) {
        if keys.just_pressed(*key) {
            intents.write(NavigationIntent::SelectTeam(team.key.clone()));
        }
    }
}
