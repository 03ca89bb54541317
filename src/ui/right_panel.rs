use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use koica_sim::engine::protocol::EngineCommand;
use koica_sim::engine::session::FinalReport;
use koica_sim::model::event_result::{ChoiceReport, EffectResult};
use koica_sim::model::run_state::GameMode;

use crate::ui::app::{RightTab, UiState};
use crate::ui::settings::MESSAGE_KEYS;
use crate::ui::settings_io::save_settings;

pub fn draw_right_panel(ctx: &egui::Context, ui_state: &mut UiState, cmd_tx: &Sender<EngineCommand>) {
    egui::SidePanel::right("right")
        .resizable(true)
        .default_width(320.0)
        .min_width(260.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut ui_state.right_tab, RightTab::Report, "Report");
                ui.selectable_value(&mut ui_state.right_tab, RightTab::Odds, "Odds");
                ui.selectable_value(&mut ui_state.right_tab, RightTab::Settings, "Settings");
            });
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| match ui_state.right_tab {
                RightTab::Report => draw_report(ui, ui_state),
                RightTab::Odds => draw_odds(ui, ui_state, cmd_tx),
                RightTab::Settings => draw_settings(ui, ui_state, cmd_tx),
            });
        });
}

/* =========================
   Report
   ========================= */

fn draw_report(ui: &mut egui::Ui, state: &UiState) {
    let Some(view) = &state.view else {
        return;
    };

    if let Some(report) = &view.final_report {
        draw_final(ui, report);
        return;
    }

    match &view.last_report {
        Some(report) => draw_choice_report(ui, report),
        None => {
            ui.label("No decisions yet.");
        }
    }
}

fn draw_choice_report(ui: &mut egui::Ui, report: &ChoiceReport) {
    ui.heading("Last decision");
    ui.label(&report.choice_text);
    ui.separator();

    for (stat, delta) in report.deltas.iter().filter(|(_, d)| *d != 0) {
        ui.label(format!(
            "{}: {} → {} ({:+})",
            stat.label(),
            report.before.get(stat),
            report.after.get(stat),
            delta
        ));
    }

    if !report.morale_changes.is_empty() {
        ui.collapsing("Staff morale", |ui| {
            for change in &report.morale_changes {
                ui.label(format!("{}: {} → {}", change.name, change.before, change.after));
            }
        });
    }

    if !report.scheduled_effects.is_empty() {
        ui.label(format!("{} consequence(s) set in motion", report.scheduled_effects.len()));
    }

    for effect in &report.fired_effects {
        let line = match &effect.result {
            EffectResult::Applied => format!("✔ {}", effect.id),
            EffectResult::Rejected { reason } => format!("✖ {}: {}", effect.id, reason),
        };
        ui.label(line);
    }

    if report.advanced_time {
        ui.label("Time moves on.");
    }
}

fn draw_final(ui: &mut egui::Ui, report: &FinalReport) {
    ui.heading(report.ending.to_string());
    ui.label(format!("Composite score: {:.1}", report.score));

    if let Some(archetype) = report.archetype {
        ui.separator();
        ui.label(egui::RichText::new(archetype.title()).strong());
    }

    if let Some(debrief) = &report.debrief {
        ui.separator();
        for paragraph in debrief.paragraphs() {
            ui.label(paragraph);
            ui.add_space(4.0);
        }
    }
}

/* =========================
   Odds
   ========================= */

fn draw_odds(ui: &mut egui::Ui, state: &mut UiState, cmd_tx: &Sender<EngineCommand>) {
    ui.heading("Archetype odds");
    ui.label("Random playthroughs classified the same way a finished term is.");

    ui.horizontal(|ui| {
        ui.add(egui::DragValue::new(&mut state.odds_samples).range(100..=200_000));
        if ui.button("Simulate").clicked() {
            let _ = cmd_tx.send(EngineCommand::EstimateOdds {
                samples: state.odds_samples,
            });
        }
    });

    let Some(odds) = &state.odds else {
        return;
    };

    ui.separator();
    egui::Grid::new("odds").striped(true).show(ui, |ui| {
        for (archetype, count) in odds.ranked() {
            ui.label(archetype.title());
            ui.label(format!("{:.1}%", odds.percent(archetype)));
            ui.label(count.to_string());
            ui.end_row();
        }
    });
}

/* =========================
   Settings
   ========================= */

fn draw_settings(ui: &mut egui::Ui, state: &mut UiState, cmd_tx: &Sender<EngineCommand>) {
    ui.label("UI Scale");
    ui.add(egui::Slider::new(&mut state.settings.ui_scale, 0.75..=2.0));

    ui.collapsing("Message colors", |ui| {
        for key in MESSAGE_KEYS {
            let mut color = state.settings.color(key);
            ui.horizontal(|ui| {
                if ui.color_edit_button_srgba(&mut color).changed() {
                    state.settings.set_color(key, color);
                }
                ui.label(key);
            });
        }
    });

    if ui.button("Save UI settings").clicked() {
        save_settings(&state.settings);
    }

    ui.separator();
    ui.heading("Run");

    ui.horizontal(|ui| {
        ui.selectable_value(&mut state.next_mode, GameMode::Static, "Authored");
        ui.selectable_value(&mut state.next_mode, GameMode::Generative, "Generative");
    });
    if ui.button("New term").clicked() {
        let _ = cmd_tx.send(EngineCommand::NewRun { mode: state.next_mode });
    }

    ui.label("Save file");
    ui.text_edit_singleline(&mut state.save_path);
    ui.horizontal(|ui| {
        let path = PathBuf::from(state.save_path.trim());
        if ui.button("Save").clicked() {
            let _ = cmd_tx.send(EngineCommand::Save(path.clone()));
        }
        if ui.button("Load").clicked() {
            let _ = cmd_tx.send(EngineCommand::Load(path));
        }
    });

    ui.separator();
    ui.heading("Scenario generator");

    ui.label("Endpoint");
    ui.text_edit_singleline(&mut state.config.llm.endpoint);
    ui.label("Model");
    ui.text_edit_singleline(&mut state.config.llm.model);
    ui.label("Temperature");
    ui.add(egui::Slider::new(&mut state.config.llm.temperature, 0.0..=1.5));

    ui.horizontal(|ui| {
        if ui.button("Apply").clicked() {
            state.config.mode = state.next_mode;
            let _ = cmd_tx.send(EngineCommand::UpdateConfig(state.config.clone()));
        }
        if ui.button("Test connection").clicked() {
            state.connection = None;
            let _ = cmd_tx.send(EngineCommand::TestConnection);
        }
    });

    match &state.connection {
        Some(Ok(msg)) => {
            ui.colored_label(egui::Color32::from_rgb(80, 200, 120), msg);
        }
        Some(Err(err)) => {
            ui.colored_label(egui::Color32::from_rgb(220, 70, 70), err);
        }
        None => {}
    }
}
