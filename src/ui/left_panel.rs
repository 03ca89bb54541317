use eframe::egui;

use koica_sim::model::lifestyle::LifestyleSlot;
use koica_sim::model::roster::RosterGroup;
use koica_sim::model::run_state::{RunState, TOTAL_PERIODS};
use koica_sim::model::stats::{DeltaGrade, Focus, Stat};

use crate::ui::app::{LeftTab, UiState};

pub fn draw_left_panel(ctx: &egui::Context, ui_state: &mut UiState) {
    egui::SidePanel::left("left")
        .resizable(false)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut ui_state.left_tab, LeftTab::Status, "Status");
                ui.selectable_value(&mut ui_state.left_tab, LeftTab::Office, "Office");
                ui.selectable_value(&mut ui_state.left_tab, LeftTab::Lifestyle, "Life");
            });

            ui.separator();

            let Some(view) = &ui_state.view else {
                ui.label("Waiting for the engine…");
                return;
            };

            egui::ScrollArea::vertical().show(ui, |ui| match ui_state.left_tab {
                LeftTab::Status => draw_status(ui, &view.state, view.last_report.as_ref().map(|r| &r.deltas)),
                LeftTab::Office => draw_office(ui, &view.state),
                LeftTab::Lifestyle => draw_lifestyle(ui, &view.state),
            });
        });
}

fn stat_color(stat: Stat, value: i32) -> egui::Color32 {
    let good = if stat.higher_is_better() { value >= 50 } else { value < 50 };
    let bad = if stat.higher_is_better() { value < 25 } else { value >= 75 };
    if bad {
        egui::Color32::from_rgb(170, 50, 50)
    } else if good {
        egui::Color32::from_rgb(50, 130, 70)
    } else {
        egui::Color32::from_rgb(170, 130, 40)
    }
}

fn grade_color(grade: DeltaGrade) -> egui::Color32 {
    match grade {
        DeltaGrade::Excellent => egui::Color32::from_rgb(80, 200, 120),
        DeltaGrade::Good => egui::Color32::from_rgb(120, 190, 120),
        DeltaGrade::Fair => egui::Color32::GRAY,
        DeltaGrade::Caution => egui::Color32::from_rgb(220, 160, 60),
        DeltaGrade::Danger => egui::Color32::from_rgb(220, 70, 70),
    }
}

fn draw_status(
    ui: &mut egui::Ui,
    state: &RunState,
    last: Option<&koica_sim::model::stats::StatDeltas>,
) {
    ui.heading(state.clock.to_string());
    ui.label(format!(
        "Period {} of {} ({} left)",
        state.clock.absolute_period().min(TOTAL_PERIODS),
        TOTAL_PERIODS,
        state.clock.remaining_periods()
    ));
    ui.label(format!("Mode: {:?}", state.mode));

    ui.separator();

    for stat in Stat::ALL {
        let value = state.stats.get(stat);
        ui.horizontal(|ui| {
            ui.label(stat.label());
            if let Some(delta) = last.map(|d| d.get(stat)).filter(|d| *d != 0) {
                let grade = DeltaGrade::of(if stat.higher_is_better() { delta } else { -delta });
                ui.colored_label(grade_color(grade), format!("{delta:+}"));
            }
        });
        ui.add(
            egui::ProgressBar::new(value as f32 / 100.0)
                .fill(stat_color(stat, value))
                .text(value.to_string()),
        );
    }

    ui.separator();
    ui.collapsing("Leadership record", |ui| {
        for focus in Focus::ALL {
            ui.label(format!("{}: {}", focus.label(), state.style.get(focus)));
        }
        ui.label(format!("risk taking: {}", state.style.risk_taking));
        ui.label(format!("decisions: {}", state.total_choices()));
    });

    if !state.pending_delayed_effects.is_empty() {
        ui.collapsing("Consequences in motion", |ui| {
            for effect in &state.pending_delayed_effects {
                ui.label(format!("• {} (period {})", effect.id, effect.trigger_period));
            }
        });
    }
}

fn draw_office(ui: &mut egui::Ui, state: &RunState) {
    for group in RosterGroup::ALL {
        ui.collapsing(
            format!("{} ({:.0})", group.label(), state.roster.average(group)),
            |ui| {
                egui::Grid::new(group.key()).striped(true).show(ui, |ui| {
                    for member in state.roster.group(group) {
                        ui.label(&member.name);
                        ui.label(&member.role);
                        ui.colored_label(
                            stat_color(Stat::StaffMorale, member.morale),
                            member.morale.to_string(),
                        );
                        ui.end_row();
                    }
                });
            },
        );
    }

    if !state.triggered_event_ids.is_empty() {
        ui.separator();
        ui.label(format!("Events so far: {}", state.side_event_count));
        for id in &state.triggered_event_ids {
            ui.label(format!("• {id}"));
        }
    }
}

fn draw_lifestyle(ui: &mut egui::Ui, state: &RunState) {
    ui.heading("Private life");
    for slot in LifestyleSlot::ALL {
        let picked = state
            .lifestyle
            .get(slot)
            .map_or("not chosen", |choice| choice.label());
        ui.label(format!("{}: {}", slot.label(), picked));
    }
}
