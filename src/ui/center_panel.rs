use eframe::egui;

use koica_sim::engine::session::{ChoiceWarning, SessionView};
use koica_sim::engine::termination::composite_score;
use koica_sim::model::lifestyle::LifestyleSlot;
use koica_sim::model::scenario::Choice;

use koica_sim::engine::protocol::EngineCommand;
use super::app::MyApp;

pub fn draw_center_panel(ctx: &egui::Context, app: &mut MyApp) {
    let input_id = egui::Id::new("action_input_box");
    let mut pending: Option<EngineCommand> = None;

    let free_form = app.ui.view.as_ref().is_some_and(|v| {
        v.free_form_enabled && v.started && !v.state.ended && !v.state.in_side_event()
    });

    // ---------- Free-form action bar ----------
    if free_form {
        egui::TopBottomPanel::bottom("action_input").show(ctx, |ui| {
            let mut send_now = false;

            ui.horizontal(|ui| {
                let response = ui.add_sized(
                    [ui.available_width() - 80.0, 40.0],
                    egui::TextEdit::multiline(&mut app.ui.input_text)
                        .id(input_id)
                        .hint_text("Or describe your own course of action…")
                        .lock_focus(true),
                );

                // Enter vs Shift+Enter
                if response.has_focus() {
                    let (enter, shift) = ui.input(|i| (i.key_pressed(egui::Key::Enter), i.modifiers.shift));
                    if enter && !shift {
                        send_now = true;
                    }
                }

                if ui.button("Act").clicked() {
                    send_now = true;
                }
            });

            if send_now {
                let text = app.ui.input_text.trim().to_string();
                if !text.is_empty() {
                    pending = Some(EngineCommand::FreeAction(text));
                    app.ui.input_text.clear();
                }
                ui.memory_mut(|m| m.request_focus(input_id));
            }
        });
    }

    // ---------- Scenario and journal ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        if let Some(status) = &app.ui.status_line {
            ui.colored_label(egui::Color32::from_rgb(220, 160, 60), status);
        }

        match &app.ui.view {
            None => {
                ui.label("Starting…");
            }
            Some(view) if !view.started => {
                if let Some(cmd) = draw_setup(ui, view) {
                    pending = Some(cmd);
                }
            }
            Some(view) => {
                if let Some(cmd) = draw_scenario(ui, view) {
                    pending = Some(cmd);
                }
            }
        }

        ui.separator();

        egui::ScrollArea::vertical()
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                if let Some(view) = &app.ui.view {
                    for msg in &view.journal {
                        app.draw_message(ui, msg);
                    }
                }
            });
    });

    if let Some(cmd) = pending {
        app.ui.status_line = None;
        app.send_command(cmd);
    }
}

fn draw_setup(ui: &mut egui::Ui, view: &SessionView) -> Option<EngineCommand> {
    let mut cmd = None;

    ui.heading("Before you fly out");
    ui.label("Settle your private life. Each choice shapes your stress and wellbeing from day one.");

    for slot in LifestyleSlot::ALL {
        ui.add_space(4.0);
        match view.state.lifestyle.get(slot) {
            Some(choice) => {
                ui.label(format!("✔ {}: {}", slot.label(), choice.label()));
            }
            None => {
                ui.label(egui::RichText::new(slot.label()).strong());
                ui.horizontal_wrapped(|ui| {
                    for option in slot.options() {
                        let hint = option
                            .deltas()
                            .iter()
                            .map(|(stat, d)| format!("{} {:+}", stat.label(), d))
                            .collect::<Vec<_>>()
                            .join(", ");
                        if ui.button(option.label()).on_hover_text(hint).clicked() {
                            cmd = Some(EngineCommand::ChooseLifestyle(option));
                        }
                    }
                });
            }
        }
    }

    ui.add_space(8.0);
    if ui
        .add_enabled(view.pending_lifestyle.is_empty(), egui::Button::new("Begin the term"))
        .clicked()
    {
        cmd = Some(EngineCommand::BeginTerm);
    }

    cmd
}

fn draw_scenario(ui: &mut egui::Ui, view: &SessionView) -> Option<EngineCommand> {
    let mut cmd = None;

    if let Some(reason) = &view.halted {
        ui.colored_label(egui::Color32::from_rgb(220, 70, 70), format!("The run cannot continue: {reason}"));
        if ui.button("Start a new term").clicked() {
            cmd = Some(EngineCommand::NewRun { mode: view.state.mode });
        }
        return cmd;
    }

    let Some(node) = &view.node else {
        return None;
    };

    ui.heading(&node.title);
    ui.label(&node.description);
    ui.add_space(6.0);

    if let Some(report) = &view.final_report {
        ui.label(format!("Final score: {:.1}", composite_score(&report.stats)));
        if ui.button("Start a new term").clicked() {
            cmd = Some(EngineCommand::NewRun { mode: view.state.mode });
        }
        return cmd;
    }

    for (i, choice) in node.choices.iter().enumerate() {
        let warning = view.warnings.get(i).copied().unwrap_or(ChoiceWarning {
            would_end: None,
            risky: false,
        });
        if choice_button(ui, choice, warning) {
            cmd = Some(EngineCommand::Choose(i));
        }
    }

    cmd
}

fn choice_button(ui: &mut egui::Ui, choice: &Choice, warning: ChoiceWarning) -> bool {
    let mut clicked = false;

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            clicked = ui.button(&choice.text).clicked();
            if warning.risky {
                ui.colored_label(egui::Color32::from_rgb(220, 160, 60), "⚠ risky");
            }
            if let Some(ending) = warning.would_end {
                ui.colored_label(
                    egui::Color32::from_rgb(220, 70, 70),
                    format!("✖ ends the term ({ending})"),
                );
            }
        });
        if let Some(sub) = &choice.subtext {
            ui.label(egui::RichText::new(sub).small());
        }
        if let Some(trade_off) = &choice.trade_off {
            ui.label(egui::RichText::new(trade_off).italics().small());
        }
    });

    clicked
}
