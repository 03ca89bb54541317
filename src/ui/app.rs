use eframe::egui;
use egui::Layout;
use std::sync::mpsc;

use koica_sim::engine::config::EngineConfig;
use koica_sim::engine::engine::Engine;
use koica_sim::engine::odds::OddsReport;
use koica_sim::engine::protocol::{EngineCommand, EngineResponse};
use koica_sim::engine::session::SessionView;
use koica_sim::model::game_save::default_save_path;
use koica_sim::model::message::Message;
use koica_sim::model::run_state::GameMode;

use crate::ui::center_panel::draw_center_panel;
use crate::ui::left_panel::draw_left_panel;
use crate::ui::right_panel::draw_right_panel;
use crate::ui::settings::UiSettings;

/* =========================
   Tabs
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeftTab {
    #[default]
    Status,
    Office,
    Lifestyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RightTab {
    #[default]
    Report,
    Odds,
    Settings,
}

/* =========================
   UI State
   ========================= */

pub struct UiState {
    pub input_text: String,
    pub view: Option<SessionView>,
    pub status_line: Option<String>,
    pub odds: Option<OddsReport>,
    pub odds_samples: u32,
    pub connection: Option<Result<String, String>>,

    /// Editable copy; sent to the engine on apply.
    pub config: EngineConfig,
    pub next_mode: GameMode,
    pub save_path: String,

    pub should_auto_scroll: bool,
    pub settings: UiSettings,

    pub left_tab: LeftTab,
    pub right_tab: RightTab,
}

impl UiState {
    fn new(config: EngineConfig, settings: UiSettings) -> Self {
        Self {
            input_text: String::new(),
            view: None,
            status_line: None,
            odds: None,
            odds_samples: 10_000,
            connection: None,
            next_mode: config.mode,
            config,
            save_path: default_save_path().display().to_string(),
            should_auto_scroll: true,
            settings,
            left_tab: LeftTab::default(),
            right_tab: RightTab::default(),
        }
    }
}

/* =========================
   App
   ========================= */

pub struct MyApp {
    pub ui: UiState,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl MyApp {
    pub fn new(config: EngineConfig, settings: UiSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let engine_config = config.clone();
        std::thread::spawn(move || match Engine::new(cmd_rx, resp_tx.clone(), engine_config) {
            Ok(mut engine) => engine.run(),
            Err(err) => {
                tracing::error!(error = %err, "engine failed to start");
                let _ = resp_tx.send(EngineResponse::Error(format!("{err:#}")));
            }
        });

        Self {
            ui: UiState::new(config, settings),
            cmd_tx,
            resp_rx,
        }
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("engine thread is gone");
        }
    }

    fn poll_engine(&mut self) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::View(view) => {
                    let grew = self
                        .ui
                        .view
                        .as_ref()
                        .map_or(true, |old| old.journal.len() != view.journal.len());
                    self.ui.should_auto_scroll |= grew;
                    self.ui.view = Some(*view);
                }
                EngineResponse::Error(err) => {
                    self.ui.status_line = Some(err);
                }
                EngineResponse::Odds(report) => {
                    self.ui.odds = Some(report);
                }
                EngineResponse::Connection(result) => {
                    self.ui.connection = Some(result);
                }
                EngineResponse::Saved(path) => {
                    self.ui.status_line = Some(format!("Saved to {}", path.display()));
                }
                EngineResponse::Config(config) => {
                    self.ui.config = config;
                }
            }
        }
    }

    pub fn draw_message(&self, ui: &mut egui::Ui, msg: &Message) {
        let bg = self.ui.settings.color(msg.color_key());
        let (right, text) = match msg {
            Message::Director(t) => (true, format!("You: {t}")),
            Message::Narration { text, .. } => (false, text.clone()),
            Message::System(t) => (false, t.clone()),
        };

        ui.add_space(6.0);

        if right {
            ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                bubble(ui, bg, &text);
            });
        } else {
            bubble(ui, bg, &text);
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui.settings.ui_scale);

        self.poll_engine();

        draw_left_panel(ctx, &mut self.ui);
        draw_right_panel(ctx, &mut self.ui, &self.cmd_tx);
        draw_center_panel(ctx, self);

        self.ui.should_auto_scroll = false;

        // The engine answers asynchronously.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

/* =========================
   UI Helpers
   ========================= */

pub fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}
