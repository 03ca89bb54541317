use std::sync::mpsc::{Receiver, Sender};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engine::config::{save_config, EngineConfig};
use crate::engine::error::EngineError;
use crate::engine::events::required_node_ids;
use crate::engine::graph::ScenarioGraph;
use crate::engine::llm_client::LlmClient;
use crate::engine::odds::estimate_odds;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::Session;
use crate::model::game_save::{load_game, save_game};
use crate::model::run_state::GameMode;
use crate::model::scenario::ScenarioContent;

/// Loads scenario content and, in generative mode, wires up the generator.
pub fn build_graph(config: &EngineConfig, mode: GameMode) -> Result<ScenarioGraph> {
    let content = match &config.content_path {
        Some(path) => ScenarioContent::load(path)?,
        None => ScenarioContent::embedded()?,
    };

    let required = required_node_ids();
    for issue in content.validate(required.iter().map(String::as_str)) {
        tracing::warn!(%issue, "scenario content issue");
    }
    tracing::info!(nodes = content.len(), "scenario content loaded");

    let mut graph = ScenarioGraph::new(content);
    if mode == GameMode::Generative {
        match LlmClient::new(config.llm.clone()) {
            Ok(client) => {
                graph = graph.with_generator(Box::new(client), config.llm.max_attempts);
            }
            Err(err) => tracing::warn!(error = %err, "generator unavailable, using authored scenarios"),
        }
    }
    Ok(graph)
}

pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    config: EngineConfig,
    session: Session,
    odds_rng: StdRng,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        config: EngineConfig,
    ) -> Result<Self> {
        let graph = build_graph(&config, config.mode)?;
        let session = Session::new(graph, config.mode, config.seed);
        let odds_rng = config
            .seed
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy);
        Ok(Self {
            rx,
            tx,
            config,
            session,
            odds_rng,
        })
    }

    fn send_view(&self) {
        let _ = self.tx.send(EngineResponse::View(Box::new(self.session.view())));
    }

    fn send_error(&self, err: impl std::fmt::Display) {
        let _ = self.tx.send(EngineResponse::Error(err.to_string()));
    }

    fn report_turn_error(&self, err: EngineError) {
        if err.is_fatal() {
            tracing::error!(error = %err, "run halted");
            self.send_error(format!("{err}. Start a new term to continue."));
        } else {
            tracing::warn!(error = %err, "turn not applied");
            self.send_error(err);
        }
    }

    pub fn run(&mut self) {
        let _ = self.tx.send(EngineResponse::Config(self.config.clone()));
        self.send_view();

        while let Ok(cmd) = self.rx.recv() {
            match cmd {
                EngineCommand::NewRun { mode } => match build_graph(&self.config, mode) {
                    Ok(graph) => {
                        self.session = Session::new(graph, mode, self.config.seed);
                        tracing::info!(?mode, "new run");
                        self.send_view();
                    }
                    Err(err) => self.send_error(err),
                },

                EngineCommand::ChooseLifestyle(choice) => {
                    if let Err(err) = self.session.choose_lifestyle(choice) {
                        self.send_error(err);
                    }
                    self.send_view();
                }

                EngineCommand::BeginTerm => {
                    if let Err(err) = self.session.begin() {
                        self.send_error(err);
                    }
                    self.send_view();
                }

                EngineCommand::Choose(index) => {
                    if let Err(err) = self.session.choose(index) {
                        self.report_turn_error(err);
                    }
                    self.send_view();
                }

                EngineCommand::FreeAction(text) => {
                    if let Err(err) = self.session.free_action(&text) {
                        self.report_turn_error(err);
                    }
                    self.send_view();
                }

                EngineCommand::Save(path) => match save_game(&path, &self.session.to_save()) {
                    Ok(()) => {
                        let _ = self.tx.send(EngineResponse::Saved(path));
                    }
                    Err(err) => self.send_error(format!("save failed: {err:#}")),
                },

                EngineCommand::Load(path) => {
                    let loaded = load_game(&path).and_then(|save| {
                        let graph = build_graph(&self.config, save.mode)?;
                        Ok(Session::from_save(graph, save, self.config.seed)?)
                    });
                    match loaded {
                        Ok(session) => {
                            self.session = session;
                            tracing::info!(path = %path.display(), "game loaded");
                            self.send_view();
                        }
                        Err(err) => self.send_error(format!("load failed: {err:#}")),
                    }
                }

                EngineCommand::EstimateOdds { samples } => {
                    let report = estimate_odds(samples, &mut self.odds_rng);
                    let _ = self.tx.send(EngineResponse::Odds(report));
                }

                EngineCommand::TestConnection => {
                    let result = LlmClient::new(self.config.llm.clone())
                        .and_then(|client| client.test_connection())
                        .map_err(|err| format!("{err:#}"));
                    let _ = self.tx.send(EngineResponse::Connection(result));
                }

                EngineCommand::UpdateConfig(config) => {
                    save_config(&config);
                    self.config = config;
                    let _ = self.tx.send(EngineResponse::Config(self.config.clone()));
                }
            }
        }
    }
}
