use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::error::EngineError;
use crate::engine::events::is_side_event;
use crate::model::game_context::GameContext;
use crate::model::llm_decode::decode_generated_node;
use crate::model::run_state::{GameMode, RunState};
use crate::model::scenario::{ScenarioContent, ScenarioNode, ENDING_PREFIX, GENERATED_NODE, START_NODE};

/// External author of scenarios and interpreter of free-form actions.
/// Both calls return raw model text; decoding is the engine's job.
pub trait ScenarioGenerator: Send {
    fn generate_scenario(&self, context: &GameContext) -> anyhow::Result<String>;
    fn interpret_action(&self, context: &GameContext, action: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOrigin {
    Static,
    Generated,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct ResolvedNode {
    pub id: String,
    pub node: ScenarioNode,
    pub origin: NodeOrigin,
}

pub struct ScenarioGraph {
    content: ScenarioContent,
    generator: Option<Box<dyn ScenarioGenerator>>,
    max_attempts: u32,
}

impl ScenarioGraph {
    pub fn new(content: ScenarioContent) -> Self {
        Self {
            content,
            generator: None,
            max_attempts: 2,
        }
    }

    pub fn with_generator(mut self, generator: Box<dyn ScenarioGenerator>, max_attempts: u32) -> Self {
        self.generator = Some(generator);
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn content(&self) -> &ScenarioContent {
        &self.content
    }

    pub fn generator(&self) -> Option<&dyn ScenarioGenerator> {
        self.generator.as_deref()
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Static lookup, or a generated node when `id` is the generative sentinel.
    pub fn node<R: Rng + ?Sized>(
        &self,
        id: &str,
        state: &mut RunState,
        rng: &mut R,
    ) -> Result<ResolvedNode, EngineError> {
        if id == GENERATED_NODE {
            return self.generated_or_fallback(state, rng);
        }
        match self.content.get(id) {
            Some(node) => Ok(ResolvedNode {
                id: id.to_string(),
                node: node.clone(),
                origin: NodeOrigin::Static,
            }),
            None if state.mode == GameMode::Generative => {
                tracing::warn!(id, "scenario missing from content, falling back");
                self.fallback(state, rng)
            }
            None => Err(EngineError::ScenarioNotFound(id.to_string())),
        }
    }

    fn generated_or_fallback<R: Rng + ?Sized>(
        &self,
        state: &mut RunState,
        rng: &mut R,
    ) -> Result<ResolvedNode, EngineError> {
        if let Some(generator) = self.generator.as_deref() {
            let context = GameContext::from_state(state);
            for attempt in 1..=self.max_attempts {
                let node = generator
                    .generate_scenario(&context)
                    .and_then(|raw| decode_generated_node(&raw).map_err(anyhow::Error::from));
                match node {
                    Ok(node) => {
                        tracing::info!(attempt, title = %node.title, "generated scenario");
                        return Ok(ResolvedNode {
                            id: GENERATED_NODE.to_string(),
                            node,
                            origin: NodeOrigin::Generated,
                        });
                    }
                    Err(err) => {
                        tracing::warn!(attempt, max = self.max_attempts, error = %err, "scenario generation failed")
                    }
                }
            }
        } else {
            tracing::warn!("no scenario generator configured");
        }
        self.fallback(state, rng)
    }

    fn is_main_line(&self, id: &str) -> bool {
        id != START_NODE
            && id != GENERATED_NODE
            && !id.starts_with(ENDING_PREFIX)
            && !is_side_event(id)
            && self.content.get(id).is_some_and(|n| !n.is_terminal())
    }

    /// Random unvisited main-line node; the visited set is reset once the
    /// pool runs dry.
    pub fn fallback<R: Rng + ?Sized>(
        &self,
        state: &mut RunState,
        rng: &mut R,
    ) -> Result<ResolvedNode, EngineError> {
        let mut main_line: Vec<&str> = self.content.ids().filter(|id| self.is_main_line(id)).collect();
        main_line.sort_unstable();

        let mut pool: Vec<&str> = main_line
            .iter()
            .copied()
            .filter(|id| !state.has_visited(id))
            .collect();
        if pool.is_empty() {
            tracing::info!("fallback pool exhausted, resetting visited set");
            state.visited.clear();
            pool = main_line;
        }

        let id = pool
            .choose(rng)
            .copied()
            .ok_or_else(|| EngineError::ScenarioNotFound(GENERATED_NODE.to_string()))?;
        let node = self
            .content
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::ScenarioNotFound(id.to_string()))?;
        Ok(ResolvedNode {
            id: id.to_string(),
            node,
            origin: NodeOrigin::Fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const CONTENT: &str = r#"{
        "start": {"title": "s", "description": "d", "choices": [{"text": "go", "result": {"next": "a"}}]},
        "a": {"title": "a", "description": "d", "choices": [{"text": "go", "result": {"next": "b"}}]},
        "b": {"title": "b", "description": "d", "choices": [{"text": "go"}]},
        "life_event_illness": {"title": "ill", "description": "d", "choices": [{"text": "rest"}]},
        "ending_average": {"title": "end", "description": "d"}
    }"#;

    struct Scripted {
        reply: &'static str,
        calls: Arc<AtomicU32>,
    }

    impl ScenarioGenerator for Scripted {
        fn generate_scenario(&self, _context: &GameContext) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }

        fn interpret_action(&self, _context: &GameContext, _action: &str) -> anyhow::Result<String> {
            anyhow::bail!("not scripted")
        }
    }

    fn graph() -> ScenarioGraph {
        ScenarioGraph::new(ScenarioContent::from_json(CONTENT).unwrap())
    }

    #[test]
    fn static_missing_node_is_fatal() {
        let mut state = RunState::new(GameMode::Static);
        let mut rng = StdRng::seed_from_u64(1);
        let err = graph().node("zzz", &mut state, &mut rng).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, EngineError::ScenarioNotFound(id) if id == "zzz"));
    }

    #[test]
    fn fallback_only_draws_main_line_and_resets() {
        let g = graph();
        let mut state = RunState::new(GameMode::Generative);
        let mut rng = StdRng::seed_from_u64(8);
        state.mark_visited("a");
        for _ in 0..10 {
            let resolved = g.node(GENERATED_NODE, &mut state, &mut rng).unwrap();
            assert_eq!(resolved.origin, NodeOrigin::Fallback);
            assert_eq!(resolved.id, "b");
        }
        state.mark_visited("b");
        let resolved = g.fallback(&mut state, &mut rng).unwrap();
        assert!(resolved.id == "a" || resolved.id == "b");
        assert!(state.visited.is_empty());
    }

    #[test]
    fn malformed_generation_retries_then_falls_back() {
        let calls = Arc::new(AtomicU32::new(0));
        let g = graph().with_generator(
            Box::new(Scripted {
                reply: "sorry, no JSON today",
                calls: calls.clone(),
            }),
            3,
        );
        let mut state = RunState::new(GameMode::Generative);
        let mut rng = StdRng::seed_from_u64(4);
        let resolved = g.node(GENERATED_NODE, &mut state, &mut rng).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(resolved.origin, NodeOrigin::Fallback);
    }

    #[test]
    fn generated_node_is_stamped() {
        let g = graph().with_generator(
            Box::new(Scripted {
                reply: r#"{"title": "Visit", "description": "Minister drops by.", "choices": [{"text": "Host", "result": {"next": "start"}}]}"#,
                calls: Arc::new(AtomicU32::new(0)),
            }),
            2,
        );
        let mut state = RunState::new(GameMode::Generative);
        let mut rng = StdRng::seed_from_u64(4);
        let resolved = g.node(GENERATED_NODE, &mut state, &mut rng).unwrap();
        assert_eq!(resolved.origin, NodeOrigin::Generated);
        assert_eq!(resolved.id, GENERATED_NODE);
        assert_eq!(resolved.node.choices[0].result.next.as_deref(), Some(GENERATED_NODE));
    }
}
