use crate::action::Action;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::state::GameState;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A complete, self-sufficient record of one game: everything needed to
/// reconstruct it deterministically (config, player names, seed) plus
/// the full action history. `metadata` is opaque to the core — callers
/// may stash a `seed` mirror, wall-clock timestamps, or anything else
/// there without the engine caring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    pub config: Config,
    pub player_names: Vec<String>,
    pub seed: u64,
    pub action_history: Vec<Action>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Replay {
    pub fn to_json(&self) -> EngineResult<String> {
        serde_json::to_string(self)
            .map_err(|e| crate::error::EngineError::deserialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> EngineResult<Replay> {
        serde_json::from_str(json)
            .map_err(|e| crate::error::EngineError::deserialization(e.to_string()))
    }

    /// Rebuild an `Engine` from `config`/`player_names`/`seed` and replay
    /// every recorded action against it in order, returning the sequence
    /// of resulting states alongside the reconstructed engine. Fails on
    /// the first action that does not apply cleanly — a replay is only
    /// ever valid end-to-end or not at all.
    pub fn replay(&self) -> EngineResult<(Vec<GameState>, Engine)> {
        self.replay_with_catalog(Catalog::standard())
    }

    pub fn replay_with_catalog(&self, catalog: Catalog) -> EngineResult<(Vec<GameState>, Engine)> {
        let mut engine = Engine::with_catalog(
            self.config,
            self.seed,
            Some(self.player_names.clone()),
            catalog,
        )?;
        let mut states = Vec::with_capacity(self.action_history.len() + 1);
        states.push(engine.state().clone());
        for action in &self.action_history {
            engine.step(action.clone())?;
            states.push(engine.state().clone());
        }
        Ok((states, engine))
    }
}
