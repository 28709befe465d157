//! A deterministic rule engine for a gem-and-card tableau-building game.
//!
//! `GameState` is an immutable snapshot; `Action` is the only way to
//! move from one state to the next, always through `validate` then
//! `apply`. `Engine` wraps a `GameState` with the mutable bits a single
//! session needs (draw decks, RNG, history) and `Replay` is the
//! serializable record that can reconstruct a session byte-for-byte.

pub mod action;
pub mod card;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod gem;
pub mod gem_bag;
pub mod player;
pub mod replay;
pub mod role;
pub mod state;

pub use crate::action::Action;
pub use crate::card::{Card, CardId, CardIdx};
pub use crate::catalog::Catalog;
pub use crate::config::Config;
pub use crate::engine::{Engine, WIN_SCORE};
pub use crate::error::{EngineError, EngineResult};
pub use crate::gem::Gem;
pub use crate::gem_bag::GemBag;
pub use crate::player::PlayerState;
pub use crate::replay::Replay;
pub use crate::role::{Role, RoleId};
pub use crate::state::GameState;
