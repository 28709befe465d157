use crate::action::Action;
use crate::card::Card;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::gem_bag::GemBag;
use crate::player::PlayerState;
use crate::role::Role;
use crate::state::GameState;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Score threshold for `game_end`/`winners`. A spec constant, not a
/// `Config` field (see DESIGN.md's Open Question 3).
pub const WIN_SCORE: u32 = 15;

/// Owns everything a `GameState` does not: the mutable per-level draw
/// decks, the roles deck, the seeded RNG, and the action history. Every
/// shuffle and draw consumes RNG state in a fixed order (levels
/// ascending, then roles) so that seed + history uniquely determine
/// every observable outcome.
pub struct Engine {
    state: GameState,
    decks: [Vec<Card>; 3],
    role_deck: Vec<Role>,
    rng: StdRng,
    seed: u64,
    player_names: Vec<String>,
    history: Vec<Action>,
}

impl Engine {
    pub fn new(config: Config, seed: u64, names: Option<Vec<String>>) -> EngineResult<Engine> {
        Engine::with_catalog(config, seed, names, Catalog::standard())
    }

    pub fn with_catalog(
        config: Config,
        seed: u64,
        names: Option<Vec<String>>,
        catalog: Catalog,
    ) -> EngineResult<Engine> {
        let config = Config::new(config)?;
        let names = match names {
            Some(names) => {
                if names.len() != config.num_players as usize {
                    return Err(EngineError::invalid_config(format!(
                        "expected {} player names, got {}",
                        config.num_players,
                        names.len()
                    )));
                }
                names
            }
            None => (0..config.num_players).map(|i| format!("p{i}")).collect(),
        };

        let mut rng = StdRng::seed_from_u64(seed);

        let mut decks: [Vec<Card>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for &level in &config.card_levels {
            let mut deck: Vec<Card> = catalog
                .cards
                .iter()
                .filter(|c| c.level == level)
                .cloned()
                .collect();
            deck.shuffle(&mut rng);
            decks[level as usize - 1] = deck;
        }

        let mut role_deck = catalog.roles.clone();
        role_deck.shuffle(&mut rng);

        let mut visible_cards = Vec::new();
        for &level in &config.card_levels {
            let deck = &mut decks[level as usize - 1];
            for _ in 0..config.card_visible_per_level {
                match deck.pop() {
                    Some(card) => visible_cards.push(card),
                    None => break,
                }
            }
        }

        let mut visible_roles = Vec::new();
        for _ in 0..(config.num_players as usize + 1) {
            match role_deck.pop() {
                Some(role) => visible_roles.push(role),
                None => break,
            }
        }

        let players = (0..config.num_players as usize)
            .map(|i| PlayerState::new(i, names[i].clone()))
            .collect();

        let state = GameState {
            bank: GemBag::initial_bank(config.coin_init, config.coin_gold_init),
            config,
            players,
            visible_cards,
            visible_roles,
            turn: 0,
            last_action: None,
        };

        info!(
            "engine constructed: {} players, seed {seed}",
            state.config.num_players
        );

        Ok(Engine {
            state,
            decks,
            role_deck,
            rng,
            seed,
            player_names: names,
            history: Vec::new(),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &[Action] {
        &self.history
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player_names(&self) -> &[String] {
        &self.player_names
    }

    /// Validate `action` against the current state, apply it, append it
    /// to history, and advance the turn (refilling the visible grid).
    /// On failure the engine's state is unchanged.
    pub fn step(&mut self, action: Action) -> EngineResult<&GameState> {
        let next = action.apply(&self.state)?;
        self.state = next;
        self.history.push(action);
        self.advance_turn();
        Ok(&self.state)
    }

    fn advance_turn(&mut self) {
        for &level in &self.state.config.card_levels {
            let present = self
                .state
                .visible_cards
                .iter()
                .filter(|c| c.level == level)
                .count();
            let deck = &mut self.decks[level as usize - 1];
            let mut needed = self.state.config.card_visible_per_level.saturating_sub(present);
            while needed > 0 {
                match deck.pop() {
                    Some(card) => {
                        self.state.visible_cards.push(card);
                        needed -= 1;
                    }
                    None => break,
                }
            }
        }
        self.state.turn += 1;
        debug!("advanced to turn {}", self.state.turn);
    }

    pub fn legal_actions(&self, seat: Option<usize>) -> Vec<Action> {
        let seat = seat.unwrap_or_else(|| self.state.active_seat());
        Action::enumerate_legal_for_seat(&self.state, seat)
    }

    /// True when either at least one player has reached `WIN_SCORE`, or
    /// the most recently completed round consisted entirely of `Noop`s
    /// (a deadlock — no player had any other legal move).
    pub fn game_end(&self) -> bool {
        if self.state.players.iter().any(|p| p.score >= WIN_SCORE) {
            return true;
        }
        let n = self.state.config.num_players as usize;
        if self.history.len() < n {
            return false;
        }
        self.history[self.history.len() - n..]
            .iter()
            .all(|a| matches!(a, Action::Noop))
    }

    pub fn winners(&self) -> Vec<&PlayerState> {
        self.state
            .players
            .iter()
            .filter(|p| p.score >= WIN_SCORE)
            .collect()
    }

    /// Copy state, decks, and history; optionally re-seed the RNG that
    /// drives future shuffles/draws. The copy's past is identical to
    /// `self`'s regardless of `seed` — only subsequent draws diverge.
    pub fn clone(&self, seed: Option<u64>) -> Engine {
        let seed = seed.unwrap_or(self.seed);
        Engine {
            state: self.state.clone(),
            decks: self.decks.clone(),
            role_deck: self.role_deck.clone(),
            rng: StdRng::seed_from_u64(seed),
            seed,
            player_names: self.player_names.clone(),
            history: self.history.clone(),
        }
    }

    /// Export a `Replay` document: config, player names, seed, full
    /// action history, and an (opaque-to-the-core) metadata map.
    pub fn export(&self) -> crate::replay::Replay {
        crate::replay::Replay {
            config: self.state.config,
            player_names: self.player_names.clone(),
            seed: self.seed,
            action_history: self.history.clone(),
            metadata: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gem::Gem;

    #[test]
    fn new_deals_12_visible_cards_and_players_plus_one_roles() {
        let config = Config::for_players(2).unwrap();
        let engine = Engine::new(config, 42, None).unwrap();
        assert_eq!(engine.state().visible_cards.len(), 12);
        assert_eq!(engine.state().visible_roles.len(), 3);
        assert_eq!(engine.state().turn, 0);
    }

    #[test]
    fn same_seed_deals_the_same_visible_cards() {
        let config = Config::for_players(3).unwrap();
        let a = Engine::new(config, 7, None).unwrap();
        let b = Engine::new(config, 7, None).unwrap();
        assert_eq!(a.state().visible_cards, b.state().visible_cards);
    }

    #[test]
    fn different_seeds_usually_deal_different_cards() {
        let config = Config::for_players(3).unwrap();
        let a = Engine::new(config, 1, None).unwrap();
        let b = Engine::new(config, 2, None).unwrap();
        assert_ne!(a.state().visible_cards, b.state().visible_cards);
    }

    #[test]
    fn step_refills_visible_grid_after_a_buy() {
        let config = Config::for_players(2).unwrap();
        let mut engine = Engine::new(config, 42, None).unwrap();
        // Hand the active player enough of every color to buy the first
        // visible card outright, bypassing enumeration.
        let card = engine.state().visible_cards[0].clone();
        let mut bag = GemBag::empty();
        for g in Gem::standard() {
            bag[g] = card.cost.get(g);
        }
        {
            let seat = engine.state().active_seat();
            // SAFETY net: construct a fresh state by stepping a Take3-free
            // path is unnecessary here; we mutate through a controlled
            // reserve/buy-free test using direct field access instead.
            let mut state = engine.state.clone();
            state.players[seat].gems = bag;
            state.bank -= bag;
            engine.state = state;
        }
        let action = crate::action::Action::Buy {
            idx: crate::card::CardIdx::Visible(0),
            card: Some(card.clone()),
            payment: bag,
        };
        engine.step(action).unwrap();
        assert_eq!(engine.state().visible_cards.len(), 12);
        assert_eq!(engine.state().turn, 1);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn game_end_true_once_a_player_reaches_win_score() {
        let config = Config::for_players(2).unwrap();
        let mut engine = Engine::new(config, 42, None).unwrap();
        engine.state.players[0].score = WIN_SCORE;
        assert!(engine.game_end());
        assert_eq!(engine.winners().len(), 1);
    }

    #[test]
    fn game_end_true_after_a_full_round_of_noop() {
        let config = Config::for_players(2).unwrap();
        let mut engine = Engine::new(config, 42, None).unwrap();
        engine.step(Action::Noop).unwrap();
        engine.step(Action::Noop).unwrap();
        assert!(engine.game_end());
    }

    #[test]
    fn clone_preserves_state_and_history_regardless_of_reseed() {
        let config = Config::for_players(2).unwrap();
        let mut engine = Engine::new(config, 42, None).unwrap();
        engine.step(Action::Noop).unwrap();

        let same_seed = engine.clone(None);
        assert_eq!(same_seed.state(), engine.state());
        assert_eq!(same_seed.history(), engine.history());
        assert_eq!(same_seed.seed(), 42);

        let reseeded = engine.clone(Some(7));
        assert_eq!(reseeded.state(), engine.state());
        assert_eq!(reseeded.seed(), 7);
    }
}
