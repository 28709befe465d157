use crate::action::Action;
use crate::card::Card;
use crate::config::Config;
use crate::gem_bag::GemBag;
use crate::player::PlayerState;
use crate::role::Role;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a game in progress. Constructed by the engine
/// at game start and replaced — never mutated — after each action.
/// Decks are not part of this type; they are engine-local mutable state
/// so that `GameState` stays trivially clonable and comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub config: Config,
    pub players: Vec<PlayerState>,
    pub bank: GemBag,
    pub visible_cards: Vec<Card>,
    pub visible_roles: Vec<Role>,
    pub turn: u64,
    pub last_action: Option<Action>,
}

impl GameState {
    pub fn round(&self) -> u64 {
        self.turn / self.config.num_players as u64
    }

    pub fn active_seat(&self) -> usize {
        (self.turn % self.config.num_players as u64) as usize
    }

    pub fn active_player(&self) -> &PlayerState {
        &self.players[self.active_seat()]
    }

    pub fn visible_cards_for_level(&self, level: u8) -> Vec<&Card> {
        self.visible_cards
            .iter()
            .filter(|c| c.level == level)
            .collect()
    }

    /// Sum of every token currently in play: the bank plus every
    /// player's hand. Used to check token-conservation invariants.
    pub fn total_tokens(&self) -> i32 {
        self.bank.total() + self.players.iter().map(|p| p.gems.total()).sum::<i32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn fresh_state(num_players: u8) -> GameState {
        let config = Config::for_players(num_players).unwrap();
        let catalog = Catalog::standard();
        let players = (0..num_players)
            .map(|i| PlayerState::new(i as usize, format!("p{i}")))
            .collect();
        GameState {
            bank: GemBag::initial_bank(config.coin_init, config.coin_gold_init),
            visible_cards: catalog.cards.into_iter().take(12).collect(),
            visible_roles: catalog.roles.into_iter().take(num_players as usize + 1).collect(),
            config,
            players,
            turn: 0,
            last_action: None,
        }
    }

    #[test]
    fn active_seat_is_turn_mod_num_players() {
        let mut state = fresh_state(3);
        state.turn = 4;
        assert_eq!(state.active_seat(), 1);
        assert_eq!(state.round(), 1);
    }

    #[test]
    fn visible_cards_for_level_filters_by_level() {
        let state = fresh_state(2);
        for card in state.visible_cards_for_level(1) {
            assert_eq!(card.level, 1);
        }
    }
}
