use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Validated, immutable game parameters. Construct with `Config::new`;
/// the plain struct literal is also public for callers who already know
/// their values are valid (e.g. deserializing a `Replay`), but `new`
/// is the only way to get validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub num_players: u8,
    pub coin_init: u32,
    pub coin_gold_init: u32,
    pub coin_max_per_player: u32,
    pub coin_min_take2: u32,
    pub card_visible_per_level: usize,
    pub card_levels: [u8; 3],
    pub card_visible_total: usize,
    pub card_max_reserved: usize,
}

/// Per-player-count default bank size, indexed by `num_players`
/// (1-indexed; solo play uses the 2-player table entry, matching the
/// closest real-game analogue rather than being separately specified).
const COIN_INIT_BY_PLAYERS: [u32; 5] = [0, 4, 4, 5, 7];

impl Config {
    /// Build a `Config` for `num_players`, defaulting every other field
    /// from §3's constants table, then validate it.
    pub fn for_players(num_players: u8) -> Result<Config, EngineError> {
        if !(1..=4).contains(&num_players) {
            return Err(EngineError::invalid_config(format!(
                "num_players must be in [1, 4], got {num_players}"
            )));
        }
        let coin_init = COIN_INIT_BY_PLAYERS[num_players as usize];
        Config::new(Config {
            num_players,
            coin_init,
            coin_gold_init: 5,
            coin_max_per_player: 10,
            coin_min_take2: 4,
            card_visible_per_level: 4,
            card_levels: [1, 2, 3],
            card_visible_total: 12,
            card_max_reserved: 3,
        })
    }

    /// Validate an already-constructed `Config`, returning it unchanged
    /// if every field is internally consistent.
    pub fn new(config: Config) -> Result<Config, EngineError> {
        if !(1..=4).contains(&config.num_players) {
            return Err(EngineError::invalid_config(format!(
                "num_players must be in [1, 4], got {}",
                config.num_players
            )));
        }
        if config.coin_max_per_player == 0 {
            return Err(EngineError::invalid_config(
                "coin_max_per_player must be positive",
            ));
        }
        if config.coin_min_take2 == 0 || config.coin_min_take2 > config.coin_init {
            return Err(EngineError::invalid_config(format!(
                "coin_min_take2 ({}) must be positive and at most coin_init ({})",
                config.coin_min_take2, config.coin_init
            )));
        }
        if config.card_visible_per_level * config.card_levels.len()
            != config.card_visible_total
        {
            return Err(EngineError::invalid_config(format!(
                "card_visible_total ({}) must equal card_visible_per_level ({}) * card_levels.len() ({})",
                config.card_visible_total,
                config.card_visible_per_level,
                config.card_levels.len()
            )));
        }
        if config.card_levels != [1, 2, 3] {
            return Err(EngineError::invalid_config(format!(
                "card_levels must be [1, 2, 3], got {:?}",
                config.card_levels
            )));
        }
        if config.card_max_reserved == 0 {
            return Err(EngineError::invalid_config(
                "card_max_reserved must be positive",
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_players_matches_documented_coin_init_table() {
        assert_eq!(Config::for_players(2).unwrap().coin_init, 4);
        assert_eq!(Config::for_players(3).unwrap().coin_init, 5);
        assert_eq!(Config::for_players(4).unwrap().coin_init, 7);
    }

    #[test]
    fn for_players_rejects_out_of_range_counts() {
        assert!(Config::for_players(0).is_err());
        assert!(Config::for_players(5).is_err());
    }

    #[test]
    fn new_rejects_inconsistent_visible_total() {
        let mut config = Config::for_players(2).unwrap();
        config.card_visible_total = 99;
        assert!(Config::new(config).is_err());
    }
}
