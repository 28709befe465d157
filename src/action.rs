use crate::card::{Card, CardIdx};
use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::gem::Gem;
use crate::gem_bag::{self, GemBag};
use crate::player::PlayerState;
use crate::state::GameState;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The five-variant action algebra. Every variant carries its own
/// validation and apply logic; `Action::validate`/`Action::apply`
/// dispatch on the tag. Validation is split into a stateless check
/// (depends only on `Config`) and a stateful check (needs the acting
/// player and the current state) so `enumerate_legal` can prune fast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "take_3_different")]
    Take3 {
        gems: Vec<Gem>,
        #[serde(with = "gem_bag::option_as_pairs", default)]
        ret: Option<GemBag>,
    },
    #[serde(rename = "take_2_same")]
    Take2 {
        gem: Gem,
        count: u32,
        #[serde(with = "gem_bag::option_as_pairs", default)]
        ret: Option<GemBag>,
    },
    #[serde(rename = "buy_card")]
    Buy {
        idx: CardIdx,
        card: Option<Card>,
        #[serde(with = "gem_bag::as_pairs")]
        payment: GemBag,
    },
    #[serde(rename = "reserve_card")]
    Reserve {
        idx: CardIdx,
        card: Option<Card>,
        take_gold: bool,
        ret: Option<Gem>,
    },
    #[serde(rename = "noop")]
    Noop,
}

impl Action {
    pub fn validate(&self, state: &GameState) -> EngineResult<()> {
        self.validate_stateless(&state.config)?;
        self.validate_stateful(state.active_player(), state)
    }

    fn validate_stateless(&self, _config: &Config) -> EngineResult<()> {
        match self {
            Action::Take3 { gems, ret } => {
                if gems.iter().any(|g| g.is_gold()) {
                    return Err(EngineError::invalid_action("Take3 cannot request Gold"));
                }
                let distinct: HashSet<Gem> = gems.iter().copied().collect();
                if distinct.len() != gems.len() {
                    return Err(EngineError::invalid_action("Take3 gems must be distinct"));
                }
                if gems.len() > 3 {
                    return Err(EngineError::invalid_action("Take3 may request at most 3 gems"));
                }
                if let Some(ret) = ret {
                    for (color, count) in ret.normalized() {
                        if count > 0 && gems.contains(&color) {
                            return Err(EngineError::invalid_action(
                                "Take3 cannot return a color it also took",
                            ));
                        }
                    }
                }
                Ok(())
            }
            Action::Take2 { gem, count, ret } => {
                if gem.is_gold() {
                    return Err(EngineError::invalid_action("Take2 cannot request Gold"));
                }
                if *count != 2 {
                    return Err(EngineError::invalid_action("Take2 count must be 2"));
                }
                if let Some(ret) = ret {
                    if ret.get(*gem) != 0 {
                        return Err(EngineError::invalid_action(
                            "Take2 cannot return the color it just took",
                        ));
                    }
                }
                Ok(())
            }
            Action::Buy { idx, .. } => {
                if matches!(idx, CardIdx::DeckHead(_)) {
                    return Err(EngineError::invalid_action(
                        "Buy cannot reference a deck head",
                    ));
                }
                Ok(())
            }
            Action::Reserve { idx, ret, take_gold, .. } => {
                if !matches!(idx, CardIdx::Visible(_)) {
                    return Err(EngineError::invalid_action(
                        "Reserve must reference a visible card",
                    ));
                }
                if ret.is_some() && !*take_gold {
                    return Err(EngineError::invalid_action(
                        "Reserve cannot return a gem without taking Gold",
                    ));
                }
                if matches!(ret, Some(g) if g.is_gold()) {
                    return Err(EngineError::invalid_action("Reserve cannot return Gold"));
                }
                Ok(())
            }
            Action::Noop => Ok(()),
        }
    }

    fn validate_stateful(&self, player: &PlayerState, state: &GameState) -> EngineResult<()> {
        let config = &state.config;
        match self {
            Action::Take3 { gems, ret } => {
                for &g in gems {
                    if state.bank.get(g) < 1 {
                        return Err(EngineError::invalid_action(format!(
                            "bank has no {g:?} left"
                        )));
                    }
                }
                let ret = ret.unwrap_or_else(GemBag::empty);
                for (color, count) in ret.normalized() {
                    if player.gems.get(color) < count {
                        return Err(EngineError::invalid_action(format!(
                            "player does not hold {count} {color:?} to return"
                        )));
                    }
                }
                let new_total = player.gems.total() + gems.len() as i32 - ret.total();
                if new_total > config.coin_max_per_player as i32 {
                    return Err(EngineError::invalid_action(
                        "Take3 would exceed the hand cap",
                    ));
                }
                Ok(())
            }
            Action::Take2 { gem, ret, .. } => {
                if state.bank.get(*gem) < config.coin_min_take2 as i32 {
                    return Err(EngineError::invalid_action(format!(
                        "bank needs at least {} {gem:?} for Take2",
                        config.coin_min_take2
                    )));
                }
                let ret = ret.unwrap_or_else(GemBag::empty);
                for (color, count) in ret.normalized() {
                    if player.gems.get(color) < count {
                        return Err(EngineError::invalid_action(format!(
                            "player does not hold {count} {color:?} to return"
                        )));
                    }
                }
                let new_total = player.gems.total() + 2 - ret.total();
                if new_total > config.coin_max_per_player as i32 {
                    return Err(EngineError::invalid_action(
                        "Take2 would exceed the hand cap",
                    ));
                }
                Ok(())
            }
            Action::Buy { idx, card, payment } => {
                let resolved = resolve_card(*idx, state, player)?;
                if let Some(expected) = card {
                    if expected.id != resolved.id {
                        return Err(EngineError::invalid_action(
                            "card cross-check id does not match the card at idx",
                        ));
                    }
                }
                if !player.check_afford(resolved, payment) {
                    return Err(EngineError::invalid_action(
                        "payment is not an affordable payment for this card",
                    ));
                }
                Ok(())
            }
            Action::Reserve { idx, card, take_gold, ret } => {
                if !player.can_reserve(config) {
                    return Err(EngineError::invalid_action("reserve pile is full"));
                }
                let resolved = resolve_card(*idx, state, player)?;
                if let Some(expected) = card {
                    if expected.id != resolved.id {
                        return Err(EngineError::invalid_action(
                            "card cross-check id does not match the card at idx",
                        ));
                    }
                }
                if *take_gold && state.bank.get(Gem::Gold) < 1 {
                    return Err(EngineError::invalid_action("bank has no Gold left"));
                }
                if let Some(color) = ret {
                    if player.gems.get(*color) < 1 {
                        return Err(EngineError::invalid_action(format!(
                            "player does not hold a {color:?} to return"
                        )));
                    }
                    let gold_delta = if *take_gold { 1 } else { 0 };
                    let new_total = player.gems.total() + gold_delta - 1;
                    if new_total != config.coin_max_per_player as i32 {
                        return Err(EngineError::invalid_action(
                            "reserve return must bring the hand to exactly the cap",
                        ));
                    }
                } else if *take_gold && player.gems.total() + 1 > config.coin_max_per_player as i32 {
                    return Err(EngineError::invalid_action(
                        "Reserve would exceed the hand cap without a return",
                    ));
                }
                Ok(())
            }
            Action::Noop => Ok(()),
        }
    }

    /// Apply this action to `state`, returning a new `GameState` with
    /// `last_action = Some(self)` and `turn` unchanged — the caller
    /// (the engine) advances the turn in a separate step.
    pub fn apply(&self, state: &GameState) -> EngineResult<GameState> {
        self.validate(state)?;
        trace!("applying action {:?} at turn {}", self, state.turn);
        let seat = state.active_seat();
        let mut next = state.clone();

        match self {
            Action::Take3 { gems, ret } => {
                let mut player = next.players[seat].clone();
                for &g in gems {
                    next.bank[g] -= 1;
                    player.gems[g] += 1;
                }
                if let Some(ret) = ret {
                    player.gems -= *ret;
                    next.bank += *ret;
                }
                next.players[seat] = player;
            }
            Action::Take2 { gem, ret, .. } => {
                let mut player = next.players[seat].clone();
                next.bank[*gem] -= 2;
                player.gems[*gem] += 2;
                if let Some(ret) = ret {
                    player.gems -= *ret;
                    next.bank += *ret;
                }
                next.players[seat] = player;
            }
            Action::Buy { idx, payment, .. } => {
                let mut player = next.players[seat].clone();
                let card = take_card(*idx, &mut next.visible_cards, &mut player)?;
                player.gems -= *payment;
                next.bank += *payment;
                player.score += card.points;
                player.purchased.push(card);
                player.discounts = PlayerState::recompute_discounts(&player.purchased);
                next.players[seat] = player;
            }
            Action::Reserve { idx, take_gold, ret, .. } => {
                let mut player = next.players[seat].clone();
                let card = take_card(*idx, &mut next.visible_cards, &mut player)?;
                player.reserved.push(card);
                if *take_gold {
                    next.bank[Gem::Gold] -= 1;
                    player.gems[Gem::Gold] += 1;
                }
                if let Some(color) = ret {
                    player.gems[*color] -= 1;
                    next.bank[*color] += 1;
                }
                next.players[seat] = player;
            }
            Action::Noop => {}
        }

        next.last_action = Some(self.clone());
        debug!(
            "turn {} seat {} applied {:?}",
            state.turn, seat, self
        );
        Ok(next)
    }

    /// Concatenate the per-variant legal-action enumerations for the
    /// active player, falling back to a single `Noop` when the
    /// concatenation is empty.
    pub fn enumerate_legal(state: &GameState) -> Vec<Action> {
        Action::enumerate_legal_for_seat(state, state.active_seat())
    }

    /// As `enumerate_legal`, but for an arbitrary seat rather than the
    /// one whose turn it currently is.
    pub fn enumerate_legal_for_seat(state: &GameState, seat: usize) -> Vec<Action> {
        let player = &state.players[seat];
        let config = &state.config;

        let mut actions = Vec::new();
        actions.extend(enumerate_take3(player, state, config));
        actions.extend(enumerate_take2(player, state, config));
        actions.extend(enumerate_buy(player, state));
        actions.extend(enumerate_reserve(player, state, config));

        if actions.is_empty() {
            actions.push(Action::Noop);
        }
        actions
    }
}

fn resolve_card<'a>(
    idx: CardIdx,
    state: &'a GameState,
    player: &'a PlayerState,
) -> EngineResult<&'a Card> {
    match idx {
        CardIdx::Visible(slot) => state
            .visible_cards
            .get(slot)
            .ok_or_else(|| EngineError::invalid_action(format!("no visible card at slot {slot}"))),
        CardIdx::Reserve(slot) => player
            .reserved
            .get(slot)
            .ok_or_else(|| EngineError::invalid_action(format!("no reserved card at slot {slot}"))),
        CardIdx::DeckHead(_) => Err(EngineError::invalid_action(
            "deck-head references are not purchasable or reservable",
        )),
    }
}

fn take_card(
    idx: CardIdx,
    visible_cards: &mut Vec<Card>,
    player: &mut PlayerState,
) -> EngineResult<Card> {
    match idx {
        CardIdx::Visible(slot) => {
            if slot >= visible_cards.len() {
                return Err(EngineError::internal_invariant(format!(
                    "visible slot {slot} vanished between validate and apply"
                )));
            }
            Ok(visible_cards.remove(slot))
        }
        CardIdx::Reserve(slot) => {
            if slot >= player.reserved.len() {
                return Err(EngineError::internal_invariant(format!(
                    "reserve slot {slot} vanished between validate and apply"
                )));
            }
            Ok(player.reserved.remove(slot))
        }
        CardIdx::DeckHead(_) => Err(EngineError::internal_invariant(
            "deck-head reached apply despite validation",
        )),
    }
}

/// All `k`-sized subsets of `available`, preserving `available`'s order
/// (which callers pass in canonical color order for determinism).
fn k_combinations(available: &[Gem], k: usize) -> Vec<Vec<Gem>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    match available.split_first() {
        None => Vec::new(),
        Some((&first, rest)) => {
            let mut out = k_combinations(rest, k);
            for mut combo in k_combinations(rest, k - 1) {
                combo.insert(0, first);
                out.push(combo);
            }
            out
        }
    }
}

/// Every distinct sub-multiset of `pool` with exactly `size` tokens.
fn bounded_multisets(pool: &GemBag, size: i32) -> HashSet<GemBag> {
    fn go(available: &mut GemBag, running: &mut GemBag, remaining: i32) -> HashSet<GemBag> {
        if remaining == 0 {
            return HashSet::from([*running]);
        }
        let mut out = HashSet::new();
        for color in Gem::standard() {
            if available.get(color) > 0 {
                available[color] -= 1;
                running[color] += 1;
                out.extend(go(available, running, remaining - 1));
                running[color] -= 1;
                available[color] += 1;
            }
        }
        out
    }
    if size < 0 {
        return HashSet::new();
    }
    let mut available = *pool;
    let mut running = GemBag::empty();
    go(&mut available, &mut running, size)
}

fn enumerate_take3(player: &PlayerState, state: &GameState, config: &Config) -> Vec<Action> {
    let available: Vec<Gem> = Gem::standard()
        .into_iter()
        .filter(|&g| state.bank.get(g) >= 1)
        .collect();
    if available.is_empty() {
        return Vec::new();
    }
    let k = available.len().min(3);
    let held = player.gems.total();
    let cap = config.coin_max_per_player as i32;

    let mut actions = Vec::new();
    if held + k as i32 <= cap {
        for combo in k_combinations(&available, k) {
            actions.push(Action::Take3 { gems: combo, ret: None });
        }
        return actions;
    }

    let excess = held + k as i32 - cap;
    for r in 0..=excess {
        let take_count = (cap - held + r).max(0) as usize;
        if take_count == 0 || take_count > available.len() {
            continue;
        }
        for combo in k_combinations(&available, take_count) {
            let mut returnable_pool = player.gems;
            for &g in &combo {
                returnable_pool[g] = 0;
            }
            returnable_pool[Gem::Gold] = 0;
            for multiset in bounded_multisets(&returnable_pool, r) {
                actions.push(Action::Take3 {
                    gems: combo.clone(),
                    ret: Some(multiset),
                });
            }
        }
    }
    actions
}

fn enumerate_take2(player: &PlayerState, state: &GameState, config: &Config) -> Vec<Action> {
    let held = player.gems.total();
    let cap = config.coin_max_per_player as i32;
    let mut actions = Vec::new();

    for g in Gem::standard() {
        if state.bank.get(g) < config.coin_min_take2 as i32 {
            continue;
        }
        if held + 2 <= cap {
            actions.push(Action::Take2 { gem: g, count: 2, ret: None });
            continue;
        }
        let need = held + 2 - cap;
        let mut pool = player.gems;
        pool[g] = 0;
        pool[Gem::Gold] = 0;
        for multiset in bounded_multisets(&pool, need) {
            actions.push(Action::Take2 {
                gem: g,
                count: 2,
                ret: Some(multiset),
            });
        }
    }
    actions
}

fn enumerate_buy(player: &PlayerState, state: &GameState) -> Vec<Action> {
    let mut actions = Vec::new();
    for (slot, card) in state.visible_cards.iter().enumerate() {
        for payment in player.affordable_payments(card) {
            actions.push(Action::Buy {
                idx: CardIdx::Visible(slot),
                card: Some(card.clone()),
                payment,
            });
        }
    }
    for (slot, card) in player.reserved.iter().enumerate() {
        for payment in player.affordable_payments(card) {
            actions.push(Action::Buy {
                idx: CardIdx::Reserve(slot),
                card: Some(card.clone()),
                payment,
            });
        }
    }
    actions
}

fn enumerate_reserve(player: &PlayerState, state: &GameState, config: &Config) -> Vec<Action> {
    if !player.can_reserve(config) {
        return Vec::new();
    }
    let gold_available = state.bank.get(Gem::Gold) > 0;
    let held = player.gems.total();
    let cap = config.coin_max_per_player as i32;
    let gold_exceeds_cap = gold_available && held + 1 > cap;

    let mut actions = Vec::new();
    for (slot, card) in state.visible_cards.iter().enumerate() {
        if gold_exceeds_cap {
            for color in Gem::standard() {
                if player.gems.get(color) > 0 {
                    actions.push(Action::Reserve {
                        idx: CardIdx::Visible(slot),
                        card: Some(card.clone()),
                        take_gold: true,
                        ret: Some(color),
                    });
                }
            }
        } else {
            actions.push(Action::Reserve {
                idx: CardIdx::Visible(slot),
                card: Some(card.clone()),
                take_gold: gold_available,
                ret: None,
            });
        }
    }
    actions
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
            visible_cards: catalog.cards.into_iter().take(config.card_visible_total).collect(),
            visible_roles: catalog.roles.into_iter().take(num_players as usize + 1).collect(),
            config,
            players,
            turn: 0,
            last_action: None,
        }
    }

    #[test]
    fn fresh_two_player_legal_action_count_matches_s1() {
        let state = fresh_state(2);
        let actions = Action::enumerate_legal(&state);
        // C(5,3) Take3 + 5 Take2 + 12 Reserve = 10 + 5 + 12 = 27 (no Buy: empty hand).
        assert_eq!(actions.len(), 27);
    }

    #[test]
    fn take3_at_exact_cap_never_enumerates_a_degenerate_no_op() {
        let mut state = fresh_state(2);
        state.players[0].gems = GemBag::from_pairs(&[(Gem::Red, 5), (Gem::Blue, 5)]);
        let actions = enumerate_take3(&state.players[0], &state, &state.config);
        assert!(actions.iter().all(|a| match a {
            Action::Take3 { gems, .. } => !gems.is_empty(),
            _ => true,
        }));
    }

    #[test]
    fn take3_apply_moves_one_of_each_color_and_conserves_tokens() {
        let state = fresh_state(2);
        let before = state.total_tokens();
        let action = Action::Take3 {
            gems: vec![Gem::Red, Gem::Blue, Gem::White],
            ret: None,
        };
        let next = action.apply(&state).unwrap();
        assert_eq!(next.bank.get(Gem::Red), state.bank.get(Gem::Red) - 1);
        assert_eq!(next.players[0].gems.get(Gem::Red), 1);
        assert_eq!(next.total_tokens(), before);
        assert_eq!(next.turn, state.turn);
    }

    #[test]
    fn take3_rejects_hand_cap_violation_without_sufficient_returns() {
        let mut state = fresh_state(2);
        state.players[0].gems = GemBag::from_pairs(&[(Gem::Red, 5), (Gem::Blue, 5)]);
        let action = Action::Take3 {
            gems: vec![Gem::White, Gem::Black, Gem::Green],
            ret: None,
        };
        assert!(action.validate(&state).is_err());
    }

    #[test]
    fn take3_with_exact_returns_leaves_hand_at_cap() {
        let mut state = fresh_state(2);
        state.players[0].gems = GemBag::from_pairs(&[(Gem::Red, 5), (Gem::Blue, 5)]);
        let action = Action::Take3 {
            gems: vec![Gem::White, Gem::Black, Gem::Green],
            ret: Some(GemBag::from_pairs(&[(Gem::Red, 2), (Gem::Blue, 1)])),
        };
        action.validate(&state).unwrap();
        let next = action.apply(&state).unwrap();
        assert_eq!(next.players[0].gems.total(), 10);
    }

    #[test]
    fn noop_preserves_every_field_except_last_action() {
        let state = fresh_state(2);
        let next = Action::Noop.apply(&state).unwrap();
        assert_eq!(next.bank, state.bank);
        assert_eq!(next.players, state.players);
        assert_eq!(next.visible_cards, state.visible_cards);
        assert_eq!(next.turn, state.turn);
        assert_eq!(next.last_action, Some(Action::Noop));
    }

    #[test]
    fn buy_rejects_deck_head_idx() {
        let action = Action::Buy {
            idx: CardIdx::DeckHead(1),
            card: None,
            payment: GemBag::empty(),
        };
        let state = fresh_state(2);
        assert!(action.validate_stateless(&state.config).is_err());
    }

    #[test]
    fn reserve_rejects_non_visible_idx() {
        let action = Action::Reserve {
            idx: CardIdx::Reserve(0),
            card: None,
            take_gold: false,
            ret: None,
        };
        let state = fresh_state(2);
        assert!(action.validate_stateless(&state.config).is_err());
    }

    #[test]
    fn reserve_with_gold_and_no_return_rejects_hand_cap_violation() {
        let mut state = fresh_state(2);
        state.players[0].gems = GemBag::from_pairs(&[(Gem::Red, 5), (Gem::Blue, 5)]);
        let action = Action::Reserve {
            idx: CardIdx::Visible(0),
            card: None,
            take_gold: true,
            ret: None,
        };
        assert!(action.validate(&state).is_err());
    }

    #[test]
    fn serialize_roundtrip_preserves_all_tagged_fields() {
        let actions = vec![
            Action::Take3 {
                gems: vec![Gem::Red, Gem::Blue],
                ret: Some(GemBag::from_pairs(&[(Gem::Green, 1)])),
            },
            Action::Take2 {
                gem: Gem::Black,
                count: 2,
                ret: None,
            },
            Action::Buy {
                idx: CardIdx::Visible(3),
                card: None,
                payment: GemBag::from_pairs(&[(Gem::Gold, 1)]),
            },
            Action::Reserve {
                idx: CardIdx::Visible(0),
                card: None,
                take_gold: true,
                ret: Some(Gem::Red),
            },
            Action::Noop,
        ];
        for action in actions {
            let json = serde_json::to_string(&action).unwrap();
            let back: Action = serde_json::from_str(&json).unwrap();
            assert_eq!(action, back);
        }
    }
}
