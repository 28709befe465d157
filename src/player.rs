use crate::card::Card;
use crate::config::Config;
use crate::gem::Gem;
use crate::gem_bag::GemBag;
use cached::proc_macro::cached;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Recursive payment-enumeration search: peel one token (a matching
/// color or a Gold substitute) off `remaining_cost` at a time, tracking
/// `running_payment`, until the cost is exhausted. Memoized because the
/// same (cost, held-gems) subproblem recurs heavily across sibling
/// branches of the search tree.
#[cached]
fn gem_match(remaining_cost: GemBag, held: GemBag, running_payment: GemBag) -> HashSet<GemBag> {
    if remaining_cost.total() == 0 {
        return HashSet::from_iter([running_payment]);
    }
    if held.total() == 0 {
        return HashSet::new();
    }

    let mut result = HashSet::new();
    for color in Gem::standard() {
        if remaining_cost.get(color) <= 0 {
            continue;
        }
        let new_cost = remaining_cost - GemBag::one(color);

        if held.get(color) > 0 {
            let new_held = held - GemBag::one(color);
            result.extend(gem_match(
                new_cost,
                new_held,
                running_payment + GemBag::one(color),
            ));
        }

        if held.get(Gem::Gold) > 0 {
            let new_held = held - GemBag::one(Gem::Gold);
            result.extend(gem_match(
                new_cost,
                new_held,
                running_payment + GemBag::one(Gem::Gold),
            ));
        }
    }

    result
}

/// Per-seat immutable snapshot: tokens, score, reserved/purchased
/// piles, and the discount bag derived from `purchased`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub seat_id: usize,
    pub name: String,
    pub gems: GemBag,
    pub score: u32,
    pub reserved: Vec<Card>,
    pub purchased: Vec<Card>,
    pub discounts: GemBag,
}

impl PlayerState {
    pub fn new(seat_id: usize, name: impl Into<String>) -> PlayerState {
        PlayerState {
            seat_id,
            name: name.into(),
            gems: GemBag::empty(),
            score: 0,
            reserved: Vec::new(),
            purchased: Vec::new(),
            discounts: GemBag::empty(),
        }
    }

    pub fn can_reserve(&self, config: &Config) -> bool {
        self.reserved.len() < config.card_max_reserved
    }

    /// Every distinct exact-payment bag for `card`: held tokens cover
    /// the effective (discounted) cost per color, with Gold filling any
    /// remaining per-color deficit. Returns `[empty_bag]` when the
    /// effective cost is already zero in every color.
    pub fn affordable_payments(&self, card: &Card) -> Vec<GemBag> {
        let effective_cost = card.discounted_cost(&self.discounts);

        let mut total_deficit = 0;
        for color in Gem::standard() {
            let deficit = effective_cost.get(color) - self.gems.get(color);
            if deficit > 0 {
                total_deficit += deficit;
            }
        }
        if total_deficit > self.gems.get(Gem::Gold) {
            return Vec::new();
        }

        gem_match(effective_cost, self.gems, GemBag::empty())
            .into_iter()
            .collect()
    }

    pub fn check_afford(&self, card: &Card, payment: &GemBag) -> bool {
        self.affordable_payments(card).contains(payment)
    }

    /// Recompute `discounts` from `purchased` — a pure function of the
    /// purchased pile, never mutated independently.
    pub fn recompute_discounts(purchased: &[Card]) -> GemBag {
        let mut discounts = GemBag::empty();
        for card in purchased {
            if let Some(bonus) = card.bonus {
                discounts[bonus] += 1;
            }
        }
        discounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_with_cost(id: &str, cost: &[(Gem, i32)]) -> Card {
        Card {
            id: id.to_string(),
            level: 1,
            points: 0,
            bonus: Some(Gem::Black),
            cost: GemBag::from_pairs(cost),
        }
    }

    #[test]
    fn cannot_afford_with_insufficient_gold() {
        let mut player = PlayerState::new(0, "p0");
        player.gems = GemBag::from_pairs(&[(Gem::Red, 1), (Gem::Gold, 1), (Gem::Black, 1)]);
        let card = card_with_cost("c4", &[(Gem::Green, 2), (Gem::Red, 1)]);
        assert!(player.affordable_payments(&card).is_empty());
    }

    #[test]
    fn free_card_has_only_the_empty_payment() {
        let mut player = PlayerState::new(0, "p0");
        player.purchased.push(card_with_cost("bonus1", &[]));
        player.discounts = GemBag::from_pairs(&[(Gem::Red, 1), (Gem::Green, 2)]);
        let card = card_with_cost("c4", &[(Gem::Green, 2), (Gem::Red, 1)]);
        let payments = player.affordable_payments(&card);
        assert_eq!(payments, vec![GemBag::empty()]);
    }

    #[test]
    fn gold_substitution_yields_multiple_payments() {
        let mut player = PlayerState::new(0, "p0");
        player.gems = GemBag::from_pairs(&[
            (Gem::Red, 1),
            (Gem::Black, 1),
            (Gem::Gold, 1),
            (Gem::Green, 2),
        ]);
        let card = card_with_cost("c4", &[(Gem::Green, 2), (Gem::Red, 1)]);
        let payments = player.affordable_payments(&card);
        assert_eq!(payments.len(), 3);
        assert!(payments.contains(&GemBag::from_pairs(&[(Gem::Red, 1), (Gem::Green, 2)])));
        assert!(payments.contains(&GemBag::from_pairs(&[(Gem::Gold, 1), (Gem::Green, 2)])));
        assert!(payments.contains(&GemBag::from_pairs(&[(Gem::Red, 1), (Gem::Gold, 1), (Gem::Green, 1)])));
    }

    #[test]
    fn recompute_discounts_is_a_histogram_of_bonuses() {
        let purchased = vec![
            card_with_cost("a", &[]),
            {
                let mut c = card_with_cost("b", &[]);
                c.bonus = Some(Gem::Red);
                c
            },
        ];
        let discounts = PlayerState::recompute_discounts(&purchased);
        assert_eq!(discounts.get(Gem::Black), 1);
        assert_eq!(discounts.get(Gem::Red), 1);
    }

    #[test]
    fn can_reserve_respects_cap() {
        let config = Config::for_players(2).unwrap();
        let mut player = PlayerState::new(0, "p0");
        assert!(player.can_reserve(&config));
        for i in 0..config.card_max_reserved {
            player.reserved.push(card_with_cost(&format!("r{i}"), &[]));
        }
        assert!(!player.can_reserve(&config));
    }
}
