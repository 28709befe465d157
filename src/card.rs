use crate::gem::Gem;
use crate::gem_bag::GemBag;
use serde::{Deserialize, Serialize};

pub type CardId = String;

/// An immutable card descriptor. `cost` never carries a Gold entry —
/// callers that need the effective (discounted) cost should use
/// `discounted_cost`.
#[derive(PartialEq, Eq, Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub level: u8,
    pub points: u32,
    pub bonus: Option<Gem>,
    pub cost: GemBag,
}

impl Card {
    /// The card's cost after subtracting per-color discounts, floored at
    /// zero per color. Gold is never part of a cost or a discount, so it
    /// passes through unchanged (and is always zero in practice).
    pub fn discounted_cost(&self, discounts: &GemBag) -> GemBag {
        let mut out = GemBag::empty();
        for g in Gem::all() {
            out[g] = 0.max(self.cost[g] - discounts[g]);
        }
        out
    }
}

/// A positional reference to a card: exactly one of visible-grid slot,
/// reserved-pile slot, or deck-top-of-level. Constructing one directly
/// via the variants makes "exactly one populated" a property of the
/// type rather than something validated at runtime.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum CardIdx {
    Visible(usize),
    Reserve(usize),
    DeckHead(u8),
}

/// Wire form used by `CardIdx`'s (de)serialization, matching §6's
/// `{visible_idx|reserve_idx|deck_head_level: int|null}` object shape.
#[derive(Serialize, Deserialize)]
struct CardIdxWire {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    visible_idx: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    reserve_idx: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    deck_head_level: Option<u8>,
}

impl Serialize for CardIdx {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let wire = match *self {
            CardIdx::Visible(i) => CardIdxWire {
                visible_idx: Some(i),
                reserve_idx: None,
                deck_head_level: None,
            },
            CardIdx::Reserve(i) => CardIdxWire {
                visible_idx: None,
                reserve_idx: Some(i),
                deck_head_level: None,
            },
            CardIdx::DeckHead(level) => CardIdxWire {
                visible_idx: None,
                reserve_idx: None,
                deck_head_level: Some(level),
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CardIdx {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let wire = CardIdxWire::deserialize(deserializer)?;
        match (wire.visible_idx, wire.reserve_idx, wire.deck_head_level) {
            (Some(i), None, None) => Ok(CardIdx::Visible(i)),
            (None, Some(i), None) => Ok(CardIdx::Reserve(i)),
            (None, None, Some(level)) => Ok(CardIdx::DeckHead(level)),
            _ => Err(D::Error::custom(
                "CardIdx must populate exactly one of visible_idx, reserve_idx, deck_head_level",
            )),
        }
    }
}
