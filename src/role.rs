use crate::gem_bag::GemBag;
use serde::{Deserialize, Serialize};

pub type RoleId = String;

/// A noble/role card: carried through state unchanged. Scoring from
/// roles is out of scope here — `is_attracted_to` is a pure query a
/// caller-side rule (or a future extension) can act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub points: u32,
    pub requirements: GemBag,
}

impl Role {
    pub fn is_attracted_to(&self, discounts: &GemBag) -> bool {
        crate::gem::Gem::standard()
            .iter()
            .all(|&g| discounts.get(g) >= self.requirements.get(g))
    }
}
