use crate::card::{Card, CardId};
use crate::error::EngineError;
use crate::gem::Gem;
use crate::gem_bag::GemBag;
use crate::role::{Role, RoleId};
use serde::Deserialize;

/// The cards and roles an `Engine` is built from. `standard()` bundles a
/// fixed 90-card / 10-role set baked into the crate so the engine is
/// self-contained for tests and simulation; `from_json` loads the
/// external document shape for callers who supply their own data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub cards: Vec<Card>,
    pub roles: Vec<Role>,
}

impl Catalog {
    pub fn standard() -> Catalog {
        Catalog {
            cards: standard_cards(),
            roles: standard_roles(),
        }
    }

    pub fn from_json(json: &str) -> Result<Catalog, EngineError> {
        let doc: CatalogDoc = serde_json::from_str(json)
            .map_err(|e| EngineError::deserialization(format!("catalog: {e}")))?;
        let cards = doc
            .cards
            .into_iter()
            .map(|c| Card {
                id: c.id,
                level: c.level,
                points: c.points,
                bonus: c.bonus,
                cost: GemBag::from_pairs(&c.cost),
            })
            .collect();
        let roles = doc
            .roles
            .into_iter()
            .map(|r| Role {
                id: r.id,
                name: r.name,
                points: r.points,
                requirements: GemBag::from_pairs(&r.requirements),
            })
            .collect();
        Ok(Catalog { cards, roles })
    }

    pub fn cards_for_level(&self, level: u8) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.level == level).collect()
    }

    pub fn card_by_id(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }
}

#[derive(Deserialize)]
struct CatalogDoc {
    cards: Vec<CardDoc>,
    roles: Vec<RoleDoc>,
}

#[derive(Deserialize)]
struct CardDoc {
    id: CardId,
    level: u8,
    points: u32,
    #[serde(default)]
    bonus: Option<Gem>,
    cost: Vec<(Gem, i32)>,
}

#[derive(Deserialize)]
struct RoleDoc {
    id: RoleId,
    name: String,
    points: u32,
    requirements: Vec<(Gem, i32)>,
}

fn card(id: &str, level: u8, bonus: Gem, points: u32, cost: &[(Gem, i32)]) -> Card {
    Card {
        id: id.to_string(),
        level,
        points,
        bonus: Some(bonus),
        cost: GemBag::from_pairs(cost),
    }
}

fn role(id: &str, name: &str, points: u32, requirements: &[(Gem, i32)]) -> Role {
    Role {
        id: id.to_string(),
        name: name.to_string(),
        points,
        requirements: GemBag::from_pairs(requirements),
    }
}

/// The standard 90-card set (40 at level 1, 30 at level 2, 20 at level
/// 3), grouped by bonus color within each level.
fn standard_cards() -> Vec<Card> {
    use Gem::*;
    vec![
        // --- level 1 ---
        card("c0", 1, Black, 0, &[(White, 1), (Blue, 1), (Green, 1), (Red, 1)]),
        card("c1", 1, Black, 0, &[(White, 1), (Blue, 2), (Green, 1), (Red, 1)]),
        card("c2", 1, Black, 0, &[(White, 2), (Blue, 2), (Red, 1)]),
        card("c3", 1, Black, 0, &[(Green, 1), (Red, 3), (Black, 1)]),
        card("c4", 1, Black, 0, &[(Green, 2), (Red, 1)]),
        card("c5", 1, Black, 0, &[(White, 2), (Green, 2)]),
        card("c6", 1, Black, 0, &[(Green, 3)]),
        card("c7", 1, Black, 1, &[(Blue, 4)]),
        card("c8", 1, Blue, 0, &[(White, 1), (Green, 1), (Red, 1), (Black, 1)]),
        card("c9", 1, Blue, 0, &[(White, 1), (Green, 1), (Red, 2), (Black, 1)]),
        card("c10", 1, Blue, 0, &[(White, 1), (Green, 2), (Red, 2)]),
        card("c11", 1, Blue, 0, &[(Blue, 1), (Green, 3), (Red, 1)]),
        card("c12", 1, Blue, 0, &[(White, 1), (Black, 2)]),
        card("c13", 1, Blue, 0, &[(Green, 2), (Black, 2)]),
        card("c14", 1, Blue, 0, &[(Black, 3)]),
        card("c15", 1, Blue, 1, &[(Red, 4)]),
        card("c16", 1, White, 0, &[(Blue, 1), (Green, 1), (Red, 1), (Black, 1)]),
        card("c17", 1, White, 0, &[(Blue, 1), (Green, 2), (Red, 1), (Black, 1)]),
        card("c18", 1, White, 0, &[(Blue, 2), (Green, 2), (Black, 1)]),
        card("c19", 1, White, 0, &[(White, 3), (Blue, 1), (Black, 1)]),
        card("c20", 1, White, 0, &[(Red, 2), (Black, 1)]),
        card("c21", 1, White, 0, &[(Blue, 2), (Black, 2)]),
        card("c22", 1, White, 0, &[(Blue, 3)]),
        card("c23", 1, White, 1, &[(Green, 4)]),
        card("c24", 1, Green, 0, &[(White, 1), (Blue, 1), (Red, 1), (Black, 1)]),
        card("c25", 1, Green, 0, &[(White, 1), (Blue, 1), (Red, 1), (Black, 2)]),
        card("c26", 1, Green, 0, &[(Blue, 1), (Red, 2), (Black, 2)]),
        card("c27", 1, Green, 0, &[(White, 1), (Blue, 3), (Green, 1)]),
        card("c28", 1, Green, 0, &[(White, 2), (Blue, 1)]),
        card("c29", 1, Green, 0, &[(Blue, 2), (Red, 2)]),
        card("c30", 1, Green, 0, &[(Red, 3)]),
        card("c31", 1, Green, 1, &[(Black, 4)]),
        card("c32", 1, Red, 0, &[(White, 1), (Blue, 1), (Green, 1), (Black, 1)]),
        card("c33", 1, Red, 0, &[(White, 2), (Blue, 1), (Green, 1), (Black, 1)]),
        card("c34", 1, Red, 0, &[(White, 2), (Green, 1), (Black, 2)]),
        card("c35", 1, Red, 0, &[(White, 1), (Red, 1), (Black, 3)]),
        card("c36", 1, Red, 0, &[(Blue, 2), (Green, 1)]),
        card("c37", 1, Red, 0, &[(White, 2), (Red, 2)]),
        card("c38", 1, Red, 0, &[(White, 3)]),
        card("c39", 1, Red, 1, &[(White, 4)]),
        // --- level 2 ---
        card("c40", 2, Black, 1, &[(White, 3), (Blue, 2), (Green, 2)]),
        card("c41", 2, Black, 1, &[(White, 3), (Green, 3), (Black, 2)]),
        card("c42", 2, Black, 2, &[(Blue, 1), (Green, 4), (Red, 2)]),
        card("c43", 2, Black, 2, &[(Green, 5), (Red, 3)]),
        card("c44", 2, Black, 2, &[(White, 5)]),
        card("c45", 2, Black, 3, &[(Black, 6)]),
        card("c46", 2, Blue, 1, &[(Blue, 2), (Green, 2), (Red, 3)]),
        card("c47", 2, Blue, 1, &[(Blue, 2), (Green, 3), (Black, 3)]),
        card("c48", 2, Blue, 2, &[(White, 5), (Blue, 3)]),
        card("c49", 2, Blue, 2, &[(White, 2), (Red, 1), (Black, 4)]),
        card("c50", 2, Blue, 2, &[(Blue, 5)]),
        card("c51", 2, Blue, 3, &[(Blue, 6)]),
        card("c52", 2, White, 1, &[(Green, 3), (Red, 2), (Black, 2)]),
        card("c53", 2, White, 1, &[(White, 2), (Blue, 3), (Red, 3)]),
        card("c54", 2, White, 2, &[(Green, 1), (Red, 4), (Black, 2)]),
        card("c55", 2, White, 2, &[(Red, 5), (Black, 3)]),
        card("c56", 2, White, 2, &[(Red, 5)]),
        card("c57", 2, White, 3, &[(White, 6)]),
        card("c58", 2, Green, 1, &[(White, 3), (Green, 2), (Red, 3)]),
        card("c59", 2, Green, 1, &[(White, 2), (Blue, 3), (Black, 2)]),
        card("c60", 2, Green, 2, &[(White, 4), (Blue, 2), (Black, 1)]),
        card("c61", 2, Green, 2, &[(Blue, 5), (Green, 3)]),
        card("c62", 2, Green, 2, &[(Green, 5)]),
        card("c63", 2, Green, 3, &[(Green, 6)]),
        card("c64", 2, Red, 1, &[(White, 2), (Red, 2), (Black, 3)]),
        card("c65", 2, Red, 1, &[(Blue, 3), (Red, 2), (Black, 3)]),
        card("c66", 2, Red, 2, &[(White, 1), (Blue, 4), (Green, 2)]),
        card("c67", 2, Red, 2, &[(White, 3), (Black, 5)]),
        card("c68", 2, Red, 2, &[(Black, 5)]),
        card("c69", 2, Red, 3, &[(Red, 6)]),
        // --- level 3 ---
        card("c70", 3, Black, 3, &[(White, 3), (Blue, 3), (Green, 5), (Red, 3)]),
        card("c71", 3, Black, 4, &[(Red, 7)]),
        card("c72", 3, Black, 4, &[(Green, 3), (Red, 6), (Black, 3)]),
        card("c73", 3, Black, 5, &[(Red, 7), (Black, 3)]),
        card("c74", 3, Blue, 3, &[(White, 3), (Green, 3), (Red, 3), (Black, 5)]),
        card("c75", 3, Blue, 4, &[(White, 7)]),
        card("c76", 3, Blue, 4, &[(White, 6), (Blue, 3), (Black, 3)]),
        card("c77", 3, Blue, 5, &[(White, 7), (Blue, 3)]),
        card("c78", 3, White, 3, &[(Blue, 3), (Green, 3), (Red, 5), (Black, 3)]),
        card("c79", 3, White, 4, &[(Black, 7)]),
        card("c80", 3, White, 4, &[(White, 3), (Red, 3), (Black, 6)]),
        card("c81", 3, White, 5, &[(White, 3), (Black, 7)]),
        card("c82", 3, Green, 3, &[(White, 5), (Blue, 3), (Red, 3), (Black, 3)]),
        card("c83", 3, Green, 4, &[(Blue, 7)]),
        card("c84", 3, Green, 4, &[(White, 3), (Blue, 6), (Green, 3)]),
        card("c85", 3, Green, 5, &[(Blue, 7), (Green, 3)]),
        card("c86", 3, Red, 3, &[(White, 3), (Blue, 5), (Green, 3), (Black, 3)]),
        card("c87", 3, Red, 4, &[(Green, 7)]),
        card("c88", 3, Red, 4, &[(Blue, 3), (Green, 6), (Red, 3)]),
        card("c89", 3, Red, 5, &[(Green, 7), (Red, 3)]),
    ]
}

/// The standard 10-role set.
fn standard_roles() -> Vec<Role> {
    use Gem::*;
    vec![
        role("n0", "Catherine de Medici", 3, &[(Green, 4), (Red, 4)]),
        role("n1", "Isabella of Castile", 3, &[(Black, 3), (Red, 3), (White, 3)]),
        role("n2", "Anne of Brittany", 3, &[(Black, 3), (Green, 3), (Red, 3)]),
        role("n3", "Mary Stuart", 3, &[(Blue, 4), (White, 4)]),
        role("n4", "Elisabeth of Austria", 3, &[(Black, 4), (White, 4)]),
        role("n5", "Henry VIII", 3, &[(Blue, 4), (Green, 4)]),
        role("n6", "Charles Quint", 3, &[(Blue, 3), (Green, 3), (Red, 3)]),
        role("n7", "Francis I of France", 3, &[(Blue, 3), (Green, 3), (White, 3)]),
        role("n8", "Suleiman the Magnificent", 3, &[(Black, 4), (Green, 4)]),
        role("n9", "Niccolo Machiavelli", 3, &[(Black, 3), (Blue, 3), (White, 3)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_90_cards_and_10_roles() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.cards.len(), 90);
        assert_eq!(catalog.roles.len(), 10);
    }

    #[test]
    fn standard_catalog_level_split_is_40_30_20() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.cards_for_level(1).len(), 40);
        assert_eq!(catalog.cards_for_level(2).len(), 30);
        assert_eq!(catalog.cards_for_level(3).len(), 20);
    }

    #[test]
    fn standard_catalog_card_ids_are_unique() {
        let catalog = Catalog::standard();
        let mut ids: Vec<&str> = catalog.cards.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 90);
    }

    #[test]
    fn standard_catalog_costs_never_include_gold() {
        let catalog = Catalog::standard();
        for c in &catalog.cards {
            assert_eq!(c.cost.get(Gem::Gold), 0);
        }
        for r in &catalog.roles {
            assert_eq!(r.requirements.get(Gem::Gold), 0);
        }
    }

    #[test]
    fn from_json_parses_minimal_document() {
        let json = r#"{
            "cards": [
                {"id": "x1", "level": 1, "points": 0, "bonus": "red", "cost": [["blue", 1]]}
            ],
            "roles": [
                {"id": "r1", "name": "Test", "points": 3, "requirements": [["red", 4]]}
            ]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.cards.len(), 1);
        assert_eq!(catalog.cards[0].bonus, Some(Gem::Red));
        assert_eq!(catalog.roles[0].requirements.get(Gem::Red), 4);
    }

    #[test]
    fn from_json_rejects_malformed_document() {
        let result = Catalog::from_json("{ not json");
        assert!(result.is_err());
    }
}
