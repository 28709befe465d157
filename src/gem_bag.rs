use crate::gem::Gem;
use serde::{Deserialize, Serialize};
use std::cmp::max;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};

/// An immutable multiset of the six gem colors, backed by a fixed 6-slot
/// array indexed by gem ordinal. The canonical iteration order (used by
/// `normalized()` and by `Display`/serialization) is Blue, White, Black,
/// Red, Green, Gold.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash, Serialize, Deserialize, Default)]
pub struct GemBag {
    blue: i32,
    white: i32,
    black: i32,
    red: i32,
    green: i32,
    gold: i32,
}

impl GemBag {
    pub fn empty() -> GemBag {
        GemBag::default()
    }

    pub fn one(color: Gem) -> GemBag {
        let mut bag = GemBag::empty();
        bag[color] = 1;
        bag
    }

    pub fn get(&self, color: Gem) -> i32 {
        self[color]
    }

    pub fn total(&self) -> i32 {
        debug_assert!(self.legal(), "illegal token state: {:?}", self);
        self.blue + self.white + self.black + self.red + self.green + self.gold
    }

    pub fn distinct_positive(&self) -> usize {
        Gem::all().iter().filter(|&&g| self[g] > 0).count()
    }

    pub fn legal(&self) -> bool {
        Gem::all().iter().all(|&g| self[g] >= 0)
    }

    /// The canonical (gem, count) pairs in display order, dropping zero
    /// entries.
    pub fn iter(&self) -> impl Iterator<Item = (Gem, i32)> + '_ {
        Gem::all().into_iter().filter_map(|g| {
            let n = self[g];
            if n != 0 {
                Some((g, n))
            } else {
                None
            }
        })
    }

    /// Canonical form: zero entries dropped, stable ordering. Two bags
    /// with the same multiset content always normalize identically, so
    /// equality on `GemBag` already agrees with normalized equality —
    /// this exists for callers that want the explicit (color, count) list.
    pub fn normalized(&self) -> Vec<(Gem, i32)> {
        self.iter().collect()
    }

    pub fn from_pairs(pairs: &[(Gem, i32)]) -> GemBag {
        let mut bag = GemBag::empty();
        for &(color, count) in pairs {
            bag[color] += count;
        }
        bag
    }

    pub fn from_colors(colors: &[Gem]) -> GemBag {
        let mut bag = GemBag::empty();
        for &color in colors {
            bag[color] += 1;
        }
        bag
    }

    pub fn max(&self, other: &GemBag) -> GemBag {
        let mut out = GemBag::empty();
        for g in Gem::all() {
            out[g] = max(self[g], other[g]);
        }
        out
    }

    /// The bank's starting colored-token allocation for a given player
    /// count, per the config's `coin_init`/`coin_gold_init` fields.
    pub fn initial_bank(coin_init: u32, coin_gold_init: u32) -> GemBag {
        let mut bag = GemBag::empty();
        for g in Gem::standard() {
            bag[g] = coin_init as i32;
        }
        bag[Gem::Gold] = coin_gold_init as i32;
        bag
    }
}

impl Index<Gem> for GemBag {
    type Output = i32;

    fn index(&self, color: Gem) -> &i32 {
        match color {
            Gem::Blue => &self.blue,
            Gem::White => &self.white,
            Gem::Black => &self.black,
            Gem::Red => &self.red,
            Gem::Green => &self.green,
            Gem::Gold => &self.gold,
        }
    }
}

impl IndexMut<Gem> for GemBag {
    fn index_mut(&mut self, color: Gem) -> &mut i32 {
        match color {
            Gem::Blue => &mut self.blue,
            Gem::White => &mut self.white,
            Gem::Black => &mut self.black,
            Gem::Red => &mut self.red,
            Gem::Green => &mut self.green,
            Gem::Gold => &mut self.gold,
        }
    }
}

impl AddAssign for GemBag {
    fn add_assign(&mut self, other: GemBag) {
        for g in Gem::all() {
            self[g] += other[g];
        }
        debug_assert!(self.legal());
    }
}

impl SubAssign for GemBag {
    fn sub_assign(&mut self, other: GemBag) {
        for g in Gem::all() {
            self[g] -= other[g];
        }
        debug_assert!(self.legal());
    }
}

impl Add for GemBag {
    type Output = GemBag;

    fn add(self, other: GemBag) -> GemBag {
        let mut out = self;
        out += other;
        out
    }
}

impl Sub for GemBag {
    type Output = GemBag;

    fn sub(self, other: GemBag) -> GemBag {
        let mut out = self;
        out -= other;
        out
    }
}

/// (De)serialize a `GemBag` as the `[[color, count]]` pair-list form
/// that §6's `SerializedAction` wire format uses for cost/payment/ret
/// fields, instead of `GemBag`'s own six-field struct shape.
pub mod as_pairs {
    use super::GemBag;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bag: &GemBag, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        bag.normalized().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<GemBag, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::deserialize(deserializer)?;
        Ok(GemBag::from_pairs(&pairs))
    }
}

/// Same as `as_pairs`, but for an `Option<GemBag>` — `null` maps to
/// `None`, matching §6's `ret:[[color,int]] | null` fields.
pub mod option_as_pairs {
    use super::GemBag;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bag: &Option<GemBag>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bag {
            Some(b) => b.normalized().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<GemBag>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Option<Vec<(crate::gem::Gem, i32)>> = Option::deserialize(deserializer)?;
        Ok(pairs.map(|p| GemBag::from_pairs(&p)))
    }
}
