use serde::{Deserialize, Serialize};

/// The six token colors. Gold is the wildcard; the other five are
/// "standard" colors and are the only colors that appear as card costs
/// or role requirements.
#[derive(PartialEq, Copy, Clone, Debug, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gem {
    Red,
    Blue,
    White,
    Black,
    Green,
    Gold,
}

impl Gem {
    /// All six colors in the canonical normalized order (Blue, White,
    /// Black, Red, Green, Gold).
    pub fn all() -> [Gem; 6] {
        [
            Gem::Blue,
            Gem::White,
            Gem::Black,
            Gem::Red,
            Gem::Green,
            Gem::Gold,
        ]
    }

    /// Standard (non-Gold) colors, in the canonical normalized order.
    pub fn standard() -> [Gem; 5] {
        [Gem::Blue, Gem::White, Gem::Black, Gem::Red, Gem::Green]
    }

    pub fn is_gold(&self) -> bool {
        matches!(self, Gem::Gold)
    }
}
