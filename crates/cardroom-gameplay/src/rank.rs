use cardroom_cards::Card;
use serde::Serialize;

/// Hand category, weakest to strongest. Carried alongside the numeric
/// strength for display; ordering decisions use strength alone.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl std::fmt::Display for RankCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RankCategory::HighCard => write!(f, "High Card"),
            RankCategory::OnePair => write!(f, "One Pair"),
            RankCategory::TwoPair => write!(f, "Two Pair"),
            RankCategory::ThreeOfAKind => write!(f, "Three of a Kind"),
            RankCategory::Straight => write!(f, "Straight"),
            RankCategory::Flush => write!(f, "Flush"),
            RankCategory::FullHouse => write!(f, "Full House"),
            RankCategory::FourOfAKind => write!(f, "Four of a Kind"),
            RankCategory::StraightFlush => write!(f, "Straight Flush"),
            RankCategory::RoyalFlush => write!(f, "Royal Flush"),
        }
    }
}

/// Totally ordered hand evaluation. Higher strength beats lower; equal
/// strength splits the pot.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize)]
pub struct HandRank {
    pub strength: u32,
    pub category: RankCategory,
}

impl HandRank {
    pub fn new(strength: u32, category: RankCategory) -> Self {
        Self { strength, category }
    }
}

impl PartialOrd for HandRank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HandRank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.strength.cmp(&other.strength)
    }
}

impl std::fmt::Display for HandRank {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.category, self.strength)
    }
}

/// Seven-card hand evaluation, consumed as a black box.
///
/// The engine never inspects card combinatorics itself; it hands two hole
/// cards and up to five community cards to whatever evaluator was injected
/// at construction and trusts the returned total order.
pub trait RankEvaluator: Send {
    fn rank(&self, hole: &[Card], board: &[Card]) -> HandRank;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_decides_order() {
        let weak = HandRank::new(10, RankCategory::TwoPair);
        let strong = HandRank::new(11, RankCategory::HighCard);
        assert!(strong > weak);
    }

    #[test]
    fn equal_strength_is_equal() {
        let a = HandRank::new(7, RankCategory::OnePair);
        let b = HandRank::new(7, RankCategory::OnePair);
        assert!(a.cmp(&b) == std::cmp::Ordering::Equal);
    }
}
