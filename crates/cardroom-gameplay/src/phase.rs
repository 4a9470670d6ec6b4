use serde::Serialize;

/// Betting street within one round of play.
///
/// Strictly ordered; a round only ever moves forward through the variants
/// and returns to `PreDeal` via an explicit start-next-round transition
/// out of `Complete`.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    PreDeal = 0,
    PostDeal = 1,
    Flop = 2,
    Turn = 3,
    River = 4,
    #[default]
    Complete = 5,
}

impl Phase {
    /// Streets whose commitments feed pot settlement. Blinds and pre-flop
    /// betting both key their commitments under `PostDeal`.
    pub const BETTING: [Phase; 4] = [Phase::PostDeal, Phase::Flop, Phase::Turn, Phase::River];

    /// Community cards revealed on entry to this street.
    pub fn revealed(&self) -> usize {
        match self {
            Phase::Flop => 3,
            Phase::Turn | Phase::River => 1,
            _ => 0,
        }
    }
    /// True once no further betting street remains.
    pub fn is_over(&self) -> bool {
        matches!(self, Phase::Complete)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Phase::PreDeal => write!(f, "pre-deal"),
            Phase::PostDeal => write!(f, "post-deal"),
            Phase::Flop => write!(f, "flop"),
            Phase::Turn => write!(f, "turn"),
            Phase::River => write!(f, "river"),
            Phase::Complete => write!(f, "complete"),
        }
    }
}
