use cardroom_core::Chips;
use serde::Deserialize;
use serde::Serialize;

/// What a player is trying to do.
///
/// Turn-bound kinds consume the action token; `Rebuy`, `SitOut`, and
/// `CashOut` may arrive at any time. `Reveal` shares fold semantics on
/// the betting path but additionally shows the player's cards.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PostBlind,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
    Fold,
    Reveal,
    Rebuy,
    SitOut,
    CashOut,
}

impl ActionKind {
    /// True for actions that put chips in voluntarily (call, bet, raise, all-in).
    pub fn is_value_bet(&self) -> bool {
        matches!(
            self,
            ActionKind::Call | ActionKind::Bet | ActionKind::Raise | ActionKind::AllIn
        )
    }
    /// Fold and reveal both forfeit the hand.
    pub fn is_fold(&self) -> bool {
        matches!(self, ActionKind::Fold | ActionKind::Reveal)
    }
    /// True for actions only the acting player may take.
    pub fn on_turn_only(&self) -> bool {
        !matches!(
            self,
            ActionKind::Rebuy | ActionKind::SitOut | ActionKind::CashOut
        )
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ActionKind::PostBlind => write!(f, "posted a blind"),
            ActionKind::Check => write!(f, "checked"),
            ActionKind::Call => write!(f, "called"),
            ActionKind::Bet => write!(f, "bet"),
            ActionKind::Raise => write!(f, "raised"),
            ActionKind::AllIn => write!(f, "went all-in"),
            ActionKind::Fold => write!(f, "folded"),
            ActionKind::Reveal => write!(f, "revealed their cards"),
            ActionKind::Rebuy => write!(f, "bought back in"),
            ActionKind::SitOut => write!(f, "sitting out"),
            ActionKind::CashOut => write!(f, "cashed out"),
        }
    }
}

/// A single player intent, consumed exactly once by
/// [`HoldemGame::apply`](crate::game::HoldemGame::apply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub session: String,
    pub kind: ActionKind,
    pub value: Chips,
}

impl Action {
    pub fn new(session: &str, kind: ActionKind) -> Self {
        Self {
            session: session.to_string(),
            kind,
            value: 0,
        }
    }
    pub fn with_value(session: &str, kind: ActionKind, value: Chips) -> Self {
        Self {
            session: session.to_string(),
            kind,
            value,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.kind, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_bet_kinds() {
        assert!(ActionKind::Call.is_value_bet());
        assert!(ActionKind::AllIn.is_value_bet());
        assert!(!ActionKind::Check.is_value_bet());
        assert!(!ActionKind::PostBlind.is_value_bet());
    }

    #[test]
    fn fold_kinds() {
        assert!(ActionKind::Fold.is_fold());
        assert!(ActionKind::Reveal.is_fold());
        assert!(!ActionKind::Check.is_fold());
    }

    #[test]
    fn turn_bound_kinds() {
        assert!(ActionKind::Fold.on_turn_only());
        assert!(ActionKind::Bet.on_turn_only());
        assert!(!ActionKind::Rebuy.on_turn_only());
        assert!(!ActionKind::SitOut.on_turn_only());
        assert!(!ActionKind::CashOut.on_turn_only());
    }
}
