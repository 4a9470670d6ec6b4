use crate::phase::Phase;
use cardroom_core::Chips;
use cardroom_core::Round;

/// Failures surfaced by the rules engine.
///
/// Three families: preconditions (no state was touched and the caller may
/// retry later), validation (a specific action was rejected), and
/// structural problems (the table itself is in a shape the operation
/// cannot work with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    // preconditions
    WrongPhase { expected: Phase, actual: Phase },
    NotEnoughPlayers,
    RebuyWindow(u64),
    Busy,
    // validation
    OutOfTurn(String),
    BlindOutstanding,
    AlreadyProcessed,
    UnderBet { required: Chips, offered: Chips },
    InvalidPlayer(String),
    DuplicatePlayer,
    MaxPlayers,
    NoFunds,
    NonZeroStack,
    ChipsOnTable,
    TournamentEntryClosed(Round),
    SettingLocked(String),
    InvalidSettings(String),
    // structural
    UnknownSession(String),
    UnknownPlayer(String),
    NoActivePlayer,
    NoDealer,
    CycleExhausted,
    DeckExhausted,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongPhase { expected, actual } => {
                write!(f, "wrong phase: expected {}, round is {}", expected, actual)
            }
            Self::NotEnoughPlayers => write!(f, "not enough players to start the round"),
            Self::RebuyWindow(secs) => write!(f, "waiting {} seconds for re-buys", secs),
            Self::Busy => write!(f, "table busy, retry the action"),
            Self::OutOfTurn(handle) => write!(f, "action not on player {}", handle),
            Self::BlindOutstanding => write!(f, "you must post the blind first"),
            Self::AlreadyProcessed => write!(f, "action already processed"),
            Self::UnderBet { required, offered } => {
                write!(f, "bet of {} is below the required {}", offered, required)
            }
            Self::InvalidPlayer(reason) => write!(f, "invalid player: {}", reason),
            Self::DuplicatePlayer => write!(f, "player with same details already at table"),
            Self::MaxPlayers => write!(f, "table is full"),
            Self::NoFunds => write!(f, "insufficient funds in wallet"),
            Self::NonZeroStack => write!(f, "stack is above the re-buy threshold"),
            Self::ChipsOnTable => write!(f, "cannot cash out with chips on the table"),
            Self::TournamentEntryClosed(round) => {
                write!(f, "tournament entry closed after round {}", round)
            }
            Self::SettingLocked(name) => write!(f, "setting {} cannot change mid-game", name),
            Self::InvalidSettings(reason) => write!(f, "invalid settings: {}", reason),
            Self::UnknownSession(session) => write!(f, "no player with session {}", session),
            Self::UnknownPlayer(id) => write!(f, "no player with id {}", id),
            Self::NoActivePlayer => write!(f, "no active player found"),
            Self::NoDealer => write!(f, "no dealer located"),
            Self::CycleExhausted => write!(f, "seat cycle exhausted without a match"),
            Self::DeckExhausted => write!(f, "no cards left to deal"),
        }
    }
}

impl std::error::Error for GameError {}

impl GameError {
    /// Preconditions leave state untouched and may clear on retry.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::WrongPhase { .. } | Self::NotEnoughPlayers | Self::RebuyWindow(_) | Self::Busy
        )
    }
    /// Structural failures require the caller to re-derive table state.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnknownSession(_)
                | Self::UnknownPlayer(_)
                | Self::NoActivePlayer
                | Self::NoDealer
                | Self::CycleExhausted
                | Self::DeckExhausted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_families_are_disjoint() {
        assert!(GameError::Busy.is_precondition());
        assert!(GameError::CycleExhausted.is_structural());
        assert!(!GameError::NoFunds.is_precondition());
        assert!(!GameError::NoFunds.is_structural());
    }
}
