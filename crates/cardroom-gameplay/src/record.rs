use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use cardroom_cards::Card;
use cardroom_core::Round;
use cardroom_core::Seed;

use crate::phase::Phase;
use crate::players::Players;
use crate::pot::Pots;

/// Immutable snapshot of one completed round, captured at settlement.
///
/// The shuffle seed is included so any recorded round can be replayed
/// deck-for-deck.
#[derive(Debug, Clone, Serialize)]
pub struct RoundRecord {
    pub game: String,
    pub round: Round,
    pub phase: Phase,
    pub board: Vec<String>,
    pub pots: Pots,
    pub players: Players,
    pub seed: Seed,
    pub completed_at: u64,
}

impl RoundRecord {
    pub fn capture(
        game: &str,
        round: Round,
        phase: Phase,
        board: &[Card],
        pots: &Pots,
        players: &Players,
        seed: Seed,
    ) -> Self {
        Self {
            game: game.to_string(),
            round,
            phase,
            board: board.iter().map(|c| c.to_string()).collect(),
            pots: pots.clone(),
            players: players.clone(),
            seed,
            completed_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
        }
    }
}

/// Round history persistence, implemented by the hosting layer.
pub trait HistorySink: Send {
    fn record(&self, record: RoundRecord);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_snapshots_the_board_as_text() {
        let board = Card::parse("As Kd 2c").unwrap();
        let record = RoundRecord::capture(
            "g1",
            4,
            Phase::Complete,
            &board,
            &Pots::default(),
            &Players::default(),
            99,
        );
        assert_eq!(record.board, ["As", "Kd", "2c"]);
        assert!(record.completed_at > 0);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"seed\":99"));
    }
}
