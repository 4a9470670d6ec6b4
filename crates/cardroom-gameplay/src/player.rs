use serde::Serialize;

use cardroom_cards::Card;
use cardroom_core::Seat;

use crate::error::GameError;
use crate::rank::HandRank;
use crate::stack::Stack;
use crate::state::State;

/// One seat at the table: identity, hole cards, money, and round flags.
///
/// Hole cards never appear in serialized table snapshots; they travel
/// only in the private deal message to their owner.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: String,
    pub handle: String,
    #[serde(skip)]
    pub session: String,
    pub seat: Seat,
    #[serde(skip)]
    cards: Vec<Card>,
    #[serde(skip)]
    last_cards: Vec<Card>,
    pub stack: Stack,
    pub state: State,
    pub rank: Option<HandRank>,
}

impl Player {
    pub fn new(id: &str, handle: &str, seat: Seat, stack: Stack, state: State) -> Self {
        Self {
            id: id.to_string(),
            handle: handle.to_string(),
            session: String::new(),
            seat,
            cards: Vec::new(),
            last_cards: Vec::new(),
            stack,
            state,
            rank: None,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
    /// Hole cards from the previous hand, kept for reveal-after-fold.
    pub fn last_cards(&self) -> &[Card] {
        &self.last_cards
    }
    pub fn deal(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Eligible to act: seated in the hand with chips behind. All-in
    /// players stay in the hand but no longer take turns.
    pub fn can_act(&self) -> bool {
        self.state.in_hand() && self.stack.stack() > 0
    }

    /// Clear the hand-scoped parts of this seat for the next round.
    pub fn reset_for_new_round(&mut self) {
        self.last_cards = std::mem::take(&mut self.cards);
        self.state.reset_for_new_round(self.stack.stack());
        self.stack.clear_round();
        self.rank = None;
    }

    /// Transfer the stack back to the wallet and close the seat out.
    pub fn cash_out(&mut self) -> Result<cardroom_core::Chips, GameError> {
        let wallet = self.stack.cash_out()?;
        self.state.set_cashed_out();
        Ok(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::phase::Phase;

    fn seated(deposit: i64, buy_in: i64) -> Player {
        let stack = Stack::cash(deposit, buy_in).unwrap();
        Player::new("p1", "alice", 0, stack, State::default())
    }

    #[test]
    fn all_in_players_cannot_act() {
        let mut player = seated(2_000, 2_000);
        assert!(player.can_act());
        player.stack.add_to_table(Phase::PostDeal, 2_000);
        assert!(!player.can_act());
        assert!(player.state.in_hand());
    }

    #[test]
    fn round_rollover_parks_last_cards() {
        let mut player = seated(5_000, 2_000);
        player.deal(Card::try_from("As").unwrap());
        player.deal(Card::try_from("Kd").unwrap());
        player.state.set_last_action(ActionKind::Fold);
        player.reset_for_new_round();
        assert!(player.cards().is_empty());
        assert_eq!(player.last_cards().len(), 2);
        assert!(player.state.in_hand());
        assert_eq!(player.stack.committed(Phase::PostDeal), None);
    }
}
