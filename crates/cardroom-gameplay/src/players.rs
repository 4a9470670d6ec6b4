use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use cardroom_core::Chips;
use cardroom_core::Seat;
use cardroom_core::SEAT_CYCLE_LIMIT;

use crate::error::GameError;
use crate::phase::Phase;
use crate::player::Player;

/// The table's seats, in join order, each keyed by the player's id.
///
/// Rotation always walks in seat-number order regardless of join order,
/// wrapping at the highest occupied seat. Walks are bounded so a table
/// where nobody qualifies surfaces an error instead of spinning.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Players {
    players: Vec<Player>,
}

impl Players {
    pub fn len(&self) -> usize {
        self.players.len()
    }
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }
    pub fn by_session(&self, session: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.session == session)
    }

    /// The requested seat when free, otherwise the lowest unoccupied one.
    pub fn next_seat(&self, requested: Option<Seat>) -> Seat {
        match requested {
            Some(seat) if !self.players.iter().any(|p| p.seat == seat) => seat,
            _ => (0..).find(|n| !self.players.iter().any(|p| p.seat == *n)).unwrap_or(0),
        }
    }

    pub fn add(&mut self, player: Player) {
        self.players.push(player);
    }
    pub fn remove(&mut self, id: &str) -> Option<Player> {
        let at = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(at))
    }

    /// Players contesting the hand, optionally restricted to those who
    /// still have chips behind.
    pub fn in_hand(&self, exclude_zero: bool) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.state.in_hand() && (!exclude_zero || p.stack.stack() > 0))
            .collect()
    }

    /// The dealer, or the first seat if nobody carries the button yet.
    pub fn dealer(&self) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.state.dealer())
            .or_else(|| self.players.iter().min_by_key(|p| p.seat))
    }

    /// Whoever holds the turn token.
    pub fn action_on(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.state.action_on())
    }

    /// The id of the player `offset` eligible seats around from `start`,
    /// walking seat order (backwards for a negative offset). With
    /// `acting_only`, seats that cannot take a turn are skipped; the
    /// start seat always qualifies so a full lap lands back on it.
    pub fn relative_to(
        &self,
        start: &str,
        offset: i64,
        acting_only: bool,
    ) -> Result<String, GameError> {
        let mut order: Vec<&Player> = self.players.iter().collect();
        order.sort_by_key(|p| p.seat);
        if offset < 0 {
            order.reverse();
        }
        let from = order
            .iter()
            .position(|p| p.id == start)
            .ok_or_else(|| GameError::UnknownPlayer(start.to_string()))?;
        let steps = offset.unsigned_abs() as usize;
        if steps == 0 {
            return Ok(start.to_string());
        }
        let mut counted = 0;
        for player in order.iter().cycle().skip(from + 1).take(SEAT_CYCLE_LIMIT) {
            if !acting_only || player.can_act() || player.id == start {
                counted += 1;
                if counted == steps {
                    return Ok(player.id.clone());
                }
            }
        }
        Err(GameError::CycleExhausted)
    }

    /// Pass the button to the next seat that is neither sitting out nor
    /// flagged to sit out. On a fresh table the default dealer is merely
    /// confirmed rather than advanced.
    pub fn move_dealer(&mut self, timeout: Option<Duration>) -> Result<(), GameError> {
        let dealer = self.dealer().ok_or(GameError::NoDealer)?;
        let id = dealer.id.clone();
        if !dealer.state.dealer() {
            let fresh = self.get_mut(&id).ok_or(GameError::NoDealer)?;
            fresh.state.set_dealer(true);
            fresh.state.set_action_on(true, timeout);
            return Ok(());
        }
        for n in 1..=self.players.len() as i64 {
            let candidate = self.relative_to(&id, n, false)?;
            let next = self.get(&candidate).ok_or(GameError::NoDealer)?;
            if !next.state.sitting_out() && !next.state.sitting_out_next() {
                if let Some(old) = self.get_mut(&id) {
                    old.state.set_dealer(false);
                }
                let next = self.get_mut(&candidate).ok_or(GameError::NoDealer)?;
                next.state.set_dealer(true);
                next.state.set_action_on(true, timeout);
                return Ok(());
            }
        }
        Err(GameError::CycleExhausted)
    }

    /// Spin the button to a uniformly random seat before a tournament's
    /// opening hand.
    pub fn random_dealer<R: Rng>(&mut self, rng: &mut R, timeout: Option<Duration>) -> Result<(), GameError> {
        for _ in 0..rng.random_range(0..self.players.len().max(1)) {
            self.move_dealer(timeout)?;
        }
        Ok(())
    }

    /// Open a street: the first acting seat past the dealer takes the
    /// turn token, everyone else drops theirs.
    pub fn reset_action_for_deal(&mut self, timeout: Option<Duration>) -> Result<(), GameError> {
        let dealer = self.dealer().ok_or(GameError::NoDealer)?.id.clone();
        let first = self.relative_to(&dealer, 1, true)?;
        for p in self.players.iter_mut() {
            p.state.set_action_on(false, timeout);
        }
        let first = self
            .get_mut(&first)
            .ok_or(GameError::NoActivePlayer)?;
        first.state.set_action_on(true, timeout);
        Ok(())
    }

    /// Hand the turn token to the next acting seat, returning its id.
    pub fn move_action(&mut self, timeout: Option<Duration>) -> Result<String, GameError> {
        let current = self.action_on().ok_or(GameError::NoActivePlayer)?.id.clone();
        let next = self.relative_to(&current, 1, true)?;
        if let Some(p) = self.get_mut(&current) {
            p.state.set_action_on(false, timeout);
        }
        let np = self.get_mut(&next).ok_or(GameError::NoActivePlayer)?;
        np.state.set_action_on(true, timeout);
        Ok(next)
    }

    /// Sweep everyone's street commitment into the pot. When exactly one
    /// player committed strictly more than anyone else, the unmatched
    /// excess goes back to them first; nobody can win money no other
    /// seat matched.
    pub fn collect_bets(&mut self, phase: Phase) -> Chips {
        let mut commits: Vec<Chips> = self
            .players
            .iter()
            .map(|p| p.stack.committed(phase).unwrap_or(0))
            .collect();
        commits.sort_unstable_by(|a, b| b.cmp(a));
        if commits.len() > 1 && commits[0] > commits[1] {
            let refund = commits[0] - commits[1];
            let top = commits[0];
            if let Some(p) = self
                .players
                .iter_mut()
                .find(|p| p.stack.committed(phase).unwrap_or(0) == top)
            {
                p.stack.reverse_bet(refund, phase);
            }
        }
        self.players.iter_mut().map(|p| p.stack.collect()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::stack::Stack;
    use crate::state::State;

    const TIMEOUT: Option<Duration> = Some(Duration::from_secs(30));

    fn table(names: &[&str]) -> Players {
        let mut players = Players::default();
        for name in names {
            let seat = players.next_seat(None);
            let stack = Stack::cash(2_000, 2_000).unwrap();
            players.add(Player::new(name, name, seat, stack, State::default()));
        }
        players
    }

    #[test]
    fn seats_fill_lowest_gap_first() {
        let mut players = table(&["a", "b", "c"]);
        players.remove("b");
        assert_eq!(players.next_seat(None), 1);
        let stack = Stack::cash(2_000, 2_000).unwrap();
        players.add(Player::new("d", "d", players.next_seat(None), stack, State::default()));
        assert_eq!(players.get("d").unwrap().seat, 1);
    }

    #[test]
    fn requested_seat_honored_when_free() {
        let players = table(&["a", "b"]);
        assert_eq!(players.next_seat(Some(5)), 5);
        assert_eq!(players.next_seat(Some(1)), 2);
    }

    #[test]
    fn rotation_skips_folded_and_wraps() {
        let mut players = table(&["a", "b", "c", "d"]);
        players.get_mut("b").unwrap().state.set_last_action(ActionKind::Fold);
        assert_eq!(players.relative_to("a", 1, true).unwrap(), "c");
        assert_eq!(players.relative_to("c", 2, true).unwrap(), "a");
        assert_eq!(players.relative_to("a", -1, true).unwrap(), "d");
    }

    #[test]
    fn rotation_is_bounded_when_nobody_qualifies() {
        let mut players = table(&["a", "b", "c"]);
        for p in players.iter_mut() {
            p.state.set_last_action(ActionKind::Fold);
        }
        assert_eq!(
            players.relative_to("a", 1, true),
            Err(GameError::CycleExhausted)
        );
    }

    #[test]
    fn full_lap_lands_back_on_start() {
        let mut players = table(&["a", "b", "c"]);
        players.get_mut("b").unwrap().state.set_last_action(ActionKind::Fold);
        players.get_mut("c").unwrap().state.set_last_action(ActionKind::Fold);
        assert_eq!(players.relative_to("a", 1, true).unwrap(), "a");
    }

    #[test]
    fn button_confirms_then_advances() {
        let mut players = table(&["a", "b", "c"]);
        players.move_dealer(TIMEOUT).unwrap();
        assert!(players.get("a").unwrap().state.dealer());
        players.move_dealer(TIMEOUT).unwrap();
        assert!(players.get("b").unwrap().state.dealer());
        assert!(!players.get("a").unwrap().state.dealer());
    }

    #[test]
    fn button_skips_sitting_out() {
        let mut players = table(&["a", "b", "c"]);
        players.move_dealer(TIMEOUT).unwrap();
        players
            .get_mut("b")
            .unwrap()
            .state
            .toggle_sitting_out(Phase::Complete, true)
            .unwrap();
        players.move_dealer(TIMEOUT).unwrap();
        assert!(players.get("c").unwrap().state.dealer());
    }

    #[test]
    fn unmatched_excess_returns_to_the_lone_top_bettor() {
        let mut players = table(&["a", "b"]);
        players.get_mut("a").unwrap().stack.add_to_table(Phase::PostDeal, 500);
        players.get_mut("b").unwrap().stack.add_to_table(Phase::PostDeal, 300);
        assert_eq!(players.collect_bets(Phase::PostDeal), 600);
        assert_eq!(players.get("a").unwrap().stack.stack(), 1_700);
    }

    #[test]
    fn equal_highest_bets_are_not_refunded() {
        let mut players = table(&["a", "b", "c"]);
        players.get_mut("a").unwrap().stack.add_to_table(Phase::Flop, 400);
        players.get_mut("b").unwrap().stack.add_to_table(Phase::Flop, 400);
        players.get_mut("c").unwrap().stack.add_to_table(Phase::Flop, 200);
        assert_eq!(players.collect_bets(Phase::Flop), 1_000);
    }
}
