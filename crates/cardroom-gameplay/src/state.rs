use std::time::Duration;
use std::time::Instant;

use serde::Serialize;

use cardroom_core::ACTION_MARGIN;

use crate::action::ActionKind;
use crate::error::GameError;
use crate::phase::Phase;

/// Which forced bet a player still owes before acting freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Blind {
    Small,
    Big,
}

/// A seating change requested mid-round, applied at the next round start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SitIntent {
    SitIn,
    SitOut,
}

/// Round-scoped flags for one player: turn token, table roles, fold and
/// all-in markers, blind obligations, and the action clock.
///
/// The deadline includes a small grace margin over the configured
/// timeout so a client acting at the buzzer is not swept unfairly.
#[derive(Debug, Default, Clone, Serialize)]
pub struct State {
    action_on: bool,
    dealer: bool,
    host: bool,
    folded: bool,
    all_in: bool,
    sitting_out: bool,
    cashed_out: bool,
    was_big_blind: bool,
    blind_due: Option<Blind>,
    last_action: Option<ActionKind>,
    sit_intent: Option<SitIntent>,
    #[serde(skip)]
    acted_at: Option<Instant>,
    #[serde(skip)]
    deadline: Option<Instant>,
}

impl State {
    /// Fresh flags for a player joining the table. Anyone arriving while
    /// a round is underway waits it out and is seated at the next deal.
    pub fn joining(phase: Phase) -> Self {
        let mut state = Self::default();
        if !phase.is_over() {
            state.sitting_out = true;
            state.sit_intent = Some(SitIntent::SitIn);
        }
        state
    }

    pub fn action_on(&self) -> bool {
        self.action_on
    }
    pub fn dealer(&self) -> bool {
        self.dealer
    }
    pub fn host(&self) -> bool {
        self.host
    }
    pub fn folded(&self) -> bool {
        self.folded
    }
    pub fn all_in(&self) -> bool {
        self.all_in
    }
    pub fn sitting_out(&self) -> bool {
        self.sitting_out
    }
    pub fn cashed_out(&self) -> bool {
        self.cashed_out
    }
    pub fn was_big_blind(&self) -> bool {
        self.was_big_blind
    }
    pub fn blind_due(&self) -> Option<Blind> {
        self.blind_due
    }
    pub fn last_action(&self) -> Option<ActionKind> {
        self.last_action
    }
    pub fn acted_at(&self) -> Option<Instant> {
        self.acted_at
    }
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
    /// Still contesting the current hand.
    pub fn in_hand(&self) -> bool {
        !self.folded && !self.sitting_out
    }
    /// Flagged to sit out from the next round.
    pub fn sitting_out_next(&self) -> bool {
        self.sit_intent == Some(SitIntent::SitOut)
    }

    /// Hand the turn token over. Taking the token arms the action clock
    /// when a timeout is configured; releasing it disarms.
    pub fn set_action_on(&mut self, on: bool, timeout: Option<Duration>) {
        self.action_on = on;
        self.deadline = match (on, timeout) {
            (true, Some(timeout)) => Some(Instant::now() + timeout + ACTION_MARGIN),
            _ => None,
        };
    }

    pub fn set_dealer(&mut self, dealer: bool) {
        self.dealer = dealer;
    }
    pub fn set_host(&mut self, host: bool) {
        self.host = host;
    }
    pub fn set_all_in(&mut self) {
        self.all_in = true;
    }
    pub fn set_cashed_out(&mut self) {
        self.cashed_out = true;
    }

    /// Record or clear a blind obligation. Clearing a big blind marks the
    /// player so their closing option on the opening street is honoured.
    pub fn set_blind_due(&mut self, due: Option<Blind>) {
        if self.blind_due == Some(Blind::Big) && due.is_none() {
            self.was_big_blind = true;
        }
        self.blind_due = due;
    }

    /// Stamp the action just taken. Fold kinds drop the player from the
    /// hand as a side effect.
    pub fn set_last_action(&mut self, kind: ActionKind) {
        self.acted_at = Some(Instant::now());
        if kind.is_fold() {
            self.folded = true;
        }
        self.last_action = Some(kind);
    }

    /// True once the armed action clock has elapsed.
    pub fn overdue(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }

    /// Park the seat until the player buys back in.
    pub fn exclude(&mut self) {
        self.sitting_out = true;
        self.sit_intent = None;
    }

    /// Street rollover: clear everything scoped to a single betting street.
    pub fn reset_for_new_deal(&mut self) {
        self.was_big_blind = false;
        self.blind_due = None;
        self.last_action = None;
        self.action_on = false;
        self.deadline = None;
    }

    /// Round rollover: additionally clear the fold and all-in markers and
    /// resolve any deferred seating change. Busted players sit out until
    /// they re-buy.
    pub fn reset_for_new_round(&mut self, stack: cardroom_core::Chips) {
        self.reset_for_new_deal();
        self.folded = false;
        self.all_in = false;
        if stack == 0 {
            self.sitting_out = true;
            self.sit_intent = None;
        } else {
            match self.sit_intent.take() {
                Some(SitIntent::SitOut) => self.sitting_out = true,
                Some(SitIntent::SitIn) => self.sitting_out = false,
                None => {}
            }
        }
    }

    /// Request a seating change. Applied immediately between rounds,
    /// deferred to the next round start otherwise. Returns whether the
    /// change took effect right away.
    pub fn toggle_sitting_out(&mut self, phase: Phase, sit_out: bool) -> Result<bool, GameError> {
        if phase.is_over() {
            if self.sitting_out == sit_out {
                return Err(GameError::AlreadyProcessed);
            }
            self.sitting_out = sit_out;
            self.sit_intent = None;
            Ok(true)
        } else {
            let intent = if sit_out {
                SitIntent::SitOut
            } else {
                SitIntent::SitIn
            };
            if self.sit_intent == Some(intent) || self.sitting_out == sit_out {
                return Err(GameError::AlreadyProcessed);
            }
            self.sit_intent = Some(intent);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn turn_token_arms_the_clock() {
        let mut state = State::default();
        state.set_action_on(true, Some(TIMEOUT));
        assert!(state.deadline().is_some());
        assert!(!state.overdue(Instant::now()));
        assert!(state.overdue(Instant::now() + TIMEOUT + ACTION_MARGIN + Duration::from_secs(1)));
        state.set_action_on(false, Some(TIMEOUT));
        assert!(state.deadline().is_none());
    }

    #[test]
    fn no_timeout_means_no_deadline() {
        let mut state = State::default();
        state.set_action_on(true, None);
        assert!(state.action_on());
        assert!(state.deadline().is_none());
        assert!(!state.overdue(Instant::now() + Duration::from_secs(3_600)));
    }

    #[test]
    fn clearing_big_blind_marks_player() {
        let mut state = State::default();
        state.set_blind_due(Some(Blind::Big));
        state.set_blind_due(None);
        assert!(state.was_big_blind());
        let mut other = State::default();
        other.set_blind_due(Some(Blind::Small));
        other.set_blind_due(None);
        assert!(!other.was_big_blind());
    }

    #[test]
    fn fold_action_leaves_the_hand() {
        let mut state = State::default();
        state.set_last_action(ActionKind::Fold);
        assert!(state.folded());
        assert!(!state.in_hand());
        state.reset_for_new_round(100);
        assert!(state.in_hand());
    }

    #[test]
    fn busted_players_sit_out_on_rollover() {
        let mut state = State::default();
        state.reset_for_new_round(0);
        assert!(state.sitting_out());
    }

    #[test]
    fn mid_round_sit_out_defers() {
        let mut state = State::default();
        assert_eq!(state.toggle_sitting_out(Phase::Flop, true), Ok(false));
        assert!(!state.sitting_out());
        assert!(state.sitting_out_next());
        assert_eq!(
            state.toggle_sitting_out(Phase::Flop, true),
            Err(GameError::AlreadyProcessed)
        );
        state.reset_for_new_round(100);
        assert!(state.sitting_out());
    }

    #[test]
    fn between_rounds_sit_out_is_immediate() {
        let mut state = State::default();
        assert_eq!(state.toggle_sitting_out(Phase::Complete, true), Ok(true));
        assert!(state.sitting_out());
        assert_eq!(state.toggle_sitting_out(Phase::Complete, false), Ok(true));
        assert!(!state.sitting_out());
    }

    #[test]
    fn joining_mid_round_waits_for_next_deal() {
        let state = State::joining(Phase::Turn);
        assert!(state.sitting_out());
        assert!(!State::joining(Phase::Complete).sitting_out());
    }
}
