use std::time::Duration;
use std::time::Instant;

use log::debug;
use log::info;
use log::warn;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use cardroom_cards::Card;
use cardroom_cards::Deck;
use cardroom_core::Chips;
use cardroom_core::Round;
use cardroom_core::AUTO_DEAL_LIMIT;
use cardroom_core::BLIND_NUDGE_DELAY;
use cardroom_core::HOLE_DEAL_DELAY;
use cardroom_core::HOLE_SIZE;
use cardroom_core::ID;
use cardroom_core::MAX_PLAYERS;
use cardroom_core::MIN_PLAYERS;
use cardroom_core::REBUY_GRACE;

use crate::action::Action;
use crate::action::ActionKind;
use crate::error::GameError;
use crate::message::Address;
use crate::message::Messenger;
use crate::message::TableMessage;
use crate::phase::Phase;
use crate::player::Player;
use crate::players::Players;
use crate::pot::Pots;
use crate::pot::SidePot;
use crate::rank::RankEvaluator;
use crate::record::HistorySink;
use crate::record::RoundRecord;
use crate::settings::Settings;
use crate::settings::ShufflePolicy;
use crate::settle::settle;
use crate::stack::Stack;
use crate::state::Blind;
use crate::state::State;

/// What a deal attempt did, or why it stopped short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dealt {
    /// Nothing to do in the current phase.
    Idle,
    /// Blinds are still owed; the acting player was nudged.
    BlindsDue,
    /// The street's betting has not equalized yet.
    WaitingOnBets,
    /// Everyone matched, but the big blind still holds their option.
    WaitingBigBlindCheck,
    /// Advanced to a new street.
    Street(Phase),
    /// Betting was over early, so the remaining streets ran out unprompted.
    AutoCompleted,
    /// The round settled.
    Complete,
}

/// The round lifecycle every table variant drives: start a round, push
/// the deal forward, and feed player actions through validation.
pub trait RoundEngine {
    fn phase(&self) -> Phase;
    fn round(&self) -> Round;
    fn start_next_round(&mut self) -> Result<(), GameError>;
    fn deal(&mut self) -> Result<Dealt, GameError>;
    fn apply(&mut self, action: Action) -> Result<(), GameError>;
    /// Sit a player out (or back in); deferred to the round boundary
    /// while a hand is live.
    fn pause_player(&mut self, session: &str, sit_out: bool) -> Result<(), GameError>;
}

/// A Texas Hold'em table: the full rules engine for one game.
///
/// Single-threaded by construction. The hosting layer serializes all
/// access; nothing in here blocks, sleeps, or spawns. Outbound traffic
/// goes through the injected [`Messenger`], completed rounds to the
/// injected [`HistorySink`], and showdowns to the injected
/// [`RankEvaluator`].
#[derive(Serialize)]
pub struct HoldemGame {
    pub id: ID<HoldemGame>,
    pub settings: Settings,
    pub players: Players,
    board: Vec<Card>,
    phase: Phase,
    round: Round,
    pot: Chips,
    required: Chips,
    last_raise: Chips,
    min_raise: Chips,
    pots: Pots,
    prize_fund: Chips,
    #[serde(skip)]
    removed: Vec<Player>,
    #[serde(skip)]
    deck: Deck,
    #[serde(skip)]
    auto_completing: bool,
    #[serde(skip)]
    blinds_raised_pre_deal: bool,
    #[serde(skip)]
    dealer_moved: bool,
    #[serde(skip)]
    last_round_completed: Option<Instant>,
    #[serde(skip)]
    evaluator: Box<dyn RankEvaluator>,
    #[serde(skip)]
    messenger: Box<dyn Messenger>,
    #[serde(skip)]
    history: Box<dyn HistorySink>,
    #[serde(skip)]
    rng: SmallRng,
}

impl HoldemGame {
    pub fn new(
        settings: Settings,
        evaluator: Box<dyn RankEvaluator>,
        messenger: Box<dyn Messenger>,
        history: Box<dyn HistorySink>,
    ) -> Result<Self, GameError> {
        settings.validate()?;
        Ok(Self {
            id: ID::default(),
            settings,
            players: Players::default(),
            board: Vec::new(),
            phase: Phase::Complete,
            round: 0,
            pot: 0,
            required: 0,
            last_raise: 0,
            min_raise: 0,
            pots: Pots::default(),
            prize_fund: 0,
            removed: Vec::new(),
            deck: Deck::new(),
            auto_completing: false,
            blinds_raised_pre_deal: false,
            dealer_moved: false,
            last_round_completed: None,
            evaluator,
            messenger,
            history,
            rng: SmallRng::from_os_rng(),
        })
    }

    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn required(&self) -> Chips {
        self.required
    }
    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }
    pub fn board(&self) -> &[Card] {
        &self.board
    }
    pub fn pots(&self) -> &Pots {
        &self.pots
    }
    pub fn prize_fund(&self) -> Chips {
        self.prize_fund
    }

    fn timeout(&self) -> Option<Duration> {
        self.settings.action_timeout
    }

    fn broadcast_update(&self) {
        self.messenger.broadcast(TableMessage::update(self));
    }

    /// Enough seats contesting to play a round.
    fn got_player_numbers(&self) -> bool {
        (MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players.in_hand(false).len())
    }

    // ------------------------------------------------------------------
    // seating

    /// Seat a new player. Cash entrants deposit into a wallet and buy in
    /// from it; tournament entrants pay the buy-in straight into the
    /// prize fund for an opening stack of play chips.
    pub fn add_player(
        &mut self,
        id: &str,
        handle: &str,
        session: &str,
        deposit: Chips,
    ) -> Result<(), GameError> {
        if id.trim().is_empty() || handle.trim().is_empty() {
            return Err(GameError::InvalidPlayer("blank id or handle".into()));
        }
        if handle.contains(' ') {
            return Err(GameError::InvalidPlayer("handle contains a space".into()));
        }
        if self.players.iter().any(|p| {
            p.id == id || p.handle.eq_ignore_ascii_case(handle)
        }) {
            return Err(GameError::DuplicatePlayer);
        }
        if self.players.len() == MAX_PLAYERS {
            return Err(GameError::MaxPlayers);
        }
        let stack = if self.settings.tournament() {
            if self.round > self.settings.max_entry_round {
                return Err(GameError::TournamentEntryClosed(self.settings.max_entry_round));
            }
            self.prize_fund += self.settings.buy_in;
            Stack::tournament(self.settings.opening_stack)
        } else {
            Stack::cash(deposit, self.settings.buy_in)?
        };
        let seat = self.players.next_seat(None);
        let mut player = Player::new(id, handle, seat, stack, State::joining(self.phase));
        player.session = session.to_string();
        if self.players.is_empty() {
            player.state.set_host(true);
        }
        if let Some(at) = self.removed.iter().position(|r| r.id == id) {
            let earlier = self.removed.remove(at);
            player.stack.stats_mut().adopt(earlier.stack.stats());
        }
        info!("{} joins game {} in seat {}", handle, self.id, seat);
        self.players.add(player);
        self.broadcast_update();
        Ok(())
    }

    /// Remove a player mid-game. Their table chips go to the pot, their
    /// stack back to their wallet, and the button and host move on if
    /// they held either.
    pub fn remove_player(&mut self, id: &str) -> Result<Chips, GameError> {
        let (was_dealer, was_host) = {
            let player = self
                .players
                .get(id)
                .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
            (player.state.dealer(), player.state.host())
        };
        let wallet = {
            let player = self.players.get_mut(id).ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
            self.pot += player.stack.collect();
            player.cash_out()?
        };
        let mut departed = self
            .players
            .remove(id)
            .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
        departed.reset_for_new_round();
        info!("{} leaves game {}", departed.handle, self.id);
        self.removed.push(departed);
        if was_dealer && !self.players.is_empty() {
            self.players.move_dealer(self.timeout())?;
        }
        if was_host {
            if let Some(next) = self.players.dealer().map(|p| p.id.clone()) {
                if let Some(p) = self.players.get_mut(&next) {
                    p.state.set_host(true);
                }
            }
        }
        if !self.phase.is_over() && !self.got_player_numbers() {
            self.round_completed();
            self.phase = Phase::Complete;
        }
        self.broadcast_update();
        Ok(wallet)
    }

    // ------------------------------------------------------------------
    // round lifecycle

    fn start_round(&mut self) -> Result<(), GameError> {
        if !self.phase.is_over() {
            return Err(GameError::WrongPhase {
                expected: Phase::Complete,
                actual: self.phase,
            });
        }
        self.board.clear();
        let previous_actor = self.players.action_on().map(|p| p.id.clone());
        for player in self.players.iter_mut() {
            player.reset_for_new_round();
        }
        if !self.got_player_numbers() {
            self.restore_actor(previous_actor);
            return Err(GameError::NotEnoughPlayers);
        }
        if let Some(completed) = self.last_round_completed {
            let elapsed = completed.elapsed();
            let rebuy_possible = self.players.iter().any(|p| {
                p.stack.stack() == 0 && p.stack.wallet() >= self.settings.buy_in
            });
            if elapsed < REBUY_GRACE && rebuy_possible {
                self.restore_actor(previous_actor);
                return Err(GameError::RebuyWindow((REBUY_GRACE - elapsed).as_secs()));
            }
        }
        if self.settings.shuffle == ShufflePolicy::Always || self.round == 0 {
            self.deck = Deck::new();
        }
        // the completing round already rotated the button; rotating again
        // here would skip a seat
        let rotated = std::mem::take(&mut self.dealer_moved)
            && self
                .players
                .dealer()
                .is_some_and(|p| p.state.dealer() && !p.state.sitting_out());
        if rotated {
            let timeout = self.timeout();
            if let Some(dealer) = self.players.dealer().map(|p| p.id.clone()) {
                if let Some(p) = self.players.get_mut(&dealer) {
                    p.state.set_action_on(true, timeout);
                }
            }
        } else {
            self.players.move_dealer(self.timeout())?;
        }
        self.round += 1;
        if self.round == 1 {
            self.settings.mark_started();
            if self.settings.tournament() && self.players.len() > 1 {
                let timeout = self.settings.action_timeout;
                self.players.random_dealer(&mut self.rng, timeout)?;
            }
        }
        self.pot = 0;
        self.required = 0;
        self.last_raise = 0;
        self.min_raise = self.settings.big_blind();
        self.pots.clear();
        self.phase = Phase::PreDeal;
        debug!("game {} starting round {}", self.id, self.round);
        if let Err(failure) = self.post_blinds() {
            self.phase = Phase::Complete;
            return Err(failure);
        }
        self.broadcast_update();
        Ok(())
    }

    fn restore_actor(&mut self, actor: Option<String>) {
        if let Some(id) = actor {
            let timeout = self.timeout();
            if let Some(p) = self.players.get_mut(&id) {
                p.state.set_action_on(true, timeout);
            }
        }
    }

    /// Assign the blinds for the new round. Tournaments post them on the
    /// players' behalf; cash games nudge the players to post themselves.
    fn post_blinds(&mut self) -> Result<(), GameError> {
        let timeout = self.timeout();
        let dealer = self.players.dealer().ok_or(GameError::NoDealer)?.id.clone();
        let acting_only = !self.settings.tournament();
        let small = self.players.relative_to(&dealer, 1, acting_only)?;
        let big = self.players.relative_to(&dealer, 2, acting_only)?;
        if let Some(p) = self.players.get_mut(&small) {
            p.state.set_blind_due(Some(Blind::Small));
        }
        if let Some(p) = self.players.get_mut(&big) {
            p.state.set_blind_due(Some(Blind::Big));
        }
        let (small_handle, big_handle) = (
            self.players.get(&small).map(|p| p.handle.clone()).unwrap_or_default(),
            self.players.get(&big).map(|p| p.handle.clone()).unwrap_or_default(),
        );
        self.messenger
            .broadcast(TableMessage::blinds_due(&small_handle, &big_handle));
        if self.settings.tournament() {
            for p in self.players.iter_mut() {
                p.state.set_action_on(false, timeout);
            }
            if let Some(p) = self.players.get_mut(&small) {
                p.state.set_action_on(true, timeout);
            }
            // a sitting-out blind cannot take the turn token; their post
            // fails and the blind stays owed, but the round still opens
            for blind in [small.clone(), big.clone()] {
                if let Err(failure) = self.apply_for(&blind, ActionKind::PostBlind, 0) {
                    warn!("game {} could not auto-post blind for {}: {}", self.id, blind, failure);
                }
            }
        } else {
            self.players.move_action(timeout)?;
            for (id, blind, value) in [
                (&small, Blind::Small, self.settings.ante),
                (&big, Blind::Big, self.settings.big_blind()),
            ] {
                if let Some(p) = self.players.get(id) {
                    self.messenger.send(
                        Address::Session(p.session.clone()),
                        TableMessage::blind_due(blind, value),
                        BLIND_NUDGE_DELAY,
                    );
                }
            }
        }
        Ok(())
    }

    fn advance_deal(&mut self) -> Result<Dealt, GameError> {
        match self.phase {
            Phase::Complete => Ok(Dealt::Idle),
            Phase::PreDeal => {
                if !self.got_player_numbers() {
                    return Err(GameError::NotEnoughPlayers);
                }
                if let Some(actor) = self.players.action_on() {
                    if let Some(blind) = actor.state.blind_due() {
                        let value = match blind {
                            Blind::Small => self.settings.ante,
                            Blind::Big => self.settings.big_blind(),
                        };
                        self.messenger.send(
                            Address::Session(actor.session.clone()),
                            TableMessage::blind_due(blind, value),
                            BLIND_NUDGE_DELAY,
                        );
                        return Ok(Dealt::BlindsDue);
                    }
                }
                self.deal_hole_cards()?;
                self.phase = Phase::PostDeal;
                Ok(Dealt::Street(Phase::PostDeal))
            }
            Phase::PostDeal => {
                if let Some(outcome) = self.auto_complete_if_no_bets()? {
                    return Ok(outcome);
                }
                if let Some(waiting) = self.big_blind_option() {
                    return Ok(waiting);
                }
                self.advance_street(Phase::Flop)
            }
            Phase::Flop => {
                if let Some(outcome) = self.auto_complete_if_no_bets()? {
                    return Ok(outcome);
                }
                self.advance_street(Phase::Turn)
            }
            Phase::Turn => {
                if let Some(outcome) = self.auto_complete_if_no_bets()? {
                    return Ok(outcome);
                }
                self.advance_street(Phase::River)
            }
            Phase::River => {
                if let Some(outcome) = self.auto_complete_if_no_bets()? {
                    return Ok(outcome);
                }
                if !self.try_collect_bets() {
                    return Ok(Dealt::WaitingOnBets);
                }
                self.showdown()?;
                self.round_completed();
                self.players.move_dealer(self.timeout())?;
                self.dealer_moved = true;
                self.exclude_busted();
                self.phase = Phase::Complete;
                Ok(Dealt::Complete)
            }
        }
    }

    fn deal_hole_cards(&mut self) -> Result<(), GameError> {
        let mut seated: Vec<(usize, String, String)> = self
            .players
            .in_hand(false)
            .iter()
            .map(|p| (p.seat, p.id.clone(), p.session.clone()))
            .collect();
        seated.sort_by_key(|(seat, _, _)| *seat);
        for (_, id, session) in &seated {
            for _ in 0..HOLE_SIZE {
                let card = self.deck.draw().ok_or(GameError::DeckExhausted)?;
                if let Some(p) = self.players.get_mut(id) {
                    p.deal(card);
                }
            }
            if let Some(p) = self.players.get(id) {
                self.messenger.send(
                    Address::Session(session.clone()),
                    TableMessage::hole_cards(self.round, p.cards()),
                    HOLE_DEAL_DELAY,
                );
            }
        }
        Ok(())
    }

    fn advance_street(&mut self, next: Phase) -> Result<Dealt, GameError> {
        if !self.try_collect_bets() {
            return Ok(Dealt::WaitingOnBets);
        }
        self.blinds_raised_pre_deal = false;
        for _ in 0..next.revealed() {
            let card = self.deck.draw().ok_or(GameError::DeckExhausted)?;
            self.board.push(card);
        }
        self.phase = next;
        if !self.auto_completing {
            self.players.reset_action_for_deal(self.timeout())?;
        }
        Ok(Dealt::Street(next))
    }

    /// The big blind closes pre-flop betting: matching chips alone are
    /// not enough, they must have taken their option explicitly.
    fn big_blind_option(&self) -> Option<Dealt> {
        if self.auto_completing {
            return None;
        }
        let bb = self.players.iter().find(|p| p.state.was_big_blind())?;
        let equal =
            bb.stack.on_table() >= self.settings.big_blind() || self.blinds_raised_pre_deal;
        let checked = bb
            .state
            .last_action()
            .is_some_and(|k| k == ActionKind::Check || k.is_value_bet());
        if (equal && checked) || !bb.state.in_hand() {
            return None;
        }
        if !self.pot_equalized() {
            Some(Dealt::WaitingOnBets)
        } else {
            Some(Dealt::WaitingBigBlindCheck)
        }
    }

    fn pot_equalized(&self) -> bool {
        if self.auto_completing {
            return true;
        }
        self.players.in_hand(false).iter().all(|p| {
            p.stack.committed(self.phase) == Some(self.required) || p.stack.stack() == 0
        })
    }

    fn try_collect_bets(&mut self) -> bool {
        if !self.pot_equalized() {
            return false;
        }
        self.pot += self.players.collect_bets(self.phase);
        self.required = 0;
        self.last_raise = 0;
        self.min_raise = self.settings.big_blind();
        for p in self.players.iter_mut() {
            p.state.reset_for_new_deal();
        }
        true
    }

    /// When fewer than two players can still bet, betting is over for the
    /// round: either hand it to the last player standing, or run the
    /// remaining streets out and go straight to showdown.
    fn auto_complete_if_no_bets(&mut self) -> Result<Option<Dealt>, GameError> {
        if self.auto_completing {
            return Ok(None);
        }
        let contesting: Vec<String> = self
            .players
            .in_hand(false)
            .iter()
            .map(|p| p.id.clone())
            .collect();
        if contesting.len() < 2 {
            if let Some(winner) = contesting.first() {
                self.finish_early(&winner.clone())?;
            }
            return Ok(Some(Dealt::Complete));
        }
        if self.players.in_hand(true).len() < 2 && self.try_collect_bets() {
            self.auto_completing = true;
            let mut guard = 0;
            while !self.phase.is_over() && guard < AUTO_DEAL_LIMIT {
                self.advance_deal()?;
                guard += 1;
            }
            for p in self.players.iter_mut() {
                p.state.reset_for_new_deal();
            }
            let timeout = self.timeout();
            if let Some(dealer) = self.players.dealer().map(|p| p.id.clone()) {
                if let Some(p) = self.players.get_mut(&dealer) {
                    p.state.set_action_on(true, timeout);
                }
            }
            self.auto_completing = false;
            return Ok(Some(Dealt::AutoCompleted));
        }
        Ok(None)
    }

    /// Everyone else folded; the pot goes to the last player in the hand
    /// without a showdown.
    fn finish_early(&mut self, winner: &str) -> Result<(), GameError> {
        self.pot += self.players.collect_bets(self.phase);
        self.required = 0;
        let total = self.pot;
        let side = SidePot::walkover(total, winner);
        let handle = {
            let p = self
                .players
                .get_mut(winner)
                .ok_or_else(|| GameError::UnknownPlayer(winner.to_string()))?;
            p.stack.transfer_win(total);
            p.stack.stats_mut().wins += 1;
            p.handle.clone()
        };
        self.messenger.send(
            Address::All,
            TableMessage::status(&format!("{} takes the pot!", handle)),
            Duration::from_secs(1),
        );
        self.pots.clear();
        self.pots.absorb(&side);
        self.round_completed();
        self.broadcast_update();
        for p in self.players.iter_mut() {
            p.reset_for_new_round();
        }
        self.players.move_dealer(self.timeout())?;
        self.dealer_moved = true;
        self.exclude_busted();
        self.phase = Phase::Complete;
        Ok(())
    }

    fn showdown(&mut self) -> Result<(), GameError> {
        let called = self
            .players
            .in_hand(false)
            .iter()
            .filter(|p| p.state.acted_at().is_some())
            .max_by_key(|p| p.state.acted_at())
            .map(|p| p.id.clone());
        let settlement = settle(
            &mut self.players,
            &self.board,
            self.evaluator.as_ref(),
            &mut self.pots,
        );
        for p in self.players.iter_mut() {
            if p.state.sitting_out() {
                continue;
            }
            if settlement.payouts.contains_key(&p.id) {
                p.stack.stats_mut().wins += 1;
            } else if p.stack.committed_total() > 0 {
                p.stack.stats_mut().losses += 1;
            }
        }
        if let Some(called) = &called {
            if let Some(p) = self.players.get(called) {
                self.messenger.send(
                    Address::All,
                    TableMessage::reveal(&p.handle, p.cards(), false, "was called"),
                    Duration::from_secs(1),
                );
            }
        }
        for winner in self.pots.winners() {
            if Some(&winner) == called.as_ref() {
                continue;
            }
            if let Some(p) = self.players.get(&winner) {
                self.messenger.send(
                    Address::All,
                    TableMessage::reveal(&p.handle, p.cards(), true, "proves the winning hand"),
                    Duration::from_secs(1),
                );
            }
        }
        debug!(
            "game {} round {} settled {} across {} pots",
            self.id,
            self.round,
            settlement.total(),
            settlement.side_pots.len()
        );
        if self.settings.tournament() {
            self.eliminate_and_rank()?;
        }
        Ok(())
    }

    /// Rank busted players below everyone still holding chips; when the
    /// field is down to the paid places, exchange play chips for the
    /// prize split and end the game.
    fn eliminate_and_rank(&mut self) -> Result<(), GameError> {
        let mut busted: Vec<String> = self
            .players
            .iter()
            .filter(|p| p.stack.stack() == 0 && p.stack.stats().rank.is_none() && !p.state.cashed_out())
            .map(|p| p.id.clone())
            .collect();
        busted.sort_by_key(|id| {
            self.players
                .get(id)
                .map(|p| p.stack.committed_total())
                .unwrap_or(0)
        });
        let mut next_rank = self
            .players
            .iter()
            .filter_map(|p| p.stack.stats().rank)
            .min()
            .map(|r| r.saturating_sub(1))
            .unwrap_or(self.players.len() as u32);
        for id in busted {
            if let Some(p) = self.players.get_mut(&id) {
                p.stack.stats_mut().rank = Some(next_rank);
                let _ = p.cash_out();
                info!("{} finishes in place {}", p.handle, next_rank);
            }
            next_rank = next_rank.saturating_sub(1);
        }
        let mut live: Vec<String> = self
            .players
            .iter()
            .filter(|p| p.stack.stack() > 0)
            .map(|p| p.id.clone())
            .collect();
        if self.settings.prize_split.is_empty() || live.len() != self.settings.prize_split.len() {
            return Ok(());
        }
        live.sort_by_key(|id| {
            std::cmp::Reverse(self.players.get(id).map(|p| p.stack.stack()).unwrap_or(0))
        });
        let mut paid = 0;
        let shares: Vec<Chips> = self
            .settings
            .prize_split
            .iter()
            .map(|pct| self.prize_fund * (*pct as Chips) / 100)
            .collect();
        for (place, id) in live.iter().enumerate() {
            let mut share = shares[place];
            if place == 0 {
                // rounding leftovers go to first place so the fund pays out whole
                share += self.prize_fund - shares.iter().sum::<Chips>();
            }
            if let Some(p) = self.players.get_mut(id) {
                p.stack.stats_mut().rank = Some(place as u32 + 1);
                p.stack.award(share);
                let _ = p.cash_out();
                info!("{} wins prize {} in place {}", p.handle, share, place + 1);
            }
            paid += share;
        }
        debug_assert_eq!(paid, self.prize_fund);
        self.settings.mark_completed();
        self.messenger.send(
            Address::All,
            TableMessage::game_over(self),
            Duration::from_secs(2),
        );
        Ok(())
    }

    fn exclude_busted(&mut self) {
        for p in self.players.iter_mut() {
            if p.stack.stack() == 0 {
                p.state.exclude();
            }
        }
    }

    fn round_completed(&mut self) {
        let record = RoundRecord::capture(
            &self.id.to_string(),
            self.round,
            self.phase,
            &self.board,
            &self.pots,
            &self.players,
            self.deck.seed(),
        );
        self.history.record(record);
        self.last_round_completed = Some(Instant::now());
    }

    // ------------------------------------------------------------------
    // actions

    fn apply_for(&mut self, id: &str, kind: ActionKind, value: Chips) -> Result<(), GameError> {
        match kind {
            ActionKind::Rebuy => return self.rebuy(id),
            ActionKind::SitOut => return self.toggle_sitting(id, value != 0),
            ActionKind::CashOut => return self.cash_out_player(id),
            _ => {}
        }
        let (acting, blind_due, handle) = {
            let player = self
                .players
                .get(id)
                .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
            (player.state.action_on(), player.state.blind_due(), player.handle.clone())
        };
        if !acting && kind.on_turn_only() {
            if !(self.phase.is_over() && kind.is_fold()) {
                return Err(GameError::OutOfTurn(handle));
            }
        } else if blind_due.is_some() && kind != ActionKind::PostBlind && !kind.is_fold() {
            return Err(GameError::BlindOutstanding);
        }
        let mut big_blind_posted = false;
        let proceed = match kind {
            ActionKind::PostBlind => {
                let value = match blind_due {
                    Some(Blind::Small) => self.settings.ante,
                    Some(Blind::Big) => {
                        big_blind_posted = true;
                        self.settings.big_blind()
                    }
                    None => return Err(GameError::AlreadyProcessed),
                };
                let player = self
                    .players
                    .get_mut(id)
                    .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
                player.stack.add_to_table(Phase::PostDeal, value);
                player.state.set_blind_due(None);
                player.state.set_last_action(ActionKind::PostBlind);
                true
            }
            ActionKind::Check => {
                let (on_table, bb_checking) = {
                    let player = self
                        .players
                        .get(id)
                        .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
                    (
                        player.stack.on_table(),
                        player.state.was_big_blind() && blind_due != Some(Blind::Big),
                    )
                };
                let to_call = self.required - on_table;
                if to_call != 0 && !bb_checking {
                    return Err(GameError::UnderBet {
                        required: to_call,
                        offered: 0,
                    });
                }
                let phase = self.phase;
                let player = self
                    .players
                    .get_mut(id)
                    .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
                player.stack.add_to_table(phase, 0);
                player.state.set_last_action(ActionKind::Check);
                true
            }
            ActionKind::Fold | ActionKind::Reveal => self.fold_or_reveal(id, kind)?,
            _ => {
                if self.phase.is_over() {
                    return Err(GameError::WrongPhase {
                        expected: Phase::PostDeal,
                        actual: self.phase,
                    });
                }
                self.bet(id, kind, value)?;
                true
            }
        };
        if proceed {
            if kind.is_value_bet() || big_blind_posted {
                let total = self
                    .players
                    .get(id)
                    .map(|p| p.stack.on_table())
                    .unwrap_or(0);
                self.raise_required(total);
            }
            self.players.move_action(self.timeout())?;
            let dealt = self.advance_deal()?;
            debug!("game {} action {:?} by {} -> {:?}", self.id, kind, id, dealt);
        }
        self.broadcast_update();
        Ok(())
    }

    /// Lift the street's required total after a voluntary commitment,
    /// tracking the raise delta for minimum-raise arithmetic.
    fn raise_required(&mut self, total: Chips) {
        let required = self.required.max(total);
        self.last_raise = self.last_raise.max(required - self.required);
        self.required = required;
        self.min_raise = if self.settings.enforce_min_raise {
            required + self.last_raise
        } else {
            required + self.settings.big_blind()
        };
    }

    /// Validate and commit a voluntary bet. The commitment is capped at
    /// the most any other live player could possibly call, so nobody
    /// bets money that can never be matched.
    fn bet(&mut self, id: &str, kind: ActionKind, value: Chips) -> Result<(), GameError> {
        let (on_table, stack, total, can_act, was_big_blind) = {
            let player = self
                .players
                .get(id)
                .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
            (
                player.stack.on_table(),
                player.stack.stack(),
                player.stack.total(),
                player.can_act(),
                player.state.was_big_blind(),
            )
        };
        if !can_act {
            return Err(GameError::NoFunds);
        }
        let to_call = self.required - on_table;
        let mut add = match kind {
            ActionKind::Call => to_call,
            ActionKind::Bet => {
                if value >= self.required || value == total {
                    value - on_table
                } else {
                    return Err(GameError::UnderBet {
                        required: self.required,
                        offered: value,
                    });
                }
            }
            ActionKind::Raise => (self.required + value) - on_table,
            ActionKind::AllIn => stack,
            _ => return Err(GameError::AlreadyProcessed),
        };
        let cover = self
            .players
            .iter()
            .filter(|o| o.id != id && o.state.in_hand())
            .map(|o| o.stack.stack() + o.stack.on_table())
            .filter(|v| *v > 0)
            .max()
            .unwrap_or(0);
        if cover > 0 && cover < add + on_table {
            add = cover - on_table;
        }
        let phase = self.phase;
        let round = self.round;
        let vpip_street = matches!(phase, Phase::PreDeal | Phase::PostDeal)
            || (phase == Phase::Flop && was_big_blind);
        let player = self
            .players
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
        let added = player.stack.add_to_table(phase, add) || (to_call == 0 && add == 0);
        if !added {
            return Err(GameError::NoFunds);
        }
        if player.stack.stack() == 0 {
            player.state.set_all_in();
            player.state.set_last_action(ActionKind::AllIn);
        } else {
            player.state.set_last_action(kind);
        }
        if kind.is_value_bet() && vpip_street {
            player.stack.stats_mut().mark_vpip(round);
        }
        Ok(())
    }

    /// Fold, optionally showing the cards. During a round this forfeits
    /// the street's chips to the pot; after completion it only reveals.
    /// Returns whether the turn should advance.
    fn fold_or_reveal(&mut self, id: &str, kind: ActionKind) -> Result<bool, GameError> {
        let (acting, blind_due, folded) = {
            let player = self
                .players
                .get(id)
                .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
            (
                player.state.action_on(),
                player.state.blind_due(),
                player.state.last_action().is_some_and(|k| k.is_fold()),
            )
        };
        if blind_due.is_some() || folded {
            return Err(GameError::AlreadyProcessed);
        }
        if !self.phase.is_over() {
            if !acting {
                let handle = self.players.get(id).map(|p| p.handle.clone()).unwrap_or_default();
                return Err(GameError::OutOfTurn(handle));
            }
            let swept = {
                let player = self
                    .players
                    .get_mut(id)
                    .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
                player.state.set_last_action(kind);
                player.stack.collect()
            };
            self.pot += swept;
            if kind == ActionKind::Reveal {
                if let Some(p) = self.players.get(id) {
                    self.messenger
                        .broadcast(TableMessage::reveal(&p.handle, p.cards(), false, "folds face up"));
                }
            }
            Ok(true)
        } else {
            if let Some(p) = self.players.get_mut(id) {
                p.state.set_last_action(kind);
            }
            if kind == ActionKind::Reveal {
                if let Some(p) = self.players.get(id) {
                    let cards = if p.cards().is_empty() { p.last_cards() } else { p.cards() };
                    self.messenger
                        .broadcast(TableMessage::reveal(&p.handle, cards, false, "shows their hand"));
                }
            }
            Ok(false)
        }
    }

    fn rebuy(&mut self, id: &str) -> Result<(), GameError> {
        if !self.phase.is_over() && !self.settings.buy_in_during_game {
            return Err(GameError::WrongPhase {
                expected: Phase::Complete,
                actual: self.phase,
            });
        }
        let buy_in = self.settings.buy_in;
        let player = self
            .players
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
        player.stack.rebuy(buy_in, 0)?;
        info!("{} re-buys for {}", player.handle, buy_in);
        self.broadcast_update();
        Ok(())
    }

    fn toggle_sitting(&mut self, id: &str, sit_out: bool) -> Result<(), GameError> {
        let phase = self.phase;
        let player = self
            .players
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
        player.state.toggle_sitting_out(phase, sit_out)?;
        self.broadcast_update();
        Ok(())
    }

    fn cash_out_player(&mut self, id: &str) -> Result<(), GameError> {
        let player = self
            .players
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))?;
        let wallet = player.cash_out()?;
        info!("{} cashes out with {}", player.handle, wallet);
        self.broadcast_update();
        Ok(())
    }

    // ------------------------------------------------------------------
    // timers

    /// Act for a player whose clock ran out: post an owed blind, check
    /// when checking is free, otherwise fold. Returns what was done.
    pub fn sweep_inaction(&mut self, now: Instant) -> Result<Option<ActionKind>, GameError> {
        if self.round == 0 || self.phase.is_over() {
            return Ok(None);
        }
        let (id, session, kind) = {
            let Some(actor) = self.players.action_on() else {
                return Ok(None);
            };
            if !actor.state.overdue(now) {
                return Ok(None);
            }
            if actor.state.last_action().is_some_and(|k| k.is_fold()) {
                return Ok(None);
            }
            let kind = if actor.state.blind_due().is_some() {
                ActionKind::PostBlind
            } else if actor.state.was_big_blind()
                || self.required - actor.stack.on_table() == 0
            {
                ActionKind::Check
            } else {
                ActionKind::Fold
            };
            (actor.id.clone(), actor.session.clone(), kind)
        };
        info!("game {} sweeping idle player {} with {:?}", self.id, id, kind);
        self.messenger.send(
            Address::Session(session),
            TableMessage::status("you timed out and the table acted for you"),
            Duration::from_millis(500),
        );
        self.apply_for(&id, kind, 0)?;
        Ok(Some(kind))
    }

    /// Double the blinds on the tournament clock. A raise landing before
    /// the flop keeps the current big blind's closing option intact.
    pub fn raise_blinds(&mut self) -> bool {
        if !self.settings.increase_blinds() {
            return false;
        }
        self.blinds_raised_pre_deal = self.phase <= Phase::PostDeal;
        self.messenger.broadcast(TableMessage::status(&format!(
            "blinds are now {} / {}",
            self.settings.ante,
            self.settings.big_blind()
        )));
        true
    }

    /// Wind the table down: everyone is cashed out and unseated.
    pub fn complete_game(&mut self) {
        let ids: Vec<String> = self.players.iter().map(|p| p.id.clone()).collect();
        for id in ids {
            let _ = self.remove_player(&id);
        }
        self.settings.mark_completed();
        self.messenger.broadcast(TableMessage::game_over(self));
    }
}

impl RoundEngine for HoldemGame {
    fn phase(&self) -> Phase {
        self.phase
    }
    fn round(&self) -> Round {
        self.round
    }
    fn start_next_round(&mut self) -> Result<(), GameError> {
        self.start_round()
    }
    fn deal(&mut self) -> Result<Dealt, GameError> {
        self.advance_deal()
    }
    fn apply(&mut self, action: Action) -> Result<(), GameError> {
        let id = self
            .players
            .by_session(&action.session)
            .map(|p| p.id.clone())
            .ok_or_else(|| GameError::UnknownSession(action.session.clone()))?;
        self.apply_for(&id, action.kind, action.value)
    }
    fn pause_player(&mut self, session: &str, sit_out: bool) -> Result<(), GameError> {
        let id = self
            .players
            .by_session(session)
            .map(|p| p.id.clone())
            .ok_or_else(|| GameError::UnknownSession(session.to_string()))?;
        self.toggle_sitting(&id, sit_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::HandRank;
    use crate::rank::RankCategory;
    use crate::settings::Format;

    /// Ranks by the first hole card's index, deterministic per deal.
    struct FirstCard;
    impl RankEvaluator for FirstCard {
        fn rank(&self, hole: &[Card], _: &[Card]) -> HandRank {
            HandRank::new(u8::from(hole[0]) as u32, RankCategory::HighCard)
        }
    }

    struct Silent;
    impl Messenger for Silent {
        fn send(&self, _: crate::message::Address, _: TableMessage, _: Duration) {}
    }

    /// Captures outbound traffic as JSON for assertions.
    struct Recorder(std::sync::Arc<std::sync::Mutex<Vec<String>>>);
    impl Messenger for Recorder {
        fn send(&self, _: crate::message::Address, message: TableMessage, _: Duration) {
            self.0.lock().unwrap().push(message.to_json());
        }
    }

    struct NoHistory;
    impl HistorySink for NoHistory {
        fn record(&self, _: RoundRecord) {}
    }

    fn tournament(players: usize, opening: Chips, ante: Chips) -> HoldemGame {
        let settings = Settings {
            format: Format::Tournament,
            buy_in: 1_000,
            opening_stack: opening,
            ante,
            ..Settings::default()
        };
        let mut game =
            HoldemGame::new(settings, Box::new(FirstCard), Box::new(Silent), Box::new(NoHistory))
                .unwrap();
        for n in 0..players {
            let id = format!("p{}", n);
            game.add_player(&id, &format!("player{}", n), &format!("s{}", n), 0)
                .unwrap();
        }
        game
    }

    fn act(game: &mut HoldemGame, kind: ActionKind, value: Chips) {
        let session = game.players.action_on().unwrap().session.clone();
        game.apply(Action::with_value(&session, kind, value)).unwrap();
    }

    fn chips_total(game: &HoldemGame) -> Chips {
        game.players
            .iter()
            .map(|p| p.stack.wallet() + p.stack.stack() + p.stack.on_table())
            .sum()
    }

    #[test]
    fn seating_is_validated() {
        let mut game = tournament(2, 10_000, 10);
        assert_eq!(
            game.add_player("", "x", "s", 0),
            Err(GameError::InvalidPlayer("blank id or handle".into()))
        );
        assert_eq!(
            game.add_player("p9", "bad handle", "s", 0),
            Err(GameError::InvalidPlayer("handle contains a space".into()))
        );
        assert_eq!(game.add_player("p0", "other", "s", 0), Err(GameError::DuplicatePlayer));
        assert_eq!(
            game.add_player("p9", "PLAYER1", "s", 0),
            Err(GameError::DuplicatePlayer)
        );
        for n in 2..MAX_PLAYERS {
            game.add_player(&format!("q{}", n), &format!("q{}", n), "s", 0).unwrap();
        }
        assert_eq!(game.add_player("overflow", "late", "s", 0), Err(GameError::MaxPlayers));
    }

    #[test]
    fn tournament_entry_closes_after_the_configured_round() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        assert_eq!(game.round(), 1);
        game.add_player("late1", "late1", "s", 0).unwrap();
        assert_eq!(game.prize_fund(), 4_000);
        game.settings.max_entry_round = 0;
        assert_eq!(
            game.add_player("late2", "late2", "s", 0),
            Err(GameError::TournamentEntryClosed(0))
        );
    }

    #[test]
    fn blinds_are_posted_automatically_in_tournaments() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        assert_eq!(game.phase(), Phase::PostDeal);
        assert_eq!(game.required(), 20);
        assert_eq!(game.min_raise(), 40);
        let committed: Chips = game
            .players
            .iter()
            .map(|p| p.stack.on_table())
            .sum();
        assert_eq!(committed, 30);
        assert_eq!(chips_total(&game), 30_000);
    }

    #[test]
    fn checked_down_round_reaches_showdown_with_an_exact_pot() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        // pre-flop: caller, caller, big blind checks their option
        act(&mut game, ActionKind::Call, 0);
        act(&mut game, ActionKind::Call, 0);
        act(&mut game, ActionKind::Check, 0);
        assert_eq!(game.phase(), Phase::Flop);
        for _ in 0..3 {
            act(&mut game, ActionKind::Check, 0);
        }
        assert_eq!(game.phase(), Phase::Turn);
        for _ in 0..3 {
            act(&mut game, ActionKind::Check, 0);
        }
        assert_eq!(game.phase(), Phase::River);
        for _ in 0..3 {
            act(&mut game, ActionKind::Check, 0);
        }
        assert_eq!(game.phase(), Phase::Complete);
        assert_eq!(game.board().len(), 5);
        assert_eq!(game.pots().total(), 60);
        assert_eq!(chips_total(&game), 30_000);
        let winners: Vec<_> = game
            .players
            .iter()
            .filter(|p| p.stack.stats().wins == 1)
            .collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].stack.stack(), 10_040);
    }

    #[test]
    fn big_blind_keeps_the_option_even_when_matched() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        act(&mut game, ActionKind::Call, 0);
        act(&mut game, ActionKind::Call, 0);
        // everyone has 20 on the table but the big blind has not acted
        assert_eq!(game.phase(), Phase::PostDeal);
        let bb = game
            .players
            .iter()
            .find(|p| p.state.was_big_blind())
            .unwrap();
        assert!(bb.state.action_on());
    }

    #[test]
    fn folds_hand_the_pot_to_the_last_player() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        act(&mut game, ActionKind::Fold, 0);
        act(&mut game, ActionKind::Fold, 0);
        assert_eq!(game.phase(), Phase::Complete);
        assert_eq!(chips_total(&game), 30_000);
        // the big blind's unmatched 10 came back before the pot paid out
        let winner = game
            .players
            .iter()
            .find(|p| p.stack.stats().wins == 1)
            .unwrap();
        assert_eq!(winner.stack.stack(), 10_010);
    }

    #[test]
    fn button_advances_one_seat_between_hands() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        let first = game.players.dealer().unwrap().id.clone();
        act(&mut game, ActionKind::Fold, 0);
        act(&mut game, ActionKind::Fold, 0);
        assert_eq!(game.phase(), Phase::Complete);
        game.start_next_round().unwrap();
        let second = game.players.dealer().unwrap().id.clone();
        assert_eq!(second, game.players.relative_to(&first, 1, false).unwrap());
    }

    #[test]
    fn heads_up_button_alternates_every_hand() {
        let mut game = tournament(2, 10_000, 10);
        game.start_next_round().unwrap();
        let first = game.players.dealer().unwrap().id.clone();
        act(&mut game, ActionKind::Fold, 0);
        assert_eq!(game.phase(), Phase::Complete);
        game.start_next_round().unwrap();
        let second = game.players.dealer().unwrap().id.clone();
        assert_ne!(first, second);
    }

    #[test]
    fn river_folds_end_the_round_without_a_showdown() {
        let sent = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut game = HoldemGame::new(
            Settings::default(),
            Box::new(FirstCard),
            Box::new(Recorder(sent.clone())),
            Box::new(NoHistory),
        )
        .unwrap();
        for n in 0..3 {
            game.add_player(&format!("p{}", n), &format!("player{}", n), &format!("s{}", n), 0)
                .unwrap();
        }
        game.start_next_round().unwrap();
        act(&mut game, ActionKind::Call, 0);
        act(&mut game, ActionKind::Call, 0);
        act(&mut game, ActionKind::Check, 0);
        for _ in 0..6 {
            act(&mut game, ActionKind::Check, 0);
        }
        assert_eq!(game.phase(), Phase::River);
        act(&mut game, ActionKind::Fold, 0);
        act(&mut game, ActionKind::Fold, 0);
        assert_eq!(game.phase(), Phase::Complete);
        assert_eq!(chips_total(&game), 30_000);
        let winner = game
            .players
            .iter()
            .find(|p| p.stack.stats().wins == 1)
            .unwrap();
        assert_eq!(winner.stack.stack(), 10_040);
        // a walkover pot pays out with nobody's hole cards shown
        let sent = sent.lock().unwrap();
        assert!(!sent.iter().any(|m| m.contains("\"type\":\"reveal\"")));
    }

    #[test]
    fn sitting_out_big_blind_does_not_block_the_next_round() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        act(&mut game, ActionKind::Fold, 0);
        act(&mut game, ActionKind::Fold, 0);
        assert_eq!(game.phase(), Phase::Complete);
        let dealer = game.players.dealer().unwrap().id.clone();
        let big = game.players.relative_to(&dealer, 2, false).unwrap();
        let session = game.players.get(&big).unwrap().session.clone();
        game.pause_player(&session, true).unwrap();
        game.start_next_round().unwrap();
        assert_eq!(game.phase(), Phase::PostDeal);
        assert_eq!(game.round(), 2);
        assert_eq!(game.players.in_hand(false).len(), 2);
        // the blind stays owed until the player sits back in
        let owed = game.players.get(&big).unwrap();
        assert!(owed.state.sitting_out());
        assert_eq!(owed.state.blind_due(), Some(Blind::Big));
        assert_eq!(chips_total(&game), 30_000);
    }

    #[test]
    fn out_of_turn_and_underbets_are_rejected() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        let idle = game
            .players
            .iter()
            .find(|p| !p.state.action_on())
            .unwrap()
            .session
            .clone();
        let refused = game.apply(Action::new(&idle, ActionKind::Check));
        assert!(matches!(refused, Err(GameError::OutOfTurn(_))));
        let acting = game.players.action_on().unwrap().session.clone();
        assert_eq!(
            game.apply(Action::new(&acting, ActionKind::Check)),
            Err(GameError::UnderBet { required: 20, offered: 0 })
        );
        assert_eq!(chips_total(&game), 30_000);
    }

    #[test]
    fn raise_lifts_required_and_minimum() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        act(&mut game, ActionKind::Raise, 40);
        assert_eq!(game.required(), 60);
        assert_eq!(game.min_raise(), 100);
    }

    #[test]
    fn all_in_short_stacks_run_the_board_out() {
        let mut game = tournament(2, 40, 10);
        game.start_next_round().unwrap();
        act(&mut game, ActionKind::AllIn, 0);
        act(&mut game, ActionKind::AllIn, 0);
        assert_eq!(game.phase(), Phase::Complete);
        assert_eq!(game.board().len(), 5);
        let stacks: Chips = game.players.iter().map(|p| p.stack.stack() + p.stack.wallet()).sum();
        assert_eq!(stacks, 80);
    }

    #[test]
    fn tournament_prizes_conserve_the_fund() {
        let mut game = tournament(2, 40, 10);
        game.settings.prize_split = vec![100];
        game.start_next_round().unwrap();
        act(&mut game, ActionKind::AllIn, 0);
        act(&mut game, ActionKind::AllIn, 0);
        assert_eq!(game.phase(), Phase::Complete);
        let wallets: Vec<Chips> = game.players.iter().map(|p| p.stack.wallet()).collect();
        assert_eq!(wallets.iter().sum::<Chips>(), 2_000);
        assert!(wallets.contains(&2_000));
        let ranks: Vec<_> = game
            .players
            .iter()
            .filter_map(|p| p.stack.stats().rank)
            .collect();
        assert_eq!(ranks.len(), 2);
        assert!(ranks.contains(&1));
        assert!(ranks.contains(&2));
        assert!(game.settings.game_length().is_some());
    }

    #[test]
    fn pausing_mid_round_defers_to_the_boundary() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        game.pause_player("s0", true).unwrap();
        let paused = game.players.get("p0").unwrap();
        assert!(!paused.state.sitting_out());
        assert!(paused.state.sitting_out_next());
        assert_eq!(
            game.pause_player("s0", true),
            Err(GameError::AlreadyProcessed)
        );
    }

    #[test]
    fn next_round_needs_the_current_one_finished() {
        let mut game = tournament(3, 10_000, 10);
        game.start_next_round().unwrap();
        assert!(matches!(
            game.start_next_round(),
            Err(GameError::WrongPhase { .. })
        ));
    }

    #[test]
    fn sweep_posts_blinds_checks_or_folds() {
        let mut game = tournament(3, 10_000, 10);
        game.settings.action_timeout = Some(Duration::from_secs(5));
        game.start_next_round().unwrap();
        let overdue = Instant::now() + Duration::from_secs(60);
        // first actor owes a call, so the sweep folds them
        let swept = game.sweep_inaction(overdue).unwrap();
        assert_eq!(swept, Some(ActionKind::Fold));
        // not yet overdue: nothing happens
        assert_eq!(game.sweep_inaction(Instant::now()).unwrap(), None);
        assert_eq!(chips_total(&game), 30_000);
    }

    #[test]
    fn busted_players_rebuy_only_between_rounds() {
        let settings = Settings {
            format: Format::Cash,
            buy_in: 1_000,
            ante: 10,
            ..Settings::default()
        };
        let mut game =
            HoldemGame::new(settings, Box::new(FirstCard), Box::new(Silent), Box::new(NoHistory))
                .unwrap();
        game.add_player("a", "alice", "sa", 3_000).unwrap();
        game.add_player("b", "bob", "sb", 3_000).unwrap();
        game.start_next_round().unwrap();
        assert_eq!(
            game.apply(Action::new("sa", ActionKind::Rebuy)),
            Err(GameError::WrongPhase {
                expected: Phase::Complete,
                actual: game.phase()
            })
        );
        game.settings.buy_in_during_game = true;
        // still refused: the stack is above the in-game ceiling
        assert_eq!(
            game.apply(Action::new("sa", ActionKind::Rebuy)),
            Err(GameError::NonZeroStack)
        );
    }

    #[test]
    fn removing_a_player_mid_round_can_end_it() {
        let mut game = tournament(2, 10_000, 10);
        game.start_next_round().unwrap();
        assert_eq!(game.phase(), Phase::PostDeal);
        game.remove_player("p0").unwrap();
        assert_eq!(game.phase(), Phase::Complete);
        assert_eq!(game.players.len(), 1);
        // the departed player's table chips stayed behind in the pot
        assert!(game.pot() > 0);
    }
}
