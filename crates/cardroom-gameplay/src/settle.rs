use std::collections::BTreeMap;

use cardroom_cards::Card;
use cardroom_core::Chips;

use crate::phase::Phase;
use crate::players::Players;
use crate::pot::Pots;
use crate::pot::SidePot;
use crate::pot::StreetPot;
use crate::rank::RankEvaluator;

/// The outcome of one round's showdown: every side pot produced across
/// the betting streets and the exact amount credited to each winner.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub side_pots: Vec<SidePot>,
    pub payouts: BTreeMap<String, Chips>,
}

impl Settlement {
    pub fn total(&self) -> Chips {
        self.side_pots.iter().map(|p| p.total).sum()
    }
}

/// Rank the live hands, slice each betting street into side pots, and
/// pay the winners.
///
/// Every player who committed money and never folded gets ranked by the
/// injected evaluator; folded commitments stay in as dead money. The
/// streets are walked in order so earlier commitments settle first, and
/// payouts move onto stacks before this returns. The sum of all payouts
/// equals the sum of all street totals exactly.
pub fn settle(
    players: &mut Players,
    board: &[Card],
    evaluator: &dyn RankEvaluator,
    pots: &mut Pots,
) -> Settlement {
    let ids: Vec<String> = players.iter().map(|p| p.id.clone()).collect();
    for id in &ids {
        if let Some(player) = players.get_mut(id) {
            if !player.state.folded() && player.stack.committed_total() > 0 {
                player.rank = Some(evaluator.rank(player.cards(), board));
            }
        }
    }
    let mut side_pots = Vec::new();
    for phase in Phase::BETTING {
        let street = StreetPot::gather(phase, players);
        if street.total > 0 {
            side_pots.extend(street.side_pots());
        }
    }
    let mut payouts: BTreeMap<String, Chips> = BTreeMap::new();
    for pot in &side_pots {
        for (id, amount) in pot.payouts() {
            *payouts.entry(id).or_insert(0) += amount;
        }
    }
    for (id, amount) in &payouts {
        if let Some(player) = players.get_mut(id) {
            player.stack.transfer_win(*amount);
        }
    }
    pots.absorb_all(&side_pots);
    Settlement { side_pots, payouts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::player::Player;
    use crate::rank::HandRank;
    use crate::rank::RankCategory;
    use crate::stack::Stack;
    use crate::state::State;

    /// Ranks a hand by its first hole card's index, so tests pick the
    /// pecking order by choosing hole cards.
    struct FirstCard;
    impl RankEvaluator for FirstCard {
        fn rank(&self, hole: &[Card], _: &[Card]) -> HandRank {
            HandRank::new(u8::from(hole[0]) as u32, RankCategory::HighCard)
        }
    }

    fn seat(players: &mut Players, id: &str, stack: Chips, hole: &str) {
        let seat = players.next_seat(None);
        let mut player = Player::new(id, id, seat, Stack::cash(stack, stack).unwrap(), State::default());
        for card in Card::parse(hole).unwrap() {
            player.deal(card);
        }
        players.add(player);
    }

    fn commit(players: &mut Players, id: &str, phase: Phase, amount: Chips) {
        let p = players.get_mut(id).unwrap();
        p.stack.add_to_table(phase, amount);
        p.stack.collect();
    }

    #[test]
    fn layered_all_ins_settle_exactly() {
        let mut players = Players::default();
        // c holds the best hand, then b, then a
        seat(&mut players, "a", 1_000, "2c 2d");
        seat(&mut players, "b", 800, "Tc Td");
        seat(&mut players, "c", 650, "Ac Ad");
        commit(&mut players, "a", Phase::PostDeal, 1_000);
        commit(&mut players, "b", Phase::PostDeal, 800);
        commit(&mut players, "c", Phase::PostDeal, 650);
        let mut pots = Pots::default();
        let settled = settle(&mut players, &[], &FirstCard, &mut pots);
        let totals: Vec<Chips> = settled.side_pots.iter().map(|p| p.total).collect();
        assert_eq!(totals, [1_950, 300, 200]);
        assert_eq!(settled.payouts["c"], 1_950);
        assert_eq!(settled.payouts["b"], 300);
        assert_eq!(settled.payouts["a"], 200);
        assert_eq!(settled.total(), 2_450);
        assert_eq!(players.get("c").unwrap().stack.stack(), 1_950);
    }

    #[test]
    fn folded_money_rides_in_the_earliest_layer() {
        let mut players = Players::default();
        seat(&mut players, "a", 500, "Ac Ad");
        seat(&mut players, "b", 500, "2c 2d");
        seat(&mut players, "f", 500, "3c 3d");
        commit(&mut players, "a", Phase::Flop, 200);
        commit(&mut players, "b", Phase::Flop, 200);
        commit(&mut players, "f", Phase::Flop, 100);
        players.get_mut("f").unwrap().state.set_last_action(ActionKind::Fold);
        let mut pots = Pots::default();
        let settled = settle(&mut players, &[], &FirstCard, &mut pots);
        assert_eq!(settled.side_pots.len(), 1);
        assert_eq!(settled.side_pots[0].total, 500);
        assert_eq!(settled.payouts["a"], 500);
        assert!(players.get("f").unwrap().rank.is_none());
    }

    #[test]
    fn tied_hands_split_with_remainder_to_the_earliest() {
        let mut players = Players::default();
        // same first-card index, different suits rank equal here
        seat(&mut players, "a", 1_000, "Ac Kd");
        seat(&mut players, "b", 1_000, "Ac Qd");
        seat(&mut players, "c", 1_000, "2c 2d");
        commit(&mut players, "a", Phase::Turn, 67);
        commit(&mut players, "b", Phase::Turn, 67);
        commit(&mut players, "c", Phase::Turn, 67);
        let mut pots = Pots::default();
        let settled = settle(&mut players, &[], &FirstCard, &mut pots);
        let paid: Chips = settled.payouts.values().sum();
        assert_eq!(paid, 201);
        assert_eq!(settled.payouts["a"] + settled.payouts["b"], 201);
        assert_eq!((settled.payouts["a"] - settled.payouts["b"]).abs(), 1);
    }

    #[test]
    fn streets_settle_independently() {
        let mut players = Players::default();
        seat(&mut players, "a", 1_000, "Ac Ad");
        seat(&mut players, "b", 1_000, "2c 2d");
        commit(&mut players, "a", Phase::PostDeal, 100);
        commit(&mut players, "b", Phase::PostDeal, 100);
        commit(&mut players, "a", Phase::River, 300);
        commit(&mut players, "b", Phase::River, 300);
        let mut pots = Pots::default();
        let settled = settle(&mut players, &[], &FirstCard, &mut pots);
        assert_eq!(settled.side_pots.len(), 2);
        assert_eq!(settled.payouts["a"], 800);
        // both pots share one winner set, so the display rolls them up
        assert_eq!(pots.iter().count(), 1);
        assert_eq!(pots.total(), 800);
    }
}
