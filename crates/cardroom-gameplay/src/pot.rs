use std::collections::BTreeMap;

use serde::Serialize;

use cardroom_core::Chips;

use crate::phase::Phase;
use crate::players::Players;
use crate::rank::HandRank;

/// A player with a live claim on part of a street's pot.
#[derive(Debug, Clone, Serialize)]
pub struct Contender {
    pub id: String,
    pub commit: Chips,
    pub rank: HandRank,
}

/// Everything one betting street collected: the full amount (folded
/// money included), how many seats contributed, and the contenders who
/// can still win it.
#[derive(Debug, Clone, Serialize)]
pub struct StreetPot {
    pub phase: Phase,
    pub total: Chips,
    pub contributing: usize,
    pub contenders: Vec<Contender>,
}

impl StreetPot {
    /// Snapshot a street's commitments off the table. Folded players
    /// swell the total and the contributor count but never contend.
    pub fn gather(phase: Phase, players: &Players) -> Self {
        let mut pot = Self {
            phase,
            total: 0,
            contributing: 0,
            contenders: Vec::new(),
        };
        for player in players.iter() {
            let commit = player.stack.committed(phase).unwrap_or(0);
            if commit == 0 {
                continue;
            }
            pot.total += commit;
            pot.contributing += 1;
            if player.state.folded() {
                continue;
            }
            if let Some(rank) = player.rank {
                pot.contenders.push(Contender {
                    id: player.id.clone(),
                    commit,
                    rank,
                });
            }
        }
        pot
    }

    /// Split this street into layered side pots.
    ///
    /// Contenders are walked from the shortest commitment up; each layer
    /// is the commitment delta multiplied by the seats still paying into
    /// it, with the last layer capped so layers never exceed the street
    /// total. Money folded players left behind rides along in the
    /// earliest layers.
    pub fn side_pots(&self) -> Vec<SidePot> {
        let mut contenders = self.contenders.clone();
        contenders.sort_by_key(|c| c.commit);
        let mut pots = Vec::new();
        let mut shared = 0;
        let mut prev = 0;
        for (at, contender) in contenders.iter().enumerate() {
            if shared == self.total {
                break;
            }
            let layers = self.contributing.saturating_sub(at) as Chips;
            let mut slice = (contender.commit - prev) * layers;
            if at + 1 == contenders.len() || slice > self.total - shared {
                slice = self.total - shared;
            }
            prev = contender.commit;
            if slice == 0 {
                continue;
            }
            let mut pot = SidePot::new(slice);
            // best remaining hand seeds the pot, the rest filter against it
            if let Some(best) = contenders[at..].iter().max_by_key(|c| c.rank) {
                pot.add_competing(&best.id, best.rank);
            }
            for later in contenders[at..].iter() {
                pot.add_competing(&later.id, later.rank);
            }
            shared += slice;
            pots.push(pot);
        }
        pots
    }
}

/// One slice of the money, shared by every contender whose hand matched
/// the best rank eligible for it.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SidePot {
    pub name: Option<String>,
    pub total: Chips,
    winners: Vec<String>,
    pub max_rank: Option<HandRank>,
}

impl SidePot {
    pub fn new(total: Chips) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Uncontested pot handed straight to a single winner.
    pub fn walkover(total: Chips, winner: &str) -> Self {
        let mut pot = Self::new(total);
        pot.winners.push(winner.to_string());
        pot
    }

    /// Offer a contender. They join the winner set only while their rank
    /// matches or beats every rank offered so far, so feeding the best
    /// hand first leaves exactly the top-ranked contenders inside.
    pub fn add_competing(&mut self, id: &str, rank: HandRank) {
        if self.max_rank.is_none_or(|max| rank >= max) {
            if !self.winners.iter().any(|w| w == id) {
                self.winners.push(id.to_string());
            }
            self.max_rank = Some(rank);
        }
    }

    pub fn winners(&self) -> &[String] {
        &self.winners
    }

    /// Exact integer split of the pot. Any remainder that does not divide
    /// evenly goes one unit at a time to the earliest winners, so the
    /// payouts always sum to the pot total.
    pub fn payouts(&self) -> Vec<(String, Chips)> {
        let count = self.winners.len() as Chips;
        if count == 0 {
            return Vec::new();
        }
        let share = self.total / count;
        let remainder = self.total % count;
        self.winners
            .iter()
            .enumerate()
            .map(|(at, id)| {
                let extra = if (at as Chips) < remainder { 1 } else { 0 };
                (id.clone(), share + extra)
            })
            .collect()
    }
}

/// Display roll-up of every side pot settled this round, grouped by
/// winner set: the first distinct set is the Main Pot, later ones become
/// Pot A, Pot B, and so on, with repeat sets folding their totals in.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Pots {
    pots: Vec<SidePot>,
    #[serde(skip)]
    lookup: BTreeMap<String, usize>,
}

impl Pots {
    pub fn absorb_all(&mut self, sides: &[SidePot]) {
        for side in sides {
            self.absorb(side);
        }
    }

    pub fn absorb(&mut self, side: &SidePot) {
        let mut key: Vec<&str> = side.winners.iter().map(String::as_str).collect();
        key.sort_unstable();
        let key = key.join(",");
        match self.lookup.get(&key) {
            Some(&at) => self.pots[at].total += side.total,
            None => {
                let name = match self.lookup.len() {
                    0 => "Main Pot".to_string(),
                    n => format!("Pot {}", (b'A' + (n as u8 - 1)) as char),
                };
                self.lookup.insert(key, self.pots.len());
                let mut named = side.clone();
                named.name = Some(name);
                self.pots.push(named);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SidePot> {
        self.pots.iter()
    }

    pub fn total(&self) -> Chips {
        self.pots.iter().map(|p| p.total).sum()
    }

    /// Every distinct winner across all pots, in pot order.
    pub fn winners(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for pot in &self.pots {
            for winner in pot.winners() {
                if !seen.contains(winner) {
                    seen.push(winner.clone());
                }
            }
        }
        seen
    }

    pub fn clear(&mut self) {
        self.pots.clear();
        self.lookup.clear();
    }
}
