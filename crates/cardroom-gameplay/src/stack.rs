use std::collections::BTreeMap;

use serde::Serialize;

use cardroom_core::Chips;
use cardroom_core::Round;

use crate::error::GameError;
use crate::phase::Phase;

/// Lifetime counters for one player. Wins and losses are hands, not
/// money; `balance` is the running profit against the initial wallet.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub wins: u32,
    pub losses: u32,
    pub vpip: u32,
    pub rebuys: u32,
    pub rank: Option<u32>,
    pub balance: Chips,
    #[serde(skip)]
    vpip_round: Option<Round>,
}

impl Stats {
    /// Count a voluntary chip commitment, at most once per round.
    pub fn mark_vpip(&mut self, round: Round) {
        if self.vpip_round != Some(round) {
            self.vpip_round = Some(round);
            self.vpip += 1;
        }
    }
    /// Carry counters over when a departed player re-joins the table.
    pub fn adopt(&mut self, earlier: &Stats) {
        self.wins += earlier.wins;
        self.losses += earlier.losses;
        self.vpip += earlier.vpip;
        self.rebuys += earlier.rebuys;
    }
}

/// One player's money, split across four locations that must always sum
/// to the same conserved amount: wallet (off the table), stack (behind),
/// chips on the table this street, and whatever the pot has collected.
///
/// All amounts are integer minor units. Every movement is an exact
/// add-subtract pair; there is no rounding anywhere in the ledger.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Stack {
    wallet: Chips,
    stack: Chips,
    on_table: Chips,
    committed: BTreeMap<Phase, Chips>,
    initial_wallet: Chips,
    stats: Stats,
}

impl Stack {
    /// Cash-game entry: the deposit lands in the wallet and the buy-in
    /// moves straight onto the stack.
    pub fn cash(deposit: Chips, buy_in: Chips) -> Result<Self, GameError> {
        if deposit < buy_in {
            return Err(GameError::NoFunds);
        }
        Ok(Self {
            wallet: deposit - buy_in,
            stack: buy_in,
            initial_wallet: deposit,
            ..Self::default()
        })
    }

    /// Tournament entry: the buy-in goes to the prize fund elsewhere, so
    /// the wallet starts empty and the stack at the opening amount.
    pub fn tournament(opening_stack: Chips) -> Self {
        Self {
            stack: opening_stack,
            ..Self::default()
        }
    }

    pub fn wallet(&self) -> Chips {
        self.wallet
    }
    pub fn stack(&self) -> Chips {
        self.stack
    }
    pub fn on_table(&self) -> Chips {
        self.on_table
    }
    /// Chips still under the player's control.
    pub fn total(&self) -> Chips {
        self.stack + self.on_table
    }
    pub fn stats(&self) -> &Stats {
        &self.stats
    }
    pub fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    /// Commitment recorded against `phase`, `None` if the player never
    /// acted on that street.
    pub fn committed(&self, phase: Phase) -> Option<Chips> {
        self.committed.get(&phase).copied()
    }

    /// Everything committed across the whole round.
    pub fn committed_total(&self) -> Chips {
        self.committed.values().sum()
    }

    /// Move `value` from the stack to the table, capped at the stack for
    /// a partial all-in. Returns false only when the stack is empty, so
    /// an explicit zero-value check still registers a commitment entry.
    pub fn add_to_table(&mut self, phase: Phase, value: Chips) -> bool {
        if self.stack == 0 {
            return false;
        }
        let moved = value.min(self.stack);
        self.stack -= moved;
        self.on_table += moved;
        *self.committed.entry(phase).or_insert(0) += moved;
        true
    }

    /// Undo part of a table commitment, crediting the stack back.
    pub fn reverse_bet(&mut self, refund: Chips, phase: Phase) {
        self.stack += refund;
        if self.on_table >= refund {
            self.on_table -= refund;
            self.committed.insert(phase, self.on_table);
        }
    }

    /// Sweep the table chips into the pot, returning the amount taken.
    pub fn collect(&mut self) -> Chips {
        let taken = self.on_table;
        self.on_table = 0;
        self.settle_balance();
        taken
    }

    /// Credit winnings onto the stack.
    pub fn transfer_win(&mut self, amount: Chips) {
        if amount > 0 {
            self.stack += amount;
            self.settle_balance();
        }
    }

    /// Replace the stack outright. Used when tournament play chips are
    /// exchanged for a prize-fund share at the final table.
    pub fn award(&mut self, amount: Chips) {
        self.stack = amount;
        self.settle_balance();
    }

    /// Move a fresh buy-in from the wallet onto the stack. Refused while
    /// the current stack sits above `ceiling` or the wallet is short.
    pub fn rebuy(&mut self, buy_in: Chips, ceiling: Chips) -> Result<(), GameError> {
        if self.total() > ceiling {
            return Err(GameError::NonZeroStack);
        }
        if self.wallet < buy_in {
            return Err(GameError::NoFunds);
        }
        if buy_in > 0 {
            self.stats.rebuys += 1;
        }
        self.wallet -= buy_in;
        self.stack += buy_in;
        self.settle_balance();
        Ok(())
    }

    /// Return the stack to the wallet. Refused mid-street, while chips
    /// sit on the table.
    pub fn cash_out(&mut self) -> Result<Chips, GameError> {
        if self.on_table > 0 {
            return Err(GameError::ChipsOnTable);
        }
        self.wallet += self.stack;
        self.stack = 0;
        self.settle_balance();
        Ok(self.wallet)
    }

    /// Drop street commitments at the top of a new round.
    pub fn clear_round(&mut self) {
        self.committed.clear();
    }

    fn settle_balance(&mut self) {
        self.stats.balance = self.wallet + self.stack - self.initial_wallet;
    }
}
