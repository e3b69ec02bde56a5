use std::collections::HashSet;

use log::{debug, info};
use rand::Rng;

use crate::bet::{Bet, BetTarget, Pocket};
use crate::error::{RouletteError, SessionError};
use crate::ledger::Settlement;
use crate::round::{Round, RoundState, SpinTick};
use crate::wheel::Wheel;

type Result<T> = std::result::Result<T, SessionError>;

/// Largest balance a table will open with.
pub const MAX_BALANCE: u64 = 1_000_000_000_000_000;

/// Outcome of a settled round from the player's side of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub settlement: Settlement,
    pub balance: u64,
    /// Balance change since the round opened, stakes included.
    pub round_winnings: i128,
}

/// One player at one table: the balance, the chip in hand and the bets on the
/// layout. The stake of a bet leaves the balance as soon as it is placed.
#[derive(Debug, Clone)]
pub struct Session {
    round: Round,
    balance: u64,
    opening_balance: u64,
    chips: Vec<u64>,
    selected: usize,
    occupied: HashSet<BetTarget>,
}

impl Session {
    pub fn new(wheel: Wheel, balance: u64, chips: Vec<u64>) -> Result<Self> {
        if chips.is_empty() {
            return Err(SessionError::NoChips);
        }
        Ok(Self {
            round: Round::new(wheel),
            balance,
            opening_balance: balance,
            chips,
            selected: 0,
            occupied: HashSet::new(),
        })
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn chips(&self) -> &[u64] {
        &self.chips
    }

    pub fn selected_chip(&self) -> u64 {
        self.chips[self.selected]
    }

    pub fn next_chip(&mut self) -> u64 {
        self.selected = (self.selected + 1) % self.chips.len();
        self.selected_chip()
    }

    pub fn prev_chip(&mut self) -> u64 {
        self.selected = (self.selected + self.chips.len() - 1) % self.chips.len();
        self.selected_chip()
    }

    pub fn select_chip(&mut self, value: u64) -> Result<u64> {
        let index = self
            .chips
            .iter()
            .position(|c| *c == value)
            .ok_or(SessionError::UnknownChip(value))?;
        self.selected = index;
        Ok(value)
    }

    pub fn is_occupied(&self, target: BetTarget) -> bool {
        self.occupied.contains(&target)
    }

    /// Whether the chip in hand could go on `target` right now.
    pub fn can_bet(&self, target: BetTarget) -> bool {
        !self.is_occupied(target)
            && self.selected_chip() <= self.balance
            && self.round.state() == RoundState::Open
    }

    /// Puts the selected chip on `target`.
    pub fn place_bet(&mut self, target: BetTarget) -> Result<Bet> {
        if self.is_occupied(target) {
            return Err(SessionError::ZoneOccupied(target));
        }
        let stake = self.selected_chip();
        if stake > self.balance {
            return Err(SessionError::InsufficientBalance {
                needed: stake,
                available: self.balance,
            });
        }
        let bet = self.round.place_bet(stake, target)?;
        self.balance -= stake;
        self.occupied.insert(target);
        Ok(bet)
    }

    pub fn start_spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<f64> {
        Ok(self.round.start_spin(rng)?)
    }

    pub fn step_spin(&mut self) -> Result<SpinTick> {
        Ok(self.round.step_spin()?)
    }

    pub fn finish_spin(&mut self) -> Result<Pocket> {
        Ok(self.round.finish_spin()?)
    }

    /// Pays out the resolved round, clears the layout and opens the next one.
    pub fn settle(&mut self) -> Result<RoundReport> {
        let payout = self.round.settlement()?.total_payout;
        let balance = self
            .balance
            .checked_add(payout)
            .ok_or(SessionError::BalanceOverflow {
                balance: self.balance,
                payout,
            })?;
        let settlement = self.round.settle_round()?;
        self.balance = balance;
        let round_winnings = i128::from(self.balance) - i128::from(self.opening_balance);
        self.round.clear_round()?;
        self.occupied.clear();
        self.opening_balance = self.balance;
        info!("balance {} after round ({round_winnings:+})", self.balance);
        Ok(RoundReport {
            settlement,
            balance: self.balance,
            round_winnings,
        })
    }

    /// Takes every chip back off an unspun layout and refunds the stakes.
    pub fn withdraw_bets(&mut self) -> Result<Vec<Bet>> {
        if self.round.state() != RoundState::Open {
            return Err(RouletteError::InvalidState {
                action: "withdraw bets",
                state: self.round.state(),
            }
            .into());
        }
        let bets = self.round.clear_round()?;
        let refund: u64 = bets.iter().map(Bet::amount).sum();
        self.balance += refund;
        self.occupied.clear();
        debug!("withdrew {} bets, refunded {refund}", bets.len());
        Ok(bets)
    }
}
