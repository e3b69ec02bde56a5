use thiserror::Error;

use crate::bet::{BetTarget, MAX_STAKE};
use crate::round::RoundState;

/// Errors raised by the wheel, the ledger and the round state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouletteError {
    #[error("`{0}` is not a bet target")]
    InvalidTarget(String),

    #[error("stake must be between 1 and {}, got {0}", MAX_STAKE)]
    InvalidStake(u64),

    #[error("cannot {action} while the round is {state}")]
    InvalidState {
        action: &'static str,
        state: RoundState,
    },

    #[error("no bets have been placed")]
    NoBets,

    #[error("the spin still has {remaining} steps to run")]
    SpinInProgress { remaining: u32 },

    #[error("the round has already been settled")]
    AlreadySettled,
}

/// Table-side policy errors, plus anything the round itself rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u64, available: u64 },

    #[error("{0} already holds a chip this round")]
    ZoneOccupied(BetTarget),

    #[error("there is no {0} chip")]
    UnknownChip(u64),

    #[error("a table needs at least one chip denomination")]
    NoChips,

    #[error("paying {payout} onto a balance of {balance} would overflow")]
    BalanceOverflow { balance: u64, payout: u64 },

    #[error(transparent)]
    Round(#[from] RouletteError),
}
