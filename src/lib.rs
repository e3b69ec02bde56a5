pub mod bet;
pub mod commands;
pub mod config;
pub mod error;
pub mod ledger;
pub mod round;
pub mod session;
pub mod wheel;

pub use crate::bet::{Bet, BetTarget, Colour, OutsideBet, Pocket, PocketSet, MAX_STAKE};
pub use crate::config::TableConfig;
pub use crate::error::{RouletteError, SessionError};
pub use crate::ledger::{payout_multiplier, resolve, settle, winning_numbers_for, Settlement};
pub use crate::round::{Round, RoundState, SpinTick};
pub use crate::session::{RoundReport, Session, MAX_BALANCE};
pub use crate::wheel::{SpinProfile, Wheel, POCKET_COUNT, SECTOR_WIDTH};
