use crate::bet::{Bet, BetTarget, OutsideBet, Pocket, PocketSet};

/// Payout units per unit staked across the whole non-zero layout.
/// A bet covering `n` numbers returns `FULL_PAYOUT / n` times its stake.
pub const FULL_PAYOUT: u64 = 36;

pub const COLUMN_1: PocketSet =
    PocketSet::from_numbers(&[1, 4, 7, 10, 13, 16, 19, 22, 25, 28, 31, 34]);
pub const COLUMN_2: PocketSet =
    PocketSet::from_numbers(&[2, 5, 8, 11, 14, 17, 20, 23, 26, 29, 32, 35]);
pub const COLUMN_3: PocketSet =
    PocketSet::from_numbers(&[3, 6, 9, 12, 15, 18, 21, 24, 27, 30, 33, 36]);

pub const DOZEN_1: PocketSet =
    PocketSet::from_numbers(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
pub const DOZEN_2: PocketSet =
    PocketSet::from_numbers(&[13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24]);
pub const DOZEN_3: PocketSet =
    PocketSet::from_numbers(&[25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36]);

pub const EVEN: PocketSet = PocketSet::from_numbers(&[
    2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 26, 28, 30, 32, 34, 36,
]);
pub const ODD: PocketSet = PocketSet::from_numbers(&[
    1, 3, 5, 7, 9, 11, 13, 15, 17, 19, 21, 23, 25, 27, 29, 31, 33, 35,
]);

pub const RED: PocketSet = PocketSet::from_numbers(&[
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
]);
pub const BLACK: PocketSet = PocketSet::from_numbers(&[
    2, 4, 6, 8, 10, 11, 13, 15, 17, 20, 22, 24, 26, 28, 29, 31, 33, 35,
]);

pub const LOW: PocketSet = PocketSet::from_numbers(&[
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18,
]);
pub const HIGH: PocketSet = PocketSet::from_numbers(&[
    19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36,
]);

pub fn winning_numbers_for(target: BetTarget) -> PocketSet {
    match target {
        BetTarget::Straight(pocket) => PocketSet::single(pocket),
        BetTarget::Outside(bet) => match bet {
            OutsideBet::Column1 => COLUMN_1,
            OutsideBet::Column2 => COLUMN_2,
            OutsideBet::Column3 => COLUMN_3,
            OutsideBet::Dozen1 => DOZEN_1,
            OutsideBet::Dozen2 => DOZEN_2,
            OutsideBet::Dozen3 => DOZEN_3,
            OutsideBet::Even => EVEN,
            OutsideBet::Red => RED,
            OutsideBet::Black => BLACK,
            OutsideBet::Odd => ODD,
            OutsideBet::Low => LOW,
            OutsideBet::High => HIGH,
        },
    }
}

/// 36 for a single number, 3 for a column or dozen, 2 for the even-money bets.
pub fn payout_multiplier(target: BetTarget) -> u64 {
    let covered = winning_numbers_for(target).len() as u64;
    debug_assert!(covered > 0 && FULL_PAYOUT % covered == 0);
    FULL_PAYOUT / covered
}

/// Total paid back for `bets` when the ball lands on `winning`.
pub fn resolve(bets: &[Bet], winning: Pocket) -> u64 {
    bets.iter().map(|bet| bet.payout_for(winning)).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetOutcome {
    pub bet: Bet,
    pub won: bool,
    pub payout: u64,
}

/// Per-bet breakdown of a resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub winning: Pocket,
    pub outcomes: Vec<BetOutcome>,
    pub total_staked: u64,
    pub total_payout: u64,
}

impl Settlement {
    /// Payout minus stakes. Negative when the round lost money.
    pub fn net(&self) -> i128 {
        i128::from(self.total_payout) - i128::from(self.total_staked)
    }

    pub fn winners(&self) -> impl Iterator<Item = &BetOutcome> {
        self.outcomes.iter().filter(|o| o.won)
    }
}

pub fn settle(bets: &[Bet], winning: Pocket) -> Settlement {
    let outcomes: Vec<BetOutcome> = bets
        .iter()
        .map(|bet| {
            let payout = bet.payout_for(winning);
            BetOutcome {
                bet: *bet,
                won: payout > 0,
                payout,
            }
        })
        .collect();
    Settlement {
        winning,
        total_staked: bets.iter().map(Bet::amount).sum(),
        total_payout: outcomes.iter().map(|o| o.payout).sum(),
        outcomes,
    }
}
