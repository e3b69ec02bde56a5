use std::fmt;
use std::str::FromStr;

use crate::error::RouletteError;
use crate::ledger;

pub const MAX_POCKET: u8 = 36;

/// Largest stake a single bet may carry.
pub const MAX_STAKE: u64 = 1_000_000_000;

/// Id of the first outside bet. Ids below it are straight-up numbers.
pub const FIRST_OUTSIDE_ID: u8 = MAX_POCKET + 1;

/// A numbered pocket on a single-zero wheel, always in `0..=36`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pocket(u8);

impl Pocket {
    pub const ZERO: Pocket = Pocket(0);

    pub fn new(number: u8) -> Result<Self, RouletteError> {
        if number <= MAX_POCKET {
            Ok(Pocket(number))
        } else {
            Err(RouletteError::InvalidTarget(number.to_string()))
        }
    }

    // Only for tables whose entries are known to be in range.
    pub(crate) const fn from_table(number: u8) -> Self {
        Pocket(number)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn colour(self) -> Colour {
        if self.0 == 0 {
            Colour::Green
        } else if ledger::RED.contains(self) {
            Colour::Red
        } else {
            Colour::Black
        }
    }

    pub fn all() -> impl Iterator<Item = Pocket> {
        (0..=MAX_POCKET).map(Pocket)
    }
}

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
    Green,
    Red,
    Black,
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Colour::Green => "green",
            Colour::Red => "red",
            Colour::Black => "black",
        };
        f.write_str(name)
    }
}

/// A set of pockets, one bit per number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PocketSet(u64);

impl PocketSet {
    pub const EMPTY: PocketSet = PocketSet(0);

    pub const fn from_numbers(numbers: &[u8]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < numbers.len() {
            assert!(numbers[i] <= MAX_POCKET);
            bits |= 1u64 << numbers[i];
            i += 1;
        }
        PocketSet(bits)
    }

    pub fn single(pocket: Pocket) -> Self {
        PocketSet(1u64 << pocket.0)
    }

    pub fn contains(self, pocket: Pocket) -> bool {
        self.0 & (1u64 << pocket.0) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: PocketSet) -> PocketSet {
        PocketSet(self.0 | other.0)
    }

    pub fn intersection(self, other: PocketSet) -> PocketSet {
        PocketSet(self.0 & other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Pocket> {
        Pocket::all().filter(move |p| self.contains(*p))
    }
}

impl FromIterator<Pocket> for PocketSet {
    fn from_iter<I: IntoIterator<Item = Pocket>>(iter: I) -> Self {
        iter.into_iter()
            .fold(PocketSet::EMPTY, |set, p| set.union(PocketSet::single(p)))
    }
}

/// The outside bets of the layout, in bet-zone id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OutsideBet {
    Column1,
    Column2,
    Column3,
    Dozen1,
    Dozen2,
    Dozen3,
    Even,
    Red,
    Black,
    Odd,
    Low,
    High,
}

impl OutsideBet {
    pub const ALL: [OutsideBet; 12] = [
        OutsideBet::Column1,
        OutsideBet::Column2,
        OutsideBet::Column3,
        OutsideBet::Dozen1,
        OutsideBet::Dozen2,
        OutsideBet::Dozen3,
        OutsideBet::Even,
        OutsideBet::Red,
        OutsideBet::Black,
        OutsideBet::Odd,
        OutsideBet::Low,
        OutsideBet::High,
    ];

    pub fn id(self) -> u8 {
        FIRST_OUTSIDE_ID + self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            OutsideBet::Column1 => "column 1",
            OutsideBet::Column2 => "column 2",
            OutsideBet::Column3 => "column 3",
            OutsideBet::Dozen1 => "1st 12",
            OutsideBet::Dozen2 => "2nd 12",
            OutsideBet::Dozen3 => "3rd 12",
            OutsideBet::Even => "even",
            OutsideBet::Red => "red",
            OutsideBet::Black => "black",
            OutsideBet::Odd => "odd",
            OutsideBet::Low => "1-18",
            OutsideBet::High => "19-36",
        }
    }
}

impl fmt::Display for OutsideBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a bet is placed on: a single number or one outside bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BetTarget {
    Straight(Pocket),
    Outside(OutsideBet),
}

impl BetTarget {
    /// Bet-zone id: `0..=36` for numbers, `37..=48` for outside bets.
    pub fn id(self) -> u8 {
        match self {
            BetTarget::Straight(pocket) => pocket.number(),
            BetTarget::Outside(bet) => bet.id(),
        }
    }

    pub fn winning_numbers(self) -> PocketSet {
        ledger::winning_numbers_for(self)
    }

    pub fn payout_multiplier(self) -> u64 {
        ledger::payout_multiplier(self)
    }

    /// Every bet zone on the layout, ordered by id.
    pub fn all() -> impl Iterator<Item = BetTarget> {
        Pocket::all()
            .map(BetTarget::Straight)
            .chain(OutsideBet::ALL.into_iter().map(BetTarget::Outside))
    }
}

impl From<Pocket> for BetTarget {
    fn from(pocket: Pocket) -> Self {
        BetTarget::Straight(pocket)
    }
}

impl From<OutsideBet> for BetTarget {
    fn from(bet: OutsideBet) -> Self {
        BetTarget::Outside(bet)
    }
}

impl TryFrom<u8> for BetTarget {
    type Error = RouletteError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        if id <= MAX_POCKET {
            return Ok(BetTarget::Straight(Pocket(id)));
        }
        OutsideBet::ALL
            .get(usize::from(id - FIRST_OUTSIDE_ID))
            .map(|bet| BetTarget::Outside(*bet))
            .ok_or_else(|| RouletteError::InvalidTarget(format!("#{id}")))
    }
}

impl FromStr for BetTarget {
    type Err = RouletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            // "00" is the American double zero, not pocket 0.
            let canonical = key.len() == 1 || !key.starts_with('0');
            return key
                .parse::<u8>()
                .ok()
                .filter(|_| canonical)
                .and_then(|n| Pocket::new(n).ok())
                .map(BetTarget::Straight)
                .ok_or_else(|| RouletteError::InvalidTarget(s.trim().to_string()));
        }

        let bet = match key.as_str() {
            "col1" | "column1" | "c1" => OutsideBet::Column1,
            "col2" | "column2" | "c2" => OutsideBet::Column2,
            "col3" | "column3" | "c3" => OutsideBet::Column3,
            "dozen1" | "d1" | "1st12" | "1-12" => OutsideBet::Dozen1,
            "dozen2" | "d2" | "2nd12" | "13-24" => OutsideBet::Dozen2,
            "dozen3" | "d3" | "3rd12" | "25-36" => OutsideBet::Dozen3,
            "even" => OutsideBet::Even,
            "red" => OutsideBet::Red,
            "black" => OutsideBet::Black,
            "odd" => OutsideBet::Odd,
            "low" | "1-18" | "1to18" => OutsideBet::Low,
            "high" | "19-36" | "19to36" => OutsideBet::High,
            _ => return Err(RouletteError::InvalidTarget(s.trim().to_string())),
        };
        Ok(BetTarget::Outside(bet))
    }
}

impl fmt::Display for BetTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetTarget::Straight(pocket) => write!(f, "number {pocket}"),
            BetTarget::Outside(bet) => write!(f, "{bet}"),
        }
    }
}

/// One confirmed wager. Immutable once placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bet {
    amount: u64,
    target: BetTarget,
}

impl Bet {
    pub fn new(amount: u64, target: BetTarget) -> Result<Self, RouletteError> {
        if amount == 0 || amount > MAX_STAKE {
            return Err(RouletteError::InvalidStake(amount));
        }
        Ok(Self { amount, target })
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn target(&self) -> BetTarget {
        self.target
    }

    pub fn wins_on(&self, pocket: Pocket) -> bool {
        self.target.winning_numbers().contains(pocket)
    }

    /// Amount returned to the player, stake included. Zero on a loss.
    pub fn payout_for(&self, pocket: Pocket) -> u64 {
        if self.wins_on(pocket) {
            self.amount * self.target.payout_multiplier()
        } else {
            0
        }
    }
}
