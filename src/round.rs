use std::fmt;

use log::{debug, info, trace};
use rand::Rng;

use crate::bet::{Bet, BetTarget, Pocket};
use crate::error::RouletteError;
use crate::ledger::{self, Settlement};
use crate::wheel::Wheel;

type Result<T> = std::result::Result<T, RouletteError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// Taking bets.
    Open,
    /// Spin in progress, no more bets.
    Locked,
    /// The winning pocket is known.
    Resolved,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundState::Open => "open",
            RoundState::Locked => "locked",
            RoundState::Resolved => "resolved",
        };
        f.write_str(name)
    }
}

/// Position of the wheel after one `step_spin` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinTick {
    pub angle: f64,
    /// Steps run so far.
    pub rotation: u32,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy)]
struct SpinProgress {
    angle: f64,
    rotation: u32,
}

/// Where the round is, with the data that only exists in that state.
#[derive(Debug, Clone, Copy)]
enum Phase {
    Open,
    Locked(SpinProgress),
    Resolved {
        angle: f64,
        pocket: Pocket,
        settled: bool,
    },
}

impl Phase {
    fn state(&self) -> RoundState {
        match self {
            Phase::Open => RoundState::Open,
            Phase::Locked(_) => RoundState::Locked,
            Phase::Resolved { .. } => RoundState::Resolved,
        }
    }
}

fn invalid(action: &'static str, phase: &Phase) -> RouletteError {
    RouletteError::InvalidState {
        action,
        state: phase.state(),
    }
}

/// The bets of one round and the spin that decides them.
///
/// A round is `Open` until a spin starts, `Locked` while the wheel turns and
/// `Resolved` once the winning pocket is known. It can only be settled once,
/// and clearing it reopens it for the next set of bets.
#[derive(Debug, Clone)]
pub struct Round {
    wheel: Wheel,
    bets: Vec<Bet>,
    phase: Phase,
}

impl Default for Round {
    fn default() -> Self {
        Self::new(Wheel::european())
    }
}

impl Round {
    pub fn new(wheel: Wheel) -> Self {
        Self {
            wheel,
            bets: Vec::new(),
            phase: Phase::Open,
        }
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    pub fn state(&self) -> RoundState {
        self.phase.state()
    }

    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    pub fn total_staked(&self) -> u64 {
        self.bets.iter().map(Bet::amount).sum()
    }

    /// Current wheel angle, while a spin is running or after it stopped.
    pub fn angle(&self) -> Option<f64> {
        match self.phase {
            Phase::Open => None,
            Phase::Locked(progress) => Some(progress.angle),
            Phase::Resolved { angle, .. } => Some(angle),
        }
    }

    pub fn result(&self) -> Option<Pocket> {
        match self.phase {
            Phase::Resolved { pocket, .. } => Some(pocket),
            _ => None,
        }
    }

    pub fn remaining_steps(&self) -> u32 {
        let steps = self.wheel.profile().steps;
        match self.phase {
            Phase::Open => steps,
            Phase::Locked(progress) => steps.saturating_sub(progress.rotation),
            Phase::Resolved { .. } => 0,
        }
    }

    pub fn place_bet(&mut self, amount: u64, target: BetTarget) -> Result<Bet> {
        if !matches!(self.phase, Phase::Open) {
            return Err(invalid("place a bet", &self.phase));
        }
        let bet = Bet::new(amount, target)?;
        self.bets.push(bet);
        debug!("bet {amount} on {target} ({} bets open)", self.bets.len());
        Ok(bet)
    }

    /// Locks the round and returns the randomised starting angle.
    pub fn start_spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<f64> {
        if !matches!(self.phase, Phase::Open) {
            return Err(invalid("start a spin", &self.phase));
        }
        if self.bets.is_empty() {
            return Err(RouletteError::NoBets);
        }
        let angle = self.wheel.initial_angle(rng);
        self.phase = Phase::Locked(SpinProgress { angle, rotation: 0 });
        info!(
            "spin started at {angle:.2}° with {} bets totalling {}",
            self.bets.len(),
            self.total_staked()
        );
        Ok(angle)
    }

    /// Runs one step of the spin. Once every step has run the angle stays put.
    pub fn step_spin(&mut self) -> Result<SpinTick> {
        let wheel = self.wheel;
        let steps = wheel.profile().steps;
        let progress = match &mut self.phase {
            Phase::Locked(progress) => progress,
            phase => return Err(invalid("step the spin", phase)),
        };
        if progress.rotation < steps {
            progress.angle = wheel.advance(progress.angle, progress.rotation);
            progress.rotation += 1;
        }
        let tick = SpinTick {
            angle: progress.angle,
            rotation: progress.rotation,
            finished: progress.rotation >= steps,
        };
        trace!("tick {:?}", tick);
        Ok(tick)
    }

    /// Reads the winning pocket off the stopped wheel.
    pub fn finish_spin(&mut self) -> Result<Pocket> {
        let progress = match self.phase {
            Phase::Locked(progress) => progress,
            _ => return Err(invalid("finish the spin", &self.phase)),
        };
        let remaining = self.remaining_steps();
        if remaining > 0 {
            return Err(RouletteError::SpinInProgress { remaining });
        }
        let angle = progress.angle;
        let pocket = self.wheel.result_for_angle(angle);
        self.phase = Phase::Resolved {
            angle,
            pocket,
            settled: false,
        };
        info!("ball landed on {pocket} ({}) at {angle:.2}°", pocket.colour());
        Ok(pocket)
    }

    /// Start, run and finish a spin in one go.
    pub fn run_spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Pocket> {
        self.start_spin(rng)?;
        while !self.step_spin()?.finished {}
        self.finish_spin()
    }

    /// What `settle_round` would pay, without marking the round settled.
    pub fn settlement(&self) -> Result<Settlement> {
        match self.phase {
            Phase::Resolved { settled: true, .. } => Err(RouletteError::AlreadySettled),
            Phase::Resolved { pocket, .. } => Ok(ledger::settle(&self.bets, pocket)),
            _ => Err(invalid("settle", &self.phase)),
        }
    }

    pub fn settle_round(&mut self) -> Result<Settlement> {
        let settlement = self.settlement()?;
        if let Phase::Resolved { settled, .. } = &mut self.phase {
            *settled = true;
        }
        info!(
            "settled {} bets on {}: staked {}, paid {}",
            settlement.outcomes.len(),
            settlement.winning,
            settlement.total_staked,
            settlement.total_payout
        );
        Ok(settlement)
    }

    /// Reopens the round and hands back the discarded bets.
    ///
    /// An open round can be cleared at any time. A resolved one only after it
    /// has been settled. A locked round cannot be cleared.
    pub fn clear_round(&mut self) -> Result<Vec<Bet>> {
        match self.phase {
            Phase::Open | Phase::Resolved { settled: true, .. } => {}
            Phase::Resolved { .. } => {
                return Err(invalid("clear an unsettled round", &self.phase))
            }
            Phase::Locked(_) => return Err(invalid("clear the table", &self.phase)),
        }
        let bets = std::mem::take(&mut self.bets);
        self.phase = Phase::Open;
        debug!("round cleared, {} bets discarded", bets.len());
        Ok(bets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bet::OutsideBet;
    use crate::wheel::SpinProfile;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn red() -> BetTarget {
        BetTarget::Outside(OutsideBet::Red)
    }

    fn short_wheel() -> Wheel {
        Wheel::with_profile(SpinProfile {
            initial_speed: 5.0,
            deceleration: 1.0,
            steps: 5,
        })
    }

    #[test]
    fn new_round_is_open_and_empty() {
        let round = Round::default();
        assert_eq!(round.state(), RoundState::Open);
        assert!(round.bets().is_empty());
        assert_eq!(round.result(), None);
    }

    #[test]
    fn spin_needs_a_bet() {
        let mut round = Round::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(round.start_spin(&mut rng), Err(RouletteError::NoBets));
        assert_eq!(round.state(), RoundState::Open);
    }

    #[test]
    fn invalid_stake_never_enters_the_round() {
        let mut round = Round::default();
        assert!(round.place_bet(0, red()).is_err());
        assert!(round.bets().is_empty());
    }

    #[test]
    fn bets_are_refused_once_locked() {
        let mut round = Round::new(short_wheel());
        let mut rng = StdRng::seed_from_u64(3);
        round.place_bet(5, red()).unwrap();
        round.start_spin(&mut rng).unwrap();
        for target in BetTarget::all() {
            let err = round.place_bet(1, target).unwrap_err();
            assert!(matches!(err, RouletteError::InvalidState { state: RoundState::Locked, .. }));
        }
        assert_eq!(round.bets().len(), 1);
    }

    #[test]
    fn spin_runs_every_step_before_finishing() {
        let mut round = Round::new(short_wheel());
        let mut rng = StdRng::seed_from_u64(9);
        round.place_bet(5, red()).unwrap();
        let start = round.start_spin(&mut rng).unwrap();

        assert_eq!(
            round.finish_spin(),
            Err(RouletteError::SpinInProgress { remaining: 5 })
        );

        let mut ticks = Vec::new();
        loop {
            let tick = round.step_spin().unwrap();
            ticks.push(tick);
            if tick.finished {
                break;
            }
        }
        assert_eq!(ticks.len(), 5);
        // 5 + 4 + 3 + 2 + 1 degrees.
        let expected = crate::wheel::normalize_angle(start + 15.0);
        assert!((ticks[4].angle - expected).abs() < 1e-9);

        // Extra steps leave the wheel where it stopped.
        let after = round.step_spin().unwrap();
        assert_eq!(after.angle, ticks[4].angle);
        assert_eq!(after.rotation, 5);

        let pocket = round.finish_spin().unwrap();
        assert_eq!(pocket, round.wheel().result_for_angle(expected));
        assert_eq!(round.state(), RoundState::Resolved);
    }

    #[test]
    fn same_seed_same_result() {
        let play = |seed| {
            let mut round = Round::default();
            round.place_bet(1, red()).unwrap();
            round.run_spin(&mut StdRng::seed_from_u64(seed)).unwrap()
        };
        assert_eq!(play(42), play(42));
    }

    #[test]
    fn settles_exactly_once() {
        let mut round = Round::new(short_wheel());
        let mut rng = StdRng::seed_from_u64(11);
        round.place_bet(10, red()).unwrap();
        let pocket = round.run_spin(&mut rng).unwrap();

        let settlement = round.settle_round().unwrap();
        assert_eq!(settlement.winning, pocket);
        assert_eq!(settlement.total_payout, ledger::resolve(round.bets(), pocket));
        assert_eq!(round.settle_round(), Err(RouletteError::AlreadySettled));
        assert_eq!(round.settlement(), Err(RouletteError::AlreadySettled));
    }

    #[test]
    fn settlement_preview_leaves_the_round_payable() {
        let mut round = Round::new(short_wheel());
        let mut rng = StdRng::seed_from_u64(17);
        round.place_bet(10, red()).unwrap();
        assert!(round.settlement().is_err());

        let pocket = round.run_spin(&mut rng).unwrap();
        let preview = round.settlement().unwrap();
        assert_eq!(preview.winning, pocket);
        assert_eq!(round.settle_round().unwrap(), preview);
    }

    #[test]
    fn resolved_round_keeps_its_angle_and_pocket() {
        let mut round = Round::new(short_wheel());
        let mut rng = StdRng::seed_from_u64(4);
        round.place_bet(10, red()).unwrap();
        assert_eq!(round.remaining_steps(), 5);
        let pocket = round.run_spin(&mut rng).unwrap();

        let angle = round.angle().unwrap();
        assert_eq!(round.wheel().result_for_angle(angle), pocket);
        assert_eq!(round.result(), Some(pocket));
        assert_eq!(round.remaining_steps(), 0);

        round.settle_round().unwrap();
        round.clear_round().unwrap();
        assert_eq!(round.result(), None);
        assert_eq!(round.remaining_steps(), 5);
    }

    #[test]
    fn clear_requires_settlement() {
        let mut round = Round::new(short_wheel());
        let mut rng = StdRng::seed_from_u64(5);
        round.place_bet(10, red()).unwrap();
        round.start_spin(&mut rng).unwrap();
        assert!(round.clear_round().is_err());

        while !round.step_spin().unwrap().finished {}
        round.finish_spin().unwrap();
        assert!(round.clear_round().is_err());

        round.settle_round().unwrap();
        let cleared = round.clear_round().unwrap();
        assert_eq!(cleared.len(), 1);
        assert_eq!(round.state(), RoundState::Open);
        assert_eq!(round.angle(), None);
        assert!(round.place_bet(1, red()).is_ok());
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let mut round = Round::default();
        assert!(matches!(
            round.step_spin(),
            Err(RouletteError::InvalidState { state: RoundState::Open, .. })
        ));
        assert!(matches!(
            round.finish_spin(),
            Err(RouletteError::InvalidState { state: RoundState::Open, .. })
        ));
        assert!(matches!(
            round.settle_round(),
            Err(RouletteError::InvalidState { state: RoundState::Open, .. })
        ));
    }
}
