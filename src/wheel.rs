use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bet::Pocket;

pub const POCKET_COUNT: usize = 37;

/// Arc covered by one pocket, in degrees.
pub const SECTOR_WIDTH: f64 = 360.0 / POCKET_COUNT as f64;

/// Start of sector 0. Pocket 0 sits centred on 0°, so the last half sector
/// before 360° wraps back onto it.
pub const SECTOR_OFFSET: f64 = -SECTOR_WIDTH / 2.0;

/// Single-zero rim order, clockwise from 0.
pub const EUROPEAN_LAYOUT: [u8; POCKET_COUNT] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33, 1, 20,
    14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

/// Folds any angle into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let folded = angle.rem_euclid(360.0);
    // rem_euclid can round a tiny negative up to exactly 360.
    if folded >= 360.0 {
        0.0
    } else {
        folded
    }
}

/// Deceleration curve of a spin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinProfile {
    /// Degrees moved on the first step.
    pub initial_speed: f64,
    /// Degrees the step shrinks by after each rotation.
    pub deceleration: f64,
    /// Steps in one spin.
    pub steps: u32,
}

impl Default for SpinProfile {
    fn default() -> Self {
        Self {
            initial_speed: 10.0,
            deceleration: 0.02,
            steps: 500,
        }
    }
}

impl SpinProfile {
    /// Degrees added on step `rotation_index`. Never negative, zero once the
    /// spin is over.
    pub fn increment(&self, rotation_index: u32) -> f64 {
        if rotation_index >= self.steps {
            return 0.0;
        }
        (self.initial_speed - self.deceleration * f64::from(rotation_index)).max(0.0)
    }

    pub fn is_valid(&self) -> bool {
        self.initial_speed.is_finite()
            && self.deceleration.is_finite()
            && self.initial_speed >= 0.0
            && self.deceleration >= 0.0
            && self.steps > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wheel {
    layout: &'static [u8; POCKET_COUNT],
    profile: SpinProfile,
}

impl Default for Wheel {
    fn default() -> Self {
        Self::european()
    }
}

impl Wheel {
    pub fn european() -> Self {
        Self::with_profile(SpinProfile::default())
    }

    pub fn with_profile(profile: SpinProfile) -> Self {
        Self {
            layout: &EUROPEAN_LAYOUT,
            profile,
        }
    }

    pub fn layout(&self) -> &[u8; POCKET_COUNT] {
        self.layout
    }

    pub fn profile(&self) -> &SpinProfile {
        &self.profile
    }

    /// Index into the layout of the sector under `angle`.
    pub fn sector_index(&self, angle: f64) -> usize {
        let shifted = normalize_angle(normalize_angle(angle) - SECTOR_OFFSET);
        // NaN casts to 0; the clamp catches a quotient rounded up to 37.
        ((shifted / SECTOR_WIDTH) as usize).min(POCKET_COUNT - 1)
    }

    /// First angle covered by sector `index`, in `[0, 360)`.
    pub fn sector_start(&self, index: usize) -> f64 {
        normalize_angle(SECTOR_OFFSET + (index % POCKET_COUNT) as f64 * SECTOR_WIDTH)
    }

    pub fn pocket_at(&self, index: usize) -> Pocket {
        Pocket::from_table(self.layout[index % POCKET_COUNT])
    }

    pub fn result_for_angle(&self, angle: f64) -> Pocket {
        self.pocket_at(self.sector_index(angle))
    }

    pub fn advance(&self, angle: f64, rotation_index: u32) -> f64 {
        let next = normalize_angle(angle + self.profile.increment(rotation_index));
        trace!("step {rotation_index}: {angle:.3} -> {next:.3}");
        next
    }

    pub fn initial_angle<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        normalize_angle(360.0 * rng.gen::<f64>())
    }

    /// Total degrees turned over a full spin.
    pub fn spin_distance(&self) -> f64 {
        (0..self.profile.steps)
            .map(|i| self.profile.increment(i))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn layout_holds_every_pocket_once() {
        let mut seen = [false; POCKET_COUNT];
        for n in EUROPEAN_LAYOUT {
            assert!(!seen[n as usize], "{n} repeated");
            seen[n as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn every_angle_maps_to_a_pocket() {
        let wheel = Wheel::european();
        let mut hits = [0usize; POCKET_COUNT];
        // 0.01° grid over the full circle.
        for step in 0..36_000 {
            let angle = f64::from(step) / 100.0;
            let index = wheel.sector_index(angle);
            assert!(index < POCKET_COUNT);
            assert_eq!(wheel.result_for_angle(angle), wheel.pocket_at(index));
            hits[index] += 1;
        }
        assert!(hits.iter().all(|h| *h > 0), "unreached sector: {hits:?}");
    }

    #[test]
    fn sectors_start_where_expected() {
        let wheel = Wheel::european();
        for index in 0..POCKET_COUNT {
            let start = wheel.sector_start(index);
            let middle = normalize_angle(start + SECTOR_WIDTH / 2.0);
            assert_eq!(wheel.sector_index(middle), index);
            assert_eq!(wheel.sector_index(start + 1e-9), index);
            assert_eq!(
                wheel.result_for_angle(middle).number(),
                EUROPEAN_LAYOUT[index]
            );
        }
    }

    #[test]
    fn zero_straddles_the_origin() {
        let wheel = Wheel::european();
        assert_eq!(wheel.result_for_angle(0.0), Pocket::ZERO);
        assert_eq!(wheel.result_for_angle(SECTOR_WIDTH / 2.0 - 1e-9), Pocket::ZERO);
        assert_eq!(
            wheel.result_for_angle(360.0 - SECTOR_WIDTH / 2.0 + 1e-9),
            Pocket::ZERO
        );
        assert_eq!(wheel.result_for_angle(359.999_999), Pocket::ZERO);
        assert_eq!(wheel.result_for_angle(SECTOR_WIDTH / 2.0 + 1e-9).number(), 32);
        assert_eq!(
            wheel.result_for_angle(360.0 - SECTOR_WIDTH / 2.0 - 1e-9).number(),
            26
        );
    }

    #[test]
    fn full_turns_do_not_change_the_result() {
        let wheel = Wheel::european();
        for step in 0..1440 {
            let angle = f64::from(step) * 0.25;
            let expected = wheel.result_for_angle(angle);
            for k in [-3.0, -1.0, 1.0, 2.0, 10.0] {
                assert_eq!(wheel.result_for_angle(angle + 360.0 * k), expected, "{angle} {k}");
            }
        }
    }

    #[test]
    fn odd_inputs_never_panic() {
        let wheel = Wheel::european();
        for angle in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -1e-300, 1e300] {
            let pocket = wheel.result_for_angle(angle);
            assert!(pocket.number() <= 36);
        }
        assert_eq!(normalize_angle(-1e-20), 0.0);
    }

    #[test]
    fn spin_decelerates_to_a_stop() {
        let profile = SpinProfile::default();
        let mut last = f64::INFINITY;
        for i in 0..=profile.steps + 5 {
            let inc = profile.increment(i);
            assert!(inc >= 0.0);
            assert!(inc <= last, "step {i} sped up");
            last = inc;
        }
        assert_eq!(profile.increment(0), 10.0);
        assert_eq!(profile.increment(profile.steps), 0.0);
    }

    #[test]
    fn advance_is_deterministic() {
        let wheel = Wheel::european();
        assert_eq!(wheel.advance(123.5, 17), wheel.advance(123.5, 17));
        assert_eq!(wheel.advance(355.0, 0), 5.0);
        assert_eq!(wheel.advance(42.0, 500), 42.0);
    }

    #[test]
    fn seeded_rng_repeats_the_initial_angle() {
        let wheel = Wheel::european();
        let a = wheel.initial_angle(&mut StdRng::seed_from_u64(7));
        let b = wheel.initial_angle(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!((0.0..360.0).contains(&a));
    }

    #[test]
    fn default_spin_turns_about_seven_times() {
        // 500 steps from 10° down to 0.02°.
        let distance = Wheel::european().spin_distance();
        assert!((distance - 2505.0).abs() < 1e-6, "{distance}");
    }

    #[test]
    fn profile_validation() {
        assert!(SpinProfile::default().is_valid());
        let stalled = SpinProfile {
            steps: 0,
            ..SpinProfile::default()
        };
        assert!(!stalled.is_valid());
        let backwards = SpinProfile {
            initial_speed: -1.0,
            ..SpinProfile::default()
        };
        assert!(!backwards.is_valid());
    }
}
