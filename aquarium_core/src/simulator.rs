//! Smoothed random-walk temperature simulator.
//!
//! Each tick draws a noisy base value for the current part of the day and
//! moves the previous reading a fixed fraction of the way towards it:
//!
//! ```text
//! base = band.base + U(-band.spread, band.spread)
//! next = round1(previous * (1 - smoothing) + base * smoothing)
//! ```
//!
//! The random source is a [`NoiseSource`] so tests can pin every draw.

use crate::config::{Channel, SimulationProfile};
use crate::state::{Reading, SimulatedReadings};
use crate::util::{blend, round1};
use aquarium_traits::NoiseSource;
use chrono::{NaiveDateTime, Timelike};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// [`NoiseSource`] backed by any `rand` RNG.
#[derive(Debug, Clone)]
pub struct RandNoise<R>(pub R);

impl RandNoise<ChaCha8Rng> {
    /// Reproducible stream for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> NoiseSource for RandNoise<R> {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if !(low < high) {
            return low;
        }
        self.0.gen_range(low..high)
    }

    fn chance(&mut self, p: f64) -> bool {
        if !(p > 0.0) {
            return false;
        }
        self.0.gen_bool(p.min(1.0))
    }
}

pub struct Simulator<N: NoiseSource> {
    profile: SimulationProfile,
    noise: N,
}

impl Simulator<RandNoise<ChaCha8Rng>> {
    /// Production simulator: configured profile, seeded RNG when `seed` is set.
    pub fn from_config(cfg: &aquarium_config::SimulationCfg) -> Self {
        let noise = match cfg.seed {
            Some(seed) => RandNoise::seeded(seed),
            None => RandNoise::from_entropy(),
        };
        Self::new(cfg.into(), noise)
    }
}

impl<N: NoiseSource> Simulator<N> {
    pub fn new(profile: SimulationProfile, noise: N) -> Self {
        Self { profile, noise }
    }

    pub fn profile(&self) -> &SimulationProfile {
        &self.profile
    }

    pub fn is_day(&self, now: NaiveDateTime) -> bool {
        self.profile.is_day_hour(now.hour())
    }

    /// Draw the noisy target for one channel.
    pub fn draw_base(&mut self, channel: Channel, is_day: bool) -> f64 {
        let band = self.profile.band(channel, is_day);
        band.base + self.noise.uniform(-band.spread, band.spread)
    }

    /// Next reading for `channel`, given the previous raw value.
    pub fn next_reading(&mut self, now: NaiveDateTime, previous: f64, channel: Channel) -> f64 {
        let is_day = self.is_day(now);
        let base = self.draw_base(channel, is_day);
        round1(blend(previous, base, self.profile.smoothing))
    }

    /// One full tick: water, air and the leak sensor. Water is drawn before air.
    pub fn step(
        &mut self,
        now: NaiveDateTime,
        prev_water: f64,
        prev_air: f64,
    ) -> SimulatedReadings {
        let water = self.next_reading(now, prev_water, Channel::Water);
        let air = self.next_reading(now, prev_air, Channel::Air);
        let leak = self.noise.chance(self.profile.leak_probability);
        tracing::trace!(water, air, leak, "simulated tick");
        SimulatedReadings {
            water: Reading {
                value: water,
                timestamp: now,
            },
            air: Reading {
                value: air,
                timestamp: now,
            },
            leak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::ConstantNoise;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[rstest]
    #[case(5, false)]
    #[case(6, true)]
    #[case(17, true)]
    #[case(18, false)]
    #[case(0, false)]
    fn day_window_is_half_open(#[case] hour: u32, #[case] day: bool) {
        let sim = Simulator::new(SimulationProfile::default(), ConstantNoise::zero());
        assert_eq!(sim.is_day(at(hour)), day);
    }

    #[test]
    fn day_tick_moves_ten_percent_towards_base() {
        // base = 24.5 + 0.3 = 24.8; 24.5*0.9 + 24.8*0.1 = 24.53 -> 24.5
        let mut sim = Simulator::new(SimulationProfile::default(), ConstantNoise::new(0.3));
        assert_eq!(sim.next_reading(at(14), 24.5, Channel::Water), 24.5);
    }

    #[test]
    fn night_uses_night_band() {
        let mut sim = Simulator::new(SimulationProfile::default(), ConstantNoise::zero());
        // 24.0*0.9 + 23.0*0.1 = 23.9
        assert_eq!(sim.next_reading(at(2), 24.0, Channel::Water), 23.9);
        // 22.0*0.9 + 21.0*0.1 = 21.9
        assert_eq!(sim.next_reading(at(2), 22.0, Channel::Air), 21.9);
    }

    #[test]
    fn noise_is_bounded_by_spread() {
        let mut sim = Simulator::new(SimulationProfile::default(), RandNoise::seeded(7));
        for _ in 0..1000 {
            let day = sim.draw_base(Channel::Water, true);
            assert!((24.0..=25.0).contains(&day));
            let night = sim.draw_base(Channel::Air, false);
            assert!((20.7..=21.3).contains(&night));
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = |seed| {
            let mut sim = Simulator::new(SimulationProfile::default(), RandNoise::seeded(seed));
            let mut w = 24.5;
            let mut a = 22.0;
            let mut out = Vec::new();
            for h in 0..24 {
                let r = sim.step(at(h), w, a);
                w = r.water.value;
                a = r.air.value;
                out.push((w, a, r.leak));
            }
            out
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn leak_probability_extremes() {
        let mut never = RandNoise::seeded(1);
        let mut always = RandNoise::seeded(1);
        for _ in 0..100 {
            assert!(!never.chance(0.0));
            assert!(always.chance(1.0));
        }
    }

    #[test]
    fn empty_uniform_range_returns_low() {
        let mut n = RandNoise::seeded(3);
        assert_eq!(n.uniform(0.0, 0.0), 0.0);
    }
}
