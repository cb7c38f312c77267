//! Runtime configuration types for the simulation core.
//!
//! These are separate from the TOML-deserialized config in `aquarium_config`;
//! see `conversions` for the mapping.

use serde::{Deserialize, Serialize};

/// Which temperature a reading belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Water,
    Air,
}

/// Base temperature and uniform noise half-width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub base: f64,
    pub spread: f64,
}

impl Band {
    pub const fn new(base: f64, spread: f64) -> Self {
        Self { base, spread }
    }
}

/// Day/night parameters of the smoothed random walk.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationProfile {
    /// First day hour (inclusive).
    pub day_start_hour: u32,
    /// First night hour (inclusive); day is `[day_start_hour, night_start_hour)`.
    pub night_start_hour: u32,
    pub water_day: Band,
    pub water_night: Band,
    pub air_day: Band,
    pub air_night: Band,
    /// Weight of the fresh base value in the EMA. Range: (0.0, 1.0].
    pub smoothing: f64,
    /// Probability per tick that the leak sensor reports a leak.
    pub leak_probability: f64,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            day_start_hour: 6,
            night_start_hour: 18,
            water_day: Band::new(24.5, 0.5),
            water_night: Band::new(23.0, 0.3),
            air_day: Band::new(22.0, 0.5),
            air_night: Band::new(21.0, 0.3),
            smoothing: 0.1,
            leak_probability: 0.01,
        }
    }
}

impl SimulationProfile {
    pub fn band(&self, channel: Channel, is_day: bool) -> Band {
        match (channel, is_day) {
            (Channel::Water, true) => self.water_day,
            (Channel::Water, false) => self.water_night,
            (Channel::Air, true) => self.air_day,
            (Channel::Air, false) => self.air_night,
        }
    }

    pub fn is_day_hour(&self, hour: u32) -> bool {
        (self.day_start_hour..self.night_start_hour).contains(&hour)
    }
}

/// Scheduler pacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCfg {
    /// Interval between simulation ticks.
    pub tick: std::time::Duration,
    /// Sample history when the wall-clock minute is a multiple of this.
    pub sample_every_minutes: u32,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            tick: std::time::Duration::from_secs(60),
            sample_every_minutes: 10,
        }
    }
}

/// Initial contents of the state store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCfg {
    pub initial_water: f64,
    pub initial_air: f64,
    pub history_capacity: usize,
    pub extras: Extras,
}

impl Default for StoreCfg {
    fn default() -> Self {
        Self {
            initial_water: 24.5,
            initial_air: 22.0,
            history_capacity: crate::history::DEFAULT_CAPACITY,
            extras: Extras::default(),
        }
    }
}

/// Static tank details carried through status snapshots unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extras {
    pub feeding_time: String,
    pub ph_level: f64,
    pub filter_on: bool,
    pub water_level: String,
}

impl Default for Extras {
    fn default() -> Self {
        Self {
            feeding_time: "12:00".to_string(),
            ph_level: 7.0,
            filter_on: true,
            water_level: "normal".to_string(),
        }
    }
}

/// Accepted manual override ranges (inclusive, °C).
pub mod limits {
    use std::ops::RangeInclusive;

    pub const WATER_TEMP: RangeInclusive<f64> = 15.0..=35.0;
    pub const AIR_TEMP: RangeInclusive<f64> = 10.0..=35.0;
}
