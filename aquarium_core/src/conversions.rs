//! `From` implementations bridging `aquarium_config` types to `aquarium_core` types.

use crate::config::{Band, Extras, ScheduleCfg, SimulationProfile, StoreCfg};
use std::time::Duration;

// ── Band ─────────────────────────────────────────────────────────────────────

impl From<aquarium_config::BandCfg> for Band {
    fn from(c: aquarium_config::BandCfg) -> Self {
        Self {
            base: c.base,
            spread: c.spread,
        }
    }
}

// ── SimulationProfile ────────────────────────────────────────────────────────

impl From<&aquarium_config::SimulationCfg> for SimulationProfile {
    fn from(c: &aquarium_config::SimulationCfg) -> Self {
        Self {
            day_start_hour: c.day_start_hour,
            night_start_hour: c.night_start_hour,
            water_day: c.water_day.into(),
            water_night: c.water_night.into(),
            air_day: c.air_day.into(),
            air_night: c.air_night.into(),
            smoothing: c.smoothing,
            leak_probability: c.leak_probability,
        }
    }
}

// ── ScheduleCfg ──────────────────────────────────────────────────────────────

impl From<&aquarium_config::SimulationCfg> for ScheduleCfg {
    fn from(c: &aquarium_config::SimulationCfg) -> Self {
        Self {
            tick: Duration::from_secs(c.tick_secs),
            sample_every_minutes: c.sample_every_minutes,
        }
    }
}

// ── Extras / StoreCfg ────────────────────────────────────────────────────────

impl From<&aquarium_config::AquariumCfg> for Extras {
    fn from(c: &aquarium_config::AquariumCfg) -> Self {
        Self {
            feeding_time: c.feeding_time.clone(),
            ph_level: c.ph_level,
            filter_on: c.filter_on,
            water_level: c.water_level.clone(),
        }
    }
}

impl From<&aquarium_config::Config> for StoreCfg {
    fn from(c: &aquarium_config::Config) -> Self {
        Self {
            initial_water: c.simulation.initial_water,
            initial_air: c.simulation.initial_air,
            history_capacity: c.simulation.history_capacity,
            extras: (&c.aquarium).into(),
        }
    }
}
