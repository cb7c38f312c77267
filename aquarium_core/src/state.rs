//! The aquarium state record and its manual-override resolution.
//!
//! [`Store`] owns both the current [`AquariumState`] and the [`HistoryRing`].
//! It is not synchronized itself; [`crate::gateway::Aquarium`] wraps it in a
//! single lock so that every method here runs as one critical section.

use crate::config::{Extras, StoreCfg, limits};
use crate::error::AquariumError;
use crate::history::{HistoryRing, Sample};
use crate::util::label_for;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// A single timestamped value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: f64,
    pub timestamp: NaiveDateTime,
}

/// Raw simulator output for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedReadings {
    pub water: Reading,
    pub air: Reading,
    pub leak: bool,
}

/// Values after manual-override precedence has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub temp_water: f64,
    pub temp_air: f64,
    pub water_leak: bool,
}

/// Snapshot of the whole tank, serialized flat for the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AquariumState {
    pub temp_water: f64,
    pub temp_air: f64,
    pub water_leak: bool,
    pub light_on: bool,
    pub auto_temp_water: f64,
    pub auto_temp_air: f64,
    pub auto_water_leak: bool,
    pub manual_temp_water: Option<f64>,
    pub manual_temp_air: Option<f64>,
    pub manual_water_leak: Option<bool>,
    pub last_update: NaiveDateTime,
    #[serde(flatten)]
    pub extras: Extras,
}

impl AquariumState {
    pub fn new(water: f64, air: f64, extras: Extras, now: NaiveDateTime) -> Self {
        let mut state = Self {
            temp_water: water,
            temp_air: air,
            water_leak: false,
            light_on: false,
            auto_temp_water: water,
            auto_temp_air: air,
            auto_water_leak: false,
            manual_temp_water: None,
            manual_temp_air: None,
            manual_water_leak: None,
            last_update: now,
            extras,
        };
        state.refresh(now);
        state
    }

    /// Manual values win whenever they are present, including an explicit `false` leak.
    pub fn resolve(&self) -> Resolved {
        Resolved {
            temp_water: self.manual_temp_water.unwrap_or(self.auto_temp_water),
            temp_air: self.manual_temp_air.unwrap_or(self.auto_temp_air),
            water_leak: self.manual_water_leak.unwrap_or(self.auto_water_leak),
        }
    }

    pub fn has_manual_override(&self) -> bool {
        self.manual_temp_water.is_some()
            || self.manual_temp_air.is_some()
            || self.manual_water_leak.is_some()
    }

    pub fn water_reading(&self) -> Reading {
        Reading {
            value: self.temp_water,
            timestamp: self.last_update,
        }
    }

    pub fn air_reading(&self) -> Reading {
        Reading {
            value: self.temp_air,
            timestamp: self.last_update,
        }
    }

    /// Recompute resolved fields and stamp the mutation time.
    fn refresh(&mut self, now: NaiveDateTime) {
        let r = self.resolve();
        self.temp_water = r.temp_water;
        self.temp_air = r.temp_air;
        self.water_leak = r.water_leak;
        self.last_update = now;
    }
}

fn check_temp(
    field: &'static str,
    value: f64,
    range: RangeInclusive<f64>,
) -> Result<f64, AquariumError> {
    if !value.is_finite() {
        return Err(AquariumError::validation(field, "value must be a finite number"));
    }
    if !range.contains(&value) {
        return Err(AquariumError::validation(
            field,
            format!(
                "{value} is outside {}..={} °C",
                range.start(),
                range.end()
            ),
        ));
    }
    Ok(value)
}

/// Current state plus history. All mutations stamp `last_update` with `now`.
#[derive(Debug, Clone)]
pub struct Store {
    state: AquariumState,
    history: HistoryRing,
}

impl Store {
    pub fn new(cfg: &StoreCfg, now: NaiveDateTime) -> Self {
        Self {
            state: AquariumState::new(
                cfg.initial_water,
                cfg.initial_air,
                cfg.extras.clone(),
                now,
            ),
            history: HistoryRing::with_capacity(cfg.history_capacity),
        }
    }

    pub fn state(&self) -> &AquariumState {
        &self.state
    }

    pub fn history(&self) -> &HistoryRing {
        &self.history
    }

    /// Flip the light; returns the new value.
    pub fn toggle_light(&mut self, now: NaiveDateTime) -> bool {
        self.state.light_on = !self.state.light_on;
        self.state.refresh(now);
        self.state.light_on
    }

    pub fn set_light(&mut self, on: bool, now: NaiveDateTime) {
        self.state.light_on = on;
        self.state.refresh(now);
    }

    /// Flip the resolved leak flag through the manual slot so it survives
    /// later simulation ticks. Returns the new resolved value.
    pub fn toggle_leak(&mut self, now: NaiveDateTime) -> bool {
        let next = !self.state.resolve().water_leak;
        self.state.manual_water_leak = Some(next);
        self.state.refresh(now);
        self.state.water_leak
    }

    pub fn set_manual_temp_water(
        &mut self,
        value: f64,
        now: NaiveDateTime,
    ) -> Result<(), AquariumError> {
        let v = check_temp("water temperature", value, limits::WATER_TEMP)?;
        self.state.manual_temp_water = Some(v);
        self.state.refresh(now);
        Ok(())
    }

    pub fn set_manual_temp_air(
        &mut self,
        value: f64,
        now: NaiveDateTime,
    ) -> Result<(), AquariumError> {
        let v = check_temp("air temperature", value, limits::AIR_TEMP)?;
        self.state.manual_temp_air = Some(v);
        self.state.refresh(now);
        Ok(())
    }

    pub fn set_manual_leak(&mut self, leak: bool, now: NaiveDateTime) {
        self.state.manual_water_leak = Some(leak);
        self.state.refresh(now);
    }

    /// Drop every manual value; resolution falls back to the simulator.
    pub fn clear_manual_overrides(&mut self, now: NaiveDateTime) {
        self.state.manual_temp_water = None;
        self.state.manual_temp_air = None;
        self.state.manual_water_leak = None;
        self.state.refresh(now);
    }

    /// Simulation path only: store raw values and re-resolve.
    pub fn apply_simulated(&mut self, r: &SimulatedReadings) {
        self.state.auto_temp_water = r.water.value;
        self.state.auto_temp_air = r.air.value;
        self.state.auto_water_leak = r.leak;
        self.state.refresh(r.water.timestamp);
    }

    /// Append the current resolved temperatures to history, labelled with `at`.
    pub fn record_sample(&mut self, at: NaiveDateTime) -> Sample {
        let sample = Sample {
            water: self.state.temp_water,
            air: self.state.temp_air,
            label: label_for(at),
        };
        self.history.append(sample.clone());
        sample
    }
}
