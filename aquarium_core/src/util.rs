//! Time-of-day and rounding helpers shared by the simulator and scheduler.

use chrono::{NaiveDateTime, Timelike};

/// Label format for history samples.
pub const LABEL_FORMAT: &str = "%H:%M";

/// Round to one decimal place, half away from zero (sensor resolution).
#[inline]
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Exponential moving average step: `previous * (1 - alpha) + target * alpha`.
#[inline]
pub fn blend(previous: f64, target: f64, alpha: f64) -> f64 {
    previous * (1.0 - alpha) + target * alpha
}

/// `HH:MM` label for a sample taken at `t`.
#[inline]
pub fn label_for(t: NaiveDateTime) -> String {
    t.format(LABEL_FORMAT).to_string()
}

/// True when `t` falls on a wall-clock minute that is a multiple of `every_minutes`.
/// `every_minutes` is clamped to at least 1.
#[inline]
pub fn is_sample_minute(t: NaiveDateTime, every_minutes: u32) -> bool {
    t.minute() % every_minutes.max(1) == 0
}

/// Identifies the wall-clock minute `t` belongs to; used to sample at most once per slot.
#[inline]
pub fn minute_slot(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp().div_euclid(60)
}
