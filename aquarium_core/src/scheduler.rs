//! Background simulation loop.
//!
//! A [`Scheduler`] owns one thread that runs a [`TickDriver`] once per
//! interval. Each tick feeds the simulator into the gateway and, when the
//! wall-clock minute is aligned, records a history sample.
//!
//! Safety: Each `Scheduler` spawns exactly one thread that is shut down and
//! joined when the `Scheduler` is dropped. Waiting happens on a shutdown
//! channel, so the thread wakes immediately instead of sleeping out the
//! interval. Ticks run on a fixed grid anchored at spawn time; a tick that
//! overruns skips the slots it missed.
use crate::config::ScheduleCfg;
use crate::gateway::Aquarium;
use crate::history::Sample;
use crate::simulator::Simulator;
use crate::state::SimulatedReadings;
use crate::util::{is_sample_minute, minute_slot};
use aquarium_traits::{Clock, NoiseSource};
use chrono::NaiveDateTime;
use crossbeam_channel as xch;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Decides whether a tick should also record a history sample.
///
/// Samples fire on wall-clock minutes that are a multiple of
/// `every_minutes`, at most once per minute slot. Missed slots are not
/// backfilled.
#[derive(Debug, Clone)]
pub struct SamplePolicy {
    every_minutes: u32,
    last_slot: Option<i64>,
}

impl SamplePolicy {
    pub fn new(every_minutes: u32) -> Self {
        Self {
            every_minutes: every_minutes.max(1),
            last_slot: None,
        }
    }

    pub fn due(&mut self, now: NaiveDateTime) -> bool {
        if !is_sample_minute(now, self.every_minutes) {
            return false;
        }
        let slot = minute_slot(now);
        if self.last_slot == Some(slot) {
            return false;
        }
        self.last_slot = Some(slot);
        true
    }
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub readings: SimulatedReadings,
    pub sample: Option<Sample>,
}

/// Simulator + sampling policy bound to a gateway. Drives one tick at a time.
pub struct TickDriver<N: NoiseSource> {
    aquarium: Aquarium,
    simulator: Simulator<N>,
    policy: SamplePolicy,
}

impl<N: NoiseSource> TickDriver<N> {
    pub fn new(aquarium: Aquarium, simulator: Simulator<N>, policy: SamplePolicy) -> Self {
        Self {
            aquarium,
            simulator,
            policy,
        }
    }

    pub fn aquarium(&self) -> &Aquarium {
        &self.aquarium
    }

    /// Run one simulation step at `now`.
    pub fn tick(&mut self, now: NaiveDateTime) -> TickOutcome {
        // Only this path writes auto_* values, so reading them and applying
        // the result in two critical sections cannot lose an update.
        let (prev_water, prev_air) = self.aquarium.auto_temperatures();
        let readings = self.simulator.step(now, prev_water, prev_air);
        let sample_at = self.policy.due(now).then_some(now);
        let sample = self.aquarium.apply_tick(&readings, sample_at);
        if let Some(s) = &sample {
            tracing::debug!(water = s.water, air = s.air, label = %s.label, "history sample");
        }
        TickOutcome { readings, sample }
    }
}

/// Next point on the fixed tick grid after `prev`.
///
/// Ticks stay phase-locked to the grid, so per-tick overhead never
/// accumulates. Grid points already in the past are skipped, not replayed.
fn next_deadline(prev: Instant, period: Duration, now: Instant) -> Instant {
    let next = prev + period;
    if next > now {
        return next;
    }
    let missed = now.duration_since(next).as_nanos() / period.as_nanos() + 1;
    u32::try_from(missed)
        .ok()
        .and_then(|n| period.checked_mul(n))
        .map_or(now + period, |skip| next + skip)
}

pub struct Scheduler {
    ticks: Arc<AtomicU64>,
    /// Dropping the sender wakes and stops the thread.
    shutdown: Option<xch::Sender<()>>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the loop. The first tick runs immediately, then once per `cfg.tick`.
    pub fn spawn<N, C>(mut driver: TickDriver<N>, clock: C, cfg: &ScheduleCfg) -> Self
    where
        N: NoiseSource + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = xch::bounded::<()>(0);
        let ticks = Arc::new(AtomicU64::new(0));
        let ticks_clone = ticks.clone();
        let period = cfg.tick.max(Duration::from_millis(1));

        let join_handle = std::thread::Builder::new()
            .name("aquarium-scheduler".into())
            .spawn(move || {
                let mut deadline = Instant::now();
                loop {
                    let now = clock.now();
                    match catch_unwind(AssertUnwindSafe(|| driver.tick(now))) {
                        Ok(outcome) => {
                            tracing::debug!(
                                water = outcome.readings.water.value,
                                air = outcome.readings.air.value,
                                leak = outcome.readings.leak,
                                sampled = outcome.sample.is_some(),
                                "simulation tick"
                            );
                        }
                        Err(_) => {
                            // Isolated per tick; next interval tries again.
                            tracing::error!(%now, "simulation tick panicked; continuing");
                        }
                    }
                    ticks_clone.fetch_add(1, Ordering::Relaxed);

                    deadline = next_deadline(deadline, period, Instant::now());
                    match shutdown_rx.recv_deadline(deadline) {
                        Err(xch::RecvTimeoutError::Timeout) => continue,
                        _ => {
                            tracing::debug!("Scheduler thread received shutdown signal");
                            break;
                        }
                    }
                }
                tracing::trace!("Scheduler thread exiting cleanly");
            });

        let join_handle = match join_handle {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn scheduler thread");
                None
            }
        };

        Self {
            ticks,
            shutdown: Some(shutdown_tx),
            join_handle,
        }
    }

    /// Number of ticks attempted so far (including ones that panicked).
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.join_handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // Disconnect the channel; the thread wakes from recv_deadline at once.
        self.shutdown.take();
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("Scheduler thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "Scheduler thread panicked during shutdown");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_advances_by_one_period() {
        let t0 = Instant::now();
        let p = Duration::from_millis(100);
        // Tick finished early: the next slot is exactly one period after the last.
        assert_eq!(next_deadline(t0, p, t0 + Duration::from_millis(3)), t0 + p);
        // Repeated overhead does not shift the grid.
        let mut d = t0;
        for i in 1..=50u32 {
            d = next_deadline(d, p, d + Duration::from_millis(7));
            assert_eq!(d, t0 + p * i);
        }
    }

    #[test]
    fn late_deadline_skips_missed_slots() {
        let t0 = Instant::now();
        let p = Duration::from_millis(100);
        // Woke at +350ms: slots at 100/200/300 are gone, next is 400.
        assert_eq!(
            next_deadline(t0, p, t0 + Duration::from_millis(350)),
            t0 + Duration::from_millis(400)
        );
        // Exactly on a grid point counts as missed.
        assert_eq!(next_deadline(t0, p, t0 + p), t0 + p * 2);
    }
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn policy_samples_once_per_aligned_minute() {
        let mut p = SamplePolicy::new(10);
        assert!(p.due(at(12, 0, 5)));
        assert!(!p.due(at(12, 0, 40)), "same slot");
        assert!(!p.due(at(12, 1, 0)));
        assert!(!p.due(at(12, 9, 59)));
        assert!(p.due(at(12, 10, 0)));
    }

    #[test]
    fn policy_does_not_backfill_missed_slots() {
        let mut p = SamplePolicy::new(10);
        assert!(p.due(at(12, 0, 0)));
        // Paused from 12:05 to 12:47: 12:10..12:40 are simply skipped.
        assert!(!p.due(at(12, 47, 0)));
        assert!(p.due(at(12, 50, 0)));
    }
}
