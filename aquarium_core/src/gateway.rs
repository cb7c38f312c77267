//! Concurrency-safe access to the aquarium state.
//!
//! [`Aquarium`] is the only handle collaborators (HTTP routes, the chat bot,
//! remote sync) hold. It is cheap to clone; all clones share one lock around
//! the [`Store`], and every method acquires it exactly once for its full
//! duration. Nothing blocking ever runs under the lock: snapshots are cloned
//! out and the lock is released before the caller does any I/O.

use crate::config::StoreCfg;
use crate::error::AquariumError;
use crate::history::{HistorySeries, Sample};
use crate::state::{AquariumState, SimulatedReadings, Store};
use aquarium_traits::Clock;
use chrono::NaiveDateTime;
use crossbeam_channel as xch;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub struct Aquarium {
    inner: Arc<Mutex<Store>>,
    clock: Arc<dyn Clock + Send + Sync>,
    changes: Option<xch::Sender<()>>,
}

impl std::fmt::Debug for Aquarium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aquarium")
            .field("notifies_changes", &self.changes.is_some())
            .finish_non_exhaustive()
    }
}

impl Aquarium {
    pub fn new(cfg: &StoreCfg, clock: impl Clock + Send + Sync + 'static) -> Self {
        let now = clock.now();
        Self {
            inner: Arc::new(Mutex::new(Store::new(cfg, now))),
            clock: Arc::new(clock),
            changes: None,
        }
    }

    /// Send a unit message on `tx` after every external mutation.
    ///
    /// Sends never block: with a bounded(1) channel, bursts of changes
    /// collapse into one pending notification.
    pub fn with_change_notifier(mut self, tx: xch::Sender<()>) -> Self {
        self.changes = Some(tx);
        self
    }

    /// Lock the store. A panic in another holder leaves the store usable:
    /// every mutation computes its result before writing it.
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        if let Some(tx) = &self.changes {
            let _ = tx.try_send(());
        }
    }

    /// Ask the remote sync to publish the current state soon.
    pub fn request_sync(&self) {
        self.notify();
    }

    pub fn status(&self) -> AquariumState {
        self.lock().state().clone()
    }

    pub fn history(&self) -> HistorySeries {
        self.lock().history().snapshot()
    }

    /// Status and history taken under the same lock acquisition.
    pub fn snapshot(&self) -> (AquariumState, HistorySeries) {
        let store = self.lock();
        (store.state().clone(), store.history().snapshot())
    }

    pub fn toggle_light(&self) -> bool {
        let on = {
            let mut store = self.lock();
            let now = self.clock.now();
            store.toggle_light(now)
        };
        tracing::info!(light_on = on, "light toggled");
        self.notify();
        on
    }

    pub fn set_light(&self, on: bool) {
        {
            let mut store = self.lock();
            let now = self.clock.now();
            store.set_light(on, now);
        }
        tracing::info!(light_on = on, "light set");
        self.notify();
    }

    pub fn toggle_leak(&self) -> bool {
        let leak = {
            let mut store = self.lock();
            let now = self.clock.now();
            store.toggle_leak(now)
        };
        tracing::info!(water_leak = leak, "leak toggled");
        self.notify();
        leak
    }

    pub fn set_manual_temp_water(&self, value: f64) -> Result<(), AquariumError> {
        {
            let mut store = self.lock();
            let now = self.clock.now();
            store.set_manual_temp_water(value, now)?;
        }
        tracing::info!(value, "manual water temperature set");
        self.notify();
        Ok(())
    }

    pub fn set_manual_temp_air(&self, value: f64) -> Result<(), AquariumError> {
        {
            let mut store = self.lock();
            let now = self.clock.now();
            store.set_manual_temp_air(value, now)?;
        }
        tracing::info!(value, "manual air temperature set");
        self.notify();
        Ok(())
    }

    pub fn set_manual_leak(&self, leak: bool) {
        {
            let mut store = self.lock();
            let now = self.clock.now();
            store.set_manual_leak(leak, now);
        }
        tracing::info!(leak, "manual leak set");
        self.notify();
    }

    pub fn clear_manual_overrides(&self) {
        {
            let mut store = self.lock();
            let now = self.clock.now();
            store.clear_manual_overrides(now);
        }
        tracing::info!("manual overrides cleared");
        self.notify();
    }

    /// Last raw simulator values `(water, air)`.
    pub(crate) fn auto_temperatures(&self) -> (f64, f64) {
        let store = self.lock();
        let s = store.state();
        (s.auto_temp_water, s.auto_temp_air)
    }

    /// Apply one simulation tick and, when `sample_at` is set, record a
    /// history sample, both in the same critical section.
    pub(crate) fn apply_tick(
        &self,
        readings: &SimulatedReadings,
        sample_at: Option<NaiveDateTime>,
    ) -> Option<Sample> {
        let mut store = self.lock();
        store.apply_simulated(readings);
        sample_at.map(|at| store.record_sample(at))
    }
}
