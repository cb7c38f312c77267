//! Mirror the aquarium status into a remote [`ContentStore`].
//!
//! A [`SyncWorker`] thread publishes a JSON [`StatusDocument`] on a fixed
//! interval and whenever the gateway reports a change. The snapshot is
//! taken (and the gateway lock released) before any network call. Failures
//! are logged and left for the next trigger to retry.
use crate::error::AquariumError;
use crate::gateway::Aquarium;
use crate::state::AquariumState;
use aquarium_traits::ContentStore;
use crossbeam_channel as xch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Timestamp format used in the published document.
pub const DOCUMENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The published shape: resolved values and tank details only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDocument {
    pub temp_water: f64,
    pub temp_air: f64,
    pub water_leak: bool,
    pub light_on: bool,
    pub feeding_time: String,
    pub ph_level: f64,
    pub filter_on: bool,
    pub water_level: String,
    pub last_update: String,
}

impl From<&AquariumState> for StatusDocument {
    fn from(s: &AquariumState) -> Self {
        Self {
            temp_water: s.temp_water,
            temp_air: s.temp_air,
            water_leak: s.water_leak,
            light_on: s.light_on,
            feeding_time: s.extras.feeding_time.clone(),
            ph_level: s.extras.ph_level,
            filter_on: s.extras.filter_on,
            water_level: s.extras.water_level.clone(),
            last_update: s.last_update.format(DOCUMENT_TIME_FORMAT).to_string(),
        }
    }
}

impl StatusDocument {
    pub fn to_json(&self) -> Result<String, AquariumError> {
        serde_json::to_string_pretty(self).map_err(|e| AquariumError::State(e.to_string()))
    }
}

/// Publish the current status once.
pub fn sync_once<S: ContentStore + ?Sized>(
    aquarium: &Aquarium,
    store: &mut S,
    path: &str,
) -> Result<(), AquariumError> {
    let doc = StatusDocument::from(&aquarium.status());
    let body = doc.to_json()?;
    store
        .upsert(path, &body)
        .map_err(|e| AquariumError::Remote(e.to_string()))
}

/// Counters exposed by a running [`SyncWorker`].
#[derive(Debug, Default)]
pub struct SyncStats {
    pub ok: AtomicU64,
    pub failed: AtomicU64,
}

pub struct SyncWorker {
    stats: Arc<SyncStats>,
    shutdown: Option<xch::Sender<()>>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl SyncWorker {
    /// Spawn the worker. It publishes once right away, then on every
    /// `interval` and every message on `changes`.
    pub fn spawn<S>(
        aquarium: Aquarium,
        mut store: S,
        path: String,
        interval: Duration,
        changes: xch::Receiver<()>,
    ) -> Self
    where
        S: ContentStore + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = xch::bounded::<()>(0);
        let stats = Arc::new(SyncStats::default());
        let stats_clone = stats.clone();
        let interval = interval.max(Duration::from_millis(1));

        let join_handle = std::thread::Builder::new()
            .name("aquarium-sync".into())
            .spawn(move || {
                let never = xch::never::<()>();
                let mut changes_open = true;
                loop {
                    match sync_once(&aquarium, &mut store, &path) {
                        Ok(()) => {
                            stats_clone.ok.fetch_add(1, Ordering::Relaxed);
                            tracing::info!(path = %path, "status document published");
                        }
                        Err(e) => {
                            stats_clone.failed.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(path = %path, error = %e, "status sync failed");
                        }
                    }

                    let changes_rx = if changes_open { &changes } else { &never };
                    xch::select! {
                        recv(shutdown_rx) -> _ => break,
                        recv(changes_rx) -> msg => {
                            if msg.is_err() {
                                // Every notifier is gone; keep the periodic schedule only.
                                changes_open = false;
                            }
                        }
                        default(interval) => {}
                    }
                }
                tracing::trace!("Sync thread exiting cleanly");
            });

        let join_handle = match join_handle {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn sync thread");
                None
            }
        };

        Self {
            stats,
            shutdown: Some(shutdown_tx),
            join_handle,
        }
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        self.shutdown.take();
        if let Some(handle) = self.join_handle.take()
            && let Err(e) = handle.join()
        {
            tracing::warn!(?e, "Sync thread panicked during shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreCfg;
    use crate::mocks::{FailingStore, RecordingStore};
    use aquarium_traits::test_clock::ManualClock;

    fn aquarium() -> Aquarium {
        Aquarium::new(&StoreCfg::default(), ManualClock::at(14, 5))
    }

    #[test]
    fn document_has_published_fields_only() {
        let aq = aquarium();
        aq.set_manual_leak(true);
        let doc = StatusDocument::from(&aq.status());
        let v = serde_json::to_value(&doc).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 9);
        assert_eq!(v["water_leak"], true);
        assert_eq!(v["last_update"], "2024-06-01 14:05:00");
        assert!(obj.get("manual_water_leak").is_none());
    }

    #[test]
    fn sync_once_writes_pretty_json_to_path() {
        let aq = aquarium();
        let mut store = RecordingStore::default();
        sync_once(&aq, &mut store, "data/status.json").unwrap();
        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "data/status.json");
        assert!(writes[0].1.contains("\n  \"temp_water\": 24.5"));
    }

    #[test]
    fn remote_failure_is_reported_and_state_untouched() {
        let aq = aquarium();
        let before = aq.status();
        let err = sync_once(&aq, &mut FailingStore, "x.json").unwrap_err();
        assert!(matches!(err, AquariumError::Remote(_)));
        assert_eq!(aq.status(), before);
    }
}
