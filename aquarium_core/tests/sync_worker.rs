//! Remote sync worker lifecycle.

use aquarium_core::mocks::{FailingStore, RecordingStore};
use aquarium_core::{Aquarium, StatusDocument, StoreCfg, SyncWorker};
use aquarium_traits::test_clock::ManualClock;
use crossbeam_channel as xch;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn publishes_on_start_and_on_change() {
    let (tx, rx) = xch::bounded(1);
    let aq = Aquarium::new(&StoreCfg::default(), ManualClock::at(8, 0)).with_change_notifier(tx);
    let store = RecordingStore::default();
    let worker = SyncWorker::spawn(
        aq.clone(),
        store.clone(),
        "data/status.json".into(),
        Duration::from_secs(3600),
        rx,
    );
    assert!(wait_for(|| store.writes().len() == 1));

    aq.toggle_light();
    assert!(wait_for(|| store.writes().len() == 2));
    let (_, body) = store.writes().pop().unwrap();
    let doc: StatusDocument = serde_json::from_str(&body).unwrap();
    assert!(doc.light_on);
    assert!(wait_for(|| worker.stats().ok.load(Ordering::Relaxed) == 2));
    drop(worker);
}

#[test]
fn publishes_periodically_without_changes() {
    let (_tx, rx) = xch::bounded(1);
    let aq = Aquarium::new(&StoreCfg::default(), ManualClock::at(8, 0));
    let store = RecordingStore::default();
    let worker = SyncWorker::spawn(aq, store.clone(), "s.json".into(), Duration::from_millis(10), rx);
    assert!(wait_for(|| store.writes().len() >= 3));
    drop(worker);
}

#[test]
fn failures_are_counted_and_worker_keeps_running() {
    let (_tx, rx) = xch::bounded(1);
    let aq = Aquarium::new(&StoreCfg::default(), ManualClock::at(8, 0));
    let worker = SyncWorker::spawn(aq.clone(), FailingStore, "s.json".into(), Duration::from_millis(10), rx);
    assert!(wait_for(|| worker.stats().failed.load(Ordering::Relaxed) >= 2));
    assert_eq!(aq.status().temp_water, 24.5);
    drop(worker);
}

#[test]
fn dropped_notifiers_fall_back_to_interval() {
    let (tx, rx) = xch::bounded::<()>(1);
    drop(tx);
    let aq = Aquarium::new(&StoreCfg::default(), ManualClock::at(8, 0));
    let store = RecordingStore::default();
    let worker = SyncWorker::spawn(aq, store.clone(), "s.json".into(), Duration::from_millis(200), rx);
    std::thread::sleep(Duration::from_millis(100));
    // No busy loop on the disconnected channel: at most start + one wake.
    assert!(store.writes().len() <= 2, "writes: {}", store.writes().len());
    let start = Instant::now();
    drop(worker);
    assert!(start.elapsed() < Duration::from_millis(200));
}
