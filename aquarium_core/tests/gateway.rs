//! Concurrent access through the gateway.

use aquarium_core::{Aquarium, StoreCfg};
use aquarium_traits::test_clock::ManualClock;
use rstest::rstest;
use std::sync::Barrier;
use std::sync::Arc;

fn aquarium() -> Aquarium {
    Aquarium::new(&StoreCfg::default(), ManualClock::at(12, 0))
}

#[rstest]
#[case(1)]
#[case(8)]
#[case(63)]
#[case(64)]
fn concurrent_leak_toggles_respect_parity(#[case] n: usize) {
    let aq = aquarium();
    let start = Arc::new(Barrier::new(n));
    std::thread::scope(|s| {
        for _ in 0..n {
            let aq = aq.clone();
            let start = start.clone();
            s.spawn(move || {
                start.wait();
                aq.toggle_leak();
            });
        }
    });
    let st = aq.status();
    assert_eq!(st.water_leak, n % 2 == 1);
    assert_eq!(st.manual_water_leak, Some(n % 2 == 1));
}

#[test]
fn concurrent_light_toggles_do_not_lose_updates() {
    let aq = aquarium();
    std::thread::scope(|s| {
        for _ in 0..4 {
            let aq = aq.clone();
            s.spawn(move || {
                for _ in 0..250 {
                    aq.toggle_light();
                }
            });
        }
    });
    assert!(!aq.status().light_on, "1000 toggles return to the start");
}

#[test]
fn readers_never_see_torn_override_state() {
    let aq = aquarium();
    std::thread::scope(|s| {
        let writer = aq.clone();
        s.spawn(move || {
            for i in 0..500 {
                let v = 15.0 + (i % 20) as f64;
                writer.set_manual_temp_water(v).unwrap();
                if i % 3 == 0 {
                    writer.clear_manual_overrides();
                }
            }
        });
        for _ in 0..2 {
            let reader = aq.clone();
            s.spawn(move || {
                for _ in 0..500 {
                    let st = reader.status();
                    let expected = st.manual_temp_water.unwrap_or(st.auto_temp_water);
                    assert_eq!(st.temp_water, expected);
                    let h = reader.history();
                    assert_eq!(h.water.len(), h.labels.len());
                }
            });
        }
    });
}

#[test]
fn snapshot_pairs_status_with_history() {
    let aq = aquarium();
    let (status, history) = aq.snapshot();
    assert_eq!(status.temp_water, 24.5);
    assert!(history.is_empty());
}
