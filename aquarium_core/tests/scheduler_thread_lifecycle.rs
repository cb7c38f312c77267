//! Scheduler thread lifecycle: prompt shutdown, no leaks, tick isolation.

use aquarium_core::mocks::ConstantNoise;
use aquarium_core::{
    Aquarium, SamplePolicy, ScheduleCfg, Scheduler, SimulationProfile, Simulator, StoreCfg,
    TickDriver,
};
use aquarium_traits::NoiseSource;
use aquarium_traits::test_clock::ManualClock;
use std::time::{Duration, Instant};

fn fast_cfg() -> ScheduleCfg {
    ScheduleCfg {
        tick: Duration::from_millis(10),
        sample_every_minutes: 10,
    }
}

fn driver<N: NoiseSource>(aq: &Aquarium, noise: N) -> TickDriver<N> {
    TickDriver::new(
        aq.clone(),
        Simulator::new(SimulationProfile::default(), noise),
        SamplePolicy::new(10),
    )
}

fn wait_for(mut cond: impl FnMut() -> bool, limit: Duration) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn first_tick_runs_immediately() {
    let clock = ManualClock::at(14, 3);
    let aq = Aquarium::new(&StoreCfg::default(), clock.clone());
    let cfg = ScheduleCfg {
        tick: Duration::from_secs(3600),
        sample_every_minutes: 10,
    };
    let sched = Scheduler::spawn(driver(&aq, ConstantNoise::zero()), clock, &cfg);
    assert!(wait_for(|| sched.ticks() >= 1, Duration::from_secs(2)));
    drop(sched);
}

#[test]
fn shutdown_is_prompt_even_with_long_interval() {
    let clock = ManualClock::at(14, 3);
    let aq = Aquarium::new(&StoreCfg::default(), clock.clone());
    let cfg = ScheduleCfg {
        tick: Duration::from_secs(3600),
        sample_every_minutes: 10,
    };
    let sched = Scheduler::spawn(driver(&aq, ConstantNoise::zero()), clock, &cfg);
    assert!(wait_for(|| sched.ticks() >= 1, Duration::from_secs(2)));

    let start = Instant::now();
    drop(sched);
    let shutdown_time = start.elapsed();
    assert!(
        shutdown_time < Duration::from_millis(200),
        "Shutdown took {:?}, expected < 200ms",
        shutdown_time
    );
}

#[test]
fn schedulers_can_be_created_and_dropped_repeatedly() {
    let clock = ManualClock::at(1, 1);
    let aq = Aquarium::new(&StoreCfg::default(), clock.clone());
    for _ in 0..10 {
        let sched = Scheduler::spawn(driver(&aq, ConstantNoise::zero()), clock.clone(), &fast_cfg());
        std::thread::sleep(Duration::from_millis(15));
        assert!(sched.is_running());
        drop(sched);
    }
}

#[test]
fn ticks_keep_updating_state() {
    let clock = ManualClock::at(2, 1);
    let aq = Aquarium::new(&StoreCfg::default(), clock.clone());
    let sched = Scheduler::spawn(driver(&aq, ConstantNoise::zero()), clock, &fast_cfg());
    // Night water base 23.0: the reading drifts down from 24.5.
    assert!(wait_for(|| aq.status().temp_water < 24.5, Duration::from_secs(2)));
    drop(sched);
}

/// Panics on the first draw, then behaves.
struct PanicOnce {
    fired: bool,
}

impl NoiseSource for PanicOnce {
    fn uniform(&mut self, _low: f64, _high: f64) -> f64 {
        if !self.fired {
            self.fired = true;
            panic!("injected tick failure");
        }
        0.0
    }
    fn chance(&mut self, _p: f64) -> bool {
        false
    }
}

#[test]
fn panicking_tick_does_not_stop_the_loop() {
    let clock = ManualClock::at(2, 1);
    let aq = Aquarium::new(&StoreCfg::default(), clock.clone());
    let sched = Scheduler::spawn(driver(&aq, PanicOnce { fired: false }), clock, &fast_cfg());
    assert!(wait_for(|| sched.ticks() >= 3, Duration::from_secs(2)));
    assert!(sched.is_running());
    // Gateway stays usable after the failed tick.
    assert!(aq.toggle_light());
    assert!(wait_for(|| aq.status().temp_water < 24.5, Duration::from_secs(2)));
    drop(sched);
}

#[test]
fn tick_count_tracks_fixed_grid() {
    let clock = ManualClock::at(2, 1);
    let aq = Aquarium::new(&StoreCfg::default(), clock.clone());
    let period = Duration::from_millis(20);
    let cfg = ScheduleCfg {
        tick: period,
        sample_every_minutes: 10,
    };
    let start = Instant::now();
    let sched = Scheduler::spawn(driver(&aq, ConstantNoise::zero()), clock, &cfg);
    // Sit between grid points so an in-flight tick cannot tip the count.
    std::thread::sleep(period * 50 + period / 2);
    let ticks = sched.ticks();
    let elapsed = start.elapsed();
    drop(sched);

    // One tick at t=0, then one per elapsed period.
    let expected = (elapsed.as_nanos() / period.as_nanos()) as u64 + 1;
    assert!(
        ticks.abs_diff(expected) <= 1,
        "ran {ticks} ticks in {elapsed:?}, grid expects {expected}"
    );
}
