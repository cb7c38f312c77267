//! Offline simulation: drive ticks against a virtual clock and print each status.

use aquarium_config::Config;
use aquarium_core::{
    Aquarium, SamplePolicy, ScheduleCfg, Simulator, StoreCfg, TickDriver, TickOutcome,
};
use aquarium_traits::Clock;
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use std::sync::{Arc, Mutex, PoisonError};

/// Clock that only moves when told to.
///
/// `aquarium_traits::test_clock::ManualClock` sits behind the dev-only
/// `test-clock` feature, while `simulate` ships in release builds. This
/// clock is the release-side equivalent, advanced one tick per step.
#[derive(Clone)]
struct VirtualClock(Arc<Mutex<NaiveDateTime>>);

impl VirtualClock {
    fn step(&self, by: TimeDelta) -> NaiveDateTime {
        let mut t = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *t += by;
        *t
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn run(cfg: &Config, ticks: u32, start: &str, seed: Option<u64>, json: bool) -> eyre::Result<()> {
    let start_time = NaiveTime::parse_from_str(start, "%H:%M")
        .map_err(|e| eyre::eyre!("--start must be HH:MM ({start:?}: {e})"))?;
    let start_at = chrono::Local::now().date_naive().and_time(start_time);

    let mut sim_cfg = cfg.simulation.clone();
    if seed.is_some() {
        sim_cfg.seed = seed;
    }
    let schedule = ScheduleCfg::from(&sim_cfg);
    let step = TimeDelta::from_std(schedule.tick)?;

    let clock = VirtualClock(Arc::new(Mutex::new(start_at)));
    let aquarium = Aquarium::new(&StoreCfg::from(cfg), clock.clone());
    let mut driver = TickDriver::new(
        aquarium.clone(),
        Simulator::from_config(&sim_cfg),
        SamplePolicy::new(schedule.sample_every_minutes),
    );

    let mut now = clock.now();
    for i in 0..ticks {
        let outcome = driver.tick(now);
        print_tick(i + 1, now, &outcome, &aquarium, json)?;
        now = clock.step(step);
    }

    let history = aquarium.history();
    if json {
        println!("{}", serde_json::json!({ "history_len": history.len() }));
    } else {
        println!("history samples: {}", history.len());
    }
    Ok(())
}

fn print_tick(
    n: u32,
    now: NaiveDateTime,
    outcome: &TickOutcome,
    aquarium: &Aquarium,
    json: bool,
) -> eyre::Result<()> {
    let s = aquarium.status();
    if json {
        let line = serde_json::json!({
            "tick": n,
            "time": now.format("%H:%M").to_string(),
            "status": s,
            "sampled": outcome.sample.is_some(),
        });
        println!("{}", serde_json::to_string(&line)?);
    } else {
        println!(
            "#{n:<4} {} water {:>5.1}°C  air {:>5.1}°C  leak {:<5}{}",
            now.format("%H:%M"),
            s.temp_water,
            s.temp_air,
            s.water_leak,
            if outcome.sample.is_some() { "  [sample]" } else { "" }
        );
    }
    Ok(())
}
