#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Aquarium state simulation and telemetry core.
//!
//! ## Architecture
//!
//! - **Simulator**: day/night smoothed random walk (`simulator` module)
//! - **State store**: current readings, flags and manual overrides (`state` module)
//! - **History**: bounded FIFO of samples (`history` module)
//! - **Gateway**: the lock-guarded handle every collaborator uses (`gateway` module)
//! - **Scheduler**: background tick thread (`scheduler` module)
//! - **Sync**: mirrors status into a remote content store (`sync` module)
//!
//! Time of day comes from `aquarium_traits::Clock` and randomness from
//! `aquarium_traits::NoiseSource`, so every step can be replayed in tests.

pub mod config;
pub mod conversions;
pub mod error;
pub mod gateway;
pub mod history;
pub mod mocks;
pub mod scheduler;
pub mod simulator;
pub mod state;
pub mod sync;
pub mod util;

pub use config::{Channel, Extras, ScheduleCfg, SimulationProfile, StoreCfg};
pub use error::AquariumError;
pub use gateway::Aquarium;
pub use history::{HistoryRing, HistorySeries, Sample};
pub use scheduler::{SamplePolicy, Scheduler, TickDriver, TickOutcome};
pub use simulator::{RandNoise, Simulator};
pub use state::{AquariumState, Reading, Resolved, SimulatedReadings};
pub use sync::{StatusDocument, SyncWorker};
