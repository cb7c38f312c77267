#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the aquarium service.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; a missing file yields `Config::default()`.
//! - Credentials are never read from TOML alone: `apply_env` layers the
//!   process environment on top once at startup.
use serde::Deserialize;
use std::path::Path;

/// Upper bound for `simulation.history_capacity`.
pub const MAX_HISTORY_CAPACITY: usize = 100_000;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerCfg {
    /// Socket address for the HTTP API.
    pub bind: String,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Base value and noise half-width for one channel in one part of the day.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct BandCfg {
    pub base: f64,
    pub spread: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationCfg {
    /// Seconds between simulation ticks.
    pub tick_secs: u64,
    /// History is sampled when the wall-clock minute is a multiple of this.
    pub sample_every_minutes: u32,
    /// Maximum number of history samples (144 = 24h at 10 minute spacing).
    pub history_capacity: usize,
    /// EMA weight of the fresh base value. Range: (0.0, 1.0].
    pub smoothing: f64,
    /// Per-tick probability that the simulated leak sensor reports a leak.
    pub leak_probability: f64,
    /// Fixed RNG seed for reproducible runs; entropy when absent.
    pub seed: Option<u64>,
    /// Starting water temperature.
    pub initial_water: f64,
    /// Starting air temperature.
    pub initial_air: f64,
    /// First hour (inclusive) of the day profile.
    pub day_start_hour: u32,
    /// First hour (inclusive) of the night profile.
    pub night_start_hour: u32,
    pub water_day: BandCfg,
    pub water_night: BandCfg,
    pub air_day: BandCfg,
    pub air_night: BandCfg,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            tick_secs: 60,
            sample_every_minutes: 10,
            history_capacity: 144,
            smoothing: 0.1,
            leak_probability: 0.01,
            seed: None,
            initial_water: 24.5,
            initial_air: 22.0,
            day_start_hour: 6,
            night_start_hour: 18,
            water_day: BandCfg {
                base: 24.5,
                spread: 0.5,
            },
            water_night: BandCfg {
                base: 23.0,
                spread: 0.3,
            },
            air_day: BandCfg {
                base: 22.0,
                spread: 0.5,
            },
            air_night: BandCfg {
                base: 21.0,
                spread: 0.3,
            },
        }
    }
}

/// Static tank details reported alongside the readings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AquariumCfg {
    pub feeding_time: String,
    pub ph_level: f64,
    pub filter_on: bool,
    pub water_level: String,
}

impl Default for AquariumCfg {
    fn default() -> Self {
        Self {
            feeding_time: "12:00".to_string(),
            ph_level: 7.0,
            filter_on: true,
            water_level: "normal".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncCfg {
    /// Seconds between periodic uploads of the status document.
    pub interval_secs: u64,
    /// Repository in `owner/name` form.
    pub repo: Option<String>,
    /// Path of the status document inside the repository.
    pub path: String,
    pub commit_message: String,
    pub api_base: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Access token. Usually supplied by the environment.
    pub token: Option<String>,
}

impl Default for SyncCfg {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            repo: Some("meali09/aquarium".to_string()),
            path: "data/status.json".to_string(),
            commit_message: "Update aquarium status".to_string(),
            api_base: "https://api.github.com".to_string(),
            timeout_ms: 10_000,
            token: None,
        }
    }
}

impl SyncCfg {
    /// Remote sync runs only with both a token and a repository.
    pub fn is_enabled(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
            && self.repo.as_deref().is_some_and(|r| !r.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BotCfg {
    /// Public dashboard URL shown in the welcome message.
    pub website_url: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
    pub api_base: String,
    /// Pause after a failed poll before trying again.
    pub retry_backoff_ms: u64,
    /// Bot token. Usually supplied by the environment.
    pub token: Option<String>,
}

impl Default for BotCfg {
    fn default() -> Self {
        Self {
            website_url: "https://meali09.github.io/aquarium/".to_string(),
            poll_timeout_secs: 10,
            api_base: "https://api.telegram.org".to_string(),
            retry_backoff_ms: 2_000,
            token: None,
        }
    }
}

impl BotCfg {
    pub fn is_enabled(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub server: ServerCfg,
    pub simulation: SimulationCfg,
    pub aquarium: AquariumCfg,
    pub sync: SyncCfg,
    pub bot: BotCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Load the config file at `path`, falling back to defaults when it does not exist.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration in {:?}: {}", path, e))
}

/// Environment variable names consulted by [`Config::apply_env`], in priority order.
pub mod env_keys {
    pub const BOT_TOKEN: [&str; 2] = ["AQUARIUM_BOT_TOKEN", "TELEGRAM_TOKEN"];
    pub const GITHUB_TOKEN: [&str; 2] = ["AQUARIUM_GITHUB_TOKEN", "GITHUB_TOKEN"];
    pub const GITHUB_REPO: &str = "GITHUB_REPO";
    pub const DATA_FILE_PATH: &str = "DATA_FILE_PATH";
    pub const WEBSITE_URL: &str = "WEBSITE_URL";
}

impl Config {
    /// Overlay credentials and remote locations from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|k| std::env::var(k).ok());
    }

    /// Same as [`Config::apply_env`] with an injectable lookup (for tests).
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| lookup(*k).filter(|v| !v.trim().is_empty()))
        };
        if let Some(tok) = first(&env_keys::BOT_TOKEN[..]) {
            self.bot.token = Some(tok);
        }
        if let Some(tok) = first(&env_keys::GITHUB_TOKEN[..]) {
            self.sync.token = Some(tok);
        }
        if let Some(repo) = first(&[env_keys::GITHUB_REPO][..]) {
            self.sync.repo = Some(repo);
        }
        if let Some(path) = first(&[env_keys::DATA_FILE_PATH][..]) {
            self.sync.path = path;
        }
        if let Some(url) = first(&[env_keys::WEBSITE_URL][..]) {
            self.bot.website_url = url;
        }
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Server
        if self.server.bind.trim().is_empty() {
            eyre::bail!("server.bind must not be empty");
        }

        // Simulation
        let sim = &self.simulation;
        if sim.tick_secs == 0 {
            eyre::bail!("simulation.tick_secs must be >= 1");
        }
        if sim.tick_secs > 24 * 60 * 60 {
            eyre::bail!("simulation.tick_secs is unreasonably large (>24h)");
        }
        if sim.sample_every_minutes == 0 || 60 % sim.sample_every_minutes != 0 {
            eyre::bail!("simulation.sample_every_minutes must be a divisor of 60");
        }
        if !(1..=MAX_HISTORY_CAPACITY).contains(&sim.history_capacity) {
            eyre::bail!("simulation.history_capacity must be in 1..={MAX_HISTORY_CAPACITY}");
        }
        if !(sim.smoothing > 0.0 && sim.smoothing <= 1.0) {
            eyre::bail!("simulation.smoothing must be in (0.0, 1.0]");
        }
        if !(0.0..=1.0).contains(&sim.leak_probability) {
            eyre::bail!("simulation.leak_probability must be in [0.0, 1.0]");
        }
        if !sim.initial_water.is_finite() || !sim.initial_air.is_finite() {
            eyre::bail!("simulation.initial_water/initial_air must be finite");
        }
        if sim.day_start_hour >= 24 || sim.night_start_hour >= 24 {
            eyre::bail!("simulation.day_start_hour/night_start_hour must be in 0..24");
        }
        if sim.day_start_hour >= sim.night_start_hour {
            eyre::bail!("simulation.day_start_hour must be < night_start_hour");
        }
        for (name, band) in [
            ("water_day", sim.water_day),
            ("water_night", sim.water_night),
            ("air_day", sim.air_day),
            ("air_night", sim.air_night),
        ] {
            if !band.base.is_finite() {
                eyre::bail!("simulation.{name}.base must be finite");
            }
            if !band.spread.is_finite() || band.spread < 0.0 {
                eyre::bail!("simulation.{name}.spread must be >= 0");
            }
        }

        // Aquarium
        if !is_hh_mm(&self.aquarium.feeding_time) {
            eyre::bail!("aquarium.feeding_time must be HH:MM");
        }
        if !(0.0..=14.0).contains(&self.aquarium.ph_level) {
            eyre::bail!("aquarium.ph_level must be in [0.0, 14.0]");
        }

        // Sync
        if self.sync.interval_secs == 0 {
            eyre::bail!("sync.interval_secs must be >= 1");
        }
        if self.sync.timeout_ms == 0 {
            eyre::bail!("sync.timeout_ms must be >= 1");
        }
        if self.sync.path.trim().is_empty() {
            eyre::bail!("sync.path must not be empty");
        }

        // Bot
        if self.bot.poll_timeout_secs > 60 {
            eyre::bail!("bot.poll_timeout_secs must be <= 60");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

fn is_hh_mm(s: &str) -> bool {
    let Some((h, m)) = s.split_once(':') else {
        return false;
    };
    if h.len() != 2 || m.len() != 2 {
        return false;
    }
    matches!((h.parse::<u32>(), m.parse::<u32>()), (Ok(h), Ok(m)) if h < 24 && m < 60)
}
