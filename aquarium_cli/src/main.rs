mod bot;
mod cli;
mod error_fmt;
mod logging;
mod server;
mod simulate;

use aquarium_config::Config;
use aquarium_core::{
    Aquarium, SamplePolicy, ScheduleCfg, Scheduler, Simulator, StoreCfg, SyncWorker, TickDriver,
};
use aquarium_remote::{GithubConfig, GithubStore};
use aquarium_traits::SystemClock;
use clap::Parser;
use cli::{Cli, Commands, JSON_MODE};
use crossbeam_channel as xch;
use error_fmt::{ConfigError, exit_code_for_error, format_error_json, humanize};
use eyre::WrapErr;
use std::path::Path;
use std::time::Duration;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    logging::init(cli.json, &cli.log_level, &cfg.logging).wrap_err("logging setup")?;
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match cli.cmd {
        Commands::Serve {
            bind,
            no_bot,
            no_sync,
        } => serve(cfg, bind, no_bot, no_sync),
        Commands::Simulate { ticks, start, seed } => {
            simulate::run(&cfg, ticks, &start, seed, cli.json)
        }
        Commands::CheckConfig => {
            print_effective(&cfg, cli.json);
            Ok(())
        }
    }
}

/// File (or defaults), then environment, then validation.
fn load_config(path: &Path) -> eyre::Result<Config> {
    let mut cfg = aquarium_config::load_file(path).map_err(|e| ConfigError(e.to_string()))?;
    cfg.apply_env();
    cfg.validate().map_err(|e| ConfigError(e.to_string()))?;
    Ok(cfg)
}

fn print_effective(cfg: &Config, json: bool) {
    let set = |t: &Option<String>| if t.as_deref().is_some_and(|s| !s.is_empty()) { "set" } else { "unset" };
    let summary = serde_json::json!({
        "bind": cfg.server.bind,
        "tick_secs": cfg.simulation.tick_secs,
        "sample_every_minutes": cfg.simulation.sample_every_minutes,
        "history_capacity": cfg.simulation.history_capacity,
        "smoothing": cfg.simulation.smoothing,
        "leak_probability": cfg.simulation.leak_probability,
        "seed": cfg.simulation.seed,
        "sync": {
            "enabled": cfg.sync.is_enabled(),
            "repo": cfg.sync.repo,
            "path": cfg.sync.path,
            "interval_secs": cfg.sync.interval_secs,
            "token": set(&cfg.sync.token),
        },
        "bot": {
            "enabled": cfg.bot.is_enabled(),
            "website_url": cfg.bot.website_url,
            "token": set(&cfg.bot.token),
        },
    });
    if json {
        println!("{summary}");
    } else {
        println!("config OK");
        println!("  bind                 {}", cfg.server.bind);
        println!("  tick                 {}s", cfg.simulation.tick_secs);
        println!("  sample every         {} min", cfg.simulation.sample_every_minutes);
        println!("  history capacity     {}", cfg.simulation.history_capacity);
        println!(
            "  remote sync          {}",
            if cfg.sync.is_enabled() { "enabled" } else { "disabled" }
        );
        println!(
            "  chat bot             {}",
            if cfg.bot.is_enabled() { "enabled" } else { "disabled" }
        );
    }
}

fn serve(cfg: Config, bind: Option<String>, no_bot: bool, no_sync: bool) -> eyre::Result<()> {
    let schedule = ScheduleCfg::from(&cfg.simulation);
    let mut aquarium = Aquarium::new(&StoreCfg::from(&cfg), SystemClock::new());

    let sync_enabled = !no_sync && cfg.sync.is_enabled();
    let changes = if sync_enabled {
        let (tx, rx) = xch::bounded::<()>(1);
        aquarium = aquarium.with_change_notifier(tx);
        Some(rx)
    } else {
        if !no_sync {
            tracing::warn!("remote sync disabled: GitHub token or repository missing");
        }
        None
    };

    let driver = TickDriver::new(
        aquarium.clone(),
        Simulator::from_config(&cfg.simulation),
        SamplePolicy::new(schedule.sample_every_minutes),
    );
    let scheduler = Scheduler::spawn(driver, SystemClock::new(), &schedule);
    tracing::info!(tick_secs = cfg.simulation.tick_secs, "scheduler started");

    let sync = match (changes, cfg.sync.repo.clone(), cfg.sync.token.clone()) {
        (Some(rx), Some(repo), Some(token)) => {
            let store = GithubStore::new(GithubConfig {
                api_base: cfg.sync.api_base.clone(),
                repo: repo.clone(),
                token,
                commit_message: cfg.sync.commit_message.clone(),
                timeout: Duration::from_millis(cfg.sync.timeout_ms),
            });
            tracing::info!(repo = %repo, path = %cfg.sync.path, "remote sync started");
            Some(SyncWorker::spawn(
                aquarium.clone(),
                store,
                cfg.sync.path.clone(),
                Duration::from_secs(cfg.sync.interval_secs),
                rx,
            ))
        }
        _ => None,
    };

    let bot = match cfg.bot.token.clone().filter(|t| !t.is_empty()) {
        Some(token) if !no_bot => Some(bot::BotRunner::spawn(
            aquarium.clone(),
            bot::BotSettings {
                api_base: cfg.bot.api_base.clone(),
                token,
                website_url: Some(cfg.bot.website_url.clone()).filter(|u| !u.is_empty()),
                poll_timeout: Duration::from_secs(cfg.bot.poll_timeout_secs),
                retry_backoff: Duration::from_millis(cfg.bot.retry_backoff_ms),
            },
        )),
        Some(_) => None,
        None => {
            if !no_bot {
                tracing::warn!("chat bot disabled: no bot token configured");
            }
            None
        }
    };

    let addr = bind.unwrap_or_else(|| cfg.server.bind.clone());
    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(true);
    })
    .wrap_err("install Ctrl-C handler")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("start async runtime")?;
    let app = server::router(aquarium);
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .wrap_err_with(|| format!("bind {addr}"))?;
        tracing::info!(addr = %listener.local_addr()?, "http api listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.wait_for(|stop| *stop).await;
            })
            .await
            .wrap_err("http server")
    })?;

    tracing::info!("shutting down");
    drop(bot);
    drop(sync);
    drop(scheduler);
    Ok(())
}
