//! Tracing setup: console layer (pretty or JSON) plus an optional rolling file.

use crate::cli::FILE_GUARD;
use aquarium_config::Logging;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn rotation(name: Option<&str>) -> eyre::Result<Rotation> {
    Ok(match name.unwrap_or("never") {
        "never" => Rotation::NEVER,
        "daily" => Rotation::DAILY,
        "hourly" => Rotation::HOURLY,
        other => eyre::bail!("logging.rotation must be never|daily|hourly (got {other:?})"),
    })
}

/// Install the global subscriber. `RUST_LOG` wins over `--log-level`.
pub fn init(json: bool, level: &str, cfg: &Logging) -> eyre::Result<()> {
    let console_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_target(false).with_writer(std::io::stderr).boxed()
    };

    let file_layer = match cfg.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file must name a file: {path:?}"))?;
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(rotation(cfg.rotation.as_deref())?, dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let filter = EnvFilter::try_new(cfg.level.as_deref().unwrap_or("info"))?;
            Some(fmt::layer().json().with_ansi(false).with_writer(writer).with_filter(filter))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file_layer)
        .try_init()?;
    Ok(())
}
