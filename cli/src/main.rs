//! Settle CLI - runs promise demo scenarios.
//!
//! ```text
//! settle [SCENARIO...]   # new, then, catch, all, race, any, timeout
//! ```
//!
//! With no arguments every scenario runs, in the order above. Each prints one
//! line: `name: value` or `name: error: message`.
//!
//! Configuration comes from `$SETTLE_CONFIG` or `~/.settle/config.toml`
//! (see [`settle_config`]). `RUST_LOG` overrides the configured log filter.

mod scenarios;

use std::{
    env,
    fs::{self, OpenOptions},
    io::{self, Write},
    sync::Mutex,
};

use anyhow::{Context, Result};
use tokio::runtime::{Builder, Runtime};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use settle_config::{LoggingConfig, RuntimeFlavor, SettleConfig};

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(logging.filter.as_deref().unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut init_warnings = Vec::new();
    if let Some(path) = &logging.file {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = fs::create_dir_all(parent)
        {
            init_warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
        }

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                tracing_subscriber::registry()
                    .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                    .with(env_filter)
                    .init();
                tracing::info!(path = %path.display(), "Logging initialized");
                for warning in init_warnings {
                    tracing::warn!("{warning}");
                }
                return;
            }
            Err(e) => {
                init_warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    path.display()
                ));
            }
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn build_runtime(flavor: RuntimeFlavor) -> io::Result<Runtime> {
    match flavor {
        RuntimeFlavor::CurrentThread => Builder::new_current_thread().enable_all().build(),
        RuntimeFlavor::MultiThread { worker_threads } => {
            let mut builder = Builder::new_multi_thread();
            if let Some(threads) = worker_threads {
                builder.worker_threads(threads);
            }
            builder.enable_all().build()
        }
    }
}

fn main() -> Result<()> {
    let config = SettleConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let names: Vec<String> = env::args().skip(1).collect();
    let selected = scenarios::select(&names)?;

    let flavor = config.runtime.flavor();
    tracing::debug!(?flavor, scenarios = selected.len(), "Starting runtime");
    let runtime = build_runtime(flavor).context("failed to build tokio runtime")?;
    let reports = runtime.block_on(scenarios::run_all(&selected, &config.demo));

    let mut out = io::stdout().lock();
    for report in &reports {
        writeln!(out, "{report}")?;
    }
    Ok(())
}
