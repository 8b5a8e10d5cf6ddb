use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

/// Where log lines go for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Full-screen mode; anything on stderr would tear the alternate screen.
    File(&'a Path),
    /// Headless mode; stdout carries the report, so logs go to stderr.
    Stderr,
}

fn filter(debug: bool) -> EnvFilter {
    let level = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "geosafe={level},geosafe_tui={level},geosafe_core={level}"
        ))
    })
}

pub fn init_logging(target: LogTarget<'_>, debug: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(debug));

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    installed.map_err(|e| eyre!("Failed to initialise logging: {e}"))
}
