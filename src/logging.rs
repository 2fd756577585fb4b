use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};

/// Environment variable holding a `tracing_subscriber::EnvFilter` directive.
pub(crate) const LOG_ENV: &str = "SPENDLENS_LOG";

static TRACING_INIT: Once = Once::new();

/// Send `tracing` output to `log_path`, appending. The terminal belongs to the
/// TUI, so nothing is written to stdout or stderr.
///
/// `SPENDLENS_LOG` wins over `default_level` when it is set and parses.
pub(crate) fn init(log_path: &Path, default_level: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(default_level)));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .try_init();
    });
    Ok(())
}

fn default_directive(level: &str) -> String {
    format!("{}={}", env!("CARGO_PKG_NAME"), level.to_lowercase())
}
