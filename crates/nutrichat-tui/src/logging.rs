use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to a file; the terminal belongs to the TUI while it runs.
pub fn init_file() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .context("Could not determine cache directory")?
        .join("nutrichat");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let path = dir.join("nutrichat.log");
    let file = File::create(&path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("nutrichat=info,nutrichat_core=info"))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(path)
}

/// Log to stderr for one-shot commands; quiet unless `RUST_LOG` says otherwise.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("nutrichat=warn,nutrichat_core=warn"))
        .with_writer(std::io::stderr)
        .init();
}
