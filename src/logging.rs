use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::data_dir;
use crate::error::Result;

/// Installs the global subscriber, writing to `<data dir>/taskbuddy.log`.
///
/// The terminal belongs to the TUI, so nothing is logged to stderr.
/// `RUST_LOG` overrides the level picked from `verbose`.
pub fn init(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{default_level},taskbuddy={default_level}")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let dir = data_dir();
    fs::create_dir_all(&dir)?;
    let file = OpenOptions::new().create(true).append(true).open(dir.join("taskbuddy.log"))?;

    // a second init (tests, repeated calls) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
