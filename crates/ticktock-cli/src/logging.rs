use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::Mutex;

use ticktock_core::config::LogConfig;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "TICKTOCK_LOG";

/// Install the global subscriber.
///
/// `TICKTOCK_LOG` wins over the configured level. Diagnostics go to stderr
/// unless a log file is configured, in which case they are appended there
/// so they never interleave with the in-place display.
pub fn init(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| e.to_string())?;
        }
        None => {
            builder
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}
