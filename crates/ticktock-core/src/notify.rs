//! Expiry notifier.
//!
//! The renderer calls [`Notifier::notify`] once when a countdown reaches
//! zero. Implementations must not block for long: the call happens on a
//! renderer tick.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::NotifyConfig;
use crate::error::NotifyError;

pub trait Notifier: Send + Sync {
    fn notify(&self) -> Result<(), NotifyError>;
}

/// Rings the terminal bell (ASCII BEL on stdout).
#[derive(Debug, Clone, Copy, Default)]
pub struct BellNotifier;

impl Notifier for BellNotifier {
    fn notify(&self) -> Result<(), NotifyError> {
        let mut out = std::io::stdout().lock();
        out.write_all(b"\x07").map_err(NotifyError::Bell)?;
        out.flush().map_err(NotifyError::Bell)
    }
}

/// Launches an external program, e.g. a sound player.
///
/// The child is reaped on a detached thread so `notify` returns as soon as
/// the program has been spawned.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self) -> Result<(), NotifyError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| NotifyError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let program = self.program.clone();
        std::thread::spawn(move || match child.wait() {
            Ok(status) if status.success() => debug!(%program, "alert command finished"),
            Ok(status) => warn!(%program, %status, "alert command exited unsuccessfully"),
            Err(e) => warn!(%program, error = %e, "failed to wait for alert command"),
        });
        Ok(())
    }
}

/// Does nothing. Used when alerts are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Build the notifier described by the `[notify]` config section.
pub fn from_config(config: &NotifyConfig) -> Arc<dyn Notifier> {
    if !config.enabled {
        return Arc::new(SilentNotifier);
    }
    match config.command.split_first() {
        Some((program, args)) => Arc::new(CommandNotifier::new(program.clone(), args.to_vec())),
        None => Arc::new(BellNotifier),
    }
}
