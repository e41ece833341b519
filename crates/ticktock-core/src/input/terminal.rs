//! Terminal mode handling for stdin.
//!
//! [`RawModeGuard`] switches stdin to uncooked single-byte mode (no line
//! buffering, no echo, `VMIN = 1`, `VTIME = 0`) and puts the previous mode
//! back when dropped. Signal generation stays on so Ctrl+C still
//! interrupts; callers that handle it restore the mode with a
//! [`TerminalState`] captured up front.

use tracing::warn;

use crate::error::InputError;

#[cfg(unix)]
mod imp {
    use std::io;

    use nix::sys::termios::{self, LocalFlags, SetArg, SpecialCharacterIndices, Termios};

    use crate::error::InputError;

    #[derive(Clone)]
    pub struct TerminalState {
        saved: Termios,
    }

    impl TerminalState {
        pub fn capture() -> Result<Self, InputError> {
            let saved = termios::tcgetattr(io::stdin()).map_err(|e| InputError::TerminalMode {
                action: "read",
                message: e.to_string(),
            })?;
            Ok(Self { saved })
        }

        pub fn restore(&self) -> Result<(), InputError> {
            termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &self.saved).map_err(|e| {
                InputError::TerminalMode {
                    action: "restore",
                    message: e.to_string(),
                }
            })
        }

        pub fn apply_raw(&self) -> Result<(), InputError> {
            let mut raw = self.saved.clone();
            raw.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
            raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
            raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
            termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &raw).map_err(|e| {
                InputError::TerminalMode {
                    action: "set",
                    message: e.to_string(),
                }
            })
        }
    }
}

// Without termios the terminal stays line-buffered: keys arrive after Enter.
#[cfg(not(unix))]
mod imp {
    use crate::error::InputError;

    #[derive(Clone)]
    pub struct TerminalState;

    impl TerminalState {
        pub fn capture() -> Result<Self, InputError> {
            Ok(Self)
        }

        pub fn restore(&self) -> Result<(), InputError> {
            Ok(())
        }

        pub fn apply_raw(&self) -> Result<(), InputError> {
            Ok(())
        }
    }
}

/// The stdin terminal mode at some point in time.
#[derive(Clone)]
pub struct TerminalState(imp::TerminalState);

impl TerminalState {
    pub fn capture() -> Result<Self, InputError> {
        imp::TerminalState::capture().map(Self)
    }

    pub fn restore(&self) -> Result<(), InputError> {
        self.0.restore()
    }
}

/// Holds stdin in raw mode until dropped.
pub struct RawModeGuard {
    saved: Option<TerminalState>,
}

impl RawModeGuard {
    /// Capture the current mode, then switch to raw mode.
    pub fn enter() -> Result<Self, InputError> {
        let saved = TerminalState::capture()?;
        saved.0.apply_raw()?;
        Ok(Self { saved: Some(saved) })
    }

    /// A guard that changes nothing, for input that is not a terminal.
    pub fn inactive() -> Self {
        Self { saved: None }
    }

    pub fn is_active(&self) -> bool {
        self.saved.is_some()
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            if let Err(e) = saved.restore() {
                warn!(error = %e, "failed to restore terminal mode");
            }
        }
    }
}
