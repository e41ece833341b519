//! Keystroke to command mapping.
//!
//! | mode      | keys                                                 |
//! |-----------|------------------------------------------------------|
//! | menu      | `s` stopwatch, `t` timer, `q` quit                   |
//! | stopwatch | `s` start, `e` stop, `r` reset, `q` quit             |
//! | timer     | `u` set duration, `s` start, `e` stop, `r` reset, `q` quit |

use crate::events::SessionEvent;
use crate::session::{Mode, Session};

/// Choice made at the top-level prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Mode(Mode),
    Quit,
}

impl MenuChoice {
    pub const KEYS: &'static [char] = &['s', 't', 'q'];

    pub fn from_key(key: char) -> Option<Self> {
        match key {
            's' => Some(Self::Mode(Mode::Stopwatch)),
            't' => Some(Self::Mode(Mode::Timer)),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }
}

/// One in-session command. Each maps to exactly one transition or to
/// termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Reset,
    /// Prompt for a new `HH:MM:SS` duration. Timer mode only.
    SetDuration,
    Quit,
}

const STOPWATCH_KEYS: &[char] = &['s', 'e', 'r', 'q'];
const TIMER_KEYS: &[char] = &['u', 's', 'e', 'r', 'q'];

impl Command {
    /// The accepted-key set for `mode`.
    pub fn keys(mode: Mode) -> &'static [char] {
        match mode {
            Mode::Stopwatch => STOPWATCH_KEYS,
            Mode::Timer => TIMER_KEYS,
        }
    }

    pub fn from_key(mode: Mode, key: char) -> Option<Self> {
        match (mode, key) {
            (_, 's') => Some(Self::Start),
            (_, 'e') => Some(Self::Stop),
            (_, 'r') => Some(Self::Reset),
            (_, 'q') => Some(Self::Quit),
            (Mode::Timer, 'u') => Some(Self::SetDuration),
            _ => None,
        }
    }

    /// Apply a state transition to `session`.
    ///
    /// `SetDuration` and `Quit` need the caller's help (more input, or
    /// shutdown) and are no-ops here.
    pub fn apply(self, session: &Session) -> Option<SessionEvent> {
        match self {
            Self::Start => session.start(),
            Self::Stop => session.stop(),
            Self::Reset => session.reset(),
            Self::SetDuration | Self::Quit => None,
        }
    }
}
