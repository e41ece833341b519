use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::format::{format_countdown, format_elapsed, format_remaining};

/// Every state change produced by a command is reported as an Event.
/// The command loop logs them; no-op transitions produce none.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StopwatchStarted {
        resumed: bool,
    },
    StopwatchStopped {
        elapsed: Duration,
    },
    StopwatchReset,
    TimerConfigured {
        duration: Duration,
    },
    TimerStarted {
        remaining: Duration,
        /// Wall-clock time the countdown is expected to reach zero.
        ends_at: DateTime<Local>,
    },
    TimerStopped {
        remaining: Duration,
    },
    TimerReset {
        duration: Duration,
    },
    TimerExpired,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StopwatchStarted { resumed: false } => write!(f, "stopwatch started"),
            Self::StopwatchStarted { resumed: true } => write!(f, "stopwatch resumed"),
            Self::StopwatchStopped { elapsed } => {
                write!(f, "stopwatch stopped at {}", format_elapsed(*elapsed))
            }
            Self::StopwatchReset => write!(f, "stopwatch reset"),
            Self::TimerConfigured { duration } => {
                write!(f, "timer set to {}", format_remaining(*duration))
            }
            Self::TimerStarted { remaining, ends_at } => write!(
                f,
                "timer running, {} left (ends {})",
                format_countdown(*remaining),
                ends_at.format("%H:%M:%S")
            ),
            Self::TimerStopped { remaining } => {
                write!(f, "timer stopped with {} left", format_countdown(*remaining))
            }
            Self::TimerReset { duration } => {
                write!(f, "timer reset to {}", format_remaining(*duration))
            }
            Self::TimerExpired => write!(f, "timer expired"),
        }
    }
}

/// Wall-clock estimate of when `remaining` runs out.
pub(crate) fn ends_at(remaining: Duration) -> DateTime<Local> {
    let now = Local::now();
    chrono::Duration::from_std(remaining)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(now)
}
