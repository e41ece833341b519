//! Stopwatch engine.
//!
//! Pure state machine: every transition takes the current shared clock
//! reading as an argument and never looks at the system clock itself.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --stop--> Paused --start--> Running
//!   ^                                  |
//!   +--------------reset---------------+
//! ```
//!
//! `stop` only suppresses display. The start mark is kept, so elapsed time
//! keeps advancing while paused and a resume picks up the original mark.

use std::time::{Duration, Instant};

use crate::events::SessionEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchPhase {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stopwatch {
    /// `None` means never started since the last reset.
    start_mark: Option<Instant>,
    active: bool,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> StopwatchPhase {
        match (self.start_mark, self.active) {
            (None, _) => StopwatchPhase::Idle,
            (Some(_), true) => StopwatchPhase::Running,
            (Some(_), false) => StopwatchPhase::Paused,
        }
    }

    pub fn start_mark(&self) -> Option<Instant> {
        self.start_mark
    }

    /// Whether the renderer should print.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.start_mark
            .map(|mark| now.saturating_duration_since(mark))
            .unwrap_or_default()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: Instant) -> Option<SessionEvent> {
        match self.phase() {
            StopwatchPhase::Idle => {
                self.start_mark = Some(now);
                self.active = true;
                Some(SessionEvent::StopwatchStarted { resumed: false })
            }
            StopwatchPhase::Paused => {
                self.active = true;
                Some(SessionEvent::StopwatchStarted { resumed: true })
            }
            StopwatchPhase::Running => None,
        }
    }

    pub fn stop(&mut self, now: Instant) -> Option<SessionEvent> {
        let was_running = self.phase() == StopwatchPhase::Running;
        self.active = false;
        was_running.then(|| SessionEvent::StopwatchStopped {
            elapsed: self.elapsed(now),
        })
    }

    pub fn reset(&mut self) -> Option<SessionEvent> {
        self.start_mark = None;
        self.active = false;
        Some(SessionEvent::StopwatchReset)
    }
}
