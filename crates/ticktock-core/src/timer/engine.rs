//! Countdown timer engine.
//!
//! Like the stopwatch, the engine never reads the system clock: every
//! transition is handed the shared clock reading. The renderer calls
//! [`TimerEngine::check_expiry`] on each tick to learn when to fire the
//! notifier.
//!
//! ## State Transitions
//!
//! ```text
//! Unconfigured --configure--> Idle --start--> Running --stop--> Idle
//!                                               |
//!                                        (clock passes end)
//!                                               v
//!                               Expired --start/reset--> Running/Idle
//! ```

use std::time::{Duration, Instant};

use tracing::warn;

use crate::events::{self, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Unconfigured,
    Idle,
    Running,
    Expired,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerEngine {
    configured_duration: Duration,
    /// `None` means not counting down.
    end_mark: Option<Instant>,
    /// Leftover countdown carried across a stop/start cycle.
    remaining_on_pause: Duration,
    active: bool,
    expired_notified: bool,
}

impl TimerEngine {
    pub fn new(duration: Duration) -> Self {
        Self {
            configured_duration: duration,
            ..Self::default()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self, now: Instant) -> TimerPhase {
        match self.end_mark {
            Some(end) if now >= end => TimerPhase::Expired,
            Some(_) => TimerPhase::Running,
            None if self.configured_duration.is_zero() && self.remaining_on_pause.is_zero() => {
                TimerPhase::Unconfigured
            }
            None => TimerPhase::Idle,
        }
    }

    pub fn configured_duration(&self) -> Duration {
        self.configured_duration
    }

    pub fn end_mark(&self) -> Option<Instant> {
        self.end_mark
    }

    pub fn remaining_on_pause(&self) -> Duration {
        self.remaining_on_pause
    }

    /// Whether the renderer should print.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn expired_notified(&self) -> bool {
        self.expired_notified
    }

    /// Time left on the countdown, or what a `start` would count down from.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.end_mark {
            Some(end) => end.saturating_duration_since(now),
            None if !self.remaining_on_pause.is_zero() => self.remaining_on_pause,
            None => self.configured_duration,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Sets the duration used by the next fresh start. A countdown in
    /// progress is left alone.
    pub fn configure(&mut self, duration: Duration) -> Option<SessionEvent> {
        self.configured_duration = duration;
        Some(SessionEvent::TimerConfigured { duration })
    }

    pub fn start(&mut self, now: Instant) -> Option<SessionEvent> {
        match self.phase(now) {
            TimerPhase::Running => return None,
            TimerPhase::Unconfigured => return None,
            TimerPhase::Idle | TimerPhase::Expired => {}
        }

        let countdown = if !self.remaining_on_pause.is_zero() {
            self.remaining_on_pause
        } else if self.configured_duration.is_zero() {
            return None;
        } else {
            self.configured_duration
        };
        let Some(end) = now.checked_add(countdown) else {
            warn!(?countdown, "countdown end is not representable, not starting");
            return None;
        };

        self.end_mark = Some(end);
        self.remaining_on_pause = Duration::ZERO;
        self.active = true;
        self.expired_notified = false;
        Some(SessionEvent::TimerStarted {
            remaining: countdown,
            ends_at: events::ends_at(countdown),
        })
    }

    pub fn stop(&mut self, now: Instant) -> Option<SessionEvent> {
        self.active = false;
        let end = self.end_mark.take()?;
        self.remaining_on_pause = end.saturating_duration_since(now);
        Some(SessionEvent::TimerStopped {
            remaining: self.remaining_on_pause,
        })
    }

    pub fn reset(&mut self) -> Option<SessionEvent> {
        self.end_mark = None;
        self.remaining_on_pause = Duration::ZERO;
        self.active = false;
        self.expired_notified = false;
        Some(SessionEvent::TimerReset {
            duration: self.configured_duration,
        })
    }

    /// Returns `true` exactly once per start cycle, the first time it is
    /// called with `now` at or past the end mark.
    pub fn check_expiry(&mut self, now: Instant) -> bool {
        if !self.active || self.expired_notified {
            return false;
        }
        if self.phase(now) != TimerPhase::Expired {
            return false;
        }
        self.expired_notified = true;
        true
    }
}
