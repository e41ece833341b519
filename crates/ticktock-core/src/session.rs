//! The session: shared clock plus the one live engine, behind one lock.
//!
//! [`Session`] is a cheap-to-clone handle. Callers only see transitions
//! (`start`, `stop`, `reset`, `configure`), [`Session::snapshot`] and
//! [`Session::next_frame`]; the mutex is never exposed. Every method takes
//! the lock for the duration of a field access and releases it before
//! returning, so no lock is ever held across I/O or an `.await`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tracing::debug;

use crate::clock::SharedClock;
use crate::error::DurationError;
use crate::events::SessionEvent;
use crate::format::{format_countdown, format_elapsed, format_remaining};
use crate::stopwatch::Stopwatch;
use crate::timer::{parse_duration, TimerEngine, TimerPhase};

/// Which engine a session drives. Fixed for the lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Stopwatch,
    Timer,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopwatch => f.write_str("stopwatch"),
            Self::Timer => f.write_str("timer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Stopwatch(Stopwatch),
    Timer(TimerEngine),
}

/// A consistent copy of the whole session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub now: Instant,
    pub engine: Engine,
    /// A reprint requested by `reset` that no renderer has consumed yet.
    pub forced_print: bool,
}

impl Snapshot {
    pub fn mode(&self) -> Mode {
        match self.engine {
            Engine::Stopwatch(_) => Mode::Stopwatch,
            Engine::Timer(_) => Mode::Timer,
        }
    }

    /// Display text regardless of whether printing is enabled.
    pub fn display(&self) -> String {
        match &self.engine {
            Engine::Stopwatch(sw) => format_elapsed(sw.elapsed(self.now)),
            Engine::Timer(timer) => format_countdown(timer.remaining(self.now)),
        }
    }
}

/// What a renderer should do on one tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// Text to print in place, or `None` to leave the line alone.
    pub text: Option<String>,
    /// The countdown just expired: fire the notifier.
    pub expired: bool,
}

struct SessionState {
    clock: SharedClock,
    engine: Engine,
    forced_print: bool,
    display_held: bool,
}

struct Inner {
    state: Mutex<SessionState>,
    changed: Notify,
}

#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl Session {
    pub fn new(mode: Mode, now: Instant) -> Self {
        let engine = match mode {
            Mode::Stopwatch => Engine::Stopwatch(Stopwatch::new()),
            Mode::Timer => Engine::Timer(TimerEngine::default()),
        };
        Self::with_engine(engine, now)
    }

    /// A timer session pre-configured with `duration`.
    pub fn timer(duration: Duration, now: Instant) -> Self {
        Self::with_engine(Engine::Timer(TimerEngine::new(duration)), now)
    }

    fn with_engine(engine: Engine, now: Instant) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState {
                    clock: SharedClock::new(now),
                    engine,
                    forced_print: false,
                    display_held: false,
                }),
                changed: Notify::new(),
            }),
        }
    }

    // Every critical section leaves the state consistent, so a panic in
    // one cannot leave a half-applied transition behind.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.snapshot().mode()
    }

    pub fn now(&self) -> Instant {
        self.lock().clock.now()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot {
            now: state.clock.now(),
            engine: state.engine,
            forced_print: state.forced_print,
        }
    }

    /// The timer's phase at the shared clock, or `None` in stopwatch mode.
    pub fn timer_phase(&self) -> Option<TimerPhase> {
        let state = self.lock();
        match &state.engine {
            Engine::Timer(timer) => Some(timer.phase(state.clock.now())),
            Engine::Stopwatch(_) => None,
        }
    }

    /// Resolves after a transition asked for an immediate reprint.
    pub async fn changed(&self) {
        self.inner.changed.notified().await;
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Publish a new clock reading. Earlier readings are ignored.
    pub fn observe_time(&self, reading: Instant) {
        self.lock().clock.advance_to(reading);
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&self) -> Option<SessionEvent> {
        let mut state = self.lock();
        let now = state.clock.now();
        match &mut state.engine {
            Engine::Stopwatch(sw) => sw.start(now),
            Engine::Timer(timer) => timer.start(now),
        }
    }

    pub fn stop(&self) -> Option<SessionEvent> {
        let mut state = self.lock();
        let now = state.clock.now();
        match &mut state.engine {
            Engine::Stopwatch(sw) => sw.stop(now),
            Engine::Timer(timer) => timer.stop(now),
        }
    }

    /// Reset the engine and force one immediate reprint.
    pub fn reset(&self) -> Option<SessionEvent> {
        let event = {
            let mut state = self.lock();
            let event = match &mut state.engine {
                Engine::Stopwatch(sw) => sw.reset(),
                Engine::Timer(timer) => timer.reset(),
            };
            state.forced_print = true;
            event
        };
        self.inner.changed.notify_one();
        event
    }

    /// Set the timer duration. Returns `None` in stopwatch mode.
    pub fn configure(&self, duration: Duration) -> Option<SessionEvent> {
        match &mut self.lock().engine {
            Engine::Timer(timer) => timer.configure(duration),
            Engine::Stopwatch(_) => None,
        }
    }

    /// Parse `text` as `HH:MM:SS` and configure the timer with it.
    ///
    /// Malformed text leaves the configured duration untouched.
    pub fn configure_from_text(&self, text: &str) -> Result<Option<SessionEvent>, DurationError> {
        let duration = parse_duration(text)?;
        Ok(self.configure(duration))
    }

    /// Keep renderers off the terminal line until the hold is dropped.
    ///
    /// Expiry is still detected while held; only the text is withheld.
    pub fn hold_display(&self) -> DisplayHold {
        self.lock().display_held = true;
        DisplayHold {
            session: self.clone(),
        }
    }

    /// Compute what a renderer prints on this tick.
    ///
    /// Consumes a pending forced reprint and, in timer mode, latches the
    /// one-shot expiry flag, all under a single lock acquisition.
    pub fn next_frame(&self) -> Frame {
        let mut state = self.lock();
        let now = state.clock.now();
        let forced = std::mem::take(&mut state.forced_print);

        let mut frame = match &mut state.engine {
            Engine::Stopwatch(sw) => {
                let text = if forced || sw.is_active() {
                    Some(format_elapsed(sw.elapsed(now)))
                } else {
                    None
                };
                Frame {
                    text,
                    expired: false,
                }
            }
            Engine::Timer(timer) => {
                if forced {
                    Frame {
                        text: Some(format_remaining(timer.configured_duration())),
                        expired: false,
                    }
                } else if timer.check_expiry(now) {
                    debug!("countdown reached zero");
                    Frame {
                        text: Some(format_remaining(Duration::ZERO)),
                        expired: true,
                    }
                } else {
                    let counting = timer.is_active() && !timer.expired_notified();
                    Frame {
                        text: counting.then(|| format_countdown(timer.remaining(now))),
                        expired: false,
                    }
                }
            }
        };
        if state.display_held {
            // A withheld reprint is still owed once the hold ends.
            state.forced_print |= forced;
            frame.text = None;
        }
        frame
    }
}

/// Returned by [`Session::hold_display`]; printing resumes when dropped.
#[must_use = "printing resumes as soon as the hold is dropped"]
pub struct DisplayHold {
    session: Session,
}

impl Drop for DisplayHold {
    fn drop(&mut self) {
        self.session.lock().display_held = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn mode_is_fixed_at_creation() {
        let t0 = Instant::now();
        assert_eq!(Session::new(Mode::Stopwatch, t0).mode(), Mode::Stopwatch);
        assert_eq!(Session::new(Mode::Timer, t0).mode(), Mode::Timer);
        assert_eq!(Session::timer(secs(5), t0).mode(), Mode::Timer);
    }

    #[test]
    fn transitions_use_shared_clock() {
        let t0 = Instant::now();
        let session = Session::new(Mode::Stopwatch, t0);
        session.start();
        session.observe_time(t0 + secs(3));

        let snap = session.snapshot();
        assert_eq!(snap.display(), "00:00:03.000");
    }

    #[test]
    fn timer_phase_follows_clock() {
        let t0 = Instant::now();
        assert_eq!(Session::new(Mode::Stopwatch, t0).timer_phase(), None);

        let session = Session::new(Mode::Timer, t0);
        assert_eq!(session.timer_phase(), Some(TimerPhase::Unconfigured));
        session.configure(secs(5));
        session.start();
        assert_eq!(session.timer_phase(), Some(TimerPhase::Running));
        session.observe_time(t0 + secs(5));
        assert_eq!(session.timer_phase(), Some(TimerPhase::Expired));
    }

    #[test]
    fn configure_is_ignored_in_stopwatch_mode() {
        let session = Session::new(Mode::Stopwatch, Instant::now());
        assert!(session.configure(secs(10)).is_none());
    }

    #[test]
    fn stopwatch_frames_follow_active_flag() {
        let t0 = Instant::now();
        let session = Session::new(Mode::Stopwatch, t0);
        assert_eq!(session.next_frame().text, None);

        session.start();
        session.observe_time(t0 + Duration::from_millis(1_500));
        assert_eq!(session.next_frame().text.as_deref(), Some("00:00:01.500"));

        session.stop();
        assert_eq!(session.next_frame().text, None);
    }

    #[test]
    fn stopwatch_reset_forces_one_zero_frame() {
        let t0 = Instant::now();
        let session = Session::new(Mode::Stopwatch, t0);
        session.start();
        session.observe_time(t0 + secs(42));
        session.reset();

        assert_eq!(session.next_frame().text.as_deref(), Some("00:00:00.000"));
        assert_eq!(session.next_frame().text, None);
    }

    #[test]
    fn timer_reset_reprints_configured_duration() {
        let t0 = Instant::now();
        let session = Session::timer(secs(90), t0);
        session.start();
        session.observe_time(t0 + secs(30));
        session.reset();

        assert_eq!(session.next_frame().text.as_deref(), Some("00:01:30"));
        assert_eq!(session.next_frame().text, None);
    }

    #[test]
    fn timer_expiry_frame_fires_once() {
        let t0 = Instant::now();
        let session = Session::timer(secs(2), t0);
        session.start();

        session.observe_time(t0 + secs(1));
        let frame = session.next_frame();
        assert_eq!(frame.text.as_deref(), Some("00:00:01"));
        assert!(!frame.expired);

        session.observe_time(t0 + secs(3));
        session.observe_time(t0 + secs(4));
        let frame = session.next_frame();
        assert_eq!(frame.text.as_deref(), Some("00:00:00"));
        assert!(frame.expired);

        assert_eq!(session.next_frame(), Frame::default());
    }

    #[test]
    fn configure_from_text_rejects_malformed_input() {
        let session = Session::timer(secs(90), Instant::now());
        for text in ["12:3", "ab:cd:ef", "", "1:2:3:4"] {
            assert!(session.configure_from_text(text).is_err(), "{text}");
        }
        assert_eq!(session.timer_phase(), Some(TimerPhase::Idle));
        assert_eq!(session.next_frame().text, None);
        session.reset();
        assert_eq!(session.next_frame().text.as_deref(), Some("00:01:30"));

        assert!(session.configure_from_text("00:00:09").unwrap().is_some());
        session.reset();
        assert_eq!(session.next_frame().text.as_deref(), Some("00:00:09"));
    }

    #[test]
    fn held_display_withholds_text_but_not_expiry() {
        let t0 = Instant::now();
        let session = Session::timer(secs(2), t0);
        session.start();

        let hold = session.hold_display();
        session.observe_time(t0 + secs(1));
        assert_eq!(session.next_frame().text, None);
        session.observe_time(t0 + secs(2));
        assert_eq!(
            session.next_frame(),
            Frame {
                text: None,
                expired: true,
            }
        );
        drop(hold);

        session.reset();
        assert_eq!(session.next_frame().text.as_deref(), Some("00:00:02"));
    }

    #[test]
    fn clock_readings_never_go_backwards() {
        let t0 = Instant::now();
        let session = Session::new(Mode::Timer, t0 + secs(10));
        session.observe_time(t0);
        assert_eq!(session.now(), t0 + secs(10));
    }
}
