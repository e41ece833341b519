//! Session-level behaviour: engines driven through the shared clock.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ticktock_core::error::NotifyError;
use ticktock_core::session::Engine;
use ticktock_core::{Mode, Notifier, Renderer, Session, StopwatchPhase, TimerPhase};

const TICK: Duration = Duration::from_millis(30);

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[derive(Default)]
struct CountingNotifier {
    calls: AtomicUsize,
}

impl Notifier for CountingNotifier {
    fn notify(&self) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn stopwatch(session: &Session) -> ticktock_core::Stopwatch {
    match session.snapshot().engine {
        Engine::Stopwatch(sw) => sw,
        Engine::Timer(_) => panic!("expected stopwatch session"),
    }
}

fn timer(session: &Session) -> ticktock_core::TimerEngine {
    match session.snapshot().engine {
        Engine::Timer(timer) => timer,
        Engine::Stopwatch(_) => panic!("expected timer session"),
    }
}

#[test]
fn stopwatch_elapsed_survives_stop_resume_cycles() {
    let t0 = Instant::now();
    let session = Session::new(Mode::Stopwatch, t0);
    session.start();

    // Clock readings land on tick boundaries, so the stop can see a value
    // up to one tick stale.
    for i in 1..=5u32 {
        session.observe_time(t0 + secs(2) * i - TICK);
        session.stop();
        session.observe_time(t0 + secs(2) * i);
        session.start();
    }
    session.observe_time(t0 + secs(11) - TICK);
    session.stop();

    let sw = stopwatch(&session);
    assert_eq!(sw.phase(), StopwatchPhase::Paused);
    let elapsed = sw.elapsed(session.now());
    assert!(elapsed <= secs(11) && secs(11) - elapsed <= TICK, "{elapsed:?}");
}

#[test]
fn stopwatch_reset_displays_zero_then_counts_from_fresh_mark() {
    let t0 = Instant::now();
    let session = Session::new(Mode::Stopwatch, t0);
    session.start();
    session.observe_time(t0 + secs(100));
    session.reset();

    assert_eq!(session.next_frame().text.as_deref(), Some("00:00:00.000"));

    session.observe_time(t0 + secs(200));
    session.start();
    session.observe_time(t0 + secs(203));
    assert_eq!(session.snapshot().display(), "00:00:03.000");
}

#[test]
fn timer_stop_records_remaining_time() {
    let t0 = Instant::now();
    let session = Session::new(Mode::Timer, t0);
    session.configure(secs(60));
    session.start();

    session.observe_time(t0 + secs(25));
    session.stop();

    assert_eq!(timer(&session).remaining_on_pause(), secs(35));
    assert_eq!(timer(&session).phase(session.now()), TimerPhase::Idle);
}

#[test]
fn timer_resume_uses_remaining_not_configured() {
    let t0 = Instant::now();
    let session = Session::new(Mode::Timer, t0);
    session.configure(secs(60));
    session.start();
    session.observe_time(t0 + secs(25));
    session.stop();

    session.observe_time(t0 + secs(1000));
    session.start();
    assert_eq!(timer(&session).end_mark(), Some(t0 + secs(1035)));
    assert_eq!(session.snapshot().display(), "00:00:35");
}

#[test]
fn expiry_notifies_exactly_once_per_start() {
    let t0 = Instant::now();
    let notifier = Arc::new(CountingNotifier::default());
    let session = Session::timer(secs(10), t0);
    let mut renderer = Renderer::new(session.clone(), std::io::sink(), notifier.clone());

    session.start();
    session.observe_time(t0 + secs(11));
    session.observe_time(t0 + secs(12));
    renderer.tick().unwrap();
    renderer.tick().unwrap();
    assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);

    // A new start cycle may notify again.
    session.start();
    session.observe_time(t0 + secs(23));
    renderer.tick().unwrap();
    renderer.tick().unwrap();
    assert_eq!(notifier.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn malformed_duration_leaves_configuration_alone() {
    let t0 = Instant::now();
    let session = Session::timer(secs(90), t0);
    session.start();
    session.observe_time(t0 + secs(10));
    let before = timer(&session);

    for text in ["12:3", "ab:cd:ef", "", "1:2:3:4", "2562047788015216:00:00"] {
        assert!(session.configure_from_text(text).is_err(), "{text}");
    }
    assert_eq!(timer(&session), before);
    assert_eq!(timer(&session).configured_duration(), secs(90));
    assert_eq!(session.timer_phase(), Some(TimerPhase::Running));
}

#[test]
fn snapshots_are_never_torn() {
    let t0 = Instant::now();
    let session = Session::timer(secs(30), t0);
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let session = session.clone();
        let done = done.clone();
        thread::spawn(move || {
            for i in 0..5_000u64 {
                session.observe_time(t0 + Duration::from_millis(i));
                session.start();
                if i % 3 == 0 {
                    session.stop();
                }
                session.reset();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let session = session.clone();
            let done = done.clone();
            thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    let timer = match session.snapshot().engine {
                        Engine::Timer(timer) => timer,
                        Engine::Stopwatch(_) => unreachable!(),
                    };
                    // start sets both, stop and reset clear both.
                    assert_eq!(timer.end_mark().is_some(), timer.is_active());
                    if timer.end_mark().is_some() {
                        assert!(timer.remaining_on_pause().is_zero());
                    }
                    let _ = session.next_frame();
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}
