//! Renderer task.
//!
//! Once per render period (or immediately after a reset) the renderer asks
//! the session for a [`Frame`](crate::session::Frame), then writes it as
//! `\r<text>` with no newline so each print replaces the last. The session
//! lock is released before any output or notifier call.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::notify::Notifier;
use crate::runtime::Shutdown;
use crate::session::Session;

pub struct Renderer<W> {
    session: Session,
    out: W,
    notifier: Arc<dyn Notifier>,
}

impl<W: Write> Renderer<W> {
    pub fn new(session: Session, out: W, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session,
            out,
            notifier,
        }
    }

    /// Render one frame. Returns `true` if the countdown expired on this
    /// tick.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output fails. Notifier failures
    /// are logged and do not count as errors.
    pub fn tick(&mut self) -> io::Result<bool> {
        let frame = self.session.next_frame();
        if let Some(text) = &frame.text {
            write!(self.out, "\r{text}")?;
            self.out.flush()?;
        }
        if frame.expired {
            info!("timer expired");
            if let Err(e) = self.notifier.notify() {
                warn!(error = %e, "expiry alert failed");
            }
        }
        Ok(frame.expired)
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

impl<W: Write + Send + 'static> Renderer<W> {
    /// Run the render loop until `shutdown` is raised.
    ///
    /// A failed write raises `shutdown` and ends the task with the error.
    pub fn spawn(mut self, period: Duration, shutdown: Shutdown) -> JoinHandle<io::Result<()>> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let session = self.session.clone();
            let mode = session.mode();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = session.changed() => {}
                    _ = shutdown.wait() => break,
                }
                if shutdown.is_raised() {
                    break;
                }
                if let Err(e) = self.tick() {
                    error!(error = %e, "failed to write display, stopping");
                    shutdown.raise();
                    return Err(e);
                }
            }
            // A reset right before quitting still gets its reprint.
            if session.snapshot().forced_print {
                if let Err(e) = self.tick() {
                    warn!(error = %e, "failed to write final frame");
                }
            }
            debug!(%mode, "renderer stopped");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::session::Mode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

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

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn notify(&self) -> Result<(), NotifyError> {
            Err(NotifyError::Bell(io::Error::new(io::ErrorKind::Other, "no bell")))
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn prints_in_place_without_newline() {
        let t0 = Instant::now();
        let session = Session::new(Mode::Stopwatch, t0);
        let notifier = Arc::new(CountingNotifier::default());
        let mut renderer = Renderer::new(session.clone(), Vec::new(), notifier);

        session.start();
        session.observe_time(t0 + Duration::from_millis(10));
        renderer.tick().unwrap();
        session.observe_time(t0 + Duration::from_millis(20));
        renderer.tick().unwrap();

        let out = String::from_utf8(renderer.into_output()).unwrap();
        assert_eq!(out, "\r00:00:00.010\r00:00:00.020");
    }

    #[test]
    fn nothing_printed_while_stopped() {
        let t0 = Instant::now();
        let session = Session::new(Mode::Stopwatch, t0);
        let notifier = Arc::new(CountingNotifier::default());
        let mut renderer = Renderer::new(session.clone(), Vec::new(), notifier);

        session.start();
        session.stop();
        session.observe_time(t0 + secs(5));
        renderer.tick().unwrap();

        assert!(renderer.into_output().is_empty());
    }

    #[test]
    fn notifier_fires_once_when_clock_jumps_past_end() {
        let t0 = Instant::now();
        let notifier = Arc::new(CountingNotifier::default());
        let session = Session::timer(secs(5), t0);
        let mut renderer = Renderer::new(session.clone(), Vec::new(), notifier.clone());

        session.start();
        session.observe_time(t0 + secs(6));
        session.observe_time(t0 + secs(7));
        assert!(renderer.tick().unwrap());
        session.observe_time(t0 + secs(8));
        assert!(!renderer.tick().unwrap());
        assert!(!renderer.tick().unwrap());

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
        let out = String::from_utf8(renderer.into_output()).unwrap();
        assert_eq!(out, "\r00:00:00");
    }

    #[test]
    fn notifier_failure_is_not_fatal() {
        let t0 = Instant::now();
        let session = Session::timer(secs(1), t0);
        let mut renderer = Renderer::new(session.clone(), Vec::new(), Arc::new(FailingNotifier));

        session.start();
        session.observe_time(t0 + secs(2));
        assert!(renderer.tick().unwrap());

        // Timer state is untouched by the failed alert.
        session.reset();
        assert!(renderer.tick().is_ok());
        assert!(session.start().is_some());
    }

    #[tokio::test]
    async fn spawned_renderer_stops_on_shutdown() {
        let session = Session::new(Mode::Stopwatch, Instant::now());
        let renderer = Renderer::new(session, io::sink(), Arc::new(CountingNotifier::default()));
        let shutdown = Shutdown::new();
        let handle = renderer.spawn(Duration::from_millis(5), shutdown.clone());

        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.raise();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("renderer did not stop")
            .unwrap()
            .unwrap();
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn write_failure_raises_shutdown_and_returns_error() {
        let session = Session::new(Mode::Stopwatch, Instant::now());
        session.start();
        let renderer = Renderer::new(session, ClosedPipe, Arc::new(CountingNotifier::default()));
        let shutdown = Shutdown::new();
        let handle = renderer.spawn(Duration::from_millis(5), shutdown.clone());

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("renderer did not stop")
            .unwrap();
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(shutdown.is_raised());
    }
}
