//! Background tasks and their shutdown.
//!
//! A [`Runtime`] owns the clock source and renderer tasks for one session.
//! Both run until the [`Shutdown`] signal is raised, which they observe at
//! their next tick boundary at the latest.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::clock::TimeSource;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::session::Session;

#[derive(Default)]
struct ShutdownInner {
    raised: AtomicBool,
    notify: Notify,
}

/// One-shot cancellation signal shared by every background task.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<ShutdownInner>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Only the first call has any effect.
    pub fn raise(&self) {
        if !self.inner.raised.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_raised(&self) -> bool {
        self.inner.raised.load(Ordering::SeqCst)
    }

    /// Resolves once the signal has been raised.
    pub async fn wait(&self) {
        loop {
            // Register before checking the flag so a concurrent `raise`
            // cannot slip between the two.
            let notified = self.inner.notify.notified();
            if self.is_raised() {
                return;
            }
            notified.await;
        }
    }
}

/// Clock source and renderer periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPeriods {
    pub clock: Duration,
    pub render: Duration,
}

impl Default for TickPeriods {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for TickPeriods {
    fn from(config: &Config) -> Self {
        Self {
            clock: config.clock_period(),
            render: config.render_period(),
        }
    }
}

/// Refresh the session clock from `source` every `period`.
pub fn spawn_clock_source(
    session: Session,
    source: Arc<dyn TimeSource>,
    period: Duration,
    shutdown: Shutdown,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.wait() => break,
            }
            session.observe_time(source.now());
        }
        debug!("clock source stopped");
    })
}

pub struct Runtime {
    shutdown: Shutdown,
    clock: JoinHandle<()>,
    renderer: JoinHandle<io::Result<()>>,
}

impl Runtime {
    /// Spawn the clock source and `renderer` for `session`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<W>(
        session: &Session,
        source: Arc<dyn TimeSource>,
        renderer: Renderer<W>,
        periods: TickPeriods,
    ) -> Self
    where
        W: Write + Send + 'static,
    {
        let shutdown = Shutdown::new();
        // Publish a first reading before anything can observe the clock.
        session.observe_time(source.now());

        let clock = spawn_clock_source(session.clone(), source, periods.clock, shutdown.clone());
        let renderer = renderer.spawn(periods.render, shutdown.clone());
        debug!(
            mode = %session.mode(),
            clock_ms = periods.clock.as_millis() as u64,
            render_ms = periods.render.as_millis() as u64,
            "background tasks started"
        );

        Self {
            shutdown,
            clock,
            renderer,
        }
    }

    /// A handle that can raise the shutdown signal from elsewhere.
    pub fn shutdown_signal(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Raise the shutdown signal and wait for every task to finish.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the renderer stopped because it could
    /// not write the display.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown.raise();
        if let Err(e) = self.clock.await {
            warn!(task = "clock", error = %e, "background task ended abnormally");
        }
        match self.renderer.await {
            Ok(written) => written.map_err(Error::Render),
            Err(e) => {
                warn!(task = "renderer", error = %e, "background task ended abnormally");
                Ok(())
            }
        }
    }
}
