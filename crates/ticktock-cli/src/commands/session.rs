//! The interactive command loop.
//!
//! Mode selection happens once, then every accepted key maps to one
//! transition on the session while the clock and renderer tasks keep
//! running in the background.

use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ticktock_core::{
    notify, Command, Config, InputError, InputHandle, KeyReader, MenuChoice, Mode, Renderer,
    Runtime, Session, SessionEvent, Shutdown, SystemTimeSource, TerminalState, TickPeriods,
    TimerPhase,
};
use tracing::{debug, info, warn};

/// What the command line already decided.
#[derive(Debug, Default)]
pub struct Launch {
    pub mode: Option<Mode>,
    pub duration: Option<Duration>,
}

pub async fn run(config: &Config, launch: Launch) -> Result<(), Box<dyn std::error::Error>> {
    // Raw mode is held by the input thread, which may still be blocked in
    // a read when we leave; put the terminal back ourselves on every exit.
    // Absent when stdin is not a terminal.
    let terminal = TerminalState::capture().ok();
    let result = drive(config, launch).await;
    restore_terminal(terminal.as_ref());
    result
}

async fn drive(config: &Config, launch: Launch) -> Result<(), Box<dyn std::error::Error>> {
    let interrupted = watch_ctrl_c();
    let mut input = InputHandle::spawn(KeyReader::stdin())?;

    let mode = match launch.mode {
        Some(mode) => mode,
        None => match choose_mode(&mut input, &interrupted).await? {
            Some(mode) => mode,
            None => return Ok(()),
        },
    };
    info!(%mode, "session started");

    let session = match (mode, launch.duration.or(config.default_duration()?)) {
        (Mode::Timer, Some(duration)) => Session::timer(duration, Instant::now()),
        (mode, _) => Session::new(mode, Instant::now()),
    };
    let renderer = Renderer::new(
        session.clone(),
        io::stdout(),
        notify::from_config(&config.notify),
    );
    let runtime = Runtime::start(
        &session,
        Arc::new(SystemTimeSource),
        renderer,
        TickPeriods::from(config),
    );

    let signals = Signals {
        interrupted,
        background: runtime.shutdown_signal(),
    };
    let result: Result<(), Box<dyn std::error::Error>> = match print_keys(mode) {
        Ok(()) => dispatch(&session, &mut input, &signals).await.map_err(Into::into),
        Err(e) => Err(e.into()),
    };

    // A display write failure outranks whatever ended the loop.
    runtime.shutdown().await?;
    if let Err(e) = writeln!(io::stdout()) {
        warn!(error = %e, "failed to finish the display line");
    }
    result
}

/// Raised when Ctrl+C arrives.
fn watch_ctrl_c() -> Shutdown {
    let interrupted = Shutdown::new();
    let signal = interrupted.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted");
            signal.raise();
        }
    });
    interrupted
}

fn restore_terminal(terminal: Option<&TerminalState>) {
    if let Some(Err(e)) = terminal.map(TerminalState::restore) {
        warn!(error = %e, "failed to restore terminal mode");
    }
}

/// Either of these ends the command loop.
struct Signals {
    interrupted: Shutdown,
    /// Raised by a background task that cannot continue.
    background: Shutdown,
}

impl Signals {
    /// Await `input`, or `None` as soon as either signal is raised.
    async fn race<T>(
        &self,
        input: impl Future<Output = Result<T, InputError>>,
    ) -> Result<Option<T>, InputError> {
        tokio::select! {
            value = input => value.map(Some),
            _ = self.interrupted.wait() => Ok(None),
            _ = self.background.wait() => Ok(None),
        }
    }
}

async fn choose_mode(
    input: &mut InputHandle,
    interrupted: &Shutdown,
) -> Result<Option<Mode>, Box<dyn std::error::Error>> {
    println_fallible("[s] stopwatch  [t] timer  [q] quit")?;
    let key = tokio::select! {
        key = input.key(MenuChoice::KEYS) => key?,
        _ = interrupted.wait() => return Ok(None),
    };
    Ok(match MenuChoice::from_key(key) {
        Some(MenuChoice::Mode(mode)) => Some(mode),
        Some(MenuChoice::Quit) | None => None,
    })
}

fn print_keys(mode: Mode) -> io::Result<()> {
    println_fallible(match mode {
        Mode::Stopwatch => "[s] start  [e] stop  [r] reset  [q] quit",
        Mode::Timer => "[u] set duration  [s] start  [e] stop  [r] reset  [q] quit",
    })
}

// `println!` panics when stdout is gone.
fn println_fallible(line: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{line}")?;
    out.flush()
}

async fn dispatch(
    session: &Session,
    input: &mut InputHandle,
    signals: &Signals,
) -> Result<(), InputError> {
    let mode = session.mode();
    loop {
        let Some(key) = signals.race(input.key(Command::keys(mode))).await? else {
            return Ok(());
        };
        let Some(command) = Command::from_key(mode, key) else {
            continue;
        };
        debug!(?command, "dispatch");

        match command {
            Command::Quit => {
                info!("quit requested");
                return Ok(());
            }
            Command::SetDuration => {
                if !set_duration(session, input, signals).await? {
                    return Ok(());
                }
            }
            Command::Start if session.timer_phase() == Some(TimerPhase::Unconfigured) => {
                warn!("timer has no duration yet, press u to set one");
            }
            command => report(command.apply(session)),
        }
    }
}

/// Prompt for and apply a new duration. Returns `false` if a signal ended
/// the prompt.
async fn set_duration(
    session: &Session,
    input: &mut InputHandle,
    signals: &Signals,
) -> Result<bool, InputError> {
    // Keep the countdown off the prompt line while the user types.
    let _hold = session.hold_display();
    let mut out = io::stdout();
    // The prompt is cosmetic; a failed write must not end the session.
    let _ = write!(out, "\r\nduration (HH:MM:SS): ").and_then(|()| out.flush());

    let Some(text) = signals.race(input.line()).await? else {
        return Ok(false);
    };
    match session.configure_from_text(&text) {
        Ok(event) => report(event),
        Err(e) => warn!(input = %text, error = %e, "rejected duration"),
    }
    Ok(true)
}

fn report(event: Option<SessionEvent>) {
    match event {
        Some(event) => info!(%event, "state changed"),
        None => debug!("command had no effect"),
    }
}
