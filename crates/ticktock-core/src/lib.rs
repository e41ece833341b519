//! # ticktock Core Library
//!
//! Core logic for the ticktock terminal stopwatch and countdown timer.
//!
//! ## Architecture
//!
//! - **Clock Source**: a background task that refreshes one shared "now"
//!   on a short fixed period
//! - **Engines**: pure stopwatch and timer state machines driven by that
//!   shared clock
//! - **Session**: the single lock-protected owner of clock and engine
//! - **Renderers**: background tasks that overwrite the current terminal
//!   line with elapsed or remaining time
//! - **Input**: a dedicated thread reading raw keystrokes from the terminal
//!
//! ## Key Components
//!
//! - [`Session`]: state owner exposing transitions and snapshots
//! - [`Runtime`]: spawns and shuts down the background tasks
//! - [`InputHandle`]: asynchronous access to the blocking key reader
//! - [`Config`]: application configuration

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod input;
pub mod notify;
pub mod render;
pub mod runtime;
pub mod session;
pub mod stopwatch;
pub mod timer;

pub use clock::{ManualTimeSource, SharedClock, SystemTimeSource, TimeSource};
pub use command::{Command, MenuChoice};
pub use config::Config;
pub use error::{ConfigError, DurationError, Error, InputError, NotifyError, Result};
pub use events::SessionEvent;
pub use input::{InputHandle, KeyReader, TerminalState};
pub use notify::Notifier;
pub use render::Renderer;
pub use runtime::{Runtime, Shutdown, TickPeriods};
pub use session::{DisplayHold, Frame, Mode, Session, Snapshot};
pub use stopwatch::{Stopwatch, StopwatchPhase};
pub use timer::{parse_duration, TimerEngine, TimerPhase};
