mod reader;
mod task;
mod terminal;

pub use reader::KeyReader;
pub use task::{InputEvent, InputHandle, InputRequest};
pub use terminal::{RawModeGuard, TerminalState};
