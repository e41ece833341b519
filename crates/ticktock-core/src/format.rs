//! Display formatting for elapsed and remaining time.
//!
//! Fields come from successive modulo reduction of the total, so the hour
//! field is unbounded and every other field wraps.

use std::time::Duration;

/// `HH:MM:SS.mmm`, used by the stopwatch.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// `HH:MM:SS`, used by the timer. Sub-second remainders are dropped.
pub fn format_remaining(remaining: Duration) -> String {
    let total_secs = remaining.as_secs();
    let hours = total_secs / 3_600;
    let minutes = (total_secs / 60) % 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Like [`format_remaining`] but rounds up to the next whole second, so a
/// running countdown only shows `00:00:00` once it has actually expired.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    format_remaining(Duration::from_secs(secs))
}
