use std::time::Duration;

use crate::error::DurationError;

const FIELD_NAMES: [&str; 3] = ["hours", "minutes", "seconds"];

/// Longest accepted countdown: 100 000 hours, a bit over eleven years.
/// Anything longer may not be representable as a monotonic deadline.
pub const MAX_DURATION: Duration = Duration::from_secs(100_000 * 3_600);

/// Parse `HH:MM:SS` into a duration.
///
/// Exactly three colon-separated unsigned integer fields. Fields are not
/// range-checked, so `00:90:00` is ninety minutes, but the total may not
/// exceed [`MAX_DURATION`].
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();
    let fields: Vec<&str> = trimmed.split(':').collect();
    if fields.len() != 3 {
        return Err(DurationError::Shape {
            input: trimmed.to_string(),
            fields: fields.len(),
        });
    }

    let mut values = [0u64; 3];
    for ((value, field), name) in values.iter_mut().zip(&fields).zip(FIELD_NAMES) {
        let field = field.trim();
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DurationError::Field {
                name,
                value: field.to_string(),
            });
        }
        *value = field
            .parse()
            .map_err(|_| DurationError::Overflow(trimmed.to_string()))?;
    }

    let [hours, minutes, seconds] = values;
    hours
        .checked_mul(3_600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .map(Duration::from_secs)
        .filter(|total| *total <= MAX_DURATION)
        .ok_or_else(|| DurationError::Overflow(trimmed.to_string()))
}
