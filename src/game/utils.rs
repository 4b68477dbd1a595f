use crate::error::ClockError;
use crate::models::Side;

/// Format milliseconds as `MM:SS.T`
///
/// Tenths are truncated, not rounded. Negative values show as zero.
pub fn format_duration(ms: i64) -> String {
    let ms = ms.max(0);
    let minutes = ms / 60_000;
    let seconds = ms % 60_000 / 1000;
    let tenths = ms % 1000 / 100;

    format!("{:02}:{:02}.{}", minutes, seconds, tenths)
}

/// Parse the per-side time budget typed into the start form, in minutes
pub fn parse_budget(raw: &str) -> Result<u32, ClockError> {
    match raw.trim().parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(ClockError::InvalidBudget(raw.to_string())),
    }
}

pub fn minutes_to_ms(minutes: u32) -> i64 {
    i64::from(minutes) * 60_000
}

/// The line shown above the start form after a loss on time
pub fn result_message(loser: Side) -> String {
    format!("{} run out of time!", loser)
}
