//! Deadline value helpers.

use std::time::Duration;

/// Convert a configured number of seconds into a deadline.
///
/// Negative and NaN values clamp to zero, which a guarded call treats as
/// "fire immediately". Values too large for a `Duration`, infinity included,
/// saturate to [`Duration::MAX`].
#[must_use]
pub fn duration_from_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Render a deadline the way timeout messages quote it: `10` for whole
/// seconds, `0.1` for fractions.
#[must_use]
pub fn format_secs(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{}", duration.as_secs_f64())
    }
}
