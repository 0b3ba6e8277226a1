use std::time::{Duration, Instant};

use crate::foundation::error::{SegError, SegResult};

/// Number of tubes on the reference display board.
pub const DEFAULT_TUBES: usize = 16;

/// Convert a non-negative, finite number of seconds into a [`Duration`].
pub fn secs(value: f64) -> SegResult<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| SegError::animation(format!("invalid duration '{value}' (seconds)")))
}

/// Time elapsed from `start` to `now`, zero when `now` is earlier.
pub fn elapsed_since(start: Instant, now: Instant) -> Duration {
    now.saturating_duration_since(start)
}
