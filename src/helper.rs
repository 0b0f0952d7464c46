use std::time::Instant;

/// Duration between `start` and `end` in seconds
pub fn duration_in_seconds(start: Instant, end: Instant) -> f64 {
    (end - start).as_secs_f64()
}

/// Cast `usize` to `f64`; ignore precision loss
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f64(x: usize) -> f64 {
    x as f64
}
