use std::fmt;
use std::time::Duration;

/// Log rendering of a duration in milliseconds up to hours.
#[derive(Debug, Clone, Copy)]
pub struct Elapsed(pub Duration);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs_f64();
        write!(
            f,
            "{} ms, {:.6} s, {:.6} min, {:.6} h",
            self.0.as_millis(),
            secs,
            secs / 60.0,
            secs / 3600.0
        )
    }
}

/// Operations per second, zero for an empty interval.
pub fn throughput(ops: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        ops as f64 / secs
    } else {
        0.0
    }
}
