use crate::domain::ports::Clock;
use std::time::Instant;

// Monotonic wall clock backing the performance aggregator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
