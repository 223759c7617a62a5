//! Wall-clock time and dice randomness for the running app.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// Timestamps for `createdAt`/`updatedAt`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Die faces from the thread-local generator. Bounds may come in either
/// order; a single-value range returns that value.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        rand::thread_rng().gen_range(low..=high)
    }
}
