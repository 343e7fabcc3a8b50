//! System capability traits for dependency injection.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub trait Clock {
    fn unix_secs(&self) -> i64;
    fn unix_millis(&self) -> i64;
    fn mono_micros(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_secs(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    fn unix_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }

    fn mono_micros(&self) -> i64 {
        static START: OnceLock<Instant> = OnceLock::new();
        let start = START.get_or_init(Instant::now);
        start.elapsed().as_micros() as i64
    }
}

pub trait RngAlgorithm {
    fn next_u64(&self, state: &mut u64) -> u64;
}

pub struct Lcg64;

impl RngAlgorithm for Lcg64 {
    fn next_u64(&self, state: &mut u64) -> u64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        *state
    }
}

pub struct Capabilities {
    pub clock: Box<dyn Clock>,
    pub rng: Box<dyn RngAlgorithm>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            clock: Box::new(SystemClock),
            rng: Box::new(Lcg64),
        }
    }
}
