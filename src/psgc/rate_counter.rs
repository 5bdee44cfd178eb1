//! Rolling-window request budget for the PSGC upstream.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

const INITIAL_CAPACITY: u32 = 64;

/// Allows at most `limit` acquisitions per rolling window.
#[derive(Debug)]
pub struct RateCounter {
    limit: u32,
    window: Duration,
    hits: Mutex<VecDeque<Instant>>,
}

impl RateCounter {
    /// Creates a counter with a 60 second window.
    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Creates a counter with a custom window.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Mutex::new(VecDeque::with_capacity(limit.min(INITIAL_CAPACITY) as usize)),
        }
    }

    /// The configured budget.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Takes one slot if the budget allows.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Takes one slot as of `now`.
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(oldest) = hits.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }
        if hits.len() >= self.limit as usize {
            return false;
        }
        hits.push_back(now);
        true
    }
}
