//! Rate-limited refresh trigger
//!
//! A refresh is accepted only if at least [`REFRESH_WINDOW_MS`] have passed
//! since the previous accepted one. Rejected triggers are dropped, not queued.
//! Every accepted trigger advances a counter (mod [`REFRESH_COUNTER_MODULUS`])
//! that derived state can use as a dependency key.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

pub const REFRESH_WINDOW_MS: u64 = 300;
pub const REFRESH_COUNTER_MODULUS: u32 = 1000;

/// Monotonic millisecond clock
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Process clock backed by [`Instant`]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Clock advanced by hand, for simulations and tests
#[derive(Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[derive(Default)]
struct LimiterState {
    last_accepted_ms: Option<u64>,
    counter: u32,
}

/// Refresh counter guarded by the rate-limit window
pub struct RefreshLimiter<C> {
    clock: C,
    state: Mutex<LimiterState>,
}

impl<C: Clock> RefreshLimiter<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Try to trigger a refresh. Returns `true` if it was accepted.
    pub fn trigger(&self) -> bool {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();

        if let Some(last) = state.last_accepted_ms {
            let elapsed = now.saturating_sub(last);
            if elapsed < REFRESH_WINDOW_MS {
                debug!("Refresh dropped, {}ms since last refresh", elapsed);
                return false;
            }
        }

        state.last_accepted_ms = Some(now);
        state.counter = (state.counter + 1) % REFRESH_COUNTER_MODULUS;
        true
    }

    pub fn counter(&self) -> u32 {
        self.state.lock().counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_trigger_is_accepted() {
        let limiter = RefreshLimiter::new(ManualClock::new(0));
        assert!(limiter.trigger());
        assert_eq!(limiter.counter(), 1);
    }

    #[test]
    fn test_trigger_inside_window_is_dropped() {
        let clock = Arc::new(ManualClock::new(1_000));
        let limiter = RefreshLimiter::new(clock.clone());

        assert!(limiter.trigger());
        clock.advance(299);
        assert!(!limiter.trigger());
        assert_eq!(limiter.counter(), 1);
    }

    #[test]
    fn test_trigger_after_window_is_accepted() {
        let clock = Arc::new(ManualClock::new(1_000));
        let limiter = RefreshLimiter::new(clock.clone());

        assert!(limiter.trigger());
        clock.advance(300);
        assert!(limiter.trigger());
        assert_eq!(limiter.counter(), 2);
    }

    #[test]
    fn test_dropped_trigger_does_not_extend_window() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = RefreshLimiter::new(clock.clone());

        assert!(limiter.trigger());
        clock.advance(200);
        assert!(!limiter.trigger());
        clock.advance(100);
        assert!(limiter.trigger());
    }

    #[test]
    fn test_counter_wraps() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = RefreshLimiter::new(clock.clone());

        for _ in 0..REFRESH_COUNTER_MODULUS {
            assert!(limiter.trigger());
            clock.advance(REFRESH_WINDOW_MS);
        }
        assert_eq!(limiter.counter(), 0);
    }
}
