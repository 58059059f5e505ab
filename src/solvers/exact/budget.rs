//! Search Budget
//!
//! Wall-clock pacing and cooperative cancellation for the enumerator.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// Source of monotonic time, measured from an arbitrary fixed origin.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// How the enumerator should treat the next internal frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Expand every frame.
    Exhaustive,

    /// Skip frames at random.
    Thinning,

    /// Stop searching.
    Expired,
}

/// Elapsed-time thresholds for degrading a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBudget {
    thinning_after: Duration,
    deadline: Duration,
    thinning_rate: f64,
}

impl TimeBudget {
    /// Create a budget that thins after `thinning_after`, skipping frames with probability
    /// `thinning_rate`, and stops after `deadline`.
    pub fn new(thinning_after: Duration, deadline: Duration, thinning_rate: f64) -> Self {
        Self {
            thinning_after,
            deadline,
            thinning_rate: thinning_rate.clamp(0.0, 1.0),
        }
    }

    /// A budget that never thins or expires.
    pub fn unlimited() -> Self {
        Self::new(Duration::MAX, Duration::MAX, 0.0)
    }

    /// Pace for a search that has been running for `elapsed`.
    pub fn pace(&self, elapsed: Duration) -> Pace {
        if elapsed > self.deadline {
            Pace::Expired
        } else if elapsed > self.thinning_after {
            Pace::Thinning
        } else {
            Pace::Exhaustive
        }
    }

    /// Chance of skipping a frame while thinning.
    pub fn thinning_rate(&self) -> f64 {
        self.thinning_rate
    }

    /// Elapsed time after which thinning starts.
    pub fn thinning_after(&self) -> Duration {
        self.thinning_after
    }

    /// Elapsed time after which the search stops.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Shared flag asking a running solve to stop.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this token to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether [`CancellationToken::cancel`] has been called on this token or a clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
