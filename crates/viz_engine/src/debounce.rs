//! Trailing-edge debounce for expensive recomputations.
//!
//! A burst of filter or widget changes should cost one recompute, not one
//! per click. Each trigger pushes the wake-up out by the full delay; only
//! once the burst quiesces does the recompute run. The clock is injected
//! so the state machine is testable without sleeping.

use std::time::{Duration, Instant};

/// Time source abstraction.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Externally visible scheduling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Armed,
    Running,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Armed { deadline: Instant },
    Running { rearm: bool },
}

/// Coalesces bursts of change events into a single delayed recompute.
///
/// The owner drives it from the event loop: `trigger()` on every change,
/// `take_due()` each tick, and `complete()` once the recompute returns.
/// A trigger landing while the recompute is in flight is not dropped; it
/// re-arms, so a follow-up run happens one full delay after the current
/// one finishes. This avoids lost updates without requiring the recompute
/// to tolerate overlapping invocations.
#[derive(Debug)]
pub struct DebouncedRecomputer<C: Clock = SystemClock> {
    clock: C,
    delay: Duration,
    phase: Phase,
}

impl DebouncedRecomputer<SystemClock> {
    pub fn new(delay: Duration) -> Self {
        Self::with_clock(delay, SystemClock)
    }
}

impl<C: Clock> DebouncedRecomputer<C> {
    pub fn with_clock(delay: Duration, clock: C) -> Self {
        Self {
            clock,
            delay,
            phase: Phase::Idle,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> DebounceState {
        match self.phase {
            Phase::Idle => DebounceState::Idle,
            Phase::Armed { .. } => DebounceState::Armed,
            Phase::Running { .. } => DebounceState::Running,
        }
    }

    /// When the pending wake-up is scheduled, if any. Event loops can use
    /// this to pick a sleep interval.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Armed { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Records a change event. Re-triggering while armed replaces the
    /// pending wake-up instead of stacking a second one.
    pub fn trigger(&mut self) {
        let deadline = self.clock.now() + self.delay;
        self.phase = match self.phase {
            Phase::Idle | Phase::Armed { .. } => Phase::Armed { deadline },
            Phase::Running { .. } => Phase::Running { rearm: true },
        };
    }

    /// True when the delay has elapsed with no further trigger; the caller
    /// must then run the recompute exactly once and call `complete()`.
    pub fn take_due(&mut self) -> bool {
        match self.phase {
            Phase::Armed { deadline } if self.clock.now() >= deadline => {
                self.phase = Phase::Running { rearm: false };
                true
            }
            _ => false,
        }
    }

    /// Bypasses the delay for an explicit refresh, collapsing any pending
    /// wake-up. Returns true when the caller should run the recompute now.
    pub fn force(&mut self) -> bool {
        match self.phase {
            Phase::Running { .. } => {
                // Already in flight; queue a follow-up instead.
                self.phase = Phase::Running { rearm: true };
                false
            }
            _ => {
                self.phase = Phase::Running { rearm: false };
                true
            }
        }
    }

    /// The recompute returned. If a trigger arrived in the meantime, arm
    /// for a follow-up one full delay from now; otherwise go idle.
    pub fn complete(&mut self) {
        self.phase = match self.phase {
            Phase::Running { rearm: true } => Phase::Armed {
                deadline: self.clock.now() + self.delay,
            },
            _ => Phase::Idle,
        };
    }

    /// Drops any pending wake-up, e.g. when the owning view is torn down
    /// while armed.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}
