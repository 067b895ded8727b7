//! Timing policy: the fixed backoff ladder and the per-outcome delay decision.

use std::time::Duration;

use crate::models::CycleOutcome;

/// Safety margin added on top of a parsed countdown before the next attempt.
pub const TIMER_MARGIN: Duration = Duration::from_secs(20);

/// Delay before cycle attempt `n`, where `n` counts consecutive cycles that
/// produced neither a countdown nor a confirmed claim. The counter is
/// unbounded but the delay caps at two hours; the process retries forever.
pub fn delay_for_attempt(n: u32) -> Duration {
    match n {
        0 => Duration::ZERO,
        1 => Duration::from_secs(5 * 60),
        2 => Duration::from_secs(15 * 60),
        3 => Duration::from_secs(30 * 60),
        _ => Duration::from_secs(2 * 60 * 60),
    }
}

/// Streak of consecutive unproductive cycles, and the delay each outcome maps
/// to. Owned by the scheduler; only ever touched from the active cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackoffState {
    attempts: u32,
}

impl BackoffState {
    pub fn attempts(self) -> u32 {
        self.attempts
    }

    /// Fold an outcome into the streak and return the wait before the next
    /// cycle.
    pub fn next_delay(&mut self, outcome: &CycleOutcome) -> Duration {
        match outcome {
            CycleOutcome::TimerFound { wait } => {
                self.attempts = 0;
                *wait + TIMER_MARGIN
            }
            // A confirmed claim wipes the streak, but with no countdown on the
            // page the next look still waits one backoff step.
            CycleOutcome::ClaimedWithBalanceChange { .. } => {
                self.attempts = 1;
                delay_for_attempt(self.attempts)
            }
            CycleOutcome::ClaimedNoBalanceChange { .. }
            | CycleOutcome::NoActionableState
            | CycleOutcome::Failure { .. } => {
                self.attempts = self.attempts.saturating_add(1);
                delay_for_attempt(self.attempts)
            }
        }
    }
}
