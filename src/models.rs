use serde::Deserialize;
use std::time::Duration;

/// What the gift popup showed when probed. Deserialized straight from the
/// injected-JS snapshot, so the field names mirror the script's result object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RewardProbe {
    pub countdown_text: Option<String>,
    pub claim_available: bool,
}

/// A parsed "H hours M min S sec" countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Countdown {
    pub fn as_millis(self) -> u64 {
        (self.hours * 3600 + self.minutes * 60 + self.seconds) * 1000
    }

    pub fn to_duration(self) -> Duration {
        Duration::from_millis(self.as_millis())
    }
}

/// Result of one full pass over the dashboard. Built fresh every cycle,
/// consumed immediately by the delay decision, never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// A countdown was visible; wait it out (plus the safety margin).
    TimerFound { wait: Duration },
    /// Claim clicked and the balance went up. The only trusted proof.
    ClaimedWithBalanceChange { before: f64, after: f64 },
    /// Claim clicked but the balance did not increase.
    ClaimedNoBalanceChange { before: f64, after: f64 },
    /// Neither a countdown nor a claim control was on the page.
    NoActionableState,
    /// Something broke mid-cycle. `session_lost` means the browser was
    /// discarded and the next cycle logs in from scratch.
    Failure { reason: String, session_lost: bool },
}
