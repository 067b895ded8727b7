//! The run/sleep loop. Owns the session flag and the failure streak, turns
//! each pass over the dashboard into a `CycleOutcome`, and decides how long to
//! sleep before the next one.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::error::SiteError;
use crate::models::CycleOutcome;
use crate::notify::Notify;
use crate::parse::{parse_balance, parse_countdown};
use crate::policy::BackoffState;
use crate::site::SiteClient;

pub struct CycleScheduler<C: SiteClient> {
    client: C,
    notifier: Arc<dyn Notify>,
    authenticated: bool,
    backoff: BackoffState,
}

impl<C: SiteClient> CycleScheduler<C> {
    pub fn new(client: C, notifier: Arc<dyn Notify>) -> Self {
        Self {
            client,
            notifier,
            authenticated: false,
            backoff: BackoffState::default(),
        }
    }

    /// One authenticate-probe-act pass. Errors never escape: whatever happens
    /// is folded into an outcome.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.cycle_inner().await {
            Ok(outcome) => outcome,
            Err(SiteError::ElementNotFound(what)) => {
                warn!("expected element missing: {what}");
                CycleOutcome::NoActionableState
            }
            Err(e) => {
                let session_lost = e.is_session_lost();
                if session_lost {
                    warn!("browser session lost, discarding it");
                    self.authenticated = false;
                    self.client.close().await;
                } else if matches!(e, SiteError::Authentication(_)) {
                    self.authenticated = false;
                }
                error!("cycle failed: {e}");
                CycleOutcome::Failure {
                    reason: e.to_string(),
                    session_lost,
                }
            }
        }
    }

    async fn cycle_inner(&mut self) -> Result<CycleOutcome, SiteError> {
        if self.authenticated {
            info!("refreshing dashboard");
            self.client.refresh().await?;
        } else {
            self.client.authenticate().await?;
            self.authenticated = true;
        }

        let before_text = self.client.read_balance().await?;
        info!("balance: {before_text}");

        let probe = self.client.probe_reward_state().await?;
        if probe.claim_available {
            return self.claim_and_corroborate(&before_text).await;
        }
        if let Some(text) = probe.countdown_text {
            let countdown = parse_countdown(&text);
            info!("countdown found: {} ({} ms)", text.trim(), countdown.as_millis());
            return Ok(CycleOutcome::TimerFound {
                wait: countdown.to_duration(),
            });
        }
        Ok(CycleOutcome::NoActionableState)
    }

    async fn claim_and_corroborate(
        &mut self,
        before_text: &str,
    ) -> Result<CycleOutcome, SiteError> {
        let confirmed = self.client.attempt_claim().await?;
        info!(
            "claim clicked, confirmation marker {}",
            if confirmed { "observed" } else { "not observed" }
        );

        // the popup marker is not proof; only the balance diff counts
        self.client.refresh().await?;
        let after_text = self.client.read_balance().await?;
        let before = parse_balance(before_text);
        let after = parse_balance(&after_text);
        let increased = after > before;

        let ts = Local::now().format("%d %b %Y %H:%M:%S");
        let message = if increased {
            format!(
                "[{ts}] reward claimed: balance {before:.2} -> {after:.2} (+{:.2})",
                after - before
            )
        } else {
            format!("[{ts}] claim attempted but balance unchanged: {before:.2} -> {after:.2}")
        };
        info!("{message}");
        self.dispatch(message);

        // the site normally shows a fresh countdown right after a claim
        let reprobe = self.client.probe_reward_state().await?;
        if let Some(text) = reprobe.countdown_text {
            let countdown = parse_countdown(&text);
            info!("new countdown: {} ({} ms)", text.trim(), countdown.as_millis());
            return Ok(CycleOutcome::TimerFound {
                wait: countdown.to_duration(),
            });
        }
        warn!("no countdown visible after the claim");
        Ok(if increased {
            CycleOutcome::ClaimedWithBalanceChange { before, after }
        } else {
            CycleOutcome::ClaimedNoBalanceChange { before, after }
        })
    }

    fn dispatch(&self, message: String) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move { notifier.notify(&message).await });
    }

    /// Fold the outcome into the failure streak and return the wait before
    /// the next cycle.
    pub fn next_delay(&mut self, outcome: &CycleOutcome) -> Duration {
        self.backoff.next_delay(outcome)
    }

    /// Loop until `shutdown` flips. The browser is released on every exit
    /// path; waits stay responsive to the signal.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            let outcome = self.run_cycle().await;
            let delay = self.next_delay(&outcome);
            let resume_at = Local::now()
                + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
            info!(
                "next attempt at {} (in {:.1} min)",
                resume_at.format("%d %b %Y %H:%M:%S"),
                delay.as_secs_f64() / 60.0
            );
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = sleep(delay) => {}
            }
        }
        info!("shutting down, releasing browser");
        self.client.close().await;
    }
}
