//! Claim bot for the PacketShare dashboard.
//!
//! Drives a real browser through login, the gift popup, and the balance
//! readout, then reschedules itself from what the page says: sleep out the
//! countdown when one is shown, back off progressively when the page is in an
//! unrecognized state.

pub mod cli;
pub mod driver;
pub mod error;
pub mod models;
pub mod notify;
pub mod parse;
pub mod policy;
pub mod scheduler;
pub mod site;

pub use error::SiteError;
pub use models::{Countdown, CycleOutcome, RewardProbe};
pub use notify::{Notify, WebhookNotifier};
pub use policy::{delay_for_attempt, BackoffState, TIMER_MARGIN};
pub use scheduler::CycleScheduler;
pub use site::{Credentials, PacketShare, SiteClient};
