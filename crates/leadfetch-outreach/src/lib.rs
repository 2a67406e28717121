//! Outreach: email delivery via Mailgun and the contacted-lead lifecycle.
//!
//! The tracker is the only writer of the `prospect -> contacted` transition.
//! Delivery state lives in the `leads.lead_stage` column, so a lead contacted
//! by an earlier run (or another process) is never emailed twice; the in-memory
//! set is only a cache for the current run.

mod error;
mod mailer;
mod message;
mod tracker;

pub use error::OutreachError;
pub use mailer::Mailer;
pub use message::{outreach_body, outreach_subject};
pub use tracker::{run_campaign, CampaignConfig, CampaignReport, OutreachOutcome, OutreachTracker};
