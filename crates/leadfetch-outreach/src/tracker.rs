//! Contacted-lead tracking and campaign orchestration.

use std::collections::HashSet;
use std::time::Duration;

use sqlx::PgPool;

use crate::error::OutreachError;
use crate::mailer::Mailer;
use crate::message::{outreach_body, outreach_subject};
use leadfetch_core::LeadStage;
use leadfetch_db::{advance_lead_stage, list_leads_by_stage, LeadRow};

/// What happened to a single lead during outreach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutreachOutcome {
    /// Email delivered and the lead advanced to `contacted`.
    Sent,
    /// Nothing sent; the reason names the guard that fired.
    Skipped { reason: &'static str },
    /// Delivery failed; the lead stays eligible for the next run.
    Failed { reason: String },
}

/// Aggregate result of one campaign run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignReport {
    pub attempted: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Parameters for one campaign run.
pub struct CampaignConfig {
    pub company: String,
    pub industry: String,
    /// Only contact leads with at least this many followers.
    pub min_fans: Option<i64>,
    /// Pause between consecutive sends.
    pub delay: Duration,
    /// Log what would be sent without sending or changing any stage.
    pub dry_run: bool,
}

/// Gatekeeper for the `prospect -> contacted` transition.
///
/// The durable guard is the lead's stored stage; the in-memory set only
/// short-circuits repeat lookups within a single run. A tracker built without
/// a mailer still advances stages, which supports environments where delivery
/// happens out of band.
pub struct OutreachTracker {
    mailer: Option<Mailer>,
    from: String,
    contacted: HashSet<i64>,
}

impl OutreachTracker {
    #[must_use]
    pub fn new(mailer: Option<Mailer>, from: impl Into<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
            contacted: HashSet::new(),
        }
    }

    /// Emails one lead and advances it to `contacted`.
    ///
    /// Skips (without touching the mailer) when the lead is already at or past
    /// `contacted`, or has no email address. The stage update runs only after
    /// a successful send, so a delivery failure leaves the lead eligible for
    /// the next run.
    ///
    /// # Errors
    ///
    /// Returns [`OutreachError::Db`] when the stage update fails. Delivery
    /// failures are reported as [`OutreachOutcome::Failed`], not as errors.
    pub async fn contact(
        &mut self,
        pool: &PgPool,
        lead: &LeadRow,
        subject: &str,
        body: &str,
    ) -> Result<OutreachOutcome, OutreachError> {
        if self.contacted.contains(&lead.id) || lead.stage() >= LeadStage::Contacted {
            self.contacted.insert(lead.id);
            return Ok(OutreachOutcome::Skipped {
                reason: "already_contacted",
            });
        }

        let Some(email) = lead.email.as_deref() else {
            return Ok(OutreachOutcome::Skipped {
                reason: "missing_email",
            });
        };

        match &self.mailer {
            Some(mailer) => {
                if let Err(e) = mailer.send(&self.from, email, subject, body).await {
                    tracing::warn!(lead_id = lead.id, profile = %lead.profile_name, error = %e, "delivery failed");
                    return Ok(OutreachOutcome::Failed {
                        reason: e.to_string(),
                    });
                }
            }
            None => {
                tracing::warn!(
                    lead_id = lead.id,
                    profile = %lead.profile_name,
                    "no mailer configured, advancing stage without sending"
                );
            }
        }

        advance_lead_stage(pool, lead.id, LeadStage::Contacted).await?;
        self.contacted.insert(lead.id);

        tracing::info!(lead_id = lead.id, profile = %lead.profile_name, to = email, "lead contacted");
        Ok(OutreachOutcome::Sent)
    }
}

/// Runs an outreach campaign over every current prospect.
///
/// Leads are processed one at a time with `config.delay` between sends.
/// Delivery failures are logged and counted; they never abort the run.
///
/// # Errors
///
/// Returns [`OutreachError::Db`] if the prospect list cannot be read.
pub async fn run_campaign(
    pool: &PgPool,
    tracker: &mut OutreachTracker,
    config: &CampaignConfig,
) -> Result<CampaignReport, OutreachError> {
    let prospects = list_leads_by_stage(pool, LeadStage::Prospect).await?;
    let subject = outreach_subject(&config.company);

    let mut report = CampaignReport::default();

    for lead in &prospects {
        if let Some(min) = config.min_fans {
            if lead.fans.unwrap_or(0) < min {
                continue;
            }
        }
        report.attempted += 1;

        if config.dry_run {
            tracing::info!(
                lead_id = lead.id,
                profile = %lead.profile_name,
                email = lead.email.as_deref().unwrap_or("<none>"),
                "dry run, would send outreach email"
            );
            report.skipped += 1;
            continue;
        }

        let body = outreach_body(&config.company, &config.industry, lead);
        match tracker.contact(pool, lead, &subject, &body).await {
            Ok(OutreachOutcome::Sent) => {
                report.sent += 1;
                if !config.delay.is_zero() {
                    tokio::time::sleep(config.delay).await;
                }
            }
            Ok(OutreachOutcome::Skipped { reason }) => {
                tracing::debug!(lead_id = lead.id, reason, "skipping lead");
                report.skipped += 1;
            }
            Ok(OutreachOutcome::Failed { .. }) => {
                report.failed += 1;
            }
            Err(e) => {
                tracing::warn!(lead_id = lead.id, profile = %lead.profile_name, error = %e, "outreach failed");
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        attempted = report.attempted,
        sent = report.sent,
        skipped = report.skipped,
        failed = report.failed,
        "campaign finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadfetch_core::NormalizedLead;
    use leadfetch_db::{get_lead, upsert_lead};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lead(name: &str, fans: Option<i64>, email: Option<&str>) -> NormalizedLead {
        NormalizedLead {
            platform: "tiktok".to_string(),
            profile_name: name.to_string(),
            fans,
            hearts: Some(10),
            videos: Some(3),
            email: email.map(ToString::to_string),
        }
    }

    fn test_mailer(base_url: &str) -> Mailer {
        Mailer::with_base_url("test-key", "mg.example.com", 30, base_url)
            .expect("client construction should not fail")
    }

    fn campaign() -> CampaignConfig {
        CampaignConfig {
            company: "Acme".to_string(),
            industry: "fitness tech".to_string(),
            min_fans: None,
            delay: Duration::ZERO,
            dry_run: false,
        }
    }

    async fn mock_mailgun(server: &MockServer, status: u16, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/v3/mg.example.com/messages"))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn campaign_contacts_every_prospect(pool: PgPool) {
        let a = upsert_lead(&pool, &lead("a", Some(100), Some("a@gmail.com")))
            .await
            .expect("seed a");
        let b = upsert_lead(&pool, &lead("b", Some(200), Some("b@gmail.com")))
            .await
            .expect("seed b");

        let server = MockServer::start().await;
        mock_mailgun(&server, 200, 2).await;

        let mut tracker = OutreachTracker::new(Some(test_mailer(&server.uri())), "sales@acme.com");
        let report = run_campaign(&pool, &mut tracker, &campaign())
            .await
            .expect("campaign");

        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 0);
        for id in [a.id, b.id] {
            let row = get_lead(&pool, id).await.expect("get").expect("row");
            assert_eq!(row.stage(), LeadStage::Contacted);
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn second_run_sends_nothing(pool: PgPool) {
        upsert_lead(&pool, &lead("a", Some(100), Some("a@gmail.com")))
            .await
            .expect("seed");

        let server = MockServer::start().await;
        mock_mailgun(&server, 200, 1).await;

        let mut tracker = OutreachTracker::new(Some(test_mailer(&server.uri())), "sales@acme.com");
        let first = run_campaign(&pool, &mut tracker, &campaign())
            .await
            .expect("first run");
        assert_eq!(first.sent, 1);

        // A fresh tracker models a new process; the stored stage still guards.
        let mut fresh = OutreachTracker::new(Some(test_mailer(&server.uri())), "sales@acme.com");
        let second = run_campaign(&pool, &mut fresh, &campaign())
            .await
            .expect("second run");
        assert_eq!(second.attempted, 0);
        assert_eq!(second.sent, 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn contacted_lead_never_reaches_the_mailer(pool: PgPool) {
        let stored = upsert_lead(&pool, &lead("a", Some(100), Some("a@gmail.com")))
            .await
            .expect("seed");
        advance_lead_stage(&pool, stored.id, LeadStage::Contacted)
            .await
            .expect("advance");

        let server = MockServer::start().await;
        mock_mailgun(&server, 200, 0).await;

        let row = get_lead(&pool, stored.id).await.expect("get").expect("row");
        let mut tracker = OutreachTracker::new(Some(test_mailer(&server.uri())), "sales@acme.com");
        let outcome = tracker
            .contact(&pool, &row, "subject", "body")
            .await
            .expect("contact");

        assert_eq!(
            outcome,
            OutreachOutcome::Skipped {
                reason: "already_contacted"
            }
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn lead_without_email_is_skipped(pool: PgPool) {
        let stored = upsert_lead(&pool, &lead("a", Some(100), None))
            .await
            .expect("seed");

        let server = MockServer::start().await;
        mock_mailgun(&server, 200, 0).await;

        let row = get_lead(&pool, stored.id).await.expect("get").expect("row");
        let mut tracker = OutreachTracker::new(Some(test_mailer(&server.uri())), "sales@acme.com");
        let outcome = tracker
            .contact(&pool, &row, "subject", "body")
            .await
            .expect("contact");

        assert_eq!(
            outcome,
            OutreachOutcome::Skipped {
                reason: "missing_email"
            }
        );
        let row = get_lead(&pool, stored.id).await.expect("get").expect("row");
        assert_eq!(row.stage(), LeadStage::Prospect, "stage must not move");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn delivery_failure_leaves_lead_eligible(pool: PgPool) {
        let stored = upsert_lead(&pool, &lead("a", Some(100), Some("a@gmail.com")))
            .await
            .expect("seed");

        let server = MockServer::start().await;
        mock_mailgun(&server, 500, 1).await;

        let mut tracker = OutreachTracker::new(Some(test_mailer(&server.uri())), "sales@acme.com");
        let report = run_campaign(&pool, &mut tracker, &campaign())
            .await
            .expect("campaign");

        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, 0);
        let row = get_lead(&pool, stored.id).await.expect("get").expect("row");
        assert_eq!(row.stage(), LeadStage::Prospect);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn min_fans_filters_small_accounts(pool: PgPool) {
        upsert_lead(&pool, &lead("small", Some(50), Some("s@gmail.com")))
            .await
            .expect("seed small");
        upsert_lead(&pool, &lead("big", Some(5000), Some("b@gmail.com")))
            .await
            .expect("seed big");

        let server = MockServer::start().await;
        mock_mailgun(&server, 200, 1).await;

        let mut tracker = OutreachTracker::new(Some(test_mailer(&server.uri())), "sales@acme.com");
        let mut config = campaign();
        config.min_fans = Some(1000);
        let report = run_campaign(&pool, &mut tracker, &config)
            .await
            .expect("campaign");

        assert_eq!(report.attempted, 1);
        assert_eq!(report.sent, 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn dry_run_changes_nothing(pool: PgPool) {
        let stored = upsert_lead(&pool, &lead("a", Some(100), Some("a@gmail.com")))
            .await
            .expect("seed");

        let server = MockServer::start().await;
        mock_mailgun(&server, 200, 0).await;

        let mut tracker = OutreachTracker::new(Some(test_mailer(&server.uri())), "sales@acme.com");
        let mut config = campaign();
        config.dry_run = true;
        let report = run_campaign(&pool, &mut tracker, &config)
            .await
            .expect("campaign");

        assert_eq!(report.attempted, 1);
        assert_eq!(report.sent, 0);
        let row = get_lead(&pool, stored.id).await.expect("get").expect("row");
        assert_eq!(row.stage(), LeadStage::Prospect);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn tracker_without_mailer_still_advances(pool: PgPool) {
        let stored = upsert_lead(&pool, &lead("a", Some(100), Some("a@gmail.com")))
            .await
            .expect("seed");

        let row = get_lead(&pool, stored.id).await.expect("get").expect("row");
        let mut tracker = OutreachTracker::new(None, "sales@acme.com");
        let outcome = tracker
            .contact(&pool, &row, "subject", "body")
            .await
            .expect("contact");

        assert_eq!(outcome, OutreachOutcome::Sent);
        let row = get_lead(&pool, stored.id).await.expect("get").expect("row");
        assert_eq!(row.stage(), LeadStage::Contacted);
    }
}
