use std::time::Duration;

use leadfetch_outreach::{run_campaign, CampaignConfig, Mailer, OutreachTracker};

/// Email every current prospect and advance them to `contacted`.
///
/// Company and industry default to the configured values; `--company` and
/// `--industry` override them per run. Without Mailgun credentials the
/// campaign still advances stages, with a warning per lead.
///
/// # Errors
///
/// Returns an error if the mailer cannot be built or the prospect list cannot
/// be read. Individual delivery failures are logged and counted, not
/// propagated.
pub(crate) async fn run_outreach(
    pool: &sqlx::PgPool,
    config: &leadfetch_core::AppConfig,
    company: Option<String>,
    industry: Option<String>,
    min_fans: Option<i64>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let mailer = match (&config.mailgun_api_key, &config.mailgun_domain) {
        (Some(key), Some(domain)) => Some(
            Mailer::new(key, domain, 30)
                .map_err(|e| anyhow::anyhow!("failed to build Mailgun client: {e}"))?,
        ),
        _ => {
            tracing::warn!(
                "MAILGUN_API_KEY/MAILGUN_DOMAIN not set; stages will advance without sending"
            );
            None
        }
    };

    let campaign = CampaignConfig {
        company: company.unwrap_or_else(|| config.company_name.clone()),
        industry: industry.unwrap_or_else(|| config.company_industry.clone()),
        min_fans,
        delay: Duration::from_millis(config.outreach_delay_ms),
        dry_run,
    };

    let mut tracker = OutreachTracker::new(mailer, config.outreach_from.clone());
    let report = run_campaign(pool, &mut tracker, &campaign).await?;

    if dry_run {
        println!(
            "dry-run: {} prospects would be contacted",
            report.attempted
        );
    } else {
        println!(
            "contacted {} leads ({} skipped, {} failed) of {} attempted",
            report.sent, report.skipped, report.failed, report.attempted
        );
    }

    Ok(())
}
