use leadfetch_core::LeadStage;
use leadfetch_scraper::ApifyClient;

/// Scrape performance counters for a contract video and store them on a lead.
///
/// Only leads past the `prospect` stage can carry contract metrics; the update
/// silently matches zero rows otherwise, which is reported as an error here.
///
/// # Errors
///
/// Returns an error if the API token is missing, the lead does not exist or is
/// still a prospect, or the scrape fails.
pub(crate) async fn run_performance(
    pool: &sqlx::PgPool,
    config: &leadfetch_core::AppConfig,
    lead_id: i64,
    video_url: &str,
) -> anyhow::Result<()> {
    let api_token = config
        .apify_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("APIFY_API_KEY is not set; cannot scrape metrics"))?;

    let lead = leadfetch_db::get_lead(pool, lead_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("lead {lead_id} not found"))?;
    if lead.stage() == LeadStage::Prospect {
        anyhow::bail!(
            "lead {lead_id} ({}) is still a prospect; contract metrics only apply after contact",
            lead.profile_name
        );
    }

    let client = ApifyClient::new(
        api_token,
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_results_per_page,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Apify client: {e}"))?;

    let metrics = client.scrape_post_metrics(video_url).await?;
    let updated = leadfetch_db::update_contract_metrics(
        pool,
        lead_id,
        video_url,
        metrics.shares,
        metrics.plays,
        metrics.comments,
    )
    .await?;

    if updated == 0 {
        anyhow::bail!("lead {lead_id} was not updated; its stage may have changed");
    }

    println!(
        "updated lead {lead_id} ({}): shares {}, plays {}, comments {}",
        lead.profile_name,
        metrics.shares.map_or_else(|| "?".to_string(), |v| v.to_string()),
        metrics.plays.map_or_else(|| "?".to_string(), |v| v.to_string()),
        metrics.comments.map_or_else(|| "?".to_string(), |v| v.to_string()),
    );

    Ok(())
}
