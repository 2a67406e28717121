use leadfetch_scraper::{ingest, normalize_profile, top_by_fans, ApifyClient};

/// Ingest influencer leads from a TikTok search.
///
/// Runs the scraper actor for the given query, keeps the top `limit` profiles
/// by follower count, and upserts them into the lead store. Malformed profiles
/// are logged and skipped, not propagated.
///
/// When `dry_run` is `true` the function prints what would be stored and
/// returns without touching the database.
///
/// # Errors
///
/// Returns an error if the API token is missing, the client cannot be built,
/// or the search itself fails.
pub(crate) async fn run_ingest(
    pool: &sqlx::PgPool,
    config: &leadfetch_core::AppConfig,
    query: &str,
    limit: usize,
    dry_run: bool,
) -> anyhow::Result<()> {
    let api_token = config
        .apify_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("APIFY_API_KEY is not set; cannot run ingest"))?;

    let client = ApifyClient::new(
        api_token,
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_results_per_page,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Apify client: {e}"))?;

    let profiles = client.search_profiles(query).await?;
    let total_found = profiles.len();
    let top = top_by_fans(profiles, limit);

    if dry_run {
        println!("dry-run: {total_found} profiles found for {query:?}, top {} by followers:", top.len());
        for profile in &top {
            match normalize_profile(profile) {
                Ok(lead) => println!(
                    "  {} (fans: {}, email: {})",
                    lead.profile_name,
                    lead.fans.map_or_else(|| "?".to_string(), |f| f.to_string()),
                    lead.email.as_deref().unwrap_or("?"),
                ),
                Err(e) => println!("  <malformed profile: {e}>"),
            }
        }
        return Ok(());
    }

    let report = ingest(pool, &top).await;
    println!(
        "stored {} leads ({} skipped) from {total_found} profiles for {query:?}",
        report.stored.len(),
        report.skipped
    );

    Ok(())
}
