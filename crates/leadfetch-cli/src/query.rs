use leadfetch_llm::GeminiClient;

/// Turn a product description into an influencer search query.
///
/// Calls Gemini with the marketer prompt and prints the sanitized query, ready
/// to paste into `ingest --query`.
///
/// # Errors
///
/// Returns an error if the API key is missing, the client cannot be built, or
/// the model returns nothing usable.
pub(crate) async fn run_query(
    config: &leadfetch_core::AppConfig,
    product: &str,
) -> anyhow::Result<()> {
    let api_key = config
        .gemini_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY is not set; cannot generate a query"))?;

    let client = GeminiClient::new(api_key, config.scraper_request_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build Gemini client: {e}"))?;

    let query = client.search_query_from_product(product).await?;
    println!("{query}");

    Ok(())
}
