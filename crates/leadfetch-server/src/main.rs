mod api;
mod middleware;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState, OutreachSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = leadfetch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = leadfetch_db::PoolConfig::from_app_config(&config);
    let pool = leadfetch_db::connect_pool(&config.database_url, pool_config).await?;
    leadfetch_db::run_migrations(&pool).await?;

    let scraper = match &config.apify_api_key {
        Some(token) => Some(leadfetch_scraper::ApifyClient::new(
            token,
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_results_per_page,
        )?),
        None => {
            tracing::warn!("APIFY_API_KEY not set; lead search endpoint disabled");
            None
        }
    };

    let mailer = match (&config.mailgun_api_key, &config.mailgun_domain) {
        (Some(key), Some(domain)) => Some(leadfetch_outreach::Mailer::new(key, domain, 30)?),
        _ => {
            tracing::warn!(
                "Mailgun credentials not set; contact endpoint will advance stages without sending"
            );
            None
        }
    };

    let state = AppState {
        pool,
        scraper,
        mailer,
        outreach: OutreachSettings {
            from: config.outreach_from.clone(),
            company: config.company_name.clone(),
            industry: config.company_industry.clone(),
        },
    };
    let app = build_app(state, default_rate_limit_state());

    tracing::info!(addr = %config.bind_addr, env = %config.env, "starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
