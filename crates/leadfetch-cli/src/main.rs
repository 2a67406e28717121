mod ingest;
mod outreach;
mod performance;
mod query;
mod report;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "leadfetch-cli")]
#[command(about = "LeadFetch command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search TikTok for influencer leads and store them
    Ingest {
        /// Search query (e.g., "ai voice tools")
        #[arg(long)]
        query: String,
        /// Keep only the top N profiles by follower count
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Preview what would be stored without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate an influencer search query from a product description
    Query {
        /// Product description to turn into a search query
        #[arg(long)]
        product: String,
    },
    /// Email current prospects and mark them contacted
    Outreach {
        /// Company name for the pitch (defaults to LEADFETCH_COMPANY_NAME)
        #[arg(long)]
        company: Option<String>,
        /// Company industry for the pitch (defaults to LEADFETCH_COMPANY_INDUSTRY)
        #[arg(long)]
        industry: Option<String>,
        /// Only contact leads with at least this many followers
        #[arg(long)]
        min_fans: Option<i64>,
        /// Preview who would be contacted without sending or changing stages
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a table of stored leads
    Report {
        /// Filter by lifecycle stage (prospect, contacted, responded, qualified)
        #[arg(long)]
        stage: Option<String>,
    },
    /// Refresh contract-video performance metrics for a converted lead
    Performance {
        /// Lead id to update
        #[arg(long)]
        lead_id: i64,
        /// Contract video URL to scrape
        #[arg(long)]
        video_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = leadfetch_core::load_app_config()?;

    match cli.command {
        Commands::Ingest {
            query,
            limit,
            dry_run,
        } => {
            let pool = connect(&config).await?;
            ingest::run_ingest(&pool, &config, &query, limit, dry_run).await
        }
        Commands::Query { product } => query::run_query(&config, &product).await,
        Commands::Outreach {
            company,
            industry,
            min_fans,
            dry_run,
        } => {
            let pool = connect(&config).await?;
            outreach::run_outreach(&pool, &config, company, industry, min_fans, dry_run).await
        }
        Commands::Report { stage } => {
            let pool = connect(&config).await?;
            report::run_report(&pool, stage.as_deref()).await
        }
        Commands::Performance { lead_id, video_url } => {
            let pool = connect(&config).await?;
            performance::run_performance(&pool, &config, lead_id, &video_url).await
        }
    }
}

async fn connect(config: &leadfetch_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = leadfetch_db::PoolConfig::from_app_config(config);
    let pool = leadfetch_db::connect_pool(&config.database_url, pool_config).await?;
    leadfetch_db::run_migrations(&pool).await?;
    Ok(pool)
}
