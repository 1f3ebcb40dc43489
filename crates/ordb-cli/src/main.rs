use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ordb_core::TargetType;
use ordb_db::{DaycareFilter, InfluencerFilter};

#[derive(Debug, Parser)]
#[command(name = "ordb")]
#[command(about = "Outreach database assistant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one natural-language command through the assistant.
    Command {
        /// The command text, e.g. "find daycares in Boston".
        text: String,
    },
    /// Apply pending database migrations.
    Migrate,
    /// Check database connectivity.
    Ping,
    /// Export contacts to a CSV file without going through the assistant.
    Export {
        /// "daycare" or "influencer".
        #[arg(long, default_value = "daycare")]
        target_type: String,
        /// Optional region filter (e.g. "USA", "FRANCE").
        #[arg(long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ordb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    let cli = Cli::parse();

    let pool_config = ordb_db::PoolConfig::from_app_config(&config);
    let pool = ordb_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Command { text } => {
            ordb_db::run_migrations(&pool).await?;
            let assistant = ordb_assistant::Assistant::from_config(&config, pool)?;
            let result = assistant.process_command(&text).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Migrate => {
            let applied = ordb_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Ping => {
            ordb_db::ping(&pool).await?;
            println!("database reachable");
        }
        Commands::Export {
            target_type,
            region,
        } => {
            let target_type = TargetType::from_loose(&target_type).ok_or_else(|| {
                anyhow::anyhow!("unrecognized target type: {target_type}")
            })?;
            let out_dir = std::env::current_dir()?;
            let summary = match target_type {
                TargetType::Daycare => {
                    let rows = ordb_db::list_daycares(
                        &pool,
                        DaycareFilter {
                            city: None,
                            region: region.as_deref(),
                            limit: None,
                        },
                    )
                    .await?;
                    ordb_assistant::export::export_daycares_csv(&rows, &out_dir)?
                }
                TargetType::Influencer => {
                    let rows = ordb_db::list_influencers(
                        &pool,
                        InfluencerFilter {
                            country: region.as_deref(),
                            min_followers: None,
                            limit: None,
                        },
                    )
                    .await?;
                    ordb_assistant::export::export_influencers_csv(&rows, &out_dir)?
                }
            };
            println!(
                "exported {} contact(s) to {}",
                summary.contact_count, summary.file_path
            );
        }
    }

    Ok(())
}
