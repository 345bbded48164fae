use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use threads_client::{MediaType, ThreadsClient};
use threads_core::{ClientConfig, ConfigFile, ErrorExt, ErrorReporter, ProcessEnv, ThreadsError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "threads", version, about = "Read and publish Threads posts from the command line")]
struct Cli {
    /// TOML config file with a [threads] table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Page size for listings (0 means the API maximum of 100)
    #[arg(long, global = true)]
    limit: Option<u32>,

    /// Days of history to include when listing threads
    #[arg(long, global = true)]
    backfill_days: Option<u32>,

    /// Print per-operation call counts to stderr when done
    #[arg(long, global = true)]
    stats: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the account profile
    Bio,
    /// Exchange the current token for a long-lived one
    RefreshToken,
    /// Show insights for one thread
    Insights { thread_id: String },
    /// List replies to a thread
    Conversation { media_id: String },
    /// List recent threads
    List,
    /// Create a media container without publishing it
    Create {
        #[arg(long)]
        text: Option<String>,
        #[arg(long, default_value = "TEXT")]
        media_type: MediaType,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        video_url: Option<String>,
        #[arg(long)]
        carousel_item: bool,
    },
    /// Publish a container
    Publish { creation_id: String },
    /// Create a carousel container from existing item containers
    Carousel {
        #[arg(required = true)]
        media_ids: Vec<String>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Publish a text post
    Post { text: String },
    /// Build the insight report for recent threads
    Report {
        /// Print CSV instead of JSON
        #[arg(long)]
        csv: bool,
        /// Insight requests to keep in flight
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("threads=info,threads_client=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ThreadsError>() {
            Some(error) => {
                ErrorReporter::new().report_error(error);
                eprintln!("error: {}", error.user_friendly_message());
            }
            None => {
                tracing::error!("{:#}", e);
                eprintln!("error: {:#}", e);
            }
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = ThreadsClient::new(load_config(&cli)?)?;

    let result = execute(&client, cli.command).await;
    if cli.stats {
        let metrics = client.metrics().await;
        eprintln!("{}", serde_json::to_string_pretty(&metrics)?);
    }
    result
}

async fn execute(client: &ThreadsClient, command: Command) -> anyhow::Result<()> {
    let output = match command {
        Command::Bio => serde_json::to_value(client.get_user_bio().await?)?,
        Command::RefreshToken => serde_json::to_value(client.get_long_lived_access_token().await?)?,
        Command::Insights { thread_id } => {
            serde_json::to_value(client.get_thread_insights(&thread_id).await?)?
        }
        Command::Conversation { media_id } => {
            serde_json::to_value(client.get_conversation(&media_id).await?)?
        }
        Command::List => serde_json::to_value(client.list_threads().await?)?,
        Command::Create {
            text,
            media_type,
            image_url,
            video_url,
            carousel_item,
        } => {
            let id = client
                .create_media_container(
                    text.as_deref(),
                    media_type,
                    image_url.as_deref(),
                    video_url.as_deref(),
                    carousel_item,
                )
                .await?;
            serde_json::json!({ "id": id })
        }
        Command::Publish { creation_id } => {
            let id = client.publish_container(&creation_id).await?;
            serde_json::json!({ "id": id })
        }
        Command::Carousel { media_ids, text } => {
            let id = client
                .create_carousel_container(media_ids.as_slice(), text.as_deref())
                .await?;
            serde_json::json!({ "id": id })
        }
        Command::Post { text } => {
            let id = client.publish_text(&text).await?;
            serde_json::json!({ "id": id })
        }
        Command::Report { csv, concurrency } => {
            let report = if concurrency > 1 {
                client.build_insight_report_concurrent(concurrency).await?
            } else {
                client.build_insight_report().await?
            };
            if csv {
                report
                    .write_csv(std::io::stdout().lock())
                    .context("failed to write CSV report")?;
                return Ok(());
            }
            serde_json::to_value(&report)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut builder = ClientConfig::builder();
    if let Some(path) = &cli.config {
        builder = builder.with_file(ConfigFile::load(path).map_err(ThreadsError::from)?);
    }
    if let Some(limit) = cli.limit {
        builder = builder.page_limit(Some(limit));
    }
    if let Some(days) = cli.backfill_days {
        builder = builder.backfill_days(days);
    }

    let config = builder.resolve(&ProcessEnv).map_err(ThreadsError::from)?;
    tracing::debug!(
        "Resolved config for account {} (limit {}, backfill {} days)",
        config.account_id,
        config.effective_limit(),
        config.backfill_days
    );
    Ok(config)
}
