//! collection-uploader - upload local directories into an xAI collection

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use collection_uploader::config::{Config, ConfigOptions, Credentials};
use collection_uploader::upload::{Coordinator, RunOutcome};
use collection_uploader::utils::prompt::{AssumeYes, Confirm, StdinPrompt};
use collection_uploader::XaiClient;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "collection-uploader")]
#[command(about = "Upload every file under one or more directories to an xAI collection")]
struct Args {
    /// Source directories to scan recursively
    #[arg(env = "UPLOAD_SOURCE_DIRS", value_delimiter = ',', required = true)]
    sources: Vec<PathBuf>,

    /// Target collection id
    #[arg(long, env = "XAI_COLLECTION_ID")]
    collection_id: String,

    /// Maximum number of parallel uploads
    #[arg(long, env = "UPLOAD_MAX_WORKERS")]
    max_workers: Option<usize>,

    /// Minimum seconds between upload starts (0 disables pacing)
    #[arg(long, env = "UPLOAD_RATE_LIMIT_INTERVAL")]
    rate_limit_interval: Option<f64>,

    /// Attempts per file when rate limited
    #[arg(long, env = "UPLOAD_MAX_RETRIES")]
    max_retries: Option<u32>,

    /// Base of the exponential backoff
    #[arg(long, env = "UPLOAD_BACKOFF_MULTIPLIER")]
    backoff_multiplier: Option<f64>,

    /// Skip files larger than this many bytes
    #[arg(long, env = "UPLOAD_MAX_FILE_SIZE")]
    max_file_size: Option<u64>,

    /// Extension to skip (repeatable, replaces the default set)
    #[arg(long = "skip-extension")]
    skip_extensions: Vec<String>,

    /// Files API base URL
    #[arg(long, env = "XAI_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Collections management API base URL
    #[arg(long, env = "XAI_MANAGEMENT_BASE_URL")]
    management_base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "UPLOAD_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
}

async fn run(args: Args) -> Result<RunOutcome> {
    let credentials = Credentials::from_env()?;

    let config = Config::new(
        args.collection_id,
        args.sources,
        credentials,
        ConfigOptions {
            max_workers: args.max_workers,
            rate_limit_interval_secs: args.rate_limit_interval,
            max_retries: args.max_retries,
            backoff_multiplier: args.backoff_multiplier,
            max_file_size: args.max_file_size,
            skip_extensions: args.skip_extensions,
            api_base_url: args.api_base_url,
            management_base_url: args.management_base_url,
            upload_timeout_secs: args.timeout,
            assume_yes: args.yes,
        },
    )?;

    info!("Initializing xAI client");
    let client = Arc::new(XaiClient::new(&config)?);
    let coordinator = Coordinator::from_config(client, &config);

    let mut gate: Box<dyn Confirm> = if config.assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinPrompt)
    };

    coordinator.run(&config, gate.as_mut()).await
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let collection_id = args.collection_id.clone();

    match run(args).await {
        Ok(RunOutcome::NothingToUpload) => println!("No files to upload."),
        Ok(RunOutcome::Cancelled) => println!("Upload cancelled."),
        Ok(RunOutcome::Completed(summary)) => {
            println!("{}", summary);
            println!("Collection ID: {}", collection_id);
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
