use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod feed;
mod server;

#[derive(Parser, Debug, Clone)]
#[command(name = "streamwatch")]
#[command(author, version, about = "Streamwatch - live/offline presence of followed channels")]
pub struct Args {
    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = "postgres://streamwatch@localhost:5432/streamwatch")]
    pub db_url: String,

    /// Keep streamer records in memory instead of Postgres
    #[arg(long, default_value = "false")]
    pub in_memory: bool,

    #[arg(long, default_value = "false")]
    pub skip_migrations: bool,

    /// Followed broadcaster ids, comma separated
    #[arg(long, value_delimiter = ',')]
    pub broadcaster_ids: Vec<String>,

    /// JSON array of streamer records registered before the snapshot is read
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Newline-delimited JSON events. Reads stdin when omitted.
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Attempts per store write, including the first
    #[arg(long, default_value_t = 3)]
    pub write_retries: u32,

    #[arg(long, default_value_t = 50)]
    pub retry_backoff_ms: u64,

    #[arg(long, short = 'v', default_value = "false")]
    pub verbose: bool,
}

fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose { "streamwatch=debug" } else { "streamwatch=info" };
    let filter = EnvFilter::from_default_env().add_directive(level.parse()?);
    // stdout carries the views
    let sub = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(sub)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose)?;
    info!(
        "Streamwatch starting. in_memory={}, followed={}",
        args.in_memory,
        args.broadcaster_ids.len()
    );

    if let Err(e) = server::run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
