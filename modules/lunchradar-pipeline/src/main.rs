use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use lunchradar_common::Config;
use lunchradar_pipeline::run::Pipeline;
use lunchradar_pipeline::sources;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lunchradar", about = "Acquire and merge lunch menus from configured sources")]
struct Args {
    /// Process every source regardless of cadence and list membership.
    #[arg(long)]
    force: bool,

    /// Wall-clock budget for the whole run, in seconds. Sources still in
    /// flight at the deadline are abandoned; completed ones are kept.
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    config.log_redacted();

    let pipeline = Pipeline::new(&config, sources::default_profile());
    let report = pipeline
        .run(args.force, Duration::from_secs(args.timeout_secs))
        .await?;

    info!("{report}");
    Ok(())
}
