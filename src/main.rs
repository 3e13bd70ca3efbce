use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

use tubefeed::config::{Config, DEFAULT_CONFIG_PATH};
use tubefeed::pipeline;
use tubefeed::youtube::YouTubeClient;

#[derive(Parser, Debug)]
#[command(
    name = "tubefeed",
    about = "Build an RSS feed of recently published videos from YouTube playlists"
)]
struct Args {
    /// Config file (TOML)
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Output file, overrides `output` in the config file
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Publish window in days, overrides `window_days` in the config file
    #[arg(long, value_name = "N")]
    window_days: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?;
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(days) = args.window_days {
        config.window_days = days;
    }
    tracing::debug!(?config, "Effective configuration");

    // Everything that can be checked locally is checked before any request
    let pipeline_config = config.pipeline_config()?;
    let api_key = config.resolve_api_key()?;

    let http_client = reqwest::Client::builder()
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;
    let client = YouTubeClient::with_base_url(http_client, api_key, &config.api_base_url)
        .context("Invalid API base URL")?;

    // One clock reading drives both the window cutoff and lastBuildDate
    let now = Utc::now();
    let summary = pipeline::run(&client, &pipeline_config, &config.output, now).await?;

    println!(
        "Wrote {} ({} {})",
        config.output.display(),
        summary.entries,
        if summary.entries == 1 { "entry" } else { "entries" }
    );
    Ok(())
}
