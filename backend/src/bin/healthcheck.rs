//! Probe an HTTP health endpoint; exit non-zero unless it answers 200.
//!
//! Intended as a container `HEALTHCHECK` command, where no shell or curl is
//! available.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail};
use reqwest::StatusCode;
use tokio::runtime::Builder;

/// `healthcheck` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "healthcheck",
    about = "Exit successfully only when the health endpoint answers 200",
    version
)]
struct CliArgs {
    /// Health endpoint to probe.
    #[arg(long, value_name = "url", default_value = "http://localhost:7777/health")]
    url: String,
    /// Request timeout in seconds.
    #[arg(long, value_name = "seconds", default_value_t = 3)]
    timeout: u64,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(probe(&args))
}

async fn probe(args: &CliArgs) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()
        .wrap_err("build HTTP client")?;
    let response = client
        .get(&args.url)
        .send()
        .await
        .wrap_err_with(|| format!("request to {} failed", args.url))?;
    let status = response.status();
    if status != StatusCode::OK {
        bail!("{} answered {status}", args.url);
    }
    Ok(())
}
