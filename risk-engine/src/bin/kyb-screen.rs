use anyhow::Context;
use clap::Parser;
use compliance_service::{RiskLevel, ScreeningEngine};
use risk_engine::{telemetry, Config};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "kyb-screen",
    about = "Screen a company against the OFAC SDN list and print the verdict as JSON",
    version
)]
struct Cli {
    /// Company name to screen
    company: String,
    /// Company domain, adds domain-derived search terms
    #[arg(long)]
    domain: Option<String>,
    /// TOML config file (defaults plus KYB_* environment otherwise)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::from_env().context("loading config from environment")?,
    };
    telemetry::init(&config.log)?;
    info!(service = %config.service_name, company = %cli.company, "Screening requested");

    let engine = ScreeningEngine::ofac(&config.screening)?;
    let verdict = engine.screen(&cli.company, cli.domain.as_deref()).await;

    println!("{}", serde_json::to_string_pretty(&verdict)?);

    if verdict.risk_level == RiskLevel::Error {
        std::process::exit(2);
    }
    Ok(())
}
