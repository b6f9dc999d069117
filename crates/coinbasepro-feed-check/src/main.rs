/*
[INPUT]:  CLI arguments, optional YAML configuration file
[OUTPUT]: Pass/fail result of each feed scenario, non-zero exit on any failure
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags or the run flow
*/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use coinbasepro_feed::{ScenarioKind, run_scenario};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use coinbasepro_feed_check::CheckConfig;

#[derive(Parser, Debug)]
#[command(
    name = "coinbasepro-feed-check",
    version,
    about = "Subscribe to Coinbase Pro feed channels and validate the messages they return"
)]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Run only these scenarios (repeatable)
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<ScenarioKind>,
    /// Override the feed endpoint
    #[arg(long = "url", value_name = "URL")]
    url: Option<String>,
    #[arg(long = "subscribe-timeout-secs", value_name = "SECS")]
    subscribe_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = load_config(&args)?;
    info!(
        url = %config.url,
        scenario_count = config.scenarios.len(),
        "configuration loaded"
    );

    let options = config.run_options();
    let scenarios = config.resolved_scenarios();
    let mut failed = 0usize;

    for scenario in &scenarios {
        info!(
            scenario = %scenario.name,
            channel = %scenario.channel,
            products = ?scenario.product_ids,
            "running scenario"
        );
        match run_scenario(&config.url, scenario, options).await {
            Ok(report) => {
                info!(
                    scenario = %report.scenario,
                    message_type = %report.first.message_type,
                    follow_up = report.follow_up.is_some(),
                    "PASS"
                );
            }
            Err(err) => {
                failed += 1;
                error!(
                    scenario = %scenario.name,
                    validation = err.is_validation_failure(),
                    error = %err,
                    "FAIL"
                );
            }
        }
    }

    info!(total = scenarios.len(), failed, "feed check complete");
    if failed > 0 {
        bail!("{failed} of {} scenarios failed", scenarios.len());
    }
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(args: &Cli) -> Result<CheckConfig> {
    let mut config = match args.config_path.as_deref() {
        Some(path) => read_config(path)?,
        None => CheckConfig::default(),
    };

    if !args.scenarios.is_empty() {
        config.scenarios = args.scenarios.clone();
    }
    if let Some(url) = &args.url {
        config.url = url.clone();
    }
    if args.subscribe_timeout_secs.is_some() {
        config.subscribe_timeout_secs = args.subscribe_timeout_secs;
    }

    config.validate().context("validate config")?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<CheckConfig> {
    CheckConfig::from_file(path).context("load config")
}
