/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed feed check configuration
[POS]:    Configuration layer - endpoint and scenario selection
[UPDATE]: When adding new configuration options
*/

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use coinbasepro_feed::scenario::{DEFAULT_FOLLOW_UP_LIMIT, DEFAULT_PRODUCT_ID};
use coinbasepro_feed::{RunOptions, SANDBOX_FEED_URL, Scenario, ScenarioKind};
use serde::{Deserialize, Serialize};

/// Top-level configuration for a feed check run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckConfig {
    /// Feed endpoint
    #[serde(default = "default_url")]
    pub url: String,
    /// Products subscribed to by product-scoped channels
    #[serde(default = "default_product_ids")]
    pub product_ids: Vec<String>,
    /// Scenarios to run, in order
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<ScenarioKind>,
    /// Bound on waiting past subscription acknowledgements; unbounded when absent
    #[serde(default)]
    pub subscribe_timeout_secs: Option<u64>,
    /// Receives allowed while waiting for a follow-up message
    #[serde(default = "default_follow_up_limit")]
    pub follow_up_limit: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            product_ids: default_product_ids(),
            scenarios: default_scenarios(),
            subscribe_timeout_secs: None,
            follow_up_limit: default_follow_up_limit(),
        }
    }
}

fn default_url() -> String {
    SANDBOX_FEED_URL.to_string()
}

fn default_product_ids() -> Vec<String> {
    vec![DEFAULT_PRODUCT_ID.to_string()]
}

fn default_scenarios() -> Vec<ScenarioKind> {
    ScenarioKind::ALL.to_vec()
}

fn default_follow_up_limit() -> usize {
    DEFAULT_FOLLOW_UP_LIMIT
}

impl CheckConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content).context("parse config yaml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            bail!("url must start with ws:// or wss://, got {}", self.url);
        }
        if self.scenarios.is_empty() {
            bail!("at least one scenario is required");
        }
        if self.follow_up_limit == 0 {
            bail!("follow_up_limit must be positive");
        }
        if self.product_ids.iter().any(|id| id.trim().is_empty()) {
            bail!("product_ids must not contain empty entries");
        }
        if self.subscribe_timeout_secs == Some(0) {
            bail!("subscribe_timeout_secs must be positive when set");
        }
        Ok(())
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            subscribe_timeout: self.subscribe_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Scenarios to run with product and follow-up overrides applied
    pub fn resolved_scenarios(&self) -> Vec<Scenario> {
        self.scenarios
            .iter()
            .map(|kind| {
                kind.scenario()
                    .with_product_ids(&self.product_ids)
                    .with_follow_up_limit(self.follow_up_limit)
            })
            .collect()
    }
}
