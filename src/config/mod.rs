//! Configuration management for Curator Studio.
//!
//! Loads settings from an optional config file and `CURATOR__*` environment
//! variables (e.g. `CURATOR__LEDGER__CHAIN_ID=8453`).

mod chain;

pub use chain::Chain;

use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chain and contract endpoints
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Batch read behavior
    #[serde(default)]
    pub reader: ReaderConfig,
    /// Slice sizes of the ranked views
    #[serde(default)]
    pub views: ViewsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// EVM chain id (8453 Base, 84532 Base Sepolia, 31337 Foundry)
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// JSON-RPC endpoint; the chain's public endpoint when unset
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Strategy factory; the chain's known deployment when unset
    #[serde(default)]
    pub factory_address: Option<String>,
    /// HTTP timeout per JSON-RPC request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Give up on unsettled calls after this long (unset = wait for all)
    #[serde(default)]
    pub settle_timeout_ms: Option<u64>,
    /// Refresh interval of the `watch` command
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsConfig {
    /// Home page top strategies by allocation
    #[serde(default = "default_top_strategies")]
    pub top_strategies: usize,
    /// Home page trending strategies by donors
    #[serde(default = "default_trending")]
    pub trending: usize,
    /// Analytics curator leaderboard
    #[serde(default = "default_top_curators")]
    pub top_curators: usize,
    /// Analytics allocation chart
    #[serde(default = "default_chart_strategies")]
    pub chart_strategies: usize,
}

fn default_chain_id() -> u64 {
    31337 // local Anvil
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    30
}

fn default_top_strategies() -> usize {
    5
}

fn default_trending() -> usize {
    3
}

fn default_top_curators() -> usize {
    5
}

fn default_chart_strategies() -> usize {
    10
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("CURATOR"));

        Self::build(builder)
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.ledger.request_timeout_secs > 0,
            "request_timeout_secs must be positive"
        );

        let rpc_url = self.ledger.rpc_url();
        let parsed = reqwest::Url::parse(&rpc_url)
            .with_context(|| format!("Invalid rpc_url: {rpc_url}"))?;
        anyhow::ensure!(
            matches!(parsed.scheme(), "http" | "https"),
            "rpc_url must use http or https, got {}",
            parsed.scheme()
        );

        if let Some(raw) = &self.ledger.factory_address {
            parse_address(raw)?;
        }

        anyhow::ensure!(
            self.reader.settle_timeout_ms != Some(0),
            "settle_timeout_ms must be positive when set"
        );
        anyhow::ensure!(
            self.reader.poll_interval_secs > 0,
            "poll_interval_secs must be positive"
        );

        anyhow::ensure!(
            self.views.top_strategies > 0
                && self.views.trending > 0
                && self.views.top_curators > 0
                && self.views.chart_strategies > 0,
            "view sizes must be positive"
        );

        Ok(())
    }
}

impl LedgerConfig {
    pub fn chain(&self) -> Chain {
        Chain::from_id(self.chain_id)
    }

    /// Configured endpoint, or the chain's default.
    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.chain().default_rpc_url().to_string())
    }

    /// Configured factory, or the chain's known deployment.
    ///
    /// Fails when neither yields a non-zero address.
    pub fn factory_address(&self) -> Result<Address> {
        let factory = match &self.factory_address {
            Some(raw) => parse_address(raw)?,
            None => self.chain().factory_address(),
        };

        anyhow::ensure!(
            !factory.is_zero(),
            "No strategy factory known for {} (chain {}); set CURATOR__LEDGER__FACTORY_ADDRESS",
            self.chain(),
            self.chain_id
        );
        Ok(factory)
    }
}

impl ReaderConfig {
    pub fn settle_timeout(&self) -> Option<Duration> {
        self.settle_timeout_ms.map(Duration::from_millis)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid factory_address: {raw}"))
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            rpc_url: None,
            factory_address: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            settle_timeout_ms: None,
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            top_strategies: default_top_strategies(),
            trending: default_trending(),
            top_curators: default_top_curators(),
            chart_strategies: default_chart_strategies(),
        }
    }
}
