pub mod client;
pub mod error;
pub mod fetched;
pub mod provider;
pub mod synthetic;
pub mod wire;


pub use client::StrategyClient;
pub use error::{ApiResult, StrategyApiError};
pub use fetched::{FallbackReason, Fetched};
pub use provider::{StrategyDataSource, SyntheticDataSource};
pub use synthetic::SyntheticGenerator;

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8082";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Back-test window used by the dashboard when none is configured.
pub const DEFAULT_LOOKBACK_YEARS: u32 = 10;

/// Configuration for the strategy service client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Seed for the fallback generator; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            seed: None,
        }
    }
}

impl ClientConfig {
    /// Read `STRATEGY_API_URL` and `STRATEGY_API_TIMEOUT_MS`, keeping defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup("STRATEGY_API_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.base_url),
            timeout: lookup("STRATEGY_API_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            seed: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
