use anyhow::{bail, Context, Result};
use std::time::Duration;
use strategy_client::{ClientConfig, DEFAULT_LOOKBACK_YEARS};

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub client: ClientConfig,
    pub lookback_years: u32,

    // Run mode
    pub offline: bool, // synthetic source only, no HTTP
    pub offline_latency: Option<Duration>,
    pub once: bool,    // render every card once, then exit

    // Poll intervals
    pub regime_interval: Duration,  // 30s
    pub signal_interval: Duration,  // 60s
    pub equity_interval: Duration,  // 300s
    pub metrics_interval: Duration, // 300s
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            lookback_years: DEFAULT_LOOKBACK_YEARS,
            offline: false,
            offline_latency: None,
            once: false,
            regime_interval: Duration::from_secs(30),
            signal_interval: Duration::from_secs(60),
            equity_interval: Duration::from_secs(300),
            metrics_interval: Duration::from_secs(300),
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from variables resolved by `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let interval = |key: &str, default: Duration| parse_interval(key, lookup(key), default);
        Ok(Self {
            client: ClientConfig::from_lookup(&lookup),
            lookback_years: lookup("STRATEGY_LOOKBACK_YEARS")
                .unwrap_or_else(|| defaults.lookback_years.to_string())
                .parse()
                .context("STRATEGY_LOOKBACK_YEARS must be a whole number of years")?,
            offline: lookup("MONITOR_OFFLINE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            offline_latency: match lookup("MONITOR_OFFLINE_LATENCY_MS") {
                Some(v) => {
                    let ms: u64 = v
                        .parse()
                        .context("MONITOR_OFFLINE_LATENCY_MS must be a number of milliseconds")?;
                    (ms > 0).then(|| Duration::from_millis(ms))
                }
                None => None,
            },
            once: false,
            regime_interval: interval("MONITOR_REGIME_INTERVAL_SECS", defaults.regime_interval)?,
            signal_interval: interval("MONITOR_SIGNAL_INTERVAL_SECS", defaults.signal_interval)?,
            equity_interval: interval("MONITOR_EQUITY_INTERVAL_SECS", defaults.equity_interval)?,
            metrics_interval: interval("MONITOR_METRICS_INTERVAL_SECS", defaults.metrics_interval)?,
        })
    }

    /// Apply `--once`, `--offline` and `--seed <n>`; `args` excludes the program name.
    pub fn apply_args(mut self, args: &[String]) -> Result<Self> {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--once" => self.once = true,
                "--offline" => self.offline = true,
                "--seed" => {
                    let value = iter.next().context("--seed requires a value")?;
                    let seed = value
                        .parse()
                        .with_context(|| format!("invalid seed: {}", value))?;
                    self.client = self.client.with_seed(seed);
                }
                other => bail!("unknown argument: {}", other),
            }
        }
        Ok(self)
    }
}

fn parse_interval(key: &str, value: Option<String>, default: Duration) -> Result<Duration> {
    match value {
        Some(v) => {
            let secs: u64 = v
                .parse()
                .with_context(|| format!("{} must be a number of seconds", key))?;
            if secs == 0 {
                bail!("{} must be greater than zero", key);
            }
            Ok(Duration::from_secs(secs))
        }
        None => Ok(default),
    }
}
