use serde::de::DeserializeOwned;
use std::sync::Arc;
use strategy_core::{EquityCurve, PerformanceMetrics, RegimeSnapshot, TradeSignal};

use crate::error::{ApiResult, StrategyApiError};
use crate::fetched::{FallbackReason, Fetched};
use crate::synthetic::SyntheticGenerator;
use crate::wire::{
    check_signal, BacktestCurveResponse, BacktestMetricsResponse, HealthResponse, RegimeResponse,
};
use crate::ClientConfig;

/// HTTP client for the strategy engine's read-only endpoints.
///
/// The `try_*` methods surface every failure. The plain query methods never
/// fail: any error is logged and answered with synthetic data.
#[derive(Clone)]
pub struct StrategyClient {
    client: reqwest::Client,
    base_url: String,
    synthetic: Arc<SyntheticGenerator>,
}

impl StrategyClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        let synthetic = match config.seed {
            Some(seed) => SyntheticGenerator::seeded(seed),
            None => SyntheticGenerator::from_entropy(),
        };
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            synthetic: Arc::new(synthetic),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, years: Option<u32>) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(years) = years {
            request = request.query(&[("years", years)]);
        }

        tracing::debug!("GET {} (years={:?})", url, years);
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(StrategyApiError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Latest regime probabilities, ordered Bull, Bear, Sideways
    pub async fn try_regime(&self) -> ApiResult<RegimeSnapshot> {
        let resp: RegimeResponse = self.get_json("/regime/latest", None).await?;
        Ok(resp.into_snapshot())
    }

    pub async fn try_signal(&self) -> ApiResult<TradeSignal> {
        let signal: TradeSignal = self.get_json("/signal/latest", None).await?;
        Ok(check_signal(signal))
    }

    /// Back-test equity curve over the last `years`, scaled to the notional base
    pub async fn try_equity_curve(&self, years: u32) -> ApiResult<EquityCurve> {
        let resp: BacktestCurveResponse = self.get_json("/backtest", Some(years)).await?;
        Ok(resp.into_curve())
    }

    pub async fn try_performance_metrics(&self, years: u32) -> ApiResult<PerformanceMetrics> {
        let resp: BacktestMetricsResponse = self.get_json("/backtest", Some(years)).await?;
        Ok(resp.into_metrics())
    }

    pub async fn regime(&self) -> Fetched<RegimeSnapshot> {
        match self.try_regime().await {
            Ok(snapshot) => Fetched::Live(snapshot),
            Err(e) => self.fall_back("regime", &e, self.synthetic.regime_snapshot()),
        }
    }

    pub async fn signal(&self) -> Fetched<TradeSignal> {
        match self.try_signal().await {
            Ok(signal) => Fetched::Live(signal),
            Err(e) => self.fall_back("signal", &e, self.synthetic.trade_signal()),
        }
    }

    /// Falls back to the full synthetic curve regardless of `years`.
    pub async fn equity_curve(&self, years: u32) -> Fetched<EquityCurve> {
        match self.try_equity_curve(years).await {
            Ok(curve) => Fetched::Live(curve),
            Err(e) => self.fall_back("equity_curve", &e, self.synthetic.equity_curve()),
        }
    }

    pub async fn performance_metrics(&self, years: u32) -> Fetched<PerformanceMetrics> {
        match self.try_performance_metrics(years).await {
            Ok(metrics) => Fetched::Live(metrics),
            Err(e) => self.fall_back("performance_metrics", &e, self.synthetic.performance_metrics()),
        }
    }

    fn fall_back<T>(&self, query: &str, err: &StrategyApiError, data: T) -> Fetched<T> {
        let reason = FallbackReason::from(err);
        tracing::warn!(query, base_url = %self.base_url, %reason, "Error fetching {}: {}, using synthetic data", query, err);
        Fetched::fallback(data, reason)
    }

    /// Check service health
    pub async fn health(&self) -> ApiResult<bool> {
        match self.get_json::<HealthResponse>("/health", None).await {
            Ok(resp) => Ok(resp.status == "ok"),
            Err(StrategyApiError::Status(code)) => {
                tracing::debug!("Health check returned {}", code);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
