use async_trait::async_trait;
use std::time::Duration;
use strategy_core::{EquityCurve, PerformanceMetrics, RegimeSnapshot, TradeSignal};

use crate::client::StrategyClient;
use crate::fetched::Fetched;
use crate::synthetic::SyntheticGenerator;

/// Backend-agnostic source of dashboard data.
///
/// Implemented by the HTTP client (live with fallback) and by the offline
/// synthetic source. Every method yields a value.
#[async_trait]
pub trait StrategyDataSource: Send + Sync {
    async fn regime_snapshot(&self) -> Fetched<RegimeSnapshot>;

    async fn trade_signal(&self) -> Fetched<TradeSignal>;

    async fn equity_curve(&self, years: u32) -> Fetched<EquityCurve>;

    async fn performance_metrics(&self, years: u32) -> Fetched<PerformanceMetrics>;

    fn backend_name(&self) -> &'static str;
}

#[async_trait]
impl StrategyDataSource for StrategyClient {
    async fn regime_snapshot(&self) -> Fetched<RegimeSnapshot> {
        self.regime().await
    }

    async fn trade_signal(&self) -> Fetched<TradeSignal> {
        self.signal().await
    }

    async fn equity_curve(&self, years: u32) -> Fetched<EquityCurve> {
        StrategyClient::equity_curve(self, years).await
    }

    async fn performance_metrics(&self, years: u32) -> Fetched<PerformanceMetrics> {
        StrategyClient::performance_metrics(self, years).await
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

/// Offline source for development. Answers are tagged live since they are
/// what was asked for, not a substitute.
pub struct SyntheticDataSource {
    generator: SyntheticGenerator,
    latency: Option<Duration>,
}

impl SyntheticDataSource {
    pub fn new(generator: SyntheticGenerator) -> Self {
        Self {
            generator,
            latency: None,
        }
    }

    /// Delay every answer, to mimic a remote round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl From<SyntheticGenerator> for SyntheticDataSource {
    fn from(generator: SyntheticGenerator) -> Self {
        Self::new(generator)
    }
}

#[async_trait]
impl StrategyDataSource for SyntheticDataSource {
    async fn regime_snapshot(&self) -> Fetched<RegimeSnapshot> {
        self.simulate_latency().await;
        Fetched::Live(self.generator.regime_snapshot())
    }

    async fn trade_signal(&self) -> Fetched<TradeSignal> {
        self.simulate_latency().await;
        Fetched::Live(self.generator.trade_signal())
    }

    async fn equity_curve(&self, _years: u32) -> Fetched<EquityCurve> {
        self.simulate_latency().await;
        Fetched::Live(self.generator.equity_curve())
    }

    async fn performance_metrics(&self, _years: u32) -> Fetched<PerformanceMetrics> {
        self.simulate_latency().await;
        Fetched::Live(self.generator.performance_metrics())
    }

    fn backend_name(&self) -> &'static str {
        "synthetic"
    }
}
