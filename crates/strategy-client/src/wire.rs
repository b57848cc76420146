//! Response shapes of the strategy service and their mapping into domain types.

use serde::Deserialize;
use strategy_core::{EquityCurve, EquityPoint, PerformanceMetrics, RegimeSnapshot, TradeSignal, NOTIONAL_BASE};

use crate::synthetic::{DEFAULT_TOTAL_TRADES, DEFAULT_WIN_RATE};

/// `GET /regime/latest`
#[derive(Debug, Clone, Deserialize)]
pub struct RegimeResponse {
    pub bull_probability: f64,
    pub bear_probability: f64,
    pub sideways_probability: f64,
}

impl RegimeResponse {
    /// Reshape into the ordered snapshot. Values are passed through as-is.
    pub fn into_snapshot(self) -> RegimeSnapshot {
        warn_if_not_probability("bull_probability", self.bull_probability);
        warn_if_not_probability("bear_probability", self.bear_probability);
        warn_if_not_probability("sideways_probability", self.sideways_probability);

        RegimeSnapshot::from_probabilities(
            self.bull_probability,
            self.bear_probability,
            self.sideways_probability,
        )
    }
}

/// `GET /signal/latest`. The wire names already match [`TradeSignal`].
pub fn check_signal(signal: TradeSignal) -> TradeSignal {
    warn_if_not_probability("confidence", signal.confidence);
    for p in &signal.regime_probabilities {
        warn_if_not_probability("regime_probs", *p);
    }
    signal
}

/// Curve part of `GET /backtest`
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestCurveResponse {
    pub dates: Vec<String>,
    pub strategy_cumulative: Vec<f64>,
    pub benchmark_cumulative: Vec<f64>,
}

impl BacktestCurveResponse {
    /// Zip the parallel sequences into points scaled by the notional base.
    ///
    /// Iteration is bounded by `dates`; extra trailing values are dropped.
    pub fn into_curve(self) -> EquityCurve {
        let dates = self.dates.len();
        let strategy = self.strategy_cumulative.len();
        let benchmark = self.benchmark_cumulative.len();
        if strategy != dates || benchmark != dates {
            tracing::warn!(
                dates,
                strategy,
                benchmark,
                "Backtest sequences differ in length, truncating to {}",
                dates.min(strategy).min(benchmark)
            );
        }

        let points = self
            .dates
            .into_iter()
            .zip(self.strategy_cumulative)
            .zip(self.benchmark_cumulative)
            .map(|((date, s), b)| EquityPoint {
                date,
                strategy_equity: s * NOTIONAL_BASE,
                benchmark_equity: b * NOTIONAL_BASE,
            })
            .collect();

        EquityCurve::new(points)
    }
}

/// Metrics part of `GET /backtest`
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestMetricsResponse {
    pub strategy_metrics: StrategyMetrics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyMetrics {
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl BacktestMetricsResponse {
    /// Win rate and trade count are not part of the service contract and are
    /// always filled with the defaults.
    pub fn into_metrics(self) -> PerformanceMetrics {
        let m = self.strategy_metrics;
        PerformanceMetrics {
            cagr: m.annualized_return,
            sharpe: m.sharpe_ratio,
            max_drawdown: m.max_drawdown,
            win_rate: DEFAULT_WIN_RATE,
            total_trades: DEFAULT_TOTAL_TRADES,
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

fn warn_if_not_probability(field: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        tracing::warn!(field, value, "Probability outside [0, 1], passing through");
    }
}
