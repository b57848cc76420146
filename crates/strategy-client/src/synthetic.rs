//! Synthetic strategy data.
//!
//! Used as the fallback for every failed query and as a standalone offline
//! source. Nothing here performs I/O, so nothing here can fail.

use chrono::{DateTime, Months, NaiveDate, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use strategy_core::{
    EquityCurve, EquityPoint, PerformanceMetrics, RegimeSnapshot, TradeAction, TradeSignal,
    NOTIONAL_BASE,
};

/// Win rate reported when the service does not supply one.
pub const DEFAULT_WIN_RATE: f64 = 0.67;
/// Trade count reported when the service does not supply one.
pub const DEFAULT_TOTAL_TRADES: u32 = 342;

/// First month of every synthetic equity curve.
pub fn curve_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn regime_snapshot() -> RegimeSnapshot {
    RegimeSnapshot::from_probabilities(0.65, 0.15, 0.20)
}

pub fn trade_signal(now: DateTime<Utc>) -> TradeSignal {
    TradeSignal {
        action: TradeAction::Buy,
        confidence: 0.82,
        observed_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        regime_probabilities: vec![0.65, 0.15, 0.20],
        weighted_signal: 0.5,
    }
}

pub fn performance_metrics() -> PerformanceMetrics {
    PerformanceMetrics {
        cagr: 0.124,
        sharpe: 1.85,
        max_drawdown: -0.089,
        win_rate: DEFAULT_WIN_RATE,
        total_trades: DEFAULT_TOTAL_TRADES,
    }
}

/// One month of (strategy, benchmark) returns.
///
/// Strategy returns lie in [-0.010, 0.030), benchmark in [-0.0098, 0.0252).
pub fn monthly_returns<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let strategy = (rng.gen::<f64>() - 0.45) * 0.04 + 0.008;
    let benchmark = (rng.gen::<f64>() - 0.48) * 0.035 + 0.007;
    (strategy, benchmark)
}

/// Monthly compounded curve from `start` through `end` inclusive.
///
/// Both balances start at the notional base and compound unrounded; each
/// point reports them rounded to whole units.
pub fn equity_curve<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> EquityCurve {
    let mut points = Vec::new();
    let mut equity = NOTIONAL_BASE;
    let mut benchmark = NOTIONAL_BASE;
    let mut month = 0u32;

    while let Some(date) = start.checked_add_months(Months::new(month)) {
        if date > end {
            break;
        }
        let (strategy_return, benchmark_return) = monthly_returns(rng);
        equity *= 1.0 + strategy_return;
        benchmark *= 1.0 + benchmark_return;

        points.push(EquityPoint {
            date: date.format("%Y-%m-%d").to_string(),
            strategy_equity: equity.round(),
            benchmark_equity: benchmark.round(),
        });
        month += 1;
    }

    EquityCurve::new(points)
}

/// Generator with an owned, injectable random source.
pub struct SyntheticGenerator {
    rng: Mutex<StdRng>,
}

impl SyntheticGenerator {
    pub fn new(rng: StdRng) -> Self {
        Self { rng: Mutex::new(rng) }
    }

    /// Reproducible output for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn regime_snapshot(&self) -> RegimeSnapshot {
        regime_snapshot()
    }

    pub fn trade_signal(&self) -> TradeSignal {
        trade_signal(Utc::now())
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        performance_metrics()
    }

    /// Curve from 2014-01-01 through today.
    pub fn equity_curve(&self) -> EquityCurve {
        self.equity_curve_until(Utc::now().date_naive())
    }

    pub fn equity_curve_until(&self, end: NaiveDate) -> EquityCurve {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        equity_curve(&mut *rng, curve_start(), end)
    }
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}
