use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Notional account size used to turn cumulative-return ratios into balances.
pub const NOTIONAL_BASE: f64 = 100_000.0;

/// Market regime identified by the strategy engine's HMM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeKind {
    Bull,
    Bear,
    Sideways,
}

impl RegimeKind {
    /// Display order used by every regime snapshot.
    pub const ORDER: [RegimeKind; 3] = [RegimeKind::Bull, RegimeKind::Bear, RegimeKind::Sideways];

    pub fn label(&self) -> &'static str {
        match self {
            RegimeKind::Bull => "Bull Market",
            RegimeKind::Bear => "Bear Market",
            RegimeKind::Sideways => "Sideways",
        }
    }

    /// Chart palette token, fixed per position.
    pub fn display_color(&self) -> &'static str {
        match self {
            RegimeKind::Bull => "hsl(var(--chart-2))",
            RegimeKind::Bear => "hsl(var(--chart-5))",
            RegimeKind::Sideways => "hsl(var(--chart-3))",
        }
    }
}

/// One slice of the regime probability chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeProbability {
    #[serde(rename = "regime")]
    pub label: String,
    #[serde(rename = "prob")]
    pub probability: f64,
    #[serde(rename = "color")]
    pub display_color: String,
}

impl RegimeProbability {
    pub fn new(kind: RegimeKind, probability: f64) -> Self {
        Self {
            label: kind.label().to_string(),
            probability,
            display_color: kind.display_color().to_string(),
        }
    }
}

/// Latest regime probabilities, always ordered Bull, Bear, Sideways.
///
/// Probabilities are carried exactly as reported. They are not clamped to
/// [0, 1] and are not renormalized to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegimeSnapshot {
    pub entries: Vec<RegimeProbability>,
}

impl RegimeSnapshot {
    pub fn from_probabilities(bull: f64, bear: f64, sideways: f64) -> Self {
        let entries = RegimeKind::ORDER
            .iter()
            .zip([bull, bear, sideways])
            .map(|(kind, p)| RegimeProbability::new(*kind, p))
            .collect();
        Self { entries }
    }

    /// Entry with the highest probability. Ties keep the earlier position.
    pub fn dominant(&self) -> Option<&RegimeProbability> {
        self.entries.iter().fold(None, |best, entry| match best {
            Some(b) if b.probability >= entry.probability => Some(b),
            _ => Some(entry),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trade action emitted by the strategy. Decoding is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
            TradeAction::Hold => "HOLD",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TradeAction::Buy),
            "SELL" => Ok(TradeAction::Sell),
            "HOLD" => Ok(TradeAction::Hold),
            other => Err(CoreError::UnknownAction(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for TradeAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Latest trade signal, one per poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub action: TradeAction,
    pub confidence: f64,
    /// ISO-8601 timestamp exactly as the service reported it
    #[serde(rename = "timestamp")]
    pub observed_at: String,
    #[serde(rename = "regime_probs")]
    pub regime_probabilities: Vec<f64>,
    pub weighted_signal: f64,
}

impl TradeSignal {
    /// Parsed observation time, if the service sent RFC 3339.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.observed_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// One point of the back-test equity curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: String,
    #[serde(rename = "equity")]
    pub strategy_equity: f64,
    #[serde(rename = "benchmark")]
    pub benchmark_equity: f64,
}

impl EquityPoint {
    /// Calendar day of this point. Finer-grained timestamps are cut to the day.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        let day = self.date.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// Chronological equity curve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquityCurve {
    pub points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn new(points: Vec<EquityPoint>) -> Self {
        Self { points }
    }

    pub fn first(&self) -> Option<&EquityPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&EquityPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Strategy return from the first to the last point, as a fraction.
    pub fn total_return(&self) -> Option<f64> {
        self.span_return(|p| p.strategy_equity)
    }

    pub fn benchmark_return(&self) -> Option<f64> {
        self.span_return(|p| p.benchmark_equity)
    }

    fn span_return(&self, value: impl Fn(&EquityPoint) -> f64) -> Option<f64> {
        let start = value(self.first()?);
        let end = value(self.last()?);
        if start == 0.0 {
            return None;
        }
        Some(end / start - 1.0)
    }
}

/// Back-test performance snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Compound annual growth rate as a fraction (0.124 = 12.4%)
    pub cagr: f64,
    pub sharpe: f64,
    /// Largest peak-to-trough decline, negative fraction
    #[serde(rename = "max_dd")]
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub total_trades: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regime_snapshot_order_and_passthrough() {
        let snapshot = RegimeSnapshot::from_probabilities(0.1, 0.7, 1.4);

        let labels: Vec<&str> = snapshot.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Bull Market", "Bear Market", "Sideways"]);
        assert_eq!(snapshot.entries[2].probability, 1.4);
        assert_eq!(snapshot.entries[1].display_color, "hsl(var(--chart-5))");
    }

    #[test]
    fn test_dominant_regime() {
        let snapshot = RegimeSnapshot::from_probabilities(0.2, 0.5, 0.3);
        assert_eq!(snapshot.dominant().unwrap().label, "Bear Market");

        let tied = RegimeSnapshot::from_probabilities(0.4, 0.4, 0.2);
        assert_eq!(tied.dominant().unwrap().label, "Bull Market");
    }

    #[test]
    fn test_trade_action_parsing() {
        assert_eq!("buy".parse::<TradeAction>().unwrap(), TradeAction::Buy);
        assert_eq!(" SELL ".parse::<TradeAction>().unwrap(), TradeAction::Sell);
        assert!("SHORT".parse::<TradeAction>().is_err());
        assert_eq!(TradeAction::Hold.to_string(), "HOLD");
    }

    #[test]
    fn test_trade_signal_wire_names() {
        let json = r#"{"action":"SELL","confidence":0.4,"timestamp":"2024-03-01T12:00:00Z",
            "regime_probs":[0.1,0.8,0.1],"weighted_signal":-0.3}"#;
        let signal: TradeSignal = serde_json::from_str(json).unwrap();

        assert_eq!(signal.action, TradeAction::Sell);
        assert_eq!(signal.regime_probabilities, vec![0.1, 0.8, 0.1]);
        assert!(signal.observed_at().is_some());
    }

    #[test]
    fn test_trade_signal_action_decoding() {
        let decode = |action: &str| {
            let json = format!(
                r#"{{"action":"{}","confidence":0.5,"timestamp":"","regime_probs":[],"weighted_signal":0.0}}"#,
                action
            );
            serde_json::from_str::<TradeSignal>(&json)
        };

        assert_eq!(decode("hold").unwrap().action, TradeAction::Hold);
        assert_eq!(decode("Buy").unwrap().action, TradeAction::Buy);

        let err = decode("SHORT").unwrap_err();
        assert!(err.to_string().contains("Unknown trade action: SHORT"), "{}", err);
        assert_eq!(serde_json::to_string(&TradeAction::Sell).unwrap(), r#""SELL""#);
    }

    #[test]
    fn test_equity_point_calendar_date() {
        let point = EquityPoint {
            date: "2020-02-01T00:00:00".to_string(),
            strategy_equity: 1.0,
            benchmark_equity: 1.0,
        };
        assert_eq!(point.calendar_date(), NaiveDate::from_ymd_opt(2020, 2, 1));
    }

    #[test]
    fn test_curve_returns() {
        let curve = EquityCurve::new(vec![
            EquityPoint { date: "2020-01-01".into(), strategy_equity: 100_000.0, benchmark_equity: 100_000.0 },
            EquityPoint { date: "2020-02-01".into(), strategy_equity: 125_000.0, benchmark_equity: 90_000.0 },
        ]);

        assert!((curve.total_return().unwrap() - 0.25).abs() < 1e-12);
        assert!((curve.benchmark_return().unwrap() + 0.10).abs() < 1e-12);
        assert!(EquityCurve::default().total_return().is_none());
    }
}
