//! Terminal cards for the four dashboard widgets.

use chrono::Local;
use std::fmt::Write;
use strategy_client::Fetched;
use strategy_core::{
    format_count, format_currency, format_percentage, format_ratio, EquityCurve, PerformanceMetrics,
    RegimeSnapshot, TradeAction, TradeSignal,
};

const BAR_WIDTH: usize = 24;
const SPARK_WIDTH: usize = 48;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Color class of a rendered value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Profit,
    Loss,
    Warning,
    Muted,
}

impl Tone {
    fn ansi(&self) -> &'static str {
        match self {
            Tone::Profit => "\x1b[32m",
            Tone::Loss => "\x1b[31m",
            Tone::Warning => "\x1b[33m",
            Tone::Muted => "\x1b[90m",
        }
    }

    pub fn for_action(action: TradeAction) -> Self {
        match action {
            TradeAction::Buy => Tone::Profit,
            TradeAction::Sell => Tone::Loss,
            TradeAction::Hold => Tone::Muted,
        }
    }

    pub fn for_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Tone::Profit
        } else if confidence >= 0.6 {
            Tone::Warning
        } else {
            Tone::Muted
        }
    }

    /// Profit/Loss by sign. With `positive_is_good = false`, negative values
    /// (e.g. a drawdown) read as profit.
    pub fn for_signed(value: f64, positive_is_good: bool) -> Self {
        let good = if positive_is_good { value > 0.0 } else { value < 0.0 };
        if good {
            Tone::Profit
        } else {
            Tone::Loss
        }
    }

    pub fn for_sharpe(sharpe: f64) -> Self {
        if sharpe > 1.0 {
            Tone::Profit
        } else {
            Tone::Warning
        }
    }

    pub fn for_win_rate(win_rate: f64) -> Self {
        if win_rate > 0.6 {
            Tone::Profit
        } else {
            Tone::Warning
        }
    }
}

/// Renders cards with or without ANSI color.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    pub color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if self.color {
            format!("{}{}\x1b[0m", tone.ansi(), text)
        } else {
            text.to_string()
        }
    }

    fn header<T>(&self, title: &str, fetched: &Fetched<T>) -> String {
        let badge = match fetched.reason() {
            None => "[Live]".to_string(),
            Some(reason) => self.paint(&format!("[Synthetic: {}]", reason), Tone::Warning),
        };
        format!("== {} {}\n", title, badge)
    }

    pub fn regime(&self, fetched: &Fetched<RegimeSnapshot>) -> String {
        let mut out = self.header("Current Regime Probabilities", fetched);
        for entry in &fetched.data().entries {
            let filled = (entry.probability.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
            let _ = writeln!(
                out,
                "  {:<12} {:>7}  {}{}",
                entry.label,
                format_percentage(entry.probability),
                "█".repeat(filled),
                "·".repeat(BAR_WIDTH - filled)
            );
        }
        if let Some(top) = fetched.data().dominant() {
            let _ = writeln!(out, "  Dominant: {}", top.label);
        }
        out
    }

    pub fn signal(&self, fetched: &Fetched<TradeSignal>) -> String {
        let signal = fetched.data();
        let mut out = self.header("Latest Trade Signal", fetched);

        let _ = writeln!(
            out,
            "  Current Signal     {}",
            self.paint(signal.action.as_str(), Tone::for_action(signal.action))
        );
        let _ = writeln!(
            out,
            "  Signal Confidence  {}",
            self.paint(&format_percentage(signal.confidence), Tone::for_confidence(signal.confidence))
        );
        let _ = writeln!(out, "  Weighted Signal    {}", format_ratio(signal.weighted_signal));
        let probs: Vec<String> = signal
            .regime_probabilities
            .iter()
            .map(|p| format_percentage(*p))
            .collect();
        let _ = writeln!(out, "  Regime Probs       [{}]", probs.join(", "));

        let updated = signal
            .observed_at()
            .map(|ts| ts.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(out, "  Last updated: {}", updated);
        out
    }

    pub fn equity(&self, fetched: &Fetched<EquityCurve>, years: u32) -> String {
        let curve = fetched.data();
        let mut out = self.header(&format!("Back-test Performance ({} yr)", years), fetched);

        let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
            out.push_str("  No equity data\n");
            return out;
        };

        let _ = writeln!(out, "  {} .. {} ({} points)", first.date, last.date, curve.len());
        let _ = writeln!(
            out,
            "  Strategy   {:>12}  {}",
            format_currency(last.strategy_equity),
            self.signed_pct(curve.total_return())
        );
        let _ = writeln!(
            out,
            "  Benchmark  {:>12}  {}",
            format_currency(last.benchmark_equity),
            self.signed_pct(curve.benchmark_return())
        );
        let _ = writeln!(out, "  {}", sparkline(curve, SPARK_WIDTH));
        out
    }

    pub fn metrics(&self, fetched: &Fetched<PerformanceMetrics>) -> String {
        let m = fetched.data();
        let mut out = self.header("Performance Metrics", fetched);

        let rows = [
            ("Annual Return (CAGR)", format_percentage(m.cagr), Tone::for_signed(m.cagr, true)),
            ("Sharpe Ratio", format_ratio(m.sharpe), Tone::for_sharpe(m.sharpe)),
            ("Max Drawdown", format_percentage(m.max_drawdown), Tone::for_signed(m.max_drawdown, false)),
            ("Win Rate", format_percentage(m.win_rate), Tone::for_win_rate(m.win_rate)),
        ];
        for (label, value, tone) in rows {
            let _ = writeln!(out, "  {:<22}{:>8}", label, self.paint(&value, tone));
        }
        let _ = writeln!(out, "  Total Trades Executed {:>8}", format_count(u64::from(m.total_trades)));
        out
    }

    fn signed_pct(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => self.paint(&format!("{:+.1}%", v * 100.0), Tone::for_signed(v, true)),
            None => "n/a".to_string(),
        }
    }
}

/// Strategy equity downsampled to `width` columns.
pub fn sparkline(curve: &EquityCurve, width: usize) -> String {
    if curve.is_empty() || width == 0 {
        return String::new();
    }
    let values: Vec<f64> = curve.points.iter().map(|p| p.strategy_equity).collect();
    let columns = width.min(values.len());
    let sampled: Vec<f64> = (0..columns)
        .map(|i| values[i * (values.len() - 1) / (columns - 1).max(1)])
        .collect();

    let min = sampled.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = sampled.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    sampled
        .iter()
        .map(|v| {
            let level = if span > 0.0 {
                ((v - min) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize
            } else {
                0
            };
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategy_client::{synthetic, FallbackReason};
    use strategy_core::EquityPoint;

    fn point(date: &str, equity: f64) -> EquityPoint {
        EquityPoint {
            date: date.to_string(),
            strategy_equity: equity,
            benchmark_equity: 100_000.0,
        }
    }

    #[test]
    fn test_tones() {
        assert_eq!(Tone::for_confidence(0.82), Tone::Profit);
        assert_eq!(Tone::for_confidence(0.6), Tone::Warning);
        assert_eq!(Tone::for_confidence(0.3), Tone::Muted);
        assert_eq!(Tone::for_signed(-0.089, false), Tone::Profit);
        assert_eq!(Tone::for_signed(-0.05, true), Tone::Loss);
        assert_eq!(Tone::for_sharpe(1.0), Tone::Warning);
        assert_eq!(Tone::for_win_rate(0.67), Tone::Profit);
        assert_eq!(Tone::for_action(TradeAction::Sell), Tone::Loss);
    }

    #[test]
    fn test_metrics_card() {
        let card = Renderer::new(false).metrics(&Fetched::Live(synthetic::performance_metrics()));

        assert!(card.starts_with("== Performance Metrics [Live]"));
        assert!(card.contains("12.4%"));
        assert!(card.contains("1.85"));
        assert!(card.contains("-8.9%"));
        assert!(card.contains("67.0%"));
        assert!(card.contains("342"));
    }

    #[test]
    fn test_fallback_badge() {
        let fetched = Fetched::fallback(synthetic::regime_snapshot(), FallbackReason::Status(500));
        let card = Renderer::new(false).regime(&fetched);

        assert!(card.contains("[Synthetic: status 500]"));
        assert!(card.contains("Bull Market"));
        assert!(card.contains("65.0%"));
        assert!(card.contains("Dominant: Bull Market"));
    }

    #[test]
    fn test_signal_card_without_timestamp() {
        let mut signal = synthetic::trade_signal(chrono::Utc::now());
        signal.observed_at = "yesterday".to_string();
        let card = Renderer::new(false).signal(&Fetched::Live(signal));

        assert!(card.contains("BUY"));
        assert!(card.contains("82.0%"));
        assert!(card.contains("Last updated: N/A"));
    }

    #[test]
    fn test_equity_card() {
        let curve = EquityCurve::new(vec![point("2020-01-01", 100_000.0), point("2020-02-01", 110_000.0)]);
        let card = Renderer::new(false).equity(&Fetched::Live(curve), 10);

        assert!(card.contains("Back-test Performance (10 yr)"));
        assert!(card.contains("$110,000"));
        assert!(card.contains("+10.0%"));

        let empty = Renderer::new(false).equity(&Fetched::Live(EquityCurve::default()), 10);
        assert!(empty.contains("No equity data"));
    }

    #[test]
    fn test_sparkline_shape() {
        let rising = EquityCurve::new((0..100).map(|i| point("2020-01-01", i as f64)).collect());
        let line = sparkline(&rising, 10);

        assert_eq!(line.chars().count(), 10);
        assert_eq!(line.chars().next(), Some('▁'));
        assert_eq!(line.chars().last(), Some('█'));

        let single = EquityCurve::new(vec![point("2020-01-01", 5.0)]);
        assert_eq!(sparkline(&single, 10), "▁");
    }
}
