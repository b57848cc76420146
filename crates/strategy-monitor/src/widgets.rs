use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use strategy_client::StrategyDataSource;
use strategy_core::{EquityCurve, PerformanceMetrics, RegimeSnapshot, TradeSignal};
use tokio::task::JoinHandle;

use crate::config::MonitorConfig;
use crate::query_cache::{QueryCache, QueryKey};
use crate::render::Renderer;

/// A poll-and-render dashboard card
#[async_trait]
pub trait Widget: Send + Sync {
    fn title(&self) -> &'static str;

    fn interval(&self) -> Duration;

    /// Fetch through the cache and render the card.
    async fn refresh(&self) -> String;
}

/// Query caches shared by every widget, one per value type.
#[derive(Default)]
pub struct Caches {
    pub regime: QueryCache<RegimeSnapshot>,
    pub signal: QueryCache<TradeSignal>,
    pub equity: QueryCache<EquityCurve>,
    pub metrics: QueryCache<PerformanceMetrics>,
}

pub struct RegimeWidget {
    source: Arc<dyn StrategyDataSource>,
    caches: Arc<Caches>,
    renderer: Renderer,
    interval: Duration,
}

#[async_trait]
impl Widget for RegimeWidget {
    fn title(&self) -> &'static str {
        "regime"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn refresh(&self) -> String {
        let fetched = self
            .caches
            .regime
            .get_or_fetch(&QueryKey::Regime, Duration::ZERO, || self.source.regime_snapshot())
            .await;
        self.renderer.regime(&fetched)
    }
}

pub struct SignalWidget {
    source: Arc<dyn StrategyDataSource>,
    caches: Arc<Caches>,
    renderer: Renderer,
    interval: Duration,
}

#[async_trait]
impl Widget for SignalWidget {
    fn title(&self) -> &'static str {
        "signal"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn refresh(&self) -> String {
        let fetched = self
            .caches
            .signal
            .get_or_fetch(&QueryKey::Signal, Duration::ZERO, || self.source.trade_signal())
            .await;
        self.renderer.signal(&fetched)
    }
}

pub struct EquityWidget {
    source: Arc<dyn StrategyDataSource>,
    caches: Arc<Caches>,
    renderer: Renderer,
    interval: Duration,
    years: u32,
}

#[async_trait]
impl Widget for EquityWidget {
    fn title(&self) -> &'static str {
        "equity_curve"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn refresh(&self) -> String {
        let key = QueryKey::EquityCurve { years: self.years };
        let fetched = self
            .caches
            .equity
            .get_or_fetch(&key, Duration::ZERO, || self.source.equity_curve(self.years))
            .await;
        self.renderer.equity(&fetched, self.years)
    }
}

pub struct MetricsWidget {
    source: Arc<dyn StrategyDataSource>,
    caches: Arc<Caches>,
    renderer: Renderer,
    interval: Duration,
    years: u32,
}

#[async_trait]
impl Widget for MetricsWidget {
    fn title(&self) -> &'static str {
        "performance_metrics"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn refresh(&self) -> String {
        let key = QueryKey::Metrics { years: self.years };
        let fetched = self
            .caches
            .metrics
            .get_or_fetch(&key, Duration::ZERO, || self.source.performance_metrics(self.years))
            .await;
        self.renderer.metrics(&fetched)
    }
}

/// The four dashboard cards, in display order.
pub fn dashboard(
    source: Arc<dyn StrategyDataSource>,
    config: &MonitorConfig,
    renderer: Renderer,
) -> Vec<Arc<dyn Widget>> {
    let caches = Arc::new(Caches::default());
    let widgets: Vec<Arc<dyn Widget>> = vec![
        Arc::new(RegimeWidget {
            source: Arc::clone(&source),
            caches: Arc::clone(&caches),
            renderer,
            interval: config.regime_interval,
        }),
        Arc::new(SignalWidget {
            source: Arc::clone(&source),
            caches: Arc::clone(&caches),
            renderer,
            interval: config.signal_interval,
        }),
        Arc::new(EquityWidget {
            source: Arc::clone(&source),
            caches: Arc::clone(&caches),
            renderer,
            interval: config.equity_interval,
            years: config.lookback_years,
        }),
        Arc::new(MetricsWidget {
            source,
            caches,
            renderer,
            interval: config.metrics_interval,
            years: config.lookback_years,
        }),
    ];
    widgets
}

/// Poll `widget` on its own timer, printing each card. Runs until aborted.
pub fn spawn_poller(widget: Arc<dyn Widget>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(widget.interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let started = std::time::Instant::now();
            let card = widget.refresh().await;
            tracing::debug!(
                widget = widget.title(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Widget refreshed"
            );
            println!("{}", card);
        }
    })
}
