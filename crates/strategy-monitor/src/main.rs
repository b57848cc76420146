//! strategy-monitor: terminal dashboard for the regime-switching strategy engine.
//!
//! Polls regime probabilities, the latest trade signal, the back-test equity
//! curve and performance metrics, each on its own timer. When the engine is
//! unreachable every card keeps rendering from synthetic data.
//!
//! Usage:
//!   cargo run -p strategy-monitor
//!   cargo run -p strategy-monitor -- --once
//!   cargo run -p strategy-monitor -- --offline --seed 7
//!
//! Set `RUST_LOG_FORMAT=json` for JSON logs on stderr.

mod config;
mod query_cache;
mod render;
mod widgets;

use std::io::IsTerminal;
use std::sync::Arc;
use strategy_client::{StrategyClient, StrategyDataSource, SyntheticDataSource, SyntheticGenerator};

use crate::config::MonitorConfig;
use crate::render::Renderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "strategy_monitor=info,strategy_client=warn".into());
    if json_log_format(std::env::var("RUST_LOG_FORMAT").ok().as_deref()) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = MonitorConfig::from_env()?.apply_args(&args)?;

    let source = build_source(&config).await?;
    tracing::info!(
        "Strategy monitor using {} backend, lookback {} yr",
        source.backend_name(),
        config.lookback_years
    );

    let renderer = Renderer::new(std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none());
    let widgets = widgets::dashboard(source, &config, renderer);

    if config.once {
        for widget in &widgets {
            println!("{}", widget.refresh().await);
        }
        return Ok(());
    }

    let handles: Vec<_> = widgets.into_iter().map(widgets::spawn_poller).collect();
    tracing::info!("Monitor is running. Press Ctrl+C to stop.");

    shutdown_signal().await?;

    // In-flight fetches are dropped with their tasks.
    for handle in &handles {
        handle.abort();
    }
    tracing::info!("Strategy monitor stopped");
    Ok(())
}

fn json_log_format(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("json"))
}

async fn build_source(config: &MonitorConfig) -> anyhow::Result<Arc<dyn StrategyDataSource>> {
    if config.offline {
        let generator = match config.client.seed {
            Some(seed) => SyntheticGenerator::seeded(seed),
            None => SyntheticGenerator::from_entropy(),
        };
        let mut source = SyntheticDataSource::new(generator);
        if let Some(latency) = config.offline_latency {
            source = source.with_latency(latency);
        }
        return Ok(Arc::new(source));
    }

    let client = StrategyClient::new(config.client.clone())?;

    // Startup check (warn-only, not fatal)
    match client.health().await {
        Ok(true) => tracing::info!("Startup check: strategy service at {} OK", client.base_url()),
        Ok(false) => tracing::warn!(
            "Startup check: strategy service at {} is unhealthy, cards may show synthetic data",
            client.base_url()
        ),
        Err(e) => tracing::warn!(
            "Startup check: strategy service at {} unreachable ({}), cards will show synthetic data",
            client.base_url(),
            e
        ),
    }

    Ok(Arc::new(client))
}

async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("Received SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Received Ctrl+C");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_json_log_format() {
        assert!(json_log_format(Some("json")));
        assert!(json_log_format(Some(" JSON ")));
        assert!(!json_log_format(Some("pretty")));
        assert!(!json_log_format(None));
    }

    #[tokio::test]
    async fn test_offline_source_applies_latency() {
        let config = MonitorConfig {
            offline: true,
            offline_latency: Some(Duration::from_millis(40)),
            ..MonitorConfig::default()
        }
        .apply_args(&["--seed".to_string(), "9".to_string()])
        .unwrap();

        let source = build_source(&config).await.unwrap();
        assert_eq!(source.backend_name(), "synthetic");

        let started = tokio::time::Instant::now();
        let metrics = source.performance_metrics(config.lookback_years).await;
        assert!(started.elapsed() >= Duration::from_millis(40));
        assert!(metrics.is_live());
    }
}
