// =============================================================================
// signal-scout — Main Entry Point
// =============================================================================
//
// Runs one screening batch over the configured watchlist and logs the
// recommendations plus dashboard insights.  Ctrl+C stops the batch from
// starting further tickers; tickers already in flight finish normally.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use signal_scout::binance::BinanceKlineSource;
use signal_scout::{InsightsReport, RuntimeConfig, Screener};

const CONFIG_PATH: &str = "signal_scout.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        signal-scout — Screening Run                      ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Override the watchlist from env if available.
    if let Ok(syms) = std::env::var("SCOUT_SYMBOLS") {
        let symbols: Vec<String> = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !symbols.is_empty() {
            config.markets = BTreeMap::from([("watchlist".to_string(), symbols)]);
        }
    }

    let symbols = config.symbols();
    info!(
        symbols = ?symbols,
        interval = %config.interval,
        lookback_days = config.lookback_days,
        pool_size = config.worker_pool_size,
        "Configured watchlist"
    );

    // ── 2. Build the screener ────────────────────────────────────────────
    let source = Arc::new(BinanceKlineSource::new().context("failed to build HTTP client")?);
    let screener = Arc::new(Screener::new(source, &config));

    // ── 3. Ctrl+C aborts remaining tickers ───────────────────────────────
    let abort = screener.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Shutdown signal received, no further tickers will start");
            abort.store(true, Ordering::SeqCst);
        }
    });

    // ── 4. Run the batch ─────────────────────────────────────────────────
    let batch = screener.run_batch(&symbols).await;

    for report in &batch.reports {
        let rec = &report.recommendation;
        info!(
            symbol = %report.symbol,
            score = rec.score(),
            tier = %rec.tier(),
            action = %report.action,
            rationale = ?rec.rationale(),
            "Recommendation"
        );
    }
    for skip in &batch.skipped {
        warn!(symbol = %skip.symbol, reason = %skip.reason, "Skipped");
    }
    if !batch.not_started.is_empty() {
        warn!(symbols = ?batch.not_started, "Not started (batch aborted)");
    }

    // ── 5. Insights ──────────────────────────────────────────────────────
    let insights = InsightsReport::build(&batch, &config.markets, &config.insights);

    for (market, movers) in &insights.top_movers {
        for mover in movers {
            info!(
                market = %market,
                symbol = %mover.symbol,
                change_pct = mover.change * 100.0,
                "Top mover"
            );
        }
    }
    for (market, perf) in &insights.market_performance {
        info!(market = %market, change_pct = perf * 100.0, "Market performance");
    }
    for (category, alerts) in &insights.alerts {
        for alert in alerts {
            info!(category = %category, alert = %alert, "Alert");
        }
    }
    for (market, buys) in &insights.recommended {
        info!(market = %market, buys = ?buys, "Recommended");
    }

    if let Ok(path) = std::env::var("SCOUT_REPORT_PATH") {
        let json = serde_json::to_string_pretty(&insights)
            .context("failed to serialise insights report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write insights report to {path}"))?;
        info!(path = %path, "Insights report written");
    }

    info!(
        batch = %batch.id,
        scored = batch.reports.len(),
        skipped = batch.skipped.len(),
        not_started = batch.not_started.len(),
        "signal-scout run complete."
    );
    Ok(())
}
