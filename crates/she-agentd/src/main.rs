mod config;

use std::sync::Arc;

use anyhow::Context;
use prometheus::Registry;
use she_api::MetricsApi;
use she_core::{ScrapePolicy, Scraper};
use she_observe::init_logger;
use she_prometheus::{ExitCodeGauge, TaskCollector};
use she_swift::{dispersion, recon};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ExporterConfig;

fn main() -> anyhow::Result<()> {
    // 1) config + logger, before worker threads exist (local timezone detection)
    let cfg = ExporterConfig::from_env()?;
    init_logger(&cfg.logger)?;

    // 2) runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("cannot start tokio runtime")?;
    runtime.block_on(run(cfg))
}

async fn run(cfg: ExporterConfig) -> anyhow::Result<()> {
    cfg.validate()?;

    // 3) tasks + exit-code gauges
    let registry = Arc::new(Registry::new());
    let mut scraper = Scraper::new(ScrapePolicy::from_opts(&cfg.scrape));

    if cfg.recon.enabled.is_enabled() {
        let exit_code = Arc::new(ExitCodeGauge::new_with_registry(&registry, &recon::EXIT_CODE)?);
        for task in recon::recon_tasks(&cfg.recon) {
            scraper.add_task(task, exit_code.clone())?;
        }
    }
    if let Some(task) = dispersion::dispersion_task(&cfg.dispersion) {
        let exit_code =
            Arc::new(ExitCodeGauge::new_with_registry(&registry, &dispersion::EXIT_CODE)?);
        scraper.add_task(task, exit_code)?;
    }
    if scraper.is_empty() {
        anyhow::bail!("no task enabled, check the recon and dispersion sections");
    }

    // 4) collector
    let scraper = Arc::new(scraper);
    registry.register(Box::new(TaskCollector::new(scraper.clone())?))?;

    // 5) scheduled refresh
    let cancel = CancellationToken::new();
    let scheduler = tokio::spawn(scraper.clone().run(cancel.clone()));

    // 6) http
    let listener = tokio::net::TcpListener::bind(cfg.listen)
        .await
        .with_context(|| format!("cannot bind {}", cfg.listen))?;
    info!(listen = %cfg.listen, tasks = scraper.len(), "serving metrics");

    axum::serve(listener, MetricsApi::new(registry).router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    scheduler.await?;
    info!("exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown requested");
}
