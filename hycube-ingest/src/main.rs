use anyhow::Result;
use hycube_ingest::{
    config::AppConfig,
    metrics_server,
    observability,
    pipeline::Pipeline,
    sinks::ConfiguredSink,
    sources::HycubeSource,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let source = HycubeSource::from_config(&cfg.device.to_client_config())?;
    let sink = ConfiguredSink::from_config(&cfg.sink)?;

    tracing::info!(
        device = %source.client().base_url(),
        sink = %sink.describe(),
        interval_secs = cfg.poll.interval_secs,
        "starting hycube poller"
    );

    let pipeline = Pipeline::new(source, sink, cfg.poll.interval());
    pipeline.run_until(shutdown_signal()).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
}
