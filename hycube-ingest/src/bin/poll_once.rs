use anyhow::{bail, Result};
use hycube_ingest::{
    config::AppConfig,
    observability,
    pipeline::Pipeline,
    sinks::{ConfiguredSink, StdoutSink},
    sources::HycubeSource,
};
use std::env;

/// Run a single polling cycle. With `--dry-run` the batch is printed as line
/// protocol instead of being written to the configured sink.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let mut dry_run = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--dry-run" => dry_run = true,
            other => bail!("usage: poll_once [--dry-run] (unexpected argument '{other}')"),
        }
    }

    // Load configuration (point HYCUBE_CONFIG at the poller's file).
    let cfg = AppConfig::load()?;
    let source = HycubeSource::from_config(&cfg.device.to_client_config())?;
    let interval = cfg.poll.interval();

    let points = if dry_run {
        Pipeline::new(source, StdoutSink, interval).run_cycle().await?
    } else {
        let sink = ConfiguredSink::from_config(&cfg.sink)?;
        tracing::info!(sink = %sink.describe(), "writing single batch");
        Pipeline::new(source, sink, interval).run_cycle().await?
    };

    tracing::info!(points, dry_run, "cycle complete");
    Ok(())
}
