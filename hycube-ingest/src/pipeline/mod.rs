use std::{
    future::Future,
    time::{Duration, SystemTime},
};

use hycube_client::{
    device::DeviceError,
    domain::{DeviceSnapshot, MeasurementPoint},
};

use crate::transform;

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub received_at: SystemTime,
}

impl<T> Envelope<T> {
    pub fn now(payload: T) -> Self {
        Self {
            payload,
            received_at: SystemTime::now(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("auth error: {0}")]
    Auth(String),
    #[error("fetch error: {0}")]
    Fetch(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("sink error: {0}")]
    Sink(String),
}

impl PipelineError {
    /// Short stage label used in logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Auth(_) => "auth",
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Decode(_) => "decode",
            PipelineError::Sink(_) => "sink",
        }
    }
}

impl From<DeviceError> for PipelineError {
    fn from(e: DeviceError) -> Self {
        match e {
            DeviceError::Auth(_) => PipelineError::Auth(e.to_string()),
            DeviceError::Decode { .. } => PipelineError::Decode(e.to_string()),
            DeviceError::InvalidUrl { .. }
            | DeviceError::Client(_)
            | DeviceError::Request { .. }
            | DeviceError::Status { .. } => PipelineError::Fetch(e.to_string()),
        }
    }
}

/// Produces one device snapshot per cycle.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    async fn poll(&self) -> Result<Envelope<DeviceSnapshot>, PipelineError>;
}

/// Persists one batch of points per cycle.
#[async_trait::async_trait]
pub trait Sink: Send + Sync {
    /// Returns how many points were actually written, which may be fewer than
    /// the batch holds.
    async fn write(&self, batch: &Envelope<Vec<MeasurementPoint>>) -> Result<usize, PipelineError>;
}

pub struct Pipeline<S, K> {
    pub source: S,
    pub sink: K,
    pub interval: Duration,
}

impl<S, K> Pipeline<S, K>
where
    S: Source,
    K: Sink,
{
    pub fn new(source: S, sink: K, interval: Duration) -> Self {
        Self {
            source,
            sink,
            interval,
        }
    }

    /// Poll, transform and write once. Returns the number of points written.
    ///
    /// Nothing is written unless every device request succeeded.
    pub async fn run_cycle(&self) -> Result<usize, PipelineError> {
        metrics::counter!("hycube_cycles_total").increment(1);

        let snapshot = self.source.poll().await?;
        let batch = transform::snapshot_to_points(snapshot);
        tracing::debug!(points = ?batch.payload, "writing batch");

        let written = self.sink.write(&batch).await?;
        metrics::counter!("hycube_points_written_total").increment(written as u64);

        Ok(written)
    }

    /// Cycle until `shutdown` resolves, sleeping `interval` after every cycle.
    /// An in-flight cycle is dropped.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    return;
                }
                _ = self.cycle_then_sleep() => {}
            }
        }
    }

    async fn cycle_then_sleep(&self) {
        match self.run_cycle().await {
            Ok(points) => tracing::info!(points, "cycle complete"),
            Err(e) => {
                let stage = e.stage();
                metrics::counter!("hycube_cycle_failures_total", "stage" => stage).increment(1);
                tracing::warn!(error = %e, stage, "cycle abandoned");
            }
        }

        tokio::time::sleep(self.interval).await;
    }
}
