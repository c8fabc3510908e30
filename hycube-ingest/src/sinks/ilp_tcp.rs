use std::net::SocketAddr;

use hycube_client::domain::MeasurementPoint;
use tokio::{io::AsyncWriteExt, net::TcpStream};

use crate::pipeline::{Envelope, PipelineError, Sink};

use super::line_protocol::encode_batch;

/// Writes batches as line protocol over a TCP connection opened per batch
/// (QuestDB ILP, Telegraf socket listener).
pub struct IlpTcpSink {
    addr: SocketAddr,
}

impl IlpTcpSink {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn connect(&self) -> Result<TcpStream, PipelineError> {
        let stream = TcpStream::connect(self.addr).await.map_err(|e| {
            metrics::counter!("hycube_sink_errors_total").increment(1);
            PipelineError::Sink(format!("failed to connect to ILP listener {}: {e}", self.addr))
        })?;
        let _ = stream.set_nodelay(true);
        Ok(stream)
    }
}

#[async_trait::async_trait]
impl Sink for IlpTcpSink {
    async fn write(&self, batch: &Envelope<Vec<MeasurementPoint>>) -> Result<usize, PipelineError> {
        let encoded = encode_batch(batch);
        if encoded.lines == 0 {
            tracing::warn!(skipped = encoded.skipped, "batch has no writable points");
            return Ok(0);
        }

        let mut stream = self.connect().await?;
        if let Err(e) = stream.write_all(encoded.body.as_bytes()).await {
            metrics::counter!("hycube_sink_errors_total").increment(1);
            return Err(PipelineError::Sink(format!("ilp write failed: {e}")));
        }

        // Best-effort flush.
        let _ = stream.shutdown().await;

        metrics::counter!("hycube_sink_bytes_total").increment(encoded.body.len() as u64);
        tracing::debug!(lines = encoded.lines, addr = %self.addr, "batch written over ILP");
        Ok(encoded.lines)
    }
}
