use std::io::Write;

use hycube_client::domain::MeasurementPoint;

use crate::pipeline::{Envelope, PipelineError, Sink};

use super::line_protocol::encode_batch;

/// Prints each batch as line protocol on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

#[async_trait::async_trait]
impl Sink for StdoutSink {
    async fn write(&self, batch: &Envelope<Vec<MeasurementPoint>>) -> Result<usize, PipelineError> {
        let encoded = encode_batch(batch);
        let mut out = std::io::stdout().lock();
        out.write_all(encoded.body.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| PipelineError::Sink(format!("failed to write to stdout: {e}")))?;
        Ok(encoded.lines)
    }
}
