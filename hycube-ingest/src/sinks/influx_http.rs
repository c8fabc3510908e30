use std::time::Duration;

use hycube_client::domain::MeasurementPoint;
use reqwest::{header::CONTENT_TYPE, Client, Url};

use crate::pipeline::{Envelope, PipelineError, Sink};

use super::line_protocol::encode_batch;

/// Writes batches to the InfluxDB 1.x HTTP `/write` API.
pub struct InfluxHttpSink {
    client: Client,
    write_url: Url,
    credentials: Option<(String, Option<String>)>,
}

impl InfluxHttpSink {
    pub fn new(
        base_url: &str,
        database: &str,
        credentials: Option<(String, Option<String>)>,
        timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let mut write_url = Url::parse(&format!("{}/write", base_url.trim_end_matches('/')))
            .map_err(|e| PipelineError::Sink(format!("invalid sink url '{base_url}': {e}")))?;
        write_url
            .query_pairs_mut()
            .append_pair("db", database)
            .append_pair("precision", "ns");

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Sink(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            write_url,
            credentials,
        })
    }

    pub fn write_url(&self) -> &Url {
        &self.write_url
    }
}

#[async_trait::async_trait]
impl Sink for InfluxHttpSink {
    async fn write(&self, batch: &Envelope<Vec<MeasurementPoint>>) -> Result<usize, PipelineError> {
        let encoded = encode_batch(batch);
        if encoded.lines == 0 {
            tracing::warn!(skipped = encoded.skipped, "batch has no writable points");
            return Ok(0);
        }
        let bytes = encoded.body.len();

        let mut request = self
            .client
            .post(self.write_url.clone())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(encoded.body);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, password.as_deref());
        }

        let response = request.send().await.map_err(|e| {
            metrics::counter!("hycube_sink_errors_total").increment(1);
            PipelineError::Sink(format!("influx write request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            metrics::counter!("hycube_sink_errors_total").increment(1);
            return Err(PipelineError::Sink(format!(
                "influx rejected batch with HTTP {status}: {}",
                body.trim()
            )));
        }

        metrics::counter!("hycube_sink_bytes_total").increment(bytes as u64);
        tracing::debug!(lines = encoded.lines, bytes, "batch written to influx");
        Ok(encoded.lines)
    }
}
