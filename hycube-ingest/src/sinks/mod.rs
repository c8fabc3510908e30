pub mod ilp_tcp;
pub mod influx_http;
pub mod line_protocol;
pub mod stdout;

pub use ilp_tcp::IlpTcpSink;
pub use influx_http::InfluxHttpSink;
pub use stdout::StdoutSink;

use hycube_client::domain::MeasurementPoint;

use crate::{
    config::{SinkConfig, SinkKind},
    pipeline::{Envelope, PipelineError, Sink},
};

/// The sink selected by `sink.kind`.
pub enum ConfiguredSink {
    Http(InfluxHttpSink),
    Tcp(IlpTcpSink),
    Stdout(StdoutSink),
}

impl ConfiguredSink {
    pub fn from_config(cfg: &SinkConfig) -> anyhow::Result<Self> {
        Ok(match cfg.kind {
            SinkKind::Http => Self::Http(InfluxHttpSink::new(
                &cfg.url,
                &cfg.database,
                cfg.credentials(),
                cfg.request_timeout(),
            )?),
            SinkKind::Tcp => Self::Tcp(IlpTcpSink::new(cfg.tcp_socket_addr()?)),
            SinkKind::Stdout => Self::Stdout(StdoutSink),
        })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http(s) => s.write_url().to_string(),
            Self::Tcp(s) => format!("tcp://{}", s.addr()),
            Self::Stdout(_) => "stdout".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Sink for ConfiguredSink {
    async fn write(&self, batch: &Envelope<Vec<MeasurementPoint>>) -> Result<usize, PipelineError> {
        match self {
            Self::Http(s) => s.write(batch).await,
            Self::Tcp(s) => s.write(batch).await,
            Self::Stdout(s) => s.write(batch).await,
        }
    }
}
