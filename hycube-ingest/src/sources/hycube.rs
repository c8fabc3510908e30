use hycube_client::{domain::DeviceSnapshot, DeviceClient, DeviceConfig};

use crate::pipeline::{Envelope, PipelineError, Source};

/// Polls the device: a fresh token, then the four data documents.
#[derive(Clone)]
pub struct HycubeSource {
    client: DeviceClient,
}

impl HycubeSource {
    pub fn new(client: DeviceClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &DeviceConfig) -> Result<Self, PipelineError> {
        Ok(Self::new(DeviceClient::new(config)?))
    }

    pub fn client(&self) -> &DeviceClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl Source for HycubeSource {
    async fn poll(&self) -> Result<Envelope<DeviceSnapshot>, PipelineError> {
        let token = self.client.authenticate().await.map_err(|e| {
            metrics::counter!("hycube_device_errors_total", "endpoint" => "auth").increment(1);
            PipelineError::from(e)
        })?;

        let snapshot = self.client.snapshot(&token).await.map_err(|e| {
            let endpoint = e.endpoint().map_or("unknown", |ep| ep.name());
            metrics::counter!("hycube_device_errors_total", "endpoint" => endpoint).increment(1);
            PipelineError::from(e)
        })?;

        Ok(Envelope::now(snapshot))
    }
}
