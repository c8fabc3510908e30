use super::Endpoint;

#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    #[error("invalid device url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: Endpoint, status: u16 },
    #[error("{endpoint} returned an undecodable body: {reason}")]
    Decode { endpoint: Endpoint, reason: String },
}

impl DeviceError {
    /// The endpoint the failed request targeted, if any.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            DeviceError::Auth(_) => Some(Endpoint::Auth),
            DeviceError::Request { endpoint, .. }
            | DeviceError::Status { endpoint, .. }
            | DeviceError::Decode { endpoint, .. } => Some(*endpoint),
            DeviceError::InvalidUrl { .. } | DeviceError::Client(_) => None,
        }
    }
}
