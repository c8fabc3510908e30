pub mod device;
pub mod domain;

pub use device::{AuthToken, DeviceClient, DeviceConfig, DeviceError, Endpoint};
