mod measurement_point;
mod reading;

pub use measurement_point::{FieldValue, MeasurementPoint};
pub use reading::{DeviceSnapshot, MergedReading, RawReading};
