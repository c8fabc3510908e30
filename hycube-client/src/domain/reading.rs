use serde_json::{Map, Value};

/// One JSON object as decoded from a device response.
pub type RawReading = Map<String, Value>;

/// The four documents fetched from the device in one polling cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub values: RawReading,
    pub raw_registers: RawReading,
    pub charger_statistics: RawReading,
    pub charger_state: RawReading,
}

/// Flat measurement-name to value map built from a [`DeviceSnapshot`].
///
/// Built fresh every cycle and dropped after the batch is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedReading(RawReading);

impl MergedReading {
    pub fn new(base: RawReading) -> Self {
        Self(base)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &RawReading {
        &self.0
    }

    pub fn into_inner(self) -> RawReading {
        self.0
    }
}

impl From<RawReading> for MergedReading {
    fn from(base: RawReading) -> Self {
        Self::new(base)
    }
}
