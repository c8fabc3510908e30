use hycube_client::{
    device::BATTERY_SOC_REGISTER,
    domain::{MergedReading, RawReading},
};
use serde_json::Value;

/// Secondary documents that contribute keys to the merged reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDocument {
    RawRegisters,
    ChargerStatistics,
    ChargerState,
}

/// Copy `source[key]` into the merged reading under `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRule {
    pub target: &'static str,
    pub source: SourceDocument,
    pub key: &'static str,
}

pub const MERGE_RULES: [MergeRule; 4] = [
    MergeRule {
        target: "Battery_C",
        source: SourceDocument::RawRegisters,
        key: BATTERY_SOC_REGISTER,
    },
    MergeRule {
        target: "Wallbox_P",
        source: SourceDocument::ChargerStatistics,
        key: "currentPower",
    },
    MergeRule {
        target: "Wallbox_E",
        source: SourceDocument::ChargerStatistics,
        key: "totalEnergy",
    },
    // Misspelling is the device's.
    MergeRule {
        target: "Wallbox_Connected",
        source: SourceDocument::ChargerState,
        key: "wallboxConnextion",
    },
];

/// Merge the four device documents into one flat reading.
///
/// `values` is the base map and is carried through untouched apart from the
/// [`MERGE_RULES`] targets, which are always present afterwards. A source key
/// missing from its document is stored as `null`.
pub fn merge(
    values: RawReading,
    raw_registers: &RawReading,
    charger_statistics: &RawReading,
    charger_state: &RawReading,
) -> MergedReading {
    let mut merged = MergedReading::new(values);

    for rule in &MERGE_RULES {
        let document = match rule.source {
            SourceDocument::RawRegisters => raw_registers,
            SourceDocument::ChargerStatistics => charger_statistics,
            SourceDocument::ChargerState => charger_state,
        };
        let value = document.get(rule.key).cloned().unwrap_or(Value::Null);
        merged.insert(rule.target, value);
    }

    merged
}
