mod merge;
mod series;

use hycube_client::domain::{DeviceSnapshot, MeasurementPoint, MergedReading};

use crate::pipeline::Envelope;

pub use merge::{merge, MergeRule, SourceDocument, MERGE_RULES};
pub use series::{to_points, SeriesRow, LOCATION, SERIES_TABLE};

pub fn merge_snapshot(snapshot: DeviceSnapshot) -> MergedReading {
    merge(
        snapshot.values,
        &snapshot.raw_registers,
        &snapshot.charger_statistics,
        &snapshot.charger_state,
    )
}

/// Merge a snapshot and map it onto the series table. The batch keeps the
/// snapshot's receive time.
pub fn snapshot_to_points(env: Envelope<DeviceSnapshot>) -> Envelope<Vec<MeasurementPoint>> {
    let merged = merge_snapshot(env.payload);
    tracing::debug!(reading = ?merged.as_map(), "merged device reading");

    Envelope {
        payload: to_points(&merged),
        received_at: env.received_at,
    }
}
