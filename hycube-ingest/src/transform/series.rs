use hycube_client::domain::{FieldValue, MeasurementPoint, MergedReading};

pub const LOCATION: &str = "home";

pub const METER_GRID: &str = "hycube-grid";
pub const METER_INVERTER: &str = "hycube-inv1";
pub const METER_SOLAR: &str = "hycube-solar";
pub const METER_HOME: &str = "hycube-home";
pub const METER_METER3: &str = "hycube-meter3";
pub const METER_BATTERY: &str = "hycube-battery";
pub const METER_WALLBOX: &str = "hycube-wallbox";

/// One output point: series name, `meter` tag and `(field, reading key)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesRow {
    pub series: &'static str,
    pub meter: &'static str,
    pub fields: &'static [(&'static str, &'static str)],
}

const fn row(
    series: &'static str,
    meter: &'static str,
    fields: &'static [(&'static str, &'static str)],
) -> SeriesRow {
    SeriesRow { series, meter, fields }
}

/// Every point written per cycle, in write order.
///
/// Solar strings are written as one point per string instead of one combined
/// L1/L2 point. `solar2_P` is lower-case on the device.
pub const SERIES_TABLE: &[SeriesRow] = &[
    row("frequency", METER_GRID, &[("total", "Grid_f")]),
    row("voltage", METER_GRID, &[("L1", "Grid_V_L1"), ("L2", "Grid_V_L2"), ("L3", "Grid_V_L3")]),
    row("current", METER_GRID, &[("L1", "Grid_I_L1"), ("L2", "Grid_I_L2"), ("L3", "Grid_I_L3")]),
    row("activePower", METER_GRID, &[("total", "Grid_P")]),
    row("voltage", METER_INVERTER, &[("L1", "Inv1_V_L1"), ("L2", "Inv1_V_L2"), ("L3", "Inv1_V_L3")]),
    row("current", METER_INVERTER, &[("L1", "Inv1_I_L1"), ("L2", "Inv1_I_L2"), ("L3", "Inv1_I_L3")]),
    row("activePower", METER_INVERTER, &[("L1", "Inv1_P_L1"), ("L2", "Inv1_P_L2"), ("L3", "Inv1_P_L3")]),
    row("voltage", METER_SOLAR, &[("L1", "Solar1_V")]),
    row("current", METER_SOLAR, &[("L1", "Solar1_I")]),
    row("activePower", METER_SOLAR, &[("L1", "Solar1_P")]),
    row("voltage", METER_SOLAR, &[("L2", "Solar2_V")]),
    row("current", METER_SOLAR, &[("L2", "Solar2_I")]),
    row("activePower", METER_SOLAR, &[("L2", "solar2_P")]),
    row("activePower", METER_HOME, &[("total", "Home_P")]),
    row("activePower", METER_METER3, &[("total", "Meter3_P")]),
    row("soc", METER_BATTERY, &[("total", "Battery_C")]),
    row("voltage", METER_BATTERY, &[("total", "Battery_V")]),
    row("current", METER_BATTERY, &[("total", "Battery_I")]),
    row("activePower", METER_BATTERY, &[("total", "Battery_P")]),
    row("activePower", METER_WALLBOX, &[("total", "Wallbox_P")]),
    row("power", METER_WALLBOX, &[("total", "Wallbox_E")]),
    row("connected", METER_WALLBOX, &[("state", "Wallbox_Connected")]),
];

impl SeriesRow {
    /// Build this row's point. Keys that are missing or `null` leave their field out.
    pub fn point(&self, reading: &MergedReading) -> MeasurementPoint {
        let mut point = MeasurementPoint::new(self.series)
            .with_tag("location", LOCATION)
            .with_tag("meter", self.meter);

        for (field, key) in self.fields {
            if let Some(value) = reading.get(key).and_then(FieldValue::from_json) {
                point.fields.insert((*field).to_string(), value);
            }
        }

        point
    }
}

pub fn to_points(reading: &MergedReading) -> Vec<MeasurementPoint> {
    SERIES_TABLE.iter().map(|row| row.point(reading)).collect()
}
