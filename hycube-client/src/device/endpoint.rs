use std::fmt;

/// Register holding the battery state of charge.
pub const BATTERY_SOC_REGISTER: &str = "258";

/// HTTP endpoints of the device API, relative to its base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Auth,
    /// Named electrical readings.
    Values,
    /// Raw register block, restricted to [`BATTERY_SOC_REGISTER`].
    RawRegisters,
    /// Charger power and cumulative energy.
    ChargerStatistics,
    /// Charger connection flag.
    ChargerState,
}

impl Endpoint {
    /// Data endpoints in the order they are fetched every cycle.
    pub const POLLED: [Endpoint; 4] = [
        Endpoint::Values,
        Endpoint::RawRegisters,
        Endpoint::ChargerStatistics,
        Endpoint::ChargerState,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Auth => "/auth/",
            Endpoint::Values => "/get_values/",
            Endpoint::RawRegisters => "/actual_values/?values=258",
            Endpoint::ChargerStatistics => "/Wallbox/getStatics",
            Endpoint::ChargerState => "/Wallbox/checkWallbox",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Auth => "auth",
            Endpoint::Values => "values",
            Endpoint::RawRegisters => "raw_registers",
            Endpoint::ChargerStatistics => "charger_statistics",
            Endpoint::ChargerState => "charger_state",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
