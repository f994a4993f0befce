//! Unit conversions and model bounds.

use crate::FloatValue;

/// unit: s / h
pub const SECONDS_PER_HOUR: FloatValue = 3600.0;

/// unit: W / kW
pub const WATTS_PER_KILOWATT: FloatValue = 1000.0;

/// 1 kWh = 3.6 MJ
pub const JOULES_PER_KWH: FloatValue = SECONDS_PER_HOUR * WATTS_PER_KILOWATT;

/// Inclusive bounds applied to the overhead factor.
pub const OVERHEAD_FACTOR_BOUNDS: (FloatValue, FloatValue) = (0.1, 10.0);

/// Inclusive bounds applied to PUE. A PUE below 1 is not physically meaningful.
pub const PUE_BOUNDS: (FloatValue, FloatValue) = (1.0, 3.0);

/// Region code used when no other grid intensity is available.
pub const GLOBAL_REGION: &str = "global";

/// Convert an energy in joules to kilowatt-hours.
pub fn joules_to_kwh(joules: FloatValue) -> FloatValue {
    joules / JOULES_PER_KWH
}

/// Energy drawn at constant `power_w` over `seconds`, in kilowatt-hours.
pub fn watt_seconds_to_kwh(power_w: FloatValue, seconds: FloatValue) -> FloatValue {
    power_w * seconds / SECONDS_PER_HOUR / WATTS_PER_KILOWATT
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn one_kwh_in_joules() {
        assert!(is_close!(joules_to_kwh(3_600_000.0), 1.0));
    }

    #[test]
    fn one_kilowatt_for_one_hour() {
        assert!(is_close!(watt_seconds_to_kwh(1000.0, 3600.0), 1.0));
    }
}
