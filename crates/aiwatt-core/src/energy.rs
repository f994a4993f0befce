//! Energy and CO2 from power, time and grid intensity.
//!
//! Energy is either computed from power and time,
//!
//! $$ E_{kWh} = \frac{P_{eff} \cdot t}{3600 \cdot 1000} $$
//!
//! or taken from a caller-supplied [`EnergyOverride`]. In both cases it is then shared
//! across the batch and converted to CO2:
//!
//! $$ CO_2 = \frac{E_{kWh}}{n_{batch}} \cdot I_{grid} $$

use crate::constants::{joules_to_kwh, watt_seconds_to_kwh};
use crate::errors::CalcResult;
use crate::inputs::EnergyOverride;
use crate::validation::require_positive;
use crate::FloatValue;

/// Energy in kWh for a supplied override, with a note describing where it came from.
///
/// `energy_kwh` wins over `energy_joules` when both are present.
pub fn energy_from_override(energy: &EnergyOverride) -> CalcResult<(FloatValue, String)> {
    if let Some(kwh) = energy.energy_kwh {
        let kwh = require_positive("energy.energyKwh", kwh)?;
        return Ok((kwh, format!("Energy override: {kwh} kWh")));
    }
    let joules = require_positive("energy.energyJoules", energy.energy_joules.unwrap_or(0.0))?;
    let kwh = joules_to_kwh(joules);
    Ok((kwh, format!("Energy override: {joules} J = {kwh} kWh")))
}

/// Energy shared by one request of a batch.
pub fn apply_batch_size(energy_kwh: FloatValue, batch_size: Option<u32>) -> CalcResult<FloatValue> {
    match batch_size {
        Some(size) => Ok(energy_kwh / require_positive("batchSize", size as FloatValue)?),
        None => Ok(energy_kwh),
    }
}

pub fn co2_grams(energy_kwh: FloatValue, grid_intensity_g_per_kwh: FloatValue) -> FloatValue {
    energy_kwh * grid_intensity_g_per_kwh
}

/// Energy and CO2 for the power/time path.
///
/// # Returns
///
/// (energy in kWh, CO2 in g)
pub fn compute(
    effective_power_w: FloatValue,
    processing_time_seconds: FloatValue,
    batch_size: Option<u32>,
    grid_intensity_g_per_kwh: FloatValue,
) -> CalcResult<(FloatValue, FloatValue)> {
    let energy_kwh = apply_batch_size(
        watt_seconds_to_kwh(effective_power_w, processing_time_seconds),
        batch_size,
    )?;
    Ok((energy_kwh, co2_grams(energy_kwh, grid_intensity_g_per_kwh)))
}
