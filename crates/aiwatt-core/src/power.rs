//! Effective power draw.
//!
//! Raw hardware draw is scaled by an overhead factor (for components not listed
//! explicitly, e.g. memory and cooling inside the server) and by the data centre PUE:
//!
//! $$ P_{eff} = (P_{gpu} + P_{cpu} + P_{net}) \cdot f_{overhead} \cdot PUE $$
//!
//! Both multipliers default to 1 and are clamped to [`OVERHEAD_FACTOR_BOUNDS`] and
//! [`PUE_BOUNDS`] respectively.

use crate::constants::{OVERHEAD_FACTOR_BOUNDS, PUE_BOUNDS};
use crate::errors::CalcResult;
use crate::validation::{clamp, require_positive, require_positive_opt};
use crate::FloatValue;

/// Validate an optional multiplier, apply its default and clamp it.
///
/// Returns the value used and the value originally supplied, if it differed.
fn bounded_multiplier(
    field: &str,
    value: Option<FloatValue>,
    bounds: (FloatValue, FloatValue),
) -> CalcResult<(FloatValue, Option<FloatValue>)> {
    let requested = require_positive_opt(field, value)?.unwrap_or(1.0);
    let used = clamp(requested, bounds);
    Ok((used, (used != requested).then_some(requested)))
}

fn describe(name: &str, used: FloatValue, clamped_from: Option<FloatValue>, watts: FloatValue) -> String {
    match clamped_from {
        Some(requested) => format!("{name} {used} (clamped from {requested}) applied: {watts} W"),
        None => format!("{name} {used} applied: {watts} W"),
    }
}

/// Combine hardware power draw and multipliers into a single wattage.
///
/// # Arguments
///
/// * `gpu_power_w` - GPU draw (W), must be positive
/// * `cpu_power_w` - CPU draw (W), zero contribution when absent, must be positive when given
/// * `network_power_w` - Network draw (W), same rules as CPU
/// * `overhead_factor` - Server overhead multiplier, default 1.0
/// * `pue` - Data centre PUE, default 1.0
///
/// # Returns
///
/// (effective power in W, notes describing the base power, overhead and PUE steps)
pub fn compute_effective_power(
    gpu_power_w: FloatValue,
    cpu_power_w: Option<FloatValue>,
    network_power_w: Option<FloatValue>,
    overhead_factor: Option<FloatValue>,
    pue: Option<FloatValue>,
) -> CalcResult<(FloatValue, Vec<String>)> {
    let gpu = require_positive("gpuPowerW", gpu_power_w)?;
    let cpu = require_positive_opt("cpuPowerW", cpu_power_w)?.unwrap_or(0.0);
    let network = require_positive_opt("networkPowerW", network_power_w)?.unwrap_or(0.0);
    let (overhead, overhead_requested) =
        bounded_multiplier("overheadFactor", overhead_factor, OVERHEAD_FACTOR_BOUNDS)?;
    let (pue, pue_requested) = bounded_multiplier("pue", pue, PUE_BOUNDS)?;

    let base = gpu + cpu + network;
    let with_overhead = base * overhead;
    let effective = with_overhead * pue;

    let notes = vec![
        format!("Base power: {base} W (GPU {gpu} W + CPU {cpu} W + network {network} W)"),
        describe("Overhead factor", overhead, overhead_requested, with_overhead),
        describe("PUE", pue, pue_requested, effective),
    ];

    Ok((effective, notes))
}
