//! Orchestration of a single estimate.
//!
//! The [`Estimator`] runs the calculation stages in a fixed order:
//!
//! 1. Resolve the grid intensity ([`crate::grid`])
//! 2. Compute the effective power ([`crate::power`])
//! 3. If an energy override is active, take the energy from it. Otherwise resolve the
//!    processing time ([`crate::time`]), apply the efficiency factor and compute the
//!    energy from power and time ([`crate::energy`])
//! 4. Share the energy across the batch
//! 5. Convert to CO2
//!
//! Each stage appends to the result's notes, so the notes read in computation order.

use crate::constants::watt_seconds_to_kwh;
use crate::energy::{apply_batch_size, co2_grams, energy_from_override};
use crate::errors::{CalcResult, ImpactError};
use crate::grid::{
    resolve_grid_intensity, resolver_query, AsyncGridIntensityResolver, GridIntensityDataset,
    GridIntensityResolver, PreResolved,
};
use crate::inputs::{EfficiencyConfig, ImpactInputs, MinimalImpactInputs};
use crate::power::compute_effective_power;
use crate::result::ImpactResult;
use crate::time::{apply_efficiency_factor, derive_processing_time_seconds};
use crate::usage::Usage;
use crate::validation::require_positive;
use crate::FloatValue;
use std::fmt;
use tracing::debug;

/// Estimates the impact of inference calls against a grid intensity dataset.
///
/// The default estimator uses the built-in dataset and no dynamic resolver.
///
/// ```rust
/// use aiwatt_core::{Estimator, ImpactInputs, ResolverQuery};
///
/// // e.g. a lookup into recently fetched live grid data
/// let live = |query: &ResolverQuery| match query.region.as_deref() {
///     Some("de") => Some(312.0),
///     _ => None,
/// };
///
/// let estimator = Estimator::new().with_resolver(&live);
/// let result = estimator
///     .estimate_impact(&ImpactInputs::new(400.0).with_region("Germany").with_processing_time(2.0))
///     .unwrap();
/// assert_eq!(result.grid_carbon_intensity_g_per_kwh, 312.0);
/// ```
#[derive(Clone, Copy)]
pub struct Estimator<'a> {
    dataset: &'a GridIntensityDataset,
    resolver: Option<&'a dyn GridIntensityResolver>,
}

impl Estimator<'static> {
    pub fn new() -> Self {
        Self {
            dataset: GridIntensityDataset::builtin(),
            resolver: None,
        }
    }
}

impl Default for Estimator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Estimator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Estimator")
            .field("dataset", &self.dataset.source())
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl<'a> Estimator<'a> {
    /// Use `dataset` instead of the built-in grid intensities.
    pub fn with_dataset(self, dataset: &'a GridIntensityDataset) -> Self {
        Self { dataset, ..self }
    }

    /// Consult `resolver` before the static dataset.
    pub fn with_resolver(self, resolver: &'a dyn GridIntensityResolver) -> Self {
        Self {
            resolver: Some(resolver),
            ..self
        }
    }

    pub fn dataset(&self) -> &'a GridIntensityDataset {
        self.dataset
    }

    /// Estimate the energy and CO2 of one inference call.
    ///
    /// Fails if none of `processing_time_seconds`, `usage` or an active energy override is
    /// supplied, or if any supplied quantity is invalid.
    pub fn estimate_impact(&self, inputs: &ImpactInputs) -> CalcResult<ImpactResult> {
        let energy_override = inputs.active_energy_override();
        if inputs.processing_time_seconds.is_none()
            && inputs.usage.is_none()
            && energy_override.is_none()
        {
            return Err(ImpactError::MissingWorkload);
        }

        let default_efficiency = EfficiencyConfig::default();
        let efficiency = inputs.efficiency.as_ref().unwrap_or(&default_efficiency);

        let grid = resolve_grid_intensity(
            inputs.region.as_deref(),
            inputs.grid_carbon_intensity_g_per_kwh,
            self.resolver,
            inputs.timestamp.as_deref(),
            self.dataset,
        )?;

        let (effective_power_w, mut notes) = compute_effective_power(
            inputs.gpu_power_w,
            inputs.cpu_power_w,
            inputs.network_power_w,
            efficiency.overhead_factor,
            efficiency.pue,
        )?;

        let (energy_kwh, processing_time_seconds) = match energy_override {
            Some(energy) => {
                let (energy_kwh, note) = energy_from_override(energy)?;
                notes.push(note);
                let seconds = reported_time(inputs)?;
                notes.push(format!(
                    "Processing time: {seconds} s (reported only, energy override in effect)"
                ));
                (energy_kwh, seconds)
            }
            None => {
                let seconds = processing_time(inputs, &mut notes)?;
                let seconds = apply_efficiency_factor(seconds, efficiency.efficiency_factor)?;
                if let Some(factor) = efficiency.efficiency_factor {
                    notes.push(format!("Efficiency factor {factor} applied: {seconds} s"));
                }
                let energy_kwh = watt_seconds_to_kwh(effective_power_w, seconds);
                notes.push(format!(
                    "Energy: {effective_power_w} W x {seconds} s = {energy_kwh} kWh"
                ));
                (energy_kwh, seconds)
            }
        };

        notes.push(grid.note());

        let energy_kwh = apply_batch_size(energy_kwh, efficiency.batch_size)?;
        if let Some(batch_size) = efficiency.batch_size {
            notes.push(format!(
                "Batch size {batch_size}: {energy_kwh} kWh per request"
            ));
        }

        let co2_grams = co2_grams(energy_kwh, grid.value);

        if let Some(precision) = &efficiency.precision {
            notes.push(format!("Precision: {precision} (informational)"));
        }
        if let Some(quantization) = &efficiency.quantization {
            notes.push(format!("Quantization: {quantization} (informational)"));
        }

        debug!(
            effective_power_w,
            processing_time_seconds,
            energy_kwh,
            co2_grams,
            grid_intensity = grid.value,
            "Estimated inference impact"
        );

        Ok(ImpactResult {
            category: inputs.usage.as_ref().map(Usage::category),
            energy_kwh,
            co2_grams,
            grid_carbon_intensity_g_per_kwh: grid.value,
            grid_intensity_source: grid.source,
            effective_power_w,
            processing_time_seconds,
            notes,
            diagnostics: grid.diagnostics,
        })
    }

    /// Estimate from power draw and a measured processing time only.
    pub fn estimate_impact_minimal(&self, inputs: MinimalImpactInputs) -> CalcResult<ImpactResult> {
        self.estimate_impact(&inputs.into())
    }

    /// Estimate with an asynchronous grid intensity resolver.
    ///
    /// The resolver is awaited at most once, and not at all when the inputs carry an
    /// explicit grid intensity. Its answer then goes through the same precedence rules as
    /// a synchronous resolver; any resolver attached with
    /// [`with_resolver`](Self::with_resolver) is replaced for this call.
    pub async fn estimate_impact_async<R>(
        &self,
        inputs: &ImpactInputs,
        resolver: &R,
    ) -> CalcResult<ImpactResult>
    where
        R: AsyncGridIntensityResolver,
    {
        let answer = self.resolve_once(inputs, resolver).await;
        self.with_resolver(&answer).estimate_impact(inputs)
    }

    pub(crate) async fn resolve_once<R>(&self, inputs: &ImpactInputs, resolver: &R) -> PreResolved
    where
        R: AsyncGridIntensityResolver,
    {
        if inputs.grid_carbon_intensity_g_per_kwh.is_some() {
            return PreResolved(None);
        }
        let query = resolver_query(
            inputs.region.as_deref(),
            inputs.timestamp.as_deref(),
            self.dataset,
        );
        PreResolved(resolver.resolve(query).await)
    }
}

/// Processing time for the power/time path.
///
/// An explicit time on the inputs wins over the usage, whose own override in turn wins
/// over the throughput-derived time.
fn processing_time(inputs: &ImpactInputs, notes: &mut Vec<String>) -> CalcResult<FloatValue> {
    if let Some(seconds) = inputs.processing_time_seconds {
        let seconds = require_positive("processingTimeSeconds", seconds)?;
        notes.push(format!("Processing time: {seconds} s (explicit)"));
        return Ok(seconds);
    }

    let usage = inputs.usage.as_ref().ok_or(ImpactError::MissingWorkload)?;
    let seconds = derive_processing_time_seconds(usage, inputs.throughput.as_ref())?;
    let origin = if usage.processing_time_seconds().is_some() {
        "measured"
    } else {
        "derived from throughput"
    };
    notes.push(format!(
        "Processing time: {seconds} s ({} usage, {origin})",
        usage.category()
    ));
    Ok(seconds)
}

/// Processing time reported alongside an energy override. Never derived from the energy.
fn reported_time(inputs: &ImpactInputs) -> CalcResult<FloatValue> {
    if let Some(seconds) = inputs.processing_time_seconds {
        return require_positive("processingTimeSeconds", seconds);
    }
    match inputs.usage.as_ref().and_then(Usage::processing_time_seconds) {
        Some(seconds) => require_positive("usage.processingTimeSeconds", seconds),
        None => Ok(0.0),
    }
}

/// Estimate with the built-in dataset and no dynamic resolver.
pub fn estimate_impact(inputs: &ImpactInputs) -> CalcResult<ImpactResult> {
    Estimator::new().estimate_impact(inputs)
}

/// Estimate from power draw and a measured processing time only.
pub fn estimate_impact_minimal(inputs: MinimalImpactInputs) -> CalcResult<ImpactResult> {
    Estimator::new().estimate_impact_minimal(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{IntensitySource, ResolverQuery};
    use crate::inputs::{EnergyOverride, ThroughputConfig};
    use crate::usage::UsageCategory;
    use is_close::is_close;

    fn chat_inputs() -> ImpactInputs {
        ImpactInputs::new(350.0)
            .with_region("eu")
            .with_usage(Usage::chat(1000, 200))
            .with_throughput(ThroughputConfig::tokens(100.0))
    }

    #[test]
    fn test_chat_scenario() {
        let result = estimate_impact(&chat_inputs()).unwrap();

        assert_eq!(result.category, Some(UsageCategory::Chat));
        assert!(is_close!(result.processing_time_seconds, 12.0));
        assert!(is_close!(result.effective_power_w, 350.0));
        assert!(is_close!(result.energy_kwh, 350.0 * 12.0 / 3600.0 / 1000.0));
        assert_eq!(result.grid_carbon_intensity_g_per_kwh, 210.21);
        assert_eq!(result.co2_grams, result.energy_kwh * 210.21);
        assert!((result.co2_grams - 0.2452).abs() < 1e-4);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_notes_follow_computation_order() {
        let inputs = chat_inputs().with_efficiency(EfficiencyConfig {
            batch_size: Some(4),
            precision: Some("fp16".to_string()),
            quantization: Some("int8".to_string()),
            ..Default::default()
        });
        let notes = estimate_impact(&inputs).unwrap().notes;

        let prefixes = [
            "Base power",
            "Overhead factor",
            "PUE",
            "Processing time",
            "Energy:",
            "Grid intensity",
            "Batch size 4",
            "Precision: fp16",
            "Quantization: int8",
        ];
        assert_eq!(notes.len(), prefixes.len(), "{notes:#?}");
        for (note, prefix) in notes.iter().zip(prefixes) {
            assert!(note.starts_with(prefix), "{note:?} should start with {prefix:?}");
        }
    }

    #[test]
    fn test_batch_size_divides_energy() {
        let single = estimate_impact(&chat_inputs()).unwrap();
        let batched = estimate_impact(&chat_inputs().with_efficiency(EfficiencyConfig {
            batch_size: Some(4),
            ..Default::default()
        }))
        .unwrap();

        assert!(is_close!(batched.energy_kwh, single.energy_kwh / 4.0));
        assert!((batched.co2_grams - 0.0613).abs() < 1e-4);
    }

    #[test]
    fn test_explicit_time_wins_over_usage() {
        let result = estimate_impact(&chat_inputs().with_processing_time(3.0)).unwrap();
        assert!(is_close!(result.processing_time_seconds, 3.0));
        assert_eq!(result.category, Some(UsageCategory::Chat));
    }

    #[test]
    fn test_efficiency_factor_shortens_time() {
        let result = estimate_impact(&chat_inputs().with_efficiency(EfficiencyConfig {
            efficiency_factor: Some(2.0),
            ..Default::default()
        }))
        .unwrap();
        assert!(is_close!(result.processing_time_seconds, 6.0));
    }

    #[test]
    fn test_energy_override_bypasses_power_and_time() {
        let inputs = ImpactInputs::new(350.0)
            .with_grid_intensity(100.0)
            .with_energy(EnergyOverride::joules(3_600_000.0))
            .with_efficiency(EfficiencyConfig {
                efficiency_factor: Some(4.0),
                ..Default::default()
            });
        let result = estimate_impact(&inputs).unwrap();

        assert!(is_close!(result.energy_kwh, 1.0));
        assert!(is_close!(result.co2_grams, 100.0));
        assert_eq!(result.processing_time_seconds, 0.0);
        assert_eq!(result.category, None);
    }

    #[test]
    fn test_energy_override_reports_usage_time() {
        let inputs = ImpactInputs::new(350.0)
            .with_usage(Usage::embeddings(100).with_processing_time(0.25))
            .with_energy(EnergyOverride::kwh(0.002));
        let result = estimate_impact(&inputs).unwrap();

        assert!(is_close!(result.processing_time_seconds, 0.25));
        assert!(is_close!(result.energy_kwh, 0.002));
    }

    #[test]
    fn test_energy_override_with_batch() {
        let inputs = ImpactInputs::new(350.0)
            .with_energy(EnergyOverride::kwh(0.01))
            .with_efficiency(EfficiencyConfig {
                batch_size: Some(10),
                ..Default::default()
            });
        let result = estimate_impact(&inputs).unwrap();
        assert!(is_close!(result.energy_kwh, 0.001));
    }

    #[test]
    fn test_nothing_to_estimate() {
        let err = estimate_impact(&ImpactInputs::new(350.0)).unwrap_err();
        assert!(matches!(err, ImpactError::MissingWorkload));

        // An empty energy block is not an override.
        let err = estimate_impact(&ImpactInputs::new(350.0).with_energy(EnergyOverride::default()))
            .unwrap_err();
        assert!(matches!(err, ImpactError::MissingWorkload));
    }

    #[test]
    fn test_invalid_gpu_power() {
        let err = estimate_impact(&ImpactInputs::new(-5.0).with_processing_time(1.0)).unwrap_err();
        assert_eq!(err.field(), Some("gpuPowerW"));
    }

    #[test]
    fn test_minimal_scenario() {
        let result = estimate_impact_minimal(MinimalImpactInputs {
            gpu_power_w: 100.0,
            processing_time_seconds: 10.0,
            region: Some("no".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert!(is_close!(result.energy_kwh, 100.0 * 10.0 / 3_600_000.0));
        assert!((result.co2_grams - 0.00806).abs() < 1e-5);
        assert_eq!(result.category, None);
    }

    #[test]
    fn test_unknown_region_warns_but_succeeds() {
        let result =
            estimate_impact(&ImpactInputs::new(100.0).with_region("atlantis").with_processing_time(1.0))
                .unwrap();

        assert_eq!(result.grid_intensity_source, IntensitySource::GlobalFallback);
        assert_eq!(
            result.grid_carbon_intensity_g_per_kwh,
            GridIntensityDataset::builtin().global()
        );
        assert!(result.has_warnings());
        assert!(result.notes.iter().all(|note| !note.contains("Unknown region")));
    }

    #[test]
    fn test_custom_dataset() {
        let dataset = GridIntensityDataset::new(
            2030,
            "gCO2/kWh",
            "Scenario",
            "",
            [("global".to_string(), 100.0), ("mars".to_string(), 5.0)],
        )
        .unwrap();
        let estimator = Estimator::new().with_dataset(&dataset);

        let result = estimator
            .estimate_impact(&ImpactInputs::new(100.0).with_region("MARS").with_processing_time(36.0))
            .unwrap();
        assert_eq!(result.grid_carbon_intensity_g_per_kwh, 5.0);
    }

    #[test]
    fn test_resolver_sees_timestamp() {
        let resolver = |query: &ResolverQuery| match query.timestamp.as_deref() {
            Some("night") => Some(50.0),
            _ => None,
        };
        let estimator = Estimator::new().with_resolver(&resolver);
        let inputs = ImpactInputs::new(100.0).with_region("eu").with_processing_time(1.0);

        let day = estimator.estimate_impact(&inputs).unwrap();
        let night = estimator
            .estimate_impact(&inputs.clone().with_timestamp("night"))
            .unwrap();

        assert_eq!(day.grid_carbon_intensity_g_per_kwh, 210.21);
        assert_eq!(night.grid_carbon_intensity_g_per_kwh, 50.0);
        assert_eq!(night.grid_intensity_source, IntensitySource::Resolver);
    }
}
