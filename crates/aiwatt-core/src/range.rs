//! Uncertainty propagation over min/max input ranges.
//!
//! Each ranged input is declared as an interval. The estimate is then evaluated three
//! times:
//!
//! - nominal: the inputs unchanged
//! - low: every ranged input at its `min`
//! - high: every ranged input at its `max`
//!
//! and the envelope is the pointwise min/max of the low and high outcomes. The direction
//! of each input is not assumed: efficiency factor and throughput reduce energy as they
//! grow, so the "low" inputs can produce the larger estimate.
//!
//! # Limitations
//!
//! Only the two joint extremes are evaluated. When ranged inputs pull the output in
//! opposite directions (e.g. `gpu_power_w` together with `efficiency_factor`) the true
//! envelope is wider than the one reported here.

use crate::errors::{CalcResult, ImpactError};
use crate::estimator::Estimator;
use crate::grid::AsyncGridIntensityResolver;
use crate::inputs::ImpactInputs;
use crate::result::ImpactResult;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// A closed interval `[min, max]` with `0 < min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: FloatValue,
    pub max: FloatValue,
}

impl NumericRange {
    pub fn new(min: FloatValue, max: FloatValue) -> Self {
        Self { min, max }
    }

    fn validate(&self, field: &str) -> CalcResult<()> {
        let invalid = |reason: &str| ImpactError::InvalidRange {
            field: field.to_string(),
            min: self.min,
            max: self.max,
            reason: reason.to_string(),
        };

        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(invalid("Bounds must be finite"));
        }
        if self.min <= 0.0 {
            return Err(invalid("min must be greater than 0"));
        }
        if self.max < self.min {
            return Err(invalid("max must be greater than or equal to min"));
        }
        Ok(())
    }
}

/// Uncertainty on the inputs of an estimate. Unranged inputs keep their nominal value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UncertaintyRanges {
    pub gpu_power_w: Option<NumericRange>,
    pub pue: Option<NumericRange>,
    pub overhead_factor: Option<NumericRange>,
    pub efficiency_factor: Option<NumericRange>,
    pub tokens_per_second: Option<NumericRange>,
    pub audio_seconds_per_second: Option<NumericRange>,
    pub pixels_per_second: Option<NumericRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Low,
    High,
}

impl UncertaintyRanges {
    fn fields(&self) -> [(&'static str, Option<&NumericRange>); 7] {
        [
            ("gpuPowerW", self.gpu_power_w.as_ref()),
            ("pue", self.pue.as_ref()),
            ("overheadFactor", self.overhead_factor.as_ref()),
            ("efficiencyFactor", self.efficiency_factor.as_ref()),
            ("tokensPerSecond", self.tokens_per_second.as_ref()),
            ("audioSecondsPerSecond", self.audio_seconds_per_second.as_ref()),
            ("pixelsPerSecond", self.pixels_per_second.as_ref()),
        ]
    }

    /// Check every supplied range.
    pub fn validate(&self) -> CalcResult<()> {
        self.fields()
            .into_iter()
            .filter_map(|(field, range)| range.map(|r| (field, r)))
            .try_for_each(|(field, range)| range.validate(field))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, range)| range.is_none())
    }

    /// Copy of `base` with every ranged input set to the chosen bound.
    fn apply(&self, base: &ImpactInputs, extreme: Extreme) -> ImpactInputs {
        let pick = |range: &NumericRange| match extreme {
            Extreme::Low => range.min,
            Extreme::High => range.max,
        };

        let mut inputs = base.clone();
        if let Some(range) = &self.gpu_power_w {
            inputs.gpu_power_w = pick(range);
        }
        if let Some(range) = &self.pue {
            inputs.efficiency_mut().pue = Some(pick(range));
        }
        if let Some(range) = &self.overhead_factor {
            inputs.efficiency_mut().overhead_factor = Some(pick(range));
        }
        if let Some(range) = &self.efficiency_factor {
            inputs.efficiency_mut().efficiency_factor = Some(pick(range));
        }
        if let Some(range) = &self.tokens_per_second {
            inputs.throughput_mut().tokens_per_second = Some(pick(range));
        }
        if let Some(range) = &self.audio_seconds_per_second {
            inputs.throughput_mut().audio_seconds_per_second = Some(pick(range));
        }
        if let Some(range) = &self.pixels_per_second {
            inputs.throughput_mut().pixels_per_second = Some(pick(range));
        }
        inputs
    }
}

/// Nominal estimate with its uncertainty envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRangeResult {
    pub base: ImpactResult,
    /// unit: kWh
    pub energy_kwh_min: FloatValue,
    /// unit: kWh
    pub energy_kwh_max: FloatValue,
    /// unit: g
    pub co2_grams_min: FloatValue,
    /// unit: g
    pub co2_grams_max: FloatValue,
}

impl ImpactRangeResult {
    fn collapsed(base: ImpactResult) -> Self {
        Self {
            energy_kwh_min: base.energy_kwh,
            energy_kwh_max: base.energy_kwh,
            co2_grams_min: base.co2_grams,
            co2_grams_max: base.co2_grams,
            base,
        }
    }

    fn envelope(base: ImpactResult, low: &ImpactResult, high: &ImpactResult) -> Self {
        Self {
            energy_kwh_min: low.energy_kwh.min(high.energy_kwh),
            energy_kwh_max: low.energy_kwh.max(high.energy_kwh),
            co2_grams_min: low.co2_grams.min(high.co2_grams),
            co2_grams_max: low.co2_grams.max(high.co2_grams),
            base,
        }
    }
}

impl<'a> Estimator<'a> {
    /// Estimate `inputs` and the envelope over `ranges`.
    ///
    /// All ranges are validated before anything is evaluated. With an active energy
    /// override the ranges have no effect and the envelope collapses onto the nominal
    /// estimate.
    pub fn estimate_impact_range(
        &self,
        inputs: &ImpactInputs,
        ranges: &UncertaintyRanges,
    ) -> CalcResult<ImpactRangeResult> {
        ranges.validate()?;

        let base = self.estimate_impact(inputs)?;
        if inputs.active_energy_override().is_some() || ranges.is_empty() {
            return Ok(ImpactRangeResult::collapsed(base));
        }

        let low = self.estimate_impact(&ranges.apply(inputs, Extreme::Low))?;
        let high = self.estimate_impact(&ranges.apply(inputs, Extreme::High))?;
        Ok(ImpactRangeResult::envelope(base, &low, &high))
    }

    /// As [`estimate_impact_range`](Self::estimate_impact_range), with an asynchronous
    /// grid intensity resolver.
    ///
    /// None of the ranged inputs affect the grid intensity, so the resolver is awaited
    /// once and its answer shared by all three evaluations.
    pub async fn estimate_impact_range_async<R>(
        &self,
        inputs: &ImpactInputs,
        ranges: &UncertaintyRanges,
        resolver: &R,
    ) -> CalcResult<ImpactRangeResult>
    where
        R: AsyncGridIntensityResolver,
    {
        ranges.validate()?;
        let answer = self.resolve_once(inputs, resolver).await;
        self.with_resolver(&answer)
            .estimate_impact_range(inputs, ranges)
    }
}

/// Estimate with uncertainty using the built-in dataset and no dynamic resolver.
pub fn estimate_impact_range(
    inputs: &ImpactInputs,
    ranges: &UncertaintyRanges,
) -> CalcResult<ImpactRangeResult> {
    Estimator::new().estimate_impact_range(inputs, ranges)
}
