//! Description of an inference call to estimate.

use crate::usage::Usage;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Throughput of the serving hardware.
///
/// Only the rate matching the usage category is read: tokens for text-like and
/// embeddings workloads, audio seconds for audio workloads, pixels for image generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThroughputConfig {
    /// unit: tokens / s
    pub tokens_per_second: Option<FloatValue>,
    /// unit: audio s / s
    pub audio_seconds_per_second: Option<FloatValue>,
    /// unit: pixels / s
    pub pixels_per_second: Option<FloatValue>,
}

impl ThroughputConfig {
    pub fn tokens(tokens_per_second: FloatValue) -> Self {
        Self {
            tokens_per_second: Some(tokens_per_second),
            ..Self::default()
        }
    }

    pub fn audio(audio_seconds_per_second: FloatValue) -> Self {
        Self {
            audio_seconds_per_second: Some(audio_seconds_per_second),
            ..Self::default()
        }
    }

    pub fn pixels(pixels_per_second: FloatValue) -> Self {
        Self {
            pixels_per_second: Some(pixels_per_second),
            ..Self::default()
        }
    }
}

/// A measured energy figure that bypasses the power x time calculation.
///
/// When both fields are set `energy_kwh` wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnergyOverride {
    pub energy_kwh: Option<FloatValue>,
    pub energy_joules: Option<FloatValue>,
}

impl EnergyOverride {
    pub fn kwh(energy_kwh: FloatValue) -> Self {
        Self {
            energy_kwh: Some(energy_kwh),
            energy_joules: None,
        }
    }

    pub fn joules(energy_joules: FloatValue) -> Self {
        Self {
            energy_kwh: None,
            energy_joules: Some(energy_joules),
        }
    }

    /// An override is only active when at least one figure is supplied.
    pub fn is_active(&self) -> bool {
        self.energy_kwh.is_some() || self.energy_joules.is_some()
    }
}

/// Efficiency adjustments applied on top of the raw hardware figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EfficiencyConfig {
    /// Power Usage Effectiveness of the data centre.
    ///
    /// Clamped to [1.0, 3.0]. Default: 1.0
    pub pue: Option<FloatValue>,

    /// Multiplier for power drawn by components not listed explicitly.
    ///
    /// Clamped to [0.1, 10.0]. Default: 1.0
    pub overhead_factor: Option<FloatValue>,

    /// Speed-up relative to the stated throughput; processing time is divided by it.
    pub efficiency_factor: Option<FloatValue>,

    /// Number of requests served by the same computation. Energy is shared equally.
    pub batch_size: Option<u32>,

    /// Numeric precision (e.g. `fp16`). Informational only.
    pub precision: Option<String>,

    /// Quantization scheme (e.g. `int4`). Informational only.
    pub quantization: Option<String>,
}

/// Everything known about a single inference call.
///
/// At least one of `processing_time_seconds`, `usage` or `energy` must be supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactInputs {
    /// unit: W
    pub gpu_power_w: FloatValue,
    /// unit: W
    #[serde(default)]
    pub cpu_power_w: Option<FloatValue>,
    /// unit: W
    #[serde(default)]
    pub network_power_w: Option<FloatValue>,
    /// Model size in billions of parameters. Informational only.
    #[serde(default)]
    pub model_params_b: Option<FloatValue>,
    /// Free-form region name or code, e.g. `"eu"`, `"GB"` or `"United Kingdom"`.
    #[serde(default)]
    pub region: Option<String>,
    /// Explicit grid carbon intensity, overriding every other source.
    /// unit: gCO2 / kWh
    #[serde(default)]
    pub grid_carbon_intensity_g_per_kwh: Option<FloatValue>,
    /// Opaque timestamp handed to a dynamic grid intensity resolver.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Measured processing time, overriding any usage-derived time.
    /// unit: s
    #[serde(default)]
    pub processing_time_seconds: Option<FloatValue>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub throughput: Option<ThroughputConfig>,
    #[serde(default)]
    pub energy: Option<EnergyOverride>,
    #[serde(default)]
    pub efficiency: Option<EfficiencyConfig>,
}

impl ImpactInputs {
    /// Create inputs for hardware drawing `gpu_power_w` watts.
    pub fn new(gpu_power_w: FloatValue) -> Self {
        Self {
            gpu_power_w,
            ..Self::default()
        }
    }

    pub fn with_cpu_power(mut self, watts: FloatValue) -> Self {
        self.cpu_power_w = Some(watts);
        self
    }

    pub fn with_network_power(mut self, watts: FloatValue) -> Self {
        self.network_power_w = Some(watts);
        self
    }

    pub fn with_model_params_b(mut self, billions: FloatValue) -> Self {
        self.model_params_b = Some(billions);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_grid_intensity(mut self, g_per_kwh: FloatValue) -> Self {
        self.grid_carbon_intensity_g_per_kwh = Some(g_per_kwh);
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_processing_time(mut self, seconds: FloatValue) -> Self {
        self.processing_time_seconds = Some(seconds);
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_throughput(mut self, throughput: ThroughputConfig) -> Self {
        self.throughput = Some(throughput);
        self
    }

    pub fn with_energy(mut self, energy: EnergyOverride) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn with_efficiency(mut self, efficiency: EfficiencyConfig) -> Self {
        self.efficiency = Some(efficiency);
        self
    }

    /// The energy override, if one is active.
    pub fn active_energy_override(&self) -> Option<&EnergyOverride> {
        self.energy.as_ref().filter(|energy| energy.is_active())
    }

    pub(crate) fn efficiency_mut(&mut self) -> &mut EfficiencyConfig {
        self.efficiency.get_or_insert_with(EfficiencyConfig::default)
    }

    pub(crate) fn throughput_mut(&mut self) -> &mut ThroughputConfig {
        self.throughput.get_or_insert_with(ThroughputConfig::default)
    }
}

/// Inputs for when only the power draw and a measured processing time are known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalImpactInputs {
    /// unit: W
    pub gpu_power_w: FloatValue,
    /// unit: s
    pub processing_time_seconds: FloatValue,
    #[serde(default)]
    pub region: Option<String>,
    /// unit: gCO2 / kWh
    #[serde(default)]
    pub grid_carbon_intensity_g_per_kwh: Option<FloatValue>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub efficiency: Option<EfficiencyConfig>,
    #[serde(default)]
    pub energy: Option<EnergyOverride>,
}

impl From<MinimalImpactInputs> for ImpactInputs {
    fn from(minimal: MinimalImpactInputs) -> Self {
        Self {
            gpu_power_w: minimal.gpu_power_w,
            region: minimal.region,
            grid_carbon_intensity_g_per_kwh: minimal.grid_carbon_intensity_g_per_kwh,
            timestamp: minimal.timestamp,
            processing_time_seconds: Some(minimal.processing_time_seconds),
            energy: minimal.energy,
            efficiency: minimal.efficiency,
            ..Self::default()
        }
    }
}
