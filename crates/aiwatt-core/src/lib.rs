//! Energy and CO2 estimates for a single AI inference call.
//!
//! An estimate combines three independent pieces of information:
//!
//! - the hardware power draw, adjusted for overhead and data-centre PUE ([`power`])
//! - the processing time, either measured or derived from the workload ([`time`])
//! - the carbon intensity of the grid supplying the power ([`grid`])
//!
//! These are combined by the [`energy`] model and orchestrated by the [`Estimator`]:
//!
//! $$ E_{kWh} = \frac{P_{eff} \cdot t}{3600 \cdot 1000 \cdot n_{batch}}, \qquad CO_2 = E_{kWh} \cdot I_{grid} $$
//!
//! On top of single estimates, [`range`] propagates min/max uncertainty through the same
//! formula and [`aggregate`] folds many results into totals.
//!
//! # Usage
//!
//! ```rust
//! use aiwatt_core::{estimate_impact, ImpactInputs, ThroughputConfig, Usage};
//!
//! let inputs = ImpactInputs::new(350.0)
//!     .with_region("eu")
//!     .with_usage(Usage::chat(1000, 200))
//!     .with_throughput(ThroughputConfig::tokens(100.0));
//!
//! let result = estimate_impact(&inputs).unwrap();
//! assert!((result.processing_time_seconds - 12.0).abs() < 1e-12);
//! assert!(result.co2_grams > 0.0);
//! ```

pub mod aggregate;
pub mod constants;
pub mod energy;
pub mod errors;
pub mod estimator;
pub mod grid;
pub mod inputs;
pub mod power;
pub mod range;
pub mod result;
pub mod time;
pub mod usage;
mod validation;

/// Floating point type used for all physical quantities.
pub type FloatValue = f64;

pub use aggregate::{aggregate_impacts, AggregateImpactResult};
pub use errors::{CalcResult, ImpactError};
pub use estimator::{estimate_impact, estimate_impact_minimal, Estimator};
pub use grid::{
    AsyncGridIntensityResolver, GridIntensityDataset, GridIntensityResolver, IntensitySource,
    ResolverQuery,
};
pub use inputs::{
    EfficiencyConfig, EnergyOverride, ImpactInputs, MinimalImpactInputs, ThroughputConfig,
};
pub use range::{estimate_impact_range, ImpactRangeResult, NumericRange, UncertaintyRanges};
pub use result::{Diagnostic, DiagnosticLevel, ImpactResult};
pub use usage::{Usage, UsageCategory};
