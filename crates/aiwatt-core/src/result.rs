//! Outputs of a single estimate.

use crate::grid::IntensitySource;
use crate::usage::UsageCategory;
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
}

/// A condition worth surfacing to the caller that did not stop the calculation.
///
/// Diagnostics are kept apart from [`ImpactResult::notes`], which only describe the
/// calculation steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level == DiagnosticLevel::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagnosticLevel::Info => "info",
            DiagnosticLevel::Warning => "warning",
        };
        write!(f, "[{level}] {}", self.message)
    }
}

/// The estimated impact of one inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResult {
    /// Present when the estimate was made from a usage description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<UsageCategory>,
    /// unit: kWh
    pub energy_kwh: FloatValue,
    /// unit: g
    pub co2_grams: FloatValue,
    /// The grid intensity actually used.
    /// unit: gCO2 / kWh
    pub grid_carbon_intensity_g_per_kwh: FloatValue,
    pub grid_intensity_source: IntensitySource,
    /// unit: W
    pub effective_power_w: FloatValue,
    /// The processing time actually used, 0 when an energy override was supplied without one.
    /// unit: s
    pub processing_time_seconds: FloatValue,
    /// Calculation steps, in the order they were applied.
    pub notes: Vec<String>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ImpactResult {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        assert_eq!(
            Diagnostic::warning("region not recognised").to_string(),
            "[warning] region not recognised"
        );
        assert!(!Diagnostic::info("x").is_warning());
    }
}
