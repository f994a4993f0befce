//! Grid carbon intensity resolution.
//!
//! The intensity used for an estimate is chosen by strict precedence:
//!
//! 1. An explicit intensity on the inputs always wins.
//! 2. A dynamic resolver, when attached, is asked for the normalised region. Its answer is
//!    used only if it is a finite number greater than zero; anything else counts as "no
//!    answer" and resolution continues.
//! 3. The dataset entry for the normalised region.
//! 4. The dataset's `global` entry, with a warning diagnostic if a region was given but
//!    not recognised.

use super::dataset::GridIntensityDataset;
use super::region::normalize_region;
use crate::errors::CalcResult;
use crate::result::Diagnostic;
use crate::validation::require_positive;
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// What a dynamic resolver is asked about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverQuery {
    /// Canonical region code, `None` when the input region was absent or unrecognised.
    pub region: Option<String>,
    /// The opaque timestamp from the inputs.
    pub timestamp: Option<String>,
}

/// A synchronous source of grid intensities, e.g. a cache of live grid data.
///
/// Implemented for any `Fn(&ResolverQuery) -> Option<f64>`.
pub trait GridIntensityResolver {
    /// Intensity in gCO2/kWh, or `None` when there is no answer.
    fn resolve(&self, query: &ResolverQuery) -> Option<FloatValue>;
}

impl<F> GridIntensityResolver for F
where
    F: Fn(&ResolverQuery) -> Option<FloatValue>,
{
    fn resolve(&self, query: &ResolverQuery) -> Option<FloatValue> {
        self(query)
    }
}

/// An asynchronous source of grid intensities, e.g. a live grid data API.
///
/// Failures (timeouts, transport errors) should be reported as `None`. Retries are the
/// implementation's concern.
pub trait AsyncGridIntensityResolver {
    fn resolve(&self, query: ResolverQuery) -> impl Future<Output = Option<FloatValue>>;
}

impl<F, Fut> AsyncGridIntensityResolver for F
where
    F: Fn(ResolverQuery) -> Fut,
    Fut: Future<Output = Option<FloatValue>>,
{
    fn resolve(&self, query: ResolverQuery) -> impl Future<Output = Option<FloatValue>> {
        self(query)
    }
}

/// An answer obtained ahead of time, replayed through the synchronous pipeline.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PreResolved(pub(crate) Option<FloatValue>);

impl GridIntensityResolver for PreResolved {
    fn resolve(&self, _query: &ResolverQuery) -> Option<FloatValue> {
        self.0
    }
}

/// Which step of the precedence produced the intensity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IntensitySource {
    Explicit,
    Resolver,
    Region { code: String },
    GlobalFallback,
}

/// A resolved grid intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct GridIntensity {
    /// unit: gCO2 / kWh
    pub value: FloatValue,
    pub source: IntensitySource,
    /// The normalised region, if the input region was recognised.
    pub region: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GridIntensity {
    /// Human-readable description for the result notes.
    pub fn note(&self) -> String {
        let origin = match (&self.source, &self.region) {
            (IntensitySource::Explicit, _) => "explicit override".to_string(),
            (IntensitySource::Resolver, Some(code)) => format!("dynamic resolver, region '{code}'"),
            (IntensitySource::Resolver, None) => "dynamic resolver".to_string(),
            (IntensitySource::Region { code }, _) => format!("region '{code}'"),
            (IntensitySource::GlobalFallback, _) => "global average".to_string(),
        };
        format!("Grid intensity: {} gCO2/kWh ({origin})", self.value)
    }
}

/// Build the query a resolver would receive for these inputs.
pub fn resolver_query(
    region: Option<&str>,
    timestamp: Option<&str>,
    dataset: &GridIntensityDataset,
) -> ResolverQuery {
    ResolverQuery {
        region: normalize_region(region, dataset),
        timestamp: timestamp.map(str::to_string),
    }
}

/// Decide the grid intensity for an estimate.
///
/// Fails only when `explicit` is supplied and is not a finite positive number.
pub fn resolve_grid_intensity(
    region: Option<&str>,
    explicit: Option<FloatValue>,
    resolver: Option<&dyn GridIntensityResolver>,
    timestamp: Option<&str>,
    dataset: &GridIntensityDataset,
) -> CalcResult<GridIntensity> {
    if let Some(value) = explicit {
        let value = require_positive("gridCarbonIntensityGPerKwh", value)?;
        return Ok(GridIntensity {
            value,
            source: IntensitySource::Explicit,
            region: normalize_region(region, dataset),
            diagnostics: vec![],
        });
    }

    let query = resolver_query(region, timestamp, dataset);
    let mut diagnostics = vec![];

    if let Some(resolver) = resolver {
        match resolver.resolve(&query) {
            Some(value) if value.is_finite() && value > 0.0 => {
                return Ok(GridIntensity {
                    value,
                    source: IntensitySource::Resolver,
                    region: query.region,
                    diagnostics,
                });
            }
            Some(value) => {
                warn!(
                    region = ?query.region,
                    value,
                    "Grid intensity resolver returned an invalid value; ignoring it"
                );
                diagnostics.push(Diagnostic::info(format!(
                    "Grid intensity resolver returned {value}; falling back to static data"
                )));
            }
            None => {
                debug!(region = ?query.region, "Grid intensity resolver had no answer");
            }
        }
    }

    if let Some(code) = query.region {
        if let Some(value) = dataset.get(&code) {
            return Ok(GridIntensity {
                value,
                source: IntensitySource::Region { code: code.clone() },
                region: Some(code),
                diagnostics,
            });
        }
    }

    let value = dataset.global();
    if let Some(region) = region.filter(|r| !r.trim().is_empty()) {
        warn!(
            region,
            global = value,
            "Unknown region; using the global average grid intensity"
        );
        diagnostics.push(Diagnostic::warning(format!(
            "Unknown region '{region}'; using global average grid intensity of {value} gCO2/kWh"
        )));
    }

    Ok(GridIntensity {
        value,
        source: IntensitySource::GlobalFallback,
        region: None,
        diagnostics,
    })
}
