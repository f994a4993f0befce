//! Grid carbon intensity lookup table.
//!
//! The dataset maps canonical, lower-case region codes to the average carbon intensity of
//! electricity supplied in that region. A `global` entry is always present and is used
//! when a region cannot be resolved.
//!
//! A default table ships with the crate ([`GridIntensityDataset::builtin`]). Callers with
//! their own figures can load them from TOML:
//!
//! ```toml
//! year = 2024
//! unit = "gCO2/kWh"
//! source = "Internal grid survey"
//! source_url = "https://example.com/grid"
//!
//! [intensities]
//! global = 473.0
//! uk = 124.0
//! ```

use crate::constants::GLOBAL_REGION;
use crate::errors::{CalcResult, ImpactError};
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Annual average grid carbon intensities.
/// unit: gCO2 / kWh
const BUILTIN_INTENSITIES: &[(&str, FloatValue)] = &[
    ("global", 473.0),
    ("eu", 210.21),
    ("uk", 217.84),
    ("us", 369.47),
    ("ca", 170.15),
    ("mx", 407.63),
    ("br", 98.31),
    ("ar", 354.1),
    ("cl", 291.11),
    ("fr", 56.04),
    ("de", 380.95),
    ("es", 174.05),
    ("it", 288.1),
    ("nl", 268.48),
    ("be", 138.06),
    ("at", 110.81),
    ("ch", 34.84),
    ("ie", 282.35),
    ("pt", 165.55),
    ("pl", 662.41),
    ("cz", 449.72),
    ("dk", 151.65),
    ("se", 35.99),
    ("no", 29.0),
    ("fi", 79.16),
    ("gr", 336.57),
    ("ro", 240.58),
    ("hu", 204.19),
    ("in", 713.44),
    ("cn", 582.29),
    ("jp", 485.39),
    ("kr", 432.48),
    ("tw", 642.38),
    ("sg", 470.78),
    ("id", 675.93),
    ("th", 549.61),
    ("vn", 472.04),
    ("my", 605.83),
    ("ph", 610.74),
    ("au", 548.69),
    ("nz", 112.76),
    ("za", 707.69),
    ("ng", 523.25),
    ("ke", 70.3),
    ("eg", 570.52),
    ("sa", 696.31),
    ("ae", 492.7),
    ("tr", 464.59),
    ("ru", 441.04),
];

static BUILTIN: LazyLock<GridIntensityDataset> = LazyLock::new(|| GridIntensityDataset {
    year: 2023,
    unit: "gCO2/kWh".to_string(),
    source: "Ember Yearly Electricity Data".to_string(),
    source_url: "https://ember-energy.org/data/yearly-electricity-data/".to_string(),
    intensities: BUILTIN_INTENSITIES
        .iter()
        .map(|(code, value)| (code.to_string(), *value))
        .collect(),
});

/// Region code to grid carbon intensity, with provenance metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct GridIntensityDataset {
    year: u16,
    unit: String,
    source: String,
    source_url: String,
    intensities: BTreeMap<String, FloatValue>,
}

#[derive(Deserialize)]
struct RawDataset {
    year: u16,
    #[serde(default = "default_unit")]
    unit: String,
    source: String,
    #[serde(default)]
    source_url: String,
    intensities: BTreeMap<String, FloatValue>,
}

fn default_unit() -> String {
    "gCO2/kWh".to_string()
}

impl TryFrom<RawDataset> for GridIntensityDataset {
    type Error = ImpactError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.unit, raw.source, raw.source_url, raw.intensities)
    }
}

impl GridIntensityDataset {
    /// Create a dataset from caller-supplied intensities.
    ///
    /// Region codes are trimmed and lower-cased. Every intensity must be finite and
    /// positive, and a `global` entry must be present.
    pub fn new(
        year: u16,
        unit: impl Into<String>,
        source: impl Into<String>,
        source_url: impl Into<String>,
        intensities: impl IntoIterator<Item = (String, FloatValue)>,
    ) -> CalcResult<Self> {
        let mut table = BTreeMap::new();
        for (code, value) in intensities {
            let code = code.trim().to_lowercase();
            if !(value.is_finite() && value > 0.0) {
                return Err(ImpactError::InvalidDataset(format!(
                    "intensity for region '{code}' must be a finite number greater than 0, got {value}"
                )));
            }
            table.insert(code, value);
        }
        if !table.contains_key(GLOBAL_REGION) {
            return Err(ImpactError::InvalidDataset(format!(
                "missing required '{GLOBAL_REGION}' entry"
            )));
        }

        Ok(Self {
            year,
            unit: unit.into(),
            source: source.into(),
            source_url: source_url.into(),
            intensities: table,
        })
    }

    /// The table shipped with the crate.
    pub fn builtin() -> &'static GridIntensityDataset {
        &BUILTIN
    }

    /// Parse a dataset from a TOML document.
    pub fn from_toml_str(document: &str) -> CalcResult<Self> {
        Ok(toml::from_str(document)?)
    }

    /// Intensity for a canonical region code.
    pub fn get(&self, code: &str) -> Option<FloatValue> {
        self.intensities.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.intensities.contains_key(code)
    }

    /// Intensity used when a region is unknown.
    pub fn global(&self) -> FloatValue {
        // Presence is checked on construction.
        self.intensities[GLOBAL_REGION]
    }

    /// Canonical region codes in lexical order.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.intensities.keys().map(String::as_str)
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

impl Default for GridIntensityDataset {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
