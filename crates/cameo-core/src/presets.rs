//! Named curve presets.
//!
//! A preset is plain data: optional control points for the shared value curve
//! and for each of blue, green and red. Presets are serialisable so custom
//! looks can be loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::curve::CurveFunction;
use crate::error::FilterError;
use crate::filter::LookupFilter;

/// Control points for a full set of channel curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePreset {
    /// Preset name for logs and menus.
    pub name: String,
    /// Curve applied to every channel before the channel curve.
    #[serde(default)]
    pub value: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub blue: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub green: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub red: Option<Vec<[f64; 2]>>,
}

impl CurvePreset {
    /// Film-like look modelled on Kodak Portra.
    pub fn portra() -> Self {
        Self {
            name: "portra".to_string(),
            value: Some(vec![[0.0, 0.0], [23.0, 20.0], [157.0, 173.0], [255.0, 255.0]]),
            blue: Some(vec![[0.0, 0.0], [41.0, 46.0], [231.0, 228.0], [255.0, 255.0]]),
            green: Some(vec![[0.0, 0.0], [52.0, 47.0], [189.0, 196.0], [255.0, 255.0]]),
            red: Some(vec![[0.0, 0.0], [69.0, 69.0], [213.0, 218.0], [255.0, 255.0]]),
        }
    }

    /// Parse a preset from JSON.
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a preset from a JSON file.
    pub fn load(path: &Path) -> Result<Self, FilterError> {
        let json = std::fs::read_to_string(path).map_err(|source| FilterError::PresetIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Bake the preset into lookup tables.
    ///
    /// Malformed point lists (fewer than 2 points, duplicate x) act as an
    /// identity curve.
    pub fn to_filter(&self) -> LookupFilter {
        let curve = |points: &Option<Vec<[f64; 2]>>| points.as_deref().and_then(CurveFunction::from_pairs);
        let value = curve(&self.value);
        let blue = curve(&self.blue);
        let green = curve(&self.green);
        let red = curve(&self.red);

        for (channel, points, built) in [
            ("value", &self.value, &value),
            ("blue", &self.blue, &blue),
            ("green", &self.green, &green),
            ("red", &self.red, &red),
        ] {
            if points.is_some() && built.is_none() {
                tracing::warn!(preset = %self.name, channel, "ignoring malformed curve");
            }
        }

        LookupFilter::from_curves(value.as_ref(), blue.as_ref(), green.as_ref(), red.as_ref())
    }
}
