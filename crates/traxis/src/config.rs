//! Configuration bundle for a measurement session.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::circle::FitConfig;
use crate::density::BlacknessConfig;
use crate::error::MeasureError;

/// Everything a [`crate::TrackAnalyzer`] needs besides the markers and image.
///
/// Any subset of fields may be given in JSON; missing ones keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub calibration: Calibration,
    pub fit: FitConfig,
    pub blackness: BlacknessConfig,
}

impl AnalysisConfig {
    /// Parse from a JSON string and validate.
    pub fn from_json_str(data: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file and validate.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<(), MeasureError> {
        self.calibration.validate()?;
        self.blackness.validate()?;
        if !(self.fit.min_condition >= 0.0 && self.fit.min_condition < 1.0) {
            return Err(MeasureError::invalid(format!(
                "fit.min_condition must be in [0, 1), got {}",
                self.fit.min_condition
            )));
        }
        Ok(())
    }
}
