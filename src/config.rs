// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Carver tunables.
//!
//! Unlike the pixel layout, which is fixed when a carver is built,
//! everything here may be changed between passes.

use crate::energy::EnergyFunction;
use crate::error::{CarverError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which axis a two-axis resize carves first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeOrder {
    WidthFirst,
    HeightFirst,
}

impl Default for ResizeOrder {
    fn default() -> Self {
        ResizeOrder::WidthFirst
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarverConfig {
    pub energy_function: EnergyFunction,
    /// Scale applied to the rigidity mask before it is added to the
    /// energy.
    pub rigidity_coefficient: f64,
    /// The most a single pass may enlarge an axis by, as a factor of
    /// its size when the pass starts.  Must lie in `(1, 2]`.
    pub enlargement_step: f64,
    /// How many columns a seam may drift between adjacent rows.
    pub seam_step: usize,
    pub resize_order: ResizeOrder,
}

impl Default for CarverConfig {
    fn default() -> Self {
        CarverConfig {
            energy_function: EnergyFunction::default(),
            rigidity_coefficient: 1.0,
            enlargement_step: 2.0,
            seam_step: 1,
            resize_order: ResizeOrder::default(),
        }
    }
}

impl CarverConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.rigidity_coefficient.is_finite() {
            return Err(CarverError::Configuration(format!(
                "rigidity coefficient must be finite, not {}",
                self.rigidity_coefficient
            )));
        }
        if !(self.enlargement_step > 1.0 && self.enlargement_step <= 2.0) {
            return Err(CarverError::Configuration(format!(
                "enlargement step must lie in (1, 2], not {}",
                self.enlargement_step
            )));
        }
        if self.seam_step == 0 {
            return Err(CarverError::Configuration(
                "seam step must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CarverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

pub fn load_config(path: &Path) -> Result<CarverConfig> {
    let data = fs::read_to_string(path)?;
    CarverConfig::from_json_str(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(CarverConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config =
            CarverConfig::from_json_str(r#"{ "energy_function": "luma-grad-norm" }"#).unwrap();
        assert_eq!(config.energy_function, EnergyFunction::LumaGradNorm);
        assert_eq!(config.enlargement_step, 2.0);
        assert_eq!(config.resize_order, ResizeOrder::WidthFirst);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = CarverConfig::from_json_str(r#"{ "enlargement_step": 3.0 }"#).unwrap_err();
        assert!(matches!(err, CarverError::Configuration(_)));
        let err = CarverConfig::from_json_str(r#"{ "seam_step": 0 }"#).unwrap_err();
        assert!(matches!(err, CarverError::Configuration(_)));
        let err = CarverConfig::from_json_str(r#"{ "energy_function": "sobel" }"#).unwrap_err();
        assert!(matches!(err, CarverError::Json(_)));
    }

    #[test]
    fn loads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "rigidity_coefficient": 0.5, "resize_order": "height-first" }}"#
        )
        .unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.rigidity_coefficient, 0.5);
        assert_eq!(config.resize_order, ResizeOrder::HeightFirst);
    }
}
