//! Extractor configuration
//!
//! Loaded from an optional YAML file. Every key has a default, so an empty
//! file (or no file at all) reproduces the standard FDM layout and the
//! 2026 scenario parameters.

use crate::error::{FdmError, FdmResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tax: TaxConfig,
    pub scenario: ScenarioConfig,
    pub scan: ScanConfig,
    pub batch: BatchConfig,
    pub output: OutputConfig,
}

/// Statutory tax formula: `(NJOP - deduction) * [assessment_ratio *] rate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    pub deduction: f64,
    pub rate: f64,
    pub assessment_ratio: Option<f64>,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            deduction: 12_000_000.0,
            rate: 0.005,
            assessment_ratio: None,
        }
    }
}

/// Initial values of the Summary sheet inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// BIT increase on the land-development component
    pub uplift: f64,
    /// NDT increase on the per-category land valuations
    pub projection: f64,
    pub revenue_target: f64,
    pub collection_rate: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            uplift: 0.103,
            projection: 0.46,
            revenue_target: 110_289_165_592.0,
            collection_rate: 0.95,
        }
    }
}

/// Bounds of keyword and anchor scans (rows, columns from A1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub keyword_rows: u32,
    pub keyword_cols: u32,
    pub anchor_rows: u32,
    pub anchor_cols: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            keyword_rows: 150,
            keyword_cols: 6,
            anchor_rows: 150,
            anchor_cols: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub max_files: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_files: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_prefix: "Hasil_Ekstraksi_FDM".to_string(),
        }
    }
}

impl Config {
    /// Load and validate a YAML configuration file
    pub fn load(path: &Path) -> FdmResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> FdmResult<Self> {
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> FdmResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> FdmResult<()> {
        check_fraction("tax.rate", self.tax.rate)?;
        check_fraction("scenario.uplift", self.scenario.uplift)?;
        check_fraction("scenario.projection", self.scenario.projection)?;
        check_fraction("scenario.collection_rate", self.scenario.collection_rate)?;

        if !self.tax.deduction.is_finite() || self.tax.deduction < 0.0 {
            return Err(FdmError::Config(format!(
                "tax.deduction must be a non-negative amount, got {}",
                self.tax.deduction
            )));
        }
        if let Some(ratio) = self.tax.assessment_ratio {
            if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
                return Err(FdmError::Config(format!(
                    "tax.assessment_ratio must be in (0, 1], got {}",
                    ratio
                )));
            }
        }
        if !self.scenario.revenue_target.is_finite() {
            return Err(FdmError::Config(
                "scenario.revenue_target must be a finite amount".to_string(),
            ));
        }

        let scan = &self.scan;
        if scan.keyword_rows == 0
            || scan.keyword_cols == 0
            || scan.anchor_rows == 0
            || scan.anchor_cols == 0
        {
            return Err(FdmError::Config(
                "scan windows need at least one row and one column".to_string(),
            ));
        }
        if self.batch.max_files == 0 {
            return Err(FdmError::Config(
                "batch.max_files must be at least 1".to_string(),
            ));
        }
        if self.output.file_prefix.trim().is_empty() {
            return Err(FdmError::Config(
                "output.file_prefix cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_fraction(name: &str, value: f64) -> FdmResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FdmError::Config(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )))
    }
}
