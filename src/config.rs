//! Analysis configuration
//!
//! Every threshold the analysis uses lives here so callers can tune it per
//! series. Missing keys fall back to their defaults, so a document only needs
//! the values it overrides:
//!
//! ```rust
//! use undercut::AnalysisConfig;
//!
//! let config = AnalysisConfig::parse("cliff_sigma: 2.5\ninsights:\n  long_stint_laps: 30\n")?;
//! assert_eq!(config.cliff_sigma, 2.5);
//! assert_eq!(config.insights.long_stint_laps, 30);
//! assert_eq!(config.cliff_min_jump, 0.05);
//! # Ok::<(), undercut::StrategyError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::{Result, StrategyError};

/// Tunable parameters for stint, degradation and comparison analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Multiple of the prior residual standard error a lap must exceed to be a cliff candidate
    pub cliff_sigma: f64,
    /// Smallest residual in seconds that can count as a cliff, a guard for near-zero residual noise
    pub cliff_min_jump: f64,
    /// Remove clean laps farther than this many standard deviations from the mean
    pub outlier_sigma: Option<f64>,
    /// Mean sector delta in seconds above which a sector counts as an advantage
    pub sector_advantage_threshold: f64,
    /// Drivers analyzed at the same time by the session runner
    pub max_concurrency: usize,
    pub insights: InsightThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cliff_sigma: 3.0,
            cliff_min_jump: 0.05,
            outlier_sigma: None,
            sector_advantage_threshold: 0.05,
            max_concurrency: 4,
            insights: InsightThresholds::default(),
        }
    }
}

/// Thresholds that turn analysis numbers into insight labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    /// Degradation slope in s/lap reported as high
    pub high_degradation: f64,
    /// Degradation slope in s/lap reported as good tire management
    pub low_degradation: f64,
    /// Stint length needed before low degradation is reported
    pub low_degradation_min_laps: usize,
    /// Stint length reported as a long stint
    pub long_stint_laps: usize,
    /// Stop count reported as a multi-stop strategy
    pub multi_stop: usize,
    /// Clean-lap standard deviation reported as consistent
    pub consistent_std: f64,
    /// Clean-lap standard deviation reported as variable
    pub variable_std: f64,
    /// Mean pace gap reported in a comparison
    pub pace_gap: f64,
    /// Positions gained or lost across a pit stop worth reporting
    pub position_swing: u32,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            high_degradation: 0.15,
            low_degradation: 0.05,
            low_degradation_min_laps: 10,
            long_stint_laps: 25,
            multi_stop: 3,
            consistent_std: 0.5,
            variable_std: 1.5,
            pace_gap: 0.1,
            position_swing: 2,
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a YAML configuration document.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| StrategyError::parse_error("AnalysisConfig deserialization", e.to_string()))?;
        config.validate()?;
        debug!(?config, "Loaded analysis configuration");
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| StrategyError::file_error(path.to_path_buf(), e))?;
        Self::parse(&yaml)
    }

    /// Check that every value is inside its usable range.
    pub fn validate(&self) -> Result<()> {
        if !(self.cliff_sigma.is_finite() && self.cliff_sigma > 0.0) {
            return Err(StrategyError::invalid_config(format!(
                "cliff_sigma must be positive, got {}",
                self.cliff_sigma
            )));
        }
        if !(self.cliff_min_jump.is_finite() && self.cliff_min_jump >= 0.0) {
            return Err(StrategyError::invalid_config(format!(
                "cliff_min_jump must not be negative, got {}",
                self.cliff_min_jump
            )));
        }
        if let Some(sigma) = self.outlier_sigma {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(StrategyError::invalid_config(format!(
                    "outlier_sigma must be positive, got {}",
                    sigma
                )));
            }
        }
        if self.sector_advantage_threshold < 0.0 {
            return Err(StrategyError::invalid_config("sector_advantage_threshold must not be negative"));
        }
        if self.max_concurrency == 0 {
            return Err(StrategyError::invalid_config("max_concurrency must be at least 1"));
        }
        if self.insights.low_degradation > self.insights.high_degradation {
            return Err(StrategyError::invalid_config(
                "insights.low_degradation must not exceed insights.high_degradation",
            ));
        }
        Ok(())
    }
}
