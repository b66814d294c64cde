//! Tire degradation trend and cliff detection
//!
//! Degradation is measured on clean laps only (see [`LapRecord::is_clean`]).
//! Laps under yellow or safety car, pit in/out laps and laps without a time
//! say nothing about tire pace and are dropped before any fitting happens.
//!
//! The trend is an ordinary least-squares line of lap time against lap
//! number. The cliff is the first lap whose time sits well above the trend of
//! the laps before it, where "well above" scales with how noisy those earlier
//! laps were, and which is confirmed by the following clean lap.
//!
//! [`LapRecord::is_clean`]: crate::types::LapRecord::is_clean

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::stats::{LinearFit, mean, sample_std};
use crate::AnalysisConfig;
use crate::types::{Stint, StintRef};

/// Clean laps needed to fit a trend.
pub const MIN_LAPS_FOR_TREND: usize = 2;

/// Clean laps needed before cliff detection runs.
pub const MIN_LAPS_FOR_CLIFF: usize = 4;

/// Clean laps that form the history before the first cliff candidate.
const CLIFF_HISTORY: usize = 3;

/// Degradation analysis of one stint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DegradationResult {
    pub stint: StintRef,
    /// `(lap number, lap time)` pairs the trend was fitted on
    pub clean_laps: Vec<(u32, f64)>,
    pub fit: DegradationFit,
}

/// Outcome of the trend fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DegradationFit {
    /// Fewer than two clean laps, so no slope, intercept or cliff exists
    InsufficientData,
    Fitted(DegradationTrend),
}

/// Fitted degradation trend of a stint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DegradationTrend {
    /// Seconds per lap; positive means the stint got slower
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Fitted pace at the last clean lap minus fitted pace at the first
    pub total_degradation: f64,
    /// Time of the first clean lap
    pub initial_pace: f64,
    /// Time of the last clean lap
    pub final_pace: f64,
    pub cliff: CliffDetection,
}

/// Result of looking for a cliff in a stint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CliffDetection {
    /// Too few clean laps to judge
    Skipped,
    NotDetected,
    Detected(Cliff),
}

/// Lap where pace dropped off sharply and stayed down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Cliff {
    pub lap: u32,
    /// Seconds above the trend of the preceding laps
    pub residual: f64,
    /// Threshold the residual had to exceed
    pub threshold: f64,
}

impl DegradationResult {
    pub fn trend(&self) -> Option<&DegradationTrend> {
        match &self.fit {
            DegradationFit::Fitted(trend) => Some(trend),
            DegradationFit::InsufficientData => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self.fit, DegradationFit::InsufficientData)
    }

    pub fn slope(&self) -> Option<f64> {
        self.trend().map(|t| t.slope)
    }

    /// Cliff detection outcome, `None` when no trend could be fitted.
    pub fn cliff_detection(&self) -> Option<&CliffDetection> {
        self.trend().map(|t| &t.cliff)
    }

    pub fn cliff_lap(&self) -> Option<u32> {
        match self.cliff_detection()? {
            CliffDetection::Detected(cliff) => Some(cliff.lap),
            CliffDetection::Skipped | CliffDetection::NotDetected => None,
        }
    }
}

/// Fits degradation trends using the thresholds of an [`AnalysisConfig`].
#[derive(Debug, Clone)]
pub struct DegradationAnalyzer {
    cliff_sigma: f64,
    cliff_min_jump: f64,
    outlier_sigma: Option<f64>,
}

impl Default for DegradationAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl DegradationAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            cliff_sigma: config.cliff_sigma,
            cliff_min_jump: config.cliff_min_jump,
            outlier_sigma: config.outlier_sigma,
        }
    }

    /// Analyze the degradation of a single stint.
    pub fn analyze(&self, stint: &Stint) -> DegradationResult {
        let clean_laps = self.clean_laps(stint);
        let points: Vec<(f64, f64)> =
            clean_laps.iter().map(|(lap, time)| (f64::from(*lap), *time)).collect();

        let fit = match LinearFit::fit(&points) {
            Some(line) if points.len() >= MIN_LAPS_FOR_TREND => {
                let (first, last) = (points[0], points[points.len() - 1]);
                DegradationFit::Fitted(DegradationTrend {
                    slope: line.slope,
                    intercept: line.intercept,
                    r_squared: line.r_squared(&points),
                    total_degradation: line.predict(last.0) - line.predict(first.0),
                    initial_pace: first.1,
                    final_pace: last.1,
                    cliff: self.detect_cliff(&clean_laps),
                })
            }
            _ => DegradationFit::InsufficientData,
        };

        let result = DegradationResult { stint: stint.reference(), clean_laps, fit };
        debug!(
            driver = %stint.driver,
            stint = stint.number,
            compound = %stint.compound,
            clean_laps = result.clean_laps.len(),
            slope = ?result.slope(),
            cliff = ?result.cliff_lap(),
            "Analyzed stint degradation"
        );
        result
    }

    fn clean_laps(&self, stint: &Stint) -> Vec<(u32, f64)> {
        let mut laps: Vec<(u32, f64)> = stint
            .laps
            .iter()
            .filter(|lap| lap.is_clean())
            .filter_map(|lap| lap.lap_time.map(|time| (lap.lap_number, time)))
            .collect();

        if let Some(sigma) = self.outlier_sigma {
            if laps.len() > CLIFF_HISTORY {
                let times: Vec<f64> = laps.iter().map(|(_, time)| *time).collect();
                if let (Some(mean), Some(std)) = (mean(&times), sample_std(&times)) {
                    let (lower, upper) = (mean - sigma * std, mean + sigma * std);
                    laps.retain(|(lap, time)| {
                        let keep = (lower..=upper).contains(time);
                        if !keep {
                            trace!(lap, time, "Dropping outlier lap");
                        }
                        keep
                    });
                }
            }
        }
        laps
    }

    /// Find the first sustained jump above the trend of the preceding laps.
    ///
    /// A candidate that the next clean lap does not confirm is treated as a
    /// one-off and left out of the history used for later candidates.
    fn detect_cliff(&self, clean_laps: &[(u32, f64)]) -> CliffDetection {
        if clean_laps.len() < MIN_LAPS_FOR_CLIFF {
            return CliffDetection::Skipped;
        }

        let points: Vec<(f64, f64)> =
            clean_laps.iter().map(|(lap, time)| (f64::from(*lap), *time)).collect();
        let mut history: Vec<(f64, f64)> = points[..CLIFF_HISTORY].to_vec();

        for index in CLIFF_HISTORY..points.len() {
            let Some(line) = LinearFit::fit(&history) else {
                history.push(points[index]);
                continue;
            };
            let prior_std = line.residual_std(&history).unwrap_or(0.0);
            let threshold = (self.cliff_sigma * prior_std).max(self.cliff_min_jump);
            let (x, y) = points[index];
            let residual = y - line.predict(x);

            if residual <= threshold {
                history.push(points[index]);
                continue;
            }

            let confirmed = points
                .get(index + 1)
                .is_some_and(|(next_x, next_y)| next_y - line.predict(*next_x) > threshold);

            if confirmed {
                return CliffDetection::Detected(Cliff { lap: clean_laps[index].0, residual, threshold });
            }
            trace!(lap = clean_laps[index].0, residual, threshold, "Ignoring single-lap spike");
        }

        CliffDetection::NotDetected
    }
}

/// Analyze a stint with the default configuration.
pub fn analyze(stint: &Stint) -> DegradationResult {
    DegradationAnalyzer::default().analyze(stint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::segment;
    use crate::test_utils::{lap, laps_on, stint_from_times};
    use crate::types::{Compound, TrackStatus};
    use proptest::prelude::*;

    #[test]
    fn two_stint_race_has_expected_slopes() {
        let mut laps = laps_on("VER", 1..=10, Compound::Soft, 90.0, 0.2);
        let mut hard = laps_on("VER", 11..=20, Compound::Hard, 89.0, 0.1);
        hard[0] = hard[0].clone().out_of_pit(None);
        laps.extend(hard);

        let stints = segment(&laps).unwrap();
        assert_eq!(stints.len(), 2);

        let first = analyze(&stints[0]);
        assert!((first.slope().unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(first.cliff_detection(), Some(&CliffDetection::NotDetected));
        assert_eq!(first.cliff_lap(), None);

        let second = analyze(&stints[1]);
        assert_eq!(second.clean_laps.len(), 9);
        assert_eq!(second.clean_laps[0].0, 12);
        assert!((second.slope().unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn sustained_jump_is_a_cliff() {
        let stint = stint_from_times("HAM", Compound::Medium, &[92.0, 92.1, 92.3, 92.2, 95.5, 95.8]);
        let result = analyze(&stint);

        assert_eq!(result.cliff_lap(), Some(5));
        let Some(CliffDetection::Detected(cliff)) = result.cliff_detection() else {
            panic!("Expected a detected cliff");
        };
        assert!(cliff.residual > cliff.threshold);
    }

    #[test]
    fn threshold_follows_stint_noise() {
        let stint =
            stint_from_times("PIA", Compound::Hard, &[92.00, 92.03, 92.01, 92.04, 92.45, 92.48, 92.47]);
        let result = analyze(&stint);

        assert_eq!(result.cliff_lap(), Some(5));
        let Some(CliffDetection::Detected(cliff)) = result.cliff_detection() else {
            panic!("Expected a detected cliff");
        };
        assert!(cliff.threshold < 0.1);
        assert!(cliff.residual > 0.35);
    }

    #[test]
    fn single_lap_spike_is_not_a_cliff() {
        let stint = stint_from_times("HAM", Compound::Medium, &[92.0, 92.1, 92.3, 92.2, 95.5, 92.4, 92.5]);
        let result = analyze(&stint);

        assert_eq!(result.cliff_detection(), Some(&CliffDetection::NotDetected));
    }

    #[test]
    fn jump_on_last_lap_cannot_be_confirmed() {
        let stint = stint_from_times("RUS", Compound::Hard, &[92.0, 92.1, 92.3, 92.2, 95.5]);
        assert_eq!(analyze(&stint).cliff_lap(), None);
    }

    #[test]
    fn one_lap_stint_is_insufficient() {
        let stint = stint_from_times("OCO", Compound::Soft, &[91.0]);
        let result = analyze(&stint);

        assert!(result.is_insufficient());
        assert_eq!(result.slope(), None);
        assert_eq!(result.cliff_detection(), None);
    }

    #[test]
    fn short_stint_skips_cliff_detection() {
        let stint = stint_from_times("OCO", Compound::Soft, &[91.0, 91.2, 91.1]);
        let result = analyze(&stint);

        assert!(!result.is_insufficient());
        assert_eq!(result.cliff_detection(), Some(&CliffDetection::Skipped));
    }

    #[test]
    fn safety_car_only_stint_is_insufficient() {
        let laps: Vec<_> = (1..=5)
            .map(|n| lap("ZHO", n, 120.0, Compound::Hard).with_track_status(TrackStatus::SafetyCar))
            .collect();
        let stints = segment(&laps).unwrap();
        let result = analyze(&stints[0]);

        assert!(result.is_insufficient());
        assert!(result.clean_laps.is_empty());
    }

    #[test]
    fn total_degradation_uses_fitted_pace() {
        let stint = stint_from_times("ALB", Compound::Medium, &[90.0, 90.3, 90.2, 90.5, 90.4]);
        let result = analyze(&stint);
        let trend = result.trend().unwrap();

        assert!((trend.total_degradation - trend.slope * 4.0).abs() < 1e-9);
        assert_eq!(trend.initial_pace, 90.0);
        assert_eq!(trend.final_pace, 90.4);
    }

    #[test]
    fn outlier_filter_is_opt_in() {
        let mut times = vec![90.0; 12];
        times[6] = 110.0;
        let stint = stint_from_times("TSU", Compound::Hard, &times);

        assert_eq!(analyze(&stint).clean_laps.len(), 12);

        let config = AnalysisConfig { outlier_sigma: Some(2.0), ..AnalysisConfig::default() };
        let filtered = DegradationAnalyzer::new(&config).analyze(&stint);
        assert_eq!(filtered.clean_laps.len(), 11);
        assert!(filtered.clean_laps.iter().all(|(_, time)| *time == 90.0));
    }

    proptest! {
        #[test]
        fn prop_slope_sign_invariant_under_offset(
            times in prop::collection::vec(85.0f64..100.0, 2..25),
            offset in -20.0f64..20.0
        ) {
            let base = analyze(&stint_from_times("PER", Compound::Soft, &times));
            let shifted_times: Vec<f64> = times.iter().map(|t| t + offset).collect();
            let shifted = analyze(&stint_from_times("PER", Compound::Soft, &shifted_times));

            let (a, b) = (base.slope().unwrap(), shifted.slope().unwrap());
            prop_assume!(a.abs() > 1e-6);
            prop_assert_eq!(a.signum(), b.signum());
            prop_assert!((a - b).abs() < 1e-6);
        }

        #[test]
        fn prop_cliff_lies_after_first_three_clean_laps(
            times in prop::collection::vec(85.0f64..100.0, 1..25)
        ) {
            let stint = stint_from_times("MAG", Compound::Medium, &times);
            let result = analyze(&stint);

            if let Some(cliff_lap) = result.cliff_lap() {
                let third = result.clean_laps[2].0;
                prop_assert!(cliff_lap > third);
            }
            if result.clean_laps.len() < MIN_LAPS_FOR_CLIFF {
                prop_assert!(matches!(
                    result.cliff_detection(),
                    None | Some(CliffDetection::Skipped)
                ));
            }
        }
    }
}
