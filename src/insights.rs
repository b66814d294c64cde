//! Strategy report assembly and insight labels
//!
//! [`StrategyReport::build`] runs the segmenter, the degradation analyzer and,
//! when a rival is given, the pace comparator over one driver's laps, then
//! turns the numbers into short ranked [`Insight`] labels for presentation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::stats::sample_std;
use crate::analysis::{
    CliffDetection, DegradationAnalyzer, DegradationResult, HeadToHead, PaceComparison, PitStop,
    SectorBreakdown, compare, head_to_head, pit_stops, segment, weak_sectors,
};
use crate::config::{AnalysisConfig, InsightThresholds};
use crate::format::{format_delta, format_lap_time};
use crate::types::{DriverLaps, Stint};
use crate::Result;

/// Clean laps a stint needs before its trend is worth reporting.
const MIN_LAPS_FOR_INSIGHT: usize = 5;

/// Area of the race an insight is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Strategy,
    Degradation,
    Pace,
    Comparison,
}

/// A short finding about a driver's race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
    /// 1 (minor) to 3 (major)
    pub importance: u8,
}

impl Insight {
    fn new(kind: InsightKind, importance: u8, message: String) -> Self {
        Self { kind, message, importance }
    }
}

/// Everything derived for one driver, optionally against a rival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct StrategyReport {
    pub driver: String,
    pub stints: Vec<Stint>,
    pub pit_stops: Vec<PitStop>,
    /// One entry per stint, in stint order
    pub degradation: Vec<DegradationResult>,
    pub comparison: Option<PaceComparison>,
    pub head_to_head: Option<HeadToHead>,
    pub sectors: Option<SectorBreakdown>,
    /// Sorted by importance, most important first
    pub insights: Vec<Insight>,
}

impl StrategyReport {
    /// Analyze a driver's laps and, if given, compare them against a rival.
    ///
    /// Fails only when the driver's lap numbers are out of order. Every stage
    /// sees only the laps before a gap in lap numbers, for both drivers.
    pub fn build(laps: &DriverLaps, rival: Option<&DriverLaps>, config: &AnalysisConfig) -> Result<Self> {
        let stints = segment(&laps.laps)?;
        let stops = pit_stops(laps.running_laps());
        let analyzer = DegradationAnalyzer::new(config);
        let degradation: Vec<DegradationResult> = stints.iter().map(|s| analyzer.analyze(s)).collect();

        let comparison = rival.map(|rival| compare(laps, rival));
        let head_to_head = rival.map(|rival| head_to_head(laps, rival));
        let sectors = comparison.as_ref().map(|c| weak_sectors(c, config.sector_advantage_threshold));

        let thresholds = &config.insights;
        let mut insights = strategy_insights(&laps.driver, &stints, &stops, thresholds);
        insights.extend(degradation_insights(&laps.driver, &stints, &degradation, thresholds));
        insights.extend(pace_insights(laps, thresholds));
        if let Some(comparison) = &comparison {
            insights.extend(comparison_insights(comparison, thresholds));
        }
        insights.extend(head_to_head.as_ref().and_then(fastest_lap_insight));
        insights.sort_by(|a, b| b.importance.cmp(&a.importance));

        debug!(
            driver = %laps.driver,
            stints = stints.len(),
            pit_stops = stops.len(),
            insights = insights.len(),
            "Built strategy report"
        );

        Ok(Self {
            driver: laps.driver.clone(),
            stints,
            pit_stops: stops,
            degradation,
            comparison,
            head_to_head,
            sectors,
            insights,
        })
    }

    /// Insights of one kind, in importance order.
    pub fn insights_of(&self, kind: InsightKind) -> impl Iterator<Item = &Insight> {
        self.insights.iter().filter(move |insight| insight.kind == kind)
    }
}

fn strategy_insights(
    driver: &str,
    stints: &[Stint],
    stops: &[PitStop],
    t: &InsightThresholds,
) -> Vec<Insight> {
    let mut insights = Vec::new();
    if stints.is_empty() {
        return insights;
    }

    if stops.is_empty() {
        insights.push(Insight::new(
            InsightKind::Strategy,
            2,
            format!("{driver} completed the session without pitting"),
        ));
    } else if stops.len() >= t.multi_stop {
        insights.push(Insight::new(
            InsightKind::Strategy,
            2,
            format!("{driver} made {} pit stops, an aggressive multi-stop strategy", stops.len()),
        ));
    }

    if stints.len() >= 2 {
        if let Some(longest) = stints.iter().max_by_key(|s| s.lap_count()) {
            if longest.lap_count() >= t.long_stint_laps {
                insights.push(Insight::new(
                    InsightKind::Strategy,
                    1,
                    format!(
                        "{driver}'s longest stint was {} laps on {} (laps {}-{})",
                        longest.lap_count(),
                        longest.compound,
                        longest.start_lap,
                        longest.end_lap
                    ),
                ));
            }
        }
    }

    insights.extend(position_swing(driver, stints, t.position_swing));
    insights
}

/// First stop that gained or lost at least `swing` positions.
fn position_swing(driver: &str, stints: &[Stint], swing: u32) -> Option<Insight> {
    let swing = i64::from(swing);
    stints.windows(2).find_map(|pair| {
        let before = i64::from(pair[0].end_position()?);
        let after = i64::from(pair[1].start_position()?);
        let gained = before - after;

        if gained >= swing {
            Some(Insight::new(
                InsightKind::Strategy,
                3,
                format!(
                    "{driver} gained {gained} positions through the pit stop at lap {}",
                    pair[0].end_lap
                ),
            ))
        } else if gained <= -swing {
            Some(Insight::new(
                InsightKind::Strategy,
                2,
                format!(
                    "{driver} lost {} positions through the pit stop at lap {}",
                    -gained,
                    pair[0].end_lap
                ),
            ))
        } else {
            None
        }
    })
}

fn degradation_insights(
    driver: &str,
    stints: &[Stint],
    results: &[DegradationResult],
    t: &InsightThresholds,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    for (stint, result) in stints.iter().zip(results) {
        let Some(trend) = result.trend() else {
            continue;
        };

        if let CliffDetection::Detected(cliff) = &trend.cliff {
            insights.push(Insight::new(
                InsightKind::Degradation,
                3,
                format!(
                    "{driver} hit a tire cliff on lap {} ({}), {:.1}s off the stint trend",
                    cliff.lap, stint.compound, cliff.residual
                ),
            ));
        }

        if result.clean_laps.len() < MIN_LAPS_FOR_INSIGHT {
            continue;
        }

        if trend.slope > t.high_degradation {
            insights.push(Insight::new(
                InsightKind::Degradation,
                2,
                format!(
                    "{driver} experienced high degradation on {}: {:.2}s/lap (stint {})",
                    stint.compound, trend.slope, stint.number
                ),
            ));
        } else if trend.slope < t.low_degradation && stint.lap_count() >= t.low_degradation_min_laps {
            insights.push(Insight::new(
                InsightKind::Degradation,
                2,
                format!(
                    "{driver} showed excellent tire management on {}: only {:.2}s/lap over {} laps",
                    stint.compound,
                    trend.slope,
                    stint.lap_count()
                ),
            ));
        }
    }

    insights
}

fn pace_insights(laps: &DriverLaps, t: &InsightThresholds) -> Vec<Insight> {
    let mut insights = Vec::new();
    let clean: Vec<_> = laps.clean_laps().collect();

    let fastest = clean
        .iter()
        .filter_map(|lap| lap.lap_time.map(|time| (*lap, time)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    let Some((fastest_lap, fastest_time)) = fastest else {
        return insights;
    };

    insights.push(Insight::new(
        InsightKind::Pace,
        1,
        format!(
            "{}'s fastest lap was {} on lap {} ({})",
            laps.driver,
            format_lap_time(Some(fastest_time)),
            fastest_lap.lap_number,
            fastest_lap.compound
        ),
    ));

    let times: Vec<f64> = clean.iter().filter_map(|lap| lap.lap_time).collect();
    if let Some(std) = sample_std(&times) {
        if std < t.consistent_std {
            insights.push(Insight::new(
                InsightKind::Pace,
                2,
                format!(
                    "{} showed excellent consistency with only {:.3}s standard deviation across clean laps",
                    laps.driver, std
                ),
            ));
        } else if std > t.variable_std {
            insights.push(Insight::new(
                InsightKind::Pace,
                1,
                format!(
                    "{} had variable pace with {:.3}s standard deviation (possible traffic or tire issues)",
                    laps.driver, std
                ),
            ));
        }
    }

    insights
}

fn comparison_insights(comparison: &PaceComparison, t: &InsightThresholds) -> Vec<Insight> {
    let mut insights = Vec::new();
    let (faster_a, faster_b) = (comparison.faster_laps_a(), comparison.faster_laps_b());
    let decided = faster_a + faster_b;
    if decided == 0 {
        return insights;
    }

    insights.push(Insight::new(
        InsightKind::Comparison,
        3,
        format!(
            "{} won {} of {} comparable laps vs {} ({} laps)",
            comparison.driver_a, faster_a, decided, comparison.driver_b, faster_b
        ),
    ));

    if let Some(mean) = comparison.mean_delta {
        if mean.abs() >= t.pace_gap {
            let faster = if mean < 0.0 { &comparison.driver_a } else { &comparison.driver_b };
            insights.push(Insight::new(
                InsightKind::Comparison,
                2,
                format!("{faster} was {:.3}s faster on average per lap", mean.abs()),
            ));
        }
    }

    insights
}

fn fastest_lap_insight(summary: &HeadToHead) -> Option<Insight> {
    let delta = summary.fastest_lap_delta?;
    Some(Insight::new(
        InsightKind::Comparison,
        1,
        format!(
            "{}'s fastest lap was {}s vs {}'s",
            summary.driver_a,
            format_delta(Some(delta)),
            summary.driver_b
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{driver_laps, lap, laps_on};
    use crate::types::Compound;

    fn two_stop_race() -> DriverLaps {
        let mut laps = laps_on("VER", 1..=10, Compound::Soft, 90.0, 0.2);
        laps.extend(laps_on("VER", 11..=40, Compound::Hard, 89.0, 0.01));
        laps[9] = laps[9].clone().into_pit(Some(900.0));
        laps[10] = laps[10].clone().out_of_pit(Some(921.0));
        for (index, lap) in laps.iter_mut().enumerate() {
            lap.position = Some(if index < 10 { 5 } else { 2 });
        }
        DriverLaps::new("VER", laps)
    }

    #[test]
    fn report_contains_stints_and_degradation_per_stint() {
        let report = StrategyReport::build(&two_stop_race(), None, &AnalysisConfig::default()).unwrap();

        assert_eq!(report.stints.len(), 2);
        assert_eq!(report.degradation.len(), 2);
        assert_eq!(report.pit_stops.len(), 1);
        assert!(report.comparison.is_none());
        assert!(report.insights.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn report_flags_degradation_swing_and_long_stint() {
        let report = StrategyReport::build(&two_stop_race(), None, &AnalysisConfig::default()).unwrap();
        let messages: Vec<&str> = report.insights.iter().map(|i| i.message.as_str()).collect();

        assert!(messages.iter().any(|m| m.contains("high degradation on SOFT")));
        assert!(messages.iter().any(|m| m.contains("excellent tire management on HARD")));
        assert!(messages.iter().any(|m| m.contains("gained 3 positions")));
        assert!(messages.iter().any(|m| m.contains("longest stint was 30 laps on HARD")));
        assert_eq!(report.insights[0].importance, 3);
    }

    #[test]
    fn report_with_rival_includes_comparison() {
        let a = driver_laps("NOR", &[90.0, 90.1, 90.2, 90.3, 90.4]);
        let b = driver_laps("PIA", &[90.3, 90.4, 90.5, 90.6, 90.7]);

        let report = StrategyReport::build(&a, Some(&b), &AnalysisConfig::default()).unwrap();
        assert_eq!(report.comparison.as_ref().map(|c| c.laps_compared()), Some(5));
        assert!(report.head_to_head.is_some());

        let comparison: Vec<_> = report.insights_of(InsightKind::Comparison).collect();
        assert_eq!(comparison.len(), 3);
        assert_eq!(comparison[0].message, "NOR won 5 of 5 comparable laps vs PIA (0 laps)");
        assert_eq!(comparison[1].message, "NOR was 0.300s faster on average per lap");
        assert_eq!(comparison[2].message, "NOR's fastest lap was -0.300s vs PIA's");
    }

    #[test]
    fn no_stop_race_is_reported() {
        let laps = driver_laps("HUL", &[95.0, 95.1, 95.0]);
        let report = StrategyReport::build(&laps, None, &AnalysisConfig::default()).unwrap();

        assert!(report
            .insights_of(InsightKind::Strategy)
            .any(|i| i.message == "HUL completed the session without pitting"));
        assert!(report
            .insights_of(InsightKind::Pace)
            .any(|i| i.message == "HUL's fastest lap was 1:35.000 on lap 1 (MEDIUM)"));
    }

    #[test]
    fn retirement_gap_bounds_every_stage() {
        let mut laps: Vec<_> = [1, 2, 3, 6, 7]
            .into_iter()
            .map(|n| lap("NOR", n, if n < 6 { 91.0 } else { 85.0 }, Compound::Medium))
            .collect();
        laps[4] = laps[4].clone().into_pit(Some(700.0));
        let nor = DriverLaps::new("NOR", laps);
        let ver = driver_laps("VER", &[91.2; 7]);

        let report = StrategyReport::build(&nor, Some(&ver), &AnalysisConfig::default()).unwrap();
        assert_eq!(report.stints.iter().map(|s| s.end_lap).collect::<Vec<_>>(), vec![3]);
        assert!(report.pit_stops.is_empty());
        let compared: Vec<u32> = report.comparison.as_ref().unwrap().lap_numbers().collect();
        assert_eq!(compared, vec![1, 2, 3]);
        assert!(report
            .insights_of(InsightKind::Pace)
            .any(|i| i.message == "NOR's fastest lap was 1:31.000 on lap 1 (MEDIUM)"));
        assert!(report.insights.iter().all(|i| !i.message.contains("1:25.000")));
    }

    #[test]
    fn out_of_order_laps_fail_the_report() {
        let mut laps = driver_laps("SAR", &[95.0, 95.1, 95.2]);
        laps.laps.swap(0, 2);

        assert!(StrategyReport::build(&laps, None, &AnalysisConfig::default()).is_err());
    }
}
