//! Sector time summaries and sector-by-sector comparison

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::comparison::PaceComparison;
use super::stats::{mean, sample_std};
use crate::types::{Compound, DriverLaps};

/// Statistics for one sector over a driver's clean laps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SectorSummary {
    /// 1-based sector number
    pub sector: u8,
    pub best: f64,
    pub mean: f64,
    pub worst: f64,
    /// Sample standard deviation, 0 for a single time
    pub std_dev: f64,
    pub best_lap: u32,
}

/// Summarize each sector that has at least one recorded time on a clean lap.
pub fn sector_summary(laps: &DriverLaps) -> Vec<SectorSummary> {
    (0..3)
        .filter_map(|s| {
            let times: Vec<(u32, f64)> = laps
                .clean_laps()
                .filter_map(|lap| lap.sectors[s].map(|time| (lap.lap_number, time)))
                .collect();
            let (best_lap, best) = times.iter().copied().min_by(|x, y| x.1.total_cmp(&y.1))?;
            let values: Vec<f64> = times.iter().map(|(_, time)| *time).collect();

            Some(SectorSummary {
                sector: s as u8 + 1,
                best,
                mean: mean(&values)?,
                worst: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                std_dev: sample_std(&values).unwrap_or(0.0),
                best_lap,
            })
        })
        .collect()
}

/// How one sector compared across the aligned laps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SectorDelta {
    pub sector: u8,
    /// Mean of A minus B
    pub mean_delta: f64,
    pub faster_count_a: usize,
    pub faster_count_b: usize,
    pub laps_compared: usize,
}

/// Which driver gains time where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SectorBreakdown {
    pub driver_a: String,
    pub driver_b: String,
    pub sectors: Vec<SectorDelta>,
    pub advantage_a: Vec<u8>,
    pub advantage_b: Vec<u8>,
    /// Human-readable summary of the sector advantages
    pub summary: String,
}

/// Find the sectors where each driver gains time on average.
///
/// A sector counts as an advantage when its mean delta is farther than
/// `threshold` seconds from zero.
pub fn weak_sectors(comparison: &PaceComparison, threshold: f64) -> SectorBreakdown {
    let sectors: Vec<SectorDelta> = (0..3)
        .filter_map(|s| {
            let deltas: Vec<f64> = comparison.deltas.iter().filter_map(|d| d.sector_deltas[s]).collect();
            Some(SectorDelta {
                sector: s as u8 + 1,
                mean_delta: mean(&deltas)?,
                faster_count_a: deltas.iter().filter(|d| **d < 0.0).count(),
                faster_count_b: deltas.iter().filter(|d| **d > 0.0).count(),
                laps_compared: deltas.len(),
            })
        })
        .collect();

    let advantage_a = sectors.iter().filter(|s| s.mean_delta < -threshold).map(|s| s.sector).collect();
    let advantage_b = sectors.iter().filter(|s| s.mean_delta > threshold).map(|s| s.sector).collect();

    let summary = if sectors.is_empty() {
        "Insufficient data for sector comparison".to_string()
    } else {
        let parts: Vec<String> = sectors
            .iter()
            .filter(|s| s.mean_delta.abs() > threshold)
            .map(|s| {
                let faster = if s.mean_delta < 0.0 { &comparison.driver_a } else { &comparison.driver_b };
                format!("{} gains {:.3}s avg in Sector {}", faster, s.mean_delta.abs(), s.sector)
            })
            .collect();
        if parts.is_empty() { "Sectors evenly matched".to_string() } else { parts.join("; ") }
    };

    SectorBreakdown {
        driver_a: comparison.driver_a.clone(),
        driver_b: comparison.driver_b.clone(),
        sectors,
        advantage_a,
        advantage_b,
        summary,
    }
}

/// Mean sector deltas for the laps run on one of driver A's compounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CompoundSectorDelta {
    pub compound: Compound,
    pub mean_deltas: [Option<f64>; 3],
    pub laps: usize,
}

/// Group the aligned sector deltas by driver A's compound.
pub fn sector_delta_by_compound(comparison: &PaceComparison) -> Vec<CompoundSectorDelta> {
    let mut groups: BTreeMap<String, (Compound, Vec<[Option<f64>; 3]>)> = BTreeMap::new();
    for delta in &comparison.deltas {
        groups
            .entry(delta.compound_a.to_string())
            .or_insert_with(|| (delta.compound_a.clone(), Vec::new()))
            .1
            .push(delta.sector_deltas);
    }

    groups
        .into_values()
        .map(|(compound, rows)| {
            let mean_deltas = std::array::from_fn(|s| {
                let values: Vec<f64> = rows.iter().filter_map(|row| row[s]).collect();
                mean(&values)
            });
            CompoundSectorDelta { compound, mean_deltas, laps: rows.len() }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compare;
    use crate::test_utils::lap;
    use crate::types::LapRecord;

    fn with_sectors(driver: &str, rows: &[(Compound, [Option<f64>; 3])]) -> DriverLaps {
        let laps: Vec<LapRecord> = rows
            .iter()
            .enumerate()
            .map(|(i, (compound, sectors))| {
                let total = sectors.iter().flatten().sum::<f64>();
                lap(driver, i as u32 + 1, total, compound.clone()).with_sectors(*sectors)
            })
            .collect();
        DriverLaps::new(driver, laps)
    }

    #[test]
    fn summary_reports_best_lap_and_spread() {
        let laps = with_sectors(
            "VER",
            &[
                (Compound::Soft, [Some(30.2), Some(31.0), None]),
                (Compound::Soft, [Some(30.0), Some(31.2), None]),
                (Compound::Soft, [Some(30.4), Some(31.1), None]),
            ],
        );

        let summary = sector_summary(&laps);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].sector, 1);
        assert_eq!(summary[0].best_lap, 2);
        assert_eq!(summary[0].best, 30.0);
        assert_eq!(summary[0].worst, 30.4);
        assert!((summary[0].mean - 30.2).abs() < 1e-9);
        assert!((summary[0].std_dev - 0.2).abs() < 1e-9);
    }

    #[test]
    fn weak_sectors_split_advantages() {
        let a = with_sectors(
            "NOR",
            &[
                (Compound::Medium, [Some(30.0), Some(31.0), Some(29.0)]),
                (Compound::Hard, [Some(30.0), Some(31.0), Some(29.0)]),
            ],
        );
        let b = with_sectors(
            "PIA",
            &[
                (Compound::Medium, [Some(30.2), Some(30.9), Some(29.01)]),
                (Compound::Medium, [Some(30.2), Some(30.9), Some(29.01)]),
            ],
        );

        let breakdown = weak_sectors(&compare(&a, &b), 0.05);
        assert_eq!(breakdown.advantage_a, vec![1]);
        assert_eq!(breakdown.advantage_b, vec![2]);
        assert_eq!(breakdown.summary, "NOR gains 0.200s avg in Sector 1; PIA gains 0.100s avg in Sector 2");

        let by_compound = sector_delta_by_compound(&compare(&a, &b));
        assert_eq!(by_compound.len(), 2);
        assert!(by_compound.iter().all(|group| group.laps == 1));
    }

    #[test]
    fn no_sector_data_is_reported() {
        let a = with_sectors("ALO", &[(Compound::Hard, [None, None, None])]);
        let b = with_sectors("STR", &[(Compound::Hard, [None, None, None])]);

        let breakdown = weak_sectors(&compare(&a, &b), 0.05);
        assert!(breakdown.sectors.is_empty());
        assert_eq!(breakdown.summary, "Insufficient data for sector comparison");
    }
}
