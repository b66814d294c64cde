//! Lap-by-lap pace comparison between two drivers
//!
//! Only laps that are clean for both drivers are compared. A lap where one
//! driver pitted or ran under a yellow would mix pit-stop cost or neutralised
//! running into the pace difference, so it is left out entirely rather than
//! matched against the other driver's nearest lap.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::stats::{mean, median};
use super::stint::total_pit_time;
use crate::types::{Compound, DriverLaps, LapRecord};

/// Deltas for one lap both drivers completed cleanly.
///
/// Deltas are driver A minus driver B, so a negative value means A was faster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LapDelta {
    pub lap_number: u32,
    pub time_a: f64,
    pub time_b: f64,
    pub delta: f64,
    /// `None` where either driver's sector time is missing
    pub sector_deltas: [Option<f64>; 3],
    pub compound_a: Compound,
    pub compound_b: Compound,
}

/// Aligned pace comparison of two drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct PaceComparison {
    pub driver_a: String,
    pub driver_b: String,
    /// Ordered by lap number
    pub deltas: Vec<LapDelta>,
    /// `None` when no lap could be compared
    pub mean_delta: Option<f64>,
    /// `None` when no lap could be compared
    pub median_delta: Option<f64>,
}

impl PaceComparison {
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn laps_compared(&self) -> usize {
        self.deltas.len()
    }

    /// Laps on which driver A was faster.
    pub fn faster_laps_a(&self) -> usize {
        self.deltas.iter().filter(|d| d.delta < 0.0).count()
    }

    /// Laps on which driver B was faster.
    pub fn faster_laps_b(&self) -> usize {
        self.deltas.iter().filter(|d| d.delta > 0.0).count()
    }

    pub fn equal_laps(&self) -> usize {
        self.deltas.iter().filter(|d| d.delta == 0.0).count()
    }

    /// Lap numbers in the comparison domain.
    pub fn lap_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.deltas.iter().map(|d| d.lap_number)
    }
}

/// Index a driver's running clean laps by lap number; the first occurrence wins.
fn clean_index(laps: &DriverLaps) -> BTreeMap<u32, &LapRecord> {
    let mut index = BTreeMap::new();
    for lap in laps.clean_laps() {
        index.entry(lap.lap_number).or_insert(lap);
    }
    index
}

fn sector_delta(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}

/// Compare two drivers lap by lap over the laps both completed cleanly.
pub fn compare(a: &DriverLaps, b: &DriverLaps) -> PaceComparison {
    let index_a = clean_index(a);
    let index_b = clean_index(b);

    let deltas: Vec<LapDelta> = index_a
        .iter()
        .filter_map(|(lap_number, lap_a)| {
            let lap_b = index_b.get(lap_number)?;
            let (time_a, time_b) = (lap_a.lap_time?, lap_b.lap_time?);
            Some(LapDelta {
                lap_number: *lap_number,
                time_a,
                time_b,
                delta: time_a - time_b,
                sector_deltas: std::array::from_fn(|s| sector_delta(lap_a.sectors[s], lap_b.sectors[s])),
                compound_a: lap_a.compound.clone(),
                compound_b: lap_b.compound.clone(),
            })
        })
        .collect();

    let totals: Vec<f64> = deltas.iter().map(|d| d.delta).collect();
    let comparison = PaceComparison {
        driver_a: a.driver.clone(),
        driver_b: b.driver.clone(),
        mean_delta: mean(&totals),
        median_delta: median(&totals),
        deltas,
    };

    debug!(
        driver_a = %comparison.driver_a,
        driver_b = %comparison.driver_b,
        laps = comparison.laps_compared(),
        mean_delta = ?comparison.mean_delta,
        "Compared driver pace"
    );
    comparison
}

/// Summary of a head-to-head between two drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct HeadToHead {
    pub driver_a: String,
    pub driver_b: String,
    pub position_a: Option<u32>,
    pub position_b: Option<u32>,
    pub faster_laps_a: usize,
    pub faster_laps_b: usize,
    pub equal_laps: usize,
    pub mean_delta: Option<f64>,
    pub median_delta: Option<f64>,
    /// Best clean lap of A minus best clean lap of B
    pub fastest_lap_delta: Option<f64>,
    /// Total pit lane time of A minus that of B
    pub pit_time_delta: f64,
}

fn fastest_clean_lap(laps: &DriverLaps) -> Option<f64> {
    laps.clean_laps().filter_map(|lap| lap.lap_time).min_by(f64::total_cmp)
}

/// Build a head-to-head summary from two drivers' laps.
pub fn head_to_head(a: &DriverLaps, b: &DriverLaps) -> HeadToHead {
    let comparison = compare(a, b);
    let fastest_lap_delta = match (fastest_clean_lap(a), fastest_clean_lap(b)) {
        (Some(best_a), Some(best_b)) => Some(best_a - best_b),
        _ => None,
    };

    HeadToHead {
        driver_a: comparison.driver_a.clone(),
        driver_b: comparison.driver_b.clone(),
        position_a: a.final_position(),
        position_b: b.final_position(),
        faster_laps_a: comparison.faster_laps_a(),
        faster_laps_b: comparison.faster_laps_b(),
        equal_laps: comparison.equal_laps(),
        mean_delta: comparison.mean_delta,
        median_delta: comparison.median_delta,
        fastest_lap_delta,
        pit_time_delta: total_pit_time(a.running_laps()) - total_pit_time(b.running_laps()),
    }
}
