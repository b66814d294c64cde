//! Stint segmentation and pit stop extraction

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::types::{Compound, LapRecord, Stint};
use crate::{Result, StrategyError};

/// Partition one driver's laps into contiguous stints.
///
/// A new stint starts whenever the compound changes, or on an out-lap even
/// when the compound label stays the same (a fresh set of the same compound).
/// [`Compound::Unknown`] takes part in change detection like any other
/// compound.
///
/// Lap numbers must strictly increase; a repeated or decreasing lap number is
/// a [`StrategyError::DataIntegrity`] error. A forward gap in lap numbers marks
/// a retirement, and laps from the gap onward are ignored.
pub fn segment(laps: &[LapRecord]) -> Result<Vec<Stint>> {
    let Some(first) = laps.first() else {
        return Ok(Vec::new());
    };

    for pair in laps.windows(2) {
        let (previous, lap) = (&pair[0], &pair[1]);
        if lap.lap_number <= previous.lap_number {
            return Err(StrategyError::data_integrity(
                &first.driver,
                lap.lap_number,
                previous.lap_number,
            ));
        }
    }

    let running = contiguous_prefix(laps);
    if let Some(last) = running.last().filter(|_| running.len() < laps.len()) {
        warn!(
            driver = %first.driver,
            last_lap = last.lap_number,
            dropped = laps.len() - running.len(),
            "Lap sequence has a gap, treating it as a retirement"
        );
    }

    let mut stints = Vec::new();
    let mut current: Vec<LapRecord> = Vec::new();

    for lap in running {
        let starts_new = current
            .first()
            .is_some_and(|head| lap.compound != head.compound || lap.out_lap);

        if starts_new {
            trace!(
                driver = %lap.driver,
                lap = lap.lap_number,
                compound = %lap.compound,
                out_lap = lap.out_lap,
                "Stint boundary"
            );
            stints.extend(close_stint(stints.len() as u32 + 1, std::mem::take(&mut current)));
        }
        current.push(lap.clone());
    }
    stints.extend(close_stint(stints.len() as u32 + 1, current));

    debug!(driver = %first.driver, laps = running.len(), stints = stints.len(), "Segmented stints");
    Ok(stints)
}

/// Laps up to the first break in consecutive lap numbers.
///
/// Anything after the break follows a retirement and takes no part in
/// analysis.
pub fn contiguous_prefix(laps: &[LapRecord]) -> &[LapRecord] {
    let end = laps
        .windows(2)
        .position(|pair| pair[1].lap_number != pair[0].lap_number + 1)
        .map_or(laps.len(), |index| index + 1);
    &laps[..end]
}

fn close_stint(number: u32, laps: Vec<LapRecord>) -> Option<Stint> {
    let (first, last) = (laps.first()?, laps.last()?);
    Some(Stint {
        driver: first.driver.clone(),
        number,
        compound: first.compound.clone(),
        start_lap: first.lap_number,
        end_lap: last.lap_number,
        start_tire_age: first.tire_age,
        laps,
    })
}

/// A visit to the pit lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct PitStop {
    pub driver: String,
    /// Lap that ended in the pit lane
    pub in_lap: u32,
    /// Next lap that started from the pit lane, if the driver rejoined
    pub out_lap: Option<u32>,
    /// Pit lane time in seconds, when both timestamps are known
    pub duration: Option<f64>,
}

/// Pair every in-lap with the next out-lap that follows it.
pub fn pit_stops(laps: &[LapRecord]) -> Vec<PitStop> {
    laps.iter()
        .enumerate()
        .filter(|(_, lap)| lap.in_lap)
        .map(|(index, lap)| {
            let out = laps[index + 1..].iter().find(|next| next.out_lap);
            let duration = match (lap.pit_in_time, out.and_then(|o| o.pit_out_time)) {
                (Some(entry), Some(exit)) => Some(exit - entry),
                _ => None,
            };
            PitStop {
                driver: lap.driver.clone(),
                in_lap: lap.lap_number,
                out_lap: out.map(|o| o.lap_number),
                duration,
            }
        })
        .collect()
}

/// Total pit lane time over stops with a known duration.
pub fn total_pit_time(laps: &[LapRecord]) -> f64 {
    pit_stops(laps).iter().filter_map(|stop| stop.duration).sum()
}

/// One side of a [`StintMatchup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct StintSummary {
    pub compound: Compound,
    pub laps: usize,
}

/// The n-th stint of two drivers side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct StintMatchup {
    pub number: u32,
    pub a: Option<StintSummary>,
    pub b: Option<StintSummary>,
    pub compound_match: bool,
}

/// Line up two drivers' stints by stint number.
pub fn compare_stints(a: &[Stint], b: &[Stint]) -> Vec<StintMatchup> {
    let summary = |stint: &Stint| StintSummary { compound: stint.compound.clone(), laps: stint.lap_count() };

    (0..a.len().max(b.len()))
        .map(|index| {
            let a = a.get(index).map(summary);
            let b = b.get(index).map(summary);
            let compound_match = matches!((&a, &b), (Some(x), Some(y)) if x.compound == y.compound);
            StintMatchup { number: index as u32 + 1, a, b, compound_match }
        })
        .collect()
}
