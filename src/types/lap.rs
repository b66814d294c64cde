//! Per-lap timing records

use serde::{Deserialize, Serialize};

use super::{Compound, TrackStatus};
use crate::analysis::contiguous_prefix;

/// One timed lap of one driver, as delivered by the ingestion adapter.
///
/// Durations are in seconds. `None` marks a measurement the timing feed did
/// not provide; it is excluded where it is used rather than treated as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LapRecord {
    /// Driver identifier (usually the three letter abbreviation)
    pub driver: String,
    /// 1-based lap number
    pub lap_number: u32,
    /// Lap time, `None` for an incomplete lap
    pub lap_time: Option<f64>,
    /// Tire compound fitted for the lap
    pub compound: Compound,
    /// Tire age in laps at the start of this lap
    pub tire_age: u32,
    /// Sector 1-3 times
    pub sectors: [Option<f64>; 3],
    /// Most severe track status during the lap
    pub track_status: TrackStatus,
    /// Lap ended in the pit lane
    pub in_lap: bool,
    /// Lap started from the pit lane
    pub out_lap: bool,
    /// Running position at the end of the lap
    pub position: Option<u32>,
    /// Session time at pit lane entry
    pub pit_in_time: Option<f64>,
    /// Session time at pit lane exit
    pub pit_out_time: Option<f64>,
}

impl LapRecord {
    /// Create a lap under clear track conditions with no pit activity.
    pub fn new(
        driver: impl Into<String>,
        lap_number: u32,
        lap_time: Option<f64>,
        compound: Compound,
    ) -> Self {
        Self {
            driver: driver.into(),
            lap_number,
            lap_time,
            compound,
            tire_age: 0,
            sectors: [None; 3],
            track_status: TrackStatus::Clear,
            in_lap: false,
            out_lap: false,
            position: None,
            pit_in_time: None,
            pit_out_time: None,
        }
    }

    pub fn with_tire_age(mut self, tire_age: u32) -> Self {
        self.tire_age = tire_age;
        self
    }

    pub fn with_sectors(mut self, sectors: [Option<f64>; 3]) -> Self {
        self.sectors = sectors;
        self
    }

    pub fn with_track_status(mut self, track_status: TrackStatus) -> Self {
        self.track_status = track_status;
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Mark the lap as ending in the pit lane, entering at `entry` session time.
    pub fn into_pit(mut self, entry: Option<f64>) -> Self {
        self.in_lap = true;
        self.pit_in_time = entry;
        self
    }

    /// Mark the lap as starting from the pit lane, leaving at `exit` session time.
    pub fn out_of_pit(mut self, exit: Option<f64>) -> Self {
        self.out_lap = true;
        self.pit_out_time = exit;
        self
    }

    /// Whether the lap involved the pit lane at either end.
    pub fn is_pit_lap(&self) -> bool {
        self.in_lap || self.out_lap
    }

    /// Whether the lap is representative of pace.
    ///
    /// A clean lap was run under clear track status, is neither an in-lap nor
    /// an out-lap, and has a finite lap time.
    pub fn is_clean(&self) -> bool {
        self.track_status.is_clear() && !self.is_pit_lap() && self.lap_time.is_some_and(f64::is_finite)
    }
}

/// All laps of a single driver, in the order the source delivered them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DriverLaps {
    pub driver: String,
    pub laps: Vec<LapRecord>,
}

impl DriverLaps {
    pub fn new(driver: impl Into<String>, laps: Vec<LapRecord>) -> Self {
        Self { driver: driver.into(), laps }
    }

    /// Laps before the first gap in lap numbers, which marks a retirement.
    pub fn running_laps(&self) -> &[LapRecord] {
        contiguous_prefix(&self.laps)
    }

    /// Iterate over the running laps usable for pace analysis.
    pub fn clean_laps(&self) -> impl Iterator<Item = &LapRecord> {
        self.running_laps().iter().filter(|lap| lap.is_clean())
    }

    /// Last reported running position.
    pub fn final_position(&self) -> Option<u32> {
        self.running_laps().iter().rev().find_map(|lap| lap.position)
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_lap_requires_clear_status_time_and_no_pit() {
        let lap = LapRecord::new("VER", 3, Some(91.2), Compound::Soft);
        assert!(lap.is_clean());

        assert!(!lap.clone().with_track_status(TrackStatus::Yellow).is_clean());
        assert!(!lap.clone().into_pit(None).is_clean());
        assert!(!lap.clone().out_of_pit(None).is_clean());
        assert!(!LapRecord::new("VER", 3, None, Compound::Soft).is_clean());
        assert!(!LapRecord::new("VER", 3, Some(f64::NAN), Compound::Soft).is_clean());
        assert!(!LapRecord::new("VER", 3, Some(f64::INFINITY), Compound::Soft).is_clean());
    }

    #[test]
    fn final_position_skips_unreported_laps() {
        let laps = DriverLaps::new(
            "LEC",
            vec![
                LapRecord::new("LEC", 1, Some(95.0), Compound::Medium).with_position(4),
                LapRecord::new("LEC", 2, Some(94.0), Compound::Medium).with_position(3),
                LapRecord::new("LEC", 3, None, Compound::Medium),
            ],
        );

        assert_eq!(laps.final_position(), Some(3));
        assert_eq!(laps.clean_laps().count(), 2);
    }

    #[test]
    fn laps_after_a_gap_are_not_running() {
        let laps = DriverLaps::new(
            "NOR",
            vec![
                LapRecord::new("NOR", 1, Some(91.0), Compound::Soft).with_position(5),
                LapRecord::new("NOR", 2, Some(91.1), Compound::Soft).with_position(6),
                LapRecord::new("NOR", 5, Some(85.0), Compound::Soft).with_position(1),
            ],
        );

        assert_eq!(laps.running_laps().len(), 2);
        assert_eq!(laps.clean_laps().count(), 2);
        assert_eq!(laps.final_position(), Some(6));
    }
}
