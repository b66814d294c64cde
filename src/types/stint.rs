//! Tire stint representation

use serde::{Deserialize, Serialize};

use super::{Compound, LapRecord};

/// Contiguous run of laps by one driver on one set of tires.
///
/// Built by [`segment`](crate::analysis::segment) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Stint {
    pub driver: String,
    /// 1-based stint number within the driver's session
    pub number: u32,
    pub compound: Compound,
    pub start_lap: u32,
    /// Inclusive
    pub end_lap: u32,
    /// Tire age reported on the first lap of the stint
    pub start_tire_age: u32,
    pub laps: Vec<LapRecord>,
}

impl Stint {
    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }

    /// Whether `lap_number` falls inside the stint.
    pub fn contains(&self, lap_number: u32) -> bool {
        (self.start_lap..=self.end_lap).contains(&lap_number)
    }

    /// Tire age expected at the start of `lap_number` if the set is run continuously.
    pub fn expected_tire_age(&self, lap_number: u32) -> Option<u32> {
        self.contains(lap_number).then(|| self.start_tire_age + (lap_number - self.start_lap))
    }

    /// Mean lap time over laps with a time that did not touch the pit lane.
    pub fn average_lap_time(&self) -> Option<f64> {
        let times: Vec<f64> =
            self.laps.iter().filter(|lap| !lap.is_pit_lap()).filter_map(|lap| lap.lap_time).collect();

        if times.is_empty() { None } else { Some(times.iter().sum::<f64>() / times.len() as f64) }
    }

    pub fn start_position(&self) -> Option<u32> {
        self.laps.first().and_then(|lap| lap.position)
    }

    pub fn end_position(&self) -> Option<u32> {
        self.laps.last().and_then(|lap| lap.position)
    }

    /// Positions lost over the stint (negative when positions were gained).
    pub fn position_change(&self) -> Option<i64> {
        match (self.start_position(), self.end_position()) {
            (Some(start), Some(end)) => Some(end as i64 - start as i64),
            _ => None,
        }
    }

    /// Lightweight reference used by derived results.
    pub fn reference(&self) -> StintRef {
        StintRef {
            driver: self.driver.clone(),
            number: self.number,
            compound: self.compound.clone(),
            start_lap: self.start_lap,
            end_lap: self.end_lap,
        }
    }
}

/// Identifies the stint a derived result was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct StintRef {
    pub driver: String,
    pub number: u32,
    pub compound: Compound,
    pub start_lap: u32,
    pub end_lap: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stint() -> Stint {
        let laps = (5..=8)
            .map(|n| {
                LapRecord::new("NOR", n, Some(90.0 + n as f64 * 0.1), Compound::Hard)
                    .with_tire_age(2 + n - 5)
                    .with_position(10 - n)
            })
            .collect();

        Stint {
            driver: "NOR".to_string(),
            number: 2,
            compound: Compound::Hard,
            start_lap: 5,
            end_lap: 8,
            start_tire_age: 2,
            laps,
        }
    }

    #[test]
    fn expected_tire_age_counts_from_start() {
        let stint = stint();
        assert_eq!(stint.expected_tire_age(5), Some(2));
        assert_eq!(stint.expected_tire_age(8), Some(5));
        assert_eq!(stint.expected_tire_age(9), None);
    }

    #[test]
    fn average_excludes_pit_laps() {
        let mut stint = stint();
        stint.laps[3] = stint.laps[3].clone().into_pit(None);

        let avg = stint.average_lap_time().unwrap();
        assert!((avg - 90.6).abs() < 1e-9);
    }

    #[test]
    fn position_change_is_end_minus_start() {
        assert_eq!(stint().position_change(), Some(-3));
    }
}
