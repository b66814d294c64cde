//! Test utilities for building lap fixtures and locating test data
//!
//! Shared by unit tests, integration tests and the benchmarks (behind the
//! `benchmark` feature).

#![cfg(any(test, feature = "benchmark"))]

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::types::{Compound, DriverLaps, LapRecord, Stint};

/// Error returned when a required fixture file cannot be located.
#[derive(Debug, Clone)]
pub struct FixtureError {
    message: String,
}

impl FixtureError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FixtureError {}

/// Directory holding the YAML session fixtures.
pub fn test_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

/// Resolve a fixture under `test-data/`, failing if it does not exist.
pub fn require_fixture(name: &str) -> Result<PathBuf, FixtureError> {
    let path = test_data_dir().join(name);
    if path.exists() {
        Ok(path)
    } else {
        Err(FixtureError::new(format!("Missing session fixture: {}", path.display())))
    }
}

/// A clean lap with only a lap time and compound.
pub fn lap(driver: &str, lap_number: u32, time: f64, compound: Compound) -> LapRecord {
    LapRecord::new(driver, lap_number, Some(time), compound)
}

/// Clean laps over `laps` whose time grows by `step` per lap from `base`.
///
/// Tire age starts at 1 on the first lap of the range.
pub fn laps_on(
    driver: &str,
    laps: RangeInclusive<u32>,
    compound: Compound,
    base: f64,
    step: f64,
) -> Vec<LapRecord> {
    laps.enumerate()
        .map(|(index, n)| {
            lap(driver, n, base + step * index as f64, compound.clone()).with_tire_age(index as u32 + 1)
        })
        .collect()
}

/// A single clean stint starting at lap 1 with the given lap times.
pub fn stint_from_times(driver: &str, compound: Compound, times: &[f64]) -> Stint {
    let laps: Vec<LapRecord> = times
        .iter()
        .enumerate()
        .map(|(index, time)| {
            lap(driver, index as u32 + 1, *time, compound.clone()).with_tire_age(index as u32 + 1)
        })
        .collect();

    Stint {
        driver: driver.to_string(),
        number: 1,
        compound,
        start_lap: 1,
        end_lap: times.len().max(1) as u32,
        start_tire_age: 1,
        laps,
    }
}

/// Clean Medium laps numbered from 1 with the given lap times.
pub fn driver_laps(driver: &str, times: &[f64]) -> DriverLaps {
    let laps = times
        .iter()
        .enumerate()
        .map(|(index, time)| lap(driver, index as u32 + 1, *time, Compound::Medium))
        .collect();
    DriverLaps::new(driver, laps)
}

/// A synthetic race of `laps` laps with a stop every `stint_length` laps.
///
/// Used by the benchmarks to produce realistic sized inputs.
pub fn synthetic_race(driver: &str, laps: u32, stint_length: u32) -> DriverLaps {
    let compounds = [Compound::Medium, Compound::Hard, Compound::Soft];
    let stint_length = stint_length.max(2);
    let mut records = Vec::with_capacity(laps as usize);

    for n in 1..=laps {
        let stint = (n - 1) / stint_length;
        let age = (n - 1) % stint_length + 1;
        let compound = compounds[stint as usize % compounds.len()].clone();
        let time = 90.0 + 0.08 * age as f64 + 0.03 * ((n * 7) % 5) as f64;

        let mut record = lap(driver, n, time, compound).with_tire_age(age).with_position(1 + n % 3);
        if age == stint_length && n < laps {
            record = record.into_pit(Some(n as f64 * 90.0));
        }
        if age == 1 && n > 1 {
            record = record.out_of_pit(Some((n - 1) as f64 * 90.0 + 22.0));
        }
        records.push(record);
    }

    DriverLaps::new(driver, records)
}
