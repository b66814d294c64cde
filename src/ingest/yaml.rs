//! YAML lap table source
//!
//! Reads a lap table with the column names used by common F1 timing exports:
//!
//! ```yaml
//! Session: 2024 Bahrain Grand Prix - Race
//! Laps:
//!   - Driver: VER
//!     LapNumber: 1
//!     LapTime: 97.284
//!     Compound: SOFT
//!     TyreLife: 1
//!     Sector1Time: 31.2
//!     Sector2Time: 42.1
//!     Sector3Time: 23.984
//!     TrackStatus: "1"
//!     PitInTime: null
//!     PitOutTime: null
//!     Position: 1
//! ```
//!
//! Durations are seconds. A missing column or `null` is an undefined value.
//! A row with a `PitInTime` is an in-lap, one with a `PitOutTime` an out-lap.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, trace, warn};

use super::LapSource;
use crate::types::{Compound, LapRecord, TrackStatus};
use crate::{Result, StrategyError};

/// Track status as exported: either a digit string or a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusCode {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawLap {
    driver: String,
    lap_number: f64,
    #[serde(default)]
    lap_time: Option<f64>,
    #[serde(default)]
    compound: Option<String>,
    #[serde(default)]
    tyre_life: Option<f64>,
    #[serde(default)]
    sector1_time: Option<f64>,
    #[serde(default)]
    sector2_time: Option<f64>,
    #[serde(default)]
    sector3_time: Option<f64>,
    #[serde(default)]
    track_status: Option<StatusCode>,
    #[serde(default)]
    pit_in_time: Option<f64>,
    #[serde(default)]
    pit_out_time: Option<f64>,
    #[serde(default)]
    position: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSession {
    #[serde(default)]
    session: Option<String>,
    laps: Vec<RawLap>,
}

/// Drop non-finite and negative durations.
fn duration(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// Whole, non-negative numbers, which exports often write as floats (`12.0`).
fn count(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64)
        .then_some(value as u32)
}

fn whole(value: f64) -> Option<u32> {
    count(value).filter(|n| *n >= 1)
}

impl RawLap {
    fn into_record(self, row: usize) -> Result<LapRecord> {
        let driver = self.driver.trim().to_string();
        if driver.is_empty() {
            return Err(StrategyError::parse_error(format!("lap table row {}", row), "Driver is empty"));
        }
        let lap_number = whole(self.lap_number).ok_or_else(|| {
            StrategyError::parse_error(
                format!("lap table row {}", row),
                format!("LapNumber must be a positive whole number, got {}", self.lap_number),
            )
        })?;

        let track_status = match &self.track_status {
            Some(StatusCode::Number(code)) => TrackStatus::from_code(Some(&code.to_string())),
            Some(StatusCode::Text(code)) => TrackStatus::from_code(Some(code)),
            None => TrackStatus::Unknown,
        };
        if track_status == TrackStatus::Unknown {
            trace!(driver = %driver, lap = lap_number, raw = ?self.track_status, "Unrecognized track status");
        }

        let lap_time = duration(self.lap_time);
        if self.lap_time.is_some() && lap_time.is_none() {
            warn!(driver = %driver, lap = lap_number, raw = ?self.lap_time, "Discarding invalid lap time");
        }

        let mut record = LapRecord::new(driver, lap_number, lap_time, Compound::from_label(self.compound.as_deref()))
            .with_tire_age(self.tyre_life.and_then(count).unwrap_or(0))
            .with_sectors([duration(self.sector1_time), duration(self.sector2_time), duration(self.sector3_time)])
            .with_track_status(track_status);

        if let Some(position) = self.position.and_then(whole) {
            record = record.with_position(position);
        }
        if self.pit_in_time.is_some() {
            record = record.into_pit(self.pit_in_time);
        }
        if self.pit_out_time.is_some() {
            record = record.out_of_pit(self.pit_out_time);
        }
        Ok(record)
    }
}

/// Lap source backed by a parsed YAML lap table.
#[derive(Debug, Clone)]
pub struct YamlLapSource {
    laps: std::vec::IntoIter<LapRecord>,
    session: Option<String>,
}

impl YamlLapSource {
    /// Parse a YAML lap table document.
    ///
    /// Every row is validated up front, so a malformed table fails here rather
    /// than partway through ingestion.
    pub fn parse(yaml: &str) -> Result<Self> {
        let raw: RawSession = serde_yaml_ng::from_str(yaml)
            .map_err(|e| StrategyError::parse_error("lap table deserialization", e.to_string()))?;

        let laps = raw
            .laps
            .into_iter()
            .enumerate()
            .map(|(row, lap)| lap.into_record(row))
            .collect::<Result<Vec<_>>>()?;

        debug!(session = ?raw.session, laps = laps.len(), "Parsed lap table");
        Ok(Self { laps: laps.into_iter(), session: raw.session })
    }

    /// Read and parse a YAML lap table file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| StrategyError::file_error(path.to_path_buf(), e))?;
        let source = Self::parse(&yaml)?;
        info!(path = %path.display(), laps = source.laps.len(), "Opened lap table");
        Ok(source)
    }
}

#[async_trait::async_trait]
impl LapSource for YamlLapSource {
    async fn next_lap(&mut self) -> Result<Option<LapRecord>> {
        Ok(self.laps.next())
    }

    fn session_name(&self) -> Option<&str> {
        self.session.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
Session: Test Race
Laps:
  - Driver: VER
    LapNumber: 1.0
    LapTime: 97.5
    Compound: soft
    TyreLife: 3.0
    Sector1Time: 31.0
    Sector2Time: null
    Sector3Time: 24.0
    TrackStatus: "1"
    Position: 1
  - Driver: VER
    LapNumber: 2
    LapTime: 110.2
    Compound: SOFT
    TyreLife: 4
    TrackStatus: 24
    PitInTime: 3611.5
  - Driver: VER
    LapNumber: 3
    LapTime: null
    Compound: HARD
    TyreLife: 1
    TrackStatus: 1
    PitOutTime: 3633.0
"#;

    async fn drain(mut source: YamlLapSource) -> Vec<LapRecord> {
        let mut laps = Vec::new();
        while let Some(lap) = source.next_lap().await.unwrap() {
            laps.push(lap);
        }
        laps
    }

    #[tokio::test]
    async fn rows_are_normalized() {
        let source = YamlLapSource::parse(TABLE).unwrap();
        assert_eq!(source.session_name(), Some("Test Race"));

        let laps = drain(source).await;
        assert_eq!(laps.len(), 3);

        assert_eq!(laps[0].compound, Compound::Soft);
        assert_eq!(laps[0].tire_age, 3);
        assert_eq!(laps[0].sectors, [Some(31.0), None, Some(24.0)]);
        assert_eq!(laps[0].position, Some(1));
        assert!(laps[0].is_clean());

        assert_eq!(laps[1].track_status, TrackStatus::SafetyCar);
        assert!(laps[1].in_lap);
        assert_eq!(laps[1].pit_in_time, Some(3611.5));

        assert_eq!(laps[2].compound, Compound::Hard);
        assert!(laps[2].out_lap);
        assert_eq!(laps[2].lap_time, None);
    }

    #[test]
    fn fractional_lap_number_is_rejected() {
        let err = YamlLapSource::parse("Laps:\n  - Driver: VER\n    LapNumber: 1.5\n").unwrap_err();
        assert!(matches!(err, StrategyError::Parse { .. }));
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn missing_laps_key_is_a_parse_error() {
        let err = YamlLapSource::parse("Session: Empty\n").unwrap_err();
        assert!(matches!(err, StrategyError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let err = YamlLapSource::open("/nonexistent/laps.yml").unwrap_err();
        assert!(matches!(err, StrategyError::File { .. }));
    }
}
