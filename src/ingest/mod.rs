//! Lap data ingestion
//!
//! A [`LapSource`] yields normalized [`LapRecord`] rows one at a time, the
//! same shape whether they come from a YAML lap table ([`YamlLapSource`]) or
//! from memory ([`MemoryLapSource`]). [`SessionLaps::collect`] drains a source
//! and groups the rows per driver for analysis.
//!
//! ```rust
//! use undercut::ingest::{MemoryLapSource, SessionLaps};
//! use undercut::types::{Compound, LapRecord};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let source = MemoryLapSource::new(vec![
//!     LapRecord::new("VER", 1, Some(95.1), Compound::Medium),
//!     LapRecord::new("HAM", 1, Some(95.4), Compound::Hard),
//!     LapRecord::new("VER", 2, Some(94.8), Compound::Medium),
//! ]);
//!
//! let session = SessionLaps::collect(source).await?;
//! assert_eq!(session.driver_ids().collect::<Vec<_>>(), vec!["VER", "HAM"]);
//! assert_eq!(session.driver("VER").map(|d| d.laps.len()), Some(2));
//! # Ok::<(), undercut::StrategyError>(())
//! # }).unwrap();
//! ```

mod memory;
mod yaml;

pub use memory::MemoryLapSource;
pub use yaml::YamlLapSource;

use std::collections::HashMap;
use tracing::{debug, info};

use crate::Result;
use crate::types::{DriverLaps, LapRecord};

/// Trait for lap data sources
///
/// Sources deliver laps in the order the timing feed reported them. They do
/// not sort or validate ordering; that is the segmenter's job.
#[async_trait::async_trait]
pub trait LapSource: Send + 'static {
    /// Get the next lap
    ///
    /// Returns:
    /// - `Ok(Some(lap))` - Next lap available
    /// - `Ok(None)` - No more laps (normal termination)
    /// - `Err(e)` - The source data is malformed or unreadable
    async fn next_lap(&mut self) -> Result<Option<LapRecord>>;

    /// Human-readable session name, if the source carries one.
    fn session_name(&self) -> Option<&str> {
        None
    }
}

/// Every driver's laps from one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLaps {
    pub session: Option<String>,
    /// In the order each driver first appeared in the source
    pub drivers: Vec<DriverLaps>,
}

impl SessionLaps {
    /// Drain `source` and group its laps by driver.
    ///
    /// Laps keep their source order within each driver.
    pub async fn collect<S: LapSource>(mut source: S) -> Result<Self> {
        let session = source.session_name().map(str::to_string);
        let mut drivers: Vec<DriverLaps> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut total = 0usize;

        while let Some(lap) = source.next_lap().await? {
            total += 1;
            let slot = *index.entry(lap.driver.clone()).or_insert_with(|| {
                drivers.push(DriverLaps::new(lap.driver.clone(), Vec::new()));
                drivers.len() - 1
            });
            drivers[slot].laps.push(lap);
        }

        for driver in &drivers {
            debug!(driver = %driver.driver, laps = driver.laps.len(), "Collected driver laps");
        }
        info!(session = ?session, drivers = drivers.len(), laps = total, "Collected session laps");

        Ok(Self { session, drivers })
    }

    /// Laps of one driver.
    pub fn driver(&self, driver: &str) -> Option<&DriverLaps> {
        self.drivers.iter().find(|laps| laps.driver == driver)
    }

    pub fn driver_ids(&self) -> impl Iterator<Item = &str> {
        self.drivers.iter().map(|laps| laps.driver.as_str())
    }

    pub fn lap_count(&self) -> usize {
        self.drivers.iter().map(|laps| laps.laps.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}
