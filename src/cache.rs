//! Degradation result caching
//!
//! Analysis is cheap, but a live timing screen re-analyzes the same closed
//! stints on every refresh. [`DegradationCache`] memoizes results per stint
//! and recomputes only when the stint's clean laps changed. It is opt-in; the
//! plain [`DegradationAnalyzer`] never caches.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::{debug, trace};

use crate::analysis::{DegradationAnalyzer, DegradationResult};
use crate::config::AnalysisConfig;
use crate::types::{Stint, StintRef};

/// Cache entry with the fingerprint of the laps it was computed from
#[derive(Debug, Clone)]
struct CacheEntry {
    result: DegradationResult,
    fingerprint: u64,
}

impl CacheEntry {
    fn is_valid(&self, fingerprint: u64) -> bool {
        self.fingerprint == fingerprint
    }
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoizing wrapper around a [`DegradationAnalyzer`].
#[derive(Debug, Clone)]
pub struct DegradationCache {
    analyzer: DegradationAnalyzer,
    entries: HashMap<StintRef, CacheEntry>,
    stats: CacheStats,
}

impl Default for DegradationCache {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

/// Hash of everything the degradation fit reads from a stint.
fn fingerprint(stint: &Stint) -> u64 {
    let mut hasher = DefaultHasher::new();
    for lap in &stint.laps {
        lap.lap_number.hash(&mut hasher);
        lap.lap_time.map(f64::to_bits).hash(&mut hasher);
        lap.is_clean().hash(&mut hasher);
    }
    hasher.finish()
}

impl DegradationCache {
    /// Create an empty cache using the thresholds of `config`.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self { analyzer: DegradationAnalyzer::new(config), entries: HashMap::new(), stats: CacheStats::default() }
    }

    /// Return the cached result for `stint`, analyzing it on a miss.
    pub fn analyze(&mut self, stint: &Stint) -> DegradationResult {
        let key = stint.reference();
        let fingerprint = fingerprint(stint);

        if let Some(entry) = self.entries.get(&key) {
            if entry.is_valid(fingerprint) {
                self.stats.hits += 1;
                trace!(driver = %key.driver, stint = key.number, "Using cached degradation result");
                return entry.result.clone();
            }
        }

        self.stats.misses += 1;
        debug!(driver = %key.driver, stint = key.number, "Analyzing stint degradation");
        let result = self.analyzer.analyze(stint);
        self.entries.insert(key, CacheEntry { result: result.clone(), fingerprint });
        result
    }

    /// Drop the cached result for one stint.
    pub fn invalidate(&mut self, stint: &StintRef) -> bool {
        self.entries.remove(stint).is_some()
    }

    /// Drop every cached result of one driver.
    pub fn invalidate_driver(&mut self, driver: &str) {
        self.entries.retain(|key, _| key.driver != driver);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
