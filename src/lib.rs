//! Tire stint, degradation and pace analysis for motorsport lap timing data.
//!
//! Undercut turns a session's per-lap timing records into the numbers a
//! strategy engineer reads off the pit wall: where each stint started and
//! ended, how fast the tires fell away, where they fell off a cliff, and how
//! two drivers' pace compared lap by lap.
//!
//! # Features
//!
//! - **Stint segmentation**: contiguous same-compound runs split at pit stops
//! - **Degradation**: least-squares pace trend per stint with cliff detection
//! - **Pace comparison**: lap and sector deltas over mutually clean laps
//! - **Session runner**: every driver analyzed in parallel on the blocking pool
//!
//! ## Example (YAML lap table)
//!
//! ```rust,no_run
//! use undercut::{AnalysisConfig, Undercut};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> undercut::Result<()> {
//!     let session = Undercut::open("race_laps.yml").await?;
//!     let analysis = Undercut::analyze(&session, AnalysisConfig::default()).await?;
//!
//!     for report in analysis.reports() {
//!         for insight in &report.insights {
//!             println!("[{}] {}", report.driver, insight.message);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod format;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Analysis stages
pub mod analysis;
pub mod cache;
pub mod insights;

// Ingestion and session-level driving
pub mod ingest;
pub mod runner;

// Core exports
pub use config::{AnalysisConfig, InsightThresholds};
pub use error::*;
pub use types::*;

// Main API exports
pub use cache::DegradationCache;
pub use ingest::{LapSource, MemoryLapSource, SessionLaps, YamlLapSource};
pub use insights::{Insight, InsightKind, StrategyReport};
pub use runner::{DriverFinishedCallback, SessionAnalysis, SessionRunner};

/// Unified entry point for loading and analyzing a session.
///
/// # Examples
///
/// ```rust,no_run
/// use undercut::Undercut;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> undercut::Result<()> {
/// let session = Undercut::open("race_laps.yml").await?;
/// println!("{} drivers", session.drivers.len());
/// # Ok(())
/// # }
/// ```
pub struct Undercut;

impl Undercut {
    /// Load every lap of a YAML lap table, grouped by driver.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist or is not readable
    /// - Document is not a valid lap table
    pub async fn open<P: AsRef<std::path::Path>>(path: P) -> Result<SessionLaps> {
        SessionLaps::collect(YamlLapSource::open(path)?).await
    }

    /// Analyze every driver of a session with `config`.
    ///
    /// # Errors
    ///
    /// Returns an error only if `config` is invalid. Per-driver failures are
    /// reported inside the returned [`SessionAnalysis`].
    pub async fn analyze(session: &SessionLaps, config: AnalysisConfig) -> Result<SessionAnalysis> {
        Ok(SessionRunner::new(config)?.run(session).await)
    }
}
