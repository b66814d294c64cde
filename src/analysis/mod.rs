//! Stint segmentation, degradation fitting and pace comparison.
//!
//! Every function here is a pure function of its input laps. Nothing is
//! cached and nothing is shared, so independent drivers and stints can be
//! analyzed in any order or in parallel with identical results. See
//! [`crate::runner`] for the parallel session driver and [`crate::cache`] for
//! opt-in memoization.
//!
//! ```rust
//! use undercut::analysis::{DegradationAnalyzer, segment};
//! use undercut::types::{Compound, LapRecord};
//!
//! let laps: Vec<LapRecord> = (1..=8)
//!     .map(|n| LapRecord::new("VER", n, Some(91.0 + 0.1 * n as f64), Compound::Medium))
//!     .collect();
//!
//! let stints = segment(&laps)?;
//! let result = DegradationAnalyzer::default().analyze(&stints[0]);
//! assert!((result.slope().unwrap() - 0.1).abs() < 1e-9);
//! # Ok::<(), undercut::StrategyError>(())
//! ```

pub mod comparison;
pub mod degradation;
pub mod sectors;
pub mod stats;
pub mod stint;

pub use comparison::{HeadToHead, LapDelta, PaceComparison, compare, head_to_head};
pub use degradation::{
    Cliff, CliffDetection, DegradationAnalyzer, DegradationFit, DegradationResult, DegradationTrend,
    analyze,
};
pub use sectors::{
    CompoundSectorDelta, SectorBreakdown, SectorDelta, SectorSummary, sector_delta_by_compound,
    sector_summary, weak_sectors,
};
pub use stint::{
    PitStop, StintMatchup, StintSummary, compare_stints, contiguous_prefix, pit_stops, segment,
    total_pit_time,
};
