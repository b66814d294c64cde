//! Core types for lap timing data.
//!
//! These are the values handed between the ingestion adapter and the analysis
//! stages:
//! - [`LapRecord`] is one timed lap as delivered by a timing feed
//! - [`DriverLaps`] groups a driver's laps in delivery order
//! - [`Stint`] is a contiguous run of laps on one tire set
//! - [`Compound`] and [`TrackStatus`] are closed categories with an explicit
//!   fallback for values the feed reports but this crate does not recognise
//!
//! ## Usage Example
//!
//! ```rust
//! use undercut::types::{Compound, LapRecord, TrackStatus};
//!
//! let lap = LapRecord::new("VER", 12, Some(93.481), Compound::from_label(Some("medium")))
//!     .with_tire_age(11)
//!     .with_track_status(TrackStatus::from_code(Some("1")));
//!
//! assert!(lap.is_clean());
//! assert_eq!(lap.compound, Compound::Medium);
//! ```

mod compound;
mod lap;
mod stint;
mod track_status;

pub use compound::Compound;
pub use lap::{DriverLaps, LapRecord};
pub use stint::{Stint, StintRef};
pub use track_status::TrackStatus;
