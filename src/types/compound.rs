//! Tire compound classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tire compound fitted for a lap.
///
/// Labels outside the known set are kept as [`Compound::Other`] so that two
/// different unrecognized labels remain two different categories for stint
/// change detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    /// Compound was not reported for the lap
    #[default]
    Unknown,
    /// Unrecognized label, normalized to upper case
    Other(String),
}

impl Compound {
    /// Normalize a raw compound label from a timing feed.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace. Missing,
    /// empty, `nan` and `UNKNOWN` labels map to [`Compound::Unknown`].
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
            return Compound::Unknown;
        };

        match label.to_ascii_uppercase().as_str() {
            "SOFT" => Compound::Soft,
            "MEDIUM" => Compound::Medium,
            "HARD" => Compound::Hard,
            "INTERMEDIATE" | "INTER" => Compound::Intermediate,
            "WET" => Compound::Wet,
            "UNKNOWN" | "NAN" | "NONE" => Compound::Unknown,
            other => Compound::Other(other.to_string()),
        }
    }

    /// Whether the compound is a dry-weather slick.
    pub fn is_slick(&self) -> bool {
        matches!(self, Compound::Soft | Compound::Medium | Compound::Hard)
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compound::Soft => f.write_str("SOFT"),
            Compound::Medium => f.write_str("MEDIUM"),
            Compound::Hard => f.write_str("HARD"),
            Compound::Intermediate => f.write_str("INTERMEDIATE"),
            Compound::Wet => f.write_str("WET"),
            Compound::Unknown => f.write_str("UNKNOWN"),
            Compound::Other(label) => f.write_str(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_are_case_insensitive() {
        assert_eq!(Compound::from_label(Some("soft")), Compound::Soft);
        assert_eq!(Compound::from_label(Some(" Medium ")), Compound::Medium);
        assert_eq!(Compound::from_label(Some("INTER")), Compound::Intermediate);
    }

    #[test]
    fn missing_labels_are_unknown() {
        assert_eq!(Compound::from_label(None), Compound::Unknown);
        assert_eq!(Compound::from_label(Some("")), Compound::Unknown);
        assert_eq!(Compound::from_label(Some("nan")), Compound::Unknown);
    }

    #[test]
    fn unrecognized_labels_stay_distinct() {
        let a = Compound::from_label(Some("test_unknown"));
        let b = Compound::from_label(Some("hypersoft"));

        assert_eq!(a, Compound::Other("TEST_UNKNOWN".to_string()));
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "TEST_UNKNOWN");
        assert!(!a.is_slick());
    }
}
