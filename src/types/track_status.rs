//! Track status classification for a lap

use serde::{Deserialize, Serialize};

/// Most severe track condition seen during a lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    Clear,
    Yellow,
    VirtualSafetyCar,
    SafetyCar,
    RedFlag,
    /// Status was not reported or could not be decoded
    Unknown,
}

impl TrackStatus {
    /// Decode a raw track status value.
    ///
    /// Timing feeds report the statuses seen during a lap as a string of
    /// digits (`"1"` clear, `"2"` yellow, `"4"` safety car, `"5"` red flag,
    /// `"6"`/`"7"` virtual safety car), e.g. `"24"` for a yellow followed by a
    /// safety car. The most severe status wins. Named statuses such as
    /// `"yellow"` or `"safety_car"` are accepted too.
    pub fn from_code(code: Option<&str>) -> Self {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return TrackStatus::Unknown;
        };

        if code.bytes().all(|b| b.is_ascii_digit()) {
            return [
                ('5', TrackStatus::RedFlag),
                ('4', TrackStatus::SafetyCar),
                ('6', TrackStatus::VirtualSafetyCar),
                ('7', TrackStatus::VirtualSafetyCar),
                ('2', TrackStatus::Yellow),
                ('1', TrackStatus::Clear),
            ]
            .into_iter()
            .find(|(digit, _)| code.contains(*digit))
            .map_or(TrackStatus::Unknown, |(_, status)| status);
        }

        match code.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "clear" | "clean" | "green" => TrackStatus::Clear,
            "yellow" => TrackStatus::Yellow,
            "vsc" | "virtual_safety_car" => TrackStatus::VirtualSafetyCar,
            "sc" | "safety_car" => TrackStatus::SafetyCar,
            "red" | "red_flag" => TrackStatus::RedFlag,
            _ => TrackStatus::Unknown,
        }
    }

    /// Whether racing was unrestricted for the whole lap.
    pub fn is_clear(self) -> bool {
        self == TrackStatus::Clear
    }
}
