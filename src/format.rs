//! Text labels for times and deltas

/// Format a lap time in seconds as `m:ss.mmm`, or `N/A` when undefined.
pub fn format_lap_time(seconds: Option<f64>) -> String {
    match seconds {
        Some(total) if total.is_finite() => {
            let millis = (total * 1000.0).round() as i64;
            let minutes = millis / 60_000;
            let rest = (millis % 60_000) as f64 / 1000.0;
            format!("{}:{:06.3}", minutes, rest)
        }
        _ => "N/A".to_string(),
    }
}

/// Format a signed delta in seconds as `+0.234` / `-1.567`, or `N/A`.
pub fn format_delta(seconds: Option<f64>) -> String {
    match seconds {
        Some(delta) if delta.is_finite() => format!("{:+.3}", delta),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lap_times_use_minutes_and_padded_seconds() {
        assert_eq!(format_lap_time(Some(83.456)), "1:23.456");
        assert_eq!(format_lap_time(Some(65.0)), "1:05.000");
        assert_eq!(format_lap_time(Some(59.9996)), "1:00.000");
        assert_eq!(format_lap_time(None), "N/A");
    }

    #[test]
    fn deltas_are_signed() {
        assert_eq!(format_delta(Some(0.234)), "+0.234");
        assert_eq!(format_delta(Some(-1.5674)), "-1.567");
        assert_eq!(format_delta(Some(f64::NAN)), "N/A");
    }
}
