/// Human-readable duration for timeline display: the two largest
/// non-zero units, e.g. "45s", "2m 10s", "2h 11m", "1d 1h".
pub fn format_duration(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        if hours > 0 {
            format!("{days}d {hours}h")
        } else {
            format!("{days}d")
        }
    } else if hours > 0 {
        if minutes > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{hours}h")
        }
    } else if minutes > 0 {
        if seconds > 0 {
            format!("{minutes}m {seconds}s")
        } else {
            format!("{minutes}m")
        }
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_magnitude() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(45_000), "45s");
        assert_eq!(format_duration(130_000), "2m 10s");
        assert_eq!(format_duration(300_000), "5m");
        assert_eq!(format_duration(7_890_000), "2h 11m");
        assert_eq!(format_duration(90_061_000), "1d 1h");
    }

    #[test]
    fn negative_input_clamps_to_zero() {
        assert_eq!(format_duration(-5_000), "0s");
    }

    #[test]
    fn sub_second_durations_round_down() {
        assert_eq!(format_duration(900), "0s");
    }
}
