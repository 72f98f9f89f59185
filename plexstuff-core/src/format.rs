//! Human-readable sizes and durations.

use chrono::{DateTime, Datelike, Timelike};

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Formats a byte count with three decimals: `"1.953 kB"`, `"1.907 MB"`, `"1.863 GB"`.
///
/// Sizes below one KiB format as an empty string.
pub fn format_size(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes >= GIB {
        format!("{:.3} GB", bytes / GIB)
    } else if bytes >= MIB {
        format!("{:.3} MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{:.3} kB", bytes / KIB)
    } else {
        String::new()
    }
}

/// Same as [`format_size`] for a size already expressed in MiB.
pub fn format_size_mib(mib: f64) -> String {
    if mib >= 1024.0 {
        format!("{:.3} GB", mib / 1024.0)
    } else if mib > 0.0 {
        format!("{mib:.3} MB")
    } else {
        String::new()
    }
}

/// Parenthesised one-decimal suffix appended to torrent display titles.
pub fn format_size_suffix(mib: f64) -> String {
    if mib >= 1024.0 {
        format!("({:.1} GiB)", mib / 1024.0)
    } else {
        format!("({mib:.1} MiB)")
    }
}

/// Formats a length of time as a calendar-style breakdown.
///
/// The duration is laid out from the Unix epoch, so "months" and "years"
/// follow calendar lengths. Only non-zero units above seconds are listed:
/// `"1 hours, 2 minutes, and 5.500 seconds"`, or `"0.250 seconds"`.
pub fn format_duration(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let whole = seconds.trunc() as i64;
    let nanos = ((seconds - seconds.trunc()) * 1e9).round().min(999_999_999.0) as u32;

    let Some(instant) = DateTime::from_timestamp(whole, nanos) else {
        return format!("{seconds:.3} seconds");
    };

    let units = [
        (i64::from(instant.year()) - 1970, "years"),
        (i64::from(instant.month0()), "months"),
        (i64::from(instant.day0()), "days"),
        (i64::from(instant.hour()), "hours"),
        (i64::from(instant.minute()), "minutes"),
    ];

    let mut parts: Vec<String> = units
        .iter()
        .filter(|(count, _)| *count != 0)
        .map(|(count, name)| format!("{count} {name}"))
        .collect();

    let secs = f64::from(instant.second()) + f64::from(instant.nanosecond()) * 1e-9;
    if parts.is_empty() {
        parts.push(format!("{secs:.3} seconds"));
    } else {
        parts.push(format!("and {secs:.3} seconds"));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(2_000), "1.953 kB");
        assert_eq!(format_size(2_000_000), "1.907 MB");
        assert_eq!(format_size(2_000_000_000), "1.863 GB");
        assert_eq!(format_size(512), "");
    }

    #[test]
    fn test_format_size_mib() {
        assert_eq!(format_size_mib(2048.0), "2.000 GB");
        assert_eq!(format_size_mib(700.0), "700.000 MB");
        assert_eq!(format_size_mib(0.0), "");
    }

    #[test]
    fn test_format_size_suffix() {
        assert_eq!(format_size_suffix(700.0), "(700.0 MiB)");
        assert_eq!(format_size_suffix(1500.0), "(1.5 GiB)");
        assert_eq!(format_size_suffix(1024.0), "(1.0 GiB)");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.25), "0.250 seconds");
        assert_eq!(
            format_duration(3725.5),
            "1 hours, 2 minutes, and 5.500 seconds"
        );
        assert_eq!(
            format_duration(90_061.0),
            "1 days, 1 hours, 1 minutes, and 1.000 seconds"
        );
        assert_eq!(format_duration(-4.0), "0.000 seconds");
    }

    #[test]
    fn test_format_duration_calendar_units() {
        // 1971-02-01T00:00:00Z
        let seconds = (365.0 + 31.0) * 86_400.0;
        assert_eq!(
            format_duration(seconds),
            "1 years, 1 months, and 0.000 seconds"
        );
    }
}
