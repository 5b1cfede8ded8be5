//! Time parsing utilities for scheduler output.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Torque prints `ctime`, `start_time` and friends as e.g. `Mon Oct 17 10:00:00 2016`.
const TORQUE_TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// qsub `-a` / `Execution_Time` format: `[[CC]YY]MMDDhhmm[.SS]`.
const EXECUTION_TIME_FORMAT: &str = "%C%y%m%d%H%M.%S";

/// Convert a colon-delimited duration (`HH:MM:SS`, `MM:SS`, `SS`) to seconds.
///
/// Each segment is folded in as `total * 60 + segment`, so `"1:00:00"` is 3600.
/// A missing or empty duration is 0, as is any segment that is not a number.
/// Values too large for a u64 saturate at `u64::MAX`.
pub fn duration_to_seconds(s: Option<&str>) -> u64 {
    let Some(s) = s.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };

    s.split(':').fold(0, |total, segment| {
        total
            .saturating_mul(60)
            .saturating_add(segment.trim().parse::<u64>().unwrap_or(0))
    })
}

/// Format seconds as a zero-padded `HH:MM:SS` duration.
///
/// Hours are not wrapped into days, so 100 hours is `100:00:00`.
pub fn seconds_to_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds / 60) % 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

/// Parse a Torque timestamp (e.g. `Mon Oct 17 10:00:00 2016`).
///
/// The server prints its local time without a zone, so the value is read in
/// the local zone, the same one [`format_execution_time`] writes in. During
/// a DST fold the earlier instant is used. Returns None for empty strings and
/// anything that doesn't parse.
pub fn parse_torque_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Epoch seconds show up when the client asks for raw attribute values
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
    }

    // Collapse the double space Torque uses before single-digit days
    let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, TORQUE_TIMESTAMP_FORMAT)
        .ok()
        .and_then(|dt| Local.from_local_datetime(&dt).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format an absolute start time the way qsub expects it in `Execution_Time`.
///
/// The scheduler interprets the value in the submit host's local time zone.
pub fn format_execution_time(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format(EXECUTION_TIME_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(duration_to_seconds(Some("1:00:00")), 3600);
        assert_eq!(duration_to_seconds(Some("01:02:03")), 3723);
        assert_eq!(duration_to_seconds(Some("30:00")), 1800);
        assert_eq!(duration_to_seconds(Some("42")), 42);
        assert_eq!(duration_to_seconds(Some("100:00:00")), 360_000);
        assert_eq!(duration_to_seconds(Some("")), 0);
        assert_eq!(duration_to_seconds(None), 0);
    }

    #[test]
    fn test_duration_to_seconds_saturates() {
        assert_eq!(duration_to_seconds(Some("307445734561825861:00")), u64::MAX);
        assert_eq!(duration_to_seconds(Some("18446744073709551615:59:59")), u64::MAX);
    }

    #[test]
    fn test_seconds_to_duration() {
        assert_eq!(seconds_to_duration(0), "00:00:00");
        assert_eq!(seconds_to_duration(59), "00:00:59");
        assert_eq!(seconds_to_duration(3723), "01:02:03");
        assert_eq!(seconds_to_duration(86_400), "24:00:00");
        assert_eq!(seconds_to_duration(360_000), "100:00:00");
    }

    #[test]
    fn test_duration_round_trip() {
        for s in [0, 1, 59, 60, 61, 3599, 3600, 3661, 86_399, 86_400, 1_000_000] {
            assert_eq!(duration_to_seconds(Some(&seconds_to_duration(s))), s);
        }
    }

    #[test]
    fn test_parse_torque_timestamp() {
        let dt = parse_torque_timestamp("Mon Oct 17 10:00:00 2016").unwrap();
        assert_eq!(dt, Local.with_ymd_and_hms(2016, 10, 17, 10, 0, 0).unwrap());
        assert_eq!(
            dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
            "2016-10-17 10:00:00"
        );

        let dt = parse_torque_timestamp("Tue Nov  1 08:15:30 2016").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.month(), 11);

        let dt = parse_torque_timestamp("1476698400").unwrap();
        assert_eq!(dt.year(), 2016);

        assert!(parse_torque_timestamp("").is_none());
        assert!(parse_torque_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_format_execution_time() {
        let local = Local.with_ymd_and_hms(2016, 10, 17, 9, 5, 7).unwrap();
        let utc = local.with_timezone(&Utc);
        assert_eq!(format_execution_time(&utc), "201610170905.07");
    }

    #[test]
    fn test_execution_time_matches_qstat_time() {
        // qsub -a and qstat both speak the server's local time
        let start = Utc.with_ymd_and_hms(2016, 10, 17, 14, 0, 0).unwrap();
        let local = start.with_timezone(&Local);
        assert_eq!(
            format_execution_time(&start),
            local.format("%Y%m%d%H%M.%S").to_string()
        );

        let printed = local.format("%a %b %e %H:%M:%S %Y").to_string();
        assert_eq!(parse_torque_timestamp(&printed), Some(start));
    }
}
