use chrono::{DateTime, Local};
use std::time::Duration;

/// Format a byte count as a human-readable string (B, KB, MB, GB)
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a Unix timestamp as local `YYYY-MM-DD HH:MM`
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Format an elapsed time with a unit suited to its magnitude
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis >= 60_000 {
        format!("{}m {:02}s", millis / 60_000, (millis % 60_000) / 1000)
    } else if millis >= 1000 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(500 * 1024 * 1024), "500.0 MB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.00 GB");
    }

    #[test]
    fn test_format_timestamp() {
        let formatted = format_timestamp(1_700_000_000); // Nov 14, 2023 approximately
        assert!(formatted.starts_with("2023-11-1"));
        assert_eq!(formatted.len(), "2023-11-14 22:13".len());
        assert_eq!(format_timestamp(i64::MAX), "unknown");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
    }
}
