use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// One calendar day in local time, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    day: NaiveDate,
    start: DateTime<Local>,
    end: DateTime<Local>,
}

impl SearchWindow {
    /// Window covering `day` from 00:00:00.000000 to 23:59:59.999999 local time
    pub fn for_day(day: NaiveDate) -> Self {
        let start = local(day.and_time(NaiveTime::MIN));
        let end_time = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
        let end = local(day.and_time(end_time));
        Self { day, start, end: end.max(start) }
    }

    /// Window for the day `days` before `day`
    pub fn days_before(day: NaiveDate, days: u32) -> Option<Self> {
        day.checked_sub_days(Days::new(days.into())).map(Self::for_day)
    }

    /// Window for the day `days` after `day`, clamped so it never passes `today`
    pub fn days_after_clamped(day: NaiveDate, days: u32, today: NaiveDate) -> Self {
        let forward = day
            .checked_add_days(Days::new(days.into()))
            .unwrap_or(today)
            .min(today);
        Self::for_day(forward)
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn start(&self) -> DateTime<Local> {
        self.start
    }

    pub fn end(&self) -> DateTime<Local> {
        self.end
    }

    /// Start as Unix seconds
    pub fn since(&self) -> i64 {
        self.start.timestamp()
    }

    /// End as Unix seconds
    pub fn until(&self) -> i64 {
        self.end.timestamp()
    }

    /// Whether a Unix timestamp (seconds) falls within the window
    pub fn contains(&self, timestamp: i64) -> bool {
        (self.since()..=self.until()).contains(&timestamp)
    }
}

// Midnight can fall into a DST gap; take the earliest valid instant, or read
// the wall-clock value as UTC when the local time does not exist at all.
fn local(naive: NaiveDateTime) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_spans_one_day() {
        let w = SearchWindow::for_day(date(2024, 1, 5));
        assert!(w.start() <= w.end());
        assert_eq!(w.start().date_naive(), date(2024, 1, 5));
        assert_eq!(w.end().date_naive(), date(2024, 1, 5));
        assert_eq!(w.start().hour(), 0);
        assert_eq!(w.end().hour(), 23);
        assert_eq!(w.end().nanosecond(), 999_999_000);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let w = SearchWindow::for_day(date(2024, 1, 5));
        assert!(w.contains(w.since()));
        assert!(w.contains(w.until()));
        assert!(!w.contains(w.since() - 1));
        assert!(!w.contains(w.until() + 1));
    }

    #[test]
    fn test_offsets() {
        let d = date(2024, 1, 5);
        assert_eq!(SearchWindow::days_before(d, 3).unwrap().day(), date(2024, 1, 2));
        assert_eq!(
            SearchWindow::days_after_clamped(d, 3, date(2024, 12, 31)).day(),
            date(2024, 1, 8)
        );
    }

    #[test]
    fn test_forward_offset_never_passes_today() {
        let d = date(2024, 1, 5);
        let today = date(2024, 1, 6);
        assert_eq!(SearchWindow::days_after_clamped(d, 1, today).day(), today);
        assert_eq!(SearchWindow::days_after_clamped(d, 5, today).day(), today);
        assert_eq!(SearchWindow::days_after_clamped(today, 2, today).day(), today);
    }
}
