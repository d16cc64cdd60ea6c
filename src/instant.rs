use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::error::{Error, Result};

/// An absolute point in time together with the UTC offset it is read in.
///
/// Calendar fields (day, hour, weekday, ...) always come from the instant's
/// own wall clock. Arithmetic returns new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instant(DateTime<FixedOffset>);

impl Instant {
    pub fn new(dt: DateTime<FixedOffset>) -> Self {
        Self(dt)
    }

    /// Build an instant from wall-clock fields in `offset`.
    ///
    /// `None` when the corresponding UTC time is outside chrono's range.
    pub fn from_wall(wall: NaiveDateTime, offset: FixedOffset) -> Option<Self> {
        // Fixed offsets never produce ambiguous or missing local times.
        let utc = wall.checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?;
        Some(Self(DateTime::from_naive_utc_and_offset(utc, offset)))
    }

    pub fn datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn offset(&self) -> FixedOffset {
        *self.0.offset()
    }

    /// Own offset in minutes east of UTC.
    pub fn offset_minutes(&self) -> i32 {
        self.0.offset().local_minus_utc() / 60
    }

    pub fn wall(&self) -> NaiveDateTime {
        self.0.naive_local()
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Same absolute instant, read in `offset`.
    pub fn in_offset(&self, offset: FixedOffset) -> Self {
        Self(self.0.with_timezone(&offset))
    }

    /// Midnight of this instant's own calendar day.
    pub fn start_of_day(&self) -> Option<Self> {
        Self::from_wall(self.date().and_time(NaiveTime::MIN), self.offset())
    }

    /// Milliseconds since the epoch of [`start_of_day`](Self::start_of_day),
    /// computed without building the instant.
    pub fn start_of_day_millis(&self) -> i64 {
        let midnight = self.date().and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        midnight - i64::from(self.offset().local_minus_utc()) * 1000
    }

    pub fn checked_add(&self, by: Duration) -> Option<Self> {
        self.0.checked_add_signed(by).map(Self)
    }

    pub fn checked_sub(&self, by: Duration) -> Option<Self> {
        self.0.checked_sub_signed(by).map(Self)
    }

    pub fn add_days(&self, days: i64) -> Option<Self> {
        self.checked_add(Duration::try_days(days)?)
    }

    /// UTC ISO-8601 with milliseconds, e.g. `2024-03-05T00:00:00.000Z`.
    pub fn to_iso_string(&self) -> String {
        self.0.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Instant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Secs, false))
    }
}

impl PartialOrd for Instant {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instant {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl From<DateTime<FixedOffset>> for Instant {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self(dt)
    }
}

/// Anything the coercion layer accepts.
///
/// Conversions exist for the common chrono types, strings and `Option`s of
/// those, so call sites can pass whatever they hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateArg<'a> {
    Instant(Instant),
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
    Day(NaiveDate),
    Str(&'a str),
    Absent,
}

impl From<Instant> for DateArg<'_> {
    fn from(i: Instant) -> Self {
        DateArg::Instant(i)
    }
}

impl From<&Instant> for DateArg<'_> {
    fn from(i: &Instant) -> Self {
        DateArg::Instant(*i)
    }
}

impl From<DateTime<FixedOffset>> for DateArg<'_> {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        DateArg::Zoned(dt)
    }
}

impl From<DateTime<Utc>> for DateArg<'_> {
    fn from(dt: DateTime<Utc>) -> Self {
        DateArg::Zoned(dt.fixed_offset())
    }
}

impl From<DateTime<Local>> for DateArg<'_> {
    fn from(dt: DateTime<Local>) -> Self {
        DateArg::Zoned(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for DateArg<'_> {
    fn from(dt: NaiveDateTime) -> Self {
        DateArg::Naive(dt)
    }
}

impl From<NaiveDate> for DateArg<'_> {
    fn from(d: NaiveDate) -> Self {
        DateArg::Day(d)
    }
}

impl<'a> From<&'a str> for DateArg<'a> {
    fn from(s: &'a str) -> Self {
        DateArg::Str(s)
    }
}

impl<'a> From<&'a String> for DateArg<'a> {
    fn from(s: &'a String) -> Self {
        DateArg::Str(s.as_str())
    }
}

impl<'a, T> From<Option<T>> for DateArg<'a>
where
    T: Into<DateArg<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(DateArg::Absent, Into::into)
    }
}

/// `start` plus an optional `end`; an absent end is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Instant,
    pub end: Option<Instant>,
}

impl DateRange {
    /// Build a range, rejecting `start` after `end`.
    pub fn new(start: Instant, end: Option<Instant>) -> Result<Self> {
        if let Some(end) = &end {
            ensure_ordered(&start, end)?;
        }
        Ok(Self { start, end })
    }

    pub fn open(start: Instant) -> Self {
        Self { start, end: None }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// True when `self` starts before `window` ends and ends after it starts.
    ///
    /// Open ends extend forever.
    pub fn overlaps(&self, window: &DateRange) -> bool {
        let starts_before_window_end = window.end.is_none_or(|w_end| self.start < w_end);
        let ends_after_window_start = self.end.is_none_or(|end| end > window.start);
        starts_before_window_end && ends_after_window_start
    }
}

/// Default rendering used in error messages (`YYYY-MM-DDTHH:mm:ssZ`).
pub(crate) fn display_default(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Fail when `start` is after `end`.
///
/// Signals a programming error: callers validate before using range helpers.
pub fn ensure_ordered(start: &Instant, end: &Instant) -> Result<()> {
    if start > end {
        return Err(Error::InvalidRange {
            start: display_default(&start.datetime()),
            end: display_default(&end.datetime()),
        });
    }
    Ok(())
}

/// True when the candidate interval overlaps the window (both ends exclusive).
pub fn occurs_within_time_window(
    window_start: &Instant,
    window_end: &Instant,
    candidate_start: &Instant,
    candidate_end: &Instant,
) -> bool {
    let window = DateRange { start: *window_start, end: Some(*window_end) };
    DateRange { start: *candidate_start, end: Some(*candidate_end) }.overlaps(&window)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, offset_minutes: i32) -> Instant {
        let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
        Instant::from_wall(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap(), offset).unwrap()
    }

    #[test]
    fn from_wall_keeps_local_fields() {
        let i = at(2024, 3, 5, 9, 30, 600);
        assert_eq!(i.wall().to_string(), "2024-03-05 09:30:00");
        assert_eq!(i.offset_minutes(), 600);
        assert_eq!(i.to_iso_string(), "2024-03-04T23:30:00.000Z");
    }

    #[test]
    fn start_of_day_uses_own_offset() {
        let d = at(2024, 3, 5, 0, 30, 600);
        let i = d.start_of_day().unwrap();
        assert_eq!(i.to_string(), "2024-03-05T00:00:00+10:00");
        assert_eq!(d.start_of_day_millis(), i.timestamp_millis());
    }

    #[test]
    fn arithmetic_past_chrono_range_is_none() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let behind = FixedOffset::west_opt(12 * 3600).unwrap();
        assert_eq!(Instant::from_wall(NaiveDateTime::MAX, behind), None);
        assert_eq!(Instant::from_wall(NaiveDateTime::MIN, FixedOffset::east_opt(14 * 3600).unwrap()), None);

        let last = Instant::from_wall(NaiveDateTime::MAX, utc).unwrap();
        assert_eq!(last.add_days(1), None);
        assert_eq!(last.checked_add(Duration::seconds(1)), None);
        assert_eq!(last.add_days(i64::MAX), None);
        assert_eq!(last.checked_sub(Duration::days(1)).map(|d| d.date()), NaiveDateTime::MAX.date().pred_opt());

        let first = Instant::from_wall(NaiveDateTime::MIN, utc).unwrap();
        assert_eq!(first.checked_sub(Duration::seconds(1)), None);
        assert_eq!(first.start_of_day(), Some(first));
    }

    #[test]
    fn ordering_is_by_absolute_instant() {
        let sydney = at(2024, 3, 5, 10, 0, 600);
        let utc = at(2024, 3, 5, 0, 0, 0);
        assert_eq!(sydney, utc.in_offset(sydney.offset()));
        assert_eq!(sydney.cmp(&utc), std::cmp::Ordering::Equal);
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let start = at(2024, 3, 6, 9, 0, 600);
        let end = at(2024, 3, 5, 9, 0, 600);
        let err = DateRange::new(start, Some(end)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidRange {
                start: "2024-03-06T09:00:00+10:00".to_string(),
                end: "2024-03-05T09:00:00+10:00".to_string(),
            }
        );
        assert!(DateRange::new(end, Some(start)).is_ok());
        assert!(DateRange::new(start, None).unwrap().is_open());
    }

    #[test]
    fn overlap_treats_open_end_as_unbounded() {
        let window = DateRange::new(at(2024, 3, 5, 9, 0, 600), Some(at(2024, 3, 5, 17, 0, 600))).unwrap();
        let morning = DateRange::new(at(2024, 3, 5, 7, 0, 600), Some(at(2024, 3, 5, 9, 0, 600))).unwrap();
        let late = DateRange::open(at(2024, 3, 5, 16, 0, 600));
        assert!(!morning.overlaps(&window));
        assert!(late.overlaps(&window));
        assert!(occurs_within_time_window(
            &window.start,
            &window.end.unwrap(),
            &at(2024, 3, 5, 8, 0, 600),
            &at(2024, 3, 5, 9, 1, 600),
        ));
        assert!(!occurs_within_time_window(&window.start, &window.end.unwrap(), &morning.start, &window.start));
        assert!(!occurs_within_time_window(&window.start, &window.end.unwrap(), &window.end.unwrap(), &late.start));
    }

    #[test]
    fn option_args_map_to_absent() {
        let none: Option<&str> = None;
        assert_eq!(DateArg::from(none), DateArg::Absent);
        assert_eq!(DateArg::from(Some("2024-03-05")), DateArg::Str("2024-03-05"));
    }
}
