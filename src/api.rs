use crate::config::{self, EventOffset};
use crate::error::Result;
use crate::instant::{DateArg, Instant};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::OnceCell;

/// Input-field date format (`YYYY-MM-DD`) used by interactive date pickers.
pub const INPUT_DATE_FORMAT: &str = "YYYY-MM-DD";

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A session over one event offset.
///
/// Holds the offset, an optional pinned reference time ("now"), and the
/// memoised start of today. "Today" is computed on first use and then frozen
/// for the life of the calendar; call [`refresh_today`](Self::refresh_today)
/// (or build a new calendar per request) to pick up a new day.
#[derive(Debug, Clone)]
pub struct EventCalendar {
    offset: EventOffset,
    /// Pinned "now". `None` reads the system clock.
    reference: Option<DateTime<Utc>>,
    today: OnceCell<Instant>,
}

impl EventCalendar {
    pub fn new(offset: EventOffset) -> Self {
        Self { offset, reference: None, today: OnceCell::new() }
    }

    /// Use the offset from `EVENT_UTC_OFFSET`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(EventOffset::from_env()?))
    }

    /// Use the process-wide offset installed with [`config::install`].
    pub fn from_installed() -> Result<Self> {
        Ok(Self::new(config::installed()?))
    }

    /// A calendar whose "now" is fixed at `reference`.
    ///
    /// Use this when you want deterministic "today" handling (tests, replays).
    pub fn with_reference(offset: EventOffset, reference: DateTime<Utc>) -> Self {
        Self { offset, reference: Some(reference), today: OnceCell::new() }
    }

    pub fn offset(&self) -> EventOffset {
        self.offset
    }

    pub fn reference(&self) -> Option<DateTime<Utc>> {
        self.reference
    }

    /// Pin (or unpin) "now". Drops the memoised today.
    pub fn set_reference(&mut self, reference: Option<DateTime<Utc>>) {
        self.reference = reference;
        self.refresh_today();
    }

    /// The current instant in the event offset.
    pub fn now(&self) -> Instant {
        let now = self.reference.unwrap_or_else(Utc::now);
        Instant::new(now.with_timezone(&self.offset.fixed()))
    }

    /// Start of today in the event offset, computed once per calendar.
    pub fn today(&self) -> &Instant {
        self.today.get_or_init(|| {
            let now = self.now();
            // Only unrepresentable when "now" is pinned to chrono's first day.
            let today = self.convert_to_event_day(&now).unwrap_or(now);
            tracing::debug!(today = %today, offset = self.offset.minutes(), "memoised today");
            today
        })
    }

    /// Forget the memoised today; the next call recomputes it from "now".
    pub fn refresh_today(&mut self) {
        if let Some(previous) = self.today.take() {
            tracing::debug!(previous = %previous, "refreshing today");
        }
    }

    /// Event-offset instant with the given wall-clock fields, or `None` when
    /// it falls outside chrono's range.
    pub fn at_wall(&self, wall: NaiveDateTime) -> Option<Instant> {
        Instant::from_wall(wall, self.offset.fixed())
    }

    /// Event-offset midnight of `date`.
    pub fn at_date(&self, date: NaiveDate) -> Option<Instant> {
        self.at_wall(date.and_time(NaiveTime::MIN))
    }

    /// Normalise `arg` into an instant, or `None`.
    ///
    /// Wrapped instants pass through untouched. Everything else lands in the
    /// event offset: zoned values keep their absolute instant, naive values
    /// are read as event wall clock. Absent input, unrecognised strings and
    /// wall clocks that can't be placed in the event offset give `None`,
    /// never "now".
    pub fn coerce<'a>(&self, arg: impl Into<DateArg<'a>>) -> Option<Instant> {
        match arg.into() {
            DateArg::Instant(instant) => Some(instant),
            DateArg::Zoned(dt) => Some(self.with_event_offset(&Instant::new(dt))),
            DateArg::Naive(wall) => self.at_wall(wall),
            DateArg::Day(date) => self.at_date(date),
            DateArg::Str(s) => self.coerce_str(s),
            DateArg::Absent => None,
        }
    }

    fn coerce_str(&self, s: &str) -> Option<Instant> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(self.with_event_offset(&Instant::new(dt)));
        }
        if let Some(wall) = NAIVE_DATETIME_FORMATS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok()) {
            return self.at_wall(wall);
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return self.at_date(date);
        }

        tracing::debug!(input = s, "unrecognised date string, treating as absent");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn offset() -> EventOffset {
        EventOffset::new(600).unwrap()
    }

    fn reference_calendar() -> EventCalendar {
        EventCalendar::with_reference(offset(), Utc.with_ymd_and_hms(2024, 3, 5, 20, 30, 0).unwrap())
    }

    #[test]
    fn now_is_reported_in_event_offset() {
        let cal = reference_calendar();
        assert_eq!(cal.now().to_string(), "2024-03-06T06:30:00+10:00");
    }

    #[test]
    fn today_is_event_midnight_of_now() {
        let cal = reference_calendar();
        assert_eq!(cal.today().to_string(), "2024-03-06T00:00:00+10:00");
    }

    #[test]
    fn today_is_memoised_until_refreshed() {
        let mut cal = reference_calendar();
        let first = *cal.today();

        // Moving "now" without a refresh keeps the cached day.
        cal.reference = Some(Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(*cal.today(), first);

        cal.refresh_today();
        assert_eq!(cal.today().to_string(), "2024-03-10T00:00:00+10:00");

        cal.set_reference(Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()));
        assert_eq!(cal.today().to_string(), "2024-04-01T00:00:00+10:00");
    }

    #[test]
    fn absent_input_never_becomes_now() {
        let cal = reference_calendar();
        assert_eq!(cal.coerce(None::<&str>), None);
        assert_eq!(cal.coerce(DateArg::Absent), None);
        assert_eq!(cal.coerce(""), None);
        assert_eq!(cal.coerce("   "), None);
    }

    #[test]
    fn unrecognised_strings_are_absent() {
        let cal = reference_calendar();
        assert_eq!(cal.coerce("next tuesday"), None);
        assert_eq!(cal.coerce("2024-13-01"), None);
    }

    #[test]
    fn wall_clocks_past_chrono_range_are_absent() {
        let reference = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let behind = EventCalendar::with_reference(EventOffset::new(-720).unwrap(), reference);
        assert_eq!(behind.coerce("+262142-12-31T23:00:00"), None);
        assert_eq!(behind.coerce(NaiveDateTime::MAX), None);
        assert_eq!(behind.at_wall(NaiveDateTime::MAX), None);

        let ahead = EventCalendar::with_reference(EventOffset::new(840).unwrap(), reference);
        assert_eq!(ahead.coerce(NaiveDate::MIN), None);
        assert_eq!(ahead.at_date(NaiveDate::MIN), None);
        assert!(ahead.coerce(NaiveDate::MAX).is_some());
    }

    #[test]
    fn iso_strings_with_offset_keep_their_instant() {
        let cal = reference_calendar();
        let i = cal.coerce("2024-03-05T00:00:00.000Z").unwrap();
        assert_eq!(i.to_string(), "2024-03-05T10:00:00+10:00");
        assert_eq!(i.to_iso_string(), "2024-03-05T00:00:00.000Z");
    }

    #[test]
    fn naive_strings_are_event_wall_clock() {
        let cal = reference_calendar();
        assert_eq!(cal.coerce("2024-03-05").unwrap().to_string(), "2024-03-05T00:00:00+10:00");
        assert_eq!(cal.coerce("2024-03-05T14:30:00").unwrap().to_string(), "2024-03-05T14:30:00+10:00");
        assert_eq!(cal.coerce("2024-03-05 14:30:00").unwrap().to_string(), "2024-03-05T14:30:00+10:00");
        assert_eq!(cal.coerce("2024-03-05T14:30").unwrap().to_string(), "2024-03-05T14:30:00+10:00");
    }

    #[test]
    fn wrapped_instants_pass_through() {
        let cal = reference_calendar();
        let plus_eleven = FixedOffset::east_opt(11 * 3600).unwrap();
        let foreign = Instant::new(plus_eleven.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
        assert_eq!(cal.coerce(foreign).unwrap().offset_minutes(), 660);
        assert_eq!(cal.coerce(&foreign).unwrap(), foreign);
    }

    #[test]
    fn native_values_are_converted() {
        let cal = reference_calendar();
        let utc = Utc.with_ymd_and_hms(2024, 3, 5, 1, 0, 0).unwrap();
        assert_eq!(cal.coerce(utc).unwrap().to_string(), "2024-03-05T11:00:00+10:00");

        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(cal.coerce(day).unwrap().to_string(), "2024-03-05T00:00:00+10:00");
        assert_eq!(cal.coerce(Some(day)), cal.at_date(day));
    }
}
