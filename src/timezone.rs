//! Event-offset views and shifts.
//!
//! Event times are always relative to the event offset, but an instant may be
//! carried in some other offset (for example a date picked by a viewer in a
//! different zone). These helpers let callers read such instants relative to
//! the event offset.
//!
//! Note that viewing is not the same as shifting: `with_event_offset(d)` is
//! the same absolute instant as `d`, but its start of day can be a different
//! instant than `d`'s own start of day. Be careful comparing days of instants
//! that carry different offsets; [`EventCalendar::convert_to_event_day`] is the
//! safe way to do it.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::api::EventCalendar;
use crate::instant::Instant;

impl EventCalendar {
    /// Same absolute instant, read in the event offset.
    pub fn with_event_offset(&self, d: &Instant) -> Instant {
        d.in_offset(self.offset().fixed())
    }

    /// Event-offset view of `d`, truncated to 00:00:00.
    pub fn start_of_day_in_event_offset(&self, d: &Instant) -> Option<Instant> {
        self.with_event_offset(d).start_of_day()
    }

    /// Event offset minus `d`'s own offset.
    pub fn tz_diff(&self, d: &Instant) -> Duration {
        Duration::minutes(i64::from(self.offset().minutes() - d.offset_minutes()))
    }

    pub fn subtract_tz_diff(&self, d: &Instant) -> Option<Instant> {
        d.checked_sub(self.tz_diff(d))
    }

    pub fn add_tz_diff(&self, d: &Instant) -> Option<Instant> {
        d.checked_add(self.tz_diff(d))
    }

    /// Move the absolute instant forward by the event offset.
    pub fn shift_forward(&self, d: &Instant) -> Option<Instant> {
        d.checked_add(Duration::minutes(i64::from(self.offset().minutes())))
    }

    /// Move the absolute instant back by the event offset.
    pub fn shift_backward(&self, d: &Instant) -> Option<Instant> {
        d.checked_sub(Duration::minutes(i64::from(self.offset().minutes())))
    }

    /// The event-offset instant whose wall clock reads like `d`'s own.
    ///
    /// This is `d` shifted back by [`tz_diff`](Self::tz_diff) and viewed in
    /// the event offset.
    pub fn convert_to_event_tz(&self, d: &Instant) -> Option<Instant> {
        self.subtract_tz_diff(d).map(|shifted| self.with_event_offset(&shifted))
    }

    /// Event-offset midnight of the day `d` falls on in its own offset.
    ///
    /// A date picked at midnight by a viewer in another zone can read as the
    /// neighbouring day in the event offset; this always lands on the day the
    /// viewer picked.
    pub fn convert_to_event_day(&self, d: &Instant) -> Option<Instant> {
        let midnight = d.start_of_day()?;
        let viewed = self.with_event_offset(&midnight);
        // A full-day offset gap also reads 00:00, but on the neighbouring date.
        if viewed.time() == NaiveTime::MIN && viewed.date() == midnight.date() {
            return Some(viewed);
        }
        self.subtract_tz_diff(&midnight).map(|shifted| self.with_event_offset(&shifted))
    }

    /// Calendar day of `d` under the event offset.
    ///
    /// Equal to the date of [`convert_to_event_day`](Self::convert_to_event_day),
    /// which is always `d`'s own calendar date, so this never fails.
    pub fn event_day(&self, d: &Instant) -> NaiveDate {
        d.date()
    }
}
