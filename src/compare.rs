//! Equality, ordering and set operations over instants.
//!
//! Two granularities are supported: exact instants and event days. The
//! calendar equalities (`day_equal`, `time_equal`, `datetime_equal`) all read
//! both sides through the event-offset conversions, so a date picked in
//! another zone matches the event time with the same wall clock. Set
//! operations keep the left operand's order. Intersection and union keep the
//! first element seen for each equivalence class; difference keeps every left
//! element that has no match on the right, duplicates included.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Timelike};

use crate::api::EventCalendar;
use crate::instant::Instant;

/// Signed difference `a - b` in milliseconds; zero iff the same instant.
pub fn compare_dates(a: &Instant, b: &Instant) -> i64 {
    a.timestamp_millis() - b.timestamp_millis()
}

fn same_instant(a: &Instant, b: &Instant) -> bool {
    compare_dates(a, b) == 0
}

/// Difference of the two own-offset starts of day, in milliseconds.
pub fn diff_by_date(a: &Instant, b: &Instant) -> i64 {
    a.start_of_day_millis() - b.start_of_day_millis()
}

/// `date` advanced by the hours, minutes and seconds of `time_of_day`.
pub fn add_time_of_day(date: &Instant, time_of_day: &Instant) -> Option<Instant> {
    date.checked_add(Duration::seconds(i64::from(seconds_of_day(time_of_day))))
}

fn seconds_of_day(d: &Instant) -> u32 {
    d.time().num_seconds_from_midnight()
}

/// Elements of `xs` that are also in `ys` (exact instants).
pub fn intersect_dates(xs: &[Instant], ys: &[Instant]) -> Vec<Instant> {
    intersection_with(xs, ys, same_instant)
}

/// Elements of `xs` that are not in `ys` (exact instants).
pub fn diff_dates(xs: &[Instant], ys: &[Instant]) -> Vec<Instant> {
    difference_with(xs, ys, same_instant)
}

pub fn intersection_with<T, F>(xs: &[T], ys: &[T], eq: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let mut out: Vec<T> = Vec::new();
    for x in xs {
        if ys.iter().any(|y| eq(x, y)) && !out.iter().any(|seen| eq(seen, x)) {
            out.push(x.clone());
        }
    }
    out
}

pub fn union_with<T, F>(xs: &[T], ys: &[T], eq: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let mut out: Vec<T> = Vec::new();
    for x in xs.iter().chain(ys) {
        if !out.iter().any(|seen| eq(seen, x)) {
            out.push(x.clone());
        }
    }
    out
}

pub fn difference_with<T, F>(xs: &[T], ys: &[T], eq: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    xs.iter().filter(|x| !ys.iter().any(|y| eq(x, y))).cloned().collect()
}

impl EventCalendar {
    /// Same calendar day under the event offset.
    pub fn day_equal(&self, a: &Instant, b: &Instant) -> bool {
        self.event_day(a) == self.event_day(b)
    }

    /// Same wall-clock hour, minute and second once both are corrected to the
    /// event offset.
    ///
    /// [`convert_to_event_tz`](Self::convert_to_event_tz) keeps each side's
    /// own wall clock, so the comparison reads it directly and works even
    /// where the converted instant is unrepresentable.
    pub fn time_equal(&self, a: &Instant, b: &Instant) -> bool {
        seconds_of_day(a) == seconds_of_day(b)
    }

    /// Same event-offset date and time once both are corrected to the event
    /// offset (the `convert_to_event_tz` views coincide).
    ///
    /// Use [`compare_dates`] for the exact absolute instant.
    pub fn datetime_equal(&self, a: &Instant, b: &Instant) -> bool {
        a.wall() == b.wall()
    }

    pub fn is_today(&self, d: &Instant) -> bool {
        self.day_equal(d, self.today())
    }

    /// Absent dates count as after today.
    pub fn is_after_today(&self, d: Option<&Instant>) -> bool {
        d.is_none_or(|d| self.event_day(d) > self.event_day(self.today()))
    }

    pub fn is_before_today(&self, d: &Instant) -> bool {
        self.event_day(d) < self.event_day(self.today())
    }

    /// `start`'s day <= `date`'s day <= `end`'s day.
    pub fn is_between_dates(&self, date: &Instant, start: &Instant, end: &Instant) -> bool {
        let day = self.event_day(date);
        self.event_day(start) <= day && day <= self.event_day(end)
    }

    /// Elements of `xs` whose day also appears in `ys`.
    pub fn intersect_dates_by_date(&self, xs: &[Instant], ys: &[Instant]) -> Vec<Instant> {
        intersection_with(xs, ys, |a, b| self.day_equal(a, b))
    }

    /// One element per distinct day, `xs` first.
    pub fn union_dates_by_date(&self, xs: &[Instant], ys: &[Instant]) -> Vec<Instant> {
        union_with(xs, ys, |a, b| self.day_equal(a, b))
    }

    /// Difference of the two times of day, both applied to today.
    pub fn diff_by_time_of_day(&self, a: &Instant, b: &Instant) -> i64 {
        // Today cancels out of the difference.
        (i64::from(seconds_of_day(a)) - i64::from(seconds_of_day(b))) * 1000
    }

    /// Bucket `items` by event day. Items without a date are skipped.
    pub fn group_by_date<T, F>(&self, items: impl IntoIterator<Item = T>, date_of: F) -> BTreeMap<NaiveDate, Vec<T>>
    where
        F: Fn(&T) -> Option<Instant>,
    {
        let mut groups: BTreeMap<NaiveDate, Vec<T>> = BTreeMap::new();
        for item in items {
            match date_of(&item) {
                Some(d) => groups.entry(self.event_day(&d)).or_default().push(item),
                None => tracing::debug!("group_by_date: skipping item without a date"),
            }
        }
        groups
    }

    /// Key `items` by event day; later items win.
    pub fn key_by_date<T, F>(&self, items: impl IntoIterator<Item = T>, date_of: F) -> BTreeMap<NaiveDate, T>
    where
        F: Fn(&T) -> Option<Instant>,
    {
        let mut keyed = BTreeMap::new();
        for item in items {
            match date_of(&item) {
                Some(d) => {
                    keyed.insert(self.event_day(&d), item);
                }
                None => tracing::debug!("key_by_date: skipping item without a date"),
            }
        }
        keyed
    }
}
