use chrono::Datelike;

use crate::instant::Instant;

/// Monday of `d`'s ISO week, same time of day, read in `d`'s own offset.
///
/// `None` when that day is outside chrono's range.
pub fn monday_of_week(d: &Instant) -> Option<Instant> {
    let from_monday = i64::from(d.date().weekday().num_days_from_monday());
    d.add_days(-from_monday)
}

/// Sunday of `d`'s ISO week, same time of day, read in `d`'s own offset.
pub fn sunday_of_week(d: &Instant) -> Option<Instant> {
    let to_sunday = 6 - i64::from(d.date().weekday().num_days_from_monday());
    d.add_days(to_sunday)
}

/// One instant per calendar day from `start` through `end`'s day.
///
/// Each element is `start` plus whole days, so the time of day is kept. Days
/// are counted in `start`'s offset. Empty when `start` is after `end`; stops
/// early at the end of chrono's range.
pub fn list_of_dates_between(start: &Instant, end: &Instant) -> Vec<Instant> {
    if start > end {
        return Vec::new();
    }
    let last_day = end.in_offset(start.offset()).date();

    let mut days = Vec::new();
    let mut current = Some(*start);
    while let Some(day) = current.filter(|day| day.date() <= last_day) {
        days.push(day);
        current = day.add_days(1);
    }
    days
}
