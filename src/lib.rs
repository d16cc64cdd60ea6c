//! Event-timezone date handling.
//!
//! Every event has one authoritative UTC offset. Dates may arrive from
//! anywhere (ISO strings, naive wall-clock values, instants picked by a viewer
//! in another zone) and are normalised, compared, and rendered relative to
//! that offset, so the same event day reads the same for every viewer.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use evtz::{DisplayFormat, DisplaySettings, EventCalendar, EventOffset, Separator};
//!
//! let offset = EventOffset::new(600).unwrap();
//! let cal = EventCalendar::with_reference(offset, Utc.with_ymd_and_hms(2024, 3, 5, 2, 0, 0).unwrap());
//!
//! let dash = DisplaySettings::new(DisplayFormat::Date).with_separator(Separator::Dash);
//! assert_eq!(cal.display_date("2024-03-05", &dash), "05-03");
//! assert_eq!(cal.display_date("2024-03-05T18:00:00", &DisplaySettings::default()), "Today 05/03/24");
//! assert_eq!(cal.display_date(None::<&str>, &DisplaySettings::default()), "date(?)");
//!
//! let picked = cal.deserialise_date("5/3/24").unwrap();
//! assert!(cal.is_today(&picked));
//! ```

#[macro_use]
mod macros;
mod api;
mod boundaries;
mod compare;
pub mod config;
mod error;
pub mod format;
mod instant;
mod parse;
mod timezone;


pub use api::{EventCalendar, INPUT_DATE_FORMAT};
pub use boundaries::{list_of_dates_between, monday_of_week, sunday_of_week};
pub use compare::{
    add_time_of_day, compare_dates, diff_by_date, diff_dates, difference_with, intersect_dates,
    intersection_with, union_with,
};
pub use config::EventOffset;
pub use error::{Error, Result};
pub use format::{DATE_PLACEHOLDER, DisplayFormat, DisplaySettings, RANGE_PLACEHOLDER, RangeFormats, Separator};
pub use instant::{DateArg, DateRange, Instant, ensure_ordered, occurs_within_time_window};
pub use parse::{DATE_FORMAT_STRINGS, SERIALISE_DATE_FORMAT, serialise_date};
