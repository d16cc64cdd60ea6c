//! Display presets and range rendering.
//!
//! Named presets ([`DisplayFormat`]) and raw patterns are separate entry
//! points: `display_date` only accepts presets, `display_date_with_pattern`
//! only accepts pattern strings. Unknown preset names are rejected by
//! [`DisplayFormat::from_str`] rather than being treated as patterns.

pub mod pattern;

use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::api::EventCalendar;
use crate::error::Error;
use crate::instant::{DateArg, Instant};
use pattern::Pattern;

/// Rendered in place of an absent date.
pub const DATE_PLACEHOLDER: &str = "date(?)";
/// Rendered in place of an absent side of a range.
pub const RANGE_PLACEHOLDER: &str = "?";

const TODAY: &str = "Today";
const LONG_DATE: &str = "Do MMM, YY";

static MERIDIEM: Lazy<Pattern> = Lazy::new(|| Pattern::compile("a"));
static RANGE_TIME: Lazy<Pattern> = Lazy::new(|| Pattern::compile("h:mma"));
static RANGE_TIME_BARE: Lazy<Pattern> = Lazy::new(|| Pattern::compile("h:mm"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayFormat {
    /// `05/03`
    Date,
    /// `05/03/24`
    DateWithYear,
    /// `5th Mar, 24`
    LongDateWithYear,
    /// `Tue, 05/03/24`
    DayWithDate,
    /// `Tue 5th Mar, 24`, or `Today - 5th Mar, 24`
    DayWithLongDate,
    /// `Tue 05/03/24`
    #[default]
    ShortDayWithDate,
    /// `05/03/24 (Tue)`, or `05/03/24 (today)`
    BracketedDayWithDate,
    /// `02:30pm`
    Time,
}

impl DisplayFormat {
    pub const ALL: [DisplayFormat; 8] = [
        DisplayFormat::Date,
        DisplayFormat::DateWithYear,
        DisplayFormat::LongDateWithYear,
        DisplayFormat::DayWithDate,
        DisplayFormat::DayWithLongDate,
        DisplayFormat::ShortDayWithDate,
        DisplayFormat::BracketedDayWithDate,
        DisplayFormat::Time,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DisplayFormat::Date => "Date",
            DisplayFormat::DateWithYear => "DateWithYear",
            DisplayFormat::LongDateWithYear => "LongDateWithYear",
            DisplayFormat::DayWithDate => "DayWithDate",
            DisplayFormat::DayWithLongDate => "DayWithLongDate",
            DisplayFormat::ShortDayWithDate => "ShortDayWithDate",
            DisplayFormat::BracketedDayWithDate => "BracketedDayWithDate",
            DisplayFormat::Time => "Time",
        }
    }

    /// Whether the preset shows a weekday (and so may show "Today").
    pub fn shows_weekday(self) -> bool {
        matches!(
            self,
            DisplayFormat::DayWithDate
                | DisplayFormat::DayWithLongDate
                | DisplayFormat::ShortDayWithDate
                | DisplayFormat::BracketedDayWithDate
        )
    }

    /// The pattern this preset renders with.
    pub fn pattern(self, separator: Separator, today: bool) -> String {
        let sep = separator.as_str();
        let short_date = format!("DD{sep}MM{sep}YY");
        match self {
            DisplayFormat::Date => format!("DD{sep}MM"),
            DisplayFormat::DateWithYear => short_date,
            DisplayFormat::LongDateWithYear => LONG_DATE.to_string(),
            DisplayFormat::DayWithDate => format!("{}, {short_date}", day_field(today, false)),
            DisplayFormat::DayWithLongDate if today => format!("[{TODAY}] - {LONG_DATE}"),
            DisplayFormat::DayWithLongDate => format!("ddd {LONG_DATE}"),
            DisplayFormat::ShortDayWithDate => format!("{} {short_date}", day_field(today, false)),
            DisplayFormat::BracketedDayWithDate => format!("{short_date} ({})", day_field(today, true)),
            DisplayFormat::Time => "hh:mma".to_string(),
        }
    }
}

fn day_field(today: bool, lower: bool) -> String {
    match (today, lower) {
        (true, true) => format!("[{}]", lowercase_first(TODAY)),
        (true, false) => format!("[{TODAY}]"),
        (false, _) => "ddd".to_string(),
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl std::fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DisplayFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisplayFormat::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownFormat { name: s.to_string() })
    }
}

/// Separator interpolated into the numeric date presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Separator {
    #[default]
    Slash,
    Dash,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Slash => "/",
            Separator::Dash => "-",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Separator> {
        match symbol {
            "/" => Some(Separator::Slash),
            "-" => Some(Separator::Dash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplaySettings {
    /// `None` falls back to [`DisplayFormat::ShortDayWithDate`].
    pub format: Option<DisplayFormat>,
    pub separator: Separator,
}

impl DisplaySettings {
    pub fn new(format: DisplayFormat) -> Self {
        Self { format: Some(format), separator: Separator::default() }
    }

    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }
}

/// Raw patterns for each side of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeFormats<'a> {
    pub start: &'a str,
    pub end: &'a str,
}

impl EventCalendar {
    /// Render `date` with a named preset.
    pub fn display_date<'a>(&self, date: impl Into<DateArg<'a>>, settings: &DisplaySettings) -> String {
        let Some(date) = self.coerce(date) else {
            return DATE_PLACEHOLDER.to_string();
        };
        let format = settings.format.unwrap_or_default();
        let today = format.shows_weekday() && self.is_today(&date);
        Pattern::compile(&format.pattern(settings.separator, today)).render(&date.datetime())
    }

    /// Render `date` with a raw pattern such as `"YYYY-MM-DD HH:mm"`.
    pub fn display_date_with_pattern<'a>(&self, date: impl Into<DateArg<'a>>, pattern: &str) -> String {
        match self.coerce(date) {
            Some(date) => Pattern::compile(pattern).render(&date.datetime()),
            None => DATE_PLACEHOLDER.to_string(),
        }
    }

    /// Render `"{start} - {end}"`.
    ///
    /// Without explicit `formats` both sides are times; the start drops its
    /// am/pm suffix when it matches the end's (`2:00 - 3:00pm`).
    pub fn display_date_range<'a, 'b>(
        &self,
        start: impl Into<DateArg<'a>>,
        end: impl Into<DateArg<'b>>,
        formats: Option<RangeFormats<'_>>,
    ) -> String {
        let start = self.coerce(start);
        let end = self.coerce(end);

        let (start_str, end_str) = match formats {
            Some(formats) => {
                let start_pattern = Pattern::compile(formats.start);
                let end_pattern = Pattern::compile(formats.end);
                (
                    start.map(|d| start_pattern.render(&d.datetime())),
                    end.map(|d| end_pattern.render(&d.datetime())),
                )
            }
            None => {
                let same_period = match (&start, &end) {
                    (Some(s), Some(e)) => MERIDIEM.render(&s.datetime()) == MERIDIEM.render(&e.datetime()),
                    _ => false,
                };
                let start_pattern: &Pattern = if same_period { &*RANGE_TIME_BARE } else { &*RANGE_TIME };
                (start.map(|d| start_pattern.render(&d.datetime())), end.map(|d| RANGE_TIME.render(&d.datetime())))
            }
        };

        join_range(start_str, end_str)
    }

    /// Like [`display_date_range`](Self::display_date_range) with caller
    /// supplied formatters.
    pub fn display_date_range_with<'a, 'b, S, E>(
        &self,
        start: impl Into<DateArg<'a>>,
        end: impl Into<DateArg<'b>>,
        format_start: S,
        format_end: E,
    ) -> String
    where
        S: Fn(&Instant) -> String,
        E: Fn(&Instant) -> String,
    {
        let start = self.coerce(start).map(|d| format_start(&d));
        let end = self.coerce(end).map(|d| format_end(&d));
        join_range(start, end)
    }
}

fn join_range(start: Option<String>, end: Option<String>) -> String {
    format!(
        "{} - {}",
        start.as_deref().unwrap_or(RANGE_PLACEHOLDER),
        end.as_deref().unwrap_or(RANGE_PLACEHOLDER)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventOffset;
    use chrono::{TimeZone, Utc};

    /// Event offset +10:00, "now" pinned to 2024-03-05 09:00 event time.
    fn calendar() -> EventCalendar {
        let offset = EventOffset::new(600).unwrap();
        EventCalendar::with_reference(offset, Utc.with_ymd_and_hms(2024, 3, 4, 23, 0, 0).unwrap())
    }

    fn settings(format: DisplayFormat) -> DisplaySettings {
        DisplaySettings::new(format)
    }

    #[test]
    fn absent_date_renders_placeholder() {
        let cal = calendar();
        assert_eq!(cal.display_date(None::<&str>, &DisplaySettings::default()), "date(?)");
        assert_eq!(cal.display_date("", &DisplaySettings::default()), "date(?)");
        assert_eq!(cal.display_date("not a date", &DisplaySettings::default()), "date(?)");
        assert_eq!(cal.display_date_with_pattern(None::<&str>, "YYYY"), "date(?)");
    }

    #[test]
    fn date_presets_interpolate_separator() {
        let cal = calendar();
        let dash = settings(DisplayFormat::Date).with_separator(Separator::Dash);
        assert_eq!(cal.display_date("2024-03-05", &dash), "05-03");
        assert_eq!(cal.display_date("2024-03-05", &settings(DisplayFormat::Date)), "05/03");
        assert_eq!(cal.display_date("2024-03-09", &settings(DisplayFormat::DateWithYear)), "09/03/24");
    }

    #[test]
    fn long_formats_ignore_separator() {
        let cal = calendar();
        let dash = settings(DisplayFormat::LongDateWithYear).with_separator(Separator::Dash);
        assert_eq!(cal.display_date("2024-03-22", &dash), "22nd Mar, 24");
        let time = settings(DisplayFormat::Time).with_separator(Separator::Dash);
        assert_eq!(cal.display_date("2024-03-22T14:30:00", &time), "02:30pm");
    }

    #[test]
    fn weekday_presets_show_weekday_for_other_days() {
        let cal = calendar();
        let d = "2024-03-07";
        assert_eq!(cal.display_date(d, &settings(DisplayFormat::DayWithDate)), "Thu, 07/03/24");
        assert_eq!(cal.display_date(d, &settings(DisplayFormat::ShortDayWithDate)), "Thu 07/03/24");
        assert_eq!(cal.display_date(d, &settings(DisplayFormat::BracketedDayWithDate)), "07/03/24 (Thu)");
        assert_eq!(cal.display_date(d, &settings(DisplayFormat::DayWithLongDate)), "Thu 7th Mar, 24");
    }

    #[test]
    fn weekday_presets_say_today() {
        let cal = calendar();
        let d = "2024-03-05T18:45:00";
        assert_eq!(cal.display_date(d, &settings(DisplayFormat::DayWithDate)), "Today, 05/03/24");
        assert_eq!(cal.display_date(d, &settings(DisplayFormat::ShortDayWithDate)), "Today 05/03/24");
        assert_eq!(cal.display_date(d, &settings(DisplayFormat::BracketedDayWithDate)), "05/03/24 (today)");
        assert_eq!(cal.display_date(d, &settings(DisplayFormat::DayWithLongDate)), "Today - 5th Mar, 24");
    }

    #[test]
    fn missing_format_defaults_to_short_day_with_date() {
        let cal = calendar();
        let dash = DisplaySettings { format: None, separator: Separator::Dash };
        assert_eq!(cal.display_date("2024-03-07", &dash), "Thu 07-03-24");
    }

    #[test]
    fn raw_patterns_are_a_separate_entry_point() {
        let cal = calendar();
        assert_eq!(cal.display_date_with_pattern("2024-03-07T08:05:00", "YYYY-MM-DD HH:mm"), "2024-03-07 08:05");
        assert!("YYYY-MM-DD".parse::<DisplayFormat>().is_err());
        assert_eq!("bracketeddaywithdate".parse::<DisplayFormat>().unwrap(), DisplayFormat::BracketedDayWithDate);
    }

    #[test]
    fn range_drops_repeated_meridiem() {
        let cal = calendar();
        assert_eq!(cal.display_date_range("2024-03-05T14:00:00", "2024-03-05T15:00:00", None), "2:00 - 3:00pm");
        assert_eq!(cal.display_date_range("2024-03-05T02:00:00", "2024-03-05T15:00:00", None), "2:00am - 3:00pm");
    }

    #[test]
    fn range_renders_question_mark_for_absent_sides() {
        let cal = calendar();
        assert_eq!(cal.display_date_range(None::<&str>, "2024-03-05T15:00:00", None), "? - 3:00pm");
        assert_eq!(cal.display_date_range("2024-03-05T09:30:00", None::<&str>, None), "9:30am - ?");
        assert_eq!(cal.display_date_range(None::<&str>, None::<&str>, None), "? - ?");
    }

    #[test]
    fn range_accepts_explicit_patterns() {
        let cal = calendar();
        let formats = RangeFormats { start: "DD/MM", end: "DD/MM/YY" };
        assert_eq!(cal.display_date_range("2024-03-05", "2024-03-09", Some(formats)), "05/03 - 09/03/24");
    }

    #[test]
    fn range_with_formatters() {
        let cal = calendar();
        let out = cal.display_date_range_with(
            "2024-03-05",
            None::<&str>,
            |d| d.date().to_string(),
            |d| d.date().to_string(),
        );
        assert_eq!(out, "2024-03-05 - ?");
    }

    #[test]
    fn lowercase_first_only_touches_first_char() {
        assert_eq!(lowercase_first("Today"), "today");
        assert_eq!(lowercase_first(""), "");
    }
}
