//! dayjs-style format patterns.
//!
//! A pattern is a string of tokens (`YYYY`, `MM`, `Do`, `ddd`, `hh`, `a`, ...)
//! mixed with literal text. Text inside `[...]` is always literal, which is how
//! presets inject labels such as `Today` without the letters being read as
//! tokens.
//!
//! The same compiled pattern renders instants and, when it only contains
//! numeric tokens, parses strings back. The parser is anchored: the whole
//! input must match and the fields must form a real calendar date.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::OnceCell;
use regex::Regex;

bitflags::bitflags! {
    /// Calendar fields mentioned by a pattern.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Fields: u16 {
        const YEAR     = 1 << 0;
        const MONTH    = 1 << 1;
        const DAY      = 1 << 2;
        const WEEKDAY  = 1 << 3;
        const HOUR     = 1 << 4;
        const MINUTE   = 1 << 5;
        const SECOND   = 1 << 6;
        const MILLIS   = 1 << 7;
        const MERIDIEM = 1 << 8;
        const OFFSET   = 1 << 9;

        const DATE = Self::YEAR.bits() | Self::MONTH.bits() | Self::DAY.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Year4,
    Year2,
    MonthName,
    MonthShort,
    Month2,
    Month,
    DayOrdinal,
    Day2,
    Day,
    WeekdayName,
    WeekdayShort,
    WeekdayMin,
    WeekdayNumber,
    Hour24Padded,
    Hour24,
    Hour12Padded,
    Hour12,
    Minute2,
    Minute,
    Second2,
    Second,
    Millis,
    MeridiemUpper,
    MeridiemLower,
    OffsetColon,
    OffsetCompact,
}

impl Token {
    fn from_symbol(symbol: &str) -> Option<Token> {
        let token = match symbol {
            "YYYY" => Token::Year4,
            "YY" => Token::Year2,
            "MMMM" => Token::MonthName,
            "MMM" => Token::MonthShort,
            "MM" => Token::Month2,
            "M" => Token::Month,
            "Do" => Token::DayOrdinal,
            "DD" => Token::Day2,
            "D" => Token::Day,
            "dddd" => Token::WeekdayName,
            "ddd" => Token::WeekdayShort,
            "dd" => Token::WeekdayMin,
            "d" => Token::WeekdayNumber,
            "HH" => Token::Hour24Padded,
            "H" => Token::Hour24,
            "hh" => Token::Hour12Padded,
            "h" => Token::Hour12,
            "mm" => Token::Minute2,
            "m" => Token::Minute,
            "ss" => Token::Second2,
            "s" => Token::Second,
            "SSS" => Token::Millis,
            "A" => Token::MeridiemUpper,
            "a" => Token::MeridiemLower,
            "ZZ" => Token::OffsetCompact,
            "Z" => Token::OffsetColon,
            _ => return None,
        };
        Some(token)
    }

    pub fn field(self) -> Fields {
        match self {
            Token::Year4 | Token::Year2 => Fields::YEAR,
            Token::MonthName | Token::MonthShort | Token::Month2 | Token::Month => Fields::MONTH,
            Token::DayOrdinal | Token::Day2 | Token::Day => Fields::DAY,
            Token::WeekdayName | Token::WeekdayShort | Token::WeekdayMin | Token::WeekdayNumber => Fields::WEEKDAY,
            Token::Hour24Padded | Token::Hour24 | Token::Hour12Padded | Token::Hour12 => Fields::HOUR,
            Token::Minute2 | Token::Minute => Fields::MINUTE,
            Token::Second2 | Token::Second => Fields::SECOND,
            Token::Millis => Fields::MILLIS,
            Token::MeridiemUpper | Token::MeridiemLower => Fields::MERIDIEM,
            Token::OffsetColon | Token::OffsetCompact => Fields::OFFSET,
        }
    }

    fn render(self, dt: &DateTime<FixedOffset>) -> String {
        match self {
            Token::Year4 => format!("{:04}", dt.year()),
            Token::Year2 => format!("{:02}", dt.year().rem_euclid(100)),
            Token::MonthName => dt.format("%B").to_string(),
            Token::MonthShort => dt.format("%b").to_string(),
            Token::Month2 => format!("{:02}", dt.month()),
            Token::Month => dt.month().to_string(),
            Token::DayOrdinal => format!("{}{}", dt.day(), ordinal_suffix(dt.day())),
            Token::Day2 => format!("{:02}", dt.day()),
            Token::Day => dt.day().to_string(),
            Token::WeekdayName => dt.format("%A").to_string(),
            Token::WeekdayShort => dt.format("%a").to_string(),
            Token::WeekdayMin => dt.format("%a").to_string().chars().take(2).collect(),
            Token::WeekdayNumber => dt.weekday().num_days_from_sunday().to_string(),
            Token::Hour24Padded => format!("{:02}", dt.hour()),
            Token::Hour24 => dt.hour().to_string(),
            Token::Hour12Padded => format!("{:02}", twelve_hour(dt.hour())),
            Token::Hour12 => twelve_hour(dt.hour()).to_string(),
            Token::Minute2 => format!("{:02}", dt.minute()),
            Token::Minute => dt.minute().to_string(),
            Token::Second2 => format!("{:02}", dt.second()),
            Token::Second => dt.second().to_string(),
            Token::Millis => format!("{:03}", dt.timestamp_subsec_millis().min(999)),
            Token::MeridiemUpper => (if dt.hour() < 12 { "AM" } else { "PM" }).to_string(),
            Token::MeridiemLower => (if dt.hour() < 12 { "am" } else { "pm" }).to_string(),
            Token::OffsetColon => dt.format("%:z").to_string(),
            Token::OffsetCompact => dt.format("%z").to_string(),
        }
    }

    /// Regex fragment with exactly one capture group, or `None` when the token
    /// can't be parsed back.
    fn capture(self) -> Option<&'static str> {
        let fragment = match self {
            Token::Year4 => r"(\d{4})",
            Token::Year2 | Token::Month2 | Token::Day2 => r"(\d{2})",
            Token::Month | Token::Day => r"(\d{1,2})",
            Token::DayOrdinal => r"(\d{1,2})(?:st|nd|rd|th)",
            Token::Hour24Padded | Token::Hour12Padded | Token::Minute2 | Token::Second2 => r"(\d{2})",
            Token::Hour24 | Token::Hour12 | Token::Minute | Token::Second => r"(\d{1,2})",
            Token::Millis => r"(\d{3})",
            Token::MeridiemUpper | Token::MeridiemLower => r"([AaPp][Mm])",
            _ => return None,
        };
        Some(fragment)
    }
}

fn twelve_hour(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

/// English ordinal suffix: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st, ...
pub fn ordinal_suffix(n: u32) -> &'static str {
    const SUFFIXES: [&str; 4] = ["th", "st", "nd", "rd"];
    let v = (n % 100) as usize;
    if (11..=13).contains(&v) {
        return SUFFIXES[0];
    }
    SUFFIXES.get(v % 10).copied().unwrap_or(SUFFIXES[0])
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Literal(String),
    Field(Token),
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    items: Vec<Item>,
    fields: Fields,
    parser: OnceCell<Option<Regex>>,
}

impl Pattern {
    /// Split `source` into tokens and literals. Never fails: anything that is
    /// not a token is kept as literal text.
    pub fn compile(source: &str) -> Pattern {
        let tokens = crate::regex!(
            r"\[([^\]]*)\]|YYYY|YY|MMMM|MMM|MM|M|Do|DD|D|dddd|ddd|dd|d|HH|H|hh|h|mm|m|ss|s|SSS|A|a|ZZ|Z"
        );

        let mut items = Vec::new();
        let mut fields = Fields::empty();
        let mut cursor = 0;

        for caps in tokens.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > cursor {
                push_literal(&mut items, &source[cursor..whole.start()]);
            }
            cursor = whole.end();

            if let Some(escaped) = caps.get(1) {
                push_literal(&mut items, escaped.as_str());
                continue;
            }
            match Token::from_symbol(whole.as_str()) {
                Some(token) => {
                    fields |= token.field();
                    items.push(Item::Field(token));
                }
                None => push_literal(&mut items, whole.as_str()),
            }
        }
        if cursor < source.len() {
            push_literal(&mut items, &source[cursor..]);
        }

        Pattern { source: source.to_string(), items, fields, parser: OnceCell::new() }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn fields(&self) -> Fields {
        self.fields
    }

    pub fn render(&self, dt: &DateTime<FixedOffset>) -> String {
        let mut out = String::with_capacity(self.source.len() + 8);
        for item in &self.items {
            match item {
                Item::Literal(text) => out.push_str(text),
                Item::Field(token) => out.push_str(&token.render(dt)),
            }
        }
        out
    }

    /// True when every token has a numeric (or am/pm) reading and the pattern
    /// names a full date.
    pub fn is_parseable(&self) -> bool {
        self.parser().is_some()
    }

    /// Parse `input` as wall-clock fields. Missing time fields default to zero.
    pub fn parse(&self, input: &str) -> Option<NaiveDateTime> {
        let re = self.parser()?;
        let caps = re.captures(input.trim())?;

        let mut parts = Parts::default();
        let field_tokens = self.items.iter().filter_map(|item| match item {
            Item::Field(token) => Some(*token),
            Item::Literal(_) => None,
        });
        for (idx, token) in field_tokens.enumerate() {
            parts.set(token, caps.get(idx + 1)?.as_str())?;
        }
        parts.resolve()
    }

    fn parser(&self) -> Option<&Regex> {
        self.parser.get_or_init(|| self.build_parser()).as_ref()
    }

    fn build_parser(&self) -> Option<Regex> {
        if !self.fields.contains(Fields::DATE) {
            return None;
        }
        let mut src = String::from("^");
        for item in &self.items {
            match item {
                Item::Literal(text) => src.push_str(&regex::escape(text)),
                Item::Field(token) => src.push_str(token.capture()?),
            }
        }
        src.push('$');

        match Regex::new(&src) {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::warn!(pattern = %self.source, error = %err, "pattern parser failed to compile");
                None
            }
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

fn push_literal(items: &mut Vec<Item>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Item::Literal(prev)) = items.last_mut() {
        prev.push_str(text);
    } else {
        items.push(Item::Literal(text.to_string()));
    }
}

#[derive(Debug, Default)]
struct Parts {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    millis: Option<u32>,
    pm: Option<bool>,
}

impl Parts {
    fn set(&mut self, token: Token, text: &str) -> Option<()> {
        match token {
            Token::Year4 => self.year = Some(text.parse().ok()?),
            Token::Year2 => self.year = Some(expand_two_digit_year(text.parse().ok()?)),
            Token::Month2 | Token::Month => self.month = Some(text.parse().ok()?),
            Token::DayOrdinal | Token::Day2 | Token::Day => self.day = Some(text.parse().ok()?),
            Token::Hour24Padded | Token::Hour24 | Token::Hour12Padded | Token::Hour12 => {
                self.hour = Some(text.parse().ok()?)
            }
            Token::Minute2 | Token::Minute => self.minute = Some(text.parse().ok()?),
            Token::Second2 | Token::Second => self.second = Some(text.parse().ok()?),
            Token::Millis => self.millis = Some(text.parse().ok()?),
            Token::MeridiemUpper | Token::MeridiemLower => self.pm = Some(text.eq_ignore_ascii_case("pm")),
            _ => return None,
        }
        Some(())
    }

    fn resolve(self) -> Option<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)?;
        let mut hour = self.hour.unwrap_or(0);
        if let Some(pm) = self.pm {
            if !(1..=12).contains(&hour) {
                return None;
            }
            hour = hour % 12 + if pm { 12 } else { 0 };
        }
        date.and_hms_milli_opt(hour, self.minute.unwrap_or(0), self.second.unwrap_or(0), self.millis.unwrap_or(0))
    }
}

/// `00..=68` map to 2000s, `69..=99` to 1900s.
pub fn expand_two_digit_year(yy: i32) -> i32 {
    yy + if yy > 68 { 1900 } else { 2000 }
}
