//! Compact `DD-MM-YY` serialisation and lenient day parsing.

use once_cell::sync::Lazy;

use crate::api::EventCalendar;
use crate::format::pattern::Pattern;
use crate::instant::Instant;

/// Format written by [`serialise_date`].
pub const SERIALISE_DATE_FORMAT: &str = "DD-MM-YY";

/// Day patterns tried by [`EventCalendar::deserialise_date`], in order.
pub static DATE_FORMAT_STRINGS: Lazy<Vec<String>> = Lazy::new(|| {
    let mut formats = Vec::with_capacity(16);
    for day in ["D", "DD"] {
        for month in ["M", "MM"] {
            for year in ["YY", "YYYY"] {
                for sep in ["-", "/"] {
                    formats.push(format!("{day}{sep}{month}{sep}{year}"));
                }
            }
        }
    }
    formats
});

static DATE_PATTERNS: Lazy<Vec<Pattern>> =
    Lazy::new(|| DATE_FORMAT_STRINGS.iter().map(|f| Pattern::compile(f)).collect());

static SERIALISE_PATTERN: Lazy<Pattern> = Lazy::new(|| Pattern::compile(SERIALISE_DATE_FORMAT));

/// `DD-MM-YY` of `d`'s own wall clock.
pub fn serialise_date(d: &Instant) -> String {
    SERIALISE_PATTERN.render(&d.datetime())
}

impl EventCalendar {
    /// Event-offset midnight of the first day pattern that matches `s`.
    ///
    /// Two-digit years `00..=68` are 20xx and `69..=99` are 19xx. Matches
    /// must cover the whole (trimmed) input and name a real calendar date.
    pub fn deserialise_date(&self, s: &str) -> Option<Instant> {
        for pattern in DATE_PATTERNS.iter() {
            match pattern.parse(s) {
                Some(wall) => {
                    tracing::trace!(input = s, pattern = pattern.source(), "day pattern matched");
                    return self.at_date(wall.date());
                }
                None => tracing::trace!(input = s, pattern = pattern.source(), "day pattern rejected"),
            }
        }
        tracing::debug!(input = s, "no day pattern matched");
        None
    }
}
