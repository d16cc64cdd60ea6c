//! Event offset configuration.
//!
//! Every day/time computation in this crate is relative to one fixed UTC
//! offset. The offset is validated when it is constructed, so a missing or
//! malformed setting fails at startup instead of leaking into arithmetic.
//!
//! A process can [`install`] one offset as its global value; sessions built
//! with [`EventCalendar::from_installed`](crate::EventCalendar::from_installed)
//! pick it up from there.

use crate::error::{Error, Result};
use chrono::FixedOffset;
use std::env::VarError;
use once_cell::sync::OnceCell;

/// Environment variable holding the event offset in minutes.
pub const EVENT_UTC_OFFSET_VAR: &str = "EVENT_UTC_OFFSET";

/// Smallest accepted offset (UTC-12:00).
pub const MIN_OFFSET_MINUTES: i32 = -12 * 60;
/// Largest accepted offset (UTC+14:00).
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

static INSTALLED: OnceCell<EventOffset> = OnceCell::new();

/// A validated UTC offset, in whole minutes east of UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventOffset {
    minutes: i32,
    fixed: FixedOffset,
}

impl EventOffset {
    /// Validate `minutes` and build an offset.
    pub fn new(minutes: i32) -> Result<Self> {
        if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(Error::OffsetOutOfRange { minutes, min: MIN_OFFSET_MINUTES, max: MAX_OFFSET_MINUTES });
        }
        let fixed = FixedOffset::east_opt(minutes * 60).ok_or(Error::OffsetOutOfRange {
            minutes,
            min: MIN_OFFSET_MINUTES,
            max: MAX_OFFSET_MINUTES,
        })?;
        Ok(Self { minutes, fixed })
    }

    /// Parse a setting such as `"600"`, `"+600"` or `"-300"`.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let minutes = trimmed.parse::<i32>().map_err(|_| Error::MalformedOffset { value: value.to_string() })?;
        Self::new(minutes)
    }

    /// Read and validate [`EVENT_UTC_OFFSET_VAR`].
    pub fn from_env() -> Result<Self> {
        Self::from_var(EVENT_UTC_OFFSET_VAR)
    }

    /// Read and validate the offset held in the environment variable `var`.
    pub fn from_var(var: &'static str) -> Result<Self> {
        Self::from_lookup(var, std::env::var(var))
    }

    fn from_lookup(var: &'static str, lookup: std::result::Result<String, VarError>) -> Result<Self> {
        match lookup {
            Ok(value) => Self::parse(&value),
            Err(VarError::NotPresent) => Err(Error::MissingOffset { var }),
            Err(VarError::NotUnicode(raw)) => Err(Error::MalformedOffset { value: raw.to_string_lossy().into_owned() }),
        }
    }

    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    pub fn fixed(&self) -> FixedOffset {
        self.fixed
    }
}

impl std::fmt::Display for EventOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fixed)
    }
}

/// Install `offset` as the process-wide event offset.
///
/// Installing the same value twice is accepted; a different value is rejected
/// because the offset must stay constant for the lifetime of the process.
pub fn install(offset: EventOffset) -> Result<EventOffset> {
    let current = *INSTALLED.get_or_init(|| {
        tracing::info!(minutes = offset.minutes(), "installed event UTC offset");
        offset
    });
    if current != offset {
        return Err(Error::AlreadyInstalled { minutes: current.minutes() });
    }
    Ok(current)
}

/// Read [`EVENT_UTC_OFFSET_VAR`] and install it.
pub fn install_from_env() -> Result<EventOffset> {
    install(EventOffset::from_env()?)
}

/// The installed process-wide offset.
pub fn installed() -> Result<EventOffset> {
    INSTALLED.get().copied().ok_or(Error::NotInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn parses_signed_minutes() {
        assert_eq!(EventOffset::parse("600").unwrap().minutes(), 600);
        assert_eq!(EventOffset::parse(" +570 ").unwrap().minutes(), 570);
        assert_eq!(EventOffset::parse("-300").unwrap().minutes(), -300);
    }

    #[test]
    fn rejects_non_numeric_setting() {
        let err = EventOffset::parse("ten hours").unwrap_err();
        assert_eq!(err, Error::MalformedOffset { value: "ten hours".to_string() });
        assert!(EventOffset::parse("").is_err());
        assert!(EventOffset::parse("10.5").is_err());
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        assert!(matches!(EventOffset::new(841), Err(Error::OffsetOutOfRange { minutes: 841, .. })));
        assert!(matches!(EventOffset::new(-721), Err(Error::OffsetOutOfRange { .. })));
        assert!(EventOffset::new(MAX_OFFSET_MINUTES).is_ok());
        assert!(EventOffset::new(MIN_OFFSET_MINUTES).is_ok());
    }

    #[test]
    fn unset_variable_is_missing_offset() {
        const UNSET: &str = "EVTZ_TEST_OFFSET_THAT_IS_NEVER_SET";
        assert_eq!(EventOffset::from_var(UNSET), Err(Error::MissingOffset { var: UNSET }));
        assert_eq!(
            Error::MissingOffset { var: UNSET }.to_string(),
            "EVTZ_TEST_OFFSET_THAT_IS_NEVER_SET is not set; expected the event UTC offset in minutes"
        );
    }

    #[test]
    fn variable_values_are_validated() {
        let var = EVENT_UTC_OFFSET_VAR;
        assert_eq!(EventOffset::from_lookup(var, Ok("-300".to_string())).unwrap().minutes(), -300);
        assert_eq!(
            EventOffset::from_lookup(var, Err(VarError::NotUnicode(OsString::from("6o0")))),
            Err(Error::MalformedOffset { value: "6o0".to_string() })
        );
        assert!(matches!(
            EventOffset::from_lookup(var, Ok("900".to_string())),
            Err(Error::OffsetOutOfRange { minutes: 900, .. })
        ));
        assert_eq!(
            EventOffset::from_lookup(var, Err(VarError::NotPresent)),
            Err(Error::MissingOffset { var: EVENT_UTC_OFFSET_VAR })
        );
    }

    #[test]
    fn displays_as_fixed_offset() {
        assert_eq!(EventOffset::new(600).unwrap().to_string(), "+10:00");
        assert_eq!(EventOffset::new(-210).unwrap().to_string(), "-03:30");
    }

    #[test]
    fn install_is_write_once() {
        let offset = EventOffset::new(600).unwrap();
        assert_eq!(install(offset).unwrap(), offset);
        assert_eq!(install(offset).unwrap(), offset);
        assert_eq!(installed().unwrap(), offset);

        let other = EventOffset::new(660).unwrap();
        assert_eq!(install(other).unwrap_err(), Error::AlreadyInstalled { minutes: 600 });
    }
}
