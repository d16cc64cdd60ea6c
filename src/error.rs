use thiserror::Error;

/// Errors surfaced by configuration and range validation.
///
/// Coercion and parsing never produce these: they return `None` and leave the
/// "what to do with an absent date" decision to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{var} is not set; expected the event UTC offset in minutes")]
    MissingOffset { var: &'static str },

    #[error("invalid event UTC offset '{value}': expected an integer number of minutes")]
    MalformedOffset { value: String },

    #[error("event UTC offset {minutes} is outside the supported range {min}..={max} minutes")]
    OffsetOutOfRange { minutes: i32, min: i32, max: i32 },

    #[error("an event UTC offset ({minutes} minutes) is already installed for this process")]
    AlreadyInstalled { minutes: i32 },

    #[error("no event UTC offset has been installed for this process")]
    NotInstalled,

    #[error("unknown display format '{name}'")]
    UnknownFormat { name: String },

    #[error("start {start} cannot be after end {end}")]
    InvalidRange { start: String, end: String },
}

pub type Result<T> = std::result::Result<T, Error>;
