use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required environment variable is unset or empty.
    #[error("configuration error: {var} is not set")]
    MissingVar { var: &'static str },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the report to the output stream failed.
    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("malformed calendar: {0}")]
    Parse(#[from] ical::parser::ParserError),

    #[error("no VCALENDAR found in calendar text")]
    NoCalendar,

    #[error("invalid date {input:?}, expected YYYY-MM-DD")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
