use chrono::prelude::*;

use crate::calendar::Calendar;
use crate::error::{Error, Result};
use crate::event::Event;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|source| Error::InvalidDate {
        input: date.to_string(),
        source,
    })
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

/// Events beginning on `date`, in document order.
///
/// The begin date is taken in the event's own time zone.
pub fn events_on<'a>(date: &str, calendar: &'a Calendar) -> Result<Vec<&'a Event>> {
    let date = parse_date(date)?;
    Ok(calendar
        .events()
        .iter()
        .filter(|event| event.begin.date_naive() == date)
        .collect())
}

/// The first event starting strictly after the current instant.
pub fn next_event(calendar: &Calendar) -> Option<&Event> {
    next_event_after(calendar, Utc::now())
}

/// The first event starting strictly after `now`.
pub fn next_event_after(calendar: &Calendar, now: DateTime<Utc>) -> Option<&Event> {
    calendar
        .timeline()
        .into_iter()
        .find(|event| event.begin.with_timezone(&Utc) > now)
}
