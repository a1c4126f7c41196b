//! Fetches an iCalendar timetable and reports today's events and the next
//! upcoming one.

pub mod app;
pub mod calendar;
pub mod config;
pub mod error;
pub mod event;
pub mod fetch;
pub mod present;
pub mod query;

pub use calendar::Calendar;
pub use config::{resolve, Config};
pub use error::{Error, Result};
pub use event::Event;
pub use fetch::{Fetch, HttpFetcher, Response};
pub use query::{events_on, next_event};
