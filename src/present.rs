//! Plain-text rendering of events for the terminal report.

use std::io::Write;

use chrono::NaiveDate;

use crate::error::Result;
use crate::event::Event;

pub const SEPARATOR: &str = "------------------";
pub const NO_UPCOMING_EVENTS: &str = "No upcoming events";

/// Renders one event as a fixed block of lines, each ending in a newline.
pub fn format_event(event: &Event) -> String {
    format!(
        "name: {}\nday: {} ({})\ntime: {} - {}\nlocation: {}\ndescription: {}\n{}\n",
        event.name,
        event.begin.format("%A"),
        event.begin.format("%d"),
        event.begin.format("%H:%M:%S"),
        event.end.format("%H:%M:%S"),
        event.location.as_deref().unwrap_or_default(),
        event
            .description
            .as_deref()
            .map(single_line)
            .unwrap_or_default(),
        SEPARATOR
    )
}

/// Joins the lines of `text` with single spaces.
pub fn single_line(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" ")
}

pub fn no_events_line(date: NaiveDate) -> String {
    format!(
        "No events for day: {} ({})",
        date.format("%A"),
        date.format("%d")
    )
}

/// Prints the "next event" block, or an explicit notice when there is none.
pub fn write_next_event<W: Write + ?Sized>(out: &mut W, event: Option<&Event>) -> Result<()> {
    writeln!(out, "next event:")?;
    match event {
        Some(event) => write!(out, "{}", format_event(event))?,
        None => writeln!(out, "{}", NO_UPCOMING_EVENTS)?,
    }
    Ok(())
}

/// Prints every event of `date`, or the "no events" line for that day.
pub fn write_events_on<W: Write + ?Sized>(
    out: &mut W,
    date: NaiveDate,
    events: &[&Event],
) -> Result<()> {
    writeln!(out, "today's events:")?;
    if events.is_empty() {
        writeln!(out, "{}", no_events_line(date))?;
    }
    for event in events {
        write!(out, "{}", format_event(event))?;
    }
    Ok(())
}
