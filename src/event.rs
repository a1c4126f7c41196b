use chrono::prelude::*;
use chrono::{Duration, LocalResult};
use chrono_tz::Tz;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub begin: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl Event {
    /// Builds an event from a parsed VEVENT.
    ///
    /// Returns `None` when DTSTART is missing or cannot be read.
    pub fn from_ical(event: &IcalEvent) -> Option<Event> {
        let begin = find(event, "DTSTART").and_then(parse_date_time)?;
        let end = find(event, "DTEND")
            .and_then(parse_date_time)
            .or_else(|| {
                find(event, "DURATION")
                    .and_then(|p| p.value.as_deref())
                    .and_then(parse_duration)
                    .map(|duration| begin + duration)
            })
            .unwrap_or(begin);

        Some(Event {
            name: text(event, "SUMMARY").unwrap_or_default(),
            begin,
            end,
            location: text(event, "LOCATION"),
            description: text(event, "DESCRIPTION"),
        })
    }
}

/// Converts every VEVENT, skipping the ones without a usable start.
pub fn parse_events(events: &[IcalEvent]) -> Vec<Event> {
    events
        .iter()
        .filter_map(|event| {
            let parsed = Event::from_ical(event);
            if parsed.is_none() {
                warn!(
                    summary = ?text(event, "SUMMARY"),
                    "skipping event without a readable DTSTART"
                );
            }
            parsed
        })
        .collect()
}

fn find<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a Property> {
    event.properties.iter().find(|p| p.name == name)
}

fn param<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(param_name, _)| param_name == name)
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}

fn text(event: &IcalEvent, name: &str) -> Option<String> {
    find(event, name)?.value.as_deref().map(unescape_text)
}

/// Undoes RFC 5545 TEXT escaping.
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Reads a DTSTART/DTEND value in any of its RFC 5545 forms.
///
/// UTC values keep UTC, `TZID` values are resolved through chrono-tz and
/// floating times and all-day dates are taken as UTC.
fn parse_date_time(property: &Property) -> Option<DateTime<Tz>> {
    let value = property.value.as_deref()?.trim();

    if param(property, "VALUE") == Some("DATE") || value.len() == 8 {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        return Tz::UTC
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .earliest();
    }

    //Try getting an UTC time first
    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        return Some(Tz::UTC.from_utc_datetime(&naive));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;

    //Try using a timezone
    let timezone = match param(property, "TZID") {
        Some(tzid) => tzid.parse::<Tz>().ok().unwrap_or_else(|| {
            warn!(tzid, "unknown time zone, assuming UTC");
            Tz::UTC
        }),
        None => Tz::UTC,
    };
    local_to_zoned(timezone, &naive)
}

/// Places a wall-clock time in `timezone`.
///
/// Ambiguous times take the earlier instant. Times skipped by a forward clock
/// change keep the offset that was in effect before the change, which moves
/// them past the gap.
fn local_to_zoned(timezone: Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    match timezone.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let before = timezone
                .offset_from_local_datetime(&(*naive - Duration::days(1)))
                .earliest()?;
            let utc = *naive - Duration::seconds(i64::from(before.fix().local_minus_utc()));
            Some(timezone.from_utc_datetime(&utc))
        }
    }
}

/// Parses an RFC 5545 DURATION such as `PT1H30M`, `P1W` or `-P1D`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let negative = value.starts_with('-');
    let duration_str = value.trim_start_matches(|c: char| c == '-' || c == '+');

    // A duration needs at least one component.
    if !duration_str.starts_with('P') || !duration_str.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    let duration = iso8601::duration(duration_str).ok()?;
    let std_duration: std::time::Duration = duration.into();
    let duration = Duration::from_std(std_duration).ok()?;

    Some(if negative { -duration } else { duration })
}
