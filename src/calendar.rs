//! Loading, parsing and persisting the calendar document.

use std::fs;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use ical::generator::Emitter;
use ical::parser::ical::component::IcalCalendar;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::event::{parse_events, Event};
use crate::fetch::Fetch;

/// A parsed calendar and the events read from it.
///
/// The raw component tree is kept so the document can be written back out.
#[derive(Debug)]
pub struct Calendar {
    raw: IcalCalendar,
    events: Vec<Event>,
}

impl Calendar {
    /// Parses iCalendar text. Only the first VCALENDAR is used.
    pub fn parse(text: &str) -> Result<Calendar> {
        let bf = BufReader::new(text.as_bytes());
        let mut reader = ical::IcalParser::new(bf);
        let raw = reader.next().ok_or(Error::NoCalendar)??;
        if reader.next().is_some() {
            warn!("ignoring additional VCALENDAR blocks");
        }

        let events = parse_events(&raw.events);
        debug!(events = events.len(), "calendar parsed");
        Ok(Calendar { raw, events })
    }

    /// Reads and parses a local calendar file.
    pub fn read(path: &Path) -> Result<Calendar> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Calendar::parse(&text)
    }

    /// Events in the order they appear in the document.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events ordered by begin time. Events sharing a begin time keep their
    /// document order.
    pub fn timeline(&self) -> Vec<&Event> {
        let mut timeline: Vec<&Event> = self.events.iter().collect();
        timeline.sort_by(|a, b| a.begin.cmp(&b.begin));
        timeline
    }

    /// Serializes the calendar back to iCalendar text with CRLF line breaks.
    pub fn to_ics(&self) -> String {
        to_crlf(&self.raw.generate())
    }

    /// Replaces `path` with the serialized calendar.
    ///
    /// The text goes to a temporary sibling first and is renamed over the
    /// target, so an interrupted run never leaves a truncated file behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let temp_path = temp_path(path);
        let written = fs::write(&temp_path, self.to_ics())
            .map_err(|e| Error::io(&temp_path, e))
            .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        debug!(path = %path.display(), "calendar saved");
        Ok(())
    }
}

/// Rewrites every line break as CRLF.
fn to_crlf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Loads the calendar from `url` if given, otherwise from `filename`.
///
/// A non-200 response or having neither source is reported on `out` and
/// yields `Ok(None)`. Transport, file and parse failures are errors.
pub fn load<F, W>(
    fetcher: &F,
    url: Option<&str>,
    filename: Option<&Path>,
    out: &mut W,
) -> Result<Option<Calendar>>
where
    F: Fetch + ?Sized,
    W: Write + ?Sized,
{
    if let Some(url) = url {
        let response = fetcher.fetch(url)?;
        if !response.is_ok() {
            writeln!(
                out,
                "error loading calendar (status code: {})",
                response.status
            )?;
            return Ok(None);
        }
        let calendar = Calendar::parse(&response.body)?;
        writeln!(out, "calendar loaded successfully")?;
        Ok(Some(calendar))
    } else if let Some(filename) = filename {
        let calendar = Calendar::read(filename)?;
        writeln!(out, "calendar read successfully")?;
        Ok(Some(calendar))
    } else {
        writeln!(out, "error creating calendar: no url or filename given")?;
        Ok(None)
    }
}

/// Persists the calendar and reports it on `out`.
pub fn save<W: Write + ?Sized>(calendar: &Calendar, path: &Path, out: &mut W) -> Result<()> {
    calendar.save(path)?;
    writeln!(out, "calendar saved successfully")?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetch::Response;
    use std::cell::RefCell;

    pub(crate) const MATH_ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Timetable//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:math-1@example.com\r\n\
SUMMARY:Math\r\n\
DTSTART:20250126T100000Z\r\n\
DTEND:20250126T110000Z\r\n\
LOCATION:Room A\r\n\
DESCRIPTION:Chapter 3\\nBring a calculator\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    pub(crate) struct StubFetcher {
        pub response: Response,
        pub requested: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        pub(crate) fn new(status: u16, body: &str) -> Self {
            StubFetcher {
                response: Response {
                    status,
                    body: String::from(body),
                },
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetch for StubFetcher {
        fn fetch(&self, url: &str) -> Result<Response> {
            self.requested.borrow_mut().push(String::from(url));
            Ok(self.response.clone())
        }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn parse_reads_events() {
        let calendar = Calendar::parse(MATH_ICS).unwrap();
        assert_eq!(calendar.events().len(), 1);
        let event = &calendar.events()[0];
        assert_eq!(event.name, "Math");
        assert_eq!(event.location.as_deref(), Some("Room A"));
    }

    #[test]
    fn parse_rejects_text_without_calendar() {
        assert!(matches!(Calendar::parse(""), Err(Error::NoCalendar)));
    }

    #[test]
    fn parse_rejects_malformed_text() {
        let text = "BEGIN:VTODO\r\nSUMMARY:no calendar header\r\nEND:VTODO\r\n";
        assert!(matches!(Calendar::parse(text), Err(Error::Parse(_))));
    }

    #[test]
    fn timeline_sorts_by_begin_and_keeps_ties_stable() {
        let text = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\nSUMMARY:late\r\nDTSTART:20250126T150000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nSUMMARY:early-a\r\nDTSTART:20250126T080000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nSUMMARY:paris\r\nDTSTART;TZID=Europe/Paris:20250126T100000\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nSUMMARY:early-b\r\nDTSTART:20250126T080000Z\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";
        let calendar = Calendar::parse(text).unwrap();

        let names: Vec<&str> = calendar.timeline().into_iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["early-a", "early-b", "paris", "late"]);

        let names: Vec<&str> = calendar.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["late", "early-a", "paris", "early-b"]);
    }

    #[test]
    fn load_from_url_on_200() {
        let fetcher = StubFetcher::new(200, MATH_ICS);
        let mut out = Vec::new();

        let calendar = load(
            &fetcher,
            Some("https://example.com/cal"),
            Some(Path::new("does-not-exist.ics")),
            &mut out,
        )
        .unwrap()
        .unwrap();

        assert_eq!(calendar.events().len(), 1);
        assert_eq!(*fetcher.requested.borrow(), vec!["https://example.com/cal"]);
        assert_eq!(output(out), "calendar loaded successfully\n");
    }

    #[test]
    fn load_reports_http_failure() {
        let fetcher = StubFetcher::new(404, "not found");
        let mut out = Vec::new();

        let calendar = load(&fetcher, Some("https://example.com/cal"), None, &mut out).unwrap();

        assert!(calendar.is_none());
        assert_eq!(output(out), "error loading calendar (status code: 404)\n");
    }

    #[test]
    fn load_falls_back_to_file_without_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calendar.ics");
        fs::write(&path, MATH_ICS).unwrap();
        let fetcher = StubFetcher::new(500, "");
        let mut out = Vec::new();

        let calendar = load(&fetcher, None, Some(path.as_path()), &mut out).unwrap().unwrap();

        assert_eq!(calendar.events()[0].name, "Math");
        assert!(fetcher.requested.borrow().is_empty());
        assert_eq!(output(out), "calendar read successfully\n");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calendar.ics");
        let fetcher = StubFetcher::new(200, "");

        let err = load(&fetcher, None, Some(path.as_path()), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn load_without_any_source() {
        let fetcher = StubFetcher::new(200, MATH_ICS);
        let mut out = Vec::new();

        let calendar = load(&fetcher, None, None, &mut out).unwrap();

        assert!(calendar.is_none());
        assert!(fetcher.requested.borrow().is_empty());
        assert_eq!(
            output(out),
            "error creating calendar: no url or filename given\n"
        );
    }

    #[test]
    fn save_then_reload_keeps_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calendar.ics");
        fs::write(&path, "stale content that must disappear").unwrap();
        let calendar = Calendar::parse(MATH_ICS).unwrap();
        let mut out = Vec::new();

        save(&calendar, &path, &mut out).unwrap();

        assert_eq!(output(out), "calendar saved successfully\n");
        assert!(!dir.path().join(".calendar.ics.tmp").exists());
        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(saved.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(saved.matches('\n').count(), saved.matches("\r\n").count());
        let reloaded = Calendar::read(&path).unwrap();
        assert_eq!(reloaded.events(), calendar.events());
    }

    #[test]
    fn failed_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // Renaming a file over a non-empty directory fails.
        let target = dir.path().join("calendar.ics");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "").unwrap();
        let calendar = Calendar::parse(MATH_ICS).unwrap();

        let err = calendar.save(&target).unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert!(!dir.path().join(".calendar.ics.tmp").exists());
        assert!(target.join("keep").exists());
    }

    #[test]
    fn crlf_conversion_is_idempotent() {
        assert_eq!(to_crlf("A\nB\r\nC\n"), "A\r\nB\r\nC\r\n");
        assert_eq!(to_crlf("A\r\n"), "A\r\n");
    }

    #[test]
    fn temp_file_sits_next_to_target() {
        assert_eq!(
            temp_path(Path::new("/tmp/x/calendar.ics")),
            PathBuf::from("/tmp/x/.calendar.ics.tmp")
        );
    }
}
