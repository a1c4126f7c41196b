use std::io::Write;

use chrono::prelude::*;
use tracing::{debug, info};

use crate::calendar;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetch;
use crate::present;
use crate::query;

/// Loads the calendar, saves it locally and prints the next event followed
/// by today's events.
pub fn run<F, W>(config: &Config, fetcher: &F, out: &mut W) -> Result<()>
where
    F: Fetch + ?Sized,
    W: Write + ?Sized,
{
    run_at(config, fetcher, out, Utc::now(), &query::today())
}

/// Same as [`run`] with the current instant and day supplied by the caller.
pub fn run_at<F, W>(
    config: &Config,
    fetcher: &F,
    out: &mut W,
    now: DateTime<Utc>,
    today: &str,
) -> Result<()>
where
    F: Fetch + ?Sized,
    W: Write + ?Sized,
{
    let url = config.url();
    debug!(url = ?url, file = %config.calendar_file.display(), "loading calendar");

    let calendar = match calendar::load(
        fetcher,
        url.as_deref(),
        Some(config.calendar_file.as_path()),
        out,
    )? {
        Some(calendar) => calendar,
        None => {
            writeln!(out, "error creating calendar")?;
            return Ok(());
        }
    };
    info!(events = calendar.events().len(), "calendar loaded");

    calendar::save(&calendar, &config.calendar_file, out)?;

    present::write_next_event(out, query::next_event_after(&calendar, now))?;

    let events = query::events_on(today, &calendar)?;
    present::write_events_on(out, query::parse_date(today)?, &events)?;
    Ok(())
}
