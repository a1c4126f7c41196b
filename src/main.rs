use std::io;
use std::process::ExitCode;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use timetable::{app, Config, HttpFetcher};

fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: cannot load .env: {}", e);
        }
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> timetable::Result<()> {
    let config = Config::from_env()?;
    let fetcher = HttpFetcher::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    app::run(&config, &fetcher, &mut out)
}
