use tracing::debug;

use crate::error::Result;

/// Status code and body text of a single GET.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Something that can download calendar text.
///
/// Transport failures are errors; any HTTP status, including 4xx and 5xx,
/// is a successful fetch that the caller has to inspect.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Response>;
}

/// Blocking HTTP fetcher with client defaults.
#[derive(Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Response> {
        debug!(url, "fetching calendar");
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!(status, bytes = body.len(), "calendar response received");
        Ok(Response { status, body })
    }
}
