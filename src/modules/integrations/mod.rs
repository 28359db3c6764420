//! Catalog adapters
//!
//! Each adapter issues a single GET through the shared `HttpTransport` and maps
//! its catalog's dialect into a `BibRecord`.

pub mod google_books;
pub mod ndl;
pub mod openbd;

pub use google_books::GoogleBooksAdapter;
pub use ndl::NdlAdapter;
pub use openbd::OpenBdAdapter;

use std::time::Duration;
use url::Url;

use crate::domain::{HttpTransport, LookupOutcome, Source, SourceError};

/// Parse a request URL built from a configured base.
fn request_url(raw: &str) -> Result<Url, SourceError> {
    Url::parse(raw).map_err(|e| SourceError::Transport(format!("Invalid request URL {}: {}", raw, e)))
}

/// Perform the GET and hand back the body of a 2xx response.
async fn fetch_body(
    transport: &dyn HttpTransport,
    source: Source,
    url: &Url,
    timeout: Duration,
) -> Result<String, SourceError> {
    tracing::debug!("{}: GET {}", source, url);

    let resp = transport.get(url, timeout).await?;
    tracing::debug!("{}: status {}", source, resp.status);

    if !resp.is_success() {
        return Err(SourceError::Status(resp.status));
    }

    Ok(resp.body)
}

/// Log the outcome of one adapter call.
fn log_outcome(source: Source, outcome: &LookupOutcome) {
    match outcome {
        LookupOutcome::Found(record) => {
            tracing::debug!("{}: found \"{}\"", source, record.title())
        }
        LookupOutcome::NotFound => tracing::debug!("{}: no matching record", source),
        LookupOutcome::SourceError(e) => tracing::warn!("{}: {}", source, e),
    }
}
