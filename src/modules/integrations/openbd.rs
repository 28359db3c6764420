//! openBD (api.openbd.jp) book-data lookup
//!
//! The `get` endpoint answers with one array slot per requested ISBN; an unknown
//! ISBN comes back as `[null]`.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::{fetch_body, log_outcome, request_url};
use crate::domain::{BibRecord, HttpTransport, Isbn, LookupOutcome, Source, SourceAdapter, SourceError};

#[derive(Debug, Deserialize)]
struct OpenBdEntry {
    summary: Option<OpenBdSummary>,
    // onix, hanmoto, ... are not mapped but still make an entry non-empty
    #[serde(flatten)]
    other: serde_json::Map<String, serde_json::Value>,
}

impl OpenBdEntry {
    fn is_empty(&self) -> bool {
        self.summary.is_none() && self.other.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct OpenBdSummary {
    title: Option<String>,
    author: Option<String>,
    publisher: Option<String>,
    pubdate: Option<String>,
    isbn: Option<String>,
}

pub struct OpenBdAdapter {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl OpenBdAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, isbn: &Isbn, timeout: Duration) -> Result<Option<BibRecord>, SourceError> {
        let url = request_url(&format!(
            "{}/get?isbn={}",
            self.base_url,
            urlencoding::encode(isbn.as_str())
        ))?;

        let body = fetch_body(self.transport.as_ref(), Source::OpenBd, &url, timeout).await?;
        parse_entries(&body, isbn)
    }
}

#[async_trait]
impl SourceAdapter for OpenBdAdapter {
    fn source(&self) -> Source {
        Source::OpenBd
    }

    async fn query(&self, isbn: &Isbn, timeout: Duration) -> LookupOutcome {
        let outcome: LookupOutcome = self.fetch(isbn, timeout).await.into();
        log_outcome(Source::OpenBd, &outcome);
        outcome
    }
}

/// Map the first array slot. The summary fields are copied as-is; the ISBN is the
/// one openBD states, falling back to the queried one.
fn parse_entries(body: &str, isbn: &Isbn) -> Result<Option<BibRecord>, SourceError> {
    let entries: Vec<Option<OpenBdEntry>> = serde_json::from_str(body)?;

    let Some(entry) = entries.into_iter().next().flatten() else {
        return Ok(None);
    };
    if entry.is_empty() {
        return Ok(None);
    }

    let summary = entry.summary.unwrap_or_default();
    let stated_isbn = summary
        .isbn
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| isbn.to_string());

    Ok(Some(
        BibRecord::new(Source::OpenBd, stated_isbn)
            .with_title(summary.title)
            .with_author(summary.author)
            .with_publisher(summary.publisher)
            .with_pubdate(summary.pubdate),
    ))
}
