use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::{fetch_body, log_outcome, request_url};
use crate::domain::{BibRecord, HttpTransport, Isbn, LookupOutcome, Source, SourceAdapter, SourceError};

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(rename = "totalItems", default)]
    total_items: i64,
    items: Option<Vec<VolumeItem>>,
}

#[derive(Debug, Deserialize)]
struct VolumeItem {
    #[serde(rename = "volumeInfo")]
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
    description: Option<String>,
}

/// Google Books volumes search (`q=isbn:`)
pub struct GoogleBooksAdapter {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl GoogleBooksAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, isbn: &Isbn, timeout: Duration) -> Result<Option<BibRecord>, SourceError> {
        let url = request_url(&format!(
            "{}/volumes?q=isbn:{}",
            self.base_url,
            urlencoding::encode(isbn.as_str())
        ))?;

        let body = fetch_body(self.transport.as_ref(), Source::GoogleBooks, &url, timeout).await?;
        parse_volumes(&body, isbn)
    }
}

#[async_trait]
impl SourceAdapter for GoogleBooksAdapter {
    fn source(&self) -> Source {
        Source::GoogleBooks
    }

    async fn query(&self, isbn: &Isbn, timeout: Duration) -> LookupOutcome {
        let outcome: LookupOutcome = self.fetch(isbn, timeout).await.into();
        log_outcome(Source::GoogleBooks, &outcome);
        outcome
    }
}

/// Map a volumes search response; the record always echoes the queried ISBN.
fn parse_volumes(body: &str, isbn: &Isbn) -> Result<Option<BibRecord>, SourceError> {
    let parsed: VolumesResponse = serde_json::from_str(body)?;

    if parsed.total_items <= 0 {
        return Ok(None);
    }

    let Some(info) = parsed
        .items
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|item| item.volume_info)
    else {
        return Ok(None);
    };

    Ok(Some(
        BibRecord::new(Source::GoogleBooks, isbn.as_str())
            .with_title(info.title)
            .with_authors(&info.authors.unwrap_or_default())
            .with_publisher(info.publisher)
            .with_pubdate(info.published_date)
            .with_description(info.description),
    ))
}
