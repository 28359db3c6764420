//! Trait definitions for catalog access
//!
//! These traits define the contract between the resolver and the outside world.
//! Implementations live in the infrastructure and integrations layers.

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use super::{Isbn, LookupOutcome, Source, SourceError};

/// Status and body of a completed GET request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Black-box HTTP capability: perform one GET, bounded by `timeout`
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<HttpResponse, SourceError>;
}

/// One external catalog
///
/// `query` issues exactly one request and always returns an outcome; transport and
/// payload failures come back as `LookupOutcome::SourceError`.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Catalog this adapter labels its records with
    fn source(&self) -> Source;

    /// Look up an already-normalized identifier
    async fn query(&self, isbn: &Isbn, timeout: Duration) -> LookupOutcome;
}
