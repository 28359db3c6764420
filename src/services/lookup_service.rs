//! Lookup Service - ordered fallback across catalogs
//!
//! Catalogs are asked one at a time, in list order. The first `Found` wins and ends
//! the lookup; `NotFound` and `SourceError` both move on to the next catalog. No
//! fields are merged between catalogs.

use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::domain::{
    BibRecord, HttpTransport, Isbn, LookupError, LookupOutcome, Source, SourceAdapter, SourceError,
};
use crate::infrastructure::Config;
use crate::modules::integrations::{GoogleBooksAdapter, NdlAdapter, OpenBdAdapter};

/// Where a lookup stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    Pending,
    Found(BibRecord),
    Exhausted,
}

impl ResolverState {
    fn on_outcome(self, outcome: LookupOutcome) -> Self {
        match (self, outcome) {
            (ResolverState::Pending, LookupOutcome::Found(record)) => ResolverState::Found(record),
            (state, _) => state,
        }
    }

    fn finish(self) -> Self {
        match self {
            ResolverState::Pending => ResolverState::Exhausted,
            state => state,
        }
    }
}

/// What one catalog answered, kept for diagnostics only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Found,
    NotFound,
    Failed(SourceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAttempt {
    pub source: Source,
    pub result: AttemptResult,
}

impl SourceAttempt {
    fn new(source: Source, outcome: &LookupOutcome) -> Self {
        let result = match outcome {
            LookupOutcome::Found(_) => AttemptResult::Found,
            LookupOutcome::NotFound => AttemptResult::NotFound,
            LookupOutcome::SourceError(e) => AttemptResult::Failed(e.clone()),
        };
        Self { source, result }
    }
}

/// Terminal state of one lookup plus the catalogs tried on the way
#[derive(Debug, Clone)]
pub struct Resolution {
    pub isbn: Isbn,
    pub state: ResolverState,
    pub attempts: Vec<SourceAttempt>,
}

impl Resolution {
    pub fn record(&self) -> Option<&BibRecord> {
        match &self.state {
            ResolverState::Found(record) => Some(record),
            _ => None,
        }
    }

    /// `Found` or `NotFound`; individual source errors are never surfaced here.
    pub fn outcome(&self) -> LookupOutcome {
        self.record()
            .cloned()
            .map_or(LookupOutcome::NotFound, LookupOutcome::Found)
    }

    pub fn into_outcome(self) -> LookupOutcome {
        match self.state {
            ResolverState::Found(record) => LookupOutcome::Found(record),
            _ => LookupOutcome::NotFound,
        }
    }
}

pub struct Resolver {
    adapters: Vec<Box<dyn SourceAdapter>>,
    timeout: Duration,
}

impl Resolver {
    /// Resolver over an explicit, already-ordered adapter list.
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>, timeout: Duration) -> Self {
        Self { adapters, timeout }
    }

    /// Standard chain: Google Books, then openBD, then NDL.
    pub fn from_config(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, LookupError> {
        for base in [
            &config.google_books_base_url,
            &config.openbd_base_url,
            &config.ndl_base_url,
        ] {
            Url::parse(base)
                .map_err(|e| LookupError::Config(format!("invalid base URL {}: {}", base, e)))?;
        }

        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(GoogleBooksAdapter::new(
                transport.clone(),
                config.google_books_base_url.as_str(),
            )),
            Box::new(OpenBdAdapter::new(
                transport.clone(),
                config.openbd_base_url.as_str(),
            )),
            Box::new(NdlAdapter::new(transport, config.ndl_base_url.as_str())),
        ];

        Ok(Self::new(adapters, config.timeout))
    }

    pub fn sources(&self) -> Vec<Source> {
        self.adapters.iter().map(|a| a.source()).collect()
    }

    /// Normalize `raw` and walk the catalogs until one finds the book.
    ///
    /// Only an empty identifier is an error; running out of catalogs is reported as
    /// `ResolverState::Exhausted`.
    pub async fn resolve(&self, raw: &str) -> Result<Resolution, LookupError> {
        let isbn = Isbn::parse(raw)?;
        tracing::info!("Searching for ISBN {}", isbn);

        let mut state = ResolverState::Pending;
        let mut attempts = Vec::with_capacity(self.adapters.len());

        for (position, adapter) in self.adapters.iter().enumerate() {
            let source = adapter.source();
            tracing::info!("[{}] Searching {}", position + 1, source);

            let outcome = adapter.query(&isbn, self.timeout).await;
            let attempt = SourceAttempt::new(source, &outcome);
            match &attempt.result {
                AttemptResult::Found => tracing::info!("[{}] {}: found", position + 1, source),
                AttemptResult::NotFound => {
                    tracing::info!("[{}] {}: not found", position + 1, source)
                }
                AttemptResult::Failed(e) => {
                    tracing::info!("[{}] {}: error ({})", position + 1, source, e)
                }
            }
            attempts.push(attempt);

            state = state.on_outcome(outcome);
            if matches!(state, ResolverState::Found(_)) {
                break;
            }
        }

        let state = state.finish();
        match &state {
            ResolverState::Found(record) => {
                tracing::info!("ISBN {} resolved by {}", isbn, record.source())
            }
            _ => tracing::info!("ISBN {} not found in any catalog", isbn),
        }

        Ok(Resolution {
            isbn,
            state,
            attempts,
        })
    }
}
