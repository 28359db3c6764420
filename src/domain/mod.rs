//! Domain layer - Pure lookup abstractions
//!
//! This layer contains NO transport code (no reqwest).
//! Only the data model, trait definitions and error types.

pub mod errors;
pub mod isbn;
pub mod record;
pub mod sources;

pub use errors::{LookupError, SourceError};
pub use isbn::Isbn;
pub use record::{BibRecord, DESCRIPTION_LIMIT, LookupOutcome, Source, UNKNOWN};
pub use sources::{HttpResponse, HttpTransport, SourceAdapter};
