pub mod domain;
pub mod infrastructure;
pub mod modules;
pub mod services;

pub use domain::{BibRecord, Isbn, LookupError, LookupOutcome, Source, SourceError};
pub use infrastructure::config;
pub use modules::integrations::{google_books, ndl, openbd};
pub use services::{Resolution, Resolver, ResolverState};
