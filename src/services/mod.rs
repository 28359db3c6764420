//! Services - Lookup logic without any I/O loop
//!
//! Called directly by the binary, or by any other front end.

pub mod lookup_service;

pub use lookup_service::{AttemptResult, Resolution, Resolver, ResolverState, SourceAttempt};
