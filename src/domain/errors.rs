//! Domain error types
//!
//! `LookupError` is what callers of the resolver see. `SourceError` never leaves an
//! adapter as an `Err`: it rides inside `LookupOutcome::SourceError` as a diagnostic.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Identifier empty after normalization
    InvalidInput(String),
    /// Resolver could not be built from configuration
    Config(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            LookupError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

/// Why a single catalog query failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Connection, DNS or body read failure
    Transport(String),
    /// Request exceeded the per-source timeout
    Timeout,
    /// Non-2xx HTTP status
    Status(u16),
    /// Malformed JSON or XML payload
    Parse(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Transport(msg) => write!(f, "Request failed: {}", msg),
            SourceError::Timeout => write!(f, "Request timed out"),
            SourceError::Status(code) => write!(f, "Catalog returned error status: {}", code),
            SourceError::Parse(msg) => write!(f, "Failed to parse response: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", e))
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(e: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", e))
    }
}
