//! Lookup key normalization

use std::fmt;

use super::LookupError;

/// A normalized ISBN: hyphens and whitespace removed, nothing else checked.
///
/// Length and checksum are not validated; a malformed value comes back as
/// "not found" from every catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Isbn(String);

impl Isbn {
    /// Normalize raw user input into the compact form sent to every catalog.
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let compact: String = raw
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect();

        if compact.is_empty() {
            return Err(LookupError::InvalidInput(
                "ISBN must not be empty".to_string(),
            ));
        }

        Ok(Self(compact))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Isbn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
