//! Canonical bibliographic record and the per-source lookup outcome

use serde::Serialize;
use std::fmt;

use super::SourceError;

/// Value used for any field a catalog did not supply
pub const UNKNOWN: &str = "unknown";

/// Maximum description length, in characters
pub const DESCRIPTION_LIMIT: usize = 200;

/// Catalog that produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    GoogleBooks,
    OpenBd,
    Ndl,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::GoogleBooks => "Google Books",
            Source::OpenBd => "openBD",
            Source::Ndl => "National Diet Library",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized result of a successful lookup.
///
/// Built once by an adapter through the `with_*` methods, which apply the
/// sentinel defaults; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibRecord {
    title: String,
    author: String,
    publisher: String,
    pubdate: String,
    isbn: String,
    description: String,
    source: Source,
}

impl BibRecord {
    /// Start a record with every field at its default.
    pub fn new(source: Source, isbn: impl Into<String>) -> Self {
        Self {
            title: UNKNOWN.to_string(),
            author: UNKNOWN.to_string(),
            publisher: UNKNOWN.to_string(),
            pubdate: UNKNOWN.to_string(),
            isbn: or_unknown(Some(isbn.into())),
            description: String::new(),
            source,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = or_unknown(title);
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = or_unknown(author);
        self
    }

    /// Join a list of names with ", "; an empty list leaves the sentinel.
    pub fn with_authors(self, authors: &[String]) -> Self {
        let names: Vec<&str> = authors
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        let joined = (!names.is_empty()).then(|| names.join(", "));
        self.with_author(joined)
    }

    pub fn with_publisher(mut self, publisher: Option<String>) -> Self {
        self.publisher = or_unknown(publisher);
        self
    }

    pub fn with_pubdate(mut self, pubdate: Option<String>) -> Self {
        self.pubdate = or_unknown(pubdate);
        self
    }

    /// Store at most the first `DESCRIPTION_LIMIT` characters, no ellipsis.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description
            .map(|d| truncate_chars(&d, DESCRIPTION_LIMIT))
            .unwrap_or_default();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn pubdate(&self) -> &str {
        &self.pubdate
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source(&self) -> Source {
        self.source
    }
}

/// Result of asking one catalog about one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(BibRecord),
    NotFound,
    SourceError(SourceError),
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }

    pub fn record(&self) -> Option<&BibRecord> {
        match self {
            LookupOutcome::Found(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<BibRecord> {
        match self {
            LookupOutcome::Found(record) => Some(record),
            _ => None,
        }
    }
}

impl From<Result<Option<BibRecord>, SourceError>> for LookupOutcome {
    fn from(result: Result<Option<BibRecord>, SourceError>) -> Self {
        match result {
            Ok(Some(record)) => LookupOutcome::Found(record),
            Ok(None) => LookupOutcome::NotFound,
            Err(e) => LookupOutcome::SourceError(e),
        }
    }
}

/// Blank or missing values collapse to the sentinel; anything else is kept as given.
fn or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => UNKNOWN.to_string(),
    }
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = BibRecord::new(Source::Ndl, "9784003101011");
        assert_eq!(record.title(), UNKNOWN);
        assert_eq!(record.author(), UNKNOWN);
        assert_eq!(record.publisher(), UNKNOWN);
        assert_eq!(record.pubdate(), UNKNOWN);
        assert_eq!(record.isbn(), "9784003101011");
        assert_eq!(record.description(), "");
        assert_eq!(record.source(), Source::Ndl);
    }

    #[test]
    fn test_blank_values_become_unknown() {
        let record = BibRecord::new(Source::OpenBd, "1")
            .with_title(Some("   ".to_string()))
            .with_publisher(Some(String::new()))
            .with_pubdate(None);
        assert_eq!(record.title(), UNKNOWN);
        assert_eq!(record.publisher(), UNKNOWN);
        assert_eq!(record.pubdate(), UNKNOWN);

        let record = BibRecord::new(Source::OpenBd, "1").with_title(Some(" 吾輩は猫である ".to_string()));
        assert_eq!(record.title(), " 吾輩は猫である ");
    }

    #[test]
    fn test_authors_joined() {
        let authors = vec!["Natsume Soseki".to_string(), "".to_string(), "Mori Ogai".to_string()];
        let record = BibRecord::new(Source::GoogleBooks, "1").with_authors(&authors);
        assert_eq!(record.author(), "Natsume Soseki, Mori Ogai");

        let record = BibRecord::new(Source::GoogleBooks, "1").with_authors(&[]);
        assert_eq!(record.author(), UNKNOWN);
    }

    #[test]
    fn test_description_truncated_by_chars() {
        let long = "a".repeat(300);
        let record = BibRecord::new(Source::GoogleBooks, "1").with_description(Some(long));
        assert_eq!(record.description().chars().count(), 200);
        assert!(!record.description().ends_with("..."));

        // Multi-byte text is cut on character boundaries
        let japanese = "吾輩は猫である。".repeat(40);
        let record = BibRecord::new(Source::GoogleBooks, "1").with_description(Some(japanese.clone()));
        assert_eq!(record.description().chars().count(), 200);
        assert!(japanese.starts_with(record.description()));

        let record = BibRecord::new(Source::GoogleBooks, "1").with_description(Some("short".to_string()));
        assert_eq!(record.description(), "short");
    }

    #[test]
    fn test_outcome_from_result() {
        let found: LookupOutcome = Ok(Some(BibRecord::new(Source::Ndl, "1"))).into();
        assert!(found.is_found());

        let missing: LookupOutcome = Ok(None).into();
        assert_eq!(missing, LookupOutcome::NotFound);

        let failed: LookupOutcome = Err(SourceError::Timeout).into();
        assert_eq!(failed, LookupOutcome::SourceError(SourceError::Timeout));
        assert!(failed.record().is_none());
    }
}
