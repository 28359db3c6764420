//! NDL Search (National Diet Library) SRU lookup
//!
//! `searchRetrieve` with `recordSchema=dcndl`, one record at most. The response
//! mixes three vocabularies, so elements are matched by resolved namespace:
//! - `srw:numberOfRecords`, `srw:recordData` (SRU envelope)
//! - `dc:title`, `dc:creator`, `dc:publisher` (Dublin Core)
//! - `dcterms:issued` (DC Terms)

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::sync::Arc;
use std::time::Duration;

use super::{fetch_body, log_outcome, request_url};
use crate::domain::{BibRecord, HttpTransport, Isbn, LookupOutcome, Source, SourceAdapter, SourceError};

const SRW_NS: &[u8] = b"http://www.loc.gov/zing/srw/";
const DC_NS: &[u8] = b"http://purl.org/dc/elements/1.1/";
const DCTERMS_NS: &[u8] = b"http://purl.org/dc/terms/";

pub struct NdlAdapter {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl NdlAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, isbn: &Isbn, timeout: Duration) -> Result<Option<BibRecord>, SourceError> {
        let cql = format!("isbn=\"{}\"", isbn);
        let url = request_url(&format!(
            "{}/sru?operation=searchRetrieve&query={}&recordSchema=dcndl&maximumRecords=1",
            self.base_url,
            urlencoding::encode(&cql)
        ))?;

        let body = fetch_body(self.transport.as_ref(), Source::Ndl, &url, timeout).await?;
        parse_sru(&body, isbn)
    }
}

#[async_trait]
impl SourceAdapter for NdlAdapter {
    fn source(&self) -> Source {
        Source::Ndl
    }

    async fn query(&self, isbn: &Isbn, timeout: Duration) -> LookupOutcome {
        let outcome: LookupOutcome = self.fetch(isbn, timeout).await.into();
        log_outcome(Source::Ndl, &outcome);
        outcome
    }
}

/// The parts of a searchRetrieve response we read
#[derive(Debug, Default)]
struct SruResponse {
    number_of_records: Option<String>,
    record: Option<DcRecord>,
}

/// First occurrence of each field inside the first `recordData`
#[derive(Debug, Default)]
struct DcRecord {
    title: Option<String>,
    creator: Option<String>,
    publisher: Option<String>,
    issued: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    NumberOfRecords,
    RecordData,
    Title,
    Creator,
    Publisher,
    Issued,
}

fn classify(ns: &[u8], local: &[u8]) -> Option<Tag> {
    match (ns, local) {
        (SRW_NS, b"numberOfRecords") => Some(Tag::NumberOfRecords),
        (SRW_NS, b"recordData") => Some(Tag::RecordData),
        (DC_NS, b"title") => Some(Tag::Title),
        (DC_NS, b"creator") => Some(Tag::Creator),
        (DC_NS, b"publisher") => Some(Tag::Publisher),
        (DCTERMS_NS, b"issued") => Some(Tag::Issued),
        _ => None,
    }
}

impl SruResponse {
    /// Slot a tag's text goes into, if it is wanted and not filled yet.
    fn slot(&mut self, tag: Tag, in_record: bool) -> Option<&mut Option<String>> {
        let slot = match tag {
            Tag::NumberOfRecords => &mut self.number_of_records,
            Tag::RecordData => return None,
            _ if !in_record => return None,
            Tag::Title => &mut self.record.as_mut()?.title,
            Tag::Creator => &mut self.record.as_mut()?.creator,
            Tag::Publisher => &mut self.record.as_mut()?.publisher,
            Tag::Issued => &mut self.record.as_mut()?.issued,
        };
        slot.is_none().then_some(slot)
    }
}

/// Element whose text is being collected
struct Capture {
    tag: Tag,
    depth: usize,
    text: String,
    // First text found in a child element, used when the element has no text of its own
    nested: Option<String>,
}

fn read_sru_response(xml: &str) -> Result<SruResponse, SourceError> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(true);

    let mut response = SruResponse::default();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut record_depth: Option<usize> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                check_element(&ns, depth, saw_root)?;
                depth += 1;
                saw_root = true;
                let tag = if capture.is_none() {
                    resolved_tag(&ns, e.local_name().as_ref())
                } else {
                    None
                };
                match tag {
                    Some(Tag::RecordData) => {
                        if response.record.is_none() {
                            response.record = Some(DcRecord::default());
                            record_depth = Some(depth);
                        }
                    }
                    Some(tag) => {
                        if response.slot(tag, record_depth.is_some()).is_some() {
                            capture = Some(Capture {
                                tag,
                                depth,
                                text: String::new(),
                                nested: None,
                            });
                        }
                    }
                    None => (),
                }
            }
            Ok((ns, Event::Empty(e))) => {
                check_element(&ns, depth, saw_root)?;
                saw_root = true;
                if capture.is_none()
                    && let Some(tag) = resolved_tag(&ns, e.local_name().as_ref())
                {
                    if tag == Tag::RecordData {
                        if response.record.is_none() {
                            response.record = Some(DcRecord::default());
                        }
                    } else if let Some(slot) = response.slot(tag, record_depth.is_some()) {
                        *slot = Some(String::new());
                    }
                }
            }
            Ok((_, Event::Text(e))) => {
                if let Some(c) = capture.as_mut() {
                    let text = e.unescape()?;
                    push_text(c, &text, depth);
                }
            }
            Ok((_, Event::CData(e))) => {
                if let Some(c) = capture.as_mut() {
                    let text = String::from_utf8_lossy(&e).to_string();
                    push_text(c, &text, depth);
                }
            }
            Ok((_, Event::End(_))) => {
                if let Some(c) = capture.take_if(|c| c.depth == depth) {
                    let value = if c.text.is_empty() {
                        c.nested.unwrap_or_default()
                    } else {
                        c.text
                    };
                    if let Some(slot) = response.slot(c.tag, record_depth.is_some()) {
                        *slot = Some(value);
                    }
                }
                if record_depth == Some(depth) {
                    record_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok((_, Event::Eof)) => break,
            Err(e) => return Err(e.into()),
            _ => (),
        }
        buf.clear();
    }

    if !saw_root {
        return Err(SourceError::Parse("XML: no root element".to_string()));
    }
    if depth != 0 {
        return Err(SourceError::Parse("XML: unexpected end of document".to_string()));
    }

    Ok(response)
}

/// Reject elements with an undeclared prefix and elements after the root closed.
fn check_element(ns: &ResolveResult, depth: usize, saw_root: bool) -> Result<(), SourceError> {
    if let ResolveResult::Unknown(prefix) = ns {
        return Err(SourceError::Parse(format!(
            "XML: unbound namespace prefix {:?}",
            String::from_utf8_lossy(prefix)
        )));
    }
    if saw_root && depth == 0 {
        return Err(SourceError::Parse("XML: content after root element".to_string()));
    }
    Ok(())
}

fn resolved_tag(ns: &ResolveResult, local: &[u8]) -> Option<Tag> {
    match ns {
        ResolveResult::Bound(Namespace(ns)) => classify(ns, local),
        _ => None,
    }
}

fn push_text(capture: &mut Capture, text: &str, depth: usize) {
    if depth == capture.depth {
        capture.text.push_str(text);
    } else if capture.nested.is_none() && !text.is_empty() {
        capture.nested = Some(text.to_string());
    }
}

/// Map an SRU response; the record always echoes the queried ISBN.
fn parse_sru(body: &str, isbn: &Isbn) -> Result<Option<BibRecord>, SourceError> {
    let response = read_sru_response(body)?;

    let Some(count) = response.number_of_records else {
        tracing::debug!("{}: numberOfRecords missing", Source::Ndl);
        return Ok(None);
    };
    let count: i64 = count
        .trim()
        .parse()
        .map_err(|_| SourceError::Parse(format!("invalid numberOfRecords: {:?}", count)))?;
    tracing::debug!("{}: {} record(s)", Source::Ndl, count);

    if count <= 0 {
        return Ok(None);
    }

    let Some(record) = response.record else {
        return Ok(None);
    };

    Ok(Some(
        BibRecord::new(Source::Ndl, isbn.as_str())
            .with_title(record.title)
            .with_author(record.creator)
            .with_publisher(record.publisher)
            .with_pubdate(record.issued),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UNKNOWN;
    use crate::infrastructure::ReqwestTransport;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn isbn() -> Isbn {
        Isbn::parse("9784003101011").unwrap()
    }

    fn envelope(count: &str, records: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<searchRetrieveResponse xmlns="http://www.loc.gov/zing/srw/">
  <version>1.2</version>
  <numberOfRecords>{count}</numberOfRecords>
  <nextRecordPosition>0</nextRecordPosition>
  <records>{records}</records>
</searchRetrieveResponse>"#
        )
    }

    fn record(body: &str) -> String {
        format!(
            r#"<record>
      <recordSchema>info:srw/schema/1/dc-v1.1</recordSchema>
      <recordPacking>xml</recordPacking>
      <recordData>
        <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                 xmlns:dc="http://purl.org/dc/elements/1.1/"
                 xmlns:dcterms="http://purl.org/dc/terms/">
          <rdf:Description>{body}</rdf:Description>
        </rdf:RDF>
      </recordData>
      <recordPosition>1</recordPosition>
    </record>"#
        )
    }

    #[test]
    fn test_parse_full_record() {
        let xml = envelope(
            "1",
            &record(
                r#"<dc:title>こころ</dc:title>
                   <dc:creator>夏目漱石 著</dc:creator>
                   <dc:creator>second creator</dc:creator>
                   <dc:publisher>岩波書店</dc:publisher>
                   <dcterms:issued>1927</dcterms:issued>"#,
            ),
        );

        let record = parse_sru(&xml, &isbn()).unwrap().unwrap();
        assert_eq!(record.title(), "こころ");
        assert_eq!(record.author(), "夏目漱石 著");
        assert_eq!(record.publisher(), "岩波書店");
        assert_eq!(record.pubdate(), "1927");
        assert_eq!(record.isbn(), "9784003101011");
        assert_eq!(record.description(), "");
        assert_eq!(record.source(), Source::Ndl);
    }

    #[test]
    fn test_parse_missing_fields_are_unknown() {
        let xml = envelope("1", &record("<dc:title>Only a title</dc:title><dc:publisher/>"));

        let record = parse_sru(&xml, &isbn()).unwrap().unwrap();
        assert_eq!(record.title(), "Only a title");
        assert_eq!(record.author(), UNKNOWN);
        assert_eq!(record.publisher(), UNKNOWN);
        assert_eq!(record.pubdate(), UNKNOWN);
    }

    #[test]
    fn test_parse_prefixed_envelope_and_nested_title() {
        let xml = r#"<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/">
  <srw:numberOfRecords>3</srw:numberOfRecords>
  <srw:records><srw:record><srw:recordData>
    <dcndl:BibResource xmlns:dcndl="http://ndl.go.jp/dcndl/terms/"
                       xmlns:dc="http://purl.org/dc/elements/1.1/"
                       xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
      <dc:title><rdf:Description><rdf:value>吾輩は猫である</rdf:value></rdf:Description></dc:title>
      <dc:creator>夏目漱石 &amp; 編集部</dc:creator>
    </dcndl:BibResource>
  </srw:recordData></srw:record></srw:records>
</srw:searchRetrieveResponse>"#;

        let record = parse_sru(xml, &isbn()).unwrap().unwrap();
        assert_eq!(record.title(), "吾輩は猫である");
        assert_eq!(record.author(), "夏目漱石 & 編集部");
    }

    #[test]
    fn test_parse_ignores_fields_outside_record_data() {
        // dc:title in the envelope must not be mistaken for the record's title
        let xml = r#"<searchRetrieveResponse xmlns="http://www.loc.gov/zing/srw/"
                         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <numberOfRecords>1</numberOfRecords>
  <dc:title>envelope</dc:title>
  <records><record><recordData><dc:creator>Writer</dc:creator></recordData></record></records>
</searchRetrieveResponse>"#;

        let record = parse_sru(xml, &isbn()).unwrap().unwrap();
        assert_eq!(record.title(), UNKNOWN);
        assert_eq!(record.author(), "Writer");
    }

    #[test]
    fn test_parse_unqualified_elements_do_not_match() {
        let xml = envelope("1", "<record><recordData><title>No namespace</title></recordData></record>");
        let record = parse_sru(&xml, &isbn()).unwrap().unwrap();
        assert_eq!(record.title(), UNKNOWN);
    }

    #[test]
    fn test_parse_not_found_cases() {
        // Zero records
        assert!(parse_sru(&envelope("0", ""), &isbn()).unwrap().is_none());

        // Count element missing
        let xml = r#"<searchRetrieveResponse xmlns="http://www.loc.gov/zing/srw/"><version>1.2</version></searchRetrieveResponse>"#;
        assert!(parse_sru(xml, &isbn()).unwrap().is_none());

        // Count present but no recordData
        assert!(parse_sru(&envelope("1", ""), &isbn()).unwrap().is_none());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_sru(&envelope("many", ""), &isbn()),
            Err(SourceError::Parse(_))
        ));
        assert!(matches!(
            parse_sru("<searchRetrieveResponse><numberOfRecords>1</records>", &isbn()),
            Err(SourceError::Parse(_))
        ));
        assert!(matches!(parse_sru("", &isbn()), Err(SourceError::Parse(_))));
        assert!(matches!(
            parse_sru("<searchRetrieveResponse>", &isbn()),
            Err(SourceError::Parse(_))
        ));

        // dc prefix used without an xmlns:dc declaration
        let unbound = envelope(
            "1",
            "<record><recordData><dc:title>T</dc:title></recordData></record>",
        );
        assert!(matches!(parse_sru(&unbound, &isbn()), Err(SourceError::Parse(_))));

        // Second top-level element after the root closed
        let trailing = format!("{}<other/>", envelope("0", ""));
        assert!(matches!(parse_sru(&trailing, &isbn()), Err(SourceError::Parse(_))));
        let trailing = format!("{}<other>x</other>", envelope("0", ""));
        assert!(matches!(parse_sru(&trailing, &isbn()), Err(SourceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_query_builds_sru_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sru"))
            .and(query_param("operation", "searchRetrieve"))
            .and(query_param("query", "isbn=\"9784003101011\""))
            .and(query_param("recordSchema", "dcndl"))
            .and(query_param("maximumRecords", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(envelope("1", &record("<dc:title>こころ</dc:title>"))),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = Arc::new(ReqwestTransport::new("test-agent").unwrap());
        let adapter = NdlAdapter::new(transport, format!("{}/api", mock_server.uri()));
        let outcome = adapter.query(&isbn(), Duration::from_secs(5)).await;

        assert_eq!(outcome.record().map(|r| r.title()), Some("こころ"));
    }
}
