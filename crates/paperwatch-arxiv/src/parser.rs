//! arXiv Atom feed parser using quick-xml
//!
//! Streaming parser for the `export.arxiv.org/api/query` response format.

use chrono::{DateTime, NaiveDate, Utc};
use paperwatch_core::model::field;
use paperwatch_core::{PaperRecord, PipelineError, SourceError};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

type Result<T> = std::result::Result<T, SourceError>;

fn xml_error(e: impl std::fmt::Display) -> SourceError {
    SourceError::Parse(format!("XML parse error: {e}"))
}

/// One `<entry>` as it appears in the feed, before normalisation.
#[derive(Debug, Default)]
pub struct AtomEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub published: String,
    pub updated: String,
    pub authors: Vec<String>,
    pub comment: Option<String>,
    pub primary_category: Option<String>,
    pub categories: Vec<String>,
    pub pdf_link: Option<String>,
}

/// One page of search results.
#[derive(Debug, Default)]
pub struct FeedPage {
    /// `opensearch:totalResults`, when present
    pub total_results: Option<usize>,
    pub entries: Vec<AtomEntry>,
}

/// Parse an Atom feed page.
///
/// An arXiv error feed (an entry whose id points at `/api/errors`) is
/// returned as [`SourceError::Parse`] carrying the error summary.
pub fn parse_feed(xml: &str) -> Result<FeedPage> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page = FeedPage::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) if e.name().as_ref() == b"entry" => {
                let entry = parse_entry(&mut reader)?;
                if entry.id.contains("/api/errors") {
                    return Err(SourceError::Parse(format!(
                        "arXiv API error: {}",
                        collapse_whitespace(&entry.summary)
                    )));
                }
                page.entries.push(entry);
            }
            Event::Start(e) if e.name().as_ref() == b"opensearch:totalResults" => {
                page.total_results = read_text(&mut reader)?.trim().parse().ok();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(page)
}

fn parse_entry(reader: &mut Reader<&[u8]>) -> Result<AtomEntry> {
    let mut entry = AtomEntry::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => match e.name().as_ref() {
                b"id" => entry.id = read_text(reader)?,
                b"title" => entry.title = read_text(reader)?,
                b"summary" => entry.summary = read_text(reader)?,
                b"published" => entry.published = read_text(reader)?,
                b"updated" => entry.updated = read_text(reader)?,
                b"author" => {
                    if let Some(name) = parse_author(reader)? {
                        entry.authors.push(name);
                    }
                }
                b"arxiv:comment" => entry.comment = Some(read_text(reader)?),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"link" => {
                    if attr(&e, b"title")?.as_deref() == Some("pdf") {
                        entry.pdf_link = attr(&e, b"href")?;
                    }
                }
                b"category" => entry.categories.extend(attr(&e, b"term")?),
                b"arxiv:primary_category" => entry.primary_category = attr(&e, b"term")?,
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"entry" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entry)
}

fn parse_author(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let mut name = None;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) if e.name().as_ref() == b"name" => {
                let text = collapse_whitespace(&read_text(reader)?);
                if !text.is_empty() {
                    name = Some(text);
                }
            }
            Event::End(e) if e.name().as_ref() == b"author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(name)
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    match e.try_get_attribute(key).map_err(xml_error)? {
        Some(a) => Ok(Some(a.unescape_value().map_err(xml_error)?.into_owned())),
        None => Ok(None),
    }
}

/// Text of the current element, including text of nested elements.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Text(e) => text.push_str(&e.unescape().map_err(xml_error)?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::End(_) => break,
            Event::Start(_) => text.push_str(&read_text(reader)?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Short arXiv id without version suffix.
///
/// `http://arxiv.org/abs/2108.09112v2` → `2108.09112`,
/// `hep-th/9901001v1` → `hep-th/9901001`.
pub fn normalize_id(raw: &str) -> String {
    let raw = raw.trim();
    let short = raw.split_once("/abs/").map_or(raw, |(_, rest)| rest);
    match short.rfind('v') {
        Some(pos)
            if pos > 0
                && pos + 1 < short.len()
                && short[pos + 1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            short[..pos].to_string()
        }
        _ => short.to_string(),
    }
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok())
}

impl AtomEntry {
    /// Normalise into a [`PaperRecord`].
    ///
    /// Entries without an id or title are [`PipelineError::RecordMalformed`].
    pub fn into_record(self) -> std::result::Result<PaperRecord, PipelineError> {
        let id = normalize_id(&self.id);
        let title = collapse_whitespace(&self.title);
        if id.is_empty() {
            return Err(PipelineError::malformed(None, "missing identity"));
        }
        if title.is_empty() {
            return Err(PipelineError::malformed(Some(&id), "missing title"));
        }

        let mut record = PaperRecord::new(id, title);
        let summary = collapse_whitespace(&self.summary);
        if !summary.is_empty() {
            record.abstract_text = Some(summary);
        }
        record.published = parse_day(&self.published);
        if record.published.is_none() && !self.published.trim().is_empty() {
            log::debug!("{}: unparseable published date '{}'", record.id, self.published);
        }

        record.links.insert(
            field::LINK_ABS.to_string(),
            format!("http://arxiv.org/abs/{}", record.id),
        );
        if let Some(pdf) = self.pdf_link {
            record.links.insert(field::LINK_PDF.to_string(), pdf);
        }

        let meta = &mut record.metadata;
        if let Some(last) = self.authors.last() {
            meta.insert(field::LAST_AUTHOR.to_string(), last.clone());
        }
        if !self.authors.is_empty() {
            meta.insert(field::AUTHORS.to_string(), self.authors.join(", "));
        }
        if !self.categories.is_empty() {
            meta.insert(field::CATEGORIES.to_string(), self.categories.join("; "));
        }
        if let Some(primary) = self.primary_category {
            meta.insert(field::PRIMARY_CATEGORY.to_string(), primary);
        }
        if let Some(comment) = self.comment.map(|c| collapse_whitespace(&c)).filter(|c| !c.is_empty()) {
            meta.insert(field::COMMENT.to_string(), comment);
        }
        if let Some(updated) = parse_day(&self.updated) {
            meta.insert(field::UPDATED.to_string(), updated.to_string());
        }

        Ok(record)
    }
}
