//! Listing XML deserialization.
//!
//! This module provides the [`XmlDeserialize`] trait and the readers for the
//! documents the listing endpoint returns. Element matching uses local names,
//! so the default S3 namespace (or a prefixed one) makes no difference.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use bucketview_model::{BucketEntry, ListingPage, ObjectEntry};

use crate::error::XmlError;

/// Root element of a delimiter listing inside a bucket.
pub const LIST_BUCKET_RESULT: &str = "ListBucketResult";

/// Root element of a storage-root bucket listing.
pub const LIST_ALL_MY_BUCKETS_RESULT: &str = "ListAllMyBucketsResult";

/// Trait for deserializing listing types from XML.
///
/// The opening tag has already been consumed by the caller; the
/// implementation reads child elements until the matching end tag.
pub trait XmlDeserialize: Sized {
    /// Deserialize an instance from the given XML reader.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the XML is malformed or required fields are missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Parse a listing response body.
///
/// Accepts `ListBucketResult` and `ListAllMyBucketsResult` roots; anything
/// else (an `<Error>` document, an HTML error page) is rejected.
///
/// # Errors
///
/// Returns `XmlError` on an empty body, malformed XML, an unexpected root,
/// or an entry missing its required name.
pub fn parse_listing(xml: &[u8]) -> Result<ListingPage, XmlError> {
    let mut reader = Reader::from_reader(xml);
    match read_root(&mut reader)? {
        Root::Open(name) if is_listing_root(&name) => ListingPage::deserialize_xml(&mut reader),
        Root::Empty(name) if is_listing_root(&name) => Ok(ListingPage::default()),
        Root::Open(name) | Root::Empty(name) => Err(XmlError::UnexpectedElement(name)),
    }
}

/// The `<Error>` document a provider attaches to failed requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    /// Provider error code, e.g. `NoSuchBucket`.
    pub code: String,
    /// Human-readable message, if any.
    pub message: Option<String>,
}

/// Best-effort parse of an error body; `None` if it is not an `<Error>` document.
#[must_use]
pub fn parse_error_body(xml: &[u8]) -> Option<ErrorBody> {
    let mut reader = Reader::from_reader(xml);
    match read_root(&mut reader).ok()? {
        Root::Open(name) if name == "Error" => ErrorBody::deserialize_xml(&mut reader).ok(),
        _ => None,
    }
}

fn is_listing_root(name: &str) -> bool {
    name == LIST_BUCKET_RESULT || name == LIST_ALL_MY_BUCKETS_RESULT
}

// ---------------------------------------------------------------------------
// Helper functions for reading common XML patterns
// ---------------------------------------------------------------------------

enum Root {
    Open(String),
    Empty(String),
}

/// Skip the declaration, comments and whitespace and consume the root tag.
fn read_root(reader: &mut Reader<&[u8]>) -> Result<Root, XmlError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => return Ok(Root::Open(element_name(&e)?)),
            Event::Empty(e) => return Ok(Root::Empty(element_name(&e)?)),
            Event::Eof => {
                return Err(XmlError::MissingElement("root element".to_string()));
            }
            _ => {}
        }
    }
}

fn element_name(e: &BytesStart<'_>) -> Result<String, XmlError> {
    let local = e.local_name();
    std::str::from_utf8(local.as_ref())
        .map(ToOwned::to_owned)
        .map_err(|err| XmlError::ParseError(err.to_string()))
}

/// A child element encountered inside a container.
enum Child {
    /// `<Tag>`: content follows.
    Open(String),
    /// `<Tag/>`: no content.
    Empty(String),
    /// The container's own end tag.
    End,
}

/// Read up to the next child element or the end of the current container.
fn next_child(reader: &mut Reader<&[u8]>, container: &str) -> Result<Child, XmlError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => return Ok(Child::Open(element_name(&e)?)),
            Event::Empty(e) => return Ok(Child::Empty(element_name(&e)?)),
            Event::End(_) => return Ok(Child::End),
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(format!(
                    "unexpected EOF in {container}"
                )));
            }
            _ => {}
        }
    }
}

/// Read the text content of the current element and consume its end tag.
///
/// Expects the reader to be positioned right after a `Start` event. Entity
/// and character references are resolved in place.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::CData(e) => {
                let raw = std::str::from_utf8(&e)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(raw);
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?
                {
                    text.push(ch);
                } else {
                    let name = e
                        .decode()
                        .map_err(|err| XmlError::ParseError(err.to_string()))?;
                    let resolved = quick_xml::escape::resolve_predefined_entity(&name)
                        .ok_or_else(|| XmlError::ParseError(format!("unknown entity &{name};")))?;
                    text.push_str(resolved);
                }
            }
            Event::End(_) => {
                return Ok(text);
            }
            Event::Start(e) => {
                return Err(XmlError::UnexpectedElement(element_name(&e)?));
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Read the text of a child that may have been written as `<Tag/>`.
fn read_child_text(reader: &mut Reader<&[u8]>, child: &Child) -> Result<String, XmlError> {
    match child {
        Child::Open(_) => read_text_content(reader),
        Child::Empty(_) | Child::End => Ok(String::new()),
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip a child only if it has content to skip.
fn skip_child(reader: &mut Reader<&[u8]>, child: &Child) -> Result<(), XmlError> {
    match child {
        Child::Open(_) => skip_element(reader),
        Child::Empty(_) | Child::End => Ok(()),
    }
}

/// Parse a boolean from XML text ("true"/"false").
fn parse_bool(s: &str) -> Result<bool, XmlError> {
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(XmlError::ParseError(format!("invalid boolean: {other}"))),
    }
}

/// Parse an object size; anything that is not a non-negative integer is unknown.
fn parse_size(s: &str) -> Option<u64> {
    s.trim().parse::<u64>().ok()
}

/// Parse an ISO 8601 timestamp, returning `None` for values we cannot read.
fn parse_timestamp(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let parsed = chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .or_else(|_| {
            // S3 format without offset: 2006-02-03T16:45:09.000Z
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
                .map(|ndt| ndt.and_utc())
        });
    match parsed {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::debug!(value = %s, error = %e, "ignoring unparseable timestamp");
            None
        }
    }
}

fn child_name(child: &Child) -> &str {
    match child {
        Child::Open(name) | Child::Empty(name) => name,
        Child::End => "",
    }
}

// ---------------------------------------------------------------------------
// XmlDeserialize implementations
// ---------------------------------------------------------------------------

impl XmlDeserialize for ObjectEntry {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut key = None;
        let mut last_modified = None;
        let mut size = None;

        loop {
            let child = next_child(reader, "Contents")?;
            match child_name(&child) {
                "" => break,
                "Key" => key = Some(read_child_text(reader, &child)?),
                "LastModified" => last_modified = parse_timestamp(&read_child_text(reader, &child)?),
                "Size" => size = parse_size(&read_child_text(reader, &child)?),
                _ => skip_child(reader, &child)?,
            }
        }

        Ok(ObjectEntry {
            key: key.ok_or_else(|| XmlError::MissingElement("Contents/Key".to_string()))?,
            last_modified,
            size,
        })
    }
}

impl XmlDeserialize for BucketEntry {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut name = None;
        let mut created_at = None;

        loop {
            let child = next_child(reader, "Bucket")?;
            match child_name(&child) {
                "" => break,
                "Name" => name = Some(read_child_text(reader, &child)?),
                "CreationDate" => created_at = parse_timestamp(&read_child_text(reader, &child)?),
                _ => skip_child(reader, &child)?,
            }
        }

        Ok(BucketEntry {
            name: name.ok_or_else(|| XmlError::MissingElement("Bucket/Name".to_string()))?,
            created_at,
        })
    }
}

impl XmlDeserialize for ErrorBody {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut body = ErrorBody::default();

        loop {
            let child = next_child(reader, "Error")?;
            match child_name(&child) {
                "" => break,
                "Code" => body.code = read_child_text(reader, &child)?,
                "Message" => body.message = Some(read_child_text(reader, &child)?),
                _ => skip_child(reader, &child)?,
            }
        }

        Ok(body)
    }
}

impl XmlDeserialize for ListingPage {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut page = ListingPage::default();

        loop {
            let child = next_child(reader, "listing")?;
            match child_name(&child) {
                "" => break,
                "Contents" => {
                    if let Child::Open(_) = child {
                        page.objects.push(ObjectEntry::deserialize_xml(reader)?);
                    }
                }
                "CommonPrefixes" => {
                    if let Child::Open(_) = child {
                        if let Some(prefix) = read_common_prefix(reader)? {
                            page.prefixes.push(prefix);
                        }
                    }
                }
                "Buckets" => {
                    if let Child::Open(_) = child {
                        page.buckets.extend(read_buckets(reader)?);
                    }
                }
                "Bucket" => {
                    if let Child::Open(_) = child {
                        page.buckets.push(BucketEntry::deserialize_xml(reader)?);
                    }
                }
                "NextContinuationToken" => {
                    let token = read_child_text(reader, &child)?;
                    page.next_continuation_token = (!token.trim().is_empty()).then_some(token);
                }
                "IsTruncated" => {
                    page.is_truncated = parse_bool(&read_child_text(reader, &child)?)?;
                }
                _ => skip_child(reader, &child)?,
            }
        }

        Ok(page)
    }
}

/// Read the `Prefix` out of a `CommonPrefixes` group.
fn read_common_prefix(reader: &mut Reader<&[u8]>) -> Result<Option<String>, XmlError> {
    let mut prefix = None;
    loop {
        let child = next_child(reader, "CommonPrefixes")?;
        match child_name(&child) {
            "" => break,
            "Prefix" => {
                let text = read_child_text(reader, &child)?;
                if !text.is_empty() {
                    prefix = Some(text);
                }
            }
            _ => skip_child(reader, &child)?,
        }
    }
    Ok(prefix)
}

/// Read every `Bucket` inside a `Buckets` wrapper.
fn read_buckets(reader: &mut Reader<&[u8]>) -> Result<Vec<BucketEntry>, XmlError> {
    let mut buckets = Vec::new();
    loop {
        let child = next_child(reader, "Buckets")?;
        match (&child, child_name(&child)) {
            (_, "") => break,
            (Child::Open(_), "Bucket") => buckets.push(BucketEntry::deserialize_xml(reader)?),
            _ => skip_child(reader, &child)?,
        }
    }
    Ok(buckets)
}
