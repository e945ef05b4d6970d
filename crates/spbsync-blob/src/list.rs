//! List Blobs XML response parsing
//!
//! The List Blobs operation returns XML. The fields the sync needs are
//! flat and fixed (`<Name>`, `<Last-Modified>`, `<Content-Length>`,
//! `<NextMarker>`), so they are extracted with plain substring scanning
//! rather than an XML dependency.

use chrono::{DateTime, Utc};
use tracing::warn;

/// One blob from a listing page
#[derive(Debug, Clone, PartialEq)]
pub struct BlobEntry {
    /// Full blob path within the container
    pub name: String,
    /// Last-Modified, normalized to UTC
    pub last_modified: DateTime<Utc>,
    /// Content-Length when reported
    pub size: Option<u64>,
}

/// One parsed page of a List Blobs response
#[derive(Debug, Default)]
pub struct BlobListPage {
    pub blobs: Vec<BlobEntry>,
    /// Continuation marker for the next page, if any
    pub next_marker: Option<String>,
}

/// Parses a List Blobs XML body into blob entries and a continuation
/// marker.
///
/// Entries with a missing or unparseable Last-Modified are dropped with
/// a warning; the planner then treats them as absent, so the worst case
/// is an extra upload.
pub fn parse_blob_list(body: &str) -> BlobListPage {
    let mut page = BlobListPage::default();

    page.next_marker = text_between(body, "<NextMarker>", "</NextMarker>")
        .filter(|m| !m.is_empty())
        .map(unescape_xml);

    let mut search_from = 0;
    while let Some(start) = body[search_from..].find("<Blob>") {
        let start = search_from + start;
        let Some(end) = body[start..].find("</Blob>") else {
            break;
        };
        let blob_xml = &body[start..start + end];
        search_from = start + end;

        let Some(name) = text_between(blob_xml, "<Name>", "</Name>") else {
            continue;
        };
        // Names come back entity-escaped; the index must key on the raw
        // blob path or files with '&', '<' or '>' re-upload every run.
        let name = unescape_xml(name);

        let last_modified = text_between(blob_xml, "<Last-Modified>", "</Last-Modified>")
            .and_then(|raw| DateTime::parse_from_rfc2822(raw).ok())
            .map(|ts| ts.with_timezone(&Utc));

        let Some(last_modified) = last_modified else {
            warn!(blob = %name, "Blob listing entry has no usable Last-Modified, dropping");
            continue;
        };

        let size = text_between(blob_xml, "<Content-Length>", "</Content-Length>")
            .and_then(|raw| raw.parse::<u64>().ok());

        page.blobs.push(BlobEntry {
            name,
            last_modified,
            size,
        });
    }

    page
}

/// Returns the text between the first occurrence of `open` and the
/// following `close`.
fn text_between<'a>(haystack: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = haystack.find(open)? + open.len();
    let end = haystack[start..].find(close)?;
    Some(&haystack[start..start + end])
}

/// Decodes the five predefined XML entities.
fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
