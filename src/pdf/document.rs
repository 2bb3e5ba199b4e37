use crate::error::{OpError, Result};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use lopdf::{Dictionary, Document, Object};
use serde::Serialize;

/// One loaded PDF document. Wraps the external codec's handle for the
/// duration of a single operation; never cached or shared across invocations.
pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(OpError::from)?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Serialize a document to bytes.
    pub fn to_bytes(mut doc: Document) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        doc.save_to(&mut out).map_err(OpError::from)?;
        Ok(out)
    }

    /// Read the document information dictionary. Absent fields come back as
    /// empty strings; dates are re-encoded as ISO-8601 or left empty when
    /// they don't parse.
    pub fn metadata(&self) -> DocumentMetadata {
        let mut meta = DocumentMetadata {
            page_count: self.page_count(),
            ..DocumentMetadata::default()
        };

        if let Some(dict) = self.info_dict() {
            meta.title = get_string_from_dict(dict, b"Title");
            meta.author = get_string_from_dict(dict, b"Author");
            meta.subject = get_string_from_dict(dict, b"Subject");
            meta.keywords = get_string_from_dict(dict, b"Keywords");
            meta.creator = get_string_from_dict(dict, b"Creator");
            meta.producer = get_string_from_dict(dict, b"Producer");
            meta.creation_date = pdf_date_to_iso(&get_string_from_dict(dict, b"CreationDate"));
            meta.modification_date = pdf_date_to_iso(&get_string_from_dict(dict, b"ModDate"));
        }

        meta
    }

    fn info_dict(&self) -> Option<&Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(info_ref) => match self.doc.get_object(*info_ref).ok()? {
                Object::Dictionary(dict) => Some(dict),
                _ => None,
            },
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
    pub creator: String,
    pub producer: String,
    pub creation_date: String,
    pub modification_date: String,
    pub page_count: usize,
}

fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> String {
    dict.get(key)
        .ok()
        .and_then(|obj| match obj {
            Object::String(bytes, _) => decode_pdf_string(bytes),
            _ => None,
        })
        .unwrap_or_default()
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    // Check for UTF-16 BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        // UTF-16 BE
        let u16_chars: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|chunk| {
                if chunk.len() == 2 {
                    Some(u16::from_be_bytes([chunk[0], chunk[1]]))
                } else {
                    None
                }
            })
            .collect();
        String::from_utf16(&u16_chars).ok()
    } else {
        // Try as Latin-1 / PDFDocEncoding (simplified)
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}

/// Convert a PDF date ("D:YYYYMMDDHHmmSSOHH'mm") to ISO-8601, or an empty
/// string when the value is absent or unparsable.
pub fn pdf_date_to_iso(raw: &str) -> String {
    parse_pdf_date(raw).unwrap_or_default()
}

fn parse_pdf_date(raw: &str) -> Option<String> {
    let s = raw.trim().strip_prefix("D:").unwrap_or(raw.trim());
    if s.len() < 8 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6)?.parse().ok()?;
    let day: u32 = s.get(6..8)?.parse().ok()?;
    let hour: u32 = s.get(8..10).and_then(|v| v.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|v| v.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|v| v.parse().ok()).unwrap_or(0);

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    let dt = NaiveDateTime::new(date, time);

    match s.get(14..).and_then(parse_utc_offset) {
        Some(seconds) => {
            let offset = FixedOffset::east_opt(seconds)?;
            let stamped = dt.and_local_timezone(offset).single()?;
            Some(stamped.to_rfc3339())
        }
        None => Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
    }
}

fn parse_utc_offset(tail: &str) -> Option<i32> {
    let mut chars = tail.chars();
    match chars.next()? {
        'Z' => Some(0),
        sign @ ('+' | '-') => {
            // The apostrophe separators in "+HH'mm'" are decorative.
            let digits: String = chars.filter(|c| c.is_ascii_digit()).collect();
            let hours: i32 = digits.get(0..2)?.parse().ok()?;
            let minutes: i32 = digits.get(2..4).and_then(|v| v.parse().ok()).unwrap_or(0);
            let seconds = (hours * 60 + minutes) * 60;
            Some(if sign == '-' { -seconds } else { seconds })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_date_full() {
        assert_eq!(
            pdf_date_to_iso("D:20240115093000+01'00"),
            "2024-01-15T09:30:00+01:00"
        );
    }

    #[test]
    fn test_pdf_date_negative_offset() {
        assert_eq!(
            pdf_date_to_iso("D:20231201120000-05'30"),
            "2023-12-01T12:00:00-05:30"
        );
    }

    #[test]
    fn test_pdf_date_utc_marker() {
        assert_eq!(
            pdf_date_to_iso("D:20240101000000Z"),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_pdf_date_without_time_or_offset() {
        assert_eq!(pdf_date_to_iso("D:20240115"), "2024-01-15T00:00:00");
    }

    #[test]
    fn test_pdf_date_garbage_is_empty() {
        assert_eq!(pdf_date_to_iso(""), "");
        assert_eq!(pdf_date_to_iso("yesterday"), "");
        assert_eq!(pdf_date_to_iso("D:2024"), "");
    }

    #[test]
    fn test_decode_utf16_string() {
        // UTF-16 BE with BOM spelling "Hi"
        let bytes = [0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(decode_pdf_string(&bytes), Some("Hi".to_string()));
    }

    #[test]
    fn test_metadata_defaults_to_empty_strings() {
        let doc = crate::pdf::testutil::sample_doc(2);
        let pdf = PdfDocument { doc };
        let meta = pdf.metadata();
        assert_eq!(meta.page_count, 2);
        assert_eq!(meta.title, "");
        assert_eq!(meta.creation_date, "");
    }
}
