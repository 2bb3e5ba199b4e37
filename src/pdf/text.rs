use crate::error::Result;

/// Extract all text from a PDF. Layout is approximated; pages are separated
/// by form feed characters.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    Ok(pdf_extract::extract_text_from_mem(bytes)?)
}

/// Split extracted text into per-page chunks on the form feed separators
/// that `extract_text` emits between pages.
pub fn split_pages(text: &str) -> Vec<String> {
    text.split('\x0C').map(|page| page.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testutil::sample_pdf_bytes;

    #[test]
    fn test_extract_text_from_fixture() {
        let text = extract_text(&sample_pdf_bytes(2)).unwrap();
        assert!(text.contains("Page 1"));
        assert!(text.contains("Page 2"));
    }

    #[test]
    fn test_split_pages_on_form_feed() {
        let pages = split_pages("first\x0Csecond\x0Cthird");
        assert_eq!(vec!["first", "second", "third"], pages);
        assert_eq!(vec![""], split_pages(""));
    }
}
