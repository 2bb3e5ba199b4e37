//! Hermetic fixture documents for tests: built with lopdf, never read from
//! disk.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Build an n-page document where page i draws the text "Page i".
pub fn sample_doc(page_count: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for i in 1..=page_count {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {i}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode fixture content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count as i64,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Same fixture, serialized.
pub fn sample_pdf_bytes(page_count: usize) -> Vec<u8> {
    crate::pdf::PdfDocument::to_bytes(sample_doc(page_count)).expect("serialize fixture")
}

/// Read back the "Page N" markers of a document, in page order, by scanning
/// each page's (possibly compressed) content streams.
pub fn page_markers(doc: &Document) -> Vec<String> {
    let mut markers = Vec::new();
    let mut pages: Vec<_> = doc.get_pages().into_iter().collect();
    pages.sort_by_key(|(num, _)| *num);

    for (_, page_id) in pages {
        let mut content = Vec::new();
        if let Ok(dict) = doc.get_dictionary(page_id) {
            let streams: Vec<Object> = match dict.get(b"Contents") {
                Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
                Ok(Object::Array(arr)) => arr.clone(),
                _ => vec![],
            };
            for stream_ref in streams {
                if let Object::Reference(id) = stream_ref {
                    if let Ok(Object::Stream(stream)) = doc.get_object(id) {
                        if let Ok(data) = stream.decompressed_content() {
                            content.extend_from_slice(&data);
                        } else {
                            content.extend_from_slice(&stream.content);
                        }
                    }
                }
            }
        }
        let text = String::from_utf8_lossy(&content);
        if let Some(start) = text.find("(Page ") {
            if let Some(len) = text[start..].find(')') {
                markers.push(text[start + 1..start + len].to_string());
            }
        }
    }
    markers
}
