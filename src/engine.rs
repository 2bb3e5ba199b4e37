//! The operation engine: every page operation as a pure function from input
//! attachments to an output value. Hosts (CLI, MCP) only do I/O and call
//! [`execute`].

use crate::error::{OpError, Result};
use crate::page_select::{self, Policy};
use crate::pdf::image::{self, ImagePlacement};
use crate::pdf::overlay::{self, WatermarkStyle};
use crate::pdf::{compose, rotate, text, DocumentMetadata, PdfDocument};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";

/// A named blob of bytes moving in or out of the engine. The engine never
/// touches the filesystem; hosts load and store these.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

/// One page operation, with its page selection still in source form. The
/// engine resolves selections itself so that each operation applies its own
/// bounds and ordering policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    /// Remove the selected pages; everything else survives in order.
    Delete { pages: String },
    /// Keep only the selected pages, in ascending page order.
    Extract { pages: String },
    /// Burst the document into one single-page document per page.
    Split,
    /// Rebuild the document with pages in the given order. Duplicates repeat
    /// a page; omissions drop one. Any invalid term fails the operation.
    Reorder { pages: String },
    /// Add `degrees` to each selected page's rotation, reduced into [0, 360).
    Rotate { pages: String, degrees: i64 },
    /// Append every page of every input, in input order.
    Merge,
    /// Stamp the second input (an image) onto the selected pages.
    AddImage {
        pages: String,
        placement: ImagePlacement,
    },
    /// Draw translucent text on the selected pages.
    Watermark {
        pages: String,
        style: WatermarkStyle,
    },
    /// Read the document information dictionary.
    ReadMetadata,
    /// Extract all text, pages separated by form feeds.
    ExtractText,
}

/// What an operation produced.
#[derive(Debug)]
pub enum OperationOutput {
    Document(Attachment),
    Documents(Vec<Attachment>),
    Metadata(DocumentMetadata),
    Text(String),
}

/// Run one operation against its inputs. Inputs are positional: every
/// operation reads the primary PDF from index 0; add-image reads the image
/// from index 1; merge reads PDFs from every index.
pub fn execute(operation: &Operation, inputs: &[Attachment]) -> Result<OperationOutput> {
    match operation {
        Operation::Delete { pages } => delete(inputs, pages),
        Operation::Extract { pages } => extract(inputs, pages),
        Operation::Split => split(inputs),
        Operation::Reorder { pages } => reorder(inputs, pages),
        Operation::Rotate { pages, degrees } => rotate_op(inputs, pages, *degrees),
        Operation::Merge => merge(inputs),
        Operation::AddImage { pages, placement } => add_image(inputs, pages, placement),
        Operation::Watermark { pages, style } => watermark(inputs, pages, style),
        Operation::ReadMetadata => read_metadata(inputs),
        Operation::ExtractText => extract_text(inputs),
    }
}

fn delete(inputs: &[Attachment], pages: &str) -> Result<OperationOutput> {
    let input = pdf_input(inputs, 0, "document")?;
    let pdf = PdfDocument::from_bytes(&input.bytes)?;
    let selected = page_select::resolve(pages, pdf.page_count(), Policy::LENIENT_SORTED)?;
    if selected.is_empty() {
        return Err(OpError::NoPagesSelected);
    }
    log::debug!("deleting {} of {} pages", selected.len(), pdf.page_count());

    let mut doc = pdf.doc;
    let numbers: Vec<u32> = selected.iter().map(|&p| p as u32 + 1).collect();
    doc.delete_pages(&numbers);
    doc.prune_objects();

    Ok(OperationOutput::Document(Attachment {
        bytes: PdfDocument::to_bytes(doc)?,
        mime_type: PDF_MIME.to_string(),
        file_name: derived_name(&input.file_name, "-deleted"),
    }))
}

fn extract(inputs: &[Attachment], pages: &str) -> Result<OperationOutput> {
    let input = pdf_input(inputs, 0, "document")?;
    let pdf = PdfDocument::from_bytes(&input.bytes)?;
    let selected = page_select::resolve(pages, pdf.page_count(), Policy::LENIENT_SORTED)?;
    if selected.is_empty() {
        return Err(OpError::NoPagesSelected);
    }
    log::debug!("extracting {} of {} pages", selected.len(), pdf.page_count());

    let out = compose::pick_pages(&pdf.doc, &selected)?;
    Ok(OperationOutput::Document(Attachment {
        bytes: PdfDocument::to_bytes(out)?,
        mime_type: PDF_MIME.to_string(),
        file_name: derived_name(&input.file_name, "-extracted"),
    }))
}

fn split(inputs: &[Attachment]) -> Result<OperationOutput> {
    let input = pdf_input(inputs, 0, "document")?;
    let pdf = PdfDocument::from_bytes(&input.bytes)?;
    let page_count = pdf.page_count();
    if page_count == 0 {
        return Err(OpError::NoPagesSelected);
    }
    log::debug!("splitting into {page_count} single-page documents");

    let stem = file_stem(&input.file_name);
    let mut outputs = Vec::with_capacity(page_count);
    for page in 0..page_count {
        let out = compose::pick_pages(&pdf.doc, &[page])?;
        outputs.push(Attachment {
            bytes: PdfDocument::to_bytes(out)?,
            mime_type: PDF_MIME.to_string(),
            file_name: format!("{stem}_{:04}.pdf", page + 1),
        });
    }
    Ok(OperationOutput::Documents(outputs))
}

fn reorder(inputs: &[Attachment], pages: &str) -> Result<OperationOutput> {
    let input = pdf_input(inputs, 0, "document")?;
    let pdf = PdfDocument::from_bytes(&input.bytes)?;
    // Reorder is the one operation where the expression is authoritative:
    // strict bounds, caller's order, duplicates and omissions allowed.
    let selected = page_select::resolve(pages, pdf.page_count(), Policy::STRICT_AS_GIVEN)?;
    if selected.is_empty() {
        return Err(OpError::NoPagesSelected);
    }
    log::debug!("reordering to {} pages", selected.len());

    let out = compose::pick_pages(&pdf.doc, &selected)?;
    Ok(OperationOutput::Document(Attachment {
        bytes: PdfDocument::to_bytes(out)?,
        mime_type: PDF_MIME.to_string(),
        file_name: derived_name(&input.file_name, "-reordered"),
    }))
}

fn rotate_op(inputs: &[Attachment], pages: &str, degrees: i64) -> Result<OperationOutput> {
    let input = pdf_input(inputs, 0, "document")?;
    let pdf = PdfDocument::from_bytes(&input.bytes)?;
    let selected = page_select::resolve(pages, pdf.page_count(), Policy::LENIENT_SORTED)?;
    if selected.is_empty() {
        return Err(OpError::NoPagesSelected);
    }
    log::debug!("rotating {} pages by {degrees}", selected.len());

    let mut doc = pdf.doc;
    rotate::rotate_pages(&mut doc, &selected, degrees)?;
    Ok(OperationOutput::Document(Attachment {
        bytes: PdfDocument::to_bytes(doc)?,
        mime_type: PDF_MIME.to_string(),
        file_name: derived_name(&input.file_name, "-rotated"),
    }))
}

fn merge(inputs: &[Attachment]) -> Result<OperationOutput> {
    if inputs.len() < 2 {
        return Err(OpError::InsufficientInputs {
            needed: 2,
            got: inputs.len(),
        });
    }

    let mut sources = Vec::with_capacity(inputs.len());
    let mut picks = Vec::new();
    for index in 0..inputs.len() {
        let input = pdf_input(inputs, index, "document")?;
        let pdf = PdfDocument::from_bytes(&input.bytes)?;
        for page in 0..pdf.page_count() {
            picks.push((index, page));
        }
        sources.push(pdf.doc);
    }
    log::debug!("merging {} documents, {} pages", sources.len(), picks.len());

    let out = compose::compose(&sources, &picks)?;
    Ok(OperationOutput::Document(Attachment {
        bytes: PdfDocument::to_bytes(out)?,
        mime_type: PDF_MIME.to_string(),
        file_name: "merged.pdf".to_string(),
    }))
}

fn add_image(
    inputs: &[Attachment],
    pages: &str,
    placement: &ImagePlacement,
) -> Result<OperationOutput> {
    let input = pdf_input(inputs, 0, "document")?;
    let image_input = binary(inputs, 1, "image")?;
    if !placement.scale.is_finite() || placement.scale <= 0.0 {
        return Err(OpError::InvalidScale {
            value: placement.scale,
        });
    }

    let pdf = PdfDocument::from_bytes(&input.bytes)?;
    let selected = page_select::resolve(pages, pdf.page_count(), Policy::LENIENT_SORTED)?;
    if selected.is_empty() {
        return Err(OpError::NoPagesSelected);
    }

    let mut doc = pdf.doc;
    // Embed once; every target page references the same XObject.
    let embedded = image::embed_image(&mut doc, &image_input.bytes, &image_input.mime_type)?;
    log::debug!(
        "stamping {}x{} image onto {} pages",
        embedded.width,
        embedded.height,
        selected.len()
    );
    overlay::draw_image(&mut doc, &selected, &embedded, placement)?;
    doc.compress();

    Ok(OperationOutput::Document(Attachment {
        bytes: PdfDocument::to_bytes(doc)?,
        mime_type: PDF_MIME.to_string(),
        file_name: derived_name(&input.file_name, "-with-image"),
    }))
}

fn watermark(inputs: &[Attachment], pages: &str, style: &WatermarkStyle) -> Result<OperationOutput> {
    let input = pdf_input(inputs, 0, "document")?;
    // Validate the color before touching the document.
    overlay::parse_hex_color(&style.color)?;

    let pdf = PdfDocument::from_bytes(&input.bytes)?;
    let selected = page_select::resolve(pages, pdf.page_count(), Policy::LENIENT_SORTED)?;
    if selected.is_empty() {
        return Err(OpError::NoPagesSelected);
    }
    log::debug!("watermarking {} pages", selected.len());

    let mut doc = pdf.doc;
    overlay::add_watermark(&mut doc, &selected, style)?;
    doc.compress();

    Ok(OperationOutput::Document(Attachment {
        bytes: PdfDocument::to_bytes(doc)?,
        mime_type: PDF_MIME.to_string(),
        file_name: derived_name(&input.file_name, "-watermarked"),
    }))
}

fn read_metadata(inputs: &[Attachment]) -> Result<OperationOutput> {
    let input = pdf_input(inputs, 0, "document")?;
    let pdf = PdfDocument::from_bytes(&input.bytes)?;
    Ok(OperationOutput::Metadata(pdf.metadata()))
}

fn extract_text(inputs: &[Attachment]) -> Result<OperationOutput> {
    let input = pdf_input(inputs, 0, "document")?;
    Ok(OperationOutput::Text(text::extract_text(&input.bytes)?))
}

fn binary<'a>(
    inputs: &'a [Attachment],
    index: usize,
    field: &'static str,
) -> Result<&'a Attachment> {
    inputs
        .get(index)
        .ok_or(OpError::MissingBinaryField { field })
}

fn pdf_input<'a>(
    inputs: &'a [Attachment],
    index: usize,
    field: &'static str,
) -> Result<&'a Attachment> {
    let input = binary(inputs, index, field)?;
    if input.mime_type != PDF_MIME {
        return Err(OpError::UnsupportedMediaType {
            expected: PDF_MIME,
            actual: input.mime_type.clone(),
        });
    }
    Ok(input)
}

fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

fn derived_name(input_name: &str, suffix: &str) -> String {
    format!("{}{suffix}.pdf", file_stem(input_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testutil::{page_markers, sample_pdf_bytes};
    use lopdf::Document;

    fn pdf_attachment(page_count: usize) -> Attachment {
        Attachment {
            bytes: sample_pdf_bytes(page_count),
            mime_type: PDF_MIME.to_string(),
            file_name: "input.pdf".to_string(),
        }
    }

    fn as_document(output: OperationOutput) -> Attachment {
        match output {
            OperationOutput::Document(doc) => doc,
            _ => panic!("expected a single document output"),
        }
    }

    fn markers(attachment: &Attachment) -> Vec<String> {
        let doc = Document::load_mem(&attachment.bytes).unwrap();
        page_markers(&doc)
    }

    #[test]
    fn test_delete_keeps_remaining_pages_in_order() {
        let op = Operation::Delete {
            pages: "2,4".to_string(),
        };
        let out = as_document(execute(&op, &[pdf_attachment(5)]).unwrap());
        assert_eq!(vec!["Page 1", "Page 3", "Page 5"], markers(&out));
        assert_eq!("input-deleted.pdf", out.file_name);
    }

    #[test]
    fn test_delete_nothing_selected() {
        let op = Operation::Delete {
            pages: "99".to_string(),
        };
        let err = execute(&op, &[pdf_attachment(3)]).unwrap_err();
        assert!(matches!(err, OpError::NoPagesSelected));
    }

    #[test]
    fn test_extract_sorts_and_deduplicates() {
        let op = Operation::Extract {
            pages: "3,1,1".to_string(),
        };
        let out = as_document(execute(&op, &[pdf_attachment(4)]).unwrap());
        assert_eq!(vec!["Page 1", "Page 3"], markers(&out));
    }

    #[test]
    fn test_split_bursts_into_numbered_pages() {
        let out = execute(&Operation::Split, &[pdf_attachment(3)]).unwrap();
        let docs = match out {
            OperationOutput::Documents(docs) => docs,
            _ => panic!("expected multiple documents"),
        };
        assert_eq!(3, docs.len());
        assert_eq!("input_0001.pdf", docs[0].file_name);
        assert_eq!("input_0003.pdf", docs[2].file_name);
        assert_eq!(vec!["Page 2"], markers(&docs[1]));
    }

    #[test]
    fn test_reorder_preserves_duplicates_and_order() {
        let op = Operation::Reorder {
            pages: "2,1,1".to_string(),
        };
        let out = as_document(execute(&op, &[pdf_attachment(3)]).unwrap());
        assert_eq!(vec!["Page 2", "Page 1", "Page 1"], markers(&out));
    }

    #[test]
    fn test_reorder_rejects_out_of_range() {
        let op = Operation::Reorder {
            pages: "1,9".to_string(),
        };
        let err = execute(&op, &[pdf_attachment(3)]).unwrap_err();
        assert!(matches!(err, OpError::InvalidPageSelection { .. }));
    }

    #[test]
    fn test_rotate_round_trips() {
        let op = Operation::Rotate {
            pages: "all".to_string(),
            degrees: 90,
        };
        let out = as_document(execute(&op, &[pdf_attachment(2)]).unwrap());
        let doc = Document::load_mem(&out.bytes).unwrap();
        for (_, page_id) in doc.get_pages() {
            let rotation = doc
                .get_dictionary(page_id)
                .unwrap()
                .get(b"Rotate")
                .and_then(lopdf::Object::as_i64)
                .unwrap();
            assert_eq!(90, rotation);
        }
    }

    #[test]
    fn test_merge_concatenates_inputs() {
        let out = as_document(
            execute(&Operation::Merge, &[pdf_attachment(2), pdf_attachment(3)]).unwrap(),
        );
        let doc = Document::load_mem(&out.bytes).unwrap();
        assert_eq!(5, doc.get_pages().len());
        assert_eq!("merged.pdf", out.file_name);
    }

    #[test]
    fn test_merge_needs_two_inputs() {
        let err = execute(&Operation::Merge, &[pdf_attachment(2)]).unwrap_err();
        assert!(matches!(
            err,
            OpError::InsufficientInputs { needed: 2, got: 1 }
        ));
    }

    #[test]
    fn test_wrong_mime_type_rejected() {
        let mut input = pdf_attachment(1);
        input.mime_type = "text/plain".to_string();
        let op = Operation::Delete {
            pages: "1".to_string(),
        };
        let err = execute(&op, &[input]).unwrap_err();
        assert!(matches!(err, OpError::UnsupportedMediaType { .. }));
    }

    #[test]
    fn test_missing_input_rejected() {
        let err = execute(&Operation::ReadMetadata, &[]).unwrap_err();
        assert!(matches!(
            err,
            OpError::MissingBinaryField { field: "document" }
        ));
    }

    #[test]
    fn test_add_image_requires_image_input() {
        let op = Operation::AddImage {
            pages: "all".to_string(),
            placement: ImagePlacement {
                x: 0.0,
                y: 0.0,
                scale: 1.0,
            },
        };
        let err = execute(&op, &[pdf_attachment(1)]).unwrap_err();
        assert!(matches!(err, OpError::MissingBinaryField { field: "image" }));
    }

    #[test]
    fn test_add_image_rejects_non_positive_scale() {
        for scale in [0.0, -1.0, f32::NAN] {
            let op = Operation::AddImage {
                pages: "all".to_string(),
                placement: ImagePlacement {
                    x: 0.0,
                    y: 0.0,
                    scale,
                },
            };
            let image_input = Attachment {
                bytes: vec![],
                mime_type: "image/png".to_string(),
                file_name: "stamp.png".to_string(),
            };
            let err = execute(&op, &[pdf_attachment(1), image_input]).unwrap_err();
            assert!(matches!(err, OpError::InvalidScale { .. }));
        }
    }

    #[test]
    fn test_add_image_stamps_every_page() {
        // `::image` is the codec crate; plain `image` is our embedding module.
        let img = ::image::RgbaImage::from_pixel(4, 4, ::image::Rgba([255, 0, 0, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        ::image::DynamicImage::ImageRgba8(img)
            .write_to(&mut png, ::image::ImageFormat::Png)
            .unwrap();
        let image_input = Attachment {
            bytes: png.into_inner(),
            mime_type: "image/png".to_string(),
            file_name: "stamp.png".to_string(),
        };

        let op = Operation::AddImage {
            pages: "all".to_string(),
            placement: ImagePlacement {
                x: 10.0,
                y: 10.0,
                scale: 1.0,
            },
        };
        let out = as_document(execute(&op, &[pdf_attachment(2), image_input]).unwrap());
        let doc = Document::load_mem(&out.bytes).unwrap();
        for (_, page_id) in doc.get_pages() {
            let page = doc.get_dictionary(page_id).unwrap();
            let res = page
                .get(b"Resources")
                .and_then(lopdf::Object::as_dict)
                .unwrap();
            assert!(res.get(b"XObject").is_ok());
        }
    }

    #[test]
    fn test_watermark_touches_selected_pages() {
        let op = Operation::Watermark {
            pages: "1".to_string(),
            style: WatermarkStyle {
                text: "CONFIDENTIAL".to_string(),
                font_size: 36.0,
                color: "808080".to_string(),
                opacity: 0.3,
                x: None,
                y: None,
            },
        };
        let out = as_document(execute(&op, &[pdf_attachment(2)]).unwrap());
        assert_eq!("input-watermarked.pdf", out.file_name);

        let doc = Document::load_mem(&out.bytes).unwrap();
        let pages = doc.get_pages();
        let first = doc.get_dictionary(pages[&1]).unwrap();
        match first.get(b"Contents").unwrap() {
            lopdf::Object::Array(arr) => assert_eq!(2, arr.len()),
            other => panic!("expected two content streams, got {other:?}"),
        }
        let second = doc.get_dictionary(pages[&2]).unwrap();
        assert!(matches!(
            second.get(b"Contents").unwrap(),
            lopdf::Object::Reference(_)
        ));
    }

    #[test]
    fn test_watermark_rejects_bad_color() {
        let op = Operation::Watermark {
            pages: "all".to_string(),
            style: WatermarkStyle {
                text: "X".to_string(),
                font_size: 12.0,
                color: "not-a-color".to_string(),
                opacity: 0.5,
                x: None,
                y: None,
            },
        };
        let err = execute(&op, &[pdf_attachment(1)]).unwrap_err();
        assert!(matches!(err, OpError::InvalidColor { .. }));
    }

    #[test]
    fn test_read_metadata_reports_page_count() {
        let out = execute(&Operation::ReadMetadata, &[pdf_attachment(4)]).unwrap();
        let meta = match out {
            OperationOutput::Metadata(meta) => meta,
            _ => panic!("expected metadata output"),
        };
        assert_eq!(4, meta.page_count);
        assert_eq!("", meta.title);
    }

    #[test]
    fn test_extract_text_sees_page_markers() {
        let out = execute(&Operation::ExtractText, &[pdf_attachment(2)]).unwrap();
        let text = match out {
            OperationOutput::Text(text) => text,
            _ => panic!("expected text output"),
        };
        assert!(text.contains("Page 1"));
        assert!(text.contains("Page 2"));
    }
}
