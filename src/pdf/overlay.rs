//! Drawing on top of existing pages: watermark text and image stamps.
//!
//! PDF pages use a bottom-left origin; (0, 0) is the lower-left corner of
//! the page and y grows upward. New drawing is appended as an extra content
//! stream wrapped in q/Q so the page's own graphics state is untouched.

use crate::error::{OpError, Result};
use crate::pdf::image::{EmbeddedImage, ImagePlacement};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};

/// Resource names registered on each target page. Prefixed to keep clear of
/// names the document already uses.
const WATERMARK_FONT: &str = "WmF0";
const WATERMARK_GSTATE: &str = "WmGS0";
const IMAGE_STAMP: &str = "WmIm0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkStyle {
    pub text: String,
    pub font_size: f32,
    /// 6 hex digits, e.g. "ff8800". A leading '#' is tolerated.
    pub color: String,
    /// 0.0 = invisible, 1.0 = opaque.
    pub opacity: f32,
    /// When unset, the text is centered on the page.
    pub x: Option<f32>,
    pub y: Option<f32>,
}

/// Draw watermark text on each listed page (zero-based indices). The font
/// and graphics-state objects are created once and shared by every page.
pub fn add_watermark(doc: &mut Document, pages: &[usize], style: &WatermarkStyle) -> Result<()> {
    let (r, g, b) = parse_hex_color(&style.color)?;

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let gstate_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => style.opacity,
        "CA" => style.opacity,
    });

    let page_map = doc.get_pages();
    let targets: Vec<ObjectId> = pages
        .iter()
        .filter_map(|&p| page_map.get(&(p as u32 + 1)).copied())
        .collect();

    for page_id in targets {
        let media = media_box(doc, page_id);
        let (x, y) = watermark_position(style, media);

        add_resource(doc, page_id, "Font", WATERMARK_FONT, font_id)?;
        add_resource(doc, page_id, "ExtGState", WATERMARK_GSTATE, gstate_id)?;

        let content = format!(
            "q\n/{WATERMARK_GSTATE} gs\n{r} {g} {b} rg\nBT\n/{WATERMARK_FONT} {} Tf\n{x} {y} Td\n({}) Tj\nET\nQ\n",
            style.font_size,
            escape_pdf_text(&style.text),
        );
        append_content(doc, page_id, &content)?;
    }

    Ok(())
}

/// Stamp an already-embedded image onto each listed page at the given
/// placement. All pages reference the same XObject.
pub fn draw_image(
    doc: &mut Document,
    pages: &[usize],
    image: &EmbeddedImage,
    placement: &ImagePlacement,
) -> Result<()> {
    let width = image.width as f32 * placement.scale;
    let height = image.height as f32 * placement.scale;

    let page_map = doc.get_pages();
    let targets: Vec<ObjectId> = pages
        .iter()
        .filter_map(|&p| page_map.get(&(p as u32 + 1)).copied())
        .collect();

    for page_id in targets {
        add_resource(doc, page_id, "XObject", IMAGE_STAMP, image.object_id)?;
        let content = format!(
            "q\n{width} 0 0 {height} {} {} cm\n/{IMAGE_STAMP} Do\nQ\n",
            placement.x, placement.y,
        );
        append_content(doc, page_id, &content)?;
    }

    Ok(())
}

/// Parse a 6-hex-digit color into normalized RGB components.
pub fn parse_hex_color(value: &str) -> Result<(f32, f32, f32)> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(OpError::InvalidColor {
            value: value.to_string(),
        });
    }
    let channel =
        |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0) as f32 / 255.0;
    Ok((channel(0), channel(2), channel(4)))
}

fn watermark_position(style: &WatermarkStyle, media: [f32; 4]) -> (f32, f32) {
    // Caller coordinates win; otherwise center on the page. The width
    // estimate uses a rough Helvetica advance of 0.5 em per character.
    let x = style.x.unwrap_or_else(|| {
        let width_estimate = style.text.chars().count() as f32 * style.font_size * 0.5;
        (media[0] + media[2]) / 2.0 - width_estimate / 2.0
    });
    let y = style
        .y
        .unwrap_or_else(|| (media[1] + media[3]) / 2.0 - style.font_size * 0.35);
    (x, y)
}

/// Append a content stream to a page, preserving whatever Contents shape the
/// page already has (single reference, array, or none).
fn append_content(doc: &mut Document, page_id: ObjectId, content: &str) -> Result<()> {
    let stream = Stream::new(Dictionary::new(), content.as_bytes().to_vec());
    let content_id = doc.add_object(Object::Stream(stream));

    let page = doc.get_dictionary_mut(page_id)?;
    match page.get(b"Contents").ok().cloned() {
        Some(Object::Reference(existing)) => {
            page.set(
                "Contents",
                Object::Array(vec![
                    Object::Reference(existing),
                    Object::Reference(content_id),
                ]),
            );
        }
        Some(Object::Array(mut arr)) => {
            arr.push(Object::Reference(content_id));
            page.set("Contents", Object::Array(arr));
        }
        _ => {
            page.set("Contents", Object::Reference(content_id));
        }
    }
    Ok(())
}

/// Register `target` under the page's Resources, e.g.
/// `Resources/Font/WmF0`. Inherited or shared resource dictionaries are
/// cloned inline first so the addition stays local to this page.
fn add_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    name: &str,
    target: ObjectId,
) -> Result<()> {
    let resources = resolve_resources(doc, page_id);
    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Resources", Object::Dictionary(resources));

    if let Ok(Object::Dictionary(res)) = page.get_mut(b"Resources") {
        match res.get(category.as_bytes()) {
            Ok(Object::Dictionary(_)) => {}
            _ => res.set(category, Object::Dictionary(Dictionary::new())),
        }
        if let Ok(Object::Dictionary(cat)) = res.get_mut(category.as_bytes()) {
            cat.set(name, Object::Reference(target));
        }
    }
    Ok(())
}

/// The page's effective Resources dictionary, following inheritance up the
/// page tree, with referenced sub-dictionaries cloned inline.
fn resolve_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut object_id = page_id;
    for _ in 0..10 {
        let Ok(dict) = doc.get_dictionary(object_id) else {
            break;
        };
        match dict.get(b"Resources") {
            Ok(Object::Dictionary(res)) => return inline_references(doc, res.clone()),
            Ok(Object::Reference(res_id)) => {
                if let Ok(Object::Dictionary(res)) = doc.get_object(*res_id) {
                    return inline_references(doc, res.clone());
                }
                break;
            }
            _ => match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => object_id = *parent_id,
                _ => break,
            },
        }
    }
    Dictionary::new()
}

fn inline_references(doc: &Document, mut resources: Dictionary) -> Dictionary {
    let keys: Vec<Vec<u8>> = resources.iter().map(|(k, _)| k.clone()).collect();
    for key in keys {
        let referenced = match resources.get(&key) {
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Dictionary(sub)) => Some(sub.clone()),
                _ => None,
            },
            _ => None,
        };
        if let Some(sub) = referenced {
            resources.set(key, Object::Dictionary(sub));
        }
    }
    resources
}

/// Find the page's MediaBox, following the Parent chain with a depth limit.
/// Falls back to US Letter.
fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let mut object_id = page_id;
    for _ in 0..10 {
        let Ok(dict) = doc.get_dictionary(object_id) else {
            break;
        };
        if let Ok(raw) = dict.get(b"MediaBox") {
            let array = match raw {
                Object::Array(array) => Some(array.clone()),
                Object::Reference(id) => match doc.get_object(*id) {
                    Ok(Object::Array(array)) => Some(array.clone()),
                    _ => None,
                },
                _ => None,
            };
            if let Some(array) = array {
                let values: Vec<f32> = array
                    .iter()
                    .filter_map(|obj| match obj {
                        Object::Integer(i) => Some(*i as f32),
                        Object::Real(r) => Some(*r),
                        _ => None,
                    })
                    .collect();
                if values.len() == 4 {
                    return [values[0], values[1], values[2], values[3]];
                }
            }
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => object_id = *parent_id,
            _ => break,
        }
    }
    [0.0, 0.0, 612.0, 792.0]
}

fn escape_pdf_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
