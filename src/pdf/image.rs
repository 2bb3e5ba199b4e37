use crate::error::{OpError, Result};
use image::ImageFormat;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};

/// Page-space position and a uniform scale factor applied to the image's
/// natural dimensions before placement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

/// An image XObject already added to a document, ready to be referenced from
/// any number of pages. The same object is reused across target pages; the
/// image is never embedded twice in one invocation.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedImage {
    pub object_id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// Embed image bytes as an XObject, dispatching on the declared MIME type.
/// PNG is decoded and stored as raw samples (with an SMask when the image
/// has transparency); JPEG passes through as DCTDecode.
pub fn embed_image(doc: &mut Document, bytes: &[u8], mime_type: &str) -> Result<EmbeddedImage> {
    match mime_type {
        "image/png" => embed_png(doc, bytes),
        "image/jpeg" | "image/jpg" => embed_jpeg(doc, bytes),
        other => Err(OpError::UnsupportedImageFormat {
            mime_type: other.to_string(),
        }),
    }
}

fn embed_png(doc: &mut Document, bytes: &[u8]) -> Result<EmbeddedImage> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| OpError::ExternalService(format!("failed to decode PNG: {e}")))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for px in rgba.pixels() {
        rgb.push(px.0[0]);
        rgb.push(px.0[1]);
        rgb.push(px.0[2]);
        alpha.push(px.0[3]);
    }

    let mut img_dict = Dictionary::new();
    img_dict.set("Type", "XObject");
    img_dict.set("Subtype", "Image");
    img_dict.set("Width", width as i64);
    img_dict.set("Height", height as i64);
    img_dict.set("ColorSpace", "DeviceRGB");
    img_dict.set("BitsPerComponent", 8);

    if rgba.pixels().any(|p| p.0[3] < 255) {
        let mut smask_dict = Dictionary::new();
        smask_dict.set("Type", "XObject");
        smask_dict.set("Subtype", "Image");
        smask_dict.set("Width", width as i64);
        smask_dict.set("Height", height as i64);
        smask_dict.set("ColorSpace", "DeviceGray");
        smask_dict.set("BitsPerComponent", 8);
        let smask_id = doc.add_object(Object::Stream(Stream::new(smask_dict, alpha)));
        img_dict.set("SMask", Object::Reference(smask_id));
    }

    let object_id = doc.add_object(Object::Stream(Stream::new(img_dict, rgb)));
    Ok(EmbeddedImage {
        object_id,
        width,
        height,
    })
}

fn embed_jpeg(doc: &mut Document, bytes: &[u8]) -> Result<EmbeddedImage> {
    // Decode only to learn the dimensions and color space; the original
    // JPEG bytes are embedded unchanged behind a DCTDecode filter.
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|e| OpError::ExternalService(format!("failed to decode JPEG: {e}")))?;
    let (width, height) = (decoded.width(), decoded.height());
    let color_space = match decoded.color() {
        image::ColorType::L8 | image::ColorType::L16 => "DeviceGray",
        _ => "DeviceRGB",
    };

    let mut img_dict = Dictionary::new();
    img_dict.set("Type", "XObject");
    img_dict.set("Subtype", "Image");
    img_dict.set("Width", width as i64);
    img_dict.set("Height", height as i64);
    img_dict.set("ColorSpace", color_space);
    img_dict.set("BitsPerComponent", 8);
    img_dict.set("Filter", "DCTDecode");

    let object_id = doc.add_object(Object::Stream(Stream::new(img_dict, bytes.to_vec())));
    Ok(EmbeddedImage {
        object_id,
        width,
        height,
    })
}
