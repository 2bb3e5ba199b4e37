pub mod add_image;
pub mod delete;
pub mod extract;
pub mod info;
pub mod merge;
pub mod reorder;
pub mod rotate;
pub mod split;
pub mod text;
pub mod watermark;

use crate::engine::Attachment;
use anyhow::{Context, Result};
use std::path::Path;

/// Load a file as an engine attachment, guessing the MIME type from the
/// extension.
pub fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    Ok(Attachment {
        bytes,
        mime_type: mime_for_path(path).to_string(),
        file_name,
    })
}

fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Write a produced document where the caller asked for it.
pub fn write_output(attachment: &Attachment, output: &Path) -> Result<()> {
    std::fs::write(output, &attachment.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))
}
