pub mod compose;
pub mod document;
pub mod image;
pub mod overlay;
pub mod rotate;
pub mod text;

#[cfg(test)]
pub(crate) mod testutil;

pub use document::{DocumentMetadata, PdfDocument};
