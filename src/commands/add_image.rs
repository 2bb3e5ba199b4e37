use crate::commands::{read_attachment, write_output};
use crate::engine::{self, Operation, OperationOutput};
use crate::pdf::image::ImagePlacement;
use anyhow::Result;
use std::path::Path;

pub fn run(
    path: &Path,
    image: &Path,
    pages: &str,
    placement: ImagePlacement,
    output: &Path,
) -> Result<()> {
    let document = read_attachment(path)?;
    let stamp = read_attachment(image)?;

    let op = Operation::AddImage {
        pages: pages.to_string(),
        placement,
    };
    let OperationOutput::Document(doc) = engine::execute(&op, &[document, stamp])? else {
        anyhow::bail!("unexpected output shape from add-image");
    };
    write_output(&doc, output)?;

    println!("Stamped {} onto {}", image.display(), output.display());

    Ok(())
}
