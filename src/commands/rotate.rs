use crate::commands::{read_attachment, write_output};
use crate::engine::{self, Operation, OperationOutput};
use anyhow::Result;
use std::path::Path;

pub fn run(path: &Path, pages: &str, degrees: i64, output: &Path) -> Result<()> {
    // The engine accepts any delta; the CLI sticks to quarter turns since
    // that's what viewers render.
    if degrees % 90 != 0 {
        anyhow::bail!("Rotation must be a multiple of 90 degrees, got {}", degrees);
    }

    let input = read_attachment(path)?;
    let op = Operation::Rotate {
        pages: pages.to_string(),
        degrees,
    };
    let OperationOutput::Document(doc) = engine::execute(&op, &[input])? else {
        anyhow::bail!("unexpected output shape from rotate");
    };
    write_output(&doc, output)?;

    println!("Rotated pages by {} degrees, wrote {}", degrees, output.display());

    Ok(())
}
