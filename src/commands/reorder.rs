use crate::commands::{read_attachment, write_output};
use crate::engine::{self, Operation, OperationOutput};
use anyhow::Result;
use std::path::Path;

pub fn run(path: &Path, pages: &str, output: &Path) -> Result<()> {
    let input = read_attachment(path)?;
    let op = Operation::Reorder {
        pages: pages.to_string(),
    };
    let OperationOutput::Document(doc) = engine::execute(&op, &[input])? else {
        anyhow::bail!("unexpected output shape from reorder");
    };
    write_output(&doc, output)?;

    println!("Reordered pages written to {}", output.display());

    Ok(())
}
