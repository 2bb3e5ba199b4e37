use crate::commands::{read_attachment, write_output};
use crate::engine::{self, Operation, OperationOutput};
use anyhow::Result;
use std::path::Path;

pub fn run(path: &Path, pages: &str, output: &Path) -> Result<()> {
    let input = read_attachment(path)?;
    let op = Operation::Delete {
        pages: pages.to_string(),
    };
    let OperationOutput::Document(doc) = engine::execute(&op, &[input])? else {
        anyhow::bail!("unexpected output shape from delete");
    };
    write_output(&doc, output)?;

    let remaining = lopdf::Document::load_mem(&doc.bytes)
        .map(|d| d.get_pages().len())
        .unwrap_or(0);
    println!("Wrote {} remaining page(s) to {}", remaining, output.display());

    Ok(())
}
