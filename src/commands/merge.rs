use crate::commands::{read_attachment, write_output};
use crate::engine::{self, Operation, OperationOutput};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn run(inputs: &[PathBuf], output: &Path) -> Result<()> {
    let attachments = inputs
        .iter()
        .map(|p| read_attachment(p))
        .collect::<Result<Vec<_>>>()?;

    let OperationOutput::Document(doc) = engine::execute(&Operation::Merge, &attachments)? else {
        anyhow::bail!("unexpected output shape from merge");
    };
    write_output(&doc, output)?;

    let total_pages = lopdf::Document::load_mem(&doc.bytes)
        .map(|d| d.get_pages().len())
        .unwrap_or(0);
    println!(
        "Merged {} files ({} pages) into {}",
        inputs.len(),
        total_pages,
        output.display()
    );

    Ok(())
}
