use crate::commands::read_attachment;
use crate::engine::{self, Operation, OperationOutput};
use anyhow::{Context, Result};
use std::path::Path;

pub fn run(path: &Path, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let input = read_attachment(path)?;
    let OperationOutput::Documents(docs) = engine::execute(&Operation::Split, &[input])? else {
        anyhow::bail!("unexpected output shape from split");
    };

    // Output names carry the input stem and a 1-based page number,
    // e.g. report_0001.pdf.
    let count = docs.len();
    for doc in docs {
        let output_path = output_dir.join(&doc.file_name);
        std::fs::write(&output_path, &doc.bytes)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
    }

    println!("Split {} pages into {}", count, output_dir.display());

    Ok(())
}
