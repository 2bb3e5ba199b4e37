use crate::commands::read_attachment;
use crate::engine::{self, Operation, OperationOutput};
use anyhow::Result;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let input = read_attachment(path)?;
    let OperationOutput::Metadata(meta) = engine::execute(&Operation::ReadMetadata, &[input])?
    else {
        anyhow::bail!("unexpected output shape from read-metadata");
    };

    println!("File: {}", path.display());
    println!("Pages: {}", meta.page_count);

    // Absent fields are empty strings; only print what's there.
    let fields = [
        ("Title", &meta.title),
        ("Author", &meta.author),
        ("Subject", &meta.subject),
        ("Keywords", &meta.keywords),
        ("Creator", &meta.creator),
        ("Producer", &meta.producer),
        ("Created", &meta.creation_date),
        ("Modified", &meta.modification_date),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            println!("{}: {}", label, value);
        }
    }

    Ok(())
}
