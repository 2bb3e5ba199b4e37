use crate::commands::read_attachment;
use crate::engine::{self, Operation, OperationOutput};
use crate::page_select::{self, Policy};
use anyhow::Result;
use std::path::Path;

pub fn run(path: &Path, pages: Option<&str>) -> Result<()> {
    let input = read_attachment(path)?;
    let OperationOutput::Text(text) = engine::execute(&Operation::ExtractText, &[input])? else {
        anyhow::bail!("unexpected output shape from extract-text");
    };

    match pages {
        None => println!("{}", text),
        Some(expression) => {
            // Page boundaries in extracted text are form feeds, so the page
            // count to select against is the chunk count.
            let chunks = crate::pdf::text::split_pages(&text);
            let selected =
                page_select::resolve(expression, chunks.len(), Policy::LENIENT_SORTED)?;
            if selected.is_empty() {
                anyhow::bail!("No pages selected by {:?}", expression);
            }
            for page in selected {
                println!("--- Page {} ---", page + 1);
                println!("{}", chunks[page].trim_end());
                println!();
            }
        }
    }

    Ok(())
}
