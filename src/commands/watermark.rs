use crate::commands::{read_attachment, write_output};
use crate::engine::{self, Operation, OperationOutput};
use crate::pdf::overlay::WatermarkStyle;
use anyhow::Result;
use std::path::Path;

pub fn run(path: &Path, pages: &str, style: WatermarkStyle, output: &Path) -> Result<()> {
    let text = style.text.clone();
    let input = read_attachment(path)?;
    let op = Operation::Watermark {
        pages: pages.to_string(),
        style,
    };
    let OperationOutput::Document(doc) = engine::execute(&op, &[input])? else {
        anyhow::bail!("unexpected output shape from watermark");
    };
    write_output(&doc, output)?;

    println!("Watermarked {:?} onto {}", text, output.display());

    Ok(())
}
