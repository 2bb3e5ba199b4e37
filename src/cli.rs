use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfpages")]
#[command(about = "Page-oriented PDF manipulation tool with MCP server support")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server (primary mode)
    Mcp,

    /// Display PDF metadata
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Extract text content
    Text {
        /// PDF file to read
        path: PathBuf,

        /// Page selection (e.g., "1-5,10"); all pages when omitted
        #[arg(short, long)]
        pages: Option<String>,
    },

    /// Extract selected pages to a new PDF
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Page selection (e.g., "1-5,10")
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove selected pages
    Delete {
        /// PDF file to delete from
        path: PathBuf,

        /// Page selection (e.g., "2,7-9")
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rebuild the document with pages in the given order
    Reorder {
        /// PDF file to reorder
        path: PathBuf,

        /// Page order (e.g., "3,1,2"); duplicates repeat a page
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rotate selected pages
    Rotate {
        /// PDF file to rotate
        path: PathBuf,

        /// Rotation in degrees, a multiple of 90 (negative rotates left)
        #[arg(allow_negative_numbers = true)]
        degrees: i64,

        /// Page selection (default: all pages)
        #[arg(short, long, default_value = "all")]
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Combine multiple PDFs into one
    Merge {
        /// PDF files to merge, in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Split PDF into individual pages
    #[command(alias = "burst")]
    Split {
        /// PDF file to split
        path: PathBuf,

        /// Output directory
        #[arg(short = 'd', long)]
        output_dir: PathBuf,
    },

    /// Draw translucent text on selected pages
    Watermark {
        /// PDF file to watermark
        path: PathBuf,

        /// Watermark text
        text: String,

        /// Page selection (default: all pages)
        #[arg(short, long, default_value = "all")]
        pages: String,

        /// Font size in points
        #[arg(long, default_value = "48")]
        font_size: f32,

        /// Text color as 6 hex digits
        #[arg(long, default_value = "808080")]
        color: String,

        /// Opacity between 0 and 1
        #[arg(long, default_value = "0.3")]
        opacity: f32,

        /// Horizontal position in points; centered when omitted
        #[arg(long)]
        x: Option<f32>,

        /// Vertical position in points; centered when omitted
        #[arg(long)]
        y: Option<f32>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Stamp a PNG or JPEG image onto selected pages
    AddImage {
        /// PDF file to stamp
        path: PathBuf,

        /// Image file (.png, .jpg, .jpeg)
        image: PathBuf,

        /// Page selection (default: all pages)
        #[arg(short, long, default_value = "all")]
        pages: String,

        /// Horizontal position in points from the left edge
        #[arg(long, default_value = "0")]
        x: f32,

        /// Vertical position in points from the bottom edge
        #[arg(long, default_value = "0")]
        y: f32,

        /// Uniform scale applied to the image's pixel dimensions
        #[arg(long, default_value = "1.0")]
        scale: f32,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}
