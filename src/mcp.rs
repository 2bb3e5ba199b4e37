use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::commands::read_attachment;
use crate::engine::{self, Operation, OperationOutput};
use crate::page_select::{self, Policy};
use crate::pdf::image::ImagePlacement;
use crate::pdf::overlay::WatermarkStyle;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadTextRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page selection (e.g., '1-5,10'); all pages when omitted")]
    #[serde(default)]
    pub pages: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PageSelectionRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Page selection (e.g., '1-5,10')")]
    pub pages: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RotateRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Rotation in degrees, a multiple of 90 (negative rotates left)")]
    pub degrees: i64,
    #[schemars(description = "Page selection (default: all pages)")]
    #[serde(default = "default_pages")]
    pub pages: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MergeRequest {
    #[schemars(description = "Paths of the PDF files to merge, in order (at least 2)")]
    pub inputs: Vec<String>,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SplitRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Directory for the single-page output files")]
    pub output_dir: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WatermarkRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Watermark text")]
    pub text: String,
    #[schemars(description = "Page selection (default: all pages)")]
    #[serde(default = "default_pages")]
    pub pages: String,
    #[schemars(description = "Font size in points (default: 48)")]
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[schemars(description = "Text color as 6 hex digits (default: 808080)")]
    #[serde(default = "default_color")]
    pub color: String,
    #[schemars(description = "Opacity between 0 and 1 (default: 0.3)")]
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[schemars(description = "Horizontal position in points; centered when omitted")]
    #[serde(default)]
    pub x: Option<f32>,
    #[schemars(description = "Vertical position in points; centered when omitted")]
    #[serde(default)]
    pub y: Option<f32>,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddImageRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Path to the image file (.png, .jpg, .jpeg)")]
    pub image: String,
    #[schemars(description = "Page selection (default: all pages)")]
    #[serde(default = "default_pages")]
    pub pages: String,
    #[schemars(description = "Horizontal position in points from the left edge (default: 0)")]
    #[serde(default)]
    pub x: f32,
    #[schemars(description = "Vertical position in points from the bottom edge (default: 0)")]
    #[serde(default)]
    pub y: f32,
    #[schemars(description = "Uniform scale applied to the image's pixel dimensions (default: 1)")]
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[schemars(description = "Output file path")]
    pub output: String,
}

fn default_pages() -> String {
    "all".to_string()
}

fn default_font_size() -> f32 {
    48.0
}

fn default_color() -> String {
    "808080".to_string()
}

fn default_opacity() -> f32 {
    0.3
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get PDF metadata including title, author, creator, producer, dates, and page count")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let result = (|| -> Result<InfoResult> {
            let input = read_attachment(Path::new(&path))?;
            let OperationOutput::Metadata(meta) =
                engine::execute(&Operation::ReadMetadata, &[input])?
            else {
                anyhow::bail!("unexpected output shape");
            };
            Ok(InfoResult {
                path,
                page_count: meta.page_count,
                title: meta.title,
                author: meta.author,
                subject: meta.subject,
                keywords: meta.keywords,
                creator: meta.creator,
                producer: meta.producer,
                creation_date: meta.creation_date,
                modification_date: meta.modification_date,
            })
        })();
        to_json(result)
    }

    #[tool(description = "Extract text content from a PDF, optionally limited to a page selection like '1-5,10'")]
    fn pdf_read_text(&self, Parameters(req): Parameters<ReadTextRequest>) -> String {
        let result = (|| -> Result<Vec<PageTextResult>> {
            let input = read_attachment(Path::new(&req.path))?;
            let OperationOutput::Text(text) = engine::execute(&Operation::ExtractText, &[input])?
            else {
                anyhow::bail!("unexpected output shape");
            };

            let chunks = crate::pdf::text::split_pages(&text);
            let selected = match &req.pages {
                Some(expression) => {
                    page_select::resolve(expression, chunks.len(), Policy::LENIENT_SORTED)?
                }
                None => (0..chunks.len()).collect(),
            };
            Ok(selected
                .into_iter()
                .map(|page| PageTextResult {
                    page: page as u32 + 1,
                    text: chunks[page].trim_end().to_string(),
                })
                .collect())
        })();
        to_json(result)
    }

    #[tool(description = "Extract selected pages from a PDF into a new file. Invalid or out-of-range pages are skipped.")]
    fn pdf_extract(&self, Parameters(req): Parameters<PageSelectionRequest>) -> String {
        let op = Operation::Extract { pages: req.pages };
        to_json(run_to_file(&op, &[&req.path], &req.output))
    }

    #[tool(description = "Remove selected pages from a PDF and save the rest to a new file")]
    fn pdf_delete(&self, Parameters(req): Parameters<PageSelectionRequest>) -> String {
        let op = Operation::Delete { pages: req.pages };
        to_json(run_to_file(&op, &[&req.path], &req.output))
    }

    #[tool(description = "Rebuild a PDF with pages in the given order, e.g. '3,1,2'. Duplicates repeat a page; omissions drop one. Any invalid page fails the operation.")]
    fn pdf_reorder(&self, Parameters(req): Parameters<PageSelectionRequest>) -> String {
        let op = Operation::Reorder { pages: req.pages };
        to_json(run_to_file(&op, &[&req.path], &req.output))
    }

    #[tool(description = "Rotate selected pages by a multiple of 90 degrees. Rotation accumulates with any existing page rotation.")]
    fn pdf_rotate(&self, Parameters(req): Parameters<RotateRequest>) -> String {
        if req.degrees % 90 != 0 {
            return format!(
                "Error: Rotation must be a multiple of 90 degrees, got {}",
                req.degrees
            );
        }
        let op = Operation::Rotate {
            pages: req.pages,
            degrees: req.degrees,
        };
        to_json(run_to_file(&op, &[&req.path], &req.output))
    }

    #[tool(description = "Merge two or more PDFs into one, appending pages in input order")]
    fn pdf_merge(&self, Parameters(req): Parameters<MergeRequest>) -> String {
        let inputs: Vec<&str> = req.inputs.iter().map(String::as_str).collect();
        to_json(run_to_file(&Operation::Merge, &inputs, &req.output))
    }

    #[tool(description = "Split a PDF into one single-page file per page, named <stem>_0001.pdf and so on")]
    fn pdf_split(&self, Parameters(req): Parameters<SplitRequest>) -> String {
        let result = (|| -> Result<SplitResult> {
            let output_dir = Path::new(&req.output_dir);
            std::fs::create_dir_all(output_dir)?;

            let input = read_attachment(Path::new(&req.path))?;
            let OperationOutput::Documents(docs) = engine::execute(&Operation::Split, &[input])?
            else {
                anyhow::bail!("unexpected output shape");
            };

            let mut files = Vec::with_capacity(docs.len());
            for doc in docs {
                let output_path = output_dir.join(&doc.file_name);
                std::fs::write(&output_path, &doc.bytes)?;
                files.push(output_path.to_string_lossy().into_owned());
            }
            Ok(SplitResult {
                output_dir: req.output_dir,
                files,
            })
        })();
        to_json(result)
    }

    #[tool(description = "Draw translucent watermark text on selected pages of a PDF")]
    fn pdf_watermark(&self, Parameters(req): Parameters<WatermarkRequest>) -> String {
        let op = Operation::Watermark {
            pages: req.pages,
            style: WatermarkStyle {
                text: req.text,
                font_size: req.font_size,
                color: req.color,
                opacity: req.opacity,
                x: req.x,
                y: req.y,
            },
        };
        to_json(run_to_file(&op, &[&req.path], &req.output))
    }

    #[tool(description = "Stamp a PNG or JPEG image onto selected pages of a PDF")]
    fn pdf_add_image(&self, Parameters(req): Parameters<AddImageRequest>) -> String {
        let op = Operation::AddImage {
            pages: req.pages,
            placement: ImagePlacement {
                x: req.x,
                y: req.y,
                scale: req.scale,
            },
        };
        to_json(run_to_file(&op, &[&req.path, &req.image], &req.output))
    }
}

/// Run a document-producing operation against files and write the result
/// where the caller asked.
fn run_to_file(op: &Operation, input_paths: &[&str], output: &str) -> Result<DocumentResult> {
    let inputs = input_paths
        .iter()
        .map(|p| read_attachment(Path::new(p)))
        .collect::<Result<Vec<_>>>()?;

    let OperationOutput::Document(doc) = engine::execute(op, &inputs)? else {
        anyhow::bail!("unexpected output shape");
    };
    std::fs::write(output, &doc.bytes)?;

    let page_count = lopdf::Document::load_mem(&doc.bytes)
        .map(|d| d.get_pages().len())
        .unwrap_or(0);
    Ok(DocumentResult {
        output_path: output.to_string(),
        page_count,
    })
}

fn to_json<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("Error: {}", e))
        }
        Err(e) => format!("Error: {}", e),
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InfoResult {
    pub path: String,
    pub page_count: usize,
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
    pub creator: String,
    pub producer: String,
    pub creation_date: String,
    pub modification_date: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageTextResult {
    pub page: u32,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DocumentResult {
    pub output_path: String,
    pub page_count: usize,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SplitResult {
    pub output_dir: String,
    pub files: Vec<String>,
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Page-oriented PDF manipulation tools. Use pdf_info for document metadata, \
                 pdf_read_text to extract text, pdf_extract/pdf_delete/pdf_reorder/pdf_rotate \
                 for page surgery, pdf_merge and pdf_split to combine or burst documents, and \
                 pdf_watermark/pdf_add_image to stamp content onto pages. Page selections are \
                 1-based and accept single pages, ranges, and 'all', e.g. '1-5,10'."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
