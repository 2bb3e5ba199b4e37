mod cli;
mod commands;
mod engine;
mod error;
mod mcp;
mod page_select;
mod pdf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Text { path, pages } => {
            commands::text::run(&path, pages.as_deref())?;
        }
        Commands::Extract {
            path,
            pages,
            output,
        } => {
            commands::extract::run(&path, &pages, &output)?;
        }
        Commands::Delete {
            path,
            pages,
            output,
        } => {
            commands::delete::run(&path, &pages, &output)?;
        }
        Commands::Reorder {
            path,
            pages,
            output,
        } => {
            commands::reorder::run(&path, &pages, &output)?;
        }
        Commands::Rotate {
            path,
            degrees,
            pages,
            output,
        } => {
            commands::rotate::run(&path, &pages, degrees, &output)?;
        }
        Commands::Merge { inputs, output } => {
            commands::merge::run(&inputs, &output)?;
        }
        Commands::Split { path, output_dir } => {
            commands::split::run(&path, &output_dir)?;
        }
        Commands::Watermark {
            path,
            text,
            pages,
            font_size,
            color,
            opacity,
            x,
            y,
            output,
        } => {
            let style = pdf::overlay::WatermarkStyle {
                text,
                font_size,
                color,
                opacity,
                x,
                y,
            };
            commands::watermark::run(&path, &pages, style, &output)?;
        }
        Commands::AddImage {
            path,
            image,
            pages,
            x,
            y,
            scale,
            output,
        } => {
            let placement = pdf::image::ImagePlacement { x, y, scale };
            commands::add_image::run(&path, &image, &pages, placement, &output)?;
        }
    }

    Ok(())
}
