//! Rendering commands (`sticker render ...`).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Subcommand};
use stickerprint::{MAX_DPI, MIN_DPI, Settings, StickerRenderOptions, render_sticker_image};
use tracing::{info, warn};

use crate::cli::common::PageLayoutArg;
use crate::cli::utils::load_sticker;

/// Available render subcommands.
#[derive(Subcommand, Debug)]
pub enum RenderCommand {
    /// Render a printable PNG of the sticker.
    Image(RenderImageArgs),
}

/// Args for `sticker render image`.
#[derive(Args, Debug)]
pub struct RenderImageArgs {
    /// Sticker file to render.
    pub sticker: PathBuf,
    /// Output PNG file.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Output page layout.
    #[arg(long = "pagesize", default_value_t = PageLayoutArg::Sticker, value_enum)]
    pub pagesize: PageLayoutArg,
    /// Dots per inch used when rasterising (defaults to the settings value).
    #[arg(long)]
    pub dpi: Option<u32>,
}

/// Execute a render command.
pub fn handle(command: RenderCommand, settings: &Settings) -> Result<()> {
    match command {
        RenderCommand::Image(args) => image(args, settings),
    }
}

fn image(args: RenderImageArgs, settings: &Settings) -> Result<()> {
    let sticker = load_sticker(args.sticker.as_path())?;
    let requested = args.dpi.unwrap_or(settings.dpi);
    let dpi = requested.clamp(MIN_DPI, MAX_DPI);
    if dpi != requested {
        warn!(requested, dpi, "dpi clamped");
    }
    let options = StickerRenderOptions {
        dpi,
        layout: args.pagesize.into(),
    };

    let output_path = args.output;
    let is_png = output_path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if !is_png {
        return Err(anyhow!(
            "output path {} must end in .png",
            output_path.display()
        ));
    }
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
    }

    let image = render_sticker_image(&sticker, &options)?;
    image
        .save(&output_path)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    info!(path = %output_path.display(), dpi, "sticker rendered");
    println!(
        "Rendered sticker for {} to {} at {} DPI",
        sticker.full_name(),
        output_path.display(),
        dpi
    );
    Ok(())
}
