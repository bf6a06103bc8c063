//! Sticker record commands (`sticker sticker ...`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use stickerprint::{PhotoFrame, Settings, StudentSticker};
use tracing::info;

use crate::cli::common::EncoderArgs;
use crate::cli::utils::{escape_symbols, load_sticker, resolve_photo};

/// Sticker subcommands.
#[derive(Subcommand, Debug)]
pub enum StickerCommand {
    /// Create a sticker file from student details.
    New(StickerNewArgs),
    /// Print the contents of a sticker file.
    Show(StickerShowArgs),
    /// Change the student number and re-encode the barcode.
    Renumber(StickerRenumberArgs),
    /// Change the student's names.
    Rename(StickerRenameArgs),
}

/// Arguments for `sticker sticker new`.
#[derive(Args, Debug)]
pub struct StickerNewArgs {
    #[arg(long)]
    pub first: String,
    #[arg(long)]
    pub last: String,
    /// Student number encoded into the barcode.
    #[arg(long)]
    pub number: String,
    /// Photo file (jpg/png); relative names also resolve in the pictures directory.
    #[arg(long)]
    pub photo: Option<PathBuf>,
    #[arg(long, default_value_t = 1.0)]
    pub zoom: f32,
    #[arg(long = "offset-x", default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset_x: f32,
    #[arg(long = "offset-y", default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset_y: f32,
    #[command(flatten)]
    pub encoder: EncoderArgs,
    /// Sticker file to write.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

/// Arguments for `sticker sticker show`.
#[derive(Args, Debug)]
pub struct StickerShowArgs {
    pub sticker: PathBuf,
}

/// Arguments for `sticker sticker renumber`.
#[derive(Args, Debug)]
pub struct StickerRenumberArgs {
    pub sticker: PathBuf,
    #[arg(long)]
    pub number: String,
}

/// Arguments for `sticker sticker rename`.
#[derive(Args, Debug)]
pub struct StickerRenameArgs {
    pub sticker: PathBuf,
    #[arg(long)]
    pub first: Option<String>,
    #[arg(long)]
    pub last: Option<String>,
}

/// Execute a sticker command.
pub fn handle(command: StickerCommand, settings: &Settings) -> Result<()> {
    match command {
        StickerCommand::New(args) => new(args, settings),
        StickerCommand::Show(args) => show(args),
        StickerCommand::Renumber(args) => renumber(args),
        StickerCommand::Rename(args) => rename(args),
    }
}

fn new(args: StickerNewArgs, settings: &Settings) -> Result<()> {
    let encoder = args.encoder.encoder(settings);
    let mut sticker = StudentSticker::new(args.first, args.last, args.number, &encoder)
        .context("student number cannot be encoded")?;
    if let Some(photo) = args.photo.as_ref() {
        let path = resolve_photo(photo, settings)?;
        let frame = PhotoFrame::new(args.zoom, args.offset_x, args.offset_y)?;
        sticker = sticker.with_photo(path, frame);
    }
    sticker.save(&args.output)?;
    info!(path = %args.output.display(), "sticker created");
    println!(
        "Created sticker for {} ({}) at {}",
        sticker.full_name(),
        sticker.student_number,
        args.output.display()
    );
    Ok(())
}

fn show(args: StickerShowArgs) -> Result<()> {
    let sticker = load_sticker(&args.sticker)?;
    println!("Name:    {}", sticker.full_name());
    println!("Number:  {}", sticker.student_number);
    println!(
        "Barcode: {} ({}, {})",
        escape_symbols(&sticker.barcode),
        sticker.code_type,
        sticker.font_shift
    );
    match sticker.photo.as_ref() {
        Some(photo) => println!(
            "Photo:   {} (zoom {:.2}, offset {:.2}/{:.2})",
            photo.display(),
            sticker.photo_frame.zoom,
            sticker.photo_frame.offset_x,
            sticker.photo_frame.offset_y
        ),
        None => println!("Photo:   (none)"),
    }
    println!("Created: {}", sticker.created_at);
    Ok(())
}

fn renumber(args: StickerRenumberArgs) -> Result<()> {
    let mut sticker = load_sticker(&args.sticker)?;
    sticker
        .set_student_number(args.number)
        .context("student number cannot be encoded")?;
    sticker.save(&args.sticker)?;
    println!(
        "Student number set to {} in {}",
        sticker.student_number,
        args.sticker.display()
    );
    Ok(())
}

fn rename(args: StickerRenameArgs) -> Result<()> {
    let mut sticker = load_sticker(&args.sticker)?;
    apply_names(&mut sticker, args.first, args.last);
    sticker.save(&args.sticker)?;
    println!("Name set to {} in {}", sticker.full_name(), args.sticker.display());
    Ok(())
}

/// Replace the given names, keeping the stored one where a name is omitted.
fn apply_names(sticker: &mut StudentSticker, first: Option<String>, last: Option<String>) {
    let first = first.unwrap_or_else(|| sticker.first_name.clone());
    let last = last.unwrap_or_else(|| sticker.last_name.clone());
    sticker.set_names(first, last);
}

#[cfg(test)]
mod tests {
    use super::*;
    use stickerprint::Code128Encoder;

    #[test]
    fn rename_keeps_omitted_names() {
        let enc = Code128Encoder::default();
        let mut sticker = StudentSticker::new("Kalle", "Koululainen", "1", &enc).unwrap();
        apply_names(&mut sticker, None, Some("Virtanen".to_string()));
        assert_eq!(sticker.full_name(), "Kalle Virtanen");
        apply_names(&mut sticker, Some("Ville".to_string()), None);
        assert_eq!(sticker.full_name(), "Ville Virtanen");
        apply_names(&mut sticker, None, None);
        assert_eq!(sticker.full_name(), "Ville Virtanen");
    }
}
