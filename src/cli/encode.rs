//! Encoding helpers (`sticker encode ...`).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use stickerprint::{Code128Encoder, EncodedBarcode, Settings};
use tracing::info;

use crate::cli::common::EncoderArgs;
use crate::cli::utils::{escape_symbols, read_text_arg, trim_line_ending};

/// Encode subcommands.
#[derive(Subcommand, Debug)]
pub enum EncodeCommand {
    /// Encode text into a Code 128 barcode font string.
    Text(EncodeTextArgs),
}

/// Arguments for `sticker encode text`.
#[derive(Args, Debug)]
pub struct EncodeTextArgs {
    /// Input text (falls back to stdin if omitted).
    #[arg(long)]
    pub text: Option<String>,
    /// Read input from file (`-` for stdin).
    #[arg(long = "from")]
    pub from: Option<PathBuf>,
    #[command(flatten)]
    pub encoder: EncoderArgs,
    /// Print a JSON report with code points and checksum.
    #[arg(long)]
    pub json: bool,
    /// Escape non-ASCII symbols as `\u{..}`.
    #[arg(long)]
    pub escape: bool,
}

#[derive(Serialize)]
struct EncodeReport<'a> {
    text: &'a str,
    code_type: String,
    font_shift: String,
    barcode: String,
    code_points: Vec<u32>,
    checksum: u8,
}

impl<'a> EncodeReport<'a> {
    fn new(text: &'a str, encoder: &Code128Encoder, parts: &EncodedBarcode) -> Self {
        Self {
            text,
            code_type: encoder.code_type().to_string(),
            font_shift: encoder.font_shift().to_string(),
            barcode: parts.to_string(),
            code_points: parts.code_points(),
            checksum: parts.checksum_value,
        }
    }
}

/// Execute an encode command.
pub fn handle(command: EncodeCommand, settings: &Settings) -> Result<()> {
    match command {
        EncodeCommand::Text(args) => text(args, settings),
    }
}

fn text(args: EncodeTextArgs, settings: &Settings) -> Result<()> {
    let raw = read_text_arg(args.text.clone(), args.from.clone())?;
    let input = trim_line_ending(&raw);
    let encoder = args.encoder.encoder(settings);
    let parts = encoder.encode_parts(input)?;
    info!(
        code_type = %encoder.code_type(),
        font_shift = %encoder.font_shift(),
        checksum = parts.checksum_value,
        "encoded barcode"
    );
    if args.json {
        let report = EncodeReport::new(input, &encoder, &parts);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.escape {
        println!("{}", escape_symbols(&parts.to_string()));
    } else {
        println!("{}", parts);
    }
    Ok(())
}
