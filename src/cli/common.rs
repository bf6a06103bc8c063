//! Shared clap helper types for CLI commands.

use clap::{Args, ValueEnum};
use stickerprint::{Code128Encoder, CodeType, FontShift, PageLayout, Settings};

/// Code set selector accepted by CLI commands.
#[derive(ValueEnum, Debug, Clone, Copy)]
#[value(rename_all = "UPPER")]
pub enum CodeTypeArg {
    A,
    B,
    C,
}

impl From<CodeTypeArg> for CodeType {
    fn from(value: CodeTypeArg) -> CodeType {
        match value {
            CodeTypeArg::A => CodeType::A,
            CodeTypeArg::B => CodeType::B,
            CodeTypeArg::C => CodeType::C,
        }
    }
}

/// Barcode font layouts.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FontShiftArg {
    Common,
    Uncommon,
    Barcodesoft,
}

impl From<FontShiftArg> for FontShift {
    fn from(value: FontShiftArg) -> FontShift {
        match value {
            FontShiftArg::Common => FontShift::Common,
            FontShiftArg::Uncommon => FontShift::Uncommon,
            FontShiftArg::Barcodesoft => FontShift::Barcodesoft,
        }
    }
}

/// Output page layout options for image rendering.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PageLayoutArg {
    Sticker,
    A4,
}

impl From<PageLayoutArg> for PageLayout {
    fn from(value: PageLayoutArg) -> PageLayout {
        match value {
            PageLayoutArg::Sticker => PageLayout::Sticker,
            PageLayoutArg::A4 => PageLayout::A4,
        }
    }
}

/// Encoder selectors; unset flags fall back to the settings file.
#[derive(Args, Debug, Clone, Copy)]
pub struct EncoderArgs {
    /// Code set of the start symbol.
    #[arg(long = "code-type", value_enum, ignore_case = true)]
    pub code_type: Option<CodeTypeArg>,
    /// Glyph layout of the barcode font.
    #[arg(long = "font-shift", value_enum, ignore_case = true)]
    pub font_shift: Option<FontShiftArg>,
}

impl EncoderArgs {
    pub fn encoder(&self, settings: &Settings) -> Code128Encoder {
        Code128Encoder::new(
            self.code_type.map(CodeType::from).unwrap_or(settings.code_type),
            self.font_shift
                .map(FontShift::from)
                .unwrap_or(settings.font_shift),
        )
    }
}
