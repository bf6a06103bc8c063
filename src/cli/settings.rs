//! Settings commands (`sticker settings ...`).

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};
use stickerprint::{CodeType, FontShift, Settings};

use crate::cli::common::{CodeTypeArg, FontShiftArg};

/// Settings subcommands.
#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the effective settings.
    Show,
    /// Print the settings file location.
    Path,
    /// Update and save settings.
    Set(SettingsSetArgs),
}

/// Arguments for `sticker settings set`.
#[derive(Args, Debug)]
pub struct SettingsSetArgs {
    #[arg(long = "code-type", value_enum, ignore_case = true)]
    pub code_type: Option<CodeTypeArg>,
    #[arg(long = "font-shift", value_enum, ignore_case = true)]
    pub font_shift: Option<FontShiftArg>,
    #[arg(long = "pictures-dir")]
    pub pictures_dir: Option<PathBuf>,
    #[arg(long)]
    pub dpi: Option<u32>,
    /// Replace the accepted photo extensions (repeatable).
    #[arg(long = "photo-extension")]
    pub photo_extensions: Vec<String>,
}

/// Execute a settings command.
pub fn handle(command: SettingsCommand, settings: Settings, path: &Path) -> Result<()> {
    match command {
        SettingsCommand::Show => show(&settings),
        SettingsCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }
        SettingsCommand::Set(args) => set(args, settings, path),
    }
}

fn show(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

fn set(args: SettingsSetArgs, mut settings: Settings, path: &Path) -> Result<()> {
    if let Some(code_type) = args.code_type {
        settings.code_type = CodeType::from(code_type);
    }
    if let Some(font_shift) = args.font_shift {
        settings.font_shift = FontShift::from(font_shift);
    }
    if let Some(dir) = args.pictures_dir {
        settings.pictures_dir = Some(dir);
    }
    if let Some(dpi) = args.dpi {
        settings.dpi = dpi;
    }
    if !args.photo_extensions.is_empty() {
        settings.photo_extensions = normalize_extensions(&args.photo_extensions);
    }
    settings.save(path)?;
    println!("Saved settings to {}", path.display());
    Ok(())
}

/// `.JPG` and `jpg` name the same extension.
fn normalize_extensions(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_lose_dot_and_case() {
        let raw = vec![".JPG".to_string(), "Png".to_string(), "jpeg".to_string()];
        assert_eq!(normalize_extensions(&raw), vec!["jpg", "png", "jpeg"]);
    }
}
