//! Command-line interface wiring for the `sticker` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! specialized submodules that encapsulate each command family.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use stickerprint::{Settings, default_settings_path};
use tracing::debug;

pub mod common;
pub mod encode;
pub mod render;
pub mod settings;
pub mod sticker;
pub mod utils;

/// Parsed CLI entrypoint for the `sticker` binary.
#[derive(Parser, Debug)]
#[command(name = "sticker", version, about = "Student ID sticker toolkit")]
pub struct Cli {
    /// Settings file (defaults to the per-user config directory).
    #[arg(long, global = true, env = "STICKER_SETTINGS")]
    pub settings: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// High-level command families made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Encode(encode::EncodeCommand),
    #[command(subcommand)]
    Sticker(sticker::StickerCommand),
    #[command(subcommand)]
    Render(render::RenderCommand),
    #[command(subcommand)]
    Settings(settings::SettingsCommand),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    let settings_path = match cli.settings {
        Some(path) => path,
        None => default_settings_path()
            .ok_or_else(|| anyhow!("cannot locate a config directory; pass --settings"))?,
    };
    debug!(path = %settings_path.display(), "using settings file");
    let config = Settings::load_or_default(&settings_path)?;
    match cli.command {
        Command::Encode(cmd) => encode::handle(cmd, &config),
        Command::Sticker(cmd) => sticker::handle(cmd, &config),
        Command::Render(cmd) => render::handle(cmd, &config),
        Command::Settings(cmd) => settings::handle(cmd, config, &settings_path),
    }
}
