//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use stickerprint::{Settings, StudentSticker};

/// Resolve plain-text input for commands that accept either inline strings or files.
pub fn read_text_arg(text: Option<String>, from: Option<PathBuf>) -> Result<String> {
    if let Some(t) = text {
        return Ok(t);
    }
    if let Some(path) = from {
        if path.as_os_str() == "-" {
            return read_stdin();
        }
        return fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    read_stdin()
}

/// Read the entire stdin stream into memory.
pub fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read from stdin")?;
    Ok(buffer)
}

/// Strip one trailing line break left by files and pipes.
pub fn trim_line_ending(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

/// Resolve a photo argument to an absolute path: relative names are looked up
/// in the pictures directory when they do not exist as given.
pub fn resolve_photo(path: &Path, settings: &Settings) -> Result<PathBuf> {
    if !settings.accepts_photo(path) {
        return Err(anyhow!(
            "photo {} must have one of the extensions: {}",
            path.display(),
            settings.photo_extensions.join(", ")
        ));
    }
    if path.exists() {
        return absolute_photo(path);
    }
    if path.is_relative() {
        if let Some(dir) = settings.pictures_dir.as_ref() {
            let candidate = dir.join(path);
            if candidate.exists() {
                return absolute_photo(&candidate);
            }
        }
    }
    Err(anyhow!("photo {} not found", path.display()))
}

fn absolute_photo(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("failed to resolve photo {}", path.display()))
}

/// Load a sticker file; errors already name the path.
pub fn load_sticker(path: &Path) -> Result<StudentSticker> {
    StudentSticker::load(path)
}

/// Printable form of a barcode font string: non-ASCII symbols as `\u{..}`.
pub fn escape_symbols(barcode: &str) -> String {
    barcode.chars().fold(String::new(), |mut out, ch| {
        if ch.is_ascii_graphic() || ch == ' ' {
            out.push(ch);
        } else {
            out.push_str(&format!("\\u{{{:02X}}}", u32::from(ch)));
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_single_line_ending() {
        assert_eq!(trim_line_ending("2024-1\n"), "2024-1");
        assert_eq!(trim_line_ending("2024-1\r\n"), "2024-1");
        assert_eq!(trim_line_ending("2024-1\n\n"), "2024-1\n");
        assert_eq!(trim_line_ending("2024-1"), "2024-1");
    }

    #[test]
    fn escapes_shifted_symbols() {
        assert_eq!(escape_symbols("\u{CC}Kotu-12345t\u{CE}"), "\\u{CC}Kotu-12345t\\u{CE}");
        assert_eq!(escape_symbols("\u{7F}"), "\\u{7F}");
    }

    #[test]
    fn photo_paths_are_made_absolute() {
        // Tests run from the package root, where Cargo.toml exists.
        let settings = Settings {
            pictures_dir: None,
            photo_extensions: vec!["toml".to_string()],
            ..Settings::default()
        };
        let resolved = resolve_photo(Path::new("Cargo.toml"), &settings).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("Cargo.toml"));

        let dir = std::env::temp_dir().join(format!("stickerprint-photos-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("student.jpg"), b"jpg").unwrap();
        let settings = Settings {
            pictures_dir: Some(dir.clone()),
            ..Settings::default()
        };
        let resolved = resolve_photo(Path::new("student.jpg"), &settings).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, fs::canonicalize(dir.join("student.jpg")).unwrap());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn photo_extension_is_checked_before_lookup() {
        let settings = Settings {
            pictures_dir: None,
            ..Settings::default()
        };
        let err = resolve_photo(Path::new("student.gif"), &settings).unwrap_err();
        assert!(err.to_string().contains("extensions"));
        let err = resolve_photo(Path::new("missing-student.jpg"), &settings).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn missing_sticker_names_path_once() {
        let path = std::env::temp_dir().join("stickerprint-no-such-sticker.json");
        let err = load_sticker(&path).unwrap_err();
        let message = format!("{err:#}");
        assert_eq!(message.matches(&*path.display().to_string()).count(), 1);
    }
}
