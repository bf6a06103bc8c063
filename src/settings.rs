//! Persistent user settings stored as a small JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::encoding::{Code128Encoder, CodeType, FontShift};
use crate::graphics::{MAX_DPI, MIN_DPI};

pub const DEFAULT_DPI: u32 = 300;
const APP_DIR: &str = "stickerprint";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub code_type: CodeType,
    pub font_shift: FontShift,
    /// Directory offered first when picking a student photo.
    pub pictures_dir: Option<PathBuf>,
    pub dpi: u32,
    /// Accepted photo file extensions, lowercase without the dot.
    pub photo_extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            code_type: CodeType::default(),
            font_shift: FontShift::default(),
            pictures_dir: home_dir().map(|home| home.join("Pictures")),
            dpi: DEFAULT_DPI,
            photo_extensions: vec!["jpg".to_string(), "png".to_string()],
        }
    }
}

impl Settings {
    /// Read settings from `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create settings directory {}", parent.display())
                })?;
            }
        }
        let mut body = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        body.push('\n');
        fs::write(path, body)
            .with_context(|| format!("failed to write settings {}", path.display()))?;
        info!(path = %path.display(), "settings saved");
        Ok(())
    }

    pub fn encoder(&self) -> Code128Encoder {
        Code128Encoder::new(self.code_type, self.font_shift)
    }

    pub fn accepts_photo(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.photo_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_DPI..=MAX_DPI).contains(&self.dpi) {
            return Err(anyhow!(
                "dpi must be within {}..={} (got {})",
                MIN_DPI,
                MAX_DPI,
                self.dpi
            ));
        }
        if self.photo_extensions.is_empty() {
            return Err(anyhow!("at least one photo extension is required"));
        }
        Ok(())
    }
}

/// Default settings location: `$XDG_CONFIG_HOME`, `~/.config` or `%APPDATA%`.
pub fn default_settings_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| home_dir().map(|home| home.join(".config")))
        .or_else(|| std::env::var_os("APPDATA").map(PathBuf::from))?;
    Some(base.join(APP_DIR).join(SETTINGS_FILE))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_settings(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("stickerprint-settings-{}-{}", std::process::id(), name))
            .join(SETTINGS_FILE)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = temp_settings("missing");
        let settings = Settings::load_or_default(&path).unwrap();
        assert_eq!(settings.code_type, CodeType::B);
        assert_eq!(settings.font_shift, FontShift::Common);
        assert_eq!(settings.dpi, DEFAULT_DPI);
    }

    #[test]
    fn save_then_load() {
        let path = temp_settings("roundtrip");
        let settings = Settings {
            font_shift: FontShift::Barcodesoft,
            pictures_dir: Some(PathBuf::from("/srv/photos")),
            dpi: 600,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load_or_default(&path).unwrap(), settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = temp_settings("partial");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "font_shift": "uncommon" }"#).unwrap();
        let settings = Settings::load_or_default(&path).unwrap();
        assert_eq!(settings.font_shift, FontShift::Uncommon);
        assert_eq!(settings.photo_extensions, vec!["jpg", "png"]);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn selector_names_ignore_case_in_file() {
        let path = temp_settings("case");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "code_type": "b", "font_shift": "Common" }"#).unwrap();
        let settings = Settings::load_or_default(&path).unwrap();
        assert_eq!(settings.code_type, CodeType::B);
        assert_eq!(settings.font_shift, FontShift::Common);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unknown_font_shift_is_rejected() {
        let path = temp_settings("badshift");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "font_shift": "fancy" }"#).unwrap();
        let err = Settings::load_or_default(&path).unwrap_err();
        assert!(format!("{err:#}").contains("unknown font shift 'fancy'"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn encoder_uses_configured_selectors() {
        let settings = Settings {
            code_type: CodeType::A,
            font_shift: FontShift::Uncommon,
            ..Settings::default()
        };
        let enc = settings.encoder();
        assert_eq!((enc.code_type(), enc.font_shift()), (CodeType::A, FontShift::Uncommon));
    }

    #[test]
    fn photo_extension_check() {
        let settings = Settings::default();
        assert!(settings.accepts_photo(Path::new("kuva.JPG")));
        assert!(settings.accepts_photo(Path::new("dir/kuva.png")));
        assert!(!settings.accepts_photo(Path::new("kuva.gif")));
        assert!(!settings.accepts_photo(Path::new("kuva")));
    }

    #[test]
    fn out_of_range_dpi_is_rejected() {
        let settings = Settings {
            dpi: 20,
            ..Settings::default()
        };
        assert!(settings.save(&temp_settings("dpi")).is_err());
    }
}
