use crate::encoding::{BarcodeEncoding, Code128Encoder, CodeType, EncodeError, FontShift};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 4.0;

/// Selects which part of the photo shows through the sticker's photo area.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PhotoFrame {
    /// Magnification relative to the largest crop that fits the area.
    pub zoom: f32,
    /// Horizontal pan, -1.0 (left edge) ..= 1.0 (right edge).
    pub offset_x: f32,
    /// Vertical pan, -1.0 (top edge) ..= 1.0 (bottom edge).
    pub offset_y: f32,
}

impl Default for PhotoFrame {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl PhotoFrame {
    pub fn new(zoom: f32, offset_x: f32, offset_y: f32) -> Result<Self> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(anyhow!(
                "zoom must be within {}..={} (got {})",
                MIN_ZOOM,
                MAX_ZOOM,
                zoom
            ));
        }
        for (axis, value) in [("x", offset_x), ("y", offset_y)] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(anyhow!(
                    "offset {} must be within -1.0..=1.0 (got {})",
                    axis,
                    value
                ));
            }
        }
        Ok(Self {
            zoom,
            offset_x,
            offset_y,
        })
    }

    /// Crop rectangle `(x, y, width, height)` inside a `src_w` x `src_h` photo
    /// matching the aspect ratio of a `dst_w` x `dst_h` area.
    pub fn crop_rect(&self, src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32, u32, u32) {
        if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
            return (0, 0, src_w, src_h);
        }
        let zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let dst_ratio = dst_w as f32 / dst_h as f32;
        let src_ratio = src_w as f32 / src_h as f32;
        let (full_w, full_h) = if src_ratio > dst_ratio {
            (src_h as f32 * dst_ratio, src_h as f32)
        } else {
            (src_w as f32, src_w as f32 / dst_ratio)
        };
        let crop_w = (full_w / zoom).round().clamp(1.0, src_w as f32);
        let crop_h = (full_h / zoom).round().clamp(1.0, src_h as f32);
        let slack_x = src_w as f32 - crop_w;
        let slack_y = src_h as f32 - crop_h;
        let x = slack_x * (self.offset_x.clamp(-1.0, 1.0) + 1.0) / 2.0;
        let y = slack_y * (self.offset_y.clamp(-1.0, 1.0) + 1.0) / 2.0;
        (
            x.round() as u32,
            y.round() as u32,
            crop_w as u32,
            crop_h as u32,
        )
    }
}

/// A student ID sticker as printed: names, number, photo and the barcode
/// font string derived from the number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentSticker {
    pub first_name: String,
    pub last_name: String,
    pub student_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<PathBuf>,
    #[serde(default)]
    pub photo_frame: PhotoFrame,
    #[serde(default)]
    pub code_type: CodeType,
    #[serde(default)]
    pub font_shift: FontShift,
    pub barcode: String,
    pub created_at: DateTime<Utc>,
}

impl StudentSticker {
    pub fn new<S: Into<String>>(
        first_name: S,
        last_name: S,
        student_number: S,
        encoder: &Code128Encoder,
    ) -> Result<Self, EncodeError> {
        let student_number = student_number.into();
        let barcode = encoder.encode(&student_number)?;
        Ok(Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            student_number,
            photo: None,
            photo_frame: PhotoFrame::default(),
            code_type: encoder.code_type(),
            font_shift: encoder.font_shift(),
            barcode,
            created_at: Utc::now(),
        })
    }

    pub fn with_photo(mut self, path: PathBuf, frame: PhotoFrame) -> Self {
        self.photo = Some(path);
        self.photo_frame = frame;
        self
    }

    /// First and last name joined by a single space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn set_names<S: Into<String>>(&mut self, first_name: S, last_name: S) {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
    }

    /// Replace the number and re-encode the barcode. On failure the sticker
    /// is left unchanged.
    pub fn set_student_number<S: Into<String>>(&mut self, number: S) -> Result<(), EncodeError> {
        let number = number.into();
        self.barcode = self.encoder().encode(&number)?;
        self.student_number = number;
        Ok(())
    }

    pub fn encoder(&self) -> Code128Encoder {
        Code128Encoder::new(self.code_type, self.font_shift)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .with_context(|| format!("failed to open sticker file {}", path.display()))?;
        let sticker: StudentSticker = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse sticker file {}", path.display()))?;
        let expected = sticker
            .encoder()
            .encode(&sticker.student_number)
            .with_context(|| format!("invalid student number in {}", path.display()))?;
        if expected != sticker.barcode {
            return Err(anyhow!(
                "stored barcode in {} does not match student number '{}'",
                path.display(),
                sticker.student_number
            ));
        }
        debug!(path = %path.display(), "loaded sticker");
        Ok(sticker)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create directory {}", parent.display())
                })?;
            }
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to write sticker file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).context("failed to serialize sticker")?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        debug!(path = %path.display(), "saved sticker");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("stickerprint-{}-{}", std::process::id(), name))
            .join("sticker.json")
    }

    #[test]
    fn full_name_joins_with_single_space() {
        let enc = Code128Encoder::default();
        let sticker = StudentSticker::new("Kalle", "Koululainen", "Kotu-12345", &enc).unwrap();
        assert_eq!(sticker.full_name(), "Kalle Koululainen");
        assert_eq!(sticker.barcode, "\u{CC}Kotu-12345t\u{CE}");

        let only_first = StudentSticker::new("Kalle", "", "1", &enc).unwrap();
        assert_eq!(only_first.full_name(), "Kalle ");
    }

    #[test]
    fn renumber_keeps_selectors() {
        let enc = Code128Encoder::new(CodeType::B, FontShift::Barcodesoft);
        let mut sticker = StudentSticker::new("A", "B", "1", &enc).unwrap();
        sticker.set_student_number("Kotu-12345").unwrap();
        assert_eq!(sticker.barcode, "\u{F9}Kotu-12345t\u{FB}");
    }

    #[test]
    fn failed_renumber_leaves_sticker_untouched() {
        let enc = Code128Encoder::default();
        let mut sticker = StudentSticker::new("A", "B", "42", &enc).unwrap();
        let before = sticker.clone();
        assert!(sticker.set_student_number("4\n2").is_err());
        assert_eq!(sticker, before);
    }

    #[test]
    fn save_and_load() {
        let path = temp_path("roundtrip");
        let enc = Code128Encoder::default();
        let sticker = StudentSticker::new("Maija", "Meikäläinen", "2024-0042", &enc)
            .unwrap()
            .with_photo(PathBuf::from("maija.jpg"), PhotoFrame::new(1.5, 0.2, -0.4).unwrap());
        sticker.save(&path).unwrap();
        let loaded = StudentSticker::load(&path).unwrap();
        assert_eq!(loaded, sticker);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn load_rejects_stale_barcode() {
        let path = temp_path("stale");
        let enc = Code128Encoder::default();
        let mut sticker = StudentSticker::new("A", "B", "1000", &enc).unwrap();
        sticker.student_number = "1001".to_string();
        sticker.save(&path).unwrap();
        let err = StudentSticker::load(&path).unwrap_err();
        assert!(err.to_string().contains("does not match"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn photo_frame_bounds() {
        assert!(PhotoFrame::new(0.5, 0.0, 0.0).is_err());
        assert!(PhotoFrame::new(1.0, 1.5, 0.0).is_err());
        assert!(PhotoFrame::new(4.0, -1.0, 1.0).is_ok());
    }

    #[test]
    fn crop_rect_matches_area_aspect() {
        // 400x300 landscape into a 3:4 portrait area: full height, width 225
        let frame = PhotoFrame::default();
        assert_eq!(frame.crop_rect(400, 300, 90, 120), (88, 0, 225, 300));

        let left = PhotoFrame::new(1.0, -1.0, 0.0).unwrap();
        assert_eq!(left.crop_rect(400, 300, 90, 120), (0, 0, 225, 300));

        let zoomed = PhotoFrame::new(2.0, 1.0, 1.0).unwrap();
        assert_eq!(zoomed.crop_rect(400, 300, 90, 120), (287, 150, 113, 150));
    }
}
