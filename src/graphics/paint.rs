use anyhow::{Context, Result};
use image::imageops::{self, FilterType, overlay};
use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use tracing::debug;

use crate::sticker::StudentSticker;

const STICKER_WIDTH_IN: f32 = 3.0;
const STICKER_HEIGHT_IN: f32 = 1.5;
const A4_WIDTH_IN: f32 = 8.27;
const A4_HEIGHT_IN: f32 = 11.69;
pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;
pub const MIN_DPI: u32 = 72;
pub const MAX_DPI: u32 = 1200;

/// Target layout for the generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    Sticker,
    A4,
}

/// Options controlling PNG generation.
#[derive(Debug, Clone, Copy)]
pub struct StickerRenderOptions {
    pub dpi: u32,
    pub layout: PageLayout,
}

impl Default for StickerRenderOptions {
    fn default() -> Self {
        Self {
            dpi: crate::settings::DEFAULT_DPI,
            layout: PageLayout::Sticker,
        }
    }
}

const BACKGROUND: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
const PAGE: Rgba<u8> = Rgba([0xf2, 0xf2, 0xf2, 0xff]);
const INK: Rgba<u8> = Rgba([0x1a, 0x1a, 0x1a, 0xff]);
const FAINT: Rgba<u8> = Rgba([0xb0, 0xb0, 0xb0, 0xff]);

/// Pixel geometry of the sticker face at a given DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickerGeometry {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    /// Photo area `(x, y, width, height)`, 3:4 portrait.
    pub photo: (u32, u32, u32, u32),
    /// Left edge of the text column.
    pub text_x: u32,
    pub glyph_scale: u32,
}

impl StickerGeometry {
    pub fn at_dpi(dpi: u32) -> Self {
        let dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        let width = inches_to_px(STICKER_WIDTH_IN, dpi);
        let height = inches_to_px(STICKER_HEIGHT_IN, dpi);
        let margin = inches_to_px(0.08, dpi).max(2);
        let photo_h = height - 2 * margin;
        let photo_w = photo_h * 3 / 4;
        let text_x = margin * 2 + photo_w;
        let glyph_scale = (dpi as f32 / 100.0).ceil().max(1.0) as u32;
        Self {
            width,
            height,
            margin,
            photo: (margin, margin, photo_w, photo_h),
            text_x,
            glyph_scale,
        }
    }

    /// Number of glyphs that fit on one text line.
    pub fn text_capacity(&self) -> usize {
        let advance = (GLYPH_WIDTH as u32 + 1) * self.glyph_scale;
        (self.width.saturating_sub(self.text_x + self.margin) / advance) as usize
    }
}

/// Render a sticker face: photo (or placeholder), full name, student number
/// and the reserved strip where the barcode font string is printed.
pub fn render_sticker_image(
    sticker: &StudentSticker,
    options: &StickerRenderOptions,
) -> Result<DynamicImage> {
    let geometry = StickerGeometry::at_dpi(options.dpi);
    let mut face = ImageBuffer::from_pixel(geometry.width, geometry.height, BACKGROUND);
    draw_hollow_rect_mut(
        &mut face,
        Rect::at(0, 0).of_size(geometry.width, geometry.height),
        FAINT,
    );

    let (px, py, pw, ph) = geometry.photo;
    match &sticker.photo {
        Some(path) => {
            let photo = image::open(path)
                .with_context(|| format!("failed to open photo {}", path.display()))?
                .to_rgba8();
            let framed = frame_photo(&photo, sticker, pw, ph);
            overlay(&mut face, &framed, px as i64, py as i64);
        }
        None => draw_placeholder(&mut face, geometry.photo),
    }

    let scale = geometry.glyph_scale;
    let line_height = (GLYPH_HEIGHT as u32 + 3) * scale;
    let capacity = geometry.text_capacity();
    let mut y = geometry.margin as i32 + scale as i32;

    let name: String = sticker.full_name().chars().take(capacity).collect();
    draw_text(&mut face, geometry.text_x as i32, y, &name, INK, scale);
    y += line_height as i32;

    let number: String = sticker.student_number.chars().take(capacity).collect();
    draw_text(&mut face, geometry.text_x as i32, y, &number, INK, scale);
    y += line_height as i32;

    // Barcode strip: the caller overprints the barcode font string here.
    let strip_w = geometry.width.saturating_sub(geometry.text_x + geometry.margin);
    let strip_h = geometry
        .height
        .saturating_sub(y as u32 + geometry.margin)
        .max(1);
    if strip_w > 0 {
        draw_hollow_rect_mut(
            &mut face,
            Rect::at(geometry.text_x as i32, y).of_size(strip_w, strip_h),
            FAINT,
        );
    }

    debug!(
        width = geometry.width,
        height = geometry.height,
        dpi = options.dpi,
        "rendered sticker face"
    );

    let final_image = match options.layout {
        PageLayout::Sticker => DynamicImage::ImageRgba8(face),
        PageLayout::A4 => {
            let dpi = options.dpi.clamp(MIN_DPI, MAX_DPI);
            let page_width = inches_to_px(A4_WIDTH_IN, dpi);
            let page_height = inches_to_px(A4_HEIGHT_IN, dpi);
            let mut page = ImageBuffer::from_pixel(page_width, page_height, PAGE);
            // Top-left corner of the printable area, 0.1 in from each edge.
            let offset = inches_to_px(0.1, dpi) as i64;
            overlay(&mut page, &face, offset, offset);
            DynamicImage::ImageRgba8(page)
        }
    };

    Ok(final_image)
}

fn frame_photo(photo: &RgbaImage, sticker: &StudentSticker, width: u32, height: u32) -> RgbaImage {
    let (x, y, w, h) = sticker
        .photo_frame
        .crop_rect(photo.width(), photo.height(), width, height);
    let cropped = imageops::crop_imm(photo, x, y, w, h).to_image();
    imageops::resize(&cropped, width, height, FilterType::Triangle)
}

fn draw_placeholder(image: &mut RgbaImage, (x, y, w, h): (u32, u32, u32, u32)) {
    draw_hollow_rect_mut(image, Rect::at(x as i32, y as i32).of_size(w, h), FAINT);
    let (x0, y0) = (x as f32, y as f32);
    let (x1, y1) = ((x + w - 1) as f32, (y + h - 1) as f32);
    draw_line_segment_mut(image, (x0, y0), (x1, y1), FAINT);
    draw_line_segment_mut(image, (x1, y0), (x0, y1), FAINT);
}

fn inches_to_px(inches: f32, dpi: u32) -> u32 {
    (inches * dpi as f32).round() as u32
}

fn draw_text(image: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>, scale: u32) {
    let advance = ((GLYPH_WIDTH + 1) as u32 * scale) as i32;
    for (idx, ch) in text.chars().enumerate() {
        draw_glyph(image, x + idx as i32 * advance, y, ch, color, scale);
    }
}

fn draw_glyph(image: &mut RgbaImage, x: i32, y: i32, ch: char, color: Rgba<u8>, scale: u32) {
    let pattern = glyph_pattern(ch);
    for (row, bits) in pattern.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                let px = x + (col as i32 * scale as i32);
                let py = y + (row as i32 * scale as i32);
                draw_filled_rect_mut(image, Rect::at(px, py).of_size(scale, scale), color);
            }
        }
    }
}

#[rustfmt::skip]
fn glyph_pattern(ch: char) -> [u8; GLYPH_HEIGHT] {
    let upper = ch.to_uppercase().next().unwrap_or(ch);
    match upper {
        // Digits and A-Z from the punch card interpreter font.
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b10010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        // Nordic letters squeeze the diacritic into the top row.
        'Ä' => [0b01010, 0b00000, 0b01110, 0b10001, 0b11111, 0b10001, 0b10001],
        'Å' => [0b00100, 0b00000, 0b01110, 0b10001, 0b11111, 0b10001, 0b10001],
        'Ö' => [0b01010, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'Ü' => [0b01010, 0b00000, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'É' => [0b00010, 0b00100, 0b11111, 0b10000, 0b11110, 0b10000, 0b11111],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '/' => [0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00110],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00100, 0b01000],
        '\'' => [0b00100, 0b00100, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '#' => [0b01010, 0b11111, 0b01010, 0b01010, 0b11111, 0b01010, 0b01010],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111, 0b00000],
        _ => [0; GLYPH_HEIGHT],
    }
}
