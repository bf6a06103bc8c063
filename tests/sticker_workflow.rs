use std::fs;
use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use stickerprint::{
    BarcodeEncoding, Code128Encoder, CodeType, EncodeError, FontShift, PageLayout, PhotoFrame,
    StickerGeometry, StickerRenderOptions, StudentSticker, encode, encode_student_number,
    render_sticker_image,
};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stickerprint-it-{}-{}", std::process::id(), name));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn string_selectors_match_typed_encoder() {
    for code_type in CodeType::all() {
        for font_shift in FontShift::all() {
            let typed = Code128Encoder::new(code_type, font_shift)
                .encode("Kotu-12345")
                .unwrap();
            let named = encode("Kotu-12345", code_type.name(), font_shift.name()).unwrap();
            assert_eq!(typed, named);
            assert_eq!(typed.chars().count(), "Kotu-12345".len() + 3);
        }
    }
}

#[test]
fn start_and_stop_symbols_use_font_shift() {
    let bc = encode("", "C", "barcodesoft").unwrap();
    let chars: Vec<u32> = bc.chars().map(u32::from).collect();
    assert_eq!(chars[0], 105 + 145);
    assert_eq!(chars[2], 106 + 145);
    // 105 mod 103 = 2
    assert_eq!(chars[1], 2 + 32);
}

#[test]
fn selector_errors_are_reported() {
    assert!(matches!(
        encode("X", "Z", "common"),
        Err(EncodeError::InvalidCodeType(ref name)) if name == "Z"
    ));
    assert!(matches!(
        encode("X", "B", "unknown"),
        Err(EncodeError::InvalidFontShift(ref name)) if name == "unknown"
    ));
}

#[test]
fn student_number_helper_delegates_to_encoder() {
    let enc = Code128Encoder::default();
    assert_eq!(
        encode_student_number(&enc, "Kotu-12345").unwrap(),
        "\u{CC}Kotu-12345t\u{CE}"
    );
    assert_eq!(enc.name(), "Code128");
}

#[test]
fn sticker_with_photo_renders_framed_photo() {
    let dir = scratch_dir("photo");
    let photo_path = dir.join("student.png");
    let red = Rgba([0xd0, 0x20, 0x20, 0xff]);
    RgbaImage::from_pixel(400, 300, red).save(&photo_path).unwrap();

    let sticker = StudentSticker::new("Maija", "Meikäläinen", "2024-0042", &Code128Encoder::default())
        .unwrap()
        .with_photo(photo_path, PhotoFrame::new(2.0, 0.5, -0.5).unwrap());
    let sticker_path = dir.join("maija.json");
    sticker.save(&sticker_path).unwrap();
    let loaded = StudentSticker::load(&sticker_path).unwrap();

    let options = StickerRenderOptions {
        dpi: 150,
        layout: PageLayout::Sticker,
    };
    let img = render_sticker_image(&loaded, &options).unwrap().to_rgba8();
    let geometry = StickerGeometry::at_dpi(150);
    let (x, y, w, h) = geometry.photo;
    assert_eq!((img.width(), img.height()), (geometry.width, geometry.height));
    assert_eq!(*img.get_pixel(x + w / 2, y + h / 2), red);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_photo_is_an_error() {
    let sticker = StudentSticker::new("A", "B", "1", &Code128Encoder::default())
        .unwrap()
        .with_photo(PathBuf::from("/nonexistent/photo.jpg"), PhotoFrame::default());
    let err = render_sticker_image(&sticker, &StickerRenderOptions::default()).unwrap_err();
    assert!(err.to_string().contains("failed to open photo"));
}
