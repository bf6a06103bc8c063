//! Core library for student ID stickers and their Code 128 barcode strings.

mod encoding;
mod graphics;
mod settings;
mod sticker;

pub use encoding::{
    BarcodeEncoding, Code128Encoder, CodeType, EncodeError, EncodedBarcode, FontShift,
    STOP_SYMBOL_VALUE, encode,
};
pub use graphics::{
    MAX_DPI, MIN_DPI, PageLayout, StickerGeometry, StickerRenderOptions, render_sticker_image,
};
pub use settings::{DEFAULT_DPI, Settings, default_settings_path};
pub use sticker::{MAX_ZOOM, MIN_ZOOM, PhotoFrame, StudentSticker};

/// Encodes a student number into the barcode font string shown on the sticker.
pub fn encode_student_number<E: BarcodeEncoding>(
    encoder: &E,
    number: &str,
) -> Result<String, EncodeError> {
    encoder.encode(number)
}
