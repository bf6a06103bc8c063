//! Rendering helpers for producing printable PNG output of stickers.

mod paint;

pub use paint::{
    MAX_DPI, MIN_DPI, PageLayout, StickerGeometry, StickerRenderOptions, render_sticker_image,
};
