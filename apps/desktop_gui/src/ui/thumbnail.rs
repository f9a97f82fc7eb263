use anyhow::{Context, Result};

/// Largest edge of a cart thumbnail, in pixels.
pub const THUMBNAIL_EDGE: u32 = 50;

#[derive(Clone)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

pub fn decode_thumbnail(bytes: &[u8]) -> Result<PreviewImage> {
    let dynamic = image::load_from_memory(bytes).context("unsupported thumbnail image")?;
    let resized = dynamic.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE).to_rgba8();
    let width = resized.width() as usize;
    let height = resized.height() as usize;
    Ok(PreviewImage {
        width,
        height,
        rgba: resized.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 80, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).expect("encode png");
        out.into_inner()
    }

    #[test]
    fn scales_large_images_down_to_thumbnail_edge() {
        let preview = decode_thumbnail(&png(400, 200)).expect("decode");
        assert_eq!((preview.width, preview.height), (50, 25));
        assert_eq!(preview.rgba.len(), 50 * 25 * 4);
    }

    #[test]
    fn rejects_non_image_bytes() {
        assert!(decode_thumbnail(b"<html>not an image</html>").is_err());
    }
}
