//! Fixture images generated in memory

use image::{DynamicImage, Rgba, RgbaImage};
use image_fetcher::{EncodeOptions, ImageFormat, codec};

/// Width of every fixture image
pub const FIXTURE_WIDTH: u32 = 16;
/// Height of every fixture image
pub const FIXTURE_HEIGHT: u32 = 12;

/// A small opaque gradient
pub fn fixture_image() -> DynamicImage {
    let mut img = RgbaImage::new(FIXTURE_WIDTH, FIXTURE_HEIGHT);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgba([(x * 15) as u8, (y * 20) as u8, 90, 255]);
    }
    DynamicImage::ImageRgba8(img)
}

/// The fixture image encoded as `format`
pub fn fixture_bytes(format: ImageFormat) -> Vec<u8> {
    codec::encode(&fixture_image(), format, &EncodeOptions::default())
        .expect("fixture image should encode")
}

/// Assert that `path` holds a decodable image of `format` with fixture dimensions
pub fn assert_image_file(path: &std::path::Path, format: ImageFormat) {
    let bytes = std::fs::read(path)
        .unwrap_or_else(|e| panic!("expected {} to exist: {e}", path.display()));
    assert_eq!(
        image_fetcher::format::sniff_content_type(&bytes),
        format.mime_type(),
        "{} has the wrong signature",
        path.display()
    );
    let decoded = codec::decode_as(&bytes, format)
        .unwrap_or_else(|e| panic!("{} does not decode as {format}: {e}", path.display()));
    assert_eq!(
        (decoded.width(), decoded.height()),
        (FIXTURE_WIDTH, FIXTURE_HEIGHT)
    );
}
