//! Decode/encode adapter over the `image` crate
//!
//! The rest of the pipeline only sees [`decode`] and [`encode`]; the raster
//! codecs themselves are opaque.

use crate::config::FetcherConfig;
use crate::error::{Error, Result};
use crate::format::ImageFormat;
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, Frame};
use std::borrow::Cow;
use std::io::Write;

/// Encoder tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

impl From<&FetcherConfig> for EncodeOptions {
    fn from(config: &FetcherConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// Decode `bytes` using `hint` to select the decoder
///
/// `hint` is any identifier [`ImageFormat::parse`] accepts, typically the
/// sniffed content type of the bytes.
///
/// # Errors
///
/// - [`Error::UnsupportedFormat`] if `hint` names none of the four formats
/// - [`Error::CorruptData`] if the bytes do not parse as that format
pub fn decode(bytes: &[u8], hint: &str) -> Result<DynamicImage> {
    decode_as(bytes, ImageFormat::parse(hint)?)
}

/// Decode `bytes` as a known format
pub fn decode_as(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage> {
    image::load_from_memory_with_format(bytes, format.into()).map_err(|e| Error::CorruptData {
        format: format.to_string(),
        message: e.to_string(),
    })
}

/// Encode `image` into `format`, returning the encoded bytes
pub fn encode(image: &DynamicImage, format: ImageFormat, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_to(image, format, options, &mut buf)?;
    Ok(buf)
}

/// Encode `image` into `format`, streaming the output into `writer`
///
/// The pixel layout is converted first when the target encoder cannot take
/// it as-is (JPEG has no alpha channel, GIF frames are always RGBA8).
///
/// # Errors
///
/// Returns [`Error::Encode`] if the encoder or the writer fails.
pub fn encode_to<W: Write>(
    image: &DynamicImage,
    format: ImageFormat,
    options: &EncodeOptions,
    mut writer: W,
) -> Result<()> {
    let prepared = prepare_for(image, format);
    let result = match format {
        ImageFormat::Png => prepared.write_with_encoder(PngEncoder::new(&mut writer)),
        ImageFormat::Jpeg => prepared.write_with_encoder(JpegEncoder::new_with_quality(
            &mut writer,
            options.jpeg_quality,
        )),
        ImageFormat::Bmp => prepared.write_with_encoder(BmpEncoder::new(&mut writer)),
        ImageFormat::Gif => {
            // The trailer is written when the encoder is dropped
            let mut encoder = GifEncoder::new(&mut writer);
            encoder.encode_frame(Frame::new(prepared.to_rgba8()))
        }
    };
    result.map_err(|e| Error::Encode {
        format: format.to_string(),
        message: e.to_string(),
    })?;
    writer.flush().map_err(|e| Error::Encode {
        format: format.to_string(),
        message: e.to_string(),
    })
}

/// Convert the pixel layout to one the target encoder accepts
fn prepare_for(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    let accepted = match format {
        ImageFormat::Jpeg => matches!(
            image,
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_)
        ),
        ImageFormat::Bmp => matches!(
            image,
            DynamicImage::ImageRgb8(_)
                | DynamicImage::ImageRgba8(_)
                | DynamicImage::ImageLuma8(_)
                | DynamicImage::ImageLumaA8(_)
        ),
        ImageFormat::Png => !matches!(
            image,
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
        ),
        ImageFormat::Gif => true,
    };
    if accepted {
        return Cow::Borrowed(image);
    }
    match format {
        ImageFormat::Jpeg => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
        _ => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::sniff_content_type;
    use image::{Rgba, RgbaImage};

    fn sample_image() -> DynamicImage {
        let mut img = RgbaImage::new(8, 6);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 30) as u8, (y * 40) as u8, 128, 200]);
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn every_format_round_trips_through_its_own_encoding() {
        let options = EncodeOptions::default();
        for format in ImageFormat::ALL {
            let encoded = encode(&sample_image(), format, &options).unwrap();
            assert_eq!(sniff_content_type(&encoded), format.mime_type());

            let decoded = decode(&encoded, format.mime_type()).unwrap();
            let reencoded = encode(&decoded, format, &options).unwrap();
            let again = decode(&reencoded, format.extension()).unwrap();
            assert_eq!((again.width(), again.height()), (8, 6), "format {format}");
        }
    }

    #[test]
    fn cross_format_conversion_preserves_dimensions() {
        let png = encode(&sample_image(), ImageFormat::Png, &EncodeOptions::default()).unwrap();
        let decoded = decode(&png, "image/png").unwrap();
        for target in ImageFormat::ALL {
            let bytes = encode(&decoded, target, &EncodeOptions::default()).unwrap();
            let out = decode_as(&bytes, target).unwrap();
            assert_eq!((out.width(), out.height()), (8, 6), "target {target}");
        }
    }

    #[test]
    fn decode_with_unsupported_hint_fails() {
        let err = decode(b"whatever", "image/webp").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn decode_garbage_is_corrupt_data() {
        let err = decode(b"\x89PNG\r\n\x1a\ntruncated", "png").unwrap_err();
        match err {
            Error::CorruptData { format, .. } => assert_eq!(format, "png"),
            other => panic!("expected CorruptData, got {other:?}"),
        }
    }

    #[test]
    fn jpeg_quality_affects_output_size() {
        let mut noisy = RgbaImage::new(64, 64);
        for (x, y, pixel) in noisy.enumerate_pixels_mut() {
            let v = ((x * 7919 + y * 104_729) % 251) as u8;
            *pixel = Rgba([v, v.wrapping_mul(3), v.wrapping_add(91), 255]);
        }
        let img = DynamicImage::ImageRgba8(noisy);
        let low = encode(&img, ImageFormat::Jpeg, &EncodeOptions { jpeg_quality: 5 }).unwrap();
        let high = encode(&img, ImageFormat::Jpeg, &EncodeOptions { jpeg_quality: 100 }).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn encode_to_writes_into_caller_buffer() {
        let mut out = Vec::new();
        encode_to(&sample_image(), ImageFormat::Bmp, &EncodeOptions::default(), &mut out).unwrap();
        assert!(out.starts_with(b"BM"));
    }
}
