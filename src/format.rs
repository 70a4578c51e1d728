//! Raster format identifiers and content sniffing

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Content type reported when the bytes match no known signature
pub const OCTET_STREAM: &str = "application/octet-stream";

/// The raster formats the pipeline can decode and encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG / JFIF
    Jpeg,
    /// Graphics Interchange Format (first frame only)
    Gif,
    /// Windows bitmap
    Bmp,
}

impl ImageFormat {
    /// All supported formats
    pub const ALL: [ImageFormat; 4] = [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::Gif,
        ImageFormat::Bmp,
    ];

    /// Resolve a format identifier
    ///
    /// Accepts bare names (`png`, `jpeg`, `jpg`, `gif`, `bmp`, `bitmap`) and
    /// MIME names (`image/png`, ...) in any case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use image_fetcher::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::parse("PNG").unwrap(), ImageFormat::Png);
    /// assert_eq!(ImageFormat::parse("image/jpeg").unwrap(), ImageFormat::Jpeg);
    /// assert!(ImageFormat::parse("tiff").is_err());
    /// ```
    pub fn parse(identifier: &str) -> Result<Self> {
        let normalized = identifier.trim().to_ascii_lowercase();
        let bare = normalized.strip_prefix("image/").unwrap_or(&normalized);
        match bare {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "gif" => Ok(ImageFormat::Gif),
            "bmp" | "bitmap" | "x-ms-bmp" => Ok(ImageFormat::Bmp),
            _ => Err(Error::UnsupportedFormat(identifier.to_string())),
        }
    }

    /// File extension used for output files
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// MIME type as produced by [`sniff_content_type`]
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Magic-number signatures checked in order
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"BM", "image/bmp"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"\x00\x00\x02\x00", "image/x-icon"),
];

/// Determine the content type of `bytes` from their leading signature
///
/// Only the content is inspected; headers and file extensions play no part.
/// Unknown content yields [`OCTET_STREAM`].
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    if let Some((_, mime)) = SIGNATURES.iter().find(|(magic, _)| bytes.starts_with(magic)) {
        return *mime;
    }
    // RIFF container: "RIFF" <4 byte length> "WEBPVP"
    if bytes.len() >= 14 && &bytes[..4] == b"RIFF" && &bytes[8..14] == b"WEBPVP" {
        return "image/webp";
    }
    OCTET_STREAM
}
