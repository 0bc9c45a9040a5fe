use std::{fmt, str::FromStr};

use imbatch_runtime::DEFAULT_JPEG_QUALITY;
use thiserror::Error;

/// Container formats the engine can recognise by signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Gif,
    Png,
    Wbmp,
    Xbm,
}

#[derive(Debug, Error)]
#[error("unknown image format {0:?} (expected jpg, jpeg, gif, png, wbmp or xbm)")]
pub struct UnknownFormat(pub String);

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

impl ImageFormat {
    /// Identify the format from the leading bytes of an encoded image.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(JPEG_SIGNATURE) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(PNG_SIGNATURE) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.trim_ascii_start().starts_with(b"#define") {
            Some(ImageFormat::Xbm)
        } else if is_wbmp(bytes) {
            Some(ImageFormat::Wbmp)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Png => "png",
            ImageFormat::Wbmp => "wbmp",
            ImageFormat::Xbm => "xbm",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "gif" => Ok(ImageFormat::Gif),
            "png" => Ok(ImageFormat::Png),
            "wbmp" => Ok(ImageFormat::Wbmp),
            "xbm" => Ok(ImageFormat::Xbm),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Type 0 WBMP: `0x00`, fixed header `0x00`, width and height as multi-byte
/// integers, then one bit per pixel with rows padded to whole bytes.
/// The format has no magic number, so the payload length has to add up too.
fn is_wbmp(bytes: &[u8]) -> bool {
    let [0, 0, rest @ ..] = bytes else {
        return false;
    };
    let Some((width, rest)) = read_multibyte(rest) else {
        return false;
    };
    let Some((height, rest)) = read_multibyte(rest) else {
        return false;
    };
    if width == 0 || height == 0 {
        return false;
    }
    width
        .div_ceil(8)
        .checked_mul(height)
        .is_some_and(|len| len == rest.len() as u64)
}

fn read_multibyte(bytes: &[u8]) -> Option<(u64, &[u8])> {
    let mut value: u64 = 0;
    for (i, b) in bytes.iter().enumerate().take(5) {
        value = (value << 7) | u64::from(b & 0x7F);
        if b & 0x80 == 0 {
            return Some((value, &bytes[i + 1..]));
        }
    }
    None
}

/// Decoded image handed to a [`Transform`](crate::Transform).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContent {
    /// Format the content was read in; re-encoding keeps it unless overridden
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ImageContent {
    pub fn new(format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }
}

/// How transformed content is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Output format; `None` keeps each file's original format
    pub format: Option<ImageFormat>,
    /// JPEG quality, 0 to 100
    pub quality: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            format: None,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl EncodeOptions {
    pub fn target_format(&self, content: &ImageContent) -> ImageFormat {
        self.format.unwrap_or(content.format)
    }
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
