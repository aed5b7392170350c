//! # Chart Image Loading
//!
//! Charts arrive as pre-rendered bitmaps: a file path, a data URI, or raw
//! base64. JPEG bytes pass through untouched (the PDF embeds them with
//! DCTDecode). PNG is decoded to RGB with a separate alpha channel for the
//! SMask.

use std::io::Cursor;
use std::path::Path;

use crate::error::{ReportError, Result};

/// A loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width_px as f64 / self.height_px.max(1) as f64
    }
}

/// The pixel data in a form the PDF serializer writes directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded pixels.
    Decoded {
        /// width * height * 3 bytes
        rgb: Vec<u8>,
        /// width * height bytes, None when fully opaque
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Load an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...`
/// - an existing file path
/// - raw base64-encoded image data
pub fn load_image(src: &str) -> Result<LoadedImage> {
    let raw_bytes = read_source_bytes(src)?;
    decode_image_bytes(&raw_bytes)
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>> {
    if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| ReportError::Image("Invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    let path = Path::new(src);
    if path.is_file() {
        return std::fs::read(path)
            .map_err(|e| ReportError::Image(format!("Failed to read image file '{}': {}", src, e)));
    }

    base64_decode(src).map_err(|_| {
        ReportError::Image(format!(
            "'{}' is neither a readable file, a data URI nor base64 image data",
            src
        ))
    })
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| ReportError::Image(format!("Base64 decode error: {}", e)))
}

/// Detect the format from magic bytes and decode accordingly.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage> {
    if data.len() < 4 {
        return Err(ReportError::Image("Image data too short".to_string()));
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err(ReportError::Image(
            "Unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8])
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G'])
}

fn decode_jpeg(data: &[u8]) -> Result<LoadedImage> {
    let (width, height) = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ReportError::Image(format!("JPEG format detection error: {}", e)))?
        .into_dimensions()
        .map_err(|e| ReportError::Image(format!("Failed to read JPEG dimensions: {}", e)))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Walk the JPEG markers to the Start Of Frame segment and read its
/// component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    JpegColorSpace::DeviceRGB
}

fn decode_png(data: &[u8]) -> Result<LoadedImage> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ReportError::Image(format!("PNG format detection error: {}", e)))?
        .decode()
        .map_err(|e| ReportError::Image(format!("Failed to decode PNG: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let alpha = if alpha.iter().any(|&a| a != 255) {
        Some(alpha)
    } else {
        None
    };

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded { rgb, alpha },
        width_px: width,
        height_px: height,
    })
}
