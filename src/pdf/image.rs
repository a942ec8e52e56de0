//! Typed inputs for placing one raster image on a page.

use serde::{Deserialize, Serialize};
use std::fmt;

/// PDF units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Smallest page side (in points) that viewers handle reliably.
pub const MIN_PAGE_SIDE_PT: f64 = 3.0;

/// Color mode of the image samples.
///
/// The names accepted by [`ColorMode::from`] follow the usual imaging
/// library mode strings (`L`, `RGB`, `CMYK`, `CMYK;I`) plus readable aliases.
/// Anything else becomes [`ColorMode::Unsupported`], which the document
/// skips with a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorMode {
    /// One gray component
    Gray,
    /// Three RGB components
    Rgb,
    /// Four CMYK components
    Cmyk,
    /// Four CMYK components stored inverted (Adobe style)
    CmykInverted,
    /// Unrecognized mode name
    Unsupported(String),
}

impl ColorMode {
    /// Get the PDF color space name, or `None` if unsupported.
    pub fn pdf_name(&self) -> Option<&'static str> {
        match self {
            ColorMode::Gray => Some("/DeviceGray"),
            ColorMode::Rgb => Some("/DeviceRGB"),
            ColorMode::Cmyk | ColorMode::CmykInverted => Some("/DeviceCMYK"),
            ColorMode::Unsupported(_) => None,
        }
    }

    /// Number of color components per pixel.
    pub fn components(&self) -> Option<u8> {
        match self {
            ColorMode::Gray => Some(1),
            ColorMode::Rgb => Some(3),
            ColorMode::Cmyk | ColorMode::CmykInverted => Some(4),
            ColorMode::Unsupported(_) => None,
        }
    }

    /// Map a component count to the matching plain color mode.
    pub fn from_components(components: u8) -> Option<Self> {
        match components {
            1 => Some(ColorMode::Gray),
            3 => Some(ColorMode::Rgb),
            4 => Some(ColorMode::Cmyk),
            _ => None,
        }
    }

    /// Check whether the document can embed this mode.
    pub fn is_supported(&self) -> bool {
        !matches!(self, ColorMode::Unsupported(_))
    }

    /// Get the canonical mode string.
    pub fn as_str(&self) -> &str {
        match self {
            ColorMode::Gray => "L",
            ColorMode::Rgb => "RGB",
            ColorMode::Cmyk => "CMYK",
            ColorMode::CmykInverted => "CMYK;I",
            ColorMode::Unsupported(name) => name,
        }
    }
}

impl From<&str> for ColorMode {
    fn from(name: &str) -> Self {
        match name {
            "L" => ColorMode::Gray,
            "RGB" => ColorMode::Rgb,
            "CMYK" => ColorMode::Cmyk,
            "CMYK;I" => ColorMode::CmykInverted,
            other => match other.to_ascii_lowercase().as_str() {
                "gray" | "grey" => ColorMode::Gray,
                "rgb" => ColorMode::Rgb,
                "cmyk" => ColorMode::Cmyk,
                "cmyk-inverted" => ColorMode::CmykInverted,
                _ => ColorMode::Unsupported(other.to_string()),
            },
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding of the image bytes handed to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Baseline or progressive JPEG, embedded as is
    Jpeg,
    /// JPEG 2000 (JP2 file or raw codestream), embedded as is
    Jpeg2000,
    /// PNG container
    Png,
    /// GIF container
    Gif,
    /// Zlib-deflated 8-bit samples
    Flate,
}

impl ImageFormat {
    /// Get the PDF stream filter for bytes in this format.
    ///
    /// Everything except JPEG and JPEG 2000 is assumed to be deflated
    /// already.
    pub fn filter_name(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "/DCTDecode",
            ImageFormat::Jpeg2000 => "/JPXDecode",
            _ => "/FlateDecode",
        }
    }

    /// Get the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Jpeg2000 => "JPEG2000",
            ImageFormat::Png => "PNG",
            ImageFormat::Gif => "GIF",
            ImageFormat::Flate => "Flate",
        }
    }

    /// Get the MIME type of the container.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Jpeg2000 => "image/jp2",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Flate => "application/octet-stream",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image bytes ready to be placed on a page.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// Color mode of the samples
    pub color_mode: ColorMode,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Encoding of `data`
    pub format: ImageFormat,
    /// Stream-ready bytes
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Create a raster image.
    pub fn new(
        color_mode: ColorMode,
        width: u32,
        height: u32,
        format: ImageFormat,
        data: Vec<u8>,
    ) -> Self {
        Self {
            color_mode,
            width,
            height,
            format,
            data,
        }
    }

    /// Create a JPEG image.
    pub fn jpeg(color_mode: ColorMode, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self::new(color_mode, width, height, ImageFormat::Jpeg, data)
    }
}

/// Physical page size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Width in points
    pub width: f64,
    /// Height in points
    pub height: f64,
}

impl PageSize {
    /// Create a page size in points.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Convert pixel dimensions at the given DPI, independently per axis.
    pub fn from_pixels(width_px: u32, height_px: u32, dpi: f64) -> Self {
        Self {
            width: POINTS_PER_INCH * f64::from(width_px) / dpi,
            height: POINTS_PER_INCH * f64::from(height_px) / dpi,
        }
    }

    /// Check whether either side is below [`MIN_PAGE_SIDE_PT`].
    pub fn is_below_minimum(&self) -> bool {
        self.width < MIN_PAGE_SIDE_PT || self.height < MIN_PAGE_SIDE_PT
    }
}
