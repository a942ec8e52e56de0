//! Image-to-PDF conversion.
//!
//! [`ImageConverter`] takes image files one at a time, sniffs their pixel
//! dimensions, derives the physical page size from the configured DPI and
//! appends one page per image to a [`Document`]. Pages appear in the order
//! images are added.
//!
//! # Example
//!
//! ```no_run
//! use slidepdf::convert::{ConvertOptions, ImageConverter};
//!
//! fn main() -> slidepdf::Result<()> {
//!     let mut converter = ImageConverter::new(ConvertOptions::new().with_dpi(72.0));
//!     converter.add_image_file("slide-1.jpg")?;
//!     converter.add_image_file("slide-2.jpg")?;
//!     converter.write("deck.pdf")?;
//!     Ok(())
//! }
//! ```

mod transcode;

use crate::detect::{detect_image_from_bytes, ImageInfo};
use crate::error::{Error, Result};
use crate::pdf::{ColorMode, Document, ImageFormat, Metadata, ObjectId, PageSize, RasterImage};
use std::fs;
use std::io::Read;
use std::path::Path;

/// DPI used when none is configured.
pub const DEFAULT_DPI: f64 = 96.0;

/// Options for image conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Resolution used to turn pixels into points (`None` = [`DEFAULT_DPI`])
    pub dpi: Option<f64>,

    /// Color mode override (`None` = take it from the image header)
    pub color_mode: Option<ColorMode>,

    /// Document information
    pub metadata: Metadata,
}

impl ConvertOptions {
    /// Create new conversion options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resolution in dots per inch.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = Some(dpi);
        self
    }

    /// Force a color mode for every image.
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = Some(mode);
        self
    }

    /// Set document metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Get the DPI in effect. Unset, zero, negative or non-finite values
    /// fall back to [`DEFAULT_DPI`].
    pub fn effective_dpi(&self) -> f64 {
        match self.dpi {
            Some(dpi) if dpi.is_finite() && dpi > 0.0 => dpi,
            _ => DEFAULT_DPI,
        }
    }
}

/// Builds a PDF from a sequence of images, one page each.
#[derive(Debug, Clone)]
pub struct ImageConverter {
    options: ConvertOptions,
    document: Document,
}

impl ImageConverter {
    /// Create a converter with an empty document.
    pub fn new(options: ConvertOptions) -> Self {
        let document = Document::with_metadata(&options.metadata);
        Self { options, document }
    }

    /// Get the conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Add an image file as the next page.
    ///
    /// Returns the page id, or `None` if the image was skipped because of an
    /// unsupported color mode.
    pub fn add_image_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Option<ObjectId>> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        self.add_image(data, &path.display().to_string())
    }

    /// Add an image read from any source as the next page.
    pub fn add_image_reader<R: Read>(&mut self, mut reader: R) -> Result<Option<ObjectId>> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.add_image(data, "<reader>")
    }

    /// Add an image from its raw bytes as the next page.
    pub fn add_image_bytes(&mut self, data: Vec<u8>) -> Result<Option<ObjectId>> {
        self.add_image(data, "<bytes>")
    }

    fn add_image(&mut self, data: Vec<u8>, source: &str) -> Result<Option<ObjectId>> {
        let info = detect_image_from_bytes(&data)
            .ok_or_else(|| Error::UnknownImageDimensions(source.to_string()))?;
        let page_size = self.page_size(&info);
        let image = self.prepare_image(info, data)?;
        log::debug!(
            "{}: {} {}x{}px -> {:.4}x{:.4}pt",
            source,
            info.format,
            info.width,
            info.height,
            page_size.width,
            page_size.height
        );
        Ok(self.document.add_image(image, page_size))
    }

    /// Compute the page size of an image at the configured DPI.
    pub fn page_size(&self, info: &ImageInfo) -> PageSize {
        PageSize::from_pixels(info.width, info.height, self.options.effective_dpi())
    }

    fn prepare_image(&self, info: ImageInfo, data: Vec<u8>) -> Result<RasterImage> {
        let requested = self.options.color_mode.clone();

        match info.format {
            ImageFormat::Jpeg | ImageFormat::Jpeg2000 | ImageFormat::Flate => {
                let mode = requested
                    .or_else(|| info.color_mode())
                    .unwrap_or(ColorMode::Rgb);
                Ok(RasterImage::new(mode, info.width, info.height, info.format, data))
            }
            ImageFormat::Png | ImageFormat::Gif => match requested {
                // The document skips unsupported modes; no need to decode.
                Some(mode @ ColorMode::Unsupported(_)) => Ok(RasterImage::new(
                    mode,
                    info.width,
                    info.height,
                    info.format,
                    data,
                )),
                requested => {
                    let samples = transcode::deflate_samples(&data, info.format, requested)?;
                    Ok(RasterImage::new(
                        samples.color_mode,
                        samples.width,
                        samples.height,
                        ImageFormat::Flate,
                        samples.data,
                    ))
                }
            },
        }
    }

    /// Get the number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// Get the document under construction.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take the finished document.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Serialize the document into PDF bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.document.serialize()
    }

    /// Serialize the document and write it to `path`.
    ///
    /// The whole file is built in memory first.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

impl Default for ImageConverter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        data.extend_from_slice(b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.push(3);
        data.extend_from_slice(&[1, 0x11, 0, 2, 0x11, 0, 3, 0x11, 0]);
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_dpi(150.0)
            .with_color_mode(ColorMode::Gray);
        assert_eq!(options.dpi, Some(150.0));
        assert_eq!(options.effective_dpi(), 150.0);
        assert_eq!(options.color_mode, Some(ColorMode::Gray));
    }

    #[test]
    fn test_default_dpi() {
        assert_eq!(ConvertOptions::default().effective_dpi(), DEFAULT_DPI);
        assert_eq!(ConvertOptions::new().with_dpi(0.0).effective_dpi(), DEFAULT_DPI);
        assert_eq!(
            ConvertOptions::new().with_dpi(f64::NAN).effective_dpi(),
            DEFAULT_DPI
        );
    }

    #[test]
    fn test_page_size_at_72_dpi() {
        let converter = ImageConverter::new(ConvertOptions::new().with_dpi(72.0));
        let info = detect_image_from_bytes(&tiny_jpeg(1024, 768)).unwrap();
        assert_eq!(converter.page_size(&info), PageSize::new(1024.0, 768.0));
    }

    #[test]
    fn test_page_size_at_default_dpi() {
        let converter = ImageConverter::default();
        let info = detect_image_from_bytes(&tiny_jpeg(960, 720)).unwrap();
        assert_eq!(converter.page_size(&info), PageSize::new(720.0, 540.0));
    }

    #[test]
    fn test_add_jpeg_bytes() {
        let mut converter = ImageConverter::default();
        let page = converter.add_image_bytes(tiny_jpeg(960, 720)).unwrap();
        assert!(page.is_some());
        assert_eq!(converter.page_count(), 1);
    }

    #[test]
    fn test_unknown_dimensions_is_an_error() {
        let mut converter = ImageConverter::default();
        let result = converter.add_image_bytes(b"definitely not an image file".to_vec());
        assert!(matches!(result, Err(Error::UnknownImageDimensions(_))));
        assert_eq!(converter.page_count(), 0);
    }

    #[test]
    fn test_unsupported_override_skips_page() {
        let options = ConvertOptions::new().with_color_mode(ColorMode::from("P"));
        let mut converter = ImageConverter::new(options);
        let page = converter.add_image_bytes(tiny_jpeg(10, 10)).unwrap();
        assert!(page.is_none());
        assert_eq!(converter.page_count(), 0);
    }
}
