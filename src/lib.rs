//! # slidepdf
//!
//! Assemble presentation slide images into a single PDF, one image per page.
//!
//! The PDF output is produced by a small built-in writer ([`pdf`]) that
//! models indirect objects, the page tree and the cross-reference table
//! directly. JPEG and JPEG 2000 images are embedded byte for byte.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slidepdf::{images_to_pdf, ConvertOptions};
//!
//! fn main() -> slidepdf::Result<()> {
//!     let options = ConvertOptions::new().with_dpi(72.0);
//!     let pdf = images_to_pdf(&["slide-1.jpg", "slide-2.jpg"], options)?;
//!     std::fs::write("deck.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Deterministic output**: identical input produces identical bytes
//! - **No transcoding for JPEG**: slides are embedded exactly as downloaded
//! - **Header sniffing**: PNG, GIF, JPEG and JPEG 2000 dimensions without decoding
//! - **Ordered pages**: page order always matches the order images are added

pub mod convert;
pub mod detect;
pub mod error;
pub mod pdf;
pub mod slides;

// Re-export commonly used types
pub use convert::{ConvertOptions, ImageConverter, DEFAULT_DPI};
pub use detect::{detect_image_from_bytes, detect_image_from_path, is_supported_image, ImageInfo};
pub use error::{Error, Result};
pub use pdf::{ColorMode, Document, ImageFormat, Metadata, PageSize, PdfVersion, RasterImage};
pub use slides::{extract_slide_urls, output_filename, Fetcher};

use std::path::Path;

/// Convert image files into PDF bytes, one page per image, in order.
///
/// # Example
///
/// ```no_run
/// use slidepdf::{images_to_pdf, ConvertOptions};
///
/// let pdf = images_to_pdf(&["a.jpg", "b.jpg"], ConvertOptions::default()).unwrap();
/// assert!(pdf.starts_with(b"%PDF-"));
/// ```
pub fn images_to_pdf<P: AsRef<Path>>(paths: &[P], options: ConvertOptions) -> Result<Vec<u8>> {
    let mut converter = ImageConverter::new(options);
    for path in paths {
        converter.add_image_file(path)?;
    }
    Ok(converter.to_bytes())
}

/// Convert in-memory images into PDF bytes, one page per image, in order.
pub fn image_bytes_to_pdf<I>(images: I, options: ConvertOptions) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    let mut converter = ImageConverter::new(options);
    for data in images {
        converter.add_image_bytes(data)?;
    }
    Ok(converter.to_bytes())
}

/// Builder for slide conversion.
///
/// # Example
///
/// ```no_run
/// use slidepdf::SlidePdf;
///
/// let converter = SlidePdf::new()
///     .with_dpi(72.0)
///     .with_title("Quarterly review")
///     .convert(&["slide-1.jpg", "slide-2.jpg"])
///     .unwrap();
/// converter.write("review.pdf").unwrap();
/// ```
pub struct SlidePdf {
    options: ConvertOptions,
}

impl SlidePdf {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
        }
    }

    /// Set the resolution used to size pages.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.options = self.options.with_dpi(dpi);
        self
    }

    /// Force a color mode for every image.
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.options = self.options.with_color_mode(mode);
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.options.metadata = self.options.metadata.with_title(title);
        self
    }

    /// Set the document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.options.metadata = self.options.metadata.with_author(author);
        self
    }

    /// Replace all metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.options.metadata = metadata;
        self
    }

    /// Omit default creation and modification dates.
    pub fn without_dates(mut self) -> Self {
        self.options.metadata = self.options.metadata.without_dates();
        self
    }

    /// Convert image files and return the converter holding the document.
    pub fn convert<P: AsRef<Path>>(self, paths: &[P]) -> Result<ImageConverter> {
        let mut converter = ImageConverter::new(self.options);
        for path in paths {
            converter.add_image_file(path)?;
        }
        Ok(converter)
    }
}

impl Default for SlidePdf {
    fn default() -> Self {
        Self::new()
    }
}
