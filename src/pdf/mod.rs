//! Minimal PDF writer for image-per-page documents.
//!
//! This module builds a PDF object graph and serializes it byte-exactly:
//! header, numbered indirect objects, a cross-reference table and the
//! trailer. It never reads PDFs and never compresses data; image bytes are
//! embedded exactly as supplied.
//!
//! # Example
//!
//! ```
//! use slidepdf::pdf::{ColorMode, Document, Metadata, PageSize, RasterImage};
//!
//! let mut doc = Document::with_metadata(&Metadata::new().with_title("Deck"));
//! let jpeg = vec![0xFF, 0xD8, 0xFF, 0xD9];
//! doc.add_image(
//!     RasterImage::jpeg(ColorMode::Rgb, 960, 720, jpeg),
//!     PageSize::from_pixels(960, 720, 96.0),
//! );
//! let bytes = doc.serialize();
//! assert!(bytes.starts_with(b"%PDF-1.3"));
//! ```

mod document;
mod image;
mod object;
mod value;

pub use document::{pdf_date, Document, Metadata, PdfVersion};
pub use image::{
    ColorMode, ImageFormat, PageSize, RasterImage, MIN_PAGE_SIDE_PT, POINTS_PER_INCH,
};
pub use object::{IndirectObject, ObjectId};
pub use value::{escape_text_string, format_real, render, render_into, Dictionary, Value};
