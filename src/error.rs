//! Error types for slidepdf library.

use std::io;
use thiserror::Error;

/// Result type alias for slidepdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while assembling a slide PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading images or writing the PDF.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The image header could not be sniffed, so no page size can be computed.
    #[error("Unknown image dimensions: {0}")]
    UnknownImageDimensions(String),

    /// A PNG or GIF image could not be decoded for re-embedding.
    #[error("Image decoding error: {0}")]
    ImageDecode(String),

    /// A slide could not be fetched.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The presentation page does not reference any slide image.
    #[error("No slide images found")]
    NoSlides,
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            _ => Error::ImageDecode(err.to_string()),
        }
    }
}
