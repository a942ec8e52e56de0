//! Re-encoding of PNG and GIF images into deflated 8-bit samples.
//!
//! PDF has no filter for PNG or GIF containers, so their pixels are decoded
//! and stored as a plain `FlateDecode` stream of Gray or RGB samples. Alpha
//! is dropped.

use crate::error::Result;
use crate::pdf::{ColorMode, ImageFormat};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{ColorType, GenericImageView};
use std::io::Write;

/// Decoded and deflated pixel data.
pub(crate) struct Samples {
    pub color_mode: ColorMode,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Decode `data` and deflate its samples.
///
/// `requested` picks Gray or RGB output; CMYK requests fall back to RGB
/// because these containers never hold CMYK data.
pub(crate) fn deflate_samples(
    data: &[u8],
    format: ImageFormat,
    requested: Option<ColorMode>,
) -> Result<Samples> {
    let container = match format {
        ImageFormat::Gif => image::ImageFormat::Gif,
        _ => image::ImageFormat::Png,
    };
    let img = image::load_from_memory_with_format(data, container)?;
    let (width, height) = img.dimensions();

    let gray = match requested {
        Some(ColorMode::Gray) => true,
        Some(ColorMode::Rgb) | None => is_gray(img.color()),
        Some(other) => {
            log::warn!("{} image cannot be stored as {}, using RGB", format, other);
            false
        }
    };

    let (color_mode, pixels) = if gray {
        (ColorMode::Gray, img.to_luma8().into_raw())
    } else {
        (ColorMode::Rgb, img.to_rgb8().into_raw())
    };

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&pixels)?;
    let data = encoder.finish()?;

    log::debug!(
        "Re-encoded {} {}x{} as {} ({} bytes deflated)",
        format,
        width,
        height,
        color_mode,
        data.len()
    );

    Ok(Samples {
        color_mode,
        width,
        height,
        data,
    })
}

fn is_gray(color: ColorType) -> bool {
    matches!(
        color,
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Luma, Rgb, Rgba};
    use std::io::{Cursor, Read};

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    fn encode_gif(img: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Gif).unwrap();
        out.into_inner()
    }

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_rgb_png_samples() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(3, 2, Rgb([10u8, 20, 30])));
        let samples = deflate_samples(&encode_png(img), ImageFormat::Png, None).unwrap();
        assert_eq!(samples.color_mode, ColorMode::Rgb);
        assert_eq!((samples.width, samples.height), (3, 2));
        assert_eq!(inflate(&samples.data), [10u8, 20, 30].repeat(6));
    }

    #[test]
    fn test_gray_png_stays_gray() {
        let img = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(2, 2, Luma([200u8])));
        let samples = deflate_samples(&encode_png(img), ImageFormat::Png, None).unwrap();
        assert_eq!(samples.color_mode, ColorMode::Gray);
        assert_eq!(inflate(&samples.data), vec![200u8; 4]);
    }

    #[test]
    fn test_requested_gray() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(1, 1, Rgb([255u8, 255, 255])));
        let samples =
            deflate_samples(&encode_png(img), ImageFormat::Png, Some(ColorMode::Gray)).unwrap();
        assert_eq!(samples.color_mode, ColorMode::Gray);
        assert_eq!(inflate(&samples.data), vec![255u8]);
    }

    #[test]
    fn test_gif_samples() {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([255u8, 0, 0, 255])
            } else {
                Rgba([0u8, 0, 255, 255])
            }
        }));
        let samples = deflate_samples(&encode_gif(img), ImageFormat::Gif, None).unwrap();
        assert_eq!(samples.color_mode, ColorMode::Rgb);
        assert_eq!((samples.width, samples.height), (4, 2));

        let row = [[255u8, 0, 0], [255, 0, 0], [0, 0, 255], [0, 0, 255]].concat();
        assert_eq!(inflate(&samples.data), [row.clone(), row].concat());
    }

    #[test]
    fn test_cmyk_request_falls_back_to_rgb() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(2, 1, Rgb([1u8, 2, 3])));
        for mode in [ColorMode::Cmyk, ColorMode::CmykInverted] {
            let samples =
                deflate_samples(&encode_png(img.clone()), ImageFormat::Png, Some(mode)).unwrap();
            assert_eq!(samples.color_mode, ColorMode::Rgb);
            assert_eq!(inflate(&samples.data), [1u8, 2, 3].repeat(2));
        }
    }

    #[test]
    fn test_corrupt_png() {
        let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
        data.resize(40, 0);
        assert!(deflate_samples(&data, ImageFormat::Png, None).is_err());
    }
}
