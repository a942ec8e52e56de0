//! Image container detection and header sniffing.
//!
//! Only the container header is read; pixel data is never decoded here.
//! Supported containers: PNG, GIF, JPEG and JPEG 2000 (JP2 files and raw
//! codestreams).

use crate::error::Result;
use crate::pdf::{ColorMode, ImageFormat};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// PNG magic bytes
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// JP2 signature box: length 12, type `jP  `, content `\r\n\x87\n`
const JP2_SIGNATURE: &[u8] = b"\x00\x00\x00\x0cjP  \r\n\x87\n";

/// J2K codestream: SOC marker followed by SIZ marker
const J2K_SIGNATURE: &[u8] = &[0xFF, 0x4F, 0xFF, 0x51];

/// Header bytes needed before any sniffer is attempted.
const MIN_HEADER_LEN: usize = 24;

/// What the sniffer learned from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Container format
    pub format: ImageFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color components per pixel once decoded, when the header says
    pub components: Option<u8>,
    /// JPEG with an Adobe APP14 segment, whose CMYK samples are inverted
    pub adobe: bool,
}

impl ImageInfo {
    fn new(format: ImageFormat, width: u32, height: u32, components: Option<u8>) -> Self {
        Self {
            format,
            width,
            height,
            components,
            adobe: false,
        }
    }

    /// Color mode implied by the header, if it names a supported one.
    pub fn color_mode(&self) -> Option<ColorMode> {
        match (self.components?, self.adobe) {
            (4, true) => Some(ColorMode::CmykInverted),
            (n, _) => ColorMode::from_components(n),
        }
    }
}

/// Sniff an image file.
///
/// Returns `Ok(None)` if the file is readable but its dimensions are unknown.
pub fn detect_image_from_path<P: AsRef<Path>>(path: P) -> Result<Option<ImageInfo>> {
    let data = fs::read(path)?;
    Ok(detect_image_from_bytes(&data))
}

/// Sniff image bytes.
///
/// # Returns
/// * `Some(ImageInfo)` if the header is a supported, well-formed container
/// * `None` if the format is unknown or the header is malformed
pub fn detect_image_from_bytes(data: &[u8]) -> Option<ImageInfo> {
    if data.len() < MIN_HEADER_LEN {
        return None;
    }

    let info = if data.starts_with(PNG_SIGNATURE) {
        sniff_png(data)
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        sniff_gif(data)
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        sniff_jpeg(data)
    } else if data.starts_with(JP2_SIGNATURE) {
        sniff_jp2(data)
    } else if data.starts_with(J2K_SIGNATURE) {
        sniff_j2k(data)
    } else {
        None
    };

    match info {
        Some(info) if info.width > 0 && info.height > 0 => Some(info),
        _ => None,
    }
}

/// Check if bytes carry a supported image header.
pub fn is_supported_image(data: &[u8]) -> bool {
    detect_image_from_bytes(data).is_some()
}

fn sniff_png(data: &[u8]) -> Option<ImageInfo> {
    // IHDR must be the first chunk: length(4) type(4) width(4) height(4)
    // bit depth(1) color type(1)
    let mut cur = Cursor::new(data);
    cur.set_position(12);
    let mut chunk = [0u8; 4];
    cur.read_exact(&mut chunk).ok()?;
    if &chunk != b"IHDR" {
        return None;
    }
    let width = cur.read_u32::<BigEndian>().ok()?;
    let height = cur.read_u32::<BigEndian>().ok()?;
    let components = data.get(25).and_then(|color_type| match color_type {
        0 | 4 => Some(1),
        2 | 3 | 6 => Some(3),
        _ => None,
    });
    Some(ImageInfo::new(ImageFormat::Png, width, height, components))
}

fn sniff_gif(data: &[u8]) -> Option<ImageInfo> {
    let mut cur = Cursor::new(data);
    cur.set_position(6);
    let width = cur.read_u16::<LittleEndian>().ok()?;
    let height = cur.read_u16::<LittleEndian>().ok()?;
    Some(ImageInfo::new(
        ImageFormat::Gif,
        u32::from(width),
        u32::from(height),
        Some(3),
    ))
}

/// Markers in 0xC0..=0xCF that do not start a frame.
fn is_start_of_frame(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

fn sniff_jpeg(data: &[u8]) -> Option<ImageInfo> {
    let mut cur = Cursor::new(data);
    cur.set_position(2);
    let mut adobe = false;

    loop {
        if cur.read_u8().ok()? != 0xFF {
            return None;
        }
        let mut marker = cur.read_u8().ok()?;
        while marker == 0xFF {
            marker = cur.read_u8().ok()?;
        }

        match marker {
            // Standalone markers carry no length.
            0x01 | 0xD0..=0xD8 => continue,
            // End of image or start of scan before any frame header.
            0xD9 | 0xDA => return None,
            _ => {}
        }

        let length = cur.read_u16::<BigEndian>().ok()?;
        if length < 2 {
            return None;
        }
        let segment_start = cur.position();

        if is_start_of_frame(marker) {
            let _precision = cur.read_u8().ok()?;
            let height = cur.read_u16::<BigEndian>().ok()?;
            let width = cur.read_u16::<BigEndian>().ok()?;
            let components = cur.read_u8().ok()?;
            log::debug!("JPEG frame marker 0x{:02X}: {}x{}", marker, width, height);
            return Some(ImageInfo {
                format: ImageFormat::Jpeg,
                width: u32::from(width),
                height: u32::from(height),
                components: Some(components),
                adobe,
            });
        }

        if marker == 0xEE {
            let start = segment_start as usize;
            adobe |= data.get(start..start + 5) == Some(&b"Adobe"[..]);
        }

        cur.seek(SeekFrom::Start(segment_start + u64::from(length) - 2))
            .ok()?;
    }
}

fn sniff_jp2(data: &[u8]) -> Option<ImageInfo> {
    let header = find_box(data, b"jp2h")?;
    let ihdr = find_box(header, b"ihdr")?;
    let mut cur = Cursor::new(ihdr);
    let height = cur.read_u32::<BigEndian>().ok()?;
    let width = cur.read_u32::<BigEndian>().ok()?;
    let components = cur.read_u16::<BigEndian>().ok()?;
    Some(ImageInfo::new(
        ImageFormat::Jpeg2000,
        width,
        height,
        u8::try_from(components).ok(),
    ))
}

/// Find the payload of the first box of the given type at this level.
fn find_box<'a>(data: &'a [u8], box_type: &[u8; 4]) -> Option<&'a [u8]> {
    let mut cur = Cursor::new(data);
    while (cur.position() as usize) < data.len() {
        let start = cur.position();
        let length = u64::from(cur.read_u32::<BigEndian>().ok()?);
        let mut kind = [0u8; 4];
        cur.read_exact(&mut kind).ok()?;
        let (payload_start, end) = match length {
            0 => (cur.position(), data.len() as u64),
            1 => {
                let extended = cur.read_u64::<BigEndian>().ok()?;
                (cur.position(), start.checked_add(extended)?)
            }
            n => (cur.position(), start + n),
        };
        if end < payload_start || end > data.len() as u64 {
            return None;
        }
        if &kind == box_type {
            return data.get(payload_start as usize..end as usize);
        }
        cur.set_position(end);
    }
    None
}

fn sniff_j2k(data: &[u8]) -> Option<ImageInfo> {
    // SIZ: Lsiz Rsiz Xsiz Ysiz XOsiz YOsiz XTsiz YTsiz XTOsiz YTOsiz Csiz
    let mut cur = Cursor::new(data);
    cur.set_position(8);
    let x_size = cur.read_u32::<BigEndian>().ok()?;
    let y_size = cur.read_u32::<BigEndian>().ok()?;
    let x_offset = cur.read_u32::<BigEndian>().ok()?;
    let y_offset = cur.read_u32::<BigEndian>().ok()?;
    cur.set_position(40);
    let components = cur.read_u16::<BigEndian>().ok()?;
    Some(ImageInfo::new(
        ImageFormat::Jpeg2000,
        x_size.checked_sub(x_offset)?,
        y_size.checked_sub(y_offset)?,
        u8::try_from(components).ok(),
    ))
}
