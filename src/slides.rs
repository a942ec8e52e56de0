//! Slide list helpers for presentation pages.
//!
//! A presentation page lists its slides as `<img class="slide_image">`
//! elements whose `data-full` attribute holds the full-resolution image URL.
//! This module extracts that list, derives the output file name and fetches
//! slides while keeping their order.

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;

/// Class marking slide images.
pub const SLIDE_IMAGE_CLASS: &str = "slide_image";

/// Attribute holding the full-resolution image URL.
pub const FULL_RESOLUTION_ATTR: &str = "data-full";

/// Suffix the first slide's file name carries.
pub const FIRST_SLIDE_SUFFIX: &str = "-1-1024";

/// File stem used when the slide URL has no usable name.
pub const DEFAULT_STEM: &str = "slides";

lazy_static! {
    static ref IMG_TAG: Regex =
        Regex::new(r#"(?is)<img\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap();
    static ref ATTRIBUTE: Regex =
        Regex::new(r#"(?s)([^\s"'=<>/]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
            .unwrap();
}

/// Extract slide image URLs from a presentation page, in page order.
pub fn extract_slide_urls(html: &str) -> Vec<String> {
    IMG_TAG
        .find_iter(html)
        .filter_map(|tag| {
            let mut is_slide = false;
            let mut url = None;
            for caps in ATTRIBUTE.captures_iter(tag.as_str()) {
                let name = caps[1].to_ascii_lowercase();
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map_or("", |m| m.as_str());
                if name == "class" {
                    is_slide = value.split_whitespace().any(|c| c == SLIDE_IMAGE_CLASS);
                } else if name == FULL_RESOLUTION_ATTR {
                    url = Some(html_escape::decode_html_entities(value).into_owned());
                }
            }
            url.filter(|u| is_slide && !u.is_empty())
        })
        .collect()
}

/// Derive the PDF file name from the first slide URL.
///
/// Takes the last path segment, drops its extension and the first-slide
/// suffix, then appends `.pdf`. Falls back to `slides.pdf` when nothing
/// is left.
///
/// # Example
/// ```
/// use slidepdf::slides::output_filename;
///
/// let name = output_filename("https://cdn.example.com/talk/95/deck-1-1024.jpg?cb=1");
/// assert_eq!(name, "deck.pdf");
/// ```
pub fn output_filename(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let path = if url.contains("://") {
        path.find('/').map_or("", |i| &path[i..])
    } else {
        path
    };

    let basename = path.rsplit('/').next().unwrap_or_default();
    let stem = match basename.rfind('.') {
        Some(i) if i > 0 => &basename[..i],
        _ => basename,
    };
    let stem = stem.replace(FIRST_SLIDE_SUFFIX, "");
    if stem.is_empty() {
        format!("{}.pdf", DEFAULT_STEM)
    } else {
        format!("{}.pdf", stem)
    }
}

/// Source of slide bytes.
pub trait Fetcher: Sync {
    /// Fetch the resource at `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<Vec<u8>> + Sync,
{
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self(url)
    }
}

/// Fetch every URL, in parallel when `parallel` is set.
///
/// The result vector is always in input order, so slide `i` of the
/// presentation is entry `i`. The first failure (in slide order) aborts.
pub fn fetch_ordered<F: Fetcher>(urls: &[String], fetcher: &F, parallel: bool) -> Result<Vec<Vec<u8>>> {
    if urls.is_empty() {
        return Err(Error::NoSlides);
    }

    let results: Vec<Result<Vec<u8>>> = if parallel {
        urls.par_iter().map(|url| fetcher.fetch(url)).collect()
    } else {
        urls.iter().map(|url| fetcher.fetch(url)).collect()
    };

    results.into_iter().collect()
}
