//! The document model: object table, page tree and final serialization.

use super::image::{ColorMode, PageSize, RasterImage};
use super::object::{IndirectObject, ObjectId};
use super::value::{render_into, Dictionary, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Bits per sample of every embedded image.
const BITS_PER_COMPONENT: i64 = 8;

/// `/Decode` array that inverts all four CMYK channels.
const INVERTED_CMYK_DECODE: [i64; 8] = [1, 0, 1, 0, 1, 0, 1, 0];

/// Resource name of the single image on each page.
const PAGE_IMAGE_NAME: &str = "/Im0";

/// PDF version written in the header, as `1.<minor>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PdfVersion(u8);

impl PdfVersion {
    /// PDF 1.3, enough for JPEG and deflated images.
    pub const V1_3: PdfVersion = PdfVersion(3);
    /// PDF 1.5, required for JPEG 2000 streams.
    pub const V1_5: PdfVersion = PdfVersion(5);

    /// Get the minor version number.
    pub fn minor(self) -> u8 {
        self.0
    }
}

impl Default for PdfVersion {
    fn default() -> Self {
        PdfVersion::V1_3
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1.{}", self.0)
    }
}

/// Document information written to the `/Info` dictionary.
///
/// Only fields that are set end up in the output. Creation and modification
/// dates default to the construction time unless `no_dates` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords, joined with commas
    pub keywords: Vec<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// Suppress the default creation/modification dates
    pub no_dates: bool,
}

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the creator application.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Set the producer.
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    /// Set the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Add a keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Set the creation date.
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the modification date.
    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Omit dates that were not set explicitly.
    pub fn without_dates(mut self) -> Self {
        self.no_dates = true;
        self
    }

    /// Build the `/Info` dictionary, using `now` for missing dates.
    pub fn to_info_dict(&self, now: DateTime<Utc>) -> Dictionary {
        let mut info = Dictionary::new();

        let text_fields = [
            ("/Title", &self.title),
            ("/Author", &self.author),
            ("/Creator", &self.creator),
            ("/Producer", &self.producer),
            ("/Subject", &self.subject),
        ];
        for (key, field) in text_fields {
            if let Some(text) = field {
                info.insert(key, Value::text_string(text));
            }
        }

        if !self.keywords.is_empty() {
            info.insert("/Keywords", Value::text_string(&self.keywords.join(",")));
        }

        let default_date = if self.no_dates { None } else { Some(now) };
        if let Some(created) = self.created.or(default_date) {
            info.insert("/CreationDate", Value::text_string(&pdf_date(&created)));
        }
        if let Some(modified) = self.modified.or(default_date) {
            info.insert("/ModDate", Value::text_string(&pdf_date(&modified)));
        }

        info
    }
}

/// Format a timestamp as a PDF date (`D:YYYYMMDDHHMMSSZ`).
pub fn pdf_date(dt: &DateTime<Utc>) -> String {
    format!("D:{}Z", dt.format("%Y%m%d%H%M%S"))
}

/// An image-per-page PDF under construction.
///
/// The document owns every indirect object in an append-only table; object
/// `n` sits at index `n - 1`. References between objects are plain ids, so
/// the page-to-parent back reference needs no shared ownership.
#[derive(Debug, Clone)]
pub struct Document {
    version: PdfVersion,
    objects: Vec<IndirectObject>,
    catalog: ObjectId,
    pages: ObjectId,
    kids: Vec<ObjectId>,
    info: IndirectObject,
}

impl Document {
    /// Create an empty document with default metadata.
    pub fn new() -> Self {
        Self::with_metadata(&Metadata::default())
    }

    /// Create an empty document with the given metadata.
    pub fn with_metadata(metadata: &Metadata) -> Self {
        Self::with_metadata_at(metadata, Utc::now())
    }

    /// Create an empty document, using `now` for dates that are not set.
    pub fn with_metadata_at(metadata: &Metadata, now: DateTime<Utc>) -> Self {
        let mut doc = Self {
            version: PdfVersion::default(),
            objects: Vec::new(),
            catalog: ObjectId::new(0),
            pages: ObjectId::new(0),
            kids: Vec::new(),
            info: IndirectObject::new(metadata.to_info_dict(now)),
        };

        // Catalog is object 1 and Pages object 2; the catalog content is
        // filled once the pages id is known.
        doc.catalog = doc.register(IndirectObject::new(Dictionary::new()));
        doc.pages = doc.register(IndirectObject::new(pages_dict(&[])));
        let catalog = Dictionary::new()
            .with("/Type", Value::name("Catalog"))
            .with("/Pages", doc.pages);
        doc.set_content(doc.catalog, catalog);

        doc
    }

    /// Append an object to the table and assign it the next id.
    pub fn register(&mut self, mut object: IndirectObject) -> ObjectId {
        let id = ObjectId::new(self.objects.len() as u32 + 1);
        object.assign_id(id);
        log::debug!("Registered object {}", id);
        self.objects.push(object);
        id
    }

    /// Get a registered object.
    pub fn object(&self, id: ObjectId) -> Option<&IndirectObject> {
        (id.get() as usize)
            .checked_sub(1)
            .and_then(|index| self.objects.get(index))
    }

    fn set_content(&mut self, id: ObjectId, content: impl Into<Value>) {
        if let Some(object) = (id.get() as usize)
            .checked_sub(1)
            .and_then(|index| self.objects.get_mut(index))
        {
            object.content = content.into();
        }
    }

    /// Get all registered objects in id order.
    pub fn objects(&self) -> &[IndirectObject] {
        &self.objects
    }

    /// Get the catalog id.
    pub fn catalog_id(&self) -> ObjectId {
        self.catalog
    }

    /// Get the page tree root id.
    pub fn pages_id(&self) -> ObjectId {
        self.pages
    }

    /// Get the page ids in insertion order.
    pub fn kids(&self) -> &[ObjectId] {
        &self.kids
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Check if the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.kids.is_empty()
    }

    /// Get the PDF version that will be written.
    pub fn version(&self) -> PdfVersion {
        self.version
    }

    /// Get the `/Info` dictionary content.
    pub fn info(&self) -> &Value {
        &self.info.content
    }

    /// Add a page showing `image` scaled to `page_size`.
    ///
    /// Returns the new page id, or `None` when the color mode is unsupported
    /// (the image is skipped with a warning). Page sides below 3pt only
    /// produce a warning.
    pub fn add_image(&mut self, image: RasterImage, page_size: PageSize) -> Option<ObjectId> {
        let Some(color_space) = image.color_mode.pdf_name() else {
            log::warn!("Unsupported color space: {}", image.color_mode);
            return None;
        };

        if page_size.is_below_minimum() {
            log::warn!(
                "Page size {:.4}x{:.4}pt is below 3.00pt - decrease the dpi",
                page_size.width,
                page_size.height
            );
        }

        let filter = image.format.filter_name();
        if filter == "/JPXDecode" {
            self.version = self.version.max(PdfVersion::V1_5);
        }

        let mut image_dict = Dictionary::new()
            .with("/Type", Value::name("XObject"))
            .with("/Subtype", Value::name("Image"))
            .with("/Filter", Value::Array(vec![Value::literal(filter)]))
            .with("/Width", image.width)
            .with("/Height", image.height)
            .with("/ColorSpace", Value::literal(color_space))
            .with("/BitsPerComponent", BITS_PER_COMPONENT)
            .with("/Length", image.data.len());
        if image.color_mode == ColorMode::CmykInverted {
            let decode = INVERTED_CMYK_DECODE.iter().map(|&v| Value::Integer(v)).collect();
            image_dict.insert("/Decode", Value::Array(decode));
        }

        let text = page_content(page_size).into_bytes();
        let content_dict = Dictionary::new().with("/Length", text.len());

        let page = self.register(IndirectObject::new(Dictionary::new()));
        let content = self.register(IndirectObject::with_stream(content_dict, text));
        let xobject = self.register(IndirectObject::with_stream(image_dict, image.data));

        let resources = Dictionary::new().with(
            "/XObject",
            Dictionary::new().with(PAGE_IMAGE_NAME, xobject),
        );
        let media_box = vec![
            Value::Integer(0),
            Value::Integer(0),
            Value::Real(page_size.width),
            Value::Real(page_size.height),
        ];
        let page_dict = Dictionary::new()
            .with("/Type", Value::name("Page"))
            .with("/Parent", self.pages)
            .with("/MediaBox", media_box)
            .with("/Resources", resources)
            .with("/Contents", content);
        self.set_content(page, page_dict);

        self.kids.push(page);
        let kids = pages_dict(&self.kids);
        self.set_content(self.pages, kids);

        log::debug!(
            "Added page {} ({}x{}px {} {})",
            self.kids.len(),
            image.width,
            image.height,
            image.format,
            image.color_mode
        );
        Some(page)
    }

    /// Serialize the document into a complete PDF file.
    ///
    /// The info dictionary is numbered after every registered object, so it
    /// always receives the highest id. The document itself is not changed
    /// and can be serialized again.
    pub fn serialize(&self) -> Vec<u8> {
        let size = self.objects.len() + 2;
        let info_id = ObjectId::new(self.objects.len() as u32 + 1);
        let mut info = self.info.clone();
        info.assign_id(info_id);

        let mut out = format!("%PDF-{}\n", self.version).into_bytes();
        let mut offsets = Vec::with_capacity(size - 1);
        for object in self.objects.iter().chain(std::iter::once(&info)) {
            offsets.push(out.len());
            object.render_into(&mut out);
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", size).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }

        let trailer = Dictionary::new()
            .with("/Size", size)
            .with("/Info", info_id)
            .with("/Root", self.catalog);
        out.extend_from_slice(b"trailer\n");
        render_into(&mut out, &Value::Dictionary(trailer), 1);
        out.extend_from_slice(format!("\nstartxref\n{}\n%%EOF\n", xref_offset).as_bytes());

        log::debug!(
            "Serialized {} objects ({} pages, {} bytes)",
            size - 1,
            self.kids.len(),
            out.len()
        );
        out
    }

    /// Serialize and write the whole file in one call.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        let bytes = self.serialize();
        writer.write_all(&bytes)?;
        writer.flush()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn pages_dict(kids: &[ObjectId]) -> Dictionary {
    Dictionary::new()
        .with("/Type", Value::name("Pages"))
        .with("/Kids", kids.iter().map(|&id| Value::Reference(id)).collect::<Vec<_>>())
        .with("/Count", kids.len())
}

/// Content stream that scales the unit image square to the page and paints it.
fn page_content(page_size: PageSize) -> String {
    format!(
        "q\n{} 0 0 {} 0 0 cm\n{} Do\nQ",
        super::value::format_real(page_size.width),
        super::value::format_real(page_size.height),
        PAGE_IMAGE_NAME
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::image::ImageFormat;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 6, 1, 12, 30, 45).unwrap()
    }

    fn jpeg(color: &str) -> RasterImage {
        RasterImage::jpeg(ColorMode::from(color), 4, 3, vec![0xFF, 0xD8, 0xFF, 0xD9])
    }

    #[test]
    fn test_new_document_registers_catalog_and_pages() {
        let doc = Document::new();
        assert_eq!(doc.catalog_id(), ObjectId::new(1));
        assert_eq!(doc.pages_id(), ObjectId::new(2));
        assert_eq!(doc.objects().len(), 2);
        assert_eq!(doc.version(), PdfVersion::V1_3);

        let catalog = doc.object(doc.catalog_id()).unwrap().content.as_dict().unwrap();
        assert_eq!(catalog.get("/Pages"), Some(&Value::Reference(ObjectId::new(2))));
    }

    #[test]
    fn test_info_only_contains_supplied_fields() {
        let meta = Metadata::new().with_title("Deck").without_dates();
        let info = meta.to_info_dict(fixed_now());
        assert_eq!(info.len(), 1);
        assert_eq!(info.get("/Title"), Some(&Value::literal(b"(Deck)".to_vec())));
    }

    #[test]
    fn test_info_default_dates() {
        let info = Metadata::new().to_info_dict(fixed_now());
        let expected = Value::literal(b"(D:20150601123045Z)".to_vec());
        assert_eq!(info.get("/CreationDate"), Some(&expected));
        assert_eq!(info.get("/ModDate"), Some(&expected));
    }

    #[test]
    fn test_info_explicit_dates_survive_no_dates() {
        let created = Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 6).unwrap();
        let info = Metadata::new()
            .with_created(created)
            .without_dates()
            .to_info_dict(fixed_now());
        assert!(info.contains_key("/CreationDate"));
        assert!(!info.contains_key("/ModDate"));
    }

    #[test]
    fn test_info_keywords_joined() {
        let info = Metadata::new()
            .with_keyword("slides")
            .with_keyword("talk")
            .without_dates()
            .to_info_dict(fixed_now());
        assert_eq!(
            info.get("/Keywords"),
            Some(&Value::literal(b"(slides,talk)".to_vec()))
        );
    }

    #[test]
    fn test_add_image_registration_order() {
        let mut doc = Document::new();
        let page = doc.add_image(jpeg("RGB"), PageSize::new(720.0, 540.0)).unwrap();
        assert_eq!(page, ObjectId::new(3));
        assert_eq!(doc.objects().len(), 5);

        let page_dict = doc.object(page).unwrap().content.as_dict().unwrap();
        assert_eq!(page_dict.get("/Parent"), Some(&Value::Reference(ObjectId::new(2))));
        assert_eq!(page_dict.get("/Contents"), Some(&Value::Reference(ObjectId::new(4))));

        let content = doc.object(ObjectId::new(4)).unwrap();
        assert_eq!(
            content.stream.as_deref(),
            Some(&b"q\n720.0000 0 0 540.0000 0 0 cm\n/Im0 Do\nQ"[..])
        );

        let image = doc.object(ObjectId::new(5)).unwrap();
        let image_dict = image.content.as_dict().unwrap();
        assert_eq!(image_dict.get("/Length"), Some(&Value::Integer(4)));
        assert_eq!(image_dict.get("/BitsPerComponent"), Some(&Value::Integer(8)));
        assert_eq!(
            image_dict.get("/ColorSpace"),
            Some(&Value::literal(b"/DeviceRGB".to_vec()))
        );
    }

    #[test]
    fn test_pages_count_tracks_kids() {
        let mut doc = Document::new();
        let first = doc.add_image(jpeg("RGB"), PageSize::new(10.0, 10.0)).unwrap();
        let second = doc.add_image(jpeg("L"), PageSize::new(10.0, 10.0)).unwrap();

        let pages = doc.object(doc.pages_id()).unwrap().content.as_dict().unwrap();
        let kids: Vec<_> = pages
            .get("/Kids")
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .filter_map(Value::as_reference)
            .collect();
        assert_eq!(kids, vec![first, second]);
        assert_eq!(pages.get("/Count").and_then(Value::as_integer), Some(2));
    }

    #[test]
    fn test_unsupported_color_space_is_skipped() {
        let mut doc = Document::new();
        assert!(doc.add_image(jpeg("Foo"), PageSize::new(10.0, 10.0)).is_none());
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.objects().len(), 2);
    }

    #[test]
    fn test_small_page_is_still_added() {
        let mut doc = Document::new();
        assert!(doc.add_image(jpeg("RGB"), PageSize::new(1.0, 1.0)).is_some());
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_inverted_cmyk_decode_array() {
        let mut doc = Document::new();
        doc.add_image(jpeg("CMYK;I"), PageSize::new(10.0, 10.0));
        doc.add_image(jpeg("CMYK"), PageSize::new(10.0, 10.0));

        let inverted = doc.object(ObjectId::new(5)).unwrap().content.as_dict().unwrap();
        assert_eq!(
            inverted.get("/Decode").map(Value::to_string).as_deref(),
            Some("[ 1 0 1 0 1 0 1 0 ]")
        );
        let plain = doc.object(ObjectId::new(8)).unwrap().content.as_dict().unwrap();
        assert!(!plain.contains_key("/Decode"));
    }

    #[test]
    fn test_jpeg2000_raises_version_once() {
        let mut doc = Document::new();
        for _ in 0..3 {
            let image = RasterImage::new(ColorMode::Rgb, 4, 3, ImageFormat::Jpeg2000, vec![0; 4]);
            doc.add_image(image, PageSize::new(10.0, 10.0));
        }
        assert_eq!(doc.version(), PdfVersion::V1_5);
        assert!(doc.serialize().starts_with(b"%PDF-1.5\n"));
    }

    #[test]
    fn test_serialize_empty_document() {
        let doc = Document::with_metadata(&Metadata::new().without_dates());
        let bytes = doc.serialize();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF-1.3\n1 0 obj "));
        assert!(text.contains("xref\n0 4\n0000000000 65535 f \n"));
        assert!(text.contains("/Info 3 0 R"));
        assert!(text.contains("/Root 1 0 R"));
        assert!(text.contains("/Size 4"));
        assert!(text.ends_with("%%EOF\n"));
    }

    #[test]
    fn test_serialize_is_repeatable() {
        let mut doc = Document::with_metadata_at(&Metadata::new(), fixed_now());
        doc.add_image(jpeg("RGB"), PageSize::new(10.0, 10.0));
        assert_eq!(doc.serialize(), doc.serialize());
        assert_eq!(doc.objects().len(), 5);
    }

    #[test]
    fn test_pdf_date() {
        assert_eq!(pdf_date(&fixed_now()), "D:20150601123045Z");
    }
}
