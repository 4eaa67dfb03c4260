// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open scanned PDFs and recover the raster image behind each
// page using the `lopdf` crate.
//
// Scanner output is one full-page image per page, so "rendering" a scanned
// page means decoding the largest image XObject the page draws. Vector
// content and text objects are not rasterized.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use scanshelf_core::error::ScanshelfError;
use tracing::{debug, info, instrument, warn};

/// Guard against cyclic or absurdly deep `/Parent` chains.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Reads page images out of an existing PDF.
///
/// Wraps `lopdf::Document`; pages are addressed by zero-based index.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Page object ids in page order.
    pages: Vec<ObjectId>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScanshelfError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            ScanshelfError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        Ok(Self::from_document(document))
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ScanshelfError> {
        let document = Document::load_mem(data).map_err(|err| {
            ScanshelfError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        Ok(Self::from_document(document))
    }

    fn from_document(document: Document) -> Self {
        // lopdf keys pages by 1-indexed page number in a BTreeMap, so the
        // values come out in page order.
        let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
        debug!(pages = pages.len(), "PDF loaded");
        Self { document, pages }
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    // -- Extraction -----------------------------------------------------------

    /// Decode the raster image of page `page_index` (zero-based).
    ///
    /// When a page draws several images the largest one (by pixel area) is
    /// taken to be the scan.
    #[instrument(skip(self))]
    pub fn page_raster(&self, page_index: usize) -> Result<DynamicImage, ScanshelfError> {
        let page_id = *self.pages.get(page_index).ok_or_else(|| {
            ScanshelfError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_index,
                self.pages.len()
            ))
        })?;

        let resources = self.page_resources(page_id)?;
        let image = self
            .image_xobjects(resources)
            .max_by_key(|(_, width, height)| u64::from(*width) * u64::from(*height))
            .ok_or_else(|| {
                ScanshelfError::PdfError(format!("page {} has no raster image", page_index))
            })?;

        let (stream, width, height) = image;
        let decoded = decode_image_stream(stream, width, height)?;
        debug!(
            page_index,
            width = decoded.width(),
            height = decoded.height(),
            "Page image decoded"
        );
        Ok(decoded)
    }

    // -- Helpers --------------------------------------------------------------

    /// Resolve an object, following a single indirect reference if present.
    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object, ScanshelfError> {
        match object {
            Object::Reference(id) => self.document.get_object(*id).map_err(|err| {
                ScanshelfError::PdfError(format!("cannot resolve object {:?}: {}", id, err))
            }),
            other => Ok(other),
        }
    }

    /// The `/Resources` dictionary of a page, inherited from the page tree if
    /// the page itself does not carry one.
    fn page_resources(&self, page_id: ObjectId) -> Result<&Dictionary, ScanshelfError> {
        let mut node = self.document.get_dictionary(page_id).map_err(|err| {
            ScanshelfError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        for _ in 0..MAX_PAGE_TREE_DEPTH {
            if let Ok(resources) = node.get(b"Resources") {
                return self.resolve(resources)?.as_dict().map_err(|err| {
                    ScanshelfError::PdfError(format!("/Resources is not a dictionary: {}", err))
                });
            }
            let parent = match node.get(b"Parent") {
                Ok(parent) => parent,
                Err(_) => break,
            };
            node = self.resolve(parent)?.as_dict().map_err(|err| {
                ScanshelfError::PdfError(format!("/Parent is not a dictionary: {}", err))
            })?;
        }

        Err(ScanshelfError::PdfError(format!(
            "page {:?} has no resources",
            page_id
        )))
    }

    /// Every image XObject in `resources`, with its pixel dimensions.
    fn image_xobjects<'a>(
        &'a self,
        resources: &'a Dictionary,
    ) -> impl Iterator<Item = (&'a Stream, u32, u32)> + 'a {
        let xobjects = resources
            .get(b"XObject")
            .ok()
            .and_then(|xobjects| self.resolve(xobjects).ok())
            .and_then(|xobjects| xobjects.as_dict().ok());

        xobjects
            .into_iter()
            .flat_map(|dict| dict.iter())
            .filter_map(move |(name, object)| {
                let stream = self.resolve(object).ok()?.as_stream().ok()?;
                let is_image = stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|subtype| subtype.as_name())
                    .is_ok_and(|subtype| subtype == b"Image");
                if !is_image {
                    return None;
                }
                let width = dimension(&stream.dict, b"Width")?;
                let height = dimension(&stream.dict, b"Height")?;
                debug!(
                    name = %String::from_utf8_lossy(name),
                    width,
                    height,
                    "Image XObject found"
                );
                Some((stream, width, height))
            })
    }
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Option<u32> {
    let value = dict.get(key).ok()?.as_i64().ok()?;
    u32::try_from(value).ok().filter(|v| *v > 0)
}

/// Names of the filters applied to a stream, outermost first.
fn stream_filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(filters)) => filters
            .iter()
            .filter_map(|filter| filter.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// Decode an image XObject stream into pixels.
///
/// Supports JPEG (`DCTDecode`), which is what scanners emit, plus raw and
/// `FlateDecode` 8-bit gray or RGB samples.
fn decode_image_stream(
    stream: &Stream,
    width: u32,
    height: u32,
) -> Result<DynamicImage, ScanshelfError> {
    let filters = stream_filters(stream);
    let filter_names: Vec<&[u8]> = filters.iter().map(Vec::as_slice).collect();

    let samples = match filter_names.as_slice() {
        [b"DCTDecode"] => {
            return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                .map_err(|err| {
                    ScanshelfError::ImageError(format!("failed to decode JPEG page image: {}", err))
                });
        }
        [] => stream.content.clone(),
        [b"FlateDecode"] => stream.decompressed_content().map_err(|err| {
            ScanshelfError::ImageError(format!("failed to inflate page image: {}", err))
        })?,
        other => {
            let names: Vec<String> = other
                .iter()
                .map(|name| String::from_utf8_lossy(name).into_owned())
                .collect();
            warn!(filters = ?names, "Unsupported image filter chain");
            return Err(ScanshelfError::ImageError(format!(
                "unsupported image filters: {}",
                names.join(", ")
            )));
        }
    };

    let bits = stream
        .dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 {
        return Err(ScanshelfError::ImageError(format!(
            "unsupported bit depth {} (only 8-bit samples are read)",
            bits
        )));
    }

    let pixels = u64::from(width) * u64::from(height);
    let channels = if pixels == 0 {
        0
    } else {
        samples.len() as u64 / pixels
    };

    let decoded = match channels {
        1 => GrayImage::from_raw(width, height, truncate(samples, pixels))
            .map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, truncate(samples, pixels * 3))
            .map(DynamicImage::ImageRgb8),
        _ => None,
    };

    decoded.ok_or_else(|| {
        ScanshelfError::ImageError(format!(
            "cannot interpret {} sample bytes as a {}x{} gray or RGB image",
            stream.content.len(),
            width,
            height
        ))
    })
}

/// Drop trailing padding some writers leave after the last row.
fn truncate(mut samples: Vec<u8>, len: u64) -> Vec<u8> {
    samples.truncate(usize::try_from(len).unwrap_or(usize::MAX));
    samples
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use lopdf::content::{Content, Operation};
    use lopdf::dictionary;

    use super::*;

    /// One image XObject to place on a test page.
    pub(crate) struct TestImage {
        pub width: i64,
        pub height: i64,
        pub color_space: &'static str,
        pub filter: Option<&'static str>,
        pub data: Vec<u8>,
    }

    impl TestImage {
        /// Uncompressed 8-bit grayscale, every pixel `shade`.
        pub(crate) fn gray(width: i64, height: i64, shade: u8) -> Self {
            Self {
                width,
                height,
                color_space: "DeviceGray",
                filter: None,
                data: vec![shade; (width * height) as usize],
            }
        }
    }

    /// Build a PDF where page N draws `pages[N]` (or nothing when empty).
    pub(crate) fn pdf_with_pages(pages: Vec<Vec<TestImage>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();

        for images in pages {
            let mut xobjects = Dictionary::new();
            let mut operations = Vec::new();
            for (index, image) in images.into_iter().enumerate() {
                let mut dict = dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width,
                    "Height" => image.height,
                    "ColorSpace" => image.color_space,
                    "BitsPerComponent" => 8,
                };
                if let Some(filter) = image.filter {
                    dict.set("Filter", filter);
                }
                let image_id = doc.add_object(Stream::new(dict, image.data));
                let name = format!("Im{index}");
                xobjects.set(name.as_bytes().to_vec(), image_id);
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new(
                    "cm",
                    vec![
                        image.width.into(),
                        0.into(),
                        0.into(),
                        image.height.into(),
                        0.into(),
                        0.into(),
                    ],
                ));
                operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
                operations.push(Operation::new("Q", vec![]));
            }

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                Dictionary::new(),
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => dictionary! { "XObject" => xobjects },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save test PDF");
        bytes
    }

    #[test]
    fn counts_pages() {
        let pdf = pdf_with_pages(vec![
            vec![TestImage::gray(4, 2, 0)],
            vec![TestImage::gray(4, 2, 0)],
            vec![TestImage::gray(4, 2, 0)],
        ]);
        let reader = PdfReader::from_bytes(&pdf).expect("load");
        assert_eq!(reader.page_count(), 3);
    }

    #[test]
    fn empty_document_has_no_pages() {
        let reader = PdfReader::from_bytes(&pdf_with_pages(vec![])).expect("load");
        assert_eq!(reader.page_count(), 0);
        assert!(reader.page_raster(0).is_err());
    }

    #[test]
    fn decodes_raw_gray_page() {
        let pdf = pdf_with_pages(vec![vec![TestImage::gray(4, 2, 200)]]);
        let reader = PdfReader::from_bytes(&pdf).expect("load");

        let raster = reader.page_raster(0).expect("raster");

        assert_eq!((raster.width(), raster.height()), (4, 2));
        assert!(raster.to_luma8().pixels().all(|p| p.0[0] == 200));
    }

    #[test]
    fn decodes_jpeg_page() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, image::Rgb([30, 90, 200])));
        let mut jpeg = Vec::new();
        source
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .expect("encode jpeg");
        let pdf = pdf_with_pages(vec![vec![TestImage {
            width: 16,
            height: 8,
            color_space: "DeviceRGB",
            filter: Some("DCTDecode"),
            data: jpeg,
        }]]);

        let raster = PdfReader::from_bytes(&pdf)
            .expect("load")
            .page_raster(0)
            .expect("raster");

        assert_eq!((raster.width(), raster.height()), (16, 8));
    }

    #[test]
    fn picks_largest_image_on_page() {
        let pdf = pdf_with_pages(vec![vec![
            TestImage::gray(2, 2, 10),
            TestImage::gray(8, 6, 250),
        ]]);
        let raster = PdfReader::from_bytes(&pdf)
            .expect("load")
            .page_raster(0)
            .expect("raster");
        assert_eq!((raster.width(), raster.height()), (8, 6));
    }

    #[test]
    fn page_without_image_is_an_error() {
        let pdf = pdf_with_pages(vec![vec![]]);
        let err = PdfReader::from_bytes(&pdf)
            .expect("load")
            .page_raster(0)
            .expect_err("no image");
        assert!(matches!(err, ScanshelfError::PdfError(_)));
    }

    #[test]
    fn out_of_range_page_is_an_error() {
        let pdf = pdf_with_pages(vec![vec![TestImage::gray(2, 2, 0)]]);
        let reader = PdfReader::from_bytes(&pdf).expect("load");
        assert!(matches!(reader.page_raster(1), Err(ScanshelfError::PdfError(_))));
    }

    #[test]
    fn unsupported_filter_is_an_image_error() {
        let pdf = pdf_with_pages(vec![vec![TestImage {
            width: 2,
            height: 2,
            color_space: "DeviceGray",
            filter: Some("JBIG2Decode"),
            data: vec![0; 4],
        }]]);
        let err = PdfReader::from_bytes(&pdf)
            .expect("load")
            .page_raster(0)
            .expect_err("unsupported filter");
        assert!(matches!(err, ScanshelfError::ImageError(_)));
    }

    #[test]
    fn garbage_bytes_are_a_pdf_error() {
        assert!(matches!(
            PdfReader::from_bytes(b"not a pdf"),
            Err(ScanshelfError::PdfError(_))
        ));
    }
}
