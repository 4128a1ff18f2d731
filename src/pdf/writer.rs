use image::DynamicImage;
use image::RgbaImage;
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::export::{ExportError, Orientation, SnippetSink};

const JPEG_QUALITY: u8 = 90;

/// Output document writer over lopdf. Each placed image becomes one page:
/// a DCTDecode image XObject plus a content stream scaling it to fill the
/// page's MediaBox exactly. The pages tree, catalog and trailer are
/// assembled on `serialize`.
pub struct SnippetDocument {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    pending: Option<PendingPage>,
}

/// Page size configured via `set_first_page_size`/`add_page`, consumed by
/// the next `place_image`.
struct PendingPage {
    width: f32,
    height: f32,
}

impl Default for SnippetDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SnippetDocument {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            pending: None,
        }
    }
}

impl SnippetSink for SnippetDocument {
    fn set_first_page_size(&mut self, width: f32, height: f32, orientation: Orientation) {
        log::debug!("first output page {width}x{height} ({orientation:?})");
        self.pending = Some(PendingPage { width, height });
    }

    fn add_page(&mut self, width: f32, height: f32, orientation: Orientation) {
        log::debug!("output page {} {width}x{height} ({orientation:?})", self.kids.len() + 1);
        self.pending = Some(PendingPage { width, height });
    }

    fn place_image(
        &mut self,
        image: &RgbaImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), ExportError> {
        let Some(page) = self.pending.take() else {
            return Err(ExportError::Write("no page configured for image placement".into()));
        };

        // DCTDecode carries the JPEG stream as-is; encode from RGB.
        let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
            .encode_image(&rgb)
            .map_err(|e| ExportError::Write(e.to_string()))?;

        let xobject_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width()),
                "Height" => i64::from(image.height()),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        let image_name = format!("Im{}", self.kids.len());

        // PDF page space has its origin at the bottom-left.
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0f32.into(),
                    0f32.into(),
                    height.into(),
                    x.into(),
                    (page.height - y - height).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(image_name.clone().into_bytes())]),
            Operation::new("Q", vec![]),
        ];
        let content = Content { operations };
        let content_id = self.doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(|e| ExportError::Write(e.to_string()))?,
        ));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0f32.into(), 0f32.into(), page.width.into(), page.height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { image_name => xobject_id },
            },
        });
        self.kids.push(page_id);
        Ok(())
    }

    fn serialize(mut self) -> Result<Vec<u8>, ExportError> {
        let kids: Vec<Object> = self.kids.iter().map(|id| Object::Reference(*id)).collect();
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| ExportError::Write(e.to_string()))?;
        Ok(bytes)
    }
}
