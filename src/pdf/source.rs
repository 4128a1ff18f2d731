use std::cell::OnceCell;

use image::RgbaImage;
use pdfium_render::prelude::*;
use thiserror::Error;

use crate::dimensions::PageDimensions;
use crate::export::{ExportError, PageSource};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to bind the pdfium library: {0}")]
    Bind(String),
    #[error("failed to open the document: {0}")]
    Open(String),
    #[error("failed to render page {page}: {reason}")]
    Render { page: u16, reason: String },
}

thread_local! {
    static PDFIUM: OnceCell<&'static Pdfium> = const { OnceCell::new() };
}

/// Bind pdfium once for the lifetime of the process: a bundled library next
/// to the executable first, the system library as fallback. The binding is
/// leaked to get the `'static` lifetime every document borrows.
fn pdfium() -> Result<&'static Pdfium, SourceError> {
    PDFIUM.with(|cell| {
        if let Some(pdfium) = cell.get() {
            return Ok(*pdfium);
        }
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| SourceError::Bind(format!("{e:?}")))?;
        let pdfium: &'static Pdfium = Box::leak(Box::new(Pdfium::new(bindings)));
        let _ = cell.set(pdfium);
        Ok(pdfium)
    })
}

/// Source document provider over pdfium. Owns the raw file bytes and
/// re-opens the document per operation rather than holding a `PdfDocument`
/// across calls: pdfium's document types are not `Send`, and reopening from
/// memory is cheap next to rasterization.
pub struct PdfiumSource {
    pdfium: &'static Pdfium,
    bytes: Vec<u8>,
    page_count: u16,
}

impl PdfiumSource {
    /// Parse the document once to validate it and learn the page count.
    pub fn load(bytes: Vec<u8>) -> Result<Self, SourceError> {
        let pdfium = pdfium()?;
        let page_count = pdfium
            .load_pdf_from_byte_slice(&bytes, None)
            .map_err(|e| SourceError::Open(format!("{e:?}")))?
            .pages()
            .len();
        Ok(Self {
            pdfium,
            bytes,
            page_count,
        })
    }

    pub fn page_count(&self) -> u16 {
        self.page_count
    }

    fn open(&self) -> Result<PdfDocument<'_>, SourceError> {
        self.pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(|e| SourceError::Open(format!("{e:?}")))
    }

    /// Rasterize a page (1-based) width-to-fit for the on-screen viewer.
    /// Also reports the page's native size so the caller can register it.
    pub fn render_for_display(
        &self,
        page: u16,
        target_width: u32,
    ) -> Result<(RgbaImage, PageDimensions), SourceError> {
        let document = self.open()?;
        let pages = document.pages();
        let pdf_page = pages
            .get(page.saturating_sub(1))
            .map_err(|e| SourceError::Render { page, reason: format!("{e:?}") })?;
        let native = PageDimensions::new(pdf_page.width().value, pdf_page.height().value);

        let config = PdfRenderConfig::new().set_target_width(target_width as i32);
        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| SourceError::Render { page, reason: format!("{e:?}") })?;
        Ok((bitmap.as_image().to_rgba8(), native))
    }

    fn native_size_impl(&self, page: u16) -> Result<PageDimensions, SourceError> {
        let document = self.open()?;
        let pages = document.pages();
        let pdf_page = pages
            .get(page.saturating_sub(1))
            .map_err(|e| SourceError::Render { page, reason: format!("{e:?}") })?;
        Ok(PageDimensions::new(pdf_page.width().value, pdf_page.height().value))
    }

    fn render_scaled(&self, page: u16, scale: f32) -> Result<RgbaImage, SourceError> {
        let document = self.open()?;
        let pages = document.pages();
        let pdf_page = pages
            .get(page.saturating_sub(1))
            .map_err(|e| SourceError::Render { page, reason: format!("{e:?}") })?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| SourceError::Render { page, reason: format!("{e:?}") })?;
        Ok(bitmap.as_image().to_rgba8())
    }
}

impl PageSource for PdfiumSource {
    fn page_count(&self) -> u16 {
        self.page_count
    }

    fn native_size(&self, page: u16) -> Result<PageDimensions, ExportError> {
        self.native_size_impl(page)
            .map_err(|e| ExportError::Render { page, reason: e.to_string() })
    }

    fn render_for_export(&self, page: u16, scale: f32) -> Result<RgbaImage, ExportError> {
        self.render_scaled(page, scale)
            .map_err(|e| ExportError::Render { page, reason: e.to_string() })
    }
}
