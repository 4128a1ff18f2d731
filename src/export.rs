use std::cell::Cell;

use image::{RgbaImage, imageops};
use thiserror::Error;

use crate::dimensions::{DimensionRegistry, PageDimensions};
use crate::mapper::map_to_render_space;
use crate::selection::SelectionStore;

/// Fixed upscaling multiplier for export render buffers, relative to the
/// native page size.
pub const EXPORT_SCALE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum ExportError {
    /// User-input error: aborts the attempt before any work begins.
    #[error("no selections to export")]
    NoSelections,
    /// A second export was requested while one is running.
    #[error("an export is already in progress")]
    InProgress,
    /// Every selection mapped to an empty region.
    #[error("no selections produced an exportable region")]
    NothingToExport,
    /// The source document provider failed; fatal to the current attempt.
    #[error("failed to render page {page}: {reason}")]
    Render { page: u16, reason: String },
    /// The output document writer failed; fatal to the current attempt.
    #[error("failed to write output document: {0}")]
    Write(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape iff width exceeds height.
    pub fn of(width: f32, height: f32) -> Self {
        if width > height { Self::Landscape } else { Self::Portrait }
    }
}

/// Source document provider: renders pages into off-screen buffers for
/// cropping and reports native page sizes.
pub trait PageSource {
    fn page_count(&self) -> u16;

    fn native_size(&self, page: u16) -> Result<PageDimensions, ExportError>;

    /// Render one page at `scale` times its native size.
    fn render_for_export(&self, page: u16, scale: f32) -> Result<RgbaImage, ExportError>;
}

/// Output document writer. Pages are appended in the order the engine
/// produces them; the very first image configures the writer's initial page
/// instead of adding one, because document writers pre-create page 1.
pub trait SnippetSink {
    fn set_first_page_size(&mut self, width: f32, height: f32, orientation: Orientation);

    fn add_page(&mut self, width: f32, height: f32, orientation: Orientation);

    /// Place an image onto the current page at (x, y), scaled to w × h.
    fn place_image(&mut self, image: &RgbaImage, x: f32, y: f32, width: f32, height: f32)
    -> Result<(), ExportError>;

    fn serialize(self) -> Result<Vec<u8>, ExportError>
    where
        Self: Sized;
}

/// Drives the per-page, per-selection export pipeline. Holds the
/// `is_exporting` flag that gates re-entrancy; the flag is reset on every
/// exit path, success or failure.
#[derive(Debug, Default)]
pub struct ExportEngine {
    in_flight: Cell<bool>,
}

impl ExportEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_exporting(&self) -> bool {
        self.in_flight.get()
    }

    /// Run a full export: every page with selections, in page order; every
    /// selection in left-to-right order. Returns the serialized output
    /// document. No partial output exists on failure.
    pub fn run<S: PageSource, W: SnippetSink>(
        &self,
        source: &S,
        sink: W,
        store: &SelectionStore,
        registry: &DimensionRegistry,
    ) -> Result<Vec<u8>, ExportError> {
        if self.in_flight.replace(true) {
            // Already running: the outer call owns the flag.
            return Err(ExportError::InProgress);
        }
        let result = run_pipeline(source, sink, store, registry);
        self.in_flight.set(false);
        result
    }
}

fn run_pipeline<S: PageSource, W: SnippetSink>(
    source: &S,
    mut sink: W,
    store: &SelectionStore,
    registry: &DimensionRegistry,
) -> Result<Vec<u8>, ExportError> {
    if store.is_empty() {
        return Err(ExportError::NoSelections);
    }

    let mut appended = 0usize;
    for page in 1..=source.page_count() {
        let selections = store.export_order(page);
        if selections.is_empty() {
            continue;
        }

        // Pages are strictly sequential: a single high-resolution buffer is
        // alive at a time and fully consumed before the next page renders.
        let buffer = source.render_for_export(page, EXPORT_SCALE)?;
        let native = match registry.native(page) {
            Some(dims) => dims,
            None => source.native_size(page)?,
        };
        log::info!(
            "exporting page {page}: {} selection(s) against a {}x{} buffer",
            selections.len(),
            buffer.width(),
            buffer.height()
        );

        for sel in &selections {
            let region = map_to_render_space(sel, native, buffer.width() as f32);
            let Some((x, y, w, h)) = region.to_pixel_rect(buffer.width(), buffer.height()) else {
                log::warn!("skipping selection {} on page {page}: degenerate mapped region", sel.id);
                continue;
            };

            let crop = imageops::crop_imm(&buffer, x, y, w, h).to_image();
            let (page_w, page_h) = (crop.width() as f32, crop.height() as f32);
            let orientation = Orientation::of(page_w, page_h);
            if appended == 0 {
                sink.set_first_page_size(page_w, page_h, orientation);
            } else {
                sink.add_page(page_w, page_h, orientation);
            }
            sink.place_image(&crop, 0.0, 0.0, page_w, page_h)?;
            appended += 1;
        }
    }

    if appended == 0 {
        return Err(ExportError::NothingToExport);
    }
    sink.serialize()
}
