//! Display-space to render-buffer-space mapping.
//!
//! A selection is drawn against the on-screen render of a page; exporting
//! crops it out of a separate, higher-resolution render of the same page.
//! No shared transform exists between the two renders. Scale and letterbox
//! padding are inferred from dimension samples taken at different times: the
//! selection's displayed-size snapshot, the page's native size, and the
//! export buffer's pixel width.

use crate::dimensions::PageDimensions;
use crate::selection::Selection;

/// A selection mapped into render-buffer pixel space. Coordinates are kept
/// as floats; `to_pixel_rect` resolves them against a concrete buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl MappedRegion {
    /// Clamp into a buffer of the given pixel size. Returns `None` when the
    /// region has no positive-area intersection with the buffer; such
    /// regions are degenerate and must be skipped by the caller, not treated
    /// as fatal.
    pub fn to_pixel_rect(&self, buffer_width: u32, buffer_height: u32) -> Option<(u32, u32, u32, u32)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let x0 = self.x.max(0.0);
        let y0 = self.y.max(0.0);
        let x1 = (self.x + self.width).min(buffer_width as f32);
        let y1 = (self.y + self.height).min(buffer_height as f32);
        let w = (x1 - x0).round() as i64;
        let h = (y1 - y0).round() as i64;
        if w <= 0 || h <= 0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, w as u32, h as u32))
    }
}

/// Map a selection from its display space into the export render buffer.
///
/// Both axes share one scale factor: render buffers are produced at a uniform
/// multiple of the native page, so only the vertical letterbox needs separate
/// correction. The displayed height can exceed the height a faithful render
/// of the page would have when the viewer centers the page inside a taller
/// container; that padding is assumed vertical and centered. Horizontal
/// letterboxing is a known limitation: containers size width-to-fit, and the
/// formula under-corrects if a renderer ever pads horizontally.
///
/// When the selection's displayed size equals the buffer size and no
/// letterboxing occurred, this reduces to the identity.
pub fn map_to_render_space(selection: &Selection, native: PageDimensions, render_width: f32) -> MappedRegion {
    let scale = render_width / selection.displayed.width;

    // Display height the page would occupy if its native aspect ratio were
    // preserved exactly; anything beyond that is centered padding.
    let expected_height = selection.displayed.width * native.aspect();
    let padding = ((selection.displayed.height - expected_height) / 2.0).max(0.0);

    MappedRegion {
        x: selection.left * scale,
        y: (selection.top - padding) * scale,
        width: selection.width * scale,
        height: selection.height * scale,
    }
}
