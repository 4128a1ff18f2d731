use std::collections::BTreeMap;

use crate::dimensions::RenderedDimensions;

/// Selections at or under this edge length (display pixels) are treated as
/// accidental clicks and never committed.
pub const MIN_SELECTION_EDGE: f32 = 5.0;

/// A rectangle in display pixels, relative to the page's on-screen origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

/// A committed region on one page.
///
/// `displayed` is a snapshot of the page's rendered size at creation time,
/// captured rather than referenced: a later viewport resize must not corrupt
/// the mapping of an already-saved selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub id: u64,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub displayed: RenderedDimensions,
}

impl Selection {
    pub fn rect(&self) -> DisplayRect {
        DisplayRect::new(self.left, self.top, self.width, self.height)
    }
}

/// Owns every committed selection plus the global id counter. Ids increase
/// monotonically across the whole document lifetime and are never reused,
/// also not after deletions.
#[derive(Debug, Default)]
pub struct SelectionStore {
    pages: BTreeMap<u16, Vec<Selection>>,
    next_id: u64,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a drawn rectangle. Returns the assigned id, or `None` (and
    /// mutates nothing) when the rectangle fails the minimum-size gate.
    /// The rectangle is clamped into `[0, displayed]` before storing.
    pub fn create(&mut self, page: u16, rect: DisplayRect, displayed: RenderedDimensions) -> Option<u64> {
        if rect.width <= MIN_SELECTION_EDGE || rect.height <= MIN_SELECTION_EDGE {
            return None;
        }

        let left = rect.left.clamp(0.0, displayed.width);
        let top = rect.top.clamp(0.0, displayed.height);
        let width = rect.width.min(displayed.width - left);
        let height = rect.height.min(displayed.height - top);

        let id = self.next_id;
        self.next_id += 1;

        self.pages.entry(page).or_default().push(Selection {
            id,
            left,
            top,
            width,
            height,
            displayed,
        });
        Some(id)
    }

    /// Reposition a selection. The new top-left is clamped against the
    /// selection's own size and displayed-dimension snapshot, not against the
    /// current registry state: its frame of reference is fixed at creation.
    /// No-op if the id is not present on that page.
    pub fn move_to(&mut self, page: u16, id: u64, new_left: f32, new_top: f32) {
        let Some(selections) = self.pages.get_mut(&page) else {
            return;
        };
        if let Some(sel) = selections.iter_mut().find(|s| s.id == id) {
            sel.left = new_left.clamp(0.0, sel.displayed.width - sel.width);
            sel.top = new_top.clamp(0.0, sel.displayed.height - sel.height);
        }
    }

    /// No-op if the id is not present on that page.
    pub fn delete(&mut self, page: u16, id: u64) {
        if let Some(selections) = self.pages.get_mut(&page) {
            selections.retain(|s| s.id != id);
        }
    }

    /// Insertion order, for display.
    pub fn list(&self, page: u16) -> &[Selection] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or_default()
    }

    /// Ascending `left`: the left-to-right page order used by the export
    /// engine, independent of creation order.
    pub fn export_order(&self, page: u16) -> Vec<Selection> {
        let mut selections = self.list(page).to_vec();
        selections.sort_by(|a, b| a.left.total_cmp(&b.left));
        selections
    }

    pub fn is_empty(&self) -> bool {
        self.pages.values().all(Vec::is_empty)
    }

    /// Document reset (new file loaded). The id counter is not rewound.
    pub fn clear(&mut self) {
        self.pages.clear();
    }
}
