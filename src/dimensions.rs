use std::collections::HashMap;

/// Native size of a page in page units (PDF points). Positive by contract of
/// the rendering collaborator that reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
}

impl PageDimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// height / width ratio; used to derive the display height a
    /// letterbox-free render of this page would have.
    pub fn aspect(&self) -> f32 {
        self.height / self.width
    }
}

/// Pixel size of the most recent on-screen render of a page. Overwritten on
/// every render, so a viewport resize re-registers it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedDimensions {
    pub width: f32,
    pub height: f32,
}

impl RenderedDimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Per-page dimension samples, taken at render time by the page-rendering
/// collaborators. Last write wins: downstream mapping must use the dimensions
/// a selection was created against (its own snapshot), never the registry
/// state at export time.
#[derive(Debug, Default)]
pub struct DimensionRegistry {
    native: HashMap<u16, PageDimensions>,
    rendered: HashMap<u16, RenderedDimensions>,
}

impl DimensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_native(&mut self, page: u16, dims: PageDimensions) {
        self.native.insert(page, dims);
    }

    pub fn set_rendered(&mut self, page: u16, dims: RenderedDimensions) {
        self.rendered.insert(page, dims);
    }

    pub fn native(&self, page: u16) -> Option<PageDimensions> {
        self.native.get(&page).copied()
    }

    pub fn rendered(&self, page: u16) -> Option<RenderedDimensions> {
        self.rendered.get(&page).copied()
    }

    /// Document reset: entries survive until a new file is loaded.
    pub fn clear(&mut self) {
        self.native.clear();
        self.rendered.clear();
    }
}
