#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod dimensions;
pub mod export;
pub mod interaction;
pub mod mapper;
pub mod pdf;
pub mod selection;

pub use app::SnipApp;
pub use dimensions::{DimensionRegistry, PageDimensions, RenderedDimensions};
pub use export::{EXPORT_SCALE, ExportEngine, ExportError, Orientation, PageSource, SnippetSink};
pub use interaction::{InteractionController, PointerEvent, SelectionCommand};
pub use mapper::{MappedRegion, map_to_render_space};
pub use selection::{DisplayRect, MIN_SELECTION_EDGE, Selection, SelectionStore};
