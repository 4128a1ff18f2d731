pub mod source;
pub mod writer;

pub use source::{PdfiumSource, SourceError};
pub use writer::SnippetDocument;
