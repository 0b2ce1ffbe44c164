//! CMS module - raw document shapes and the sources that deliver them

mod document;
mod memory;
mod prismic;
mod source;

pub use document::{
    parse_timestamp, RawContentBlock, RawDocument, RawImage, RawPostData, SearchResponse,
};
pub use memory::{cursor_for, MemoryCms};
pub use prismic::PrismicClient;
pub use source::{ContentSource, PageTransport};
