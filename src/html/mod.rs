//! HTML document model
//!
//! - `document`: arena tree built from raw HTML
//! - `locator`: parser for the XPath subset the locator strategies emit

pub mod document;
pub mod locator;

pub use document::{normalize_text, Document, Node, NodeId, ParseError};
pub use locator::{quote, Locator, LocatorSyntaxError};
