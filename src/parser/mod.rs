// Insights markup parser module

pub mod ast;
pub mod markup;

// Public API re-exports
pub use ast::{Block, Document, Inline};
pub use markup::{parse_inlines, parse_markup};
