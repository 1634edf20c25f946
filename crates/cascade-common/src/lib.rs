//! Common utilities and data structures for Cascade.
//!
//! This crate provides foundational types used across the Cascade compiler:
//! - `Span`: Source code location tracking
//! - `LineIndex`: Byte offset to line/column mapping
//! - `normalize_path`: Lexical path normalisation for module identity

mod line_index;
mod path;
mod span;

pub use line_index::{LineCol, LineIndex};
pub use path::{normalize_path, path_key};
pub use span::{BytePos, Span};
