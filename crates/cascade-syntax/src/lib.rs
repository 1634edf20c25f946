//! AST and syntax definitions for Cascade.
//!
//! This crate defines the abstract syntax tree produced by the parser and
//! walked by the evaluator. Selector types double as the runtime
//! representation of resolved selectors.

mod ast;
mod expr;
mod selector;

pub use ast::*;
pub use expr::*;
pub use selector::*;
