//! Lexical analysis for Cascade.
//! Cascade 词法分析模块。
//!
//! This crate turns value expressions (the right-hand side of declarations,
//! at-rule preludes, arguments) into tokens. Statement structure is scanned
//! by the parser directly on characters.
//! 本 crate 将值表达式转换为 token 序列，语句结构由解析器直接按字符扫描。

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};
