//! Character-level helpers shared by the statement and selector parsers.

use cascade_common::Span;
use cascade_diagnostic::ErrorCode;

use crate::error::{ParseError, ParseResult};

/// Replace every comment with whitespace of the same byte length.
///
/// Offsets into the result are offsets into `source`. `//` only starts a
/// comment outside parentheses so `url(http://…)` survives.
pub(crate) fn blank_comments(source: &str) -> ParseResult<String> {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut parens = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                let end = skip_string(bytes, i);
                out.push_str(&source[i..end]);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = source[i + 2..].find("*/").map(|p| i + 2 + p + 2).ok_or_else(|| {
                    ParseError::new(
                        ErrorCode::UnterminatedComment,
                        Span::from_usize(i, i + 2),
                        "unterminated comment",
                    )
                })?;
                blank(&mut out, &source[i..end]);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') && parens == 0 => {
                let end = source[i..].find('\n').map_or(source.len(), |p| i + p);
                blank(&mut out, &source[i..end]);
                i = end;
            }
            b => {
                match b {
                    b'(' => parens += 1,
                    b')' => parens = parens.saturating_sub(1),
                    _ => {}
                }
                let ch = source[i..].chars().next().unwrap_or(' ');
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    Ok(out)
}

fn blank(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch == '\n' {
            out.push('\n');
        } else {
            out.extend(std::iter::repeat_n(' ', ch.len_utf8()));
        }
    }
}

/// Index just past the string starting at `start`. Unterminated strings end
/// at the line end and are reported by the lexer.
pub(crate) fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// What stopped a [`scan_statement`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminator {
    /// `{`
    Block,
    /// `;`
    Semicolon,
    /// `}` of the enclosing block, not consumed.
    Close,
    Eof,
}

/// Find the first `{`, `;` or `}` at nesting depth zero, skipping strings,
/// parentheses, brackets and `#{…}` groups.
pub(crate) fn scan_statement(src: &str, from: usize) -> (usize, Terminator) {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'\\' => {
                i += 2;
                continue;
            }
            b'#' if bytes.get(i + 1) == Some(&b'{') => {
                i = closing_brace(src, i + 2).map_or(bytes.len(), |end| end + 1);
                continue;
            }
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'{' if depth == 0 => return (i, Terminator::Block),
            b';' if depth == 0 => return (i, Terminator::Semicolon),
            b'}' if depth == 0 => return (i, Terminator::Close),
            _ => {}
        }
        i += 1;
    }
    (bytes.len(), Terminator::Eof)
}

/// Like [`scan_statement`] for directives whose prelude may hold a braced
/// specifier list (`@use { a } from "x";`). Never returns
/// [`Terminator::Block`].
pub(crate) fn scan_directive(src: &str, from: usize) -> (usize, Terminator) {
    let bytes = src.as_bytes();
    let mut braces = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'{' => braces += 1,
            b'}' if braces > 0 => braces -= 1,
            b'}' => return (i, Terminator::Close),
            b';' if braces == 0 => return (i, Terminator::Semicolon),
            _ => {}
        }
        i += 1;
    }
    (bytes.len(), Terminator::Eof)
}

/// Index of the `}` closing a group whose body starts at `from`.
pub(crate) fn closing_brace(src: &str, from: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut depth = 1usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the first `:` at depth zero, outside strings and `#{…}`.
pub(crate) fn find_colon(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'#' if bytes.get(i + 1) == Some(&b'{') => {
                i = closing_brace(src, i + 2).map_or(bytes.len(), |end| end + 1);
                continue;
            }
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

pub(crate) fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

/// Byte range of `text` within `src[start..end]` after trimming whitespace.
pub(crate) fn trimmed(src: &str, start: usize, end: usize) -> (usize, usize) {
    let slice = &src[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trail = slice.len() - slice.trim_end().len();
    if lead == slice.len() {
        return (start, start);
    }
    (start + lead, end - trail)
}
