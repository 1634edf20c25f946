//! The Cascade expression lexer.
//! Cascade 表达式词法分析器。

use crate::token::{Token, TokenKind};
use cascade_common::Span;
use cascade_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};
use logos::Logos;

/// The Cascade lexer.
/// Cascade 词法分析器。
///
/// Converts a fragment of source code into a sequence of tokens. Spans are
/// reported relative to the enclosing file by adding `base` to every
/// offset.
/// 将源码片段转换为 token 序列；所有位置都会加上 `base`，以相对整个文件报告。
pub struct Lexer<'src> {
    source: &'src str,
    base: u32,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code.
    /// 为给定的源代码创建新的词法分析器。
    pub fn new(source: &'src str) -> Self {
        Self::with_base(source, 0)
    }

    /// Create a lexer for a fragment that starts at byte `base` of its file.
    /// 为从文件第 `base` 字节开始的片段创建词法分析器。
    pub fn with_base(source: &'src str, base: u32) -> Self {
        Self {
            source,
            base,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the entire source and return tokens and diagnostics.
    /// 对整个源代码进行词法分析，返回 token 列表和诊断信息。
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        let mut inner = TokenKind::lexer(self.source);

        while let Some(result) = inner.next() {
            let range = inner.span();
            let span = Span::from_usize(range.start, range.end).shift(self.base);
            match result {
                Ok(kind) => tokens.push(Token::new(kind, span)),
                Err(()) => self.error_at(inner.slice(), span),
            }
        }

        let end = Span::from_usize(self.source.len(), self.source.len()).shift(self.base);
        tokens.push(Token::new(TokenKind::Eof, end));
        (tokens, self.diagnostics)
    }

    fn error_at(&mut self, slice: &str, span: Span) {
        let (code, message) = match slice.chars().next() {
            Some('"') | Some('\'') => (ErrorCode::UnterminatedString, "unterminated string".to_string()),
            Some('/') if slice.starts_with("/*") => {
                (ErrorCode::UnterminatedComment, "unterminated comment".to_string())
            }
            Some(ch) => (ErrorCode::UnexpectedCharacter, format!("unexpected character `{ch}`")),
            None => (ErrorCode::UnexpectedCharacter, "unexpected input".to_string()),
        };
        self.diagnostics.push(
            Diagnostic::error(DiagnosticKind::Syntax, span, message)
                .with_code(code)
                .with_label(Label::new(span, "here")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, diagnostics) = Lexer::new(source).tokenize();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_numbers_with_units() {
        assert_eq!(
            kinds("10px .5em 50% 3"),
            vec![
                TokenKind::Number((10.0, Some("px".into()))),
                TokenKind::Number((0.5, Some("em".into()))),
                TokenKind::Number((50.0, Some("%".into()))),
                TokenKind::Number((3.0, None)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_and_variables() {
        assert_eq!(
            kinds("$base-size -webkit-box --gap sans-serif"),
            vec![
                TokenKind::Variable("base-size".into()),
                TokenKind::Ident("-webkit-box".into()),
                TokenKind::Ident("--gap".into()),
                TokenKind::Ident("sans-serif".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_spacing_is_observable() {
        let (tokens, _) = Lexer::new("1px - 2px").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Minus);
        assert!(!tokens[0].touches(&tokens[1]));
        let (tokens, _) = Lexer::new("1px -2px").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Minus);
        assert!(tokens[1].touches(&tokens[2]));
    }

    #[test]
    fn test_interpolation_and_hash() {
        assert_eq!(
            kinds("#fff #{$x}"),
            vec![
                TokenKind::Hash("fff".into()),
                TokenKind::HashLBrace,
                TokenKind::Variable("x".into()),
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_flags() {
        assert_eq!(
            kinds("red /* note */ !important // trailing"),
            vec![
                TokenKind::Ident("red".into()),
                TokenKind::Flag("important".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_url_kept_verbatim() {
        assert_eq!(
            kinds("url(data:image/png;base64,AAA=)"),
            vec![
                TokenKind::Url("url(data:image/png;base64,AAA=)".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_base_offset() {
        let (tokens, _) = Lexer::with_base("a", 10).tokenize();
        assert_eq!(tokens[0].span, Span::from_usize(10, 11));
    }

    #[test]
    fn test_unterminated_string_reported() {
        let (_, diagnostics) = Lexer::new("\"abc").tokenize();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Some(ErrorCode::UnterminatedString));
    }
}
