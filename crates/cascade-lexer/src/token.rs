//! Token definitions for Cascade.

use cascade_common::Span;
use logos::{Lexer, Logos};

/// A token with its kind and span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// True when no whitespace or comment separates `self` from `next`.
    pub fn touches(&self, next: &Token) -> bool {
        self.span.end == next.span.start
    }
}

fn number(lex: &mut Lexer<TokenKind>) -> Option<(f64, Option<String>)> {
    let text = lex.slice();
    let split = text
        .find(|c: char| c == '%' || c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let value = text[..split].parse::<f64>().ok()?;
    let unit = (split < text.len()).then(|| text[split..].to_ascii_lowercase());
    Some((value, unit))
}

fn quoted(lex: &mut Lexer<TokenKind>) -> String {
    let text = lex.slice();
    text[1..text.len() - 1].to_string()
}

fn after_sigil(lex: &mut Lexer<TokenKind>) -> String {
    lex.slice()[1..].to_string()
}

fn flag(lex: &mut Lexer<TokenKind>) -> String {
    lex.slice()[1..].trim_start().to_ascii_lowercase()
}

/// The kind of a token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // Literals
    #[regex(r"([0-9]+(\.[0-9]+)?|\.[0-9]+)(%|[a-zA-Z]+)?", number)]
    Number((f64, Option<String>)),
    #[regex(r#""([^"\\\n]|\\.)*""#, quoted)]
    DoubleQuoted(String),
    #[regex(r#"'([^'\\\n]|\\.)*'"#, quoted)]
    SingleQuoted(String),
    /// Unquoted `url(...)`, kept verbatim.
    #[regex(r#"url\([ \t]*[^)"' \t\n]*[ \t]*\)"#, |lex| lex.slice().to_string())]
    Url(String),
    /// `#abc`, `#a1b2c3`, or an id-like hash.
    #[regex(r"#[a-zA-Z0-9_-]+", after_sigil)]
    Hash(String),
    /// `!important`, `!default`, `!global`.
    #[regex(r"![ \t]*[a-zA-Z]+", flag)]
    Flag(String),

    // Names
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_-]*", after_sigil)]
    Variable(String),
    #[regex(r"(--|-)?[a-zA-Z_][a-zA-Z0-9_-]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("#{")]
    HashLBrace,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    StarStar,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("&")]
    Ampersand,
    #[token("...")]
    Ellipsis,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,

    // Special
    Eof,
}

impl TokenKind {
    /// Returns the identifier text if this token is an identifier.
    pub fn ident(&self) -> Option<&str> {
        match self {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if this token is the identifier `word`.
    pub fn is_word(&self, word: &str) -> bool {
        self.ident() == Some(word)
    }

    /// Short human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number((value, unit)) => {
                format!("number `{}{}`", value, unit.as_deref().unwrap_or(""))
            }
            TokenKind::DoubleQuoted(s) | TokenKind::SingleQuoted(s) => format!("string \"{s}\""),
            TokenKind::Url(u) => format!("`{u}`"),
            TokenKind::Hash(h) => format!("`#{h}`"),
            TokenKind::Flag(f) => format!("`!{f}`"),
            TokenKind::Variable(v) => format!("variable `${v}`"),
            TokenKind::Ident(i) => format!("`{i}`"),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::HashLBrace => "#{",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::StarStar => "**",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Ampersand => "&",
            TokenKind::Ellipsis => "...",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Eq => "=",
            _ => "?",
        }
    }
}
