//! Character-level selector parser.

use cascade_common::Span;
use cascade_diagnostic::ErrorCode;
use cascade_syntax::*;

use crate::error::{ParseError, ParseResult};
use crate::source::{is_name_char, skip_string};

pub(crate) struct SelectorParser<'a> {
    src: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> SelectorParser<'a> {
    pub fn new(src: &'a str, base: usize) -> Self {
        Self { src, pos: 0, base }
    }

    /// Parse the whole input as a selector list.
    pub fn parse(mut self) -> ParseResult<SelectorList> {
        let list = self.parse_list(ClassScope::Inherit)?;
        self.skip_ws();
        match self.peek() {
            None => Ok(list),
            Some(ch) => Err(self.error(format!("unexpected `{ch}` in selector"))),
        }
    }

    fn parse_list(&mut self, scope: ClassScope) -> ParseResult<SelectorList> {
        let start = self.pos;
        let mut selectors = Vec::new();
        loop {
            selectors.push(self.parse_complex(scope)?);
            self.skip_ws();
            if !self.eat(',') {
                break;
            }
        }
        Ok(SelectorList {
            selectors,
            span: Span::from_usize(self.base + start, self.base + self.pos),
        })
    }

    fn parse_complex(&mut self, mut scope: ClassScope) -> ParseResult<ComplexSelector> {
        let mut parts: Vec<ComplexPart> = Vec::new();
        let mut combinator = None;
        loop {
            let spaced = self.skip_ws();
            let next = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some(ch) => ch,
            };
            if let Some(explicit) = match next {
                '>' => Some(Combinator::Child),
                '+' => Some(Combinator::NextSibling),
                '~' => Some(Combinator::SubsequentSibling),
                _ => None,
            } {
                if combinator.is_some() {
                    return Err(self.error("consecutive combinators"));
                }
                self.bump();
                combinator = Some(explicit);
                continue;
            }
            if let Some(switch) = self.scope_switch() {
                scope = switch;
                continue;
            }
            if spaced && !parts.is_empty() && combinator.is_none() {
                combinator = Some(Combinator::Descendant);
            }
            parts.push(ComplexPart {
                combinator: combinator.take(),
                compound: CompoundSelector::default(),
            });
            self.parse_compound(&mut parts, scope)?;
            if parts.last().is_some_and(|p| p.compound.simples.is_empty()) {
                return Err(match self.peek() {
                    Some(ch) => self.error(format!("unexpected `{ch}` in selector")),
                    None => self.error("expected selector"),
                });
            }
        }
        if parts.is_empty() {
            return Err(self.error("expected selector"));
        }
        if combinator.is_some() {
            return Err(self.error("selector ends with a combinator"));
        }
        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self, parts: &mut Vec<ComplexPart>, scope: ClassScope) -> ParseResult<()> {
        loop {
            let simple = match self.peek() {
                Some('*') => {
                    self.bump();
                    SimpleSelector::Universal
                }
                Some('&') => {
                    self.bump();
                    SimpleSelector::Parent {
                        prefix: String::new(),
                        suffix: self.name_chars(),
                    }
                }
                Some('.') => {
                    self.bump();
                    SimpleSelector::Class {
                        name: self.name()?,
                        scope,
                    }
                }
                Some('#') => {
                    self.bump();
                    SimpleSelector::Id(self.name()?)
                }
                Some('[') => {
                    self.bump();
                    SimpleSelector::Attribute(self.raw_until(']')?.trim().to_string())
                }
                Some(':') => {
                    if self.at_scope_switch() {
                        return Ok(());
                    }
                    match self.parse_pseudo(parts, scope)? {
                        Some(simple) => simple,
                        None => continue,
                    }
                }
                Some(ch) if is_name_char(ch) || ch == '\\' => {
                    let name = self.name_chars();
                    if self.eat('&') {
                        SimpleSelector::Parent {
                            prefix: name,
                            suffix: self.name_chars(),
                        }
                    } else {
                        SimpleSelector::Type(name)
                    }
                }
                _ => return Ok(()),
            };
            if let Some(last) = parts.last_mut() {
                last.compound.simples.push(simple);
            }
        }
    }

    /// Parse a pseudo-class or pseudo-element. `:global(…)` and `:local(…)`
    /// are spliced into `parts` and yield `None`.
    fn parse_pseudo(&mut self, parts: &mut Vec<ComplexPart>, scope: ClassScope) -> ParseResult<Option<SimpleSelector>> {
        self.bump();
        if self.eat(':') {
            let name = self.name()?;
            let argument = if self.eat('(') {
                Some(self.raw_until(')')?.trim().to_string())
            } else {
                None
            };
            return Ok(Some(SimpleSelector::PseudoElement { name, argument }));
        }

        let name = self.name()?;
        if !self.eat('(') {
            return Ok(Some(SimpleSelector::PseudoClass { name, argument: None }));
        }
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "global" | "local" => {
                let forced = if lower == "global" {
                    ClassScope::Global
                } else {
                    ClassScope::Local
                };
                let inner = self.parse_complex(forced)?;
                self.skip_ws();
                self.expect(')')?;
                Self::splice(parts, inner);
                Ok(None)
            }
            _ if SELECTOR_PSEUDOS.contains(&lower.as_str()) => {
                let list = self.parse_list(scope)?;
                self.skip_ws();
                self.expect(')')?;
                Ok(Some(SimpleSelector::PseudoClass {
                    name,
                    argument: Some(PseudoArgument::Selector(list)),
                }))
            }
            _ => {
                let raw = self.raw_until(')')?;
                Ok(Some(SimpleSelector::PseudoClass {
                    name,
                    argument: Some(PseudoArgument::Raw(raw.trim().to_string())),
                }))
            }
        }
    }

    /// Merge the first compound of `inner` into the current one and append
    /// the rest.
    fn splice(parts: &mut Vec<ComplexPart>, inner: ComplexSelector) {
        let mut inner = inner.parts.into_iter();
        if let (Some(first), Some(last)) = (inner.next(), parts.last_mut()) {
            if last.compound.simples.is_empty() && last.combinator.is_none() {
                last.combinator = first.combinator;
            }
            last.compound.simples.extend(first.compound.simples);
        }
        parts.extend(inner);
    }

    /// `:global` / `:local` without parentheses switch the scope for the
    /// rest of the complex selector.
    fn scope_switch(&mut self) -> Option<ClassScope> {
        if !self.at_scope_switch() {
            return None;
        }
        let rest = &self.src[self.pos..];
        if rest.starts_with(":global") {
            self.pos += ":global".len();
            Some(ClassScope::Global)
        } else {
            self.pos += ":local".len();
            Some(ClassScope::Local)
        }
    }

    fn at_scope_switch(&self) -> bool {
        let rest = &self.src[self.pos..];
        [":global", ":local"].iter().any(|kw| {
            rest.starts_with(kw)
                && !rest[kw.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c == '(' || is_name_char(c))
        })
    }

    // ========== Character helpers ==========

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> ParseResult<()> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{ch}` in selector")))
        }
    }

    /// Skip whitespace, reporting whether any was skipped.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    /// Identifier characters, including backslash escapes.
    fn name_chars(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.bump();
                self.bump();
            } else if is_name_char(ch) {
                self.bump();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    fn name(&mut self) -> ParseResult<String> {
        let name = self.name_chars();
        if name.is_empty() {
            return Err(self.error("expected a name in selector"));
        }
        Ok(name)
    }

    /// Text up to the matching `close`, which is consumed.
    fn raw_until(&mut self, close: char) -> ParseResult<&'a str> {
        let open = match close {
            ')' => '(',
            _ => '[',
        };
        let src = self.src;
        let bytes = src.as_bytes();
        let start = self.pos;
        let mut depth = 1usize;
        let mut i = self.pos;
        while i < bytes.len() {
            match bytes[i] {
                b'"' | b'\'' => {
                    i = skip_string(bytes, i);
                    continue;
                }
                b if b == open as u8 => depth += 1,
                b if b == close as u8 => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos = i + 1;
                        return Ok(&src[start..i]);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        Err(ParseError::new(
            ErrorCode::UnclosedDelimiter,
            Span::from_usize(self.base + start, self.base + self.src.len()),
            format!("expected `{close}` in selector"),
        ))
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let at = self.base + self.pos;
        ParseError::new(ErrorCode::InvalidSelector, Span::from_usize(at, at + 1), message)
    }
}
