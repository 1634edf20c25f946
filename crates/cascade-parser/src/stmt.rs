//! Statement-level scanner.
//!
//! Statement structure is recognised directly on characters; value
//! expressions and preludes are handed to [`ExprParser`], selectors to
//! [`SelectorParser`].

use std::rc::Rc;

use cascade_common::Span;
use cascade_diagnostic::ErrorCode;
use cascade_syntax::*;

use crate::error::{ParseError, ParseResult};
use crate::expr::{ExprParser, parse_interpolation};
use crate::selector::SelectorParser;
use crate::source::{Terminator, find_colon, is_name_char, scan_directive, scan_statement, trimmed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockContext {
    Normal,
    /// Inside `@keyframes`: rule selectors are keyframe selectors.
    Keyframes,
}

pub(crate) struct StmtParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> StmtParser<'a> {
    /// `src` must already have its comments blanked.
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn parse_stylesheet(mut self) -> ParseResult<Stylesheet> {
        let stmts = self.parse_block(None, BlockContext::Normal)?;
        Ok(Stylesheet {
            stmts,
            span: Span::from_usize(0, self.src.len()),
        })
    }

    /// Parse statements up to the `}` closing the block opened at `open`,
    /// or to the end of input for the top level.
    fn parse_block(&mut self, open: Option<usize>, ctx: BlockContext) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            self.skip_ws_and_semicolons();
            match self.peek() {
                None => {
                    return match open {
                        Some(at) => Err(ParseError::new(
                            ErrorCode::UnclosedDelimiter,
                            Span::from_usize(at, at + 1),
                            "unclosed block",
                        )),
                        None => Ok(stmts),
                    };
                }
                Some('}') => {
                    if open.is_none() {
                        return Err(self.error_here(ErrorCode::UnexpectedToken, "unexpected `}`"));
                    }
                    self.pos += 1;
                    return Ok(stmts);
                }
                Some('@') => stmts.push(self.parse_at_rule()?),
                Some('$') => stmts.push(self.parse_variable()?),
                Some(_) => stmts.push(self.parse_rule_or_declaration(ctx)?),
            }
        }
    }

    fn parse_rule_or_declaration(&mut self, ctx: BlockContext) -> ParseResult<Stmt> {
        let start = self.pos;
        let (end, terminator) = scan_statement(self.src, start);
        if terminator == Terminator::Block {
            let (sel_start, sel_end) = trimmed(self.src, start, end);
            let text = &self.src[sel_start..sel_end];
            let selector = parse_interpolation(text, sel_start)?;
            let parsed = match ctx {
                BlockContext::Normal if selector.is_plain() => {
                    Some(SelectorParser::new(text, sel_start).parse()?)
                }
                _ => None,
            };
            self.pos = end + 1;
            let body = self.parse_block(Some(end), BlockContext::Normal)?;
            return Ok(self.stmt(
                StmtKind::Rule(StyleRule {
                    selector,
                    parsed,
                    body,
                }),
                start,
            ));
        }

        let text = &self.src[start..end];
        let Some(colon) = find_colon(text) else {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                Span::from_usize(start, end.max(start + 1)),
                "expected a declaration or a rule",
            ));
        };
        self.finish_statement(end, terminator);

        let (prop_start, prop_end) = trimmed(self.src, start, start + colon);
        if prop_start == prop_end {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                Span::from_usize(start, start + colon + 1),
                "expected a property name",
            ));
        }
        let property = parse_interpolation(&self.src[prop_start..prop_end], prop_start)?;
        let value_start = start + colon + 1;
        let (value, important) = if self.src[prop_start..prop_end].starts_with("--") {
            let (v_start, v_end) = trimmed(self.src, value_start, end);
            let text = parse_interpolation(&self.src[v_start..v_end], v_start)?;
            let span = text.span;
            (Expr::new(ExprKind::String { text, quote: None }, span), false)
        } else {
            let mut parser = ExprParser::new(&self.src[value_start..end], value_start)?.slash_separated();
            let mut important = false;
            for (flag, span) in parser.take_trailing_flags() {
                if flag != "important" {
                    return Err(ParseError::new(
                        ErrorCode::UnexpectedToken,
                        span,
                        format!("`!{flag}` is not allowed on a declaration"),
                    ));
                }
                important = true;
            }
            (parser.parse_full_expression()?, important)
        };
        Ok(self.stmt(
            StmtKind::Declaration(Declaration {
                property,
                value,
                important,
            }),
            start,
        ))
    }

    fn parse_variable(&mut self) -> ParseResult<Stmt> {
        let start = self.pos;
        self.pos += 1;
        let name = self.name_chars();
        if name.is_empty() {
            return Err(self.error_here(ErrorCode::UnexpectedToken, "expected a variable name"));
        }
        self.skip_ws();
        if !self.eat(':') {
            return Err(self.error_here(ErrorCode::UnexpectedToken, "expected `:` after variable name"));
        }
        let (end, terminator) = self.statement_end()?;
        let value_start = self.pos;
        let mut parser = ExprParser::new(&self.src[value_start..end], value_start)?;
        let (mut default, mut global) = (false, false);
        for (flag, span) in parser.take_trailing_flags() {
            match flag.as_str() {
                "default" => default = true,
                "global" => global = true,
                _ => {
                    return Err(ParseError::new(
                        ErrorCode::UnexpectedToken,
                        span,
                        format!("`!{flag}` is not allowed on a variable"),
                    ));
                }
            }
        }
        let value = parser.parse_full_expression()?;
        self.finish_statement(end, terminator);
        Ok(self.stmt(
            StmtKind::Variable(VariableDecl {
                name,
                value,
                default,
                global,
            }),
            start,
        ))
    }

    fn parse_at_rule(&mut self) -> ParseResult<Stmt> {
        let start = self.pos;
        self.pos += 1;
        let name = self.name_chars();
        if name.is_empty() {
            return Err(self.error_here(ErrorCode::UnexpectedToken, "expected an at-rule name"));
        }
        let kind = match name.as_str() {
            "use" => {
                let mut parser = self.directive_parser()?;
                StmtKind::Use(parser.parse_use_prelude()?)
            }
            "export" => {
                let mut parser = self.directive_parser()?;
                StmtKind::Export(parser.parse_export_prelude()?)
            }
            "if" => return self.parse_if(start),
            "else" => {
                return Err(ParseError::new(
                    ErrorCode::UnexpectedToken,
                    Span::from_usize(start, self.pos),
                    "`@else` must follow an `@if` block",
                ));
            }
            "each" => {
                let (h_start, h_end) = self.block_header()?;
                let (variables, source) =
                    ExprParser::new(&self.src[h_start..h_end], h_start)?.parse_each_prelude()?;
                let body = self.parse_block(Some(h_end), BlockContext::Normal)?;
                StmtKind::Each(EachRule {
                    variables,
                    source,
                    body,
                })
            }
            "function" | "mixin" => {
                let (h_start, h_end) = self.block_header()?;
                let (callable, params) =
                    ExprParser::new(&self.src[h_start..h_end], h_start)?.parse_callable_prelude()?;
                let body = self.parse_block(Some(h_end), BlockContext::Normal)?;
                let decl = CallableDecl {
                    name: callable,
                    params,
                    body: Rc::from(body),
                };
                if name == "function" {
                    StmtKind::Function(decl)
                } else {
                    StmtKind::Mixin(decl)
                }
            }
            "include" => {
                let h_start = self.pos;
                let (end, terminator) = scan_statement(self.src, h_start);
                let (namespace, callee, args) =
                    ExprParser::new(&self.src[h_start..end], h_start)?.parse_include_prelude()?;
                let content = if terminator == Terminator::Block {
                    self.pos = end + 1;
                    Some(self.parse_block(Some(end), BlockContext::Normal)?)
                } else {
                    self.finish_statement(end, terminator);
                    None
                };
                StmtKind::Include(IncludeRule {
                    namespace,
                    name: callee,
                    args,
                    content,
                })
            }
            "content" => {
                let (end, terminator) = self.statement_end()?;
                if !self.src[self.pos..end].trim().is_empty() {
                    return Err(ParseError::new(
                        ErrorCode::UnexpectedToken,
                        Span::from_usize(self.pos, end),
                        "`@content` takes no arguments",
                    ));
                }
                self.finish_statement(end, terminator);
                StmtKind::Content
            }
            "return" | "debug" | "warn" | "error" => {
                let mut parser = self.prelude_parser()?;
                let expr = parser.parse_full_expression()?;
                match name.as_str() {
                    "return" => StmtKind::Return(expr),
                    "debug" => StmtKind::Debug(expr),
                    "warn" => StmtKind::Warn(expr),
                    _ => StmtKind::Error(expr),
                }
            }
            "compose" => {
                let mut parser = self.prelude_parser()?;
                StmtKind::Compose(parser.parse_compose_prelude()?)
            }
            _ if name.ends_with("keyframes") => {
                let (h_start, h_end) = self.block_header()?;
                let (n_start, n_end) = trimmed(self.src, h_start, h_end);
                let keyframes_name = parse_interpolation(&self.src[n_start..n_end], n_start)?;
                let body = self.parse_block(Some(h_end), BlockContext::Keyframes)?;
                StmtKind::Keyframes(KeyframesRule {
                    at_name: name,
                    name: keyframes_name,
                    body,
                })
            }
            _ => {
                let p_start = self.pos;
                let (end, terminator) = scan_statement(self.src, p_start);
                let (t_start, t_end) = trimmed(self.src, p_start, end);
                let prelude = parse_interpolation(&self.src[t_start..t_end], t_start)?;
                let body = if terminator == Terminator::Block {
                    self.pos = end + 1;
                    Some(self.parse_block(Some(end), BlockContext::Normal)?)
                } else {
                    self.finish_statement(end, terminator);
                    None
                };
                StmtKind::AtRule(AtRule { name, prelude, body })
            }
        };
        Ok(self.stmt(kind, start))
    }

    fn parse_if(&mut self, start: usize) -> ParseResult<Stmt> {
        let mut clauses = vec![self.parse_if_clause()?];
        let mut otherwise = None;
        loop {
            let save = self.pos;
            self.skip_ws_and_semicolons();
            if !self.at_keyword("@else") {
                self.pos = save;
                break;
            }
            self.pos += "@else".len();
            self.skip_ws();
            if self.at_keyword("if") {
                self.pos += "if".len();
                clauses.push(self.parse_if_clause()?);
                continue;
            }
            if !self.eat('{') {
                return Err(self.error_here(ErrorCode::UnexpectedToken, "expected `{` after `@else`"));
            }
            otherwise = Some(self.parse_block(Some(self.pos - 1), BlockContext::Normal)?);
            break;
        }
        Ok(self.stmt(StmtKind::If(IfRule { clauses, otherwise }), start))
    }

    fn parse_if_clause(&mut self) -> ParseResult<IfClause> {
        let (h_start, h_end) = self.block_header()?;
        let condition = ExprParser::new(&self.src[h_start..h_end], h_start)?.parse_full_expression()?;
        let body = self.parse_block(Some(h_end), BlockContext::Normal)?;
        Ok(IfClause { condition, body })
    }

    // ========== Helpers ==========

    /// Parser over the prelude of a `;`-terminated at-rule.
    fn prelude_parser(&mut self) -> ParseResult<ExprParser> {
        let start = self.pos;
        let (end, terminator) = self.statement_end()?;
        let parser = ExprParser::new(&self.src[start..end], start)?;
        self.finish_statement(end, terminator);
        Ok(parser)
    }

    /// Parser over a module directive prelude, which may contain braces.
    fn directive_parser(&mut self) -> ParseResult<ExprParser> {
        let start = self.pos;
        let (end, terminator) = scan_directive(self.src, start);
        let parser = ExprParser::new(&self.src[start..end], start)?;
        self.finish_statement(end, terminator);
        Ok(parser)
    }

    /// Range of a header ending in `{`; the `{` is consumed.
    fn block_header(&mut self) -> ParseResult<(usize, usize)> {
        let start = self.pos;
        let (end, terminator) = scan_statement(self.src, start);
        if terminator != Terminator::Block {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                Span::from_usize(end.min(self.src.len().saturating_sub(1)), end + 1),
                "expected `{`",
            ));
        }
        self.pos = end + 1;
        Ok((start, end))
    }

    /// End of a statement that must not open a block.
    fn statement_end(&self) -> ParseResult<(usize, Terminator)> {
        let (end, terminator) = scan_statement(self.src, self.pos);
        if terminator == Terminator::Block {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                Span::from_usize(end, end + 1),
                "unexpected `{`",
            ));
        }
        Ok((end, terminator))
    }

    /// Move past a statement ending at `end`; a closing `}` is left for the
    /// enclosing block.
    fn finish_statement(&mut self, end: usize, terminator: Terminator) {
        self.pos = match terminator {
            Terminator::Semicolon => end + 1,
            _ => end,
        };
    }

    fn stmt(&self, kind: StmtKind, start: usize) -> Stmt {
        Stmt {
            kind,
            span: Span::from_usize(start, self.pos),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += ch.len_utf8();
        }
    }

    fn skip_ws_and_semicolons(&mut self) {
        while let Some(ch) = self.peek().filter(|c| c.is_whitespace() || *c == ';') {
            self.pos += ch.len_utf8();
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        let rest = &self.src[self.pos..];
        rest.starts_with(keyword) && !rest[keyword.len()..].chars().next().is_some_and(is_name_char)
    }

    fn name_chars(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek().filter(|c| is_name_char(*c)) {
            self.pos += ch.len_utf8();
        }
        self.src[start..self.pos].to_string()
    }

    fn error_here(&self, code: ErrorCode, message: &str) -> ParseError {
        ParseError::new(code, Span::from_usize(self.pos, self.pos + 1), message)
    }
}
