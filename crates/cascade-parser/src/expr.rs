//! Token-level parser for expressions and at-rule preludes.

use cascade_common::Span;
use cascade_diagnostic::ErrorCode;
use cascade_lexer::{Lexer, Token, TokenKind};
use cascade_syntax::*;

use crate::error::{ParseError, ParseResult};
use crate::source::closing_brace;

/// Color functions whose space-separated form takes alpha after a `/`.
const SLASH_ALPHA_FUNCTIONS: &[&str] = &["rgb", "rgba", "hsl", "hsla", "hwb", "lab", "lch"];

/// Recursive descent parser over the tokens of one expression fragment.
pub(crate) struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
    /// A top-level `/` separates list items instead of dividing.
    slash_separates: bool,
    /// Paren/bracket/call nesting depth.
    depth: u32,
}

impl ExprParser {
    pub fn new(source: &str, base: usize) -> ParseResult<Self> {
        let (tokens, diagnostics) = Lexer::with_base(source, base as u32).tokenize();
        if let Some(diagnostic) = diagnostics.into_iter().next() {
            return Err(ParseError::from_diagnostic(diagnostic));
        }
        Ok(Self {
            tokens,
            pos: 0,
            slash_separates: false,
            depth: 0,
        })
    }

    /// Treat top-level `/` as a list separator, as in property values.
    pub fn slash_separated(mut self) -> Self {
        self.slash_separates = true;
        self
    }

    /// Parse the whole fragment as one expression.
    pub fn parse_full_expression(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_comma_list()?;
        self.expect_eof()?;
        Ok(expr)
    }

    /// Remove trailing `!flag` tokens and return them in source order.
    pub fn take_trailing_flags(&mut self) -> Vec<(String, Span)> {
        let mut flags = Vec::new();
        while self.tokens.len() >= 2 {
            let idx = self.tokens.len() - 2;
            match &self.tokens[idx].kind {
                TokenKind::Flag(name) => {
                    flags.push((name.clone(), self.tokens[idx].span));
                    self.tokens.remove(idx);
                }
                _ => break,
            }
        }
        flags.reverse();
        flags
    }

    // ========== Lists ==========

    fn parse_comma_list(&mut self) -> ParseResult<Expr> {
        let first = self.parse_space_list()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.at_list_end() {
                break;
            }
            items.push(self.parse_space_list()?);
        }
        Ok(self.list(items, ListSeparator::Comma, false, start))
    }

    fn parse_space_list(&mut self) -> ParseResult<Expr> {
        let first = self.parse_slash_list()?;
        if !self.starts_space_item() {
            return Ok(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while self.starts_space_item() {
            items.push(self.parse_slash_list()?);
        }
        Ok(self.list(items, ListSeparator::Space, false, start))
    }

    fn parse_slash_list(&mut self) -> ParseResult<Expr> {
        let first = self.parse_range()?;
        if !(self.slash_separates && self.depth == 0 && self.check(&TokenKind::Slash)) {
            return Ok(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while self.eat(&TokenKind::Slash) {
            items.push(self.parse_range()?);
        }
        Ok(self.list(items, ListSeparator::Slash, false, start))
    }

    fn list(&self, items: Vec<Expr>, separator: ListSeparator, bracketed: bool, start: Span) -> Expr {
        Expr::new(
            ExprKind::List {
                items,
                separator,
                bracketed,
            },
            start.merge(self.previous_span()),
        )
    }

    fn at_list_end(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Eof
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Semicolon
        )
    }

    fn starts_space_item(&self) -> bool {
        match self.kind() {
            TokenKind::Number(_)
            | TokenKind::DoubleQuoted(_)
            | TokenKind::SingleQuoted(_)
            | TokenKind::Url(_)
            | TokenKind::Hash(_)
            | TokenKind::Flag(_)
            | TokenKind::Variable(_)
            | TokenKind::Ampersand
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::HashLBrace => true,
            TokenKind::Ident(word) => !matches!(word.as_str(), "and" | "or" | "to" | "through"),
            TokenKind::Dot => self.next_touches() && matches!(self.peek_kind(1), TokenKind::Ident(_)),
            TokenKind::Minus | TokenKind::Plus => self.is_unary_sign(),
            _ => false,
        }
    }

    // ========== Operators ==========

    fn parse_range(&mut self) -> ParseResult<Expr> {
        let start = self.parse_binary(0)?;
        let inclusive = match self.kind() {
            TokenKind::Ident(word) if word == "to" => false,
            TokenKind::Ident(word) if word == "through" => true,
            _ => return Ok(start),
        };
        self.advance();
        let end = self.parse_binary(0)?;
        let span = start.span.merge(end.span);
        Ok(Expr::new(
            ExprKind::Range {
                start: Box::new(start),
                end: Box::new(end),
                inclusive,
            },
            span,
        ))
    }

    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            // `**` is right-associative.
            let next_min = if op == BinaryOp::Pow { prec } else { prec + 1 };
            let rhs = self.parse_binary(next_min)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        Some(match self.kind() {
            TokenKind::Plus if !self.is_unary_sign() => BinaryOp::Add,
            TokenKind::Minus if !self.is_unary_sign() => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::StarStar => BinaryOp::Pow,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::Slash if !(self.slash_separates && self.depth == 0) => BinaryOp::Div,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::Ge,
            TokenKind::Ident(word) if word == "and" => BinaryOp::And,
            TokenKind::Ident(word) if word == "or" => BinaryOp::Or,
            _ => return None,
        })
    }

    /// A sign glued to its operand but spaced from what precedes it starts
    /// a new list item (`1px -2px`); anything else is an operator.
    fn is_unary_sign(&self) -> bool {
        if self.pos == 0 {
            return true;
        }
        let before = self.tokens[self.pos - 1].touches(self.current());
        !before && self.next_touches()
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let start = self.current_span();
        let op = match self.kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Ident(word) if word == "not" && !self.next_is_touching_paren() => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let glued = self.next_touches();
        self.advance();
        if let (UnaryOp::Neg, true, TokenKind::Number((value, unit))) = (op, glued, self.kind().clone()) {
            self.advance();
            return Ok(Expr::new(
                ExprKind::Number { value: -value, unit },
                start.merge(self.previous_span()),
            ));
        }
        let operand = self.parse_unary()?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    // ========== Primaries ==========

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.current().clone();
        let span = token.span;
        let kind = match token.kind {
            TokenKind::Number((value, unit)) => {
                self.advance();
                ExprKind::Number { value, unit }
            }
            TokenKind::DoubleQuoted(text) => {
                self.advance();
                ExprKind::String {
                    text: parse_interpolation(&text, span.start.0 as usize + 1)?,
                    quote: Some(Quote::Double),
                }
            }
            TokenKind::SingleQuoted(text) => {
                self.advance();
                ExprKind::String {
                    text: parse_interpolation(&text, span.start.0 as usize + 1)?,
                    quote: Some(Quote::Single),
                }
            }
            TokenKind::Url(text) => {
                self.advance();
                return Ok(Expr::unquoted(text, span));
            }
            TokenKind::Hash(text) => {
                self.advance();
                if is_hex_color(&text) {
                    ExprKind::Color(text)
                } else {
                    return Ok(Expr::unquoted(format!("#{text}"), span));
                }
            }
            TokenKind::Flag(name) => {
                self.advance();
                return Ok(Expr::unquoted(format!("!{name}"), span));
            }
            TokenKind::Variable(name) => {
                self.advance();
                ExprKind::Variable(VariableRef { namespace: None, name })
            }
            TokenKind::Ampersand => {
                self.advance();
                ExprKind::Parent
            }
            TokenKind::Dot if self.next_touches() => {
                self.advance();
                let name = self.expect_ident("class name")?;
                ExprKind::ClassRef { namespace: None, name }
            }
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBracket => return self.parse_bracketed(),
            TokenKind::Ident(_) | TokenKind::HashLBrace => return self.parse_identifier(),
            other => {
                return Err(ParseError::new(
                    ErrorCode::ExpectedExpression,
                    span,
                    format!("expected expression, found {}", other.describe()),
                ));
            }
        };
        Ok(Expr::new(kind, span))
    }

    fn parse_identifier(&mut self) -> ParseResult<Expr> {
        let start = self.current_span();
        if let TokenKind::Ident(name) = self.kind().clone() {
            let glued_ident = !self.next_touches()
                || !matches!(self.peek_kind(1), TokenKind::HashLBrace | TokenKind::Minus);
            match name.as_str() {
                "null" if glued_ident => {
                    self.advance();
                    return Ok(Expr::new(ExprKind::Null, start));
                }
                "true" | "false" if glued_ident => {
                    self.advance();
                    return Ok(Expr::new(ExprKind::Bool(name == "true"), start));
                }
                _ => {}
            }
            if self.next_touches()
                && self.peek_kind(1) == &TokenKind::Dot
                && self.tokens[self.pos + 1].touches(&self.tokens[self.pos + 2])
            {
                match self.peek_kind(2).clone() {
                    TokenKind::Variable(member) => {
                        self.pos += 3;
                        return Ok(Expr::new(
                            ExprKind::Variable(VariableRef {
                                namespace: Some(name),
                                name: member,
                            }),
                            start.merge(self.previous_span()),
                        ));
                    }
                    TokenKind::Ident(member) => {
                        self.pos += 3;
                        if self.check(&TokenKind::LParen) && self.previous_touches() {
                            return self.parse_call(Some(name), member, start);
                        }
                        return Ok(Expr::new(
                            ExprKind::ClassRef {
                                namespace: Some(name),
                                name: member,
                            },
                            start.merge(self.previous_span()),
                        ));
                    }
                    _ => {}
                }
            }
            if self.next_is_touching_paren() {
                self.advance();
                return self.parse_call(None, name, start);
            }
        }

        let mut text = Interpolation {
            parts: Vec::new(),
            span: start,
        };
        let mut first = true;
        loop {
            let touching = first || self.previous_touches();
            match self.kind().clone() {
                TokenKind::Ident(word) if touching => {
                    text.push_literal(&word);
                    self.advance();
                }
                TokenKind::HashLBrace if touching => {
                    self.advance();
                    self.depth += 1;
                    let expr = self.parse_comma_list()?;
                    self.depth -= 1;
                    self.expect(&TokenKind::RBrace, "`}` to close interpolation")?;
                    text.parts.push(InterpPart::Expr(expr));
                }
                TokenKind::Minus if !first && touching && self.next_touches() => {
                    text.push_literal("-");
                    self.advance();
                }
                _ => break,
            }
            first = false;
        }
        text.span = start.merge(self.previous_span());
        let span = text.span;
        Ok(Expr::new(ExprKind::String { text, quote: None }, span))
    }

    fn parse_call(&mut self, namespace: Option<String>, name: String, start: Span) -> ParseResult<Expr> {
        let slash_args = namespace.is_none() && SLASH_ALPHA_FUNCTIONS.contains(&name.as_str());
        let args = self.parse_call_args(slash_args)?;
        Ok(Expr::new(
            ExprKind::Call(Box::new(CallExpr { namespace, name, args })),
            start.merge(self.previous_span()),
        ))
    }

    /// Parse `( … )` call arguments.
    pub fn parse_args(&mut self) -> ParseResult<ArgList> {
        self.parse_call_args(false)
    }

    /// With `slash_args`, a `/` at the top of each argument separates
    /// list items, as in `rgb(0 0 0 / 50%)`.
    fn parse_call_args(&mut self, slash_args: bool) -> ParseResult<ArgList> {
        let open = self.expect(&TokenKind::LParen, "`(`")?;
        let saved = (self.slash_separates, self.depth);
        if slash_args {
            self.slash_separates = true;
            self.depth = 0;
        } else {
            self.depth += 1;
        }
        let mut args = ArgList::default();
        while !self.check(&TokenKind::RParen) {
            if let (TokenKind::Variable(name), TokenKind::Colon) = (self.kind().clone(), self.peek_kind(1)) {
                let span = self.current_span();
                self.pos += 2;
                if args.keywords.iter().any(|(k, _)| *k == name) {
                    return Err(ParseError::new(
                        ErrorCode::DuplicateArgument,
                        span,
                        format!("argument `${name}` was passed twice"),
                    ));
                }
                let value = self.parse_space_list()?;
                args.keywords.push((name, value));
            } else {
                let value = self.parse_space_list()?;
                if self.eat(&TokenKind::Ellipsis) {
                    if args.rest.is_some() {
                        return Err(self.error_at(value.span, "only one spread argument is allowed"));
                    }
                    args.rest = Some(Box::new(value));
                } else if !args.keywords.is_empty() || args.rest.is_some() {
                    return Err(self.error_at(value.span, "positional arguments must come first"));
                } else {
                    args.positional.push(value);
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(&TokenKind::RParen, "`)` to close arguments")?;
        (self.slash_separates, self.depth) = saved;
        args.span = open.span.merge(close.span);
        Ok(args)
    }

    fn parse_paren(&mut self) -> ParseResult<Expr> {
        let open = self.expect(&TokenKind::LParen, "`(`")?;
        self.depth += 1;
        if let Some(close) = self.eat_token(&TokenKind::RParen) {
            self.depth -= 1;
            return Ok(Expr::new(
                ExprKind::List {
                    items: Vec::new(),
                    separator: ListSeparator::Space,
                    bracketed: false,
                },
                open.span.merge(close.span),
            ));
        }

        let first = self.parse_space_list()?;
        let kind = if self.eat(&TokenKind::Colon) {
            let value = self.parse_space_list()?;
            let mut pairs = vec![(first, value)];
            while self.eat(&TokenKind::Comma) {
                if self.check(&TokenKind::RParen) {
                    break;
                }
                let key = self.parse_space_list()?;
                self.expect(&TokenKind::Colon, "`:` after map key")?;
                let value = self.parse_space_list()?;
                pairs.push((key, value));
            }
            ExprKind::Map(pairs)
        } else if self.check(&TokenKind::Comma) {
            let start = first.span;
            let mut items = vec![first];
            while self.eat(&TokenKind::Comma) {
                if self.check(&TokenKind::RParen) {
                    break;
                }
                items.push(self.parse_space_list()?);
            }
            ExprKind::Paren(Box::new(self.list(items, ListSeparator::Comma, false, start)))
        } else {
            ExprKind::Paren(Box::new(first))
        };
        let close = self.expect(&TokenKind::RParen, "`)`")?;
        self.depth -= 1;
        Ok(Expr::new(kind, open.span.merge(close.span)))
    }

    fn parse_bracketed(&mut self) -> ParseResult<Expr> {
        let open = self.expect(&TokenKind::LBracket, "`[`")?;
        self.depth += 1;
        let (items, separator) = if self.check(&TokenKind::RBracket) {
            (Vec::new(), ListSeparator::Space)
        } else {
            let inner = self.parse_comma_list()?;
            match inner.kind {
                ExprKind::List {
                    items,
                    separator,
                    bracketed: false,
                } => (items, separator),
                _ => (vec![inner], ListSeparator::Space),
            }
        };
        let close = self.expect(&TokenKind::RBracket, "`]`")?;
        self.depth -= 1;
        Ok(Expr::new(
            ExprKind::List {
                items,
                separator,
                bracketed: true,
            },
            open.span.merge(close.span),
        ))
    }

    // ========== Preludes ==========

    /// `"req" [as ns]` or `{ specifiers } from "req"`.
    pub fn parse_use_prelude(&mut self) -> ParseResult<UseRule> {
        let rule = if self.check(&TokenKind::LBrace) {
            let specifiers = self.parse_braced_specifiers()?;
            self.expect_word("from")?;
            let request = self.expect_string()?;
            UseRule {
                request,
                kind: UseKind::Named(specifiers),
            }
        } else {
            let request = self.expect_string()?;
            let namespace = if self.eat_word("as") {
                self.expect_ident("namespace")?
            } else {
                default_namespace(&request)
            };
            UseRule {
                request,
                kind: UseKind::Namespace(namespace),
            }
        };
        self.expect_eof()?;
        Ok(rule)
    }

    pub fn parse_export_prelude(&mut self) -> ParseResult<ExportRule> {
        let rule = if self.eat(&TokenKind::Star) {
            self.expect_word("from")?;
            ExportRule::All {
                request: self.expect_string()?,
            }
        } else if self.check(&TokenKind::LBrace) {
            let specifiers = self.parse_braced_specifiers()?;
            self.expect_word("from")?;
            ExportRule::Named {
                request: self.expect_string()?,
                specifiers,
            }
        } else {
            let mut specifiers = vec![self.parse_specifier()?];
            while self.eat(&TokenKind::Comma) {
                specifiers.push(self.parse_specifier()?);
            }
            ExportRule::Local(specifiers)
        };
        self.expect_eof()?;
        Ok(rule)
    }

    fn parse_braced_specifiers(&mut self) -> ParseResult<Vec<Specifier>> {
        self.expect(&TokenKind::LBrace, "`{`")?;
        let mut specifiers = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            specifiers.push(self.parse_specifier()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "`}`")?;
        Ok(specifiers)
    }

    fn parse_specifier(&mut self) -> ParseResult<Specifier> {
        let start = self.current_span();
        let (kind, name) = match self.kind().clone() {
            TokenKind::Variable(name) => {
                self.advance();
                (SpecifierKind::Variable, name)
            }
            TokenKind::Dot => {
                self.advance();
                (SpecifierKind::Class, self.expect_ident("class name")?)
            }
            TokenKind::Ident(name) => {
                self.advance();
                (SpecifierKind::Callable, name)
            }
            other => {
                return Err(self.error_at(start, format!("expected a name to import or export, found {}", other.describe())));
            }
        };
        let alias = if self.eat_word("as") {
            Some(match (kind, self.kind().clone()) {
                (SpecifierKind::Variable, TokenKind::Variable(alias)) => {
                    self.advance();
                    alias
                }
                (SpecifierKind::Class, TokenKind::Dot) => {
                    self.advance();
                    self.expect_ident("class name")?
                }
                (SpecifierKind::Class | SpecifierKind::Callable, TokenKind::Ident(alias)) => {
                    self.advance();
                    alias
                }
                (_, other) => {
                    return Err(self.error_at(self.current_span(), format!("expected an alias, found {}", other.describe())));
                }
            })
        } else {
            None
        };
        Ok(Specifier {
            kind,
            name,
            alias,
            span: start.merge(self.previous_span()),
        })
    }

    /// `$a, $b in <expr>`
    pub fn parse_each_prelude(&mut self) -> ParseResult<(Vec<String>, Expr)> {
        let mut variables = vec![self.expect_variable()?];
        while self.eat(&TokenKind::Comma) {
            variables.push(self.expect_variable()?);
        }
        self.expect_word("in")?;
        let source = self.parse_full_expression()?;
        Ok((variables, source))
    }

    /// `name[(params)]`
    pub fn parse_callable_prelude(&mut self) -> ParseResult<(String, ParamList)> {
        let name = self.expect_ident("name")?;
        let mut params = ParamList::default();
        if self.eat(&TokenKind::LParen) {
            self.depth += 1;
            while !self.check(&TokenKind::RParen) {
                let span = self.current_span();
                let name = self.expect_variable()?;
                if params.rest.is_some() {
                    return Err(self.error_at(span, "the rest parameter must come last"));
                }
                if params.params.iter().any(|p| p.name == name) {
                    return Err(ParseError::new(
                        ErrorCode::DuplicateArgument,
                        span,
                        format!("duplicate parameter `${name}`"),
                    ));
                }
                if self.eat(&TokenKind::Ellipsis) {
                    params.rest = Some(name);
                } else {
                    let default = if self.eat(&TokenKind::Colon) {
                        Some(self.parse_space_list()?)
                    } else {
                        None
                    };
                    params.params.push(Param {
                        name,
                        default,
                        span: span.merge(self.previous_span()),
                    });
                }
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen, "`)` to close parameters")?;
            self.depth -= 1;
        }
        self.expect_eof()?;
        Ok((name, params))
    }

    /// `[ns.]name[(args)]`
    pub fn parse_include_prelude(&mut self) -> ParseResult<(Option<String>, String, ArgList)> {
        let first = self.expect_ident("mixin name")?;
        let (namespace, name) = if self.check(&TokenKind::Dot) && self.previous_touches() {
            self.advance();
            (Some(first), self.expect_ident("mixin name")?)
        } else {
            (None, first)
        };
        let args = if self.check(&TokenKind::LParen) {
            self.parse_args()?
        } else {
            ArgList {
                span: self.previous_span(),
                ..ArgList::default()
            }
        };
        self.expect_eof()?;
        Ok((namespace, name, args))
    }

    /// `a, .b [from global | from ns | from "req"]`
    pub fn parse_compose_prelude(&mut self) -> ParseResult<ComposeRule> {
        let mut names = Vec::new();
        loop {
            self.eat(&TokenKind::Dot);
            names.push(self.expect_ident("class name")?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let source = if self.eat_word("from") {
            match self.kind().clone() {
                TokenKind::Ident(word) if word == "global" => {
                    self.advance();
                    ComposeSource::Global
                }
                TokenKind::Ident(namespace) => {
                    self.advance();
                    ComposeSource::Namespace(namespace)
                }
                _ => ComposeSource::Request(self.expect_string()?),
            }
        } else {
            ComposeSource::Local
        };
        self.expect_eof()?;
        Ok(ComposeRule { names, source })
    }

    // ========== Token helpers ==========

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self, n: usize) -> &TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn next_touches(&self) -> bool {
        match self.tokens.get(self.pos + 1) {
            Some(next) if next.kind != TokenKind::Eof => self.current().touches(next),
            _ => false,
        }
    }

    fn previous_touches(&self) -> bool {
        self.pos > 0 && self.tokens[self.pos - 1].touches(self.current())
    }

    fn next_is_touching_paren(&self) -> bool {
        self.next_touches() && self.peek_kind(1) == &TokenKind::LParen
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.kind()) == std::mem::discriminant(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        self.eat_token(kind).is_some()
    }

    fn eat_token(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.check(kind) {
            let token = self.current().clone();
            self.advance();
            Some(token)
        } else {
            None
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.kind().is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> ParseResult<Token> {
        match self.eat_token(kind) {
            Some(token) => Ok(token),
            None => Err(self.unexpected(what)),
        }
    }

    fn expect_word(&mut self, word: &str) -> ParseResult<()> {
        if self.eat_word(word) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{word}`")))
        }
    }

    fn expect_ident(&mut self, what: &str) -> ParseResult<String> {
        match self.kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect_variable(&mut self) -> ParseResult<String> {
        match self.kind().clone() {
            TokenKind::Variable(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("a variable")),
        }
    }

    fn expect_string(&mut self) -> ParseResult<String> {
        match self.kind().clone() {
            TokenKind::DoubleQuoted(text) | TokenKind::SingleQuoted(text) => {
                self.advance();
                Ok(text)
            }
            _ => Err(self.unexpected("a quoted module request")),
        }
    }

    fn expect_eof(&self) -> ParseResult<()> {
        if self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.unexpected("end of expression"))
        }
    }

    fn unexpected(&self, what: &str) -> ParseError {
        let code = if self.check(&TokenKind::Eof) {
            ErrorCode::ExpectedExpression
        } else {
            ErrorCode::UnexpectedToken
        };
        ParseError::new(
            code,
            self.current_span(),
            format!("expected {what}, found {}", self.kind().describe()),
        )
    }

    fn error_at(&self, span: Span, message: impl Into<String>) -> ParseError {
        ParseError::new(ErrorCode::UnexpectedToken, span, message)
    }
}

fn is_hex_color(text: &str) -> bool {
    matches!(text.len(), 3 | 4 | 6 | 8) && text.chars().all(|c| c.is_ascii_hexdigit())
}

/// Namespace bound by `@use "req"` without `as`: the request's file stem.
pub(crate) fn default_namespace(request: &str) -> String {
    let file = request.rsplit(['/', '\\']).next().unwrap_or(request);
    let stem = match file.find('.') {
        Some(0) | None => file,
        Some(dot) => &file[..dot],
    };
    stem.trim_start_matches('_').to_string()
}

/// Parse text containing `#{…}` groups. `base` is the text's file offset.
pub(crate) fn parse_interpolation(text: &str, base: usize) -> ParseResult<Interpolation> {
    let mut interp = Interpolation {
        parts: Vec::new(),
        span: Span::from_usize(base, base + text.len()),
    };
    let bytes = text.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'#' if bytes.get(i + 1) == Some(&b'{') => {
                interp.push_literal(&text[literal_start..i]);
                let end = closing_brace(text, i + 2).ok_or_else(|| {
                    ParseError::new(
                        ErrorCode::UnclosedDelimiter,
                        Span::from_usize(base + i, base + i + 2),
                        "unclosed interpolation",
                    )
                })?;
                let expr = ExprParser::new(&text[i + 2..end], base + i + 2)?.parse_full_expression()?;
                interp.parts.push(InterpPart::Expr(expr));
                i = end + 1;
                literal_start = i;
            }
            _ => i += 1,
        }
    }
    if literal_start < text.len() {
        interp.push_literal(&text[literal_start..]);
    }
    Ok(interp)
}
