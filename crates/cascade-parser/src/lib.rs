//! Parser for Cascade stylesheets.
//!
//! Statements are scanned on characters, value expressions are parsed from
//! logos tokens, and selectors have their own character-level parser. The
//! parser stops at the first syntax error.

mod error;
mod expr;
mod selector;
mod source;
mod stmt;

pub use error::{ParseError, ParseResult};

use cascade_syntax::{Expr, SelectorList, Stylesheet};

/// Parse a complete stylesheet.
pub fn parse(source: &str) -> ParseResult<Stylesheet> {
    let cleaned = source::blank_comments(source)?;
    stmt::StmtParser::new(&cleaned).parse_stylesheet()
}

/// Parse a standalone expression. `/` divides.
pub fn parse_expression(source: &str) -> ParseResult<Expr> {
    expr::ExprParser::new(source, 0)?.parse_full_expression()
}

/// Parse a property value: a top-level `/` separates list items.
pub fn parse_value(source: &str) -> ParseResult<Expr> {
    expr::ExprParser::new(source, 0)?
        .slash_separated()
        .parse_full_expression()
}

/// Parse a selector list, e.g. the result of an interpolated selector.
pub fn parse_selector(source: &str) -> ParseResult<SelectorList> {
    selector::SelectorParser::new(source, 0).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_diagnostic::ErrorCode;
    use cascade_syntax::*;

    fn stmts(source: &str) -> Vec<Stmt> {
        match parse(source) {
            Ok(sheet) => sheet.stmts,
            Err(e) => panic!("parse failed: {e} at {:?}", e.span),
        }
    }

    fn expr(source: &str) -> ExprKind {
        parse_expression(source).unwrap().kind
    }

    // ========== Statements ==========

    #[test]
    fn test_rule_with_declarations() {
        let stmts = stmts(".a { color: red; margin: 0 auto }");
        assert_eq!(stmts.len(), 1);
        let StmtKind::Rule(rule) = &stmts[0].kind else {
            panic!("expected rule");
        };
        assert_eq!(rule.selector.as_plain().as_deref(), Some(".a"));
        assert!(rule.parsed.is_some());
        assert_eq!(rule.body.len(), 2);
        assert!(matches!(rule.body[1].kind, StmtKind::Declaration(_)));
    }

    #[test]
    fn test_nested_rule_vs_declaration() {
        let stmts = stmts("a { &:hover { color: blue; } b: c; }");
        let StmtKind::Rule(rule) = &stmts[0].kind else {
            panic!("expected rule");
        };
        assert!(matches!(rule.body[0].kind, StmtKind::Rule(_)));
        assert!(matches!(rule.body[1].kind, StmtKind::Declaration(_)));
    }

    #[test]
    fn test_variable_flags() {
        let stmts = stmts("$size: 10px !default; $x: 1 !global;");
        let StmtKind::Variable(size) = &stmts[0].kind else {
            panic!("expected variable");
        };
        assert_eq!(size.name, "size");
        assert!(size.default && !size.global);
        let StmtKind::Variable(x) = &stmts[1].kind else {
            panic!("expected variable");
        };
        assert!(x.global);
    }

    #[test]
    fn test_important_declaration() {
        let stmts = stmts("a { color: red !important; }");
        let StmtKind::Rule(rule) = &stmts[0].kind else {
            panic!("expected rule");
        };
        let StmtKind::Declaration(decl) = &rule.body[0].kind else {
            panic!("expected declaration");
        };
        assert!(decl.important);
    }

    #[test]
    fn test_custom_property_is_verbatim() {
        let stmts = stmts("a { --shadow: 0 0 #{$n}px rgba(0,0,0,.5); }");
        let StmtKind::Rule(rule) = &stmts[0].kind else {
            panic!("expected rule");
        };
        let StmtKind::Declaration(decl) = &rule.body[0].kind else {
            panic!("expected declaration");
        };
        let ExprKind::String { text, quote: None } = &decl.value.kind else {
            panic!("expected raw string");
        };
        assert_eq!(text.parts.len(), 3);
    }

    #[test]
    fn test_use_forms() {
        let stmts = stmts(r#"@use "./theme.css"; @use "math" as m; @use { $a, .btn, f, $b as $c } from "./x";"#);
        let StmtKind::Use(first) = &stmts[0].kind else {
            panic!("expected @use");
        };
        assert!(matches!(&first.kind, UseKind::Namespace(ns) if ns == "theme"));
        let StmtKind::Use(second) = &stmts[1].kind else {
            panic!("expected @use");
        };
        assert!(matches!(&second.kind, UseKind::Namespace(ns) if ns == "m"));
        let StmtKind::Use(third) = &stmts[2].kind else {
            panic!("expected @use");
        };
        let UseKind::Named(specs) = &third.kind else {
            panic!("expected named specifiers");
        };
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[1].kind, SpecifierKind::Class);
        assert_eq!(specs[2].kind, SpecifierKind::Callable);
        assert_eq!(specs[3].local_name(), "c");
    }

    #[test]
    fn test_export_forms() {
        let stmts = stmts(r#"@export $a, .b, c; @export * from "./x"; @export { $d } from "./y";"#);
        assert!(matches!(&stmts[0].kind, StmtKind::Export(ExportRule::Local(s)) if s.len() == 3));
        assert!(matches!(&stmts[1].kind, StmtKind::Export(ExportRule::All { request }) if request == "./x"));
        assert!(matches!(&stmts[2].kind, StmtKind::Export(ExportRule::Named { specifiers, .. }) if specifiers.len() == 1));
    }

    #[test]
    fn test_if_else_chain() {
        let stmts = stmts("@if $a == 1 { b: c; } @else if $a == 2 { d: e; } @else { f: g; }");
        assert_eq!(stmts.len(), 1);
        let StmtKind::If(rule) = &stmts[0].kind else {
            panic!("expected @if");
        };
        assert_eq!(rule.clauses.len(), 2);
        assert!(rule.otherwise.is_some());
    }

    #[test]
    fn test_each_destructuring() {
        let stmts = stmts("@each $key, $value in (a: 1, b: 2) { }");
        let StmtKind::Each(rule) = &stmts[0].kind else {
            panic!("expected @each");
        };
        assert_eq!(rule.variables, vec!["key", "value"]);
        assert!(matches!(rule.source.kind, ExprKind::Map(ref pairs) if pairs.len() == 2));
    }

    #[test]
    fn test_function_params() {
        let stmts = stmts("@function f($a, $b: 2px, $rest...) { @return $a; }");
        let StmtKind::Function(decl) = &stmts[0].kind else {
            panic!("expected @function");
        };
        assert_eq!(decl.name, "f");
        assert_eq!(decl.params.params.len(), 2);
        assert!(decl.params.params[1].default.is_some());
        assert_eq!(decl.params.rest.as_deref(), Some("rest"));
        assert!(matches!(decl.body[0].kind, StmtKind::Return(_)));
    }

    #[test]
    fn test_include_with_content() {
        let stmts = stmts("a { @include ns.m(1, $k: 2) { color: red; } @include plain; }");
        let StmtKind::Rule(rule) = &stmts[0].kind else {
            panic!("expected rule");
        };
        let StmtKind::Include(first) = &rule.body[0].kind else {
            panic!("expected @include");
        };
        assert_eq!(first.namespace.as_deref(), Some("ns"));
        assert_eq!(first.args.positional.len(), 1);
        assert_eq!(first.args.keywords.len(), 1);
        assert!(first.content.is_some());
        let StmtKind::Include(second) = &rule.body[1].kind else {
            panic!("expected @include");
        };
        assert!(second.content.is_none());
    }

    #[test]
    fn test_compose_sources() {
        let stmts = stmts(r#".c { @compose a, b; @compose x from global; @compose y from ns; @compose z from "./z"; }"#);
        let StmtKind::Rule(rule) = &stmts[0].kind else {
            panic!("expected rule");
        };
        let sources: Vec<_> = rule
            .body
            .iter()
            .map(|s| match &s.kind {
                StmtKind::Compose(c) => c.source.clone(),
                _ => panic!("expected @compose"),
            })
            .collect();
        assert_eq!(
            sources,
            vec![
                ComposeSource::Local,
                ComposeSource::Global,
                ComposeSource::Namespace("ns".into()),
                ComposeSource::Request("./z".into()),
            ]
        );
    }

    #[test]
    fn test_keyframes_selectors_unparsed() {
        let stmts = stmts("@keyframes spin { from { a: b; } 50% { a: c; } }");
        let StmtKind::Keyframes(rule) = &stmts[0].kind else {
            panic!("expected @keyframes");
        };
        assert_eq!(rule.name.as_plain().as_deref(), Some("spin"));
        let StmtKind::Rule(frame) = &rule.body[1].kind else {
            panic!("expected keyframe");
        };
        assert!(frame.parsed.is_none());
        assert_eq!(frame.selector.as_plain().as_deref(), Some("50%"));
    }

    #[test]
    fn test_passthrough_at_rules() {
        let stmts = stmts("@import url(x.css); @media (min-width: #{$w}) { a { b: c; } }");
        let StmtKind::AtRule(import) = &stmts[0].kind else {
            panic!("expected at-rule");
        };
        assert_eq!(import.name, "import");
        assert!(import.body.is_none());
        let StmtKind::AtRule(media) = &stmts[1].kind else {
            panic!("expected at-rule");
        };
        assert!(!media.prelude.is_plain());
        assert_eq!(media.body.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_comments_are_discarded() {
        let stmts = stmts("/* head */ a { // line\n b: c; /* x */ }");
        let StmtKind::Rule(rule) = &stmts[0].kind else {
            panic!("expected rule");
        };
        assert_eq!(rule.body.len(), 1);
    }

    #[test]
    fn test_requests_are_collected() {
        let sheet = parse(r#"@use "./a"; .x { @compose y from "./b"; } @export * from "./c";"#).unwrap();
        let requests: Vec<_> = sheet.requests().into_iter().map(|(r, _)| r).collect();
        assert_eq!(requests, vec!["./a", "./b", "./c"]);
    }

    // ========== Expressions ==========

    #[test]
    fn test_minus_disambiguation() {
        assert!(matches!(expr("1px - 2px"), ExprKind::Binary { op: BinaryOp::Sub, .. }));
        assert!(matches!(expr("1px-2px"), ExprKind::Binary { op: BinaryOp::Sub, .. }));
        assert!(matches!(
            expr("1px -2px"),
            ExprKind::List { separator: ListSeparator::Space, ref items, .. } if items.len() == 2
        ));
    }

    #[test]
    fn test_precedence() {
        let ExprKind::Binary { op, rhs, .. } = expr("1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(rhs.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
        assert!(matches!(expr("$a == 1 and not $b"), ExprKind::Binary { op: BinaryOp::And, .. }));
    }

    #[test]
    fn test_slash_in_values_separates() {
        let stmts = stmts("a { font: 12px/1.5 serif; }");
        let StmtKind::Rule(rule) = &stmts[0].kind else {
            panic!("expected rule");
        };
        let StmtKind::Declaration(decl) = &rule.body[0].kind else {
            panic!("expected declaration");
        };
        let ExprKind::List { items, separator, .. } = &decl.value.kind else {
            panic!("expected list");
        };
        assert_eq!(*separator, ListSeparator::Space);
        assert!(matches!(items[0].kind, ExprKind::List { separator: ListSeparator::Slash, .. }));
        assert!(matches!(expr("12px/2"), ExprKind::Binary { op: BinaryOp::Div, .. }));
    }

    #[test]
    fn test_calls_and_namespaces() {
        let ExprKind::Call(call) = expr("math.max(1px, $k: 2, $rest...)") else {
            panic!("expected call");
        };
        assert_eq!(call.namespace.as_deref(), Some("math"));
        assert_eq!(call.args.positional.len(), 1);
        assert_eq!(call.args.keywords.len(), 1);
        assert!(call.args.rest.is_some());
        assert!(matches!(expr("ns.$v"), ExprKind::Variable(VariableRef { namespace: Some(_), .. })));
        assert!(matches!(expr("ns.btn"), ExprKind::ClassRef { namespace: Some(_), .. }));
        assert!(matches!(expr(".btn"), ExprKind::ClassRef { namespace: None, .. }));
    }

    #[test]
    fn test_color_function_slash_alpha() {
        let ExprKind::Call(call) = expr("hwb(120 10% 20% / 0.5)") else {
            panic!("expected call");
        };
        let ExprKind::List { items, separator, .. } = &call.args.positional[0].kind else {
            panic!("expected channel list");
        };
        assert_eq!(*separator, ListSeparator::Space);
        assert!(matches!(items[2].kind, ExprKind::List { separator: ListSeparator::Slash, .. }));
        let ExprKind::Call(call) = expr("rgb($r, ($g / 2), $b)") else {
            panic!("expected call");
        };
        assert!(matches!(&call.args.positional[1].kind, ExprKind::Paren(inner) if matches!(inner.kind, ExprKind::Binary { op: BinaryOp::Div, .. })));
    }

    #[test]
    fn test_collections() {
        assert!(matches!(expr("(a: 1, b: 2)"), ExprKind::Map(ref p) if p.len() == 2));
        assert!(matches!(expr("[a b]"), ExprKind::List { bracketed: true, .. }));
        assert!(matches!(expr("()"), ExprKind::List { ref items, .. } if items.is_empty()));
        assert!(matches!(expr("1 through 3"), ExprKind::Range { inclusive: true, .. }));
        assert!(matches!(expr("a, b, c"), ExprKind::List { separator: ListSeparator::Comma, .. }));
    }

    #[test]
    fn test_literals() {
        assert!(matches!(expr("null"), ExprKind::Null));
        assert!(matches!(expr("true"), ExprKind::Bool(true)));
        assert!(matches!(expr("#ff0000"), ExprKind::Color(ref h) if h == "ff0000"));
        assert!(matches!(expr("-2px"), ExprKind::Number { value, .. } if value == -2.0));
        assert!(matches!(expr("'x'"), ExprKind::String { quote: Some(Quote::Single), .. }));
    }

    #[test]
    fn test_interpolated_identifier() {
        let ExprKind::String { text, quote: None } = expr("col-#{$i}-wide") else {
            panic!("expected identifier");
        };
        assert_eq!(text.parts.len(), 3);
        assert!(!text.is_plain());
    }

    // ========== Selectors ==========

    #[test]
    fn test_selector_structure() {
        let list = parse_selector("ul > li.item:hover, a + b ~ c").unwrap();
        assert_eq!(list.selectors.len(), 2);
        assert_eq!(list.to_string(), "ul > li.item:hover, a + b ~ c");
    }

    #[test]
    fn test_parent_affixes() {
        let list = parse_selector("&-suffix, pre-&, & .x").unwrap();
        let simple = |i: usize| list.selectors[i].parts[0].compound.simples[0].clone();
        assert_eq!(
            simple(0),
            SimpleSelector::Parent {
                prefix: String::new(),
                suffix: "-suffix".into()
            }
        );
        assert_eq!(
            simple(1),
            SimpleSelector::Parent {
                prefix: "pre-".into(),
                suffix: String::new()
            }
        );
        assert!(list.selectors[2].parts[0].compound.is_bare_parent());
    }

    #[test]
    fn test_global_and_local_unwrap() {
        let list = parse_selector(".a :global(.b .c) .d").unwrap();
        let mut scopes = Vec::new();
        list.for_each_class(&mut |name, scope| scopes.push((name.to_string(), scope)));
        assert_eq!(
            scopes,
            vec![
                ("a".to_string(), ClassScope::Inherit),
                ("b".to_string(), ClassScope::Global),
                ("c".to_string(), ClassScope::Global),
                ("d".to_string(), ClassScope::Inherit),
            ]
        );
        assert_eq!(list.to_string(), ".a .b .c .d");

        let switched = parse_selector(":global .x .y").unwrap();
        let mut all_global = true;
        switched.for_each_class(&mut |_, scope| all_global &= scope == ClassScope::Global);
        assert!(all_global);
    }

    #[test]
    fn test_selector_pseudo_arguments() {
        let list = parse_selector("a:not(.b, .c):nth-child(2n + 1)::before").unwrap();
        let simples = &list.selectors[0].parts[0].compound.simples;
        assert!(matches!(
            &simples[1],
            SimpleSelector::PseudoClass { argument: Some(PseudoArgument::Selector(inner)), .. } if inner.selectors.len() == 2
        ));
        assert!(matches!(
            &simples[2],
            SimpleSelector::PseudoClass { argument: Some(PseudoArgument::Raw(raw)), .. } if raw == "2n + 1"
        ));
        assert!(matches!(&simples[3], SimpleSelector::PseudoElement { .. }));
    }

    #[test]
    fn test_leading_combinator() {
        let list = parse_selector("> .child").unwrap();
        assert_eq!(list.selectors[0].parts[0].combinator, Some(Combinator::Child));
        assert_eq!(list.to_string(), "> .child");
    }

    // ========== Errors ==========

    #[test]
    fn test_unclosed_block() {
        let err = parse("a { b: c;").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnclosedDelimiter);
    }

    #[test]
    fn test_missing_expression() {
        let err = parse("$x: ;").unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedExpression);
    }

    #[test]
    fn test_invalid_selector() {
        let err = parse_selector(".a > > .b").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSelector);
    }

    #[test]
    fn test_error_excerpt_and_span() {
        let source = "a {\n  b: c;\n  $: 1;\n}";
        let err = parse(source).unwrap_err();
        assert_eq!(err.excerpt(source), "  $: 1;");
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code, Some(err.code));
    }
}
