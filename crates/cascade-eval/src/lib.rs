//! Evaluator for Cascade stylesheets.
//!
//! This crate walks a parsed stylesheet and produces flattened CSS together
//! with the members the file exports. Other modules are reached through a
//! [`ModuleHost`], so the crate knows nothing about files or resolution.

mod args;
mod builtins;
mod classes;
mod css;
mod error;
mod evaluator;
mod expr;
mod host;
mod member;
mod scope;
mod selector;
mod suggest;

pub use args::{Args, CallArgs};
pub use classes::ClassTable;
pub use css::{CssNode, flatten, render};
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluated, Evaluator, Warning, WarningKind};
pub use host::{ClassNamer, FileContext, IdentifierScope, ModuleHost, NoModules};
pub use member::{
    Callable, ClassMember, Member, MemberKind, MemberTag, ModuleExports, NativeCallable, NativeDefault, NativeFn,
    NativeParam, UserCallable, nullable, optional, required,
};
pub use scope::Scope;
pub use selector::RuleContext;
pub use suggest::{edit_distance, nearest};

use cascade_syntax::{Expr, Stylesheet};
use cascade_value::Value;

/// Evaluate a parsed stylesheet.
pub fn evaluate(sheet: &Stylesheet, file: FileContext, host: &dyn ModuleHost) -> EvalResult<Evaluated> {
    Evaluator::new(file, host).run(sheet)
}

/// Parse and evaluate `source`.
pub fn compile(source: &str, file: FileContext, host: &dyn ModuleHost) -> EvalResult<Evaluated> {
    let sheet = cascade_parser::parse(source)?;
    evaluate(&sheet, file, host)
}

/// Evaluate a lone expression against `scope`, without any modules.
pub fn evaluate_expression(expr: &Expr, scope: &Scope) -> EvalResult<Value> {
    Evaluator::new(FileContext::global("<expression>"), &NoModules).eval(expr, scope)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use cascade_diagnostic::{ErrorCode, Severity};
    use pretty_assertions::assert_eq;

    use super::*;

    fn global(source: &str) -> EvalResult<Evaluated> {
        compile(source, FileContext::global("test.css"), &NoModules)
    }

    fn css(source: &str) -> String {
        global(source).unwrap().to_css()
    }

    fn local(source: &str) -> Evaluated {
        let namer: ClassNamer = Rc::new(|name: &str| format!("{name}_x"));
        compile(source, FileContext::new("test.css", IdentifierScope::Local, namer), &NoModules).unwrap()
    }

    #[test]
    fn test_control_flow_writes_reach_enclosing_scope() {
        let source = "
            $x: 1;
            @if true { $x: 2; }
            @each $i in 1, 2 { $x: $i + 10; }
            .a { value: $x; }
        ";
        assert_eq!(css(source), ".a {\n  value: 12;\n}\n");
        let err = global("@each $i in 1, 2 { } .a { value: $i; }").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UndefinedVariable);
    }

    #[test]
    fn test_rule_bodies_shadow() {
        let source = "
            $x: 1;
            .a { $x: 2; inner: $x; }
            .b { outer: $x; }
        ";
        assert_eq!(css(source), ".a {\n  inner: 2;\n}\n\n.b {\n  outer: 1;\n}\n");
    }

    #[test]
    fn test_parent_selector_in_interpolation() {
        let source = ".a { .b#{&} { other: &; } }";
        assert_eq!(css(source), ".a .b.a {\n  other: .a .b.a;\n}\n");
    }

    #[test]
    fn test_nested_rules_are_hoisted() {
        let source = ".a { color: red; &:hover { color: blue; } .b { margin: 0; } }";
        assert_eq!(
            css(source),
            ".a {\n  color: red;\n}\n\n.a:hover {\n  color: blue;\n}\n\n.a .b {\n  margin: 0;\n}\n"
        );
    }

    #[test]
    fn test_functions() {
        let source = "
            @function double($n, $by: 2) { @return $n * $by; }
            @function scale($n, $factor: $n) { @return $n * $factor; }
            .a { width: double(4px); height: double($by: 3, $n: 1px); area: scale(3); }
        ";
        assert_eq!(css(source), ".a {\n  width: 8px;\n  height: 3px;\n  area: 9;\n}\n");
    }

    #[test]
    fn test_function_without_return() {
        let err = global("@function f() { $x: 1; } .a { b: f(); }").unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingReturn);
    }

    #[test]
    fn test_css_inside_function_is_rejected() {
        let err = global("@function f() { .x { a: b; } @return 1; } .a { b: f(); }").unwrap_err();
        assert_eq!(err.code(), ErrorCode::MisplacedDirective);
    }

    #[test]
    fn test_undefined_variable_suggests() {
        let err = global("$color: red; .a { b: $colr; }").unwrap_err();
        let EvalError::Undefined { name, suggestion, .. } = &err else {
            panic!("expected undefined, got {err:?}");
        };
        assert_eq!(name, "$colr");
        assert_eq!(suggestion.as_deref(), Some("$color"));
        let diagnostic = err.to_diagnostic();
        assert!(diagnostic.help.iter().any(|h| h.contains("$color")));
    }

    #[test]
    fn test_user_error_and_warnings() {
        let err = global("@error \"boom\";").unwrap_err();
        assert!(matches!(&err, EvalError::User { message, .. } if message == "boom"));

        let result = global("@warn \"careful\"; @debug 1 + 1;").unwrap();
        let warnings: Vec<_> = result.warnings.iter().map(|w| (w.kind, w.message.as_str())).collect();
        assert_eq!(warnings, vec![(WarningKind::Warn, "careful"), (WarningKind::Debug, "2")]);

        let severities: Vec<_> = result.warnings.iter().map(|w| w.to_diagnostic().severity).collect();
        assert_eq!(severities, vec![Severity::Warning, Severity::Note]);
        let text = cascade_diagnostic::render("@warn \"careful\";", "test.css", &result.warnings[0].to_diagnostic());
        assert!(text.contains("Warning"));
        assert!(text.contains("careful"));
    }

    #[test]
    fn test_math_functions() {
        assert_eq!(css(".a { b: calc((1px * (10 + 10)) / 2); }"), ".a {\n  b: 10px;\n}\n");
        assert_eq!(
            css(".a { b: calc(-(calc(1px + 10px)) + 100vh); }"),
            ".a {\n  b: calc(-11px + 100vh);\n}\n"
        );
        assert_eq!(
            css(".a { b: min(var(--a), 20px + 2em, max(20px+30px,10px)); }"),
            ".a {\n  b: min(var(--a), 20px + 2em, 50px);\n}\n"
        );
        assert_eq!(css(".a { b: clamp(1px, 5px, 3px); }"), ".a {\n  b: 3px;\n}\n");
    }

    #[test]
    fn test_if_function_is_lazy() {
        let source = ".a { b: if(true, 1px, $missing); c: if($condition: false, $if-true: x, $if-false: y); }";
        assert_eq!(css(source), ".a {\n  b: 1px;\n  c: y;\n}\n");
    }

    #[test]
    fn test_unknown_functions_pass_through() {
        assert_eq!(
            css(".a { b: translate(1px + 1px, 2px); }"),
            ".a {\n  b: translate(2px, 2px);\n}\n"
        );
    }

    #[test]
    fn test_mixin_content_block() {
        let source = "
            @mixin m($x: 1px) { .inner { width: $x; @content; } }
            .a { @include m(2px) { color: blue; } }
        ";
        assert_eq!(css(source), ".a .inner {\n  width: 2px;\n  color: blue;\n}\n");
    }

    #[test]
    fn test_content_outside_mixin() {
        let err = global(".a { @content; }").unwrap_err();
        assert_eq!(err.code(), ErrorCode::MisplacedDirective);
    }

    #[test]
    fn test_composition_order() {
        let result = global(
            "
            .a { color: red; }
            .b { color: blue; }
            .d { @compose b; }
            .e { @compose d, a; }
            ",
        )
        .unwrap();
        let e = result.exports.get(MemberTag::Class, "e").and_then(Member::as_class).unwrap();
        assert_eq!(e.composed, vec!["d", "b", "a"]);
        assert_eq!(e.to_value().to_css(), "e d b a");
    }

    #[test]
    fn test_compose_unknown_local_class() {
        let err = global(".a { @compose missing; }").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UndefinedClass);
    }

    #[test]
    fn test_local_file_renames_classes_and_keyframes() {
        let result = local(
            "
            @keyframes spin { from { opacity: 0; } }
            .a :global(.b) { animation: spin 1s; }
            ",
        );
        assert_eq!(
            result.to_css(),
            "@keyframes spin_x {\n  from {\n    opacity: 0;\n  }\n}\n\n.a_x .b {\n  animation: spin_x 1s;\n}\n"
        );
        let a = result.exports.get(MemberTag::Class, "a").and_then(Member::as_class).unwrap();
        assert_eq!(a.primary, "a_x");
        assert!(result.exports.get(MemberTag::Class, "b").is_none());
    }

    #[test]
    fn test_passthrough_at_rule_inside_rule() {
        let source = ".a { @media print { color: red; } }";
        assert_eq!(css(source), "@media print {\n  .a {\n    color: red;\n  }\n}\n");
    }

    #[test]
    fn test_use_outside_root() {
        let err = global(".a { @use \"x\"; }").unwrap_err();
        assert_eq!(err.code(), ErrorCode::MisplacedDirective);
        let err = global("@use \"./missing\";").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnresolvedRequest);
    }

    #[test]
    fn test_evaluate_expression() {
        let scope = Scope::root();
        scope.set_local(Member::variable("w", Value::number(2.0, Some("px"))));
        let expr = cascade_parser::parse_expression("$w * 3 + 1px").unwrap();
        assert_eq!(evaluate_expression(&expr, &scope).unwrap().to_css(), "7px");
    }
}
