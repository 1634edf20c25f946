// Integration tests for stylesheet evaluation
//
// Drives the parser, the evaluator and the built-in modules together:
// scoping, nesting with `&`, mixins and composition across modules.

use std::collections::HashMap;
use std::rc::Rc;

use cascade_diagnostic::ErrorCode;
use cascade_eval::{
    ClassNamer, EvalError, Evaluated, FileContext, IdentifierScope, Member, MemberTag, ModuleExports, ModuleHost,
    NoModules, compile,
};
use pretty_assertions::assert_eq;

/// Modules keyed by request, plus the built-in ones.
#[derive(Default)]
struct Modules(HashMap<String, Rc<ModuleExports>>);

impl ModuleHost for Modules {
    fn builtin(&self, name: &str) -> Option<Rc<ModuleExports>> {
        cascade_std::module(name)
    }

    fn module(&self, request: &str) -> Option<Rc<ModuleExports>> {
        self.0.get(request).cloned()
    }
}

fn suffixed(suffix: &'static str) -> ClassNamer {
    Rc::new(move |name: &str| format!("{name}_{suffix}"))
}

fn css(source: &str) -> String {
    compile(source, FileContext::global("test.css"), &NoModules)
        .unwrap()
        .to_css()
}

fn local(path: &str, source: &str, suffix: &'static str, host: &dyn ModuleHost) -> Result<Evaluated, EvalError> {
    compile(source, FileContext::new(path, IdentifierScope::Local, suffixed(suffix)), host)
}

#[test]
fn test_control_flow_accumulates_in_enclosing_scope() {
    let source = "
        $count: 0;
        @each $i in 1, 2, 3 { $count: $count + $i; }
        .total { value: $count; }
    ";
    assert_eq!(css(source), ".total {\n  value: 6;\n}\n");
}

#[test]
fn test_global_flag_escapes_rule_body() {
    let source = "
        $theme: light;
        .a { $theme: dark !global; }
        .b { t: $theme; }
    ";
    assert_eq!(css(source), ".b {\n  t: dark;\n}\n");
}

#[test]
fn test_each_over_map_generates_rules() {
    let source = "
        $sizes: (sm: 4px, lg: 8px);
        @each $name, $size in $sizes {
            .gap-#{$name} { margin: $size; }
        }
    ";
    assert_eq!(
        css(source),
        ".gap-sm {\n  margin: 4px;\n}\n\n.gap-lg {\n  margin: 8px;\n}\n"
    );
}

#[test]
fn test_each_destructuring_pads_missing_values_with_null() {
    let source = "
        @each $a, $b, $c in (1 2, 3 4) {
            .r-#{$a} {
                b: $b;
                @if $c == null { c: none; }
            }
        }
        @each $x, $y in 5, 6 {
            .s-#{$x} { @if $y == null { y: none; } }
        }
    ";
    assert_eq!(
        css(source),
        ".r-1 {\n  b: 2;\n  c: none;\n}\n\n.r-3 {\n  b: 4;\n  c: none;\n}\n\n\
         .s-5 {\n  y: none;\n}\n\n.s-6 {\n  y: none;\n}\n"
    );
}

#[test]
fn test_return_inside_each_ends_the_loop() {
    let source = "
        $visited: 0;
        @function first-above($limit, $items...) {
            @each $item in $items {
                $visited: $visited + 1 !global;
                @if $item > $limit { @return $item; }
            }
            @return null;
        }
        .a { x: first-above(2, 1, 5, 9); }
        .b { visited: $visited; }
    ";
    assert_eq!(css(source), ".a {\n  x: 5;\n}\n\n.b {\n  visited: 2;\n}\n");
}

#[test]
fn test_parent_selector_forms() {
    let source = "
        .card {
            padding: 1px;
            &__title { font-weight: bold; }
            &:hover, &.active { color: red; }
        }
    ";
    assert_eq!(
        css(source),
        ".card {\n  padding: 1px;\n}\n\n.card__title {\n  font-weight: bold;\n}\n\n.card:hover, .card.active {\n  color: red;\n}\n"
    );
}

#[test]
fn test_mixin_with_defaults_and_content() {
    let source = "
        @mixin button($bg, $fg: white) {
            background: $bg;
            color: $fg;
            &:hover { @content; }
        }
        .primary { @include button(blue) { opacity: 0.5; } }
    ";
    assert_eq!(
        css(source),
        ".primary {\n  background: blue;\n  color: white;\n}\n\n.primary:hover {\n  opacity: 0.5;\n}\n"
    );
}

#[test]
fn test_function_with_conditionals() {
    let source = "
        @function tone($n) {
            @if $n > 10 { @return large; }
            @else if $n > 5 { @return medium; }
            @else { @return small; }
        }
        .a { x: tone(12); y: tone(6); z: tone(1); }
    ";
    assert_eq!(css(source), ".a {\n  x: large;\n  y: medium;\n  z: small;\n}\n");
}

#[test]
fn test_modules_and_composition() {
    let theme = local(
        "theme.cas",
        "$accent: #336699; $gap: 4px; @export $accent, $gap; .base { color: $accent; }",
        "t",
        &NoModules,
    )
    .unwrap();
    assert_eq!(theme.to_css(), ".base_t {\n  color: #336699;\n}\n");

    let mut host = Modules::default();
    host.0.insert("./theme".into(), theme.exports.clone());
    let main = local(
        "main.cas",
        r#"
        @use "./theme";
        @use { $gap as $space } from "./theme";
        @use "math";
        .button {
            @compose base from "./theme";
            margin: math.div($space, 2);
            border-color: theme.$accent;
        }
        "#,
        "m",
        &host,
    )
    .unwrap();
    assert_eq!(
        main.to_css(),
        ".button_m {\n  margin: 2px;\n  border-color: #336699;\n}\n"
    );
    let button = main
        .exports
        .get(MemberTag::Class, "button")
        .and_then(Member::as_class)
        .unwrap();
    assert_eq!(button.to_value().to_css(), "button_m base_t");
}

#[test]
fn test_composition_is_transitive_and_deduplicated() {
    let result = local(
        "a.cas",
        "
        .a { x: 1; }
        .b { @compose a; }
        .c { @compose b, a; }
        ",
        "x",
        &NoModules,
    )
    .unwrap();
    let c = result.exports.get(MemberTag::Class, "c").and_then(Member::as_class).unwrap();
    assert_eq!(c.to_value().to_css(), "c_x b_x a_x");
}

#[test]
fn test_module_errors() {
    let host = Modules::default();
    let err = local("a.cas", "@use \"./missing\";", "x", &host).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnresolvedRequest);

    let err = local("a.cas", "@use \"math\";\n.a { b: mth.$pi; }", "x", &host).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownModule);
    assert!(err.to_string().contains("math"));
}
