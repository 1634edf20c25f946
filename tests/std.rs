// Integration tests for the built-in modules
//
// Built-in modules are bound with `@use` like any other module but never
// touch the file graph.

use cascade_diagnostic::ErrorCode;
use cascade_eval::{EvalError, FileContext, compile};
use cascade_std::{MODULES, StdModules, is_builtin};
use pretty_assertions::assert_eq;

fn run(source: &str) -> Result<String, EvalError> {
    compile(source, FileContext::global("std.css"), &StdModules).map(|result| result.to_css())
}

#[test]
fn test_every_module_is_available() {
    for name in MODULES {
        assert!(is_builtin(name));
        assert!(cascade_std::module(name).is_some_and(|m| !m.is_empty()), "{name}");
    }
    assert!(!is_builtin("./math"));
    assert!(cascade_std::module("sass:math").is_none());
}

#[test]
fn test_namespaced_and_aliased_use() {
    let source = r#"
        @use "math";
        @use "list" as l;
        $widths: 10px 20px 30px;
        .a {
            widest: math.max($widths...);
            count: l.length($widths);
            third: l.nth($widths, -1);
        }
    "#;
    assert_eq!(
        run(source).unwrap(),
        ".a {\n  widest: 30px;\n  count: 3;\n  third: 30px;\n}\n"
    );
}

#[test]
fn test_named_import_from_builtin() {
    let source = r#"
        @use { floor, div } from "math";
        .a { w: floor(div(9px, 2)); }
    "#;
    assert_eq!(run(source).unwrap(), ".a {\n  w: 4px;\n}\n");
}

#[test]
fn test_maps_drive_generated_rules() {
    let source = r#"
        @use "map";
        @use "string";
        $breakpoints: (small: 480px, large: 1200px);
        @each $name in map.keys($breakpoints) {
            .show-#{$name} { min-width: map.get($breakpoints, $name); label: string.to-upper-case($name); }
        }
    "#;
    assert_eq!(
        run(source).unwrap(),
        ".show-small {\n  min-width: 480px;\n  label: SMALL;\n}\n\n.show-large {\n  min-width: 1200px;\n  label: LARGE;\n}\n"
    );
}

#[test]
fn test_color_helpers_in_declarations() {
    let source = r#"
        @use "color";
        $brand: #ff0000;
        .a { border: 1px solid color.change($brand, $alpha: 0.5); }
    "#;
    assert_eq!(
        run(source).unwrap(),
        ".a {\n  border: 1px solid rgba(255, 0, 0, 0.5);\n}\n"
    );
}

#[test]
fn test_meta_sees_the_calling_file() {
    let source = r#"
        @use "meta";
        @function twice($n) { @return $n * 2; }
        .a { f: meta.function-exists(twice); t: meta.type-of(twice(2px)); }
    "#;
    assert_eq!(run(source).unwrap(), ".a {\n  f: true;\n  t: number;\n}\n");
}

#[test]
fn test_unknown_member_of_builtin() {
    let err = run("@use \"math\";\n.a { b: math.flor(1.5); }").unwrap_err();
    assert_eq!(err.code(), ErrorCode::UndefinedFunction);
    let err = run("@use { flor } from \"math\";").unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingExport);
    assert!(err.to_string().contains("floor"));
}
