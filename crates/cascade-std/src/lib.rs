//! Built-in modules for Cascade.
//! Cascade 内置模块。
//!
//! `@use "math";` and friends bind one of these modules without touching
//! the file graph. Each module is a table of native functions, plus a few
//! constants for `math`.
//! 每个模块都是一张原生函数表。

mod color;
mod list;
mod map;
mod math;
mod meta;
mod string;

use std::rc::Rc;

use cascade_eval::{Args, EvalError, ModuleExports, ModuleHost, NativeCallable, NativeParam};
use cascade_value::{Value, ValueError};
use tracing::trace;

/// Names of every built-in module.
pub const MODULES: &[&str] = &["math", "color", "string", "list", "map", "meta"];

pub fn is_builtin(name: &str) -> bool {
    MODULES.contains(&name)
}

/// Build the exports of the built-in module `name`.
/// 构建内置模块 `name` 的导出表。
pub fn module(name: &str) -> Option<Rc<ModuleExports>> {
    let exports = match name {
        "math" => math::module(),
        "color" => ModuleExports::native(color::builtins()),
        "string" => ModuleExports::native(string::builtins()),
        "list" => ModuleExports::native(list::builtins()),
        "map" => ModuleExports::native(map::builtins()),
        "meta" => ModuleExports::native(meta::builtins()),
        _ => return None,
    };
    trace!(module = name, members = exports.len(), "built-in module");
    Some(Rc::new(exports))
}

/// A host offering only the built-in modules.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdModules;

impl ModuleHost for StdModules {
    fn builtin(&self, name: &str) -> Option<Rc<ModuleExports>> {
        module(name)
    }

    fn module(&self, _request: &str) -> Option<Rc<ModuleExports>> {
        None
    }
}

// ========== Helpers shared by the modules ==========

pub(crate) const fn native(
    name: &'static str,
    params: &'static [NativeParam],
    func: fn(&mut Args) -> cascade_eval::EvalResult<Value>,
) -> NativeCallable {
    NativeCallable {
        name,
        params,
        rest: None,
        func,
    }
}

pub(crate) const fn variadic(
    name: &'static str,
    params: &'static [NativeParam],
    rest: &'static str,
    func: fn(&mut Args) -> cascade_eval::EvalResult<Value>,
) -> NativeCallable {
    NativeCallable {
        name,
        params,
        rest: Some(rest),
        func,
    }
}

/// A value-model error raised by the call `args` describes.
pub(crate) fn value_error(args: &Args, error: ValueError) -> EvalError {
    EvalError::from_value(error, args.span)
}

/// Resolve a 1-based, possibly negative index into `len` items.
pub(crate) fn index(args: &Args, name: &str, len: usize) -> cascade_eval::EvalResult<usize> {
    let n = args.int(name)?;
    let resolved = if n < 0 { len as i64 + n } else { n - 1 };
    if n == 0 || resolved < 0 || resolved >= len as i64 {
        return Err(args.fail(format!("index {n} is out of bounds for {len} item(s)")));
    }
    Ok(resolved as usize)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::css;

    #[test]
    fn test_module_names() {
        for name in MODULES {
            assert!(module(name).is_some_and(|m| !m.is_empty()), "{name}");
        }
        assert!(module("fs").is_none());
        assert!(is_builtin("meta"));
        assert!(!is_builtin("./meta"));
    }

    #[test]
    fn test_namespaced_calls() {
        assert_eq!(css("math.abs(-2px) + list.length(a b c)"), "5px");
    }
}
