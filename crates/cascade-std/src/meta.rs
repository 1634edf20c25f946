//! The `meta` module: introspection of values and of the calling scope.
//! 元信息模块。

use cascade_eval::{Args, EvalResult, MemberTag, NativeCallable, NativeParam, required};
use cascade_value::Value;

use crate::native;

const VALUE: &[NativeParam] = &[required("value")];
const NAME: &[NativeParam] = &[required("name")];

/// Functions every file can call without a namespace.
const GLOBAL_FUNCTIONS: &[&str] = &[
    "rgb", "rgba", "hsl", "hsla", "hwb", "lab", "lch", "calc", "min", "max", "clamp", "if",
];

/// Returns all meta builtins.
/// 返回所有元信息内置函数。
pub fn builtins() -> Vec<NativeCallable> {
    vec![
        native("type-of", VALUE, |args| Ok(Value::unquoted(args.value("value")?.type_name()))),
        native("inspect", VALUE, |args| Ok(Value::unquoted(args.value("value")?.inspect()))),
        native("keywords", const { &[required("args")] }, |args| match args.value("args")? {
            Value::ArgList(_) => Ok(Value::Map(args.map("args")?)),
            other => Err(args.fail(format!("$args `{}` is not an argument list", other.inspect()))),
        }),
        native("calc-name", const { &[required("calc")] }, |args| match args.value("calc")? {
            Value::Math(math) => Ok(Value::quoted(math.name.as_str())),
            other => Err(args.fail(format!("$calc `{}` is not a calculation", other.inspect()))),
        }),
        // Existence checks look at the scope of the call site.
        // 存在性检查查看调用处的作用域。
        native("variable-exists", NAME, |args| exists(args, MemberTag::Variable, false)),
        native("global-variable-exists", NAME, |args| exists(args, MemberTag::Variable, true)),
        native("function-exists", NAME, |args| {
            let name = args.string("name")?.text;
            if GLOBAL_FUNCTIONS.contains(&name.as_str()) {
                return Ok(Value::Bool(true));
            }
            exists(args, MemberTag::Function, false)
        }),
        native("mixin-exists", NAME, |args| exists(args, MemberTag::Mixin, false)),
    ]
}

fn exists(args: &mut Args, tag: MemberTag, global: bool) -> EvalResult<Value> {
    let name = args.string("name")?.text;
    let scope = if global { args.scope.top() } else { args.scope.clone() };
    Ok(Value::Bool(scope.get(tag, &name).is_some()))
}
