//! The `list` module.
//! 列表模块。

use cascade_eval::{Args, EvalResult, NativeCallable, NativeParam, optional, required};
use cascade_value::{List, Separator, Value};

use crate::{index, native, variadic};

const LIST: &[NativeParam] = &[required("list")];

/// Returns all list builtins.
/// 返回所有列表内置函数。
pub fn builtins() -> Vec<NativeCallable> {
    vec![
        native("length", LIST, |args| {
            Ok(Value::unitless(args.value("list")?.as_items().len() as f64))
        }),
        native("nth", const { &[required("list"), required("n")] }, |args| {
            let items = args.value("list")?.as_items();
            let i = index(args, "n", items.len())?;
            Ok(items[i].clone())
        }),
        native("set-nth", const { &[required("list"), required("n"), required("value")] }, |args| {
            let list = args.value("list")?;
            let (separator, bracketed) = shape(list);
            let mut items = list.as_items();
            let i = index(args, "n", items.len())?;
            items[i] = args.value("value")?.clone();
            Ok(Value::List(List {
                items,
                separator,
                bracketed,
            }))
        }),
        native("index", const { &[required("list"), required("value")] }, |args| {
            let needle = args.value("value")?;
            let found = args.value("list")?.as_items().iter().position(|item| item == needle);
            Ok(found.map_or(Value::Null, |i| Value::unitless((i + 1) as f64)))
        }),
        native("append", const { &[required("list"), required("val"), optional("separator")] }, |args| {
            let list = args.value("list")?;
            let (own, bracketed) = shape(list);
            let mut items = list.as_items();
            let separator = separator(args, own, items.len())?;
            items.push(args.value("val")?.clone());
            Ok(Value::List(List {
                items,
                separator,
                bracketed,
            }))
        }),
        native(
            "join",
            const { &[required("list1"), required("list2"), optional("separator"), optional("bracketed")] },
            |args| {
                let (first, second) = (args.value("list1")?, args.value("list2")?);
                let (first_separator, first_bracketed) = shape(first);
                let mut items = first.as_items();
                let mut rest = second.as_items();
                let own = if items.len() < 2 && rest.len() >= 2 {
                    second.separator()
                } else {
                    first_separator
                };
                let separator = separator(args, own, items.len().max(rest.len()))?;
                let bracketed = match args.get("bracketed") {
                    Some(value) if !is_auto(value) => value.is_truthy(),
                    _ => first_bracketed,
                };
                items.append(&mut rest);
                Ok(Value::List(List {
                    items,
                    separator,
                    bracketed,
                }))
            },
        ),
        variadic("zip", &[], "lists", |args| {
            let lists: Vec<Vec<Value>> = args.rest_items().iter().map(Value::as_items).collect();
            let shortest = lists.iter().map(Vec::len).min().unwrap_or(0);
            let rows = (0..shortest)
                .map(|i| Value::list(lists.iter().map(|l| l[i].clone()).collect(), Separator::Space))
                .collect();
            Ok(Value::list(rows, Separator::Comma))
        }),
        variadic("slash", &[], "elements", |args| {
            let items = args.rest_items().to_vec();
            if items.len() < 2 {
                return Err(args.fail("at least two elements are required"));
            }
            Ok(Value::list(items, Separator::Slash))
        }),
        native("separator", LIST, |args| {
            Ok(Value::unquoted(args.value("list")?.separator().name()))
        }),
        native("is-bracketed", LIST, |args| {
            Ok(Value::Bool(matches!(args.value("list")?, Value::List(List { bracketed: true, .. }))))
        }),
    ]
}

fn shape(value: &Value) -> (Separator, bool) {
    match value {
        Value::List(list) => (list.separator, list.bracketed),
        other => (other.separator(), false),
    }
}

fn is_auto(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.text == "auto")
}

/// `$separator`: `auto` keeps `own`, space for lists of fewer than two
/// items.
fn separator(args: &Args, own: Separator, len: usize) -> EvalResult<Separator> {
    match args.get("separator") {
        None => Ok(if len < 2 { Separator::Space } else { own }),
        Some(value) if is_auto(value) => Ok(if len < 2 { Separator::Space } else { own }),
        Some(value) => match value.unquoted_text().as_str() {
            "space" => Ok(Separator::Space),
            "comma" => Ok(Separator::Comma),
            "slash" => Ok(Separator::Slash),
            other => Err(args.fail(format!("$separator must be space, comma, slash or auto, not `{other}`"))),
        },
    }
}
