//! The `map` module.
//! 映射模块。

use cascade_eval::{Args, EvalResult, NativeCallable, NativeParam, required};
use cascade_value::{Map, Separator, Value};

use crate::{native, variadic};

const MAP: &[NativeParam] = &[required("map")];

/// Returns all map builtins.
/// 返回所有映射内置函数。
pub fn builtins() -> Vec<NativeCallable> {
    vec![
        // get : Map -> Key... -> Value | Null
        // Follows nested maps key by key / 逐层查找嵌套映射
        variadic("get", const { &[required("map"), required("key")] }, "keys", |args| {
            Ok(lookup(args)?.unwrap_or(Value::Null))
        }),
        variadic("has-key", const { &[required("map"), required("key")] }, "keys", |args| {
            Ok(Value::Bool(lookup(args)?.is_some()))
        }),
        native("keys", MAP, |args| {
            let map = args.map("map")?;
            Ok(Value::list(map.keys().cloned().collect(), Separator::Comma))
        }),
        native("values", MAP, |args| {
            let map = args.map("map")?;
            Ok(Value::list(map.values().cloned().collect(), Separator::Comma))
        }),
        native("merge", const { &[required("map1"), required("map2")] }, |args| {
            let mut merged = args.map("map1")?;
            for (key, value) in args.map("map2")?.pairs() {
                merged.insert(key.clone(), value.clone());
            }
            Ok(Value::Map(merged))
        }),
        native("deep-merge", const { &[required("map1"), required("map2")] }, |args| {
            Ok(Value::Map(deep_merge(args.map("map1")?, &args.map("map2")?)))
        }),
        variadic("remove", MAP, "keys", |args| {
            let mut map = args.map("map")?;
            for key in args.rest_items() {
                map.remove(key);
            }
            Ok(Value::Map(map))
        }),
        // set : Map -> Key... -> Value -> Map
        // The last argument is the value, the ones before it the key path.
        // 最后一个参数是值，之前的参数构成键路径。
        variadic("set", MAP, "args", |args| {
            let map = args.map("map")?;
            let Some((value, path)) = args.rest_items().split_last() else {
                return Err(args.fail("expected a key and a value"));
            };
            if path.is_empty() {
                return Err(args.fail("expected a key before the value"));
            }
            Ok(Value::Map(set_path(map, path, value.clone())))
        }),
    ]
}

/// The value at `$key` followed by `$keys...`, descending through maps.
fn lookup(args: &Args) -> EvalResult<Option<Value>> {
    let mut current = Value::Map(args.map("map")?);
    let path = std::iter::once(args.value("key")?).chain(args.rest_items());
    for key in path {
        let Value::Map(map) = &current else {
            return Ok(None);
        };
        match map.get(key) {
            Some(next) => current = next.clone(),
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

fn set_path(mut map: Map, path: &[Value], value: Value) -> Map {
    let [key, rest @ ..] = path else {
        return map;
    };
    if rest.is_empty() {
        map.insert(key.clone(), value);
        return map;
    }
    let inner = match map.get(key) {
        Some(Value::Map(inner)) => inner.clone(),
        _ => Map::new(),
    };
    map.insert(key.clone(), Value::Map(set_path(inner, rest, value)));
    map
}

fn deep_merge(mut base: Map, other: &Map) -> Map {
    for (key, value) in other.pairs() {
        let merged = match (base.get(key), value) {
            (Some(Value::Map(left)), Value::Map(right)) => Value::Map(deep_merge(left.clone(), right)),
            _ => value.clone(),
        };
        base.insert(key.clone(), merged);
    }
    base
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::testing::{css, eval};

    #[test]
    fn test_get_and_has_key() {
        assert_eq!(css("map.get((a: 1px, b: 2px), b)"), "2px");
        assert_eq!(css("map.get((a: (b: (c: deep))), a, b, c)"), "deep");
        assert_eq!(css("map.get((a: 1), z)"), "");
        assert_eq!(css("map.has-key((a: (b: 1)), a, b)"), "true");
        assert_eq!(css("map.has-key((a: 1), a, b)"), "false");
    }

    #[test]
    fn test_keys_and_values() {
        assert_eq!(css("map.keys((a: 1, b: 2))"), "a, b");
        assert_eq!(css("map.values((a: 1, b: 2))"), "1, 2");
        assert!(eval("map.keys(12px)").is_err());
    }

    #[test]
    fn test_merge_and_remove() {
        assert_eq!(css("map.merge((a: 1, b: 2), (b: 3, c: 4))"), "(a: 1, b: 3, c: 4)");
        assert_eq!(
            css("map.deep-merge((a: (x: 1, y: 2)), (a: (y: 3)))"),
            "(a: (x: 1, y: 3))"
        );
        assert_eq!(css("map.remove((a: 1, b: 2, c: 3), a, c)"), "(b: 2)");
    }

    #[test]
    fn test_set_path() {
        assert_eq!(css("map.set((a: 1), b, 2)"), "(a: 1, b: 2)");
        assert_eq!(css("map.set((a: (b: 1)), a, c, 2)"), "(a: (b: 1, c: 2))");
        assert!(eval("map.set((a: 1), 2)").is_err());
    }
}
