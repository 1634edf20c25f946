//! Argument binding.

use cascade_common::Span;
use cascade_diagnostic::ErrorCode;
use cascade_value::{ArgList, Color, Map, Number, Str, Value, ValueError};

use crate::{EvalError, EvalResult, NativeCallable, NativeDefault, Scope};

/// Evaluated call-site arguments, spread arguments already expanded.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keywords: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn positional(values: Vec<Value>) -> Self {
        Self {
            positional: values,
            keywords: Vec::new(),
        }
    }

    /// Expand a `$args...` spread: lists add positionals, maps add keywords.
    pub fn spread(&mut self, value: Value) -> EvalResult<()> {
        match value {
            Value::ArgList(args) => {
                self.positional.extend(args.positional);
                self.keywords.extend(args.keywords);
            }
            Value::Map(map) => {
                for (key, value) in map.pairs() {
                    let Value::String(name) = key else {
                        return Err(EvalError::type_error(format!(
                            "spread keyword `{}` must be a string",
                            key.inspect()
                        )));
                    };
                    self.keywords.push((name.text.clone(), value.clone()));
                }
            }
            other => self.positional.extend(other.as_items()),
        }
        Ok(())
    }
}

/// Arguments matched to parameters by position, then by name.
pub(crate) struct Assigned {
    pub slots: Vec<Option<Value>>,
    pub rest: ArgList,
}

pub(crate) fn assign(callee: &str, params: &[&str], has_rest: bool, args: CallArgs) -> EvalResult<Assigned> {
    let mut slots: Vec<Option<Value>> = vec![None; params.len()];
    let mut rest = ArgList::default();
    let given = args.positional.len();
    for (i, value) in args.positional.into_iter().enumerate() {
        if i < params.len() {
            slots[i] = Some(value);
        } else if has_rest {
            rest.positional.push(value);
        } else {
            return Err(EvalError::argument(
                ErrorCode::UnexpectedArgument,
                format!(
                    "`{callee}` takes {} argument{} but {given} were passed",
                    params.len(),
                    if params.len() == 1 { "" } else { "s" }
                ),
            ));
        }
    }
    for (name, value) in args.keywords {
        match params.iter().position(|p| *p == name) {
            Some(i) if slots[i].is_some() => {
                return Err(EvalError::argument(
                    ErrorCode::DuplicateArgument,
                    format!("argument `${name}` of `{callee}` was passed both by position and by name"),
                ));
            }
            Some(i) => slots[i] = Some(value),
            None if has_rest => rest.keywords.push((name, value)),
            None => {
                return Err(EvalError::argument(
                    ErrorCode::UnexpectedArgument,
                    format!("`{callee}` has no parameter named `${name}`"),
                ));
            }
        }
    }
    Ok(Assigned { slots, rest })
}

pub(crate) fn missing(callee: &str, param: &str) -> EvalError {
    EvalError::argument(
        ErrorCode::MissingArgument,
        format!("missing argument `${param}` for `{callee}`"),
    )
}

/// Arguments bound to a native callable's parameters.
/// 绑定到原生函数参数上的实参。
pub struct Args {
    pub callee: &'static str,
    values: Vec<(&'static str, Option<Value>)>,
    pub rest: ArgList,
    /// Scope of the call site.
    pub scope: Scope,
    pub span: Span,
}

impl Args {
    pub(crate) fn bind(native: &NativeCallable, args: CallArgs, scope: Scope, span: Span) -> EvalResult<Self> {
        let names: Vec<&str> = native.params.iter().map(|p| p.name).collect();
        let assigned = assign(native.name, &names, native.rest.is_some(), args)?;
        let mut values = Vec::with_capacity(native.params.len());
        for (param, slot) in native.params.iter().zip(assigned.slots) {
            let value = match (slot, param.default) {
                (Some(value), _) => Some(value),
                (None, NativeDefault::Null) => Some(Value::Null),
                (None, NativeDefault::Unbound) => None,
                (None, NativeDefault::Required) => return Err(missing(native.name, param.name)),
            };
            values.push((param.name, value));
        }
        Ok(Self {
            callee: native.name,
            values,
            rest: assigned.rest,
            scope,
            span,
        })
    }

    /// The bound value, or `None` when the parameter was left unbound.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    /// The value, treating `null` like an absent argument.
    pub fn get_non_null(&self, name: &str) -> Option<&Value> {
        self.get(name).filter(|v| !v.is_null())
    }

    pub fn value(&self, name: &str) -> EvalResult<&Value> {
        self.get(name).ok_or_else(|| missing(self.callee, name))
    }

    /// Wrap a value error with the parameter it concerns.
    pub fn error(&self, name: &str, error: ValueError) -> EvalError {
        EvalError::type_error(format!("${name}: {error}"))
    }

    pub fn fail(&self, message: impl std::fmt::Display) -> EvalError {
        EvalError::type_error(format!("{}(): {message}", self.callee))
    }

    pub fn number(&self, name: &str) -> EvalResult<Number> {
        let value = self.value(name)?;
        value.expect_number().cloned().map_err(|e| self.error(name, e))
    }

    pub fn int(&self, name: &str) -> EvalResult<i64> {
        let value = self.value(name)?;
        value.expect_int().map_err(|e| self.error(name, e))
    }

    pub fn color(&self, name: &str) -> EvalResult<Color> {
        let value = self.value(name)?;
        value.expect_color().cloned().map_err(|e| self.error(name, e))
    }

    pub fn string(&self, name: &str) -> EvalResult<Str> {
        let value = self.value(name)?;
        value.expect_string().cloned().map_err(|e| self.error(name, e))
    }

    pub fn map(&self, name: &str) -> EvalResult<Map> {
        let value = self.value(name)?;
        value.expect_map().map_err(|e| self.error(name, e))
    }

    pub fn bool(&self, name: &str) -> EvalResult<bool> {
        Ok(self.value(name)?.is_truthy())
    }

    /// Every positional argument collected by the rest parameter.
    pub fn rest_items(&self) -> &[Value] {
        &self.rest.positional
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_then_keyword() {
        let args = CallArgs {
            positional: vec![Value::unitless(1.0)],
            keywords: vec![("c".into(), Value::unitless(3.0))],
        };
        let assigned = assign("f", &["a", "b", "c"], false, args).unwrap();
        assert_eq!(assigned.slots[0], Some(Value::unitless(1.0)));
        assert_eq!(assigned.slots[1], None);
        assert_eq!(assigned.slots[2], Some(Value::unitless(3.0)));
    }

    #[test]
    fn test_extra_arguments_go_to_rest() {
        let args = CallArgs {
            positional: vec![Value::unitless(1.0), Value::unitless(2.0)],
            keywords: vec![("x".into(), Value::unitless(3.0))],
        };
        let assigned = assign("f", &["a"], true, args).unwrap();
        assert_eq!(assigned.rest.positional, vec![Value::unitless(2.0)]);
        assert_eq!(assigned.rest.keywords.len(), 1);
    }

    #[test]
    fn test_binding_errors() {
        let too_many = CallArgs::positional(vec![Value::Null, Value::Null]);
        let err = assign("f", &["a"], false, too_many).err().unwrap();
        assert_eq!(err.code(), ErrorCode::UnexpectedArgument);

        let duplicate = CallArgs {
            positional: vec![Value::Null],
            keywords: vec![("a".into(), Value::Null)],
        };
        let err = assign("f", &["a"], false, duplicate).err().unwrap();
        assert_eq!(err.code(), ErrorCode::DuplicateArgument);

        let unknown = CallArgs {
            positional: vec![],
            keywords: vec![("zz".into(), Value::Null)],
        };
        let err = assign("f", &["a"], false, unknown).err().unwrap();
        assert!(err.to_string().contains("$zz"));
    }

    #[test]
    fn test_spread() {
        let mut args = CallArgs::default();
        args.spread(Value::list(
            vec![Value::unitless(1.0), Value::unitless(2.0)],
            cascade_value::Separator::Comma,
        ))
        .unwrap();
        args.spread(Value::Map(Map::from_pairs(vec![(Value::unquoted("k"), Value::Null)])))
            .unwrap();
        assert_eq!(args.positional.len(), 2);
        assert_eq!(args.keywords[0].0, "k");
    }
}
