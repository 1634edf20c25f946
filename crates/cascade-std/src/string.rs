//! The `string` module.
//! 字符串模块。

use cascade_eval::{Args, EvalResult, NativeCallable, NativeParam, nullable, optional, required};
use cascade_value::{List, Quote, Separator, Str, Value};

use crate::native;

const STRING: &[NativeParam] = &[required("string")];

/// Returns all string builtins.
/// 返回所有字符串内置函数。
pub fn builtins() -> Vec<NativeCallable> {
    vec![
        // length : String -> Number
        native("length", STRING, |args| {
            let s = args.string("string")?;
            Ok(Value::unitless(s.text.chars().count() as f64))
        }),
        // index : String -> String -> Number | Null
        // 1-based character index of the first occurrence / 首次出现的字符位置（从 1 开始）
        native("index", const { &[required("string"), required("substring")] }, |args| {
            let s = args.string("string")?;
            let needle = args.string("substring")?;
            Ok(match s.text.find(&needle.text) {
                Some(byte) => Value::unitless((s.text[..byte].chars().count() + 1) as f64),
                None => Value::Null,
            })
        }),
        // slice : String -> Number -> Number? -> String
        native("slice", const { &[required("string"), required("start-at"), optional("end-at")] }, |args| {
            let s = args.string("string")?;
            let chars: Vec<char> = s.text.chars().collect();
            let len = chars.len() as i64;
            let start = position(args.int("start-at")?, len).max(1);
            let end = match args.get_non_null("end-at") {
                Some(_) => position(args.int("end-at")?, len).min(len),
                None => len,
            };
            let text: String = if start > end {
                String::new()
            } else {
                chars[(start - 1) as usize..end as usize].iter().collect()
            };
            Ok(with_text(&s, text))
        }),
        // insert : String -> String -> Number -> String
        native("insert", const { &[required("string"), required("insert"), required("index")] }, |args| {
            let s = args.string("string")?;
            let insert = args.string("insert")?;
            let chars: Vec<char> = s.text.chars().collect();
            let len = chars.len() as i64;
            let at = match args.int("index")? {
                n if n < 0 => (len + n + 1).max(0),
                n => (n - 1).clamp(0, len),
            } as usize;
            let mut text: String = chars[..at].iter().collect();
            text.push_str(&insert.text);
            text.extend(&chars[at..]);
            Ok(with_text(&s, text))
        }),
        // split : String -> String -> Number? -> List
        native("split", const { &[required("string"), required("separator"), nullable("limit")] }, |args| {
            let s = args.string("string")?;
            let separator = args.string("separator")?;
            let pieces: Vec<Value> = match args.get_non_null("limit") {
                Some(_) => {
                    let limit = args.int("limit")?;
                    if limit < 1 {
                        return Err(args.fail("$limit must be at least 1"));
                    }
                    s.text
                        .splitn(limit as usize + 1, separator.text.as_str())
                        .map(|piece| with_text(&s, piece.to_string()))
                        .collect()
                }
                None => s
                    .text
                    .split(separator.text.as_str())
                    .map(|piece| with_text(&s, piece.to_string()))
                    .collect(),
            };
            Ok(Value::List(List {
                items: pieces,
                separator: Separator::Comma,
                bracketed: true,
            }))
        }),
        // Case and quoting / 大小写与引号
        native("to-upper-case", STRING, |args| {
            let s = args.string("string")?;
            Ok(with_text(&s, s.text.to_ascii_uppercase()))
        }),
        native("to-lower-case", STRING, |args| {
            let s = args.string("string")?;
            Ok(with_text(&s, s.text.to_ascii_lowercase()))
        }),
        native("quote", STRING, |args| quoting(args, Some(Quote::Double))),
        native("unquote", STRING, |args| quoting(args, None)),
    ]
}

/// A 1-based position; negative values count from the end.
fn position(n: i64, len: i64) -> i64 {
    if n < 0 { len + n + 1 } else { n }
}

fn with_text(source: &Str, text: String) -> Value {
    Value::String(Str {
        text,
        quote: source.quote,
    })
}

fn quoting(args: &mut Args, quote: Option<Quote>) -> EvalResult<Value> {
    let s = args.string("string")?;
    Ok(Value::String(Str { text: s.text, quote }))
}
