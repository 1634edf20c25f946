//! Selector AST definitions.
//! 选择器 AST 定义。

use std::fmt::{self, Write};

use cascade_common::Span;

/// A comma-separated list of complex selectors.
/// 逗号分隔的复合选择器列表。
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
    pub span: Span,
}

/// Compound selectors joined by combinators.
/// 由组合符连接的选择器序列。
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub parts: Vec<ComplexPart>,
}

/// One compound selector and the combinator in front of it.
/// A combinator on the first part is a leading combinator (`> .a`).
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexPart {
    pub combinator: Option<Combinator>,
    pub compound: CompoundSelector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    SubsequentSibling,
}

impl Combinator {
    pub fn symbol(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => ">",
            Combinator::NextSibling => "+",
            Combinator::SubsequentSibling => "~",
        }
    }
}

/// Simple selectors with no combinator between them.
/// 无组合符的简单选择器序列。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Whether a class name is renamed.
/// 类名是否被重命名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassScope {
    /// Follows the file's identifier scope. / 跟随文件的标识符作用域
    Inherit,
    /// Forced by `:local(...)`.
    Local,
    /// Forced by `:global(...)`.
    Global,
}

/// A simple selector.
/// 简单选择器。
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    /// `*`
    Universal,
    /// `div`
    Type(String),
    /// `.name`
    Class { name: String, scope: ClassScope },
    /// `#name`
    Id(String),
    /// `[attr=value]`, text between the brackets.
    Attribute(String),
    /// `:hover`, `:not(.a)`
    PseudoClass {
        name: String,
        argument: Option<PseudoArgument>,
    },
    /// `::before`, `::part(x)`
    PseudoElement {
        name: String,
        argument: Option<String>,
    },
    /// `&`, `&-suffix`, `prefix-&`
    Parent { prefix: String, suffix: String },
}

/// Argument of a functional pseudo-class.
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoArgument {
    /// `:not(.a, .b)`, `:is(...)`, `:where(...)`, `:has(...)`
    Selector(SelectorList),
    /// `:nth-child(2n + 1)`, `:lang(en)`
    Raw(String),
}

/// Pseudo-classes whose argument is a selector list.
pub const SELECTOR_PSEUDOS: &[&str] = &["not", "is", "where", "has", "matches", "any", "host", "host-context"];

impl SimpleSelector {
    pub fn is_parent(&self) -> bool {
        matches!(self, SimpleSelector::Parent { .. })
    }
}

impl CompoundSelector {
    pub fn has_parent(&self) -> bool {
        self.simples.iter().any(SimpleSelector::is_parent)
    }

    /// True for a compound made only of a bare `&`.
    pub fn is_bare_parent(&self) -> bool {
        matches!(
            self.simples.as_slice(),
            [SimpleSelector::Parent { prefix, suffix }] if prefix.is_empty() && suffix.is_empty()
        )
    }
}

impl ComplexSelector {
    /// Whether `&` appears outside pseudo arguments.
    pub fn has_parent(&self) -> bool {
        self.parts.iter().any(|p| p.compound.has_parent())
    }

    /// The class name when this selector is exactly one class.
    pub fn single_class(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [ComplexPart { combinator: None, compound }] => match compound.simples.as_slice() {
                [SimpleSelector::Class { name, .. }] => Some(name),
                _ => None,
            },
            _ => None,
        }
    }
}

impl SelectorList {
    /// Calls `f` for every class in the list, including pseudo arguments.
    pub fn for_each_class(&self, f: &mut dyn FnMut(&str, ClassScope)) {
        for complex in &self.selectors {
            for part in &complex.parts {
                for simple in &part.compound.simples {
                    match simple {
                        SimpleSelector::Class { name, scope } => f(name, *scope),
                        SimpleSelector::PseudoClass {
                            argument: Some(PseudoArgument::Selector(inner)),
                            ..
                        } => inner.for_each_class(f),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Serializes with class names mapped through `rename`.
    /// 通过 `rename` 映射类名后序列化。
    pub fn to_css_with(&self, rename: &mut dyn FnMut(&str, ClassScope) -> String) -> String {
        let mut out = String::new();
        write_list(&mut out, self, rename);
        out
    }
}

fn write_list(out: &mut String, list: &SelectorList, rename: &mut dyn FnMut(&str, ClassScope) -> String) {
    for (i, complex) in list.selectors.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_complex(out, complex, rename);
    }
}

fn write_complex(out: &mut String, complex: &ComplexSelector, rename: &mut dyn FnMut(&str, ClassScope) -> String) {
    for (i, part) in complex.parts.iter().enumerate() {
        match (i, part.combinator) {
            (0, Some(comb)) => {
                out.push_str(comb.symbol());
                out.push(' ');
            }
            (0, None) => {}
            (_, None) | (_, Some(Combinator::Descendant)) => out.push(' '),
            (_, Some(comb)) => {
                out.push(' ');
                out.push_str(comb.symbol());
                out.push(' ');
            }
        }
        write_compound(out, &part.compound, rename);
    }
}

fn write_compound(out: &mut String, compound: &CompoundSelector, rename: &mut dyn FnMut(&str, ClassScope) -> String) {
    for simple in &compound.simples {
        match simple {
            SimpleSelector::Universal => out.push('*'),
            SimpleSelector::Type(name) => out.push_str(name),
            SimpleSelector::Class { name, scope } => {
                out.push('.');
                out.push_str(&rename(name, *scope));
            }
            SimpleSelector::Id(name) => {
                out.push('#');
                out.push_str(name);
            }
            SimpleSelector::Attribute(text) => {
                let _ = write!(out, "[{text}]");
            }
            SimpleSelector::PseudoClass { name, argument } => {
                out.push(':');
                out.push_str(name);
                match argument {
                    Some(PseudoArgument::Selector(inner)) => {
                        out.push('(');
                        write_list(out, inner, rename);
                        out.push(')');
                    }
                    Some(PseudoArgument::Raw(text)) => {
                        let _ = write!(out, "({text})");
                    }
                    None => {}
                }
            }
            SimpleSelector::PseudoElement { name, argument } => {
                let _ = write!(out, "::{name}");
                if let Some(arg) = argument {
                    let _ = write!(out, "({arg})");
                }
            }
            SimpleSelector::Parent { prefix, suffix } => {
                let _ = write!(out, "{prefix}&{suffix}");
            }
        }
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_with(&mut |name, _| name.to_string()))
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_complex(&mut out, self, &mut |name, _| name.to_string());
        f.write_str(&out)
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_compound(&mut out, self, &mut |name, _| name.to_string());
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> SimpleSelector {
        SimpleSelector::Class {
            name: name.to_string(),
            scope: ClassScope::Inherit,
        }
    }

    fn compound(simples: Vec<SimpleSelector>) -> CompoundSelector {
        CompoundSelector { simples }
    }

    #[test]
    fn test_display_combinators() {
        let complex = ComplexSelector {
            parts: vec![
                ComplexPart {
                    combinator: None,
                    compound: compound(vec![SimpleSelector::Type("ul".into()), class("menu")]),
                },
                ComplexPart {
                    combinator: Some(Combinator::Child),
                    compound: compound(vec![SimpleSelector::Type("li".into())]),
                },
                ComplexPart {
                    combinator: Some(Combinator::Descendant),
                    compound: compound(vec![SimpleSelector::Type("a".into())]),
                },
            ],
        };
        assert_eq!(complex.to_string(), "ul.menu > li a");
    }

    #[test]
    fn test_rename_reaches_pseudo_arguments() {
        let inner = SelectorList {
            selectors: vec![ComplexSelector {
                parts: vec![ComplexPart {
                    combinator: None,
                    compound: compound(vec![class("b")]),
                }],
            }],
            span: Span::default(),
        };
        let list = SelectorList {
            selectors: vec![ComplexSelector {
                parts: vec![ComplexPart {
                    combinator: None,
                    compound: compound(vec![
                        class("a"),
                        SimpleSelector::PseudoClass {
                            name: "not".into(),
                            argument: Some(PseudoArgument::Selector(inner)),
                        },
                    ]),
                }],
            }],
            span: Span::default(),
        };
        let css = list.to_css_with(&mut |name, _| format!("x_{name}"));
        assert_eq!(css, ".x_a:not(.x_b)");

        let mut seen = Vec::new();
        list.for_each_class(&mut |name, _| seen.push(name.to_string()));
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_single_class() {
        let single = ComplexSelector {
            parts: vec![ComplexPart {
                combinator: None,
                compound: compound(vec![class("btn")]),
            }],
        };
        assert_eq!(single.single_class(), Some("btn"));
        let compound_sel = ComplexSelector {
            parts: vec![ComplexPart {
                combinator: None,
                compound: compound(vec![class("btn"), class("x")]),
            }],
        };
        assert_eq!(compound_sel.single_class(), None);
    }
}
