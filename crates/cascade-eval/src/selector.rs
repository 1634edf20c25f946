//! Selector resolution: class renaming and parent expansion.
//! 选择器解析：类名重命名与父选择器展开。

use cascade_syntax::{
    ClassScope, Combinator, ComplexPart, ComplexSelector, CompoundSelector, PseudoArgument,
    SelectorList, SimpleSelector,
};
use cascade_value::{Separator, Value};

/// The block a scope sits in.
#[derive(Debug, Clone)]
pub enum RuleContext {
    /// A style rule with its fully resolved selector.
    Style {
        selector: SelectorList,
        css: String,
        /// Source name of the class when the selector is exactly one class.
        class: Option<String>,
    },
    /// A keyframe or a passthrough at-rule: declarations are allowed but
    /// there is no parent selector.
    Block,
}

impl RuleContext {
    pub fn selector(&self) -> Option<&SelectorList> {
        match self {
            RuleContext::Style { selector, .. } => Some(selector),
            RuleContext::Block => None,
        }
    }

    /// The value of `&`: a comma list of the selector alternatives.
    pub fn parent_value(&self) -> Value {
        match self {
            RuleContext::Style { selector, .. } => Value::list(
                selector
                    .selectors
                    .iter()
                    .map(|complex| Value::unquoted(complex.to_string()))
                    .collect(),
                Separator::Comma,
            ),
            RuleContext::Block => Value::Null,
        }
    }
}

/// Replace every class with its emitted name and mark it as final.
pub fn rename_classes(list: &SelectorList, rename: &mut dyn FnMut(&str, ClassScope) -> String) -> SelectorList {
    SelectorList {
        selectors: list
            .selectors
            .iter()
            .map(|complex| ComplexSelector {
                parts: complex
                    .parts
                    .iter()
                    .map(|part| ComplexPart {
                        combinator: part.combinator,
                        compound: CompoundSelector {
                            simples: part
                                .compound
                                .simples
                                .iter()
                                .map(|simple| rename_simple(simple, rename))
                                .collect(),
                        },
                    })
                    .collect(),
            })
            .collect(),
        span: list.span,
    }
}

fn rename_simple(simple: &SimpleSelector, rename: &mut dyn FnMut(&str, ClassScope) -> String) -> SimpleSelector {
    match simple {
        SimpleSelector::Class { name, scope } => SimpleSelector::Class {
            name: rename(name, *scope),
            scope: ClassScope::Global,
        },
        SimpleSelector::PseudoClass {
            name,
            argument: Some(PseudoArgument::Selector(inner)),
        } => SimpleSelector::PseudoClass {
            name: name.clone(),
            argument: Some(PseudoArgument::Selector(rename_classes(inner, rename))),
        },
        other => other.clone(),
    }
}

/// Produces the class name for `prefix-&` / `&-suffix` applied to a class.
pub type Splice<'a> = &'a mut dyn FnMut(&str, &str, &str) -> String;

/// Expand `&` against `parent` and prefix parent-less selectors with it.
///
/// Alternatives come out selector-major: every parent alternative for the
/// first selector, then for the second, and so on.
pub fn expand(list: &SelectorList, parent: Option<&SelectorList>, splice: Splice<'_>) -> Result<SelectorList, String> {
    expand_list(list, parent, true, splice)
}

fn expand_list(
    list: &SelectorList,
    parent: Option<&SelectorList>,
    implicit: bool,
    splice: Splice<'_>,
) -> Result<SelectorList, String> {
    let mut selectors = Vec::new();
    for complex in &list.selectors {
        let complex = expand_pseudo_arguments(complex, parent, splice)?;
        match parent {
            _ if complex.has_parent() => {
                let parent = parent.ok_or("`&` is only allowed inside a style rule")?;
                for alternative in &parent.selectors {
                    selectors.push(substitute(&complex, alternative, splice)?);
                }
            }
            Some(parent) if implicit => {
                for alternative in &parent.selectors {
                    selectors.push(descend(alternative, &complex));
                }
            }
            _ => selectors.push(complex),
        }
    }
    Ok(SelectorList {
        selectors,
        span: list.span,
    })
}

fn expand_pseudo_arguments(
    complex: &ComplexSelector,
    parent: Option<&SelectorList>,
    splice: Splice<'_>,
) -> Result<ComplexSelector, String> {
    let mut parts = Vec::with_capacity(complex.parts.len());
    for part in &complex.parts {
        let mut simples = Vec::with_capacity(part.compound.simples.len());
        for simple in &part.compound.simples {
            simples.push(match simple {
                SimpleSelector::PseudoClass {
                    name,
                    argument: Some(PseudoArgument::Selector(inner)),
                } => SimpleSelector::PseudoClass {
                    name: name.clone(),
                    argument: Some(PseudoArgument::Selector(expand_list(inner, parent, false, splice)?)),
                },
                other => other.clone(),
            });
        }
        parts.push(ComplexPart {
            combinator: part.combinator,
            compound: CompoundSelector { simples },
        });
    }
    Ok(ComplexSelector { parts })
}

/// `parent child`, or `parent > child` for a leading combinator.
fn descend(parent: &ComplexSelector, child: &ComplexSelector) -> ComplexSelector {
    let mut parts = parent.parts.clone();
    for (i, part) in child.parts.iter().enumerate() {
        let mut part = part.clone();
        if i == 0 {
            part.combinator = Some(part.combinator.unwrap_or(Combinator::Descendant));
        }
        parts.push(part);
    }
    ComplexSelector { parts }
}

/// Replace every `&` of `complex` with one parent alternative.
fn substitute(complex: &ComplexSelector, parent: &ComplexSelector, splice: Splice<'_>) -> Result<ComplexSelector, String> {
    let mut parts: Vec<ComplexPart> = Vec::new();
    for part in &complex.parts {
        if !part.compound.has_parent() {
            parts.push(part.clone());
            continue;
        }
        let mut inserted = parent.parts.clone();
        let Some(first) = inserted.first_mut() else {
            return Err("empty parent selector".to_string());
        };
        if !parts.is_empty() {
            first.combinator = Some(part.combinator.unwrap_or(Combinator::Descendant));
        } else if part.combinator.is_some() {
            first.combinator = part.combinator;
        }
        let Some(last) = inserted.last_mut() else {
            return Err("empty parent selector".to_string());
        };
        let mut seen_parent = false;
        let mut extra = Vec::new();
        for simple in &part.compound.simples {
            match simple {
                SimpleSelector::Parent { prefix, suffix } => {
                    if seen_parent {
                        return Err("`&` may appear only once in a compound selector".to_string());
                    }
                    seen_parent = true;
                    if !prefix.is_empty() {
                        let target = last.compound.simples.first_mut().ok_or("nothing to prefix")?;
                        apply_affix(target, prefix, "", splice)?;
                    }
                    if !suffix.is_empty() {
                        let target = last.compound.simples.last_mut().ok_or("nothing to suffix")?;
                        apply_affix(target, "", suffix, splice)?;
                    }
                }
                other => extra.push(other.clone()),
            }
        }
        last.compound.simples.extend(extra);
        parts.extend(inserted);
    }
    Ok(ComplexSelector { parts })
}

fn apply_affix(target: &mut SimpleSelector, prefix: &str, suffix: &str, splice: Splice<'_>) -> Result<(), String> {
    match target {
        SimpleSelector::Class { name, .. } => {
            *name = splice(name, prefix, suffix);
            Ok(())
        }
        SimpleSelector::Id(name)
        | SimpleSelector::Type(name)
        | SimpleSelector::PseudoClass { name, argument: None } => {
            *name = format!("{prefix}{name}{suffix}");
            Ok(())
        }
        other => {
            let text = CompoundSelector {
                simples: vec![other.clone()],
            };
            Err(format!("`{prefix}&{suffix}` cannot be applied to `{text}`"))
        }
    }
}
