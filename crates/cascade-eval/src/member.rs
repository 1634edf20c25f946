//! Scope and export entries.
//! 作用域与导出表条目。

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use cascade_syntax::{ParamList, Stmt};
use cascade_value::Value;

use crate::{Args, EvalResult, Scope};

/// What kind of member a name refers to. Each kind has its own namespace.
/// 成员类别；每个类别有独立的命名空间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberTag {
    Variable,
    Class,
    Function,
    Mixin,
}

impl MemberTag {
    /// Source spelling of a member name of this kind.
    pub fn display_name(self, name: &str) -> String {
        match self {
            MemberTag::Variable => format!("${name}"),
            MemberTag::Class => format!(".{name}"),
            MemberTag::Function | MemberTag::Mixin => name.to_string(),
        }
    }
}

impl fmt::Display for MemberTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemberTag::Variable => "variable",
            MemberTag::Class => "class",
            MemberTag::Function => "function",
            MemberTag::Mixin => "mixin",
        })
    }
}

/// A class: its renamed primary selector plus the classes composed into it.
/// 类：重命名后的主选择器以及组合进来的类。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMember {
    pub primary: String,
    pub composed: Vec<String>,
}

impl ClassMember {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            composed: Vec::new(),
        }
    }

    /// Append `other.primary` then `other.composed`, skipping names already
    /// present so the first occurrence keeps its position.
    pub fn compose(&mut self, other: &ClassMember) {
        for name in std::iter::once(&other.primary).chain(&other.composed) {
            if *name != self.primary && !self.composed.contains(name) {
                self.composed.push(name.clone());
            }
        }
    }

    /// All class names an element using this class receives.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.composed.iter().map(String::as_str))
    }

    /// Space-separated class names, as exported to CSS-Modules consumers.
    pub fn to_value(&self) -> Value {
        Value::unquoted(self.names().collect::<Vec<_>>().join(" "))
    }
}

/// A function or mixin written in the stylesheet.
/// 样式表中定义的函数或混入。
#[derive(Debug)]
pub struct UserCallable {
    pub name: String,
    pub params: ParamList,
    pub body: Rc<[Stmt]>,
    /// The scope the declaration appeared in.
    pub closure: Scope,
}

/// Default of a native parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeDefault {
    Required,
    Null,
    /// Leave the parameter unbound; the function decides what absence means.
    Unbound,
}

#[derive(Debug, Clone, Copy)]
pub struct NativeParam {
    pub name: &'static str,
    pub default: NativeDefault,
}

pub const fn required(name: &'static str) -> NativeParam {
    NativeParam {
        name,
        default: NativeDefault::Required,
    }
}

pub const fn optional(name: &'static str) -> NativeParam {
    NativeParam {
        name,
        default: NativeDefault::Unbound,
    }
}

pub const fn nullable(name: &'static str) -> NativeParam {
    NativeParam {
        name,
        default: NativeDefault::Null,
    }
}

pub type NativeFn = fn(&mut Args) -> EvalResult<Value>;

/// A callable implemented in Rust.
/// 用 Rust 实现的可调用对象。
pub struct NativeCallable {
    pub name: &'static str,
    pub params: &'static [NativeParam],
    /// Name of the rest parameter, if any.
    pub rest: Option<&'static str>,
    pub func: NativeFn,
}

impl fmt::Debug for NativeCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCallable").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone)]
pub enum Callable {
    User(Rc<UserCallable>),
    Native(Rc<NativeCallable>),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::User(user) => &user.name,
            Callable::Native(native) => native.name,
        }
    }
}

/// Payload of a member.
#[derive(Debug, Clone)]
pub enum MemberKind {
    Variable(Value),
    Class(ClassMember),
    Function(Callable),
    Mixin(Callable),
}

impl MemberKind {
    pub fn tag(&self) -> MemberTag {
        match self {
            MemberKind::Variable(_) => MemberTag::Variable,
            MemberKind::Class(_) => MemberTag::Class,
            MemberKind::Function(_) => MemberTag::Function,
            MemberKind::Mixin(_) => MemberTag::Mixin,
        }
    }
}

/// A named binding in a scope or an export table.
/// 作用域或导出表中的具名绑定。
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    /// File the member was re-exported from.
    pub origin: Option<PathBuf>,
}

impl Member {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            origin: None,
        }
    }

    pub fn variable(name: impl Into<String>, value: Value) -> Self {
        Self::new(name, MemberKind::Variable(value))
    }

    pub fn tag(&self) -> MemberTag {
        self.kind.tag()
    }

    pub fn with_origin(mut self, origin: Option<PathBuf>) -> Self {
        if self.origin.is_none() {
            self.origin = origin;
        }
        self
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn as_variable(&self) -> Option<&Value> {
        match &self.kind {
            MemberKind::Variable(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassMember> {
        match &self.kind {
            MemberKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match &self.kind {
            MemberKind::Function(callable) | MemberKind::Mixin(callable) => Some(callable),
            _ => None,
        }
    }
}

/// The members a module publishes. Read-only once evaluation finished.
/// 模块发布的成员；求值结束后只读。
#[derive(Debug, Clone, Default)]
pub struct ModuleExports {
    /// Source file, `None` for built-in modules.
    pub path: Option<PathBuf>,
    members: Vec<Member>,
}

impl ModuleExports {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            members: Vec::new(),
        }
    }

    /// Build a built-in module from native functions.
    pub fn native(functions: Vec<NativeCallable>) -> Self {
        let mut exports = Self::new(None);
        for function in functions {
            let name = function.name;
            exports.insert(Member::new(name, MemberKind::Function(Callable::Native(Rc::new(function)))));
        }
        exports
    }

    /// Insert or replace a member of the same kind and name.
    pub fn insert(&mut self, member: Member) {
        let tag = member.tag();
        match self
            .members
            .iter_mut()
            .find(|m| m.tag() == tag && m.name == member.name)
        {
            Some(slot) => *slot = member,
            None => self.members.push(member),
        }
    }

    pub fn get(&self, tag: MemberTag, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.tag() == tag && m.name == name)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn names(&self, tag: MemberTag) -> Vec<String> {
        self.members
            .iter()
            .filter(|m| m.tag() == tag)
            .map(|m| m.name.clone())
            .collect()
    }

    pub fn classes(&self) -> impl Iterator<Item = (&str, &ClassMember)> {
        self.members
            .iter()
            .filter_map(|m| m.as_class().map(|class| (m.name.as_str(), class)))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_keeps_first_occurrence() {
        let mut d = ClassMember::new("d");
        d.composed.push("e".into());
        let mut b = ClassMember::new("b");
        b.compose(&d);
        let mut c = ClassMember::new("c");
        c.compose(&b);
        c.compose(&ClassMember::new("a"));
        c.compose(&b);
        assert_eq!(c.composed, vec!["b", "d", "e", "a"]);
        assert_eq!(c.to_value().to_css(), "c b d e a");
    }

    #[test]
    fn test_compose_skips_self() {
        let mut a = ClassMember::new("a");
        a.compose(&ClassMember::new("a"));
        assert!(a.composed.is_empty());
    }

    #[test]
    fn test_exports_replace_same_kind() {
        let mut exports = ModuleExports::new(None);
        exports.insert(Member::variable("x", Value::unitless(1.0)));
        exports.insert(Member::new("x", MemberKind::Class(ClassMember::new("x_1"))));
        exports.insert(Member::variable("x", Value::unitless(2.0)));
        assert_eq!(exports.len(), 2);
        assert_eq!(
            exports.get(MemberTag::Variable, "x").and_then(Member::as_variable),
            Some(&Value::unitless(2.0))
        );
    }
}
