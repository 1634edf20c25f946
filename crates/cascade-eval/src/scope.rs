//! Lexical scopes.
//! 词法作用域。

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use cascade_common::Span;
use cascade_diagnostic::ErrorCode;
use cascade_value::Value;

use crate::{CssNode, EvalError, EvalResult, Member, MemberTag, RuleContext};

/// A parent-linked symbol table.
///
/// Closure scopes (file root, function and mixin bodies, style rules) keep
/// new bindings; other scopes (`@if`, `@each`, content blocks) hand writes
/// to the nearest closure scope above them.
/// 闭包作用域保存新绑定；其他作用域把写入交给最近的闭包作用域。
#[derive(Clone)]
pub struct Scope(Rc<ScopeNode>);

struct ScopeNode {
    parent: Option<Scope>,
    closure: bool,
    members: RefCell<HashMap<(MemberTag, String), Member>>,
    rule: RefCell<Option<Rc<RuleContext>>>,
    content: RefCell<Option<Rc<Vec<CssNode>>>>,
}

impl Scope {
    /// A new file root.
    pub fn root() -> Self {
        Self::with_parent(None, true)
    }

    pub fn child(&self, closure: bool) -> Self {
        Self::with_parent(Some(self.clone()), closure)
    }

    fn with_parent(parent: Option<Scope>, closure: bool) -> Self {
        Scope(Rc::new(ScopeNode {
            parent,
            closure,
            members: RefCell::new(HashMap::new()),
            rule: RefCell::new(None),
            content: RefCell::new(None),
        }))
    }

    pub fn is_closure(&self) -> bool {
        self.0.closure
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    /// The outermost scope of the chain.
    pub fn top(&self) -> Scope {
        let mut scope = self.clone();
        while let Some(parent) = scope.0.parent.clone() {
            scope = parent;
        }
        scope
    }

    pub fn get(&self, tag: MemberTag, name: &str) -> Option<Member> {
        if let Some(member) = self.0.members.borrow().get(&(tag, name.to_string())) {
            return Some(member.clone());
        }
        self.0.parent.as_ref().and_then(|parent| parent.get(tag, name))
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.get(MemberTag::Variable, name)
            .and_then(|m| m.as_variable().cloned())
    }

    fn has_own(&self, tag: MemberTag, name: &str) -> bool {
        self.0.members.borrow().contains_key(&(tag, name.to_string()))
    }

    /// Write where the name already lives in this scope, or here if this is
    /// a closure scope, else in the parent.
    pub fn set(&self, member: Member) -> EvalResult<()> {
        if self.0.closure || self.has_own(member.tag(), &member.name) {
            self.set_local(member);
            return Ok(());
        }
        match &self.0.parent {
            Some(parent) => parent.set(member),
            None => Err(EvalError::structural(
                ErrorCode::MisplacedDirective,
                format!("no scope can hold `{}`", member.tag().display_name(&member.name)),
                Span::DUMMY,
            )),
        }
    }

    /// Always write into this scope (parameters, loop variables).
    pub fn set_local(&self, member: Member) {
        let key = (member.tag(), member.name.clone());
        self.0.members.borrow_mut().insert(key, member);
    }

    /// Write into the file root (`!global`).
    pub fn set_global(&self, member: Member) {
        self.top().set_local(member);
    }

    /// Names of every visible member of one kind, innermost first.
    pub fn get_all(&self, tag: MemberTag) -> Vec<String> {
        let mut names = Vec::new();
        let mut scope = Some(self);
        while let Some(current) = scope {
            let mut own: Vec<String> = current
                .0
                .members
                .borrow()
                .keys()
                .filter(|(t, _)| *t == tag)
                .map(|(_, name)| name.clone())
                .collect();
            own.sort();
            for name in own {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            scope = current.0.parent.as_ref();
        }
        names
    }

    // ========== Chain-inherited slots ==========

    pub fn current_rule(&self) -> Option<Rc<RuleContext>> {
        if let Some(rule) = self.0.rule.borrow().as_ref() {
            return Some(rule.clone());
        }
        self.0.parent.as_ref().and_then(Scope::current_rule)
    }

    pub fn set_current_rule(&self, rule: Rc<RuleContext>) {
        *self.0.rule.borrow_mut() = Some(rule);
    }

    pub fn current_content(&self) -> Option<Rc<Vec<CssNode>>> {
        if let Some(content) = self.0.content.borrow().as_ref() {
            return Some(content.clone());
        }
        self.0.parent.as_ref().and_then(Scope::current_content)
    }

    pub fn set_current_content(&self, content: Rc<Vec<CssNode>>) {
        *self.0.content.borrow_mut() = Some(content);
    }

    /// Drop every binding and slot of this scope.
    ///
    /// Callables capture the scope they are declared in, which usually also
    /// holds them; clearing the file root breaks those reference cycles.
    pub fn clear(&self) {
        self.0.members.borrow_mut().clear();
        self.0.rule.borrow_mut().take();
        self.0.content.borrow_mut().take();
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("closure", &self.0.closure)
            .field("members", &self.0.members.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, value: f64) -> Member {
        Member::variable(name, Value::unitless(value))
    }

    #[test]
    fn test_lookup_falls_through() {
        let root = Scope::root();
        root.set_local(var("a", 1.0));
        let inner = root.child(false).child(true);
        assert_eq!(inner.variable("a"), Some(Value::unitless(1.0)));
        assert_eq!(inner.variable("b"), None);
    }

    #[test]
    fn test_block_writes_bubble_to_closure() {
        let root = Scope::root();
        root.set_local(var("a", 1.0));
        let block = root.child(false);
        block.set(var("a", 2.0)).unwrap();
        block.set(var("b", 3.0)).unwrap();
        assert_eq!(root.variable("a"), Some(Value::unitless(2.0)));
        assert_eq!(root.variable("b"), Some(Value::unitless(3.0)));
    }

    #[test]
    fn test_forced_local_does_not_leak() {
        let root = Scope::root();
        let block = root.child(false);
        block.set_local(var("i", 1.0));
        block.set(var("i", 2.0)).unwrap();
        assert_eq!(block.variable("i"), Some(Value::unitless(2.0)));
        assert_eq!(root.variable("i"), None);
    }

    #[test]
    fn test_closure_scope_shadows() {
        let root = Scope::root();
        root.set_local(var("a", 1.0));
        let body = root.child(true);
        body.set(var("a", 2.0)).unwrap();
        assert_eq!(root.variable("a"), Some(Value::unitless(1.0)));
        assert_eq!(body.variable("a"), Some(Value::unitless(2.0)));
        body.set_global(var("a", 3.0));
        assert_eq!(root.variable("a"), Some(Value::unitless(3.0)));
    }

    #[test]
    fn test_get_all_collects_chain() {
        let root = Scope::root();
        root.set_local(var("color", 1.0));
        root.set_local(var("size", 1.0));
        let inner = root.child(true);
        inner.set_local(var("colour", 1.0));
        inner.set_local(var("color", 2.0));
        assert_eq!(inner.get_all(MemberTag::Variable), vec!["color", "colour", "size"]);
    }

    #[test]
    fn test_content_slot_is_inherited() {
        let root = Scope::root();
        let body = root.child(true);
        body.set_current_content(Rc::new(Vec::new()));
        assert!(body.child(false).current_content().is_some());
        assert!(root.current_content().is_none());
    }
}
