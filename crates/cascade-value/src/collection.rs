//! Lists, maps and argument lists.

use crate::Value;

/// List separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Space,
    Comma,
    Slash,
}

impl Separator {
    pub fn joiner(self) -> &'static str {
        match self {
            Separator::Space => " ",
            Separator::Comma => ", ",
            Separator::Slash => " / ",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Separator::Space => "space",
            Separator::Comma => "comma",
            Separator::Slash => "slash",
        }
    }

    /// Binding strength; a nested list needs parentheses unless it binds
    /// tighter than its parent.
    pub(crate) fn rank(self) -> u8 {
        match self {
            Separator::Comma => 1,
            Separator::Space => 2,
            Separator::Slash => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct List {
    pub items: Vec<Value>,
    pub separator: Separator,
    pub bracketed: bool,
}

impl List {
    pub fn new(items: Vec<Value>, separator: Separator) -> Self {
        Self {
            items,
            separator,
            bracketed: false,
        }
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.bracketed == other.bracketed
            && (self.items.len() < 2 || self.separator == other.separator)
            && self.items == other.items
    }
}

/// An insertion-ordered map.
#[derive(Debug, Clone, Default)]
pub struct Map {
    pairs: Vec<(Value, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<(Value, Value)>) -> Self {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.insert(key, value);
        }
        map
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace, keeping the original position of an existing key.
    pub fn insert(&mut self, key: Value, value: Value) {
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let idx = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(idx).1)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    pub fn pairs(&self) -> &[(Value, Value)] {
        &self.pairs
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.pairs.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.pairs.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl PartialEq for Map {
    /// Key order does not matter.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.pairs.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

/// Arguments collected by a rest parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgList {
    pub positional: Vec<Value>,
    pub keywords: Vec<(String, Value)>,
}
