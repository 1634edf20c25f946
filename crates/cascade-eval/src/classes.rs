//! Per-file class and keyframe identities.
//! 每个文件的类名与关键帧名身份表。

use std::collections::HashMap;

use crate::ClassMember;

/// Classes and keyframes seen in one file, each renamed exactly once.
#[derive(Debug, Default)]
pub struct ClassTable {
    classes: Vec<(String, ClassMember)>,
    index: HashMap<String, usize>,
    /// Emitted name → source name.
    reverse: HashMap<String, String>,
    keyframes: Vec<(String, String)>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` and return its emitted form.
    ///
    /// Names that are already emitted forms of this file (for example text
    /// that came back through `#{&}`) are returned unchanged.
    pub fn register(&mut self, name: &str, rename: &dyn Fn(&str) -> String) -> String {
        if let Some(&i) = self.index.get(name) {
            return self.classes[i].1.primary.clone();
        }
        if self.reverse.contains_key(name) {
            return name.to_string();
        }
        let renamed = rename(name);
        self.reverse.insert(renamed.clone(), name.to_string());
        self.index.insert(name.to_string(), self.classes.len());
        self.classes.push((name.to_string(), ClassMember::new(renamed.clone())));
        renamed
    }

    /// Source name of an emitted class name.
    pub fn original(&self, emitted: &str) -> Option<&str> {
        self.reverse.get(emitted).map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&ClassMember> {
        self.index.get(name).map(|&i| &self.classes[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClassMember> {
        self.index.get(name).map(|&i| &mut self.classes[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClassMember)> {
        self.classes.iter().map(|(name, class)| (name.as_str(), class))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|(name, _)| name.as_str())
    }

    pub fn register_keyframes(&mut self, name: &str, rename: &dyn Fn(&str) -> String) -> String {
        if let Some((_, renamed)) = self.keyframes.iter().find(|(n, _)| n == name) {
            return renamed.clone();
        }
        let renamed = rename(name);
        self.keyframes.push((name.to_string(), renamed.clone()));
        renamed
    }

    /// Replace every whole-word keyframe name seen so far with its
    /// emitted form, leaving quoted strings alone.
    pub fn rewrite_animation(&self, value: &str) -> String {
        if self.keyframes.is_empty() {
            return value.to_string();
        }
        let mut out = String::with_capacity(value.len());
        let mut word = String::new();
        let mut quote: Option<char> = None;
        for c in value.chars() {
            if let Some(q) = quote {
                out.push(c);
                if c == q {
                    quote = None;
                }
                continue;
            }
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                word.push(c);
                continue;
            }
            self.flush_word(&mut word, &mut out);
            if c == '"' || c == '\'' {
                quote = Some(c);
            }
            out.push(c);
        }
        self.flush_word(&mut word, &mut out);
        out
    }

    fn flush_word(&self, word: &mut String, out: &mut String) {
        match self.keyframes.iter().find(|(name, _)| name == word) {
            Some((_, renamed)) => out.push_str(renamed),
            None => out.push_str(word),
        }
        word.clear();
    }
}
