//! Assembling the CSS of several files.
//! 多文件 CSS 的拼装。

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::path::PathBuf;

use cascade_eval::{MemberKind, ModuleExports};

/// Which files to emit and how.
/// 输出哪些文件以及如何输出。
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Emit these files and their dependencies; `None` emits every file.
    pub files: Option<Vec<PathBuf>>,
    /// Override the project's interop setting.
    pub interop: Option<bool>,
}

impl OutputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    pub fn interop(mut self, interop: bool) -> Self {
        self.interop = Some(interop);
        self
    }
}

/// Group files into tiers by repeatedly removing the files whose
/// dependencies are all in earlier tiers. Each tier is in path order.
/// Dependencies outside `edges` are ignored.
/// 反复移除依赖已全部位于前面层级的文件，将文件分组为层级；每层按路径排序。
pub(crate) fn tiers(edges: &BTreeMap<PathBuf, Vec<PathBuf>>) -> Vec<Vec<PathBuf>> {
    let mut remaining: BTreeMap<&PathBuf, BTreeSet<&PathBuf>> = edges
        .iter()
        .map(|(path, deps)| (path, deps.iter().filter(|dep| edges.contains_key(*dep)).collect()))
        .collect();
    let mut tiers = Vec::new();
    while !remaining.is_empty() {
        let tier: Vec<&PathBuf> = remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(path, _)| *path)
            .collect();
        if tier.is_empty() {
            break;
        }
        for path in &tier {
            remaining.remove(path);
        }
        for deps in remaining.values_mut() {
            for path in &tier {
                deps.remove(path);
            }
        }
        tiers.push(tier.into_iter().cloned().collect());
    }
    tiers
}

/// `:import` rules for the direct dependencies, then one `:export` rule
/// with the published variables and classes.
/// 直接依赖的 `:import` 规则，以及包含导出变量和类的 `:export` 规则。
pub(crate) fn interop_block(imports: &[(String, PathBuf)], exports: &ModuleExports) -> String {
    let mut out = String::new();
    let mut seen: Vec<&PathBuf> = Vec::new();
    for (request, path) in imports {
        if seen.contains(&path) {
            continue;
        }
        seen.push(path);
        let _ = writeln!(out, ":import(\"{request}\") {{}}");
    }

    let entries: Vec<(String, String)> = exports
        .members()
        .iter()
        .filter_map(|member| match &member.kind {
            MemberKind::Variable(value) => Some((format!("${}", member.name), value.to_css())),
            MemberKind::Class(class) => Some((member.name.clone(), class.to_value().to_css())),
            // Callables have no textual form.
            MemberKind::Function(_) | MemberKind::Mixin(_) => None,
        })
        .collect();
    if !entries.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(":export {\n");
        for (name, value) in entries {
            let _ = writeln!(out, "  {name}: {value};");
        }
        out.push_str("}\n");
    }
    out
}

/// One file of the concatenated output, behind a `/* path */` marker.
pub(crate) fn section(label: &str, interop: Option<&str>, css: &str) -> String {
    let parts: Vec<&str> = interop
        .into_iter()
        .chain(std::iter::once(css))
        .filter(|part| !part.is_empty())
        .collect();
    format!("/* {label} */\n{}", parts.join("\n"))
}
