//! File nodes of the module graph.
//! 模块图中的文件节点。

use std::path::PathBuf;
use std::rc::Rc;

use cascade_eval::{IdentifierScope, ModuleExports, Scope, Warning};
use cascade_syntax::Stylesheet;

/// Content hash for change detection.
/// 用于变更检测的内容哈希。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(content: &str) -> Self {
        Self(*blake3::hash(content.as_bytes()).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// What evaluating a file produced.
#[derive(Debug)]
pub(crate) struct FileOutput {
    pub exports: Rc<ModuleExports>,
    pub css: String,
    pub warnings: Vec<Warning>,
    pub root: Scope,
}

/// One file of the project.
/// 项目中的一个文件。
#[derive(Debug)]
pub(crate) struct FileNode {
    pub scope: IdentifierScope,
    /// Walked with its current source, imports resolved.
    pub valid: bool,
    /// The source came from `add` and is not reloaded.
    pub pinned: bool,
    pub source: Option<Rc<str>>,
    pub hash: Option<ContentHash>,
    pub sheet: Option<Rc<Stylesheet>>,
    /// `(request, resolved path)` in source order, one entry per request.
    pub imports: Vec<(String, PathBuf)>,
    pub output: Option<FileOutput>,
}

impl FileNode {
    pub fn new(scope: IdentifierScope) -> Self {
        Self {
            scope,
            valid: false,
            pinned: false,
            source: None,
            hash: None,
            sheet: None,
            imports: Vec::new(),
            output: None,
        }
    }

    /// Distinct dependency paths in import order.
    pub fn dependencies(&self) -> Vec<PathBuf> {
        let mut deps: Vec<PathBuf> = Vec::new();
        for (_, path) in &self.imports {
            if !deps.contains(path) {
                deps.push(path.clone());
            }
        }
        deps
    }

    /// Drop the evaluation result, tearing down its scopes.
    pub fn discard_output(&mut self) {
        if let Some(output) = self.output.take() {
            output.root.clear();
        }
    }
}

/// Counters for checking incremental behaviour.
/// 用于检查增量行为的计数器。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Files walked: loaded, hashed and their requests resolved.
    pub walks: usize,
    /// Sources parsed. An unchanged hash reuses the previous AST.
    pub parses: usize,
    /// Files evaluated.
    pub evaluations: usize,
    /// Walks skipped because the file was still valid.
    pub cache_hits: usize,
}
