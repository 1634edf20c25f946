//! The seam between the evaluator and whoever owns the other modules.
//! 求值器与模块提供方之间的接口。

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::ModuleExports;

/// Supplies the exports of other modules to a file being evaluated.
/// 为正在求值的文件提供其他模块的导出表。
pub trait ModuleHost {
    /// A built-in module such as `math`, bypassing the file graph.
    fn builtin(&self, name: &str) -> Option<Rc<ModuleExports>> {
        let _ = name;
        None
    }

    /// Exports of the module `request` resolves to from the current file.
    /// The module has finished evaluating when this is called.
    fn module(&self, request: &str) -> Option<Rc<ModuleExports>>;
}

/// A host without any modules, for standalone evaluation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoModules;

impl ModuleHost for NoModules {
    fn module(&self, _request: &str) -> Option<Rc<ModuleExports>> {
        None
    }
}

/// Whether unmarked class and keyframe names of a file are renamed.
/// 文件中未标记的类名和关键帧名是否重命名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierScope {
    #[default]
    Local,
    Global,
}

/// Turns a local identifier into its emitted form.
pub type ClassNamer = Rc<dyn Fn(&str) -> String>;

/// Per-file settings for an evaluation.
#[derive(Clone)]
pub struct FileContext {
    pub path: PathBuf,
    pub scoping: IdentifierScope,
    pub namer: ClassNamer,
}

impl FileContext {
    pub fn new(path: impl Into<PathBuf>, scoping: IdentifierScope, namer: ClassNamer) -> Self {
        Self {
            path: path.into(),
            scoping,
            namer,
        }
    }

    /// A globally scoped file that never renames anything.
    pub fn global(path: impl Into<PathBuf>) -> Self {
        Self::new(path, IdentifierScope::Global, Rc::new(str::to_string))
    }
}

impl fmt::Debug for FileContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileContext")
            .field("path", &self.path)
            .field("scoping", &self.scoping)
            .finish_non_exhaustive()
    }
}
