//! Where module sources come from.
//! 模块源码的来源。

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cascade_common::normalize_path;
use futures::FutureExt;
use futures::future::LocalBoxFuture;

/// Reads source text for a resolved path.
/// 读取已解析路径的源码。
pub trait SourceLoader {
    fn load(&self, path: &Path) -> LocalBoxFuture<'static, io::Result<String>>;

    /// Whether `path` names a loadable file. Used by the default resolver.
    fn exists(&self, path: &Path) -> bool;
}

/// Loads sources from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> LocalBoxFuture<'static, io::Result<String>> {
        let path = path.to_path_buf();
        async move { std::fs::read_to_string(&path) }.boxed_local()
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory sources keyed by normalised path. Clones share the same files.
/// 以规范化路径为键的内存源码；克隆共享同一份文件表。
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: Rc<RefCell<HashMap<PathBuf, String>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl AsRef<Path>, source: impl Into<String>) {
        self.files
            .borrow_mut()
            .insert(normalize_path(path.as_ref()), source.into());
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow_mut().remove(&normalize_path(path.as_ref()))
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> LocalBoxFuture<'static, io::Result<String>> {
        let found = self.files.borrow().get(&normalize_path(path)).cloned();
        let path = path.to_path_buf();
        async move {
            found.ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path.display()))
            })
        }
        .boxed_local()
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(&normalize_path(path))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn test_memory_loader() {
        let loader = MemoryLoader::new().with("/p/a.cas", ".a { b: c; }");
        assert!(loader.exists(Path::new("/p/./a.cas")));
        assert_eq!(loader.load(Path::new("/p/a.cas")).await.unwrap(), ".a { b: c; }");
        let err = loader.load(Path::new("/p/b.cas")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(loader.remove("/p/a.cas").is_some());
        assert!(!loader.exists(Path::new("/p/a.cas")));
    }

    #[tokio::test]
    async fn test_fs_loader() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "$x: 1px;").unwrap();
        assert!(FsLoader.exists(file.path()));
        assert_eq!(FsLoader.load(file.path()).await.unwrap(), "$x: 1px;");
        assert!(!FsLoader.exists(&file.path().with_extension("missing")));
    }
}
