//! Lexical path normalisation.
//! 词法层面的路径规范化。

use std::path::{Component, Path, PathBuf};

/// Normalise a path without touching the filesystem: `.` segments are
/// dropped and `..` pops the previous normal segment.
/// 在不访问文件系统的情况下规范化路径：去掉 `.`，`..` 弹出上一级。
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Case-insensitive identity of a normalised path, used to detect two
/// spellings of the same file on case-insensitive filesystems.
/// 规范化路径的大小写无关标识，用于检测同一文件的不同拼写。
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}
