//! Project configuration.
//! 项目配置。

use std::path::{Path, PathBuf};
use std::rc::Rc;

use cascade_common::normalize_path;
use cascade_eval::{ClassNamer, IdentifierScope};
use serde::Deserialize;

use crate::GraphError;

/// How local class and keyframe names are rewritten.
/// 局部类名与关键帧名的重写方式。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Naming {
    /// `{prefix}{name}_{hash}`, the hash taken from the file path and the name.
    Hashed {
        #[serde(default)]
        prefix: String,
    },
    /// `{stem}_{name}`
    Stem,
    /// Names are emitted as written.
    Verbatim,
}

impl Default for Naming {
    fn default() -> Self {
        Naming::Hashed { prefix: String::new() }
    }
}

/// Identifier scope of files that no global extension matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    #[default]
    Local,
    Global,
}

impl From<ScopeMode> for IdentifierScope {
    fn from(mode: ScopeMode) -> Self {
        match mode {
            ScopeMode::Local => IdentifierScope::Local,
            ScopeMode::Global => IdentifierScope::Global,
        }
    }
}

/// Project configuration.
/// 项目配置。
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Relative file paths are taken from here.
    pub root: PathBuf,
    /// Local identifier naming.
    pub naming: Naming,
    /// File name endings that mark a file as globally scoped.
    pub global_extensions: Vec<String>,
    /// Scope of every other file.
    pub default_scope: ScopeMode,
    /// Emit `:import`/`:export` blocks unless the output options say otherwise.
    pub interop: bool,
    /// Endings the default resolver tries after the bare request.
    pub extensions: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            naming: Naming::default(),
            global_extensions: vec![".css".to_string()],
            default_scope: ScopeMode::Local,
            interop: false,
            extensions: vec![".cas".to_string(), ".css".to_string()],
        }
    }
}

impl ProjectConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration; missing keys keep their defaults.
    /// 解析 JSON 配置，缺省的键保持默认值。
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        serde_json::from_str(text).map_err(|e| GraphError::Config(e.to_string()))
    }

    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GraphError::io(path, &e))?;
        Self::from_json(&text)
    }

    /// Set the project root.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the naming scheme.
    pub fn naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Set the endings of globally scoped files.
    pub fn global_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the scope of files no global extension matches.
    pub fn default_scope(mut self, scope: ScopeMode) -> Self {
        self.default_scope = scope;
        self
    }

    /// Emit interop blocks by default.
    pub fn interop(mut self, interop: bool) -> Self {
        self.interop = interop;
        self
    }

    /// Set the endings tried by the default resolver.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// The normalised identity of `path` within the project.
    pub fn locate(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.root.join(path))
        }
    }

    /// `path` relative to the root, with forward slashes.
    /// 相对于项目根目录的路径，使用正斜杠。
    pub fn display_path(&self, path: &Path) -> String {
        let root = normalize_path(&self.root);
        let shown = path.strip_prefix(&root).unwrap_or(path);
        shown.to_string_lossy().replace('\\', "/")
    }

    pub fn scope_for(&self, path: &Path) -> IdentifierScope {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        if self.global_extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            IdentifierScope::Global
        } else {
            self.default_scope.into()
        }
    }

    /// The renaming function for local identifiers of `path`.
    /// 为 `path` 中的局部标识符生成重命名函数。
    pub fn namer_for(&self, path: &Path) -> ClassNamer {
        match &self.naming {
            Naming::Verbatim => Rc::new(str::to_string),
            Naming::Stem => {
                let stem = path
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default()
                    .split('.')
                    .next()
                    .map(sanitize)
                    .unwrap_or_default();
                Rc::new(move |name: &str| format!("{stem}_{name}"))
            }
            Naming::Hashed { prefix } => {
                let prefix = prefix.clone();
                let file = self.display_path(path);
                Rc::new(move |name: &str| {
                    let mut hasher = blake3::Hasher::new();
                    hasher.update(file.as_bytes());
                    hasher.update(b":");
                    hasher.update(name.as_bytes());
                    let hex = hasher.finalize().to_hex();
                    format!("{prefix}{name}_{}", &hex.as_str()[..6])
                })
            }
        }
    }
}

/// Keep characters that may appear in a class name.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.naming, Naming::Hashed { prefix: String::new() });
        assert_eq!(config.global_extensions, vec![".css"]);
        assert_eq!(config.default_scope, ScopeMode::Local);
        assert!(!config.interop);
    }

    #[test]
    fn test_from_json() {
        let config = ProjectConfig::from_json(
            r#"{ "naming": { "kind": "hashed", "prefix": "x-" }, "interop": true, "global-extensions": [".global.cas"] }"#,
        )
        .unwrap();
        assert_eq!(config.naming, Naming::Hashed { prefix: "x-".into() });
        assert!(config.interop);
        assert_eq!(config.extensions, vec![".cas", ".css"]);
        assert!(ProjectConfig::from_json("{ \"naming\": 3 }").is_err());
    }

    #[test]
    fn test_scope_for() {
        let config = ProjectConfig::new().global_extensions([".css", ".global.cas"]);
        assert_eq!(config.scope_for(Path::new("a/reset.css")), IdentifierScope::Global);
        assert_eq!(config.scope_for(Path::new("a/theme.global.cas")), IdentifierScope::Global);
        assert_eq!(config.scope_for(Path::new("a/button.cas")), IdentifierScope::Local);
        let config = config.default_scope(ScopeMode::Global);
        assert_eq!(config.scope_for(Path::new("a/button.cas")), IdentifierScope::Global);
    }

    #[test]
    fn test_namers() {
        let path = Path::new("/p/button.module.cas");
        let config = ProjectConfig::new().root("/p").naming(Naming::Stem);
        assert_eq!((config.namer_for(path))("primary"), "button_primary");

        let config = config.naming(Naming::Verbatim);
        assert_eq!((config.namer_for(path))("primary"), "primary");

        let config = config.naming(Naming::Hashed { prefix: "c-".into() });
        let namer = config.namer_for(path);
        let name = namer("primary");
        assert!(name.starts_with("c-primary_"));
        assert_eq!(name.len(), "c-primary_".len() + 6);
        assert_eq!(name, namer("primary"));
        assert_ne!(name, (config.namer_for(Path::new("/p/other.cas")))("primary"));
    }

    #[test]
    fn test_locate_and_display() {
        let config = ProjectConfig::new().root("/p");
        assert_eq!(config.locate(Path::new("./a/../b.cas")), PathBuf::from("/p/b.cas"));
        assert_eq!(config.display_path(Path::new("/p/x/b.cas")), "x/b.cas");
        assert_eq!(config.display_path(Path::new("/q/b.cas")), "/q/b.cas");
    }
}
