//! Request resolution.
//! 模块请求解析。
//!
//! A request such as `"./theme"` is turned into a file path by an ordered
//! chain of resolvers. The first resolver that answers wins; a resolver may
//! answer at once or hand back a future.
//! 请求（例如 `"./theme"`）由有序的解析器链转换为文件路径，第一个给出结果的解析器生效。

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cascade_common::normalize_path;
use futures::future::LocalBoxFuture;
use tracing::trace;

use crate::SourceLoader;

/// What a resolver knows about the request.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// The requesting file.
    pub from: &'a Path,
    /// The project root.
    pub root: &'a Path,
}

/// A resolver's answer.
/// 解析器的结果。
pub enum Resolution {
    /// `None` passes the request on to the next resolver.
    Ready(Option<PathBuf>),
    Pending(LocalBoxFuture<'static, Option<PathBuf>>),
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Ready(path) => f.debug_tuple("Ready").field(path).finish(),
            Resolution::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Maps a request to a file path.
/// 将请求映射为文件路径。
pub trait Resolver {
    fn resolve(&self, request: &str, ctx: &ResolveContext<'_>) -> Resolution;
}

impl<F> Resolver for F
where
    F: Fn(&str, &ResolveContext<'_>) -> Resolution,
{
    fn resolve(&self, request: &str, ctx: &ResolveContext<'_>) -> Resolution {
        self(request, ctx)
    }
}

/// Wrap a closure as a resolver, fixing its signature for inference.
pub fn resolver_fn<F>(f: F) -> Rc<dyn Resolver>
where
    F: Fn(&str, &ResolveContext<'_>) -> Resolution + 'static,
{
    Rc::new(f)
}

/// The default resolver: the request is a path relative to the requesting
/// file (or absolute). The bare path is tried first, then each extension.
/// 默认解析器：请求是相对于请求文件的路径，先尝试原路径，再依次尝试各扩展名。
pub struct PathResolver {
    loader: Rc<dyn SourceLoader>,
    extensions: Vec<String>,
}

impl PathResolver {
    pub fn new(loader: Rc<dyn SourceLoader>, extensions: Vec<String>) -> Self {
        Self { loader, extensions }
    }

    fn candidates(&self, base: &Path) -> impl Iterator<Item = PathBuf> {
        let bare = std::iter::once(base.to_path_buf());
        let extended = self.extensions.iter().map(move |ext| {
            let mut name = OsString::from(base.as_os_str());
            name.push(ext);
            PathBuf::from(name)
        });
        bare.chain(extended)
    }
}

impl Resolver for PathResolver {
    fn resolve(&self, request: &str, ctx: &ResolveContext<'_>) -> Resolution {
        let dir = ctx.from.parent().unwrap_or(ctx.root);
        let base = normalize_path(&dir.join(request));
        let found = self.candidates(&base).find(|path| self.loader.exists(path));
        trace!(request, found = ?found, "path resolution");
        Resolution::Ready(found)
    }
}

/// Run `request` through `resolvers` in order. Only a pending resolver
/// makes this wait.
/// 依次运行解析器链；只有挂起的解析器才会等待。
pub(crate) async fn resolve_chain(
    resolvers: &[Rc<dyn Resolver>],
    request: &str,
    from: &Path,
    root: &Path,
) -> Option<PathBuf> {
    for resolver in resolvers {
        let answer = {
            let ctx = ResolveContext { from, root };
            resolver.resolve(request, &ctx)
        };
        let found = match answer {
            Resolution::Ready(found) => found,
            Resolution::Pending(future) => future.await,
        };
        if let Some(path) = found {
            return Some(normalize_path(&path));
        }
    }
    None
}
