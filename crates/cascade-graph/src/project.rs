//! The project: files, dependency edges and the incremental driver.
//! 项目：文件、依赖边以及增量驱动。
//!
//! `add` walks a file and everything it depends on, then evaluates the
//! files that have no result yet, dependencies first. Walks are memoised by
//! path in a map of shared futures so that a file requested from two places
//! at once is loaded and parsed once.
//! `add` 遍历文件及其全部依赖，然后按依赖优先的顺序求值尚无结果的文件。

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cascade_common::{Span, path_key};
use cascade_diagnostic::{Diagnostic, DiagnosticKind};
use cascade_eval::{FileContext, ModuleExports, ModuleHost, Warning};
use cascade_syntax::Stylesheet;
use futures::FutureExt;
use futures::future::{self, LocalBoxFuture, Shared};
use tracing::{debug, instrument, warn};

use crate::error::locate;
use crate::node::{FileNode, FileOutput};
use crate::output::{self, OutputOptions};
use crate::resolve::resolve_chain;
use crate::{ContentHash, FsLoader, GraphError, GraphStats, PathResolver, ProjectConfig, Resolver, SourceLoader};

type Walk = Shared<LocalBoxFuture<'static, Result<(), GraphError>>>;

/// Two spellings of one file on a case-insensitive filesystem.
/// 大小写不同但指向同一文件的两个路径。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePath {
    pub first: PathBuf,
    pub second: PathBuf,
}

impl DuplicatePath {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::warning(DiagnosticKind::Resolution, Span::DUMMY, "two paths differ only in case")
            .with_note(format!("first seen as {}", self.first.display()))
            .with_note(format!("then as {}", self.second.display()))
    }
}

#[derive(Default)]
struct Graph {
    files: BTreeMap<PathBuf, FileNode>,
    /// Reverse edges: file -> files that import it.
    dependents: HashMap<PathBuf, BTreeSet<PathBuf>>,
    in_flight: HashMap<PathBuf, Walk>,
    spellings: HashMap<String, PathBuf>,
    duplicates: Vec<DuplicatePath>,
    stats: GraphStats,
}

impl Graph {
    /// A chain of imports leading from `from` to `to`, following only files
    /// whose imports are current.
    fn route(&self, from: &Path, to: &Path) -> Option<Vec<PathBuf>> {
        let mut stack = vec![vec![from.to_path_buf()]];
        let mut seen = HashSet::new();
        while let Some(trail) = stack.pop() {
            let at = trail.last()?.clone();
            if at == to {
                return Some(trail);
            }
            if !seen.insert(at.clone()) {
                continue;
            }
            let Some(node) = self.files.get(&at).filter(|node| node.valid) else {
                continue;
            };
            for next in node.dependencies() {
                let mut longer = trail.clone();
                longer.push(next);
                stack.push(longer);
            }
        }
        None
    }

    /// `entry` and everything it depends on, dependencies first.
    fn dependency_order(&self, entry: &Path) -> Vec<PathBuf> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        self.visit(entry, &mut seen, &mut order);
        order
    }

    fn visit(&self, path: &Path, seen: &mut HashSet<PathBuf>, order: &mut Vec<PathBuf>) {
        if !seen.insert(path.to_path_buf()) {
            return;
        }
        if let Some(node) = self.files.get(path) {
            for dep in node.dependencies() {
                self.visit(&dep, seen, order);
            }
        }
        order.push(path.to_path_buf());
    }

    fn note_spelling(&mut self, path: &Path) {
        let key = path_key(path);
        match self.spellings.get(&key) {
            Some(first) if first != path => {
                let duplicate = DuplicatePath {
                    first: first.clone(),
                    second: path.to_path_buf(),
                };
                if !self.duplicates.contains(&duplicate) {
                    warn!(
                        first = %duplicate.first.display(),
                        second = %duplicate.second.display(),
                        "two paths differ only in case"
                    );
                    self.duplicates.push(duplicate);
                }
            }
            Some(_) => {}
            None => {
                self.spellings.insert(key, path.to_path_buf());
            }
        }
    }
}

/// Module exports visible to one file while it is evaluated.
struct Imports {
    modules: HashMap<String, Rc<ModuleExports>>,
}

impl ModuleHost for Imports {
    fn builtin(&self, name: &str) -> Option<Rc<ModuleExports>> {
        cascade_std::module(name)
    }

    fn module(&self, request: &str) -> Option<Rc<ModuleExports>> {
        self.modules.get(request).cloned()
    }
}

struct Inner {
    config: ProjectConfig,
    loader: Rc<dyn SourceLoader>,
    /// Project resolvers followed by the default path resolver.
    resolvers: Vec<Rc<dyn Resolver>>,
    graph: RefCell<Graph>,
}

/// Builder for [`Project`].
pub struct ProjectBuilder {
    config: ProjectConfig,
    loader: Rc<dyn SourceLoader>,
    resolvers: Vec<Rc<dyn Resolver>>,
}

impl ProjectBuilder {
    /// Replace the filesystem loader.
    pub fn loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Rc::new(loader);
        self
    }

    /// Append a project resolver. Project resolvers run in the order they
    /// were added, before the default path resolver.
    pub fn resolver(mut self, resolver: Rc<dyn Resolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn build(self) -> Project {
        let mut resolvers = self.resolvers;
        resolvers.push(Rc::new(PathResolver::new(
            self.loader.clone(),
            self.config.extensions.clone(),
        )));
        Project {
            inner: Rc::new(Inner {
                config: self.config,
                loader: self.loader,
                resolvers,
                graph: RefCell::new(Graph::default()),
            }),
        }
    }
}

/// A set of files and their dependency graph. Cloning shares the project.
/// 文件集合及其依赖图；克隆共享同一项目。
#[derive(Clone)]
pub struct Project {
    inner: Rc<Inner>,
}

impl Project {
    /// A project reading from the filesystem.
    pub fn new(config: ProjectConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: ProjectConfig) -> ProjectBuilder {
        ProjectBuilder {
            config,
            loader: Rc::new(FsLoader),
            resolvers: Vec::new(),
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.inner.config
    }

    /// Register or refresh `path` and evaluate it with everything it
    /// depends on. `content` replaces what the loader would read. Adding an
    /// unchanged, valid file does nothing.
    /// 注册或刷新文件并求值其全部依赖；未变化且有效的文件不会重复处理。
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn add(&self, path: impl AsRef<Path>, content: Option<&str>) -> Result<(), GraphError> {
        let path = self.inner.config.locate(path.as_ref());
        let content = content.map(str::to_owned);
        if let Some(text) = &content {
            let hash = ContentHash::of(text);
            let known = self.inner.graph.borrow().files.get(&path).and_then(|node| node.hash);
            match known {
                Some(old) if old == hash => {
                    if let Some(node) = self.inner.graph.borrow_mut().files.get_mut(&path) {
                        node.pinned = true;
                    }
                }
                Some(_) => {
                    self.invalidate(&path);
                }
                None => {}
            }
        }
        self.walk(path.clone(), content).await?;
        self.process(&path)
    }

    /// Mark `path` and every file that transitively imports it as stale.
    /// Returns the stale files.
    /// 将文件及其所有传递依赖方标记为过期。
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn invalidate(&self, path: impl AsRef<Path>) -> Vec<PathBuf> {
        let path = self.inner.config.locate(path.as_ref());
        let mut graph = self.inner.graph.borrow_mut();
        let mut stale = BTreeSet::new();
        let mut worklist = vec![path];
        while let Some(next) = worklist.pop() {
            if !stale.insert(next.clone()) {
                continue;
            }
            if let Some(node) = graph.files.get_mut(&next) {
                node.valid = false;
                node.discard_output();
            }
            if let Some(dependents) = graph.dependents.get(&next) {
                worklist.extend(dependents.iter().cloned());
            }
        }
        debug!(count = stale.len(), "invalidated");
        stale.into_iter().collect()
    }

    /// Start or join the walk of `path`.
    fn walk(&self, path: PathBuf, content: Option<String>) -> Walk {
        let mut graph = self.inner.graph.borrow_mut();
        if let Some(walk) = graph.in_flight.get(&path) {
            return walk.clone();
        }
        if graph.files.get(&path).is_some_and(|node| node.valid) {
            graph.stats.cache_hits += 1;
            return future::ready(Ok(())).boxed_local().shared();
        }
        let project = self.clone();
        let key = path.clone();
        let walk = async move {
            let result = project.walk_file(&key, content).await;
            let mut graph = project.inner.graph.borrow_mut();
            graph.in_flight.remove(&key);
            if result.is_err()
                && let Some(node) = graph.files.get_mut(&key)
            {
                node.valid = false;
            }
            result
        }
        .boxed_local()
        .shared();
        graph.in_flight.insert(path, walk.clone());
        walk
    }

    async fn walk_file(&self, path: &Path, content: Option<String>) -> Result<(), GraphError> {
        debug!(path = %path.display(), "walking");
        let pinned_source = {
            let mut graph = self.inner.graph.borrow_mut();
            graph.stats.walks += 1;
            graph
                .files
                .get(path)
                .filter(|node| node.pinned)
                .and_then(|node| node.source.clone())
        };
        let pinned = content.is_some() || pinned_source.is_some();
        let source: Rc<str> = match (content, pinned_source) {
            (Some(text), _) => text.into(),
            (None, Some(source)) => source,
            (None, None) => {
                let loaded = self.inner.loader.load(path).await;
                loaded.map_err(|e| GraphError::io(path, &e))?.into()
            }
        };
        let (hash, sheet) = self.parse(path, &source)?;

        let mut requests = sheet.requests();
        let mut seen = HashSet::new();
        requests.retain(|(request, _)| !cascade_std::is_builtin(request) && seen.insert(request.clone()));
        let root = &self.inner.config.root;
        let lookups = requests
            .iter()
            .map(|(request, _)| resolve_chain(&self.inner.resolvers, request, path, root));
        let found = future::join_all(lookups).await;

        let mut imports: Vec<(String, PathBuf)> = Vec::with_capacity(requests.len());
        for ((request, span), resolved) in requests.into_iter().zip(found) {
            let Some(resolved) = resolved else {
                return Err(GraphError::Unresolved {
                    request,
                    file: path.to_path_buf(),
                    location: locate(&source, span),
                });
            };
            imports.push((request, resolved));
        }

        let deps = self.register(path, source, hash, sheet, imports, pinned)?;
        // Every sibling runs to completion so that each one leaves `in_flight`.
        let walks: Vec<Walk> = deps.into_iter().map(|dep| self.walk(dep, None)).collect();
        future::join_all(walks).await.into_iter().collect()
    }

    /// Parse `source`, reusing the previous tree when the hash is unchanged.
    fn parse(&self, path: &Path, source: &str) -> Result<(ContentHash, Rc<Stylesheet>), GraphError> {
        let hash = ContentHash::of(source);
        {
            let graph = self.inner.graph.borrow();
            if let Some(node) = graph.files.get(path)
                && node.hash == Some(hash)
                && let Some(sheet) = &node.sheet
            {
                return Ok((hash, sheet.clone()));
            }
        }
        self.inner.graph.borrow_mut().stats.parses += 1;
        let sheet = cascade_parser::parse(source).map_err(|e| GraphError::parse(path, source, e))?;
        Ok((hash, Rc::new(sheet)))
    }

    /// Record the walked state of `path` and its edges. Returns the
    /// dependencies to walk next.
    fn register(
        &self,
        path: &Path,
        source: Rc<str>,
        hash: ContentHash,
        sheet: Rc<Stylesheet>,
        imports: Vec<(String, PathBuf)>,
        pinned: bool,
    ) -> Result<Vec<PathBuf>, GraphError> {
        let mut graph = self.inner.graph.borrow_mut();
        graph.note_spelling(path);

        let scope = self.inner.config.scope_for(path);
        let mut node = FileNode::new(scope);
        node.imports = imports;
        let deps = node.dependencies();
        for dep in &deps {
            if let Some(trail) = graph.route(dep, path) {
                let mut chain = vec![path.to_path_buf()];
                chain.extend(trail);
                return Err(GraphError::Cycle {
                    file: path.to_path_buf(),
                    chain,
                });
            }
        }

        if let Some(mut old) = graph.files.remove(path) {
            old.discard_output();
            for dep in old.dependencies() {
                if let Some(set) = graph.dependents.get_mut(&dep) {
                    set.remove(path);
                }
            }
        }
        for dep in &deps {
            graph
                .dependents
                .entry(dep.clone())
                .or_default()
                .insert(path.to_path_buf());
        }

        node.valid = true;
        node.pinned = pinned;
        node.source = Some(source);
        node.hash = Some(hash);
        node.sheet = Some(sheet);
        debug!(path = %path.display(), dependencies = deps.len(), "registered");
        graph.files.insert(path.to_path_buf(), node);
        Ok(deps)
    }

    /// Evaluate `entry` and its dependencies that have no result yet.
    fn process(&self, entry: &Path) -> Result<(), GraphError> {
        let order = self.inner.graph.borrow().dependency_order(entry);
        for path in order {
            let done = self
                .inner
                .graph
                .borrow()
                .files
                .get(&path)
                .is_some_and(|node| node.output.is_some());
            if !done {
                self.evaluate(&path)?;
            }
        }
        Ok(())
    }

    fn evaluate(&self, path: &Path) -> Result<(), GraphError> {
        let (sheet, source, context, host) = {
            let graph = self.inner.graph.borrow();
            let Some(node) = graph.files.get(path) else {
                return Ok(());
            };
            let (Some(sheet), Some(source)) = (node.sheet.clone(), node.source.clone()) else {
                return Ok(());
            };
            let modules = node
                .imports
                .iter()
                .filter_map(|(request, dep)| {
                    let exports = graph.files.get(dep)?.output.as_ref()?.exports.clone();
                    Some((request.clone(), exports))
                })
                .collect();
            let context = FileContext::new(path, node.scope, self.inner.config.namer_for(path));
            (sheet, source, context, Imports { modules })
        };

        debug!(path = %path.display(), "evaluating");
        let result = cascade_eval::evaluate(&sheet, context, &host);
        let mut graph = self.inner.graph.borrow_mut();
        graph.stats.evaluations += 1;
        let evaluated = result.map_err(|e| GraphError::eval(path, &source, e))?;
        if let Some(node) = graph.files.get_mut(path) {
            node.output = Some(FileOutput {
                css: evaluated.to_css(),
                exports: evaluated.exports,
                warnings: evaluated.warnings,
                root: evaluated.root,
            });
        }
        Ok(())
    }

    /// Concatenated CSS of the selected files, dependencies first.
    /// 按依赖优先顺序拼接所选文件的 CSS。
    #[instrument(skip_all)]
    pub fn output(&self, options: &OutputOptions) -> String {
        let graph = self.inner.graph.borrow();
        let selected: BTreeSet<PathBuf> = match &options.files {
            Some(files) => files
                .iter()
                .flat_map(|file| graph.dependency_order(&self.inner.config.locate(file)))
                .collect(),
            None => graph.files.keys().cloned().collect(),
        };
        let edges: BTreeMap<PathBuf, Vec<PathBuf>> = selected
            .iter()
            .filter_map(|path| {
                let node = graph.files.get(path)?;
                node.output.as_ref()?;
                Some((path.clone(), node.dependencies()))
            })
            .collect();

        let interop = options.interop.unwrap_or(self.inner.config.interop);
        let mut sections = Vec::new();
        for tier in output::tiers(&edges) {
            for path in tier {
                let Some(node) = graph.files.get(&path) else { continue };
                let Some(result) = &node.output else { continue };
                let block = interop.then(|| output::interop_block(&node.imports, &result.exports));
                let label = self.inner.config.display_path(&path);
                sections.push(output::section(&label, block.as_deref(), &result.css));
            }
        }
        sections.join("\n")
    }

    /// `:import`/`:export` blocks for `path`.
    pub fn interop(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.inner.config.locate(path.as_ref());
        let graph = self.inner.graph.borrow();
        let node = graph.files.get(&path)?;
        let result = node.output.as_ref()?;
        Some(output::interop_block(&node.imports, &result.exports))
    }

    /// Exports of an evaluated file.
    pub fn exports(&self, path: impl AsRef<Path>) -> Option<Rc<ModuleExports>> {
        self.with_output(path, |output| output.exports.clone())
    }

    /// CSS of an evaluated file.
    pub fn css(&self, path: impl AsRef<Path>) -> Option<String> {
        self.with_output(path, |output| output.css.clone())
    }

    /// `@debug` and `@warn` output of an evaluated file.
    pub fn warnings(&self, path: impl AsRef<Path>) -> Vec<Warning> {
        self.with_output(path, |output| output.warnings.clone())
            .unwrap_or_default()
    }

    /// Resolved dependencies of `path` in import order.
    pub fn imports(&self, path: impl AsRef<Path>) -> Vec<PathBuf> {
        self.with_node(path, FileNode::dependencies).unwrap_or_default()
    }

    /// Files that import `path` directly.
    pub fn dependents(&self, path: impl AsRef<Path>) -> Vec<PathBuf> {
        let path = self.inner.config.locate(path.as_ref());
        let graph = self.inner.graph.borrow();
        graph
            .dependents
            .get(&path)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `path` was walked and has not been invalidated since.
    pub fn is_valid(&self, path: impl AsRef<Path>) -> bool {
        self.with_node(path, |node| node.valid).unwrap_or(false)
    }

    /// Every known file, in path order.
    pub fn files(&self) -> Vec<PathBuf> {
        self.inner.graph.borrow().files.keys().cloned().collect()
    }

    pub fn stats(&self) -> GraphStats {
        self.inner.graph.borrow().stats
    }

    /// Paths seen that differ only in case.
    pub fn duplicate_paths(&self) -> Vec<DuplicatePath> {
        self.inner.graph.borrow().duplicates.clone()
    }

    fn with_node<T>(&self, path: impl AsRef<Path>, f: impl FnOnce(&FileNode) -> T) -> Option<T> {
        let path = self.inner.config.locate(path.as_ref());
        self.inner.graph.borrow().files.get(&path).map(f)
    }

    fn with_output<T>(&self, path: impl AsRef<Path>, f: impl FnOnce(&FileOutput) -> T) -> Option<T> {
        self.with_node(path, |node| node.output.as_ref().map(f)).flatten()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for node in self.graph.get_mut().files.values_mut() {
            node.discard_output();
        }
    }
}

#[cfg(test)]
mod tests {
    use cascade_diagnostic::ErrorCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{MemoryLoader, Naming, Resolution, resolver_fn};

    fn project(files: &[(&str, &str)]) -> (Project, MemoryLoader) {
        crate::init_tracing();
        let loader = MemoryLoader::new();
        for (path, source) in files {
            loader.insert(format!("/p/{path}"), *source);
        }
        let config = ProjectConfig::new().root("/p").naming(Naming::Verbatim);
        let project = Project::builder(config).loader(loader.clone()).build();
        (project, loader)
    }

    #[tokio::test]
    async fn test_single_file() {
        let (project, _) = project(&[("a.cas", "$x: 2px; .a { width: $x * 2; }")]);
        project.add("a.cas", None).await.unwrap();
        assert_eq!(project.css("a.cas").unwrap(), ".a {\n  width: 4px;\n}\n");
        assert_eq!(project.stats().evaluations, 1);
        assert!(project.is_valid("/p/a.cas"));
    }

    #[tokio::test]
    async fn test_diamond_is_walked_once() {
        let (project, _) = project(&[
            ("a.cas", "@use \"./b\"; @use \"./c\"; .a { x: b.$v + c.$v; }"),
            ("b.cas", "@use \"./c\"; $v: c.$v * 2; @export $v;"),
            ("c.cas", "$v: 1px; @export $v;"),
        ]);
        project.add("a.cas", None).await.unwrap();
        let stats = project.stats();
        assert_eq!(stats.walks, 3);
        assert_eq!(stats.parses, 3);
        assert_eq!(stats.evaluations, 3);
        assert_eq!(project.css("a.cas").unwrap(), ".a {\n  x: 3px;\n}\n");
        assert_eq!(
            project.imports("a.cas"),
            vec![PathBuf::from("/p/b.cas"), PathBuf::from("/p/c.cas")]
        );
        assert_eq!(
            project.dependents("c.cas"),
            vec![PathBuf::from("/p/a.cas"), PathBuf::from("/p/b.cas")]
        );
    }

    #[tokio::test]
    async fn test_invalidation_reprocesses_stale_subgraph() {
        let (project, loader) = project(&[
            ("a.cas", "@use \"./b\"; @use \"./c\"; .a { x: b.$v; y: c.$v; }"),
            ("b.cas", "@use \"./c\"; $v: c.$v * 2; @export $v;"),
            ("c.cas", "$v: 1px; @export $v;"),
        ]);
        project.add("a.cas", None).await.unwrap();
        let c_exports = project.exports("c.cas").unwrap();

        let stale = project.invalidate("b.cas");
        assert_eq!(stale, vec![PathBuf::from("/p/a.cas"), PathBuf::from("/p/b.cas")]);
        assert!(project.is_valid("c.cas"));
        assert!(!project.is_valid("a.cas"));

        loader.insert("/p/b.cas", "@use \"./c\"; $v: c.$v * 3; @export $v;");
        project.add("a.cas", None).await.unwrap();
        let stats = project.stats();
        assert_eq!(stats.walks, 5);
        assert_eq!(stats.parses, 4);
        assert_eq!(stats.evaluations, 5);
        assert!(Rc::ptr_eq(&c_exports, &project.exports("c.cas").unwrap()));
        assert_eq!(project.css("a.cas").unwrap(), ".a {\n  x: 3px;\n  y: 1px;\n}\n");
    }

    #[tokio::test]
    async fn test_adding_unchanged_content_is_idempotent() {
        let (project, _) = project(&[]);
        project.add("a.cas", Some(".a { b: c; }")).await.unwrap();
        project.add("a.cas", Some(".a { b: c; }")).await.unwrap();
        let stats = project.stats();
        assert_eq!((stats.walks, stats.evaluations, stats.cache_hits), (1, 1, 1));

        project.add("a.cas", Some(".a { b: d; }")).await.unwrap();
        assert_eq!(project.stats().evaluations, 2);
        assert_eq!(project.css("a.cas").unwrap(), ".a {\n  b: d;\n}\n");
    }

    #[tokio::test]
    async fn test_unresolved_request_names_file() {
        let (project, _) = project(&[("a.cas", ".a { b: c; }\n@use \"./missing\";")]);
        let err = project.add("a.cas", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnresolvedRequest);
        assert_eq!(err.file(), Some(Path::new("/p/a.cas")));
        assert_eq!(err.location().map(|l| l.line), Some(2));
        assert!(err.to_string().contains("./missing"));
        assert!(project.css("a.cas").is_none());
    }

    #[tokio::test]
    async fn test_first_unresolved_request_in_source_order_is_reported() {
        let (project, _) = project(&[
            ("a.cas", "@use \"./b\";\n@use \"./gone\";\n@use \"./lost\";"),
            ("b.cas", "$v: 1; @export $v;"),
        ]);
        let err = project.add("a.cas", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnresolvedRequest);
        assert_eq!(err.location().map(|l| l.line), Some(2));
        assert!(err.to_string().contains("./gone"));
    }

    #[tokio::test]
    async fn test_cycle_is_rejected() {
        let (project, _) = project(&[
            ("a.cas", "@use \"./b\";"),
            ("b.cas", "@use \"./c\";"),
            ("c.cas", "@use \"./a\";"),
        ]);
        let err = project.add("a.cas", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CircularDependency);
        let GraphError::Cycle { chain, .. } = &err else {
            panic!("expected a cycle, got {err}");
        };
        assert_eq!(chain.first(), chain.last());
        assert_eq!(chain.len(), 4);
        assert!(!project.is_valid("a.cas"));
    }

    #[tokio::test]
    async fn test_self_import_is_a_cycle() {
        let (project, _) = project(&[("a.cas", "@use \"./a\";")]);
        let err = project.add("a.cas", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CircularDependency);
    }

    #[tokio::test]
    async fn test_pending_resolver_and_builtins() {
        let loader = MemoryLoader::new()
            .with("/p/a.cas", "@use \"math\"; @use \"theme\" as t; .a { w: math.abs(t.$w); }")
            .with("/lib/theme.cas", "$w: -3px; @export $w;");
        let remote = resolver_fn(|request, _| match request {
            "theme" => Resolution::Pending(
                async { Some(PathBuf::from("/lib/theme.cas")) }.boxed_local(),
            ),
            _ => Resolution::Ready(None),
        });
        let config = ProjectConfig::new().root("/p").naming(Naming::Verbatim);
        let project = Project::builder(config).loader(loader).resolver(remote).build();
        project.add("a.cas", None).await.unwrap();
        assert_eq!(project.css("a.cas").unwrap(), ".a {\n  w: 3px;\n}\n");
        assert_eq!(project.imports("a.cas"), vec![PathBuf::from("/lib/theme.cas")]);
    }

    #[tokio::test]
    async fn test_evaluation_error_is_tagged_with_file() {
        let (project, _) = project(&[
            ("a.cas", "@use \"./b\";\n.a { x: b.$nope; }"),
            ("b.cas", "$yes: 1; @export $yes;"),
        ]);
        let err = project.add("a.cas", None).await.unwrap_err();
        assert_eq!(err.file(), Some(Path::new("/p/a.cas")));
        assert_eq!(err.location().map(|l| l.line), Some(2));
        assert!(project.css("b.cas").is_some());
        assert!(project.css("a.cas").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_paths_warn() {
        let (project, _) = project(&[]);
        project.add("Theme.cas", Some("$a: 1;")).await.unwrap();
        project.add("theme.cas", Some("$a: 1;")).await.unwrap();
        assert_eq!(
            project.duplicate_paths(),
            vec![DuplicatePath {
                first: "/p/Theme.cas".into(),
                second: "/p/theme.cas".into(),
            }]
        );
        let diagnostic = project.duplicate_paths()[0].to_diagnostic();
        assert!(!diagnostic.is_error());
        assert_eq!(diagnostic.notes, vec!["first seen as /p/Theme.cas", "then as /p/theme.cas"]);
    }

    struct CountedLoader {
        files: MemoryLoader,
        _token: Rc<()>,
    }

    impl SourceLoader for CountedLoader {
        fn load(&self, path: &Path) -> LocalBoxFuture<'static, std::io::Result<String>> {
            self.files.load(path)
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.exists(path)
        }
    }

    #[tokio::test]
    async fn test_failed_sibling_leaves_no_pending_walks() {
        let token = Rc::new(());
        let files = MemoryLoader::new()
            .with("/p/a.cas", "@use \"./b\"; @use \"./c\"; .a { x: 1; }")
            .with("/p/b.cas", ".x {")
            .with("/p/c.cas", "$v: 1px; @export $v;");
        let config = ProjectConfig::new().root("/p").naming(Naming::Verbatim);
        let project = Project::builder(config)
            .loader(CountedLoader { files: files.clone(), _token: token.clone() })
            .build();

        assert!(project.add("a.cas", None).await.is_err());
        assert!(project.inner.graph.borrow().in_flight.is_empty());
        assert!(project.is_valid("/p/c.cas"));

        files.insert("/p/b.cas", ".x { y: 1; }");
        project.add("a.cas", None).await.unwrap();
        assert_eq!(project.css("a.cas").unwrap(), ".a {\n  x: 1;\n}\n");
        assert_eq!(project.css("b.cas").unwrap(), ".x {\n  y: 1;\n}\n");

        drop(project);
        assert_eq!(Rc::strong_count(&token), 1);
    }
}
