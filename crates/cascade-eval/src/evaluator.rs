//! Statement evaluation.
//! 语句求值。

use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use cascade_common::Span;
use cascade_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};
use cascade_parser::{ParseError, parse_selector};
use cascade_syntax::{
    AtRule, CallableDecl, ClassScope, ComposeRule, ComposeSource, Declaration, EachRule, ExportRule,
    IfRule, IncludeRule, Interpolation, InterpPart, KeyframesRule, SelectorList, Specifier, SpecifierKind,
    Stmt, StmtKind, StyleRule, Stylesheet, UseKind, UseRule, VariableDecl,
};
use cascade_value::Value;
use tracing::{debug, warn};

use crate::builtins::builtins;
use crate::selector::{expand, rename_classes};
use crate::suggest::nearest;
use crate::{
    Callable, ClassMember, ClassNamer, ClassTable, CssNode, EvalError, EvalResult, FileContext,
    IdentifierScope, Member, MemberKind, MemberTag, ModuleExports, ModuleHost, RuleContext, Scope,
    UserCallable, flatten,
};

/// Nested function and mixin calls allowed before evaluation gives up.
pub(crate) const MAX_CALL_DEPTH: usize = 256;

/// How a block finished.
pub(crate) enum Flow {
    Normal,
    Return(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Debug,
    Warn,
}

/// Output of `@debug` and `@warn`. Never aborts evaluation.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub span: Span,
}

impl Warning {
    /// `@warn` reports as a warning and `@debug` as a note.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (diagnostic, label) = match self.kind {
            WarningKind::Warn => (Diagnostic::warning(DiagnosticKind::Structural, self.span, &self.message), "@warn"),
            WarningKind::Debug => (Diagnostic::note(DiagnosticKind::Structural, self.span, &self.message), "@debug"),
        };
        diagnostic.with_label(Label::new(self.span, label))
    }
}

/// The result of evaluating one file.
/// 单个文件的求值结果。
#[derive(Debug)]
pub struct Evaluated {
    /// Flattened output nodes.
    pub css: Vec<CssNode>,
    pub exports: Rc<ModuleExports>,
    pub warnings: Vec<Warning>,
    /// The file root scope. Call [`Scope::clear`] once the file is dropped.
    pub root: Scope,
}

impl Evaluated {
    pub fn to_css(&self) -> String {
        crate::render(&self.css)
    }
}

/// An `@export` waiting for the end of the file.
enum ExportEntry {
    Resolved(Member),
    Local(Specifier),
}

/// Tree-walking evaluator for one file.
/// 单个文件的树遍历求值器。
pub struct Evaluator<'h> {
    host: &'h dyn ModuleHost,
    pub(crate) file: FileContext,
    pub(crate) classes: ClassTable,
    pub(crate) namespaces: HashMap<String, Rc<ModuleExports>>,
    pub(crate) globals: ModuleExports,
    exports: Vec<ExportEntry>,
    warnings: Vec<Warning>,
    root: Scope,
    pub(crate) call_depth: usize,
    pub(crate) in_function: bool,
    in_keyframes: bool,
}

impl<'h> Evaluator<'h> {
    pub fn new(file: FileContext, host: &'h dyn ModuleHost) -> Self {
        Self {
            host,
            file,
            classes: ClassTable::new(),
            namespaces: HashMap::new(),
            globals: ModuleExports::native(builtins()),
            exports: Vec::new(),
            warnings: Vec::new(),
            root: Scope::root(),
            call_depth: 0,
            in_function: false,
            in_keyframes: false,
        }
    }

    /// Evaluate a whole stylesheet.
    ///
    /// On error the root scope is cleared before returning so closures
    /// captured during evaluation are freed.
    pub fn run(mut self, sheet: &Stylesheet) -> EvalResult<Evaluated> {
        let root = self.root.clone();
        let mut out = Vec::new();
        debug!(file = %self.file.path.display(), "evaluating");
        let outcome = self
            .exec_block(&sheet.stmts, &root, &mut out)
            .and_then(|_| self.build_exports());
        match outcome {
            Ok(exports) => Ok(Evaluated {
                css: flatten(out),
                exports: Rc::new(exports),
                warnings: self.warnings,
                root,
            }),
            Err(error) => {
                root.clear();
                Err(error)
            }
        }
    }

    // ========== Blocks ==========

    pub(crate) fn exec_block(&mut self, stmts: &[Stmt], scope: &Scope, out: &mut Vec<CssNode>) -> EvalResult<Flow> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec(stmt, scope, out).map_err(|e| e.at(stmt.span))? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt, scope: &Scope, out: &mut Vec<CssNode>) -> EvalResult<Flow> {
        let span = stmt.span;
        if self.in_function && emits_css(&stmt.kind) {
            return Err(misplaced(format!("{} is not allowed inside a function", stmt.kind.describe()), span));
        }
        match &stmt.kind {
            StmtKind::Rule(rule) => self.exec_rule(rule, span, scope, out)?,
            StmtKind::Declaration(decl) => self.exec_declaration(decl, span, scope, out)?,
            StmtKind::Variable(var) => self.exec_variable(var, scope)?,
            StmtKind::Use(rule) => {
                self.require_root(&stmt.kind, scope, span)?;
                self.exec_use(rule, scope, span)?;
            }
            StmtKind::Export(rule) => {
                self.require_root(&stmt.kind, scope, span)?;
                self.exec_export(rule, span)?;
            }
            StmtKind::If(rule) => return self.exec_if(rule, scope, out),
            StmtKind::Each(rule) => return self.exec_each(rule, scope, out),
            StmtKind::Function(decl) => self.define(decl, scope, false)?,
            StmtKind::Mixin(decl) => self.define(decl, scope, true)?,
            StmtKind::Include(rule) => self.exec_include(rule, span, scope, out)?,
            StmtKind::Content => match scope.current_content() {
                Some(nodes) => out.extend(nodes.iter().cloned()),
                None => return Err(misplaced("@content is only allowed inside a mixin", span)),
            },
            StmtKind::Return(expr) => {
                if !self.in_function {
                    return Err(misplaced("@return is only allowed inside a function", span));
                }
                return Ok(Flow::Return(self.eval(expr, scope)?));
            }
            StmtKind::Compose(rule) => self.exec_compose(rule, span, scope)?,
            StmtKind::Debug(expr) => self.report(WarningKind::Debug, expr, scope, span)?,
            StmtKind::Warn(expr) => self.report(WarningKind::Warn, expr, scope, span)?,
            StmtKind::Error(expr) => {
                let message = message_text(&self.eval(expr, scope)?);
                return Err(EvalError::User { message, span });
            }
            StmtKind::Keyframes(rule) => self.exec_keyframes(rule, scope, out)?,
            StmtKind::AtRule(rule) => self.exec_at_rule(rule, scope, out)?,
        }
        Ok(Flow::Normal)
    }

    fn require_root(&self, kind: &StmtKind, scope: &Scope, span: Span) -> EvalResult<()> {
        if scope.ptr_eq(&self.root) {
            Ok(())
        } else {
            Err(misplaced(format!("{} is only allowed at the top level of a file", kind.describe()), span))
        }
    }

    // ========== Rules and declarations ==========

    fn exec_rule(&mut self, rule: &StyleRule, span: Span, scope: &Scope, out: &mut Vec<CssNode>) -> EvalResult<()> {
        let body_scope = scope.child(true);
        let selector = if self.in_keyframes {
            body_scope.set_current_rule(Rc::new(RuleContext::Block));
            self.interpolate(&rule.selector, scope)?.trim().to_string()
        } else {
            let parsed = match &rule.parsed {
                Some(parsed) => parsed.clone(),
                None => {
                    let text = self.interpolate(&rule.selector, scope)?;
                    parse_selector(&text).map_err(|error| {
                        EvalError::Syntax(ParseError {
                            span: rule.selector.span,
                            ..error
                        })
                    })?
                }
            };
            let context = self.resolve_selector(&parsed, scope, span)?;
            let css = match &context {
                RuleContext::Style { css, .. } => css.clone(),
                RuleContext::Block => String::new(),
            };
            body_scope.set_current_rule(Rc::new(context));
            css
        };
        let mut children = Vec::new();
        self.exec_block(&rule.body, &body_scope, &mut children)?;
        out.push(CssNode::Rule { selector, children });
        Ok(())
    }

    /// Rename classes, then expand `&` against the enclosing rule.
    fn resolve_selector(&mut self, parsed: &SelectorList, scope: &Scope, span: Span) -> EvalResult<RuleContext> {
        let namer = self.file.namer.clone();
        let inherit: ClassNamer = match self.file.scoping {
            IdentifierScope::Local => namer.clone(),
            IdentifierScope::Global => Rc::new(str::to_string),
        };
        let classes = &mut self.classes;
        let renamed = rename_classes(parsed, &mut |name, class_scope| match class_scope {
            ClassScope::Global => name.to_string(),
            ClassScope::Local => classes.register(name, &*namer),
            ClassScope::Inherit => classes.register(name, &*inherit),
        });

        let parent_rule = scope.current_rule();
        let parent = parent_rule.as_deref().and_then(RuleContext::selector);
        let mut splice = |name: &str, prefix: &str, suffix: &str| match classes.original(name).map(str::to_string) {
            Some(source) => classes.register(&format!("{prefix}{source}{suffix}"), &*inherit),
            None => format!("{prefix}{name}{suffix}"),
        };
        let resolved = expand(&renamed, parent, &mut splice)
            .map_err(|message| EvalError::structural(ErrorCode::InvalidParentSelector, message, span))?;

        let class = match resolved.selectors.as_slice() {
            [single] => single
                .single_class()
                .and_then(|emitted| self.classes.original(emitted))
                .map(str::to_string),
            _ => None,
        };
        Ok(RuleContext::Style {
            css: resolved.to_string(),
            selector: resolved,
            class,
        })
    }

    fn exec_declaration(
        &mut self,
        decl: &Declaration,
        span: Span,
        scope: &Scope,
        out: &mut Vec<CssNode>,
    ) -> EvalResult<()> {
        if scope.current_rule().is_none() {
            return Err(misplaced("declarations are only allowed inside a rule", span));
        }
        let property = self.interpolate(&decl.property, scope)?;
        let value = match &decl.value.kind {
            cascade_syntax::ExprKind::String { text, quote: None } if property.starts_with("--") => {
                self.interpolate(text, scope)?
            }
            _ => {
                let value = self.eval(&decl.value, scope)?;
                let text = value.to_css();
                if value.is_null() || text.is_empty() {
                    return Ok(());
                }
                if self.file.scoping == IdentifierScope::Local && is_animation(&property) {
                    self.classes.rewrite_animation(&text)
                } else {
                    text
                }
            }
        };
        out.push(CssNode::Declaration {
            property,
            value,
            important: decl.important,
        });
        Ok(())
    }

    fn exec_variable(&mut self, var: &VariableDecl, scope: &Scope) -> EvalResult<()> {
        if var.default {
            let existing = if var.global {
                self.root.variable(&var.name)
            } else {
                scope.variable(&var.name)
            };
            if existing.is_some_and(|value| !value.is_null()) {
                return Ok(());
            }
        }
        let value = self.eval(&var.value, scope)?;
        let member = Member::variable(&var.name, value);
        if var.global {
            scope.set_global(member);
            Ok(())
        } else {
            scope.set(member)
        }
    }

    // ========== Control flow ==========

    fn exec_if(&mut self, rule: &IfRule, scope: &Scope, out: &mut Vec<CssNode>) -> EvalResult<Flow> {
        for clause in &rule.clauses {
            if self.eval(&clause.condition, scope)?.is_truthy() {
                return self.exec_block(&clause.body, &scope.child(false), out);
            }
        }
        match &rule.otherwise {
            Some(body) => self.exec_block(body, &scope.child(false), out),
            None => Ok(Flow::Normal),
        }
    }

    fn exec_each(&mut self, rule: &EachRule, scope: &Scope, out: &mut Vec<CssNode>) -> EvalResult<Flow> {
        let source = self.eval(&rule.source, scope)?;
        for item in source.as_items() {
            let iteration = scope.child(false);
            if let [name] = rule.variables.as_slice() {
                iteration.set_local(Member::variable(name, item));
            } else {
                let parts = item.as_items();
                for (i, name) in rule.variables.iter().enumerate() {
                    let value = parts.get(i).cloned().unwrap_or(Value::Null);
                    iteration.set_local(Member::variable(name, value));
                }
            }
            if let Flow::Return(value) = self.exec_block(&rule.body, &iteration, out)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    // ========== Functions and mixins ==========

    fn define(&mut self, decl: &CallableDecl, scope: &Scope, mixin: bool) -> EvalResult<()> {
        let callable = Callable::User(Rc::new(UserCallable {
            name: decl.name.clone(),
            params: decl.params.clone(),
            body: decl.body.clone(),
            closure: scope.clone(),
        }));
        let kind = if mixin {
            MemberKind::Mixin(callable)
        } else {
            MemberKind::Function(callable)
        };
        scope.set(Member::new(&decl.name, kind))
    }

    fn exec_include(&mut self, rule: &IncludeRule, span: Span, scope: &Scope, out: &mut Vec<CssNode>) -> EvalResult<()> {
        let callable = self.lookup_callable(MemberTag::Mixin, rule.namespace.as_deref(), &rule.name, scope, span)?;
        let args = self.eval_args(&rule.args, scope)?;
        let mut content = Vec::new();
        if let Some(body) = &rule.content {
            self.exec_block(body, &scope.child(false), &mut content)?;
        }
        let nodes = self.call_mixin(&callable, args, Rc::new(content), scope, span)?;
        out.extend(nodes);
        Ok(())
    }

    /// Run a mixin body in a fresh child of its defining scope.
    fn call_mixin(
        &mut self,
        callable: &Callable,
        args: crate::CallArgs,
        content: Rc<Vec<CssNode>>,
        caller: &Scope,
        span: Span,
    ) -> EvalResult<Vec<CssNode>> {
        let Callable::User(user) = callable else {
            return Err(EvalError::type_error(format!("`{}` is not a mixin", callable.name())).at(span));
        };
        self.enter(span)?;
        let body_scope = user.closure.child(true);
        if let Some(rule) = caller.current_rule() {
            body_scope.set_current_rule(rule);
        }
        body_scope.set_current_content(content);
        let saved = mem::replace(&mut self.in_function, false);
        let mut nodes = Vec::new();
        let result = self
            .bind_params(user, args, &body_scope)
            .and_then(|()| self.exec_block(&user.body, &body_scope, &mut nodes));
        self.in_function = saved;
        self.call_depth -= 1;
        result.map_err(|e| e.at(span))?;
        Ok(nodes)
    }

    // ========== Classes ==========

    fn exec_compose(&mut self, rule: &ComposeRule, span: Span, scope: &Scope) -> EvalResult<()> {
        let target = match scope.current_rule().as_deref() {
            Some(RuleContext::Style { class: Some(class), .. }) => class.clone(),
            _ => {
                return Err(misplaced("@compose is only allowed in a rule for a single class", span));
            }
        };
        let mut sources = Vec::with_capacity(rule.names.len());
        for name in &rule.names {
            let source = match &rule.source {
                ComposeSource::Local => self.local_class(name, scope, span)?,
                ComposeSource::Global => ClassMember::new(name.clone()),
                ComposeSource::Namespace(namespace) => {
                    let module = self.namespace(namespace, span)?;
                    module_class(&module, name, namespace, span)?
                }
                ComposeSource::Request(request) => {
                    let module = self.load_module(request, span)?;
                    module_class(&module, name, request, span)?
                }
            };
            sources.push(source);
        }
        if let Some(class) = self.classes.get_mut(&target) {
            for source in &sources {
                class.compose(source);
            }
        }
        Ok(())
    }

    /// A class of this file, or one imported by name.
    pub(crate) fn local_class(&self, name: &str, scope: &Scope, span: Span) -> EvalResult<ClassMember> {
        if let Some(class) = self.classes.get(name) {
            return Ok(class.clone());
        }
        if let Some(class) = scope.get(MemberTag::Class, name).as_ref().and_then(Member::as_class) {
            return Ok(class.clone());
        }
        let mut candidates: Vec<String> = self.classes.names().map(str::to_string).collect();
        candidates.extend(scope.get_all(MemberTag::Class));
        Err(EvalError::Undefined {
            kind: MemberTag::Class,
            name: format!(".{name}"),
            suggestion: nearest(name, candidates.iter().map(String::as_str)).map(|s| format!(".{s}")),
            span,
        })
    }

    // ========== Modules ==========

    pub(crate) fn load_module(&self, request: &str, span: Span) -> EvalResult<Rc<ModuleExports>> {
        self.host
            .builtin(request)
            .or_else(|| self.host.module(request))
            .ok_or_else(|| {
                EvalError::module(
                    ErrorCode::UnresolvedRequest,
                    format!("module `{request}` is not available"),
                    span,
                )
            })
    }

    pub(crate) fn namespace(&self, namespace: &str, span: Span) -> EvalResult<Rc<ModuleExports>> {
        self.namespaces.get(namespace).cloned().ok_or_else(|| {
            let mut message = format!("no module is bound to namespace `{namespace}`");
            if let Some(similar) = nearest(namespace, self.namespaces.keys().map(String::as_str)) {
                message.push_str(&format!("; did you mean `{similar}`?"));
            }
            EvalError::module(ErrorCode::UnknownModule, message, span)
        })
    }

    fn exec_use(&mut self, rule: &UseRule, scope: &Scope, span: Span) -> EvalResult<()> {
        let module = self.load_module(&rule.request, span)?;
        match &rule.kind {
            UseKind::Namespace(namespace) => {
                self.namespaces.insert(namespace.clone(), module);
            }
            UseKind::Named(specifiers) => {
                for specifier in specifiers {
                    for member in pick(&module, specifier, &rule.request)? {
                        scope.set_local(member);
                    }
                }
            }
        }
        Ok(())
    }

    fn exec_export(&mut self, rule: &ExportRule, span: Span) -> EvalResult<()> {
        match rule {
            ExportRule::Local(specifiers) => {
                self.exports
                    .extend(specifiers.iter().cloned().map(ExportEntry::Local));
            }
            ExportRule::All { request } => {
                let module = self.load_module(request, span)?;
                for member in module.members() {
                    let member = member.clone().with_origin(module.path.clone());
                    self.exports.push(ExportEntry::Resolved(member));
                }
            }
            ExportRule::Named { request, specifiers } => {
                let module = self.load_module(request, span)?;
                for specifier in specifiers {
                    for member in pick(&module, specifier, request)? {
                        self.exports.push(ExportEntry::Resolved(member));
                    }
                }
            }
        }
        Ok(())
    }

    /// Explicit exports in source order, then every class of the file.
    fn build_exports(&mut self) -> EvalResult<ModuleExports> {
        let mut exports = ModuleExports::new(Some(self.file.path.clone()));
        for entry in mem::take(&mut self.exports) {
            match entry {
                ExportEntry::Resolved(member) => exports.insert(member),
                ExportEntry::Local(specifier) => {
                    for member in self.local_export(&specifier)? {
                        exports.insert(member);
                    }
                }
            }
        }
        for (name, class) in self.classes.iter() {
            exports.insert(Member::new(name, MemberKind::Class(class.clone())));
        }
        Ok(exports)
    }

    fn local_export(&self, specifier: &Specifier) -> EvalResult<Vec<Member>> {
        let root = &self.root;
        let tags: &[MemberTag] = match specifier.kind {
            SpecifierKind::Variable => &[MemberTag::Variable],
            SpecifierKind::Class => &[MemberTag::Class],
            SpecifierKind::Callable => &[MemberTag::Function, MemberTag::Mixin],
        };
        let mut found = Vec::new();
        for &tag in tags {
            let member = match tag {
                MemberTag::Class => self
                    .classes
                    .get(&specifier.name)
                    .map(|class| Member::new(&specifier.name, MemberKind::Class(class.clone())))
                    .or_else(|| root.get(tag, &specifier.name)),
                _ => root.get(tag, &specifier.name),
            };
            found.extend(member.map(|m| m.renamed(specifier.local_name())));
        }
        if found.is_empty() {
            let tag = tags[0];
            let candidates = root.get_all(tag);
            return Err(EvalError::Undefined {
                kind: tag,
                name: tag.display_name(&specifier.name),
                suggestion: nearest(&specifier.name, candidates.iter().map(String::as_str))
                    .map(|s| tag.display_name(&s)),
                span: specifier.span,
            });
        }
        Ok(found)
    }

    // ========== At-rules ==========

    fn exec_keyframes(&mut self, rule: &KeyframesRule, scope: &Scope, out: &mut Vec<CssNode>) -> EvalResult<()> {
        let written = self.interpolate(&rule.name, scope)?.trim().to_string();
        let name = match written.strip_prefix(":global(").and_then(|s| s.strip_suffix(')')) {
            Some(global) => global.trim().to_string(),
            None if self.file.scoping == IdentifierScope::Local => {
                let namer = self.file.namer.clone();
                self.classes.register_keyframes(&written, &*namer)
            }
            None => written,
        };
        let body_scope = scope.child(false);
        body_scope.set_current_rule(Rc::new(RuleContext::Block));
        let saved = mem::replace(&mut self.in_keyframes, true);
        let mut children = Vec::new();
        let result = self.exec_block(&rule.body, &body_scope, &mut children);
        self.in_keyframes = saved;
        result?;
        out.push(CssNode::AtRule {
            name: rule.at_name.clone(),
            prelude: name,
            children: Some(children),
        });
        Ok(())
    }

    /// A passthrough at-rule. Inside a style rule its direct declarations
    /// are wrapped in a copy of that rule.
    fn exec_at_rule(&mut self, rule: &AtRule, scope: &Scope, out: &mut Vec<CssNode>) -> EvalResult<()> {
        let prelude = self.interpolate(&rule.prelude, scope)?.trim().to_string();
        let Some(body) = &rule.body else {
            out.push(CssNode::AtRule {
                name: rule.name.clone(),
                prelude,
                children: None,
            });
            return Ok(());
        };
        let parent = scope.current_rule();
        let body_scope = scope.child(false);
        if parent.is_none() {
            body_scope.set_current_rule(Rc::new(RuleContext::Block));
        }
        let mut inner = Vec::new();
        self.exec_block(body, &body_scope, &mut inner)?;
        let children = match parent.as_deref() {
            Some(RuleContext::Style { css, .. }) => {
                let (declarations, nested): (Vec<_>, Vec<_>) = inner.into_iter().partition(CssNode::is_declaration);
                let mut children = Vec::with_capacity(nested.len() + 1);
                if !declarations.is_empty() {
                    children.push(CssNode::Rule {
                        selector: css.clone(),
                        children: declarations,
                    });
                }
                children.extend(nested);
                children
            }
            _ => inner,
        };
        out.push(CssNode::AtRule {
            name: rule.name.clone(),
            prelude,
            children: Some(children),
        });
        Ok(())
    }

    // ========== Diagnostics ==========

    fn report(&mut self, kind: WarningKind, expr: &cascade_syntax::Expr, scope: &Scope, span: Span) -> EvalResult<()> {
        let message = message_text(&self.eval(expr, scope)?);
        let file = self.file.path.display();
        match kind {
            WarningKind::Debug => debug!(target: "cascade::debug", %file, "{message}"),
            WarningKind::Warn => warn!(target: "cascade::warn", %file, "{message}"),
        }
        self.warnings.push(Warning { kind, message, span });
        Ok(())
    }

    // ========== Interpolation ==========

    pub(crate) fn interpolate(&mut self, text: &Interpolation, scope: &Scope) -> EvalResult<String> {
        let mut out = String::new();
        for part in &text.parts {
            match part {
                InterpPart::Literal(literal) => out.push_str(literal),
                InterpPart::Expr(expr) => match self.eval(expr, scope)? {
                    Value::String(s) => out.push_str(&s.text),
                    Value::Null => {}
                    other => out.push_str(&other.to_css()),
                },
            }
        }
        Ok(out)
    }
}

/// Members a `@use`/`@export … from` specifier names in `module`.
fn pick(module: &ModuleExports, specifier: &Specifier, request: &str) -> EvalResult<Vec<Member>> {
    let tags: &[MemberTag] = match specifier.kind {
        SpecifierKind::Variable => &[MemberTag::Variable],
        SpecifierKind::Class => &[MemberTag::Class],
        SpecifierKind::Callable => &[MemberTag::Function, MemberTag::Mixin],
    };
    let found: Vec<Member> = tags
        .iter()
        .filter_map(|&tag| module.get(tag, &specifier.name))
        .map(|member| {
            member
                .clone()
                .with_origin(module.path.clone())
                .renamed(specifier.local_name())
        })
        .collect();
    if found.is_empty() {
        let tag = tags[0];
        let display = tag.display_name(&specifier.name);
        let mut message = format!("module `{request}` does not export `{display}`");
        let names = module.names(tag);
        if let Some(similar) = nearest(&specifier.name, names.iter().map(String::as_str)) {
            message.push_str(&format!("; did you mean `{}`?", tag.display_name(&similar)));
        }
        return Err(EvalError::module(ErrorCode::MissingExport, message, specifier.span));
    }
    Ok(found)
}

fn module_class(module: &ModuleExports, name: &str, source: &str, span: Span) -> EvalResult<ClassMember> {
    module
        .get(MemberTag::Class, name)
        .and_then(Member::as_class)
        .cloned()
        .ok_or_else(|| {
            EvalError::module(
                ErrorCode::MissingExport,
                format!("`{source}` does not export class `.{name}`"),
                span,
            )
        })
}

fn misplaced(message: impl Into<String>, span: Span) -> EvalError {
    EvalError::structural(ErrorCode::MisplacedDirective, message, span)
}

/// Statements that only make sense while producing CSS.
fn emits_css(kind: &StmtKind) -> bool {
    matches!(
        kind,
        StmtKind::Rule(_)
            | StmtKind::Declaration(_)
            | StmtKind::Include(_)
            | StmtKind::Content
            | StmtKind::Compose(_)
            | StmtKind::Keyframes(_)
            | StmtKind::AtRule(_)
    )
}

/// `animation` and `animation-name`, vendor prefixes included.
fn is_animation(property: &str) -> bool {
    let unprefixed = match property.strip_prefix('-') {
        Some(rest) => rest.split_once('-').map_or(property, |(_, name)| name),
        None => property,
    };
    unprefixed == "animation" || unprefixed == "animation-name"
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.text.clone(),
        other => other.inspect(),
    }
}
