//! Top-level AST definitions.
//! 顶层 AST 定义。

use std::rc::Rc;

use crate::{ArgList, Expr, Interpolation, SelectorList};
use cascade_common::Span;

/// A complete stylesheet.
/// 完整的样式表。
#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A statement.
/// 语句。
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Kind of statement.
/// 语句的类型。
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `selector { ... }` / 样式规则
    Rule(StyleRule),
    /// `prop: value;` / 声明
    Declaration(Declaration),
    /// `$name: value;` / 变量赋值
    Variable(VariableDecl),
    /// `@use "path" as ns;` / 模块引用
    Use(UseRule),
    /// `@export ...;` / 导出
    Export(ExportRule),
    /// `@if ... @else if ... @else` / 条件分支
    If(IfRule),
    /// `@each $x in list { }` / 迭代
    Each(EachRule),
    /// `@function name(params) { }` / 函数定义
    Function(CallableDecl),
    /// `@mixin name(params) { }` / 混入定义
    Mixin(CallableDecl),
    /// `@include name(args) { }` / 混入调用
    Include(IncludeRule),
    /// `@content;` / 内容插入
    Content,
    /// `@return expr;` / 返回
    Return(Expr),
    /// `@compose a, b from source;` / 类组合
    Compose(ComposeRule),
    /// `@debug expr;`
    Debug(Expr),
    /// `@warn expr;`
    Warn(Expr),
    /// `@error expr;`
    Error(Expr),
    /// `@keyframes name { }` / 关键帧
    Keyframes(KeyframesRule),
    /// Any other at-rule, passed through. / 其他透传的 at 规则
    AtRule(AtRule),
}

impl StmtKind {
    /// Name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            StmtKind::Rule(_) => "style rule",
            StmtKind::Declaration(_) => "declaration",
            StmtKind::Variable(_) => "variable",
            StmtKind::Use(_) => "@use",
            StmtKind::Export(_) => "@export",
            StmtKind::If(_) => "@if",
            StmtKind::Each(_) => "@each",
            StmtKind::Function(_) => "@function",
            StmtKind::Mixin(_) => "@mixin",
            StmtKind::Include(_) => "@include",
            StmtKind::Content => "@content",
            StmtKind::Return(_) => "@return",
            StmtKind::Compose(_) => "@compose",
            StmtKind::Debug(_) => "@debug",
            StmtKind::Warn(_) => "@warn",
            StmtKind::Error(_) => "@error",
            StmtKind::Keyframes(_) => "@keyframes",
            StmtKind::AtRule(_) => "at-rule",
        }
    }
}

/// A style rule.
/// 样式规则。
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// Raw selector text, possibly interpolated. / 原始选择器文本，可能含插值。
    pub selector: Interpolation,
    /// Pre-parsed selector when the text has no interpolation.
    /// 无插值时预先解析的选择器。
    pub parsed: Option<SelectorList>,
    pub body: Vec<Stmt>,
}

/// A property declaration.
/// 属性声明。
#[derive(Debug, Clone)]
pub struct Declaration {
    pub property: Interpolation,
    pub value: Expr,
    pub important: bool,
}

/// A variable assignment.
/// 变量赋值。
#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    pub value: Expr,
    /// `!default`: only assign when unset or null. / 仅在未设置或为 null 时赋值
    pub default: bool,
    /// `!global`: assign in the file root scope. / 在文件根作用域赋值
    pub global: bool,
}

/// What kind of member a specifier names.
/// 说明符引用的成员类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecifierKind {
    /// `$name`
    Variable,
    /// `.name`
    Class,
    /// `name` — a function and/or a mixin. / 函数和/或混入
    Callable,
}

/// A named import/export specifier, e.g. `$a as $b`.
/// 具名导入/导出说明符。
#[derive(Debug, Clone)]
pub struct Specifier {
    pub kind: SpecifierKind,
    pub name: String,
    pub alias: Option<String>,
    pub span: Span,
}

impl Specifier {
    /// The name the specifier binds locally.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// `@use` rule.
#[derive(Debug, Clone)]
pub struct UseRule {
    pub request: String,
    pub kind: UseKind,
}

#[derive(Debug, Clone)]
pub enum UseKind {
    /// `@use "x" [as ns];`
    Namespace(String),
    /// `@use { a, $b } from "x";`
    Named(Vec<Specifier>),
}

/// `@export` rule.
#[derive(Debug, Clone)]
pub enum ExportRule {
    /// `@export $a, .b, c;`
    Local(Vec<Specifier>),
    /// `@export * from "x";`
    All { request: String },
    /// `@export { a, b } from "x";`
    Named {
        request: String,
        specifiers: Vec<Specifier>,
    },
}

/// `@if` rule with its `@else if` / `@else` chain.
#[derive(Debug, Clone)]
pub struct IfRule {
    pub clauses: Vec<IfClause>,
    pub otherwise: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone)]
pub struct IfClause {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

/// `@each` rule.
#[derive(Debug, Clone)]
pub struct EachRule {
    pub variables: Vec<String>,
    pub source: Expr,
    pub body: Vec<Stmt>,
}

/// A parameter of a function or mixin.
/// 函数或混入的参数。
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
    pub span: Span,
}

/// Parameter list with an optional rest parameter.
/// 带可选剩余参数的参数列表。
#[derive(Debug, Clone, Default)]
pub struct ParamList {
    pub params: Vec<Param>,
    pub rest: Option<String>,
}

/// `@function` / `@mixin` declaration.
#[derive(Debug, Clone)]
pub struct CallableDecl {
    pub name: String,
    pub params: ParamList,
    /// Shared, never mutated. / 共享且永不修改。
    pub body: Rc<[Stmt]>,
}

/// `@include` rule.
#[derive(Debug, Clone)]
pub struct IncludeRule {
    pub namespace: Option<String>,
    pub name: String,
    pub args: ArgList,
    pub content: Option<Vec<Stmt>>,
}

/// Where composed classes come from.
/// 组合类的来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeSource {
    /// Classes of the current file. / 当前文件的类
    Local,
    /// `from global`: used verbatim. / 原样使用
    Global,
    /// `from ns`: a namespace bound by `@use`.
    Namespace(String),
    /// `from "path"`: another module's exports.
    Request(String),
}

/// `@compose` rule.
#[derive(Debug, Clone)]
pub struct ComposeRule {
    pub names: Vec<String>,
    pub source: ComposeSource,
}

/// `@keyframes` rule.
#[derive(Debug, Clone)]
pub struct KeyframesRule {
    /// `keyframes` or a vendor-prefixed variant.
    pub at_name: String,
    pub name: Interpolation,
    pub body: Vec<Stmt>,
}

/// A passthrough at-rule such as `@media` or `@import`.
/// 透传的 at 规则，例如 `@media` 或 `@import`。
#[derive(Debug, Clone)]
pub struct AtRule {
    pub name: String,
    pub prelude: Interpolation,
    pub body: Option<Vec<Stmt>>,
}

impl Stylesheet {
    /// Requests of every dependency-bearing statement, in source order.
    /// 按源码顺序返回所有依赖语句中的模块请求。
    pub fn requests(&self) -> Vec<(String, Span)> {
        let mut out = Vec::new();
        collect_requests(&self.stmts, &mut out);
        out
    }
}

fn collect_requests(stmts: &[Stmt], out: &mut Vec<(String, Span)>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Use(rule) => out.push((rule.request.clone(), stmt.span)),
            StmtKind::Export(ExportRule::All { request })
            | StmtKind::Export(ExportRule::Named { request, .. }) => {
                out.push((request.clone(), stmt.span))
            }
            StmtKind::Compose(ComposeRule {
                source: ComposeSource::Request(request),
                ..
            }) => out.push((request.clone(), stmt.span)),
            StmtKind::Rule(rule) => collect_requests(&rule.body, out),
            StmtKind::If(rule) => {
                for clause in &rule.clauses {
                    collect_requests(&clause.body, out);
                }
                if let Some(body) = &rule.otherwise {
                    collect_requests(body, out);
                }
            }
            StmtKind::Each(rule) => collect_requests(&rule.body, out),
            StmtKind::Function(decl) | StmtKind::Mixin(decl) => collect_requests(&decl.body, out),
            StmtKind::Include(rule) => {
                if let Some(body) = &rule.content {
                    collect_requests(body, out);
                }
            }
            StmtKind::AtRule(rule) => {
                if let Some(body) = &rule.body {
                    collect_requests(body, out);
                }
            }
            _ => {}
        }
    }
}
