//! The CSS output tree.
//! CSS 输出树。

use std::fmt::Write;

/// An emitted CSS node.
#[derive(Debug, Clone, PartialEq)]
pub enum CssNode {
    Declaration {
        property: String,
        value: String,
        important: bool,
    },
    Rule {
        selector: String,
        children: Vec<CssNode>,
    },
    AtRule {
        name: String,
        prelude: String,
        children: Option<Vec<CssNode>>,
    },
}

impl CssNode {
    pub fn is_declaration(&self) -> bool {
        matches!(self, CssNode::Declaration { .. })
    }
}

/// Hoist nested rules and at-rules after their enclosing rule.
///
/// A rule keeps its own declarations; each nested block follows it as a
/// sibling in document order. Rules left without declarations and
/// at-rules left with an empty body are dropped.
pub fn flatten(nodes: Vec<CssNode>) -> Vec<CssNode> {
    let mut out = Vec::new();
    for node in nodes {
        flatten_into(node, &mut out);
    }
    out
}

fn flatten_into(node: CssNode, out: &mut Vec<CssNode>) {
    match node {
        CssNode::Declaration { .. } | CssNode::AtRule { children: None, .. } => out.push(node),
        CssNode::Rule { selector, children } => {
            let (declarations, nested): (Vec<_>, Vec<_>) =
                children.into_iter().partition(CssNode::is_declaration);
            if !declarations.is_empty() {
                out.push(CssNode::Rule {
                    selector,
                    children: declarations,
                });
            }
            for child in nested {
                flatten_into(child, out);
            }
        }
        CssNode::AtRule {
            name,
            prelude,
            children: Some(children),
        } => {
            let body = flatten(children);
            if !body.is_empty() {
                out.push(CssNode::AtRule {
                    name,
                    prelude,
                    children: Some(body),
                });
            }
        }
    }
}

/// Serialize flattened nodes, one blank line between top-level blocks.
pub fn render(nodes: &[CssNode]) -> String {
    let mut out = String::new();
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_node(&mut out, node, 0);
    }
    out
}

fn write_node(out: &mut String, node: &CssNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        CssNode::Declaration {
            property,
            value,
            important,
        } => {
            let _ = write!(out, "{indent}{property}: {value}");
            if *important {
                out.push_str(" !important");
            }
            out.push_str(";\n");
        }
        CssNode::Rule { selector, children } => {
            let _ = writeln!(out, "{indent}{selector} {{");
            for child in children {
                write_node(out, child, depth + 1);
            }
            let _ = writeln!(out, "{indent}}}");
        }
        CssNode::AtRule {
            name,
            prelude,
            children,
        } => {
            let _ = write!(out, "{indent}@{name}");
            if !prelude.is_empty() {
                let _ = write!(out, " {prelude}");
            }
            match children {
                None => out.push_str(";\n"),
                Some(children) => {
                    out.push_str(" {\n");
                    for child in children {
                        write_node(out, child, depth + 1);
                    }
                    let _ = writeln!(out, "{indent}}}");
                }
            }
        }
    }
}
