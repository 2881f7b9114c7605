//! Tree-sitter parser integration for Go

use crate::errors::{GenError, Result};
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser, Tree};

/// A parsed Go source file
pub struct GoAst {
    pub tree: Tree,
    pub source: String,
    pub path: PathBuf,
}

fn go_language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

/// Parse Go source code into a tree-sitter AST
pub fn parse_source(content: &str, path: &Path) -> Result<GoAst> {
    let mut parser = Parser::new();
    parser
        .set_language(&go_language())
        .map_err(|e| GenError::type_check(path, 1, 1, format!("cannot load Go grammar: {e}")))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| GenError::type_check(path, 1, 1, "parser produced no tree"))?;

    Ok(GoAst {
        tree,
        source: content.to_string(),
        path: path.to_path_buf(),
    })
}

/// Parse and reject any syntax error, reporting the first one.
pub fn parse_checked(content: &str, path: &Path) -> Result<GoAst> {
    let ast = parse_source(content, path)?;
    if let Some((line, column, message)) = first_syntax_error(&ast.tree.root_node(), content) {
        return Err(GenError::type_check(path, line, column, message));
    }
    Ok(ast)
}

/// Check if a parse tree has errors
pub fn has_parse_errors(tree: &Tree) -> bool {
    tree.root_node().has_error()
}

/// Location (1-indexed) and description of the first error or missing node.
pub fn first_syntax_error(node: &Node, source: &str) -> Option<(usize, usize, String)> {
    if !node.has_error() {
        return None;
    }
    if node.is_missing() {
        return Some((
            node_line(node),
            node_column(node),
            format!("syntax error: missing {}", node.kind()),
        ));
    }
    if node.is_error() {
        let text = node_text(node, source);
        let snippet: String = text.chars().take(20).collect();
        return Some((
            node_line(node),
            node_column(node),
            format!("syntax error: unexpected {:?}", snippet.trim()),
        ));
    }
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .find_map(|child| first_syntax_error(&child, source));
    found
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Get the line number for a tree-sitter node (1-indexed)
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Get the column number for a tree-sitter node (1-indexed)
pub fn node_column(node: &Node) -> usize {
    node.start_position().column + 1
}

/// Named children other than comments.
pub fn significant_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}
