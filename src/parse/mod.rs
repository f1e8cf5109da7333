//! C# declaration reading via tree-sitter
//!
//! Reads type, property, attribute and method declarations into a
//! [`Compilation`](crate::schema::Compilation). Method bodies and
//! expressions are not interpreted.

mod csharp;

use crate::error::{Error, Result};
use serde::Serialize;
use tree_sitter::{Node, Parser, Tree};

pub use csharp::parse_csharp;

/// An `ERROR` or `MISSING` node found in parsed source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxError {
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
    pub kind: String,
    pub text: String,
}

fn parse_tree(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
        .map_err(|e| Error::CodeParse(format!("Failed to set language: {}", e)))?;

    parser
        .parse(source, None)
        .ok_or_else(|| Error::CodeParse("Failed to parse source".into()))
}

/// Syntax errors in C# source; empty when the source parses cleanly
pub fn syntax_errors(source: &str) -> Result<Vec<SyntaxError>> {
    let tree = parse_tree(source)?;
    let mut errors = Vec::new();

    fn collect(node: Node, source: &str, errors: &mut Vec<SyntaxError>) {
        if node.is_error() || node.is_missing() {
            let position = node.start_position();
            errors.push(SyntaxError {
                line: position.row + 1,
                column: position.column + 1,
                kind: if node.is_missing() {
                    format!("missing {}", node.kind())
                } else {
                    node.kind().to_string()
                },
                text: text(node, source).chars().take(100).collect(),
            });
            return;
        }
        if !node.has_error() {
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            collect(child, source, errors);
        }
    }

    collect(tree.root_node(), source, &mut errors);
    Ok(errors)
}

/// Get raw tree-sitter S-expression for C# source
pub fn to_sexp(source: &str) -> Result<String> {
    Ok(parse_tree(source)?.root_node().to_sexp())
}

fn text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}
