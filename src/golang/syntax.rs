//! Lowering of package-level declarations from the tree-sitter tree into
//! owned syntax.
//!
//! Only direct children of `source_file` are visited, so declarations inside
//! function bodies never reach the symbol table.

use super::parser::{node_column, node_line, node_text, significant_children, GoAst};
use super::types::{ChanDir, LiteralKind, Segment, TypeExpr};
use tree_sitter::Node;

/// 1-indexed source position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    fn of(node: &Node) -> Self {
        Self {
            line: node_line(node),
            column: node_column(node),
        }
    }
}

/// How an import is bound in its file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportName {
    /// No explicit name; bound to the imported package's own name
    Implicit,
    Alias(String),
    Dot,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSyntax {
    pub path: String,
    pub name: ImportName,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSyntax {
    pub name: Option<String>,
    pub ty: TypeExpr,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSyntax {
    pub params: Vec<ParamSyntax>,
    pub results: Vec<ParamSyntax>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Var,
    Const,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclSyntax {
    Type {
        name: String,
        alias: bool,
        type_params: Vec<String>,
        expr: TypeExpr,
        position: Position,
    },
    Func {
        name: String,
        type_params: Vec<String>,
        signature: SignatureSyntax,
        position: Position,
    },
    Method {
        receiver: Vec<ParamSyntax>,
        name: String,
        /// `None` when the declaration has no parameter tuple
        signature: Option<SignatureSyntax>,
        position: Position,
    },
    Value {
        kind: ValueKind,
        names: Vec<(String, Position)>,
    },
}

/// Package-level view of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSyntax {
    pub package: Option<(String, Position)>,
    pub imports: Vec<ImportSyntax>,
    pub decls: Vec<DeclSyntax>,
}

/// Lower the package clause, imports and top-level declarations of a file.
pub fn lower_file(ast: &GoAst) -> FileSyntax {
    let root = ast.tree.root_node();
    let src = ast.source.as_str();
    let mut file = FileSyntax {
        package: None,
        imports: Vec::new(),
        decls: Vec::new(),
    };

    for node in significant_children(&root) {
        match node.kind() {
            "package_clause" => {
                file.package = significant_children(&node)
                    .first()
                    .map(|id| (node_text(id, src).to_string(), Position::of(&node)));
            }
            "import_declaration" => lower_imports(&node, src, &mut file.imports),
            "type_declaration" => {
                for spec in significant_children(&node) {
                    if let Some(decl) = lower_type_spec(&spec, src) {
                        file.decls.push(decl);
                    }
                }
            }
            "function_declaration" => {
                if let Some(decl) = lower_function(&node, src) {
                    file.decls.push(decl);
                }
            }
            "method_declaration" => {
                if let Some(decl) = lower_method(&node, src) {
                    file.decls.push(decl);
                }
            }
            "var_declaration" => file.decls.push(lower_values(&node, src, ValueKind::Var)),
            "const_declaration" => file.decls.push(lower_values(&node, src, ValueKind::Const)),
            _ => {}
        }
    }

    file
}

/// Read only the package clause.
pub fn package_name(ast: &GoAst) -> Option<String> {
    let root = ast.tree.root_node();
    significant_children(&root)
        .into_iter()
        .find(|n| n.kind() == "package_clause")
        .and_then(|clause| {
            significant_children(&clause)
                .first()
                .map(|id| node_text(id, &ast.source).to_string())
        })
}

fn lower_imports(node: &Node, src: &str, out: &mut Vec<ImportSyntax>) {
    for child in significant_children(node) {
        match child.kind() {
            "import_spec" => {
                if let Some(import) = lower_import_spec(&child, src) {
                    out.push(import);
                }
            }
            "import_spec_list" => lower_imports(&child, src, out),
            _ => {}
        }
    }
}

fn lower_import_spec(node: &Node, src: &str) -> Option<ImportSyntax> {
    let path_node = node.child_by_field_name("path")?;
    let path = unquote(node_text(&path_node, src));
    let name = match node.child_by_field_name("name") {
        None => ImportName::Implicit,
        Some(name) => match node_text(&name, src) {
            "." => ImportName::Dot,
            "_" => ImportName::Blank,
            alias => ImportName::Alias(alias.to_string()),
        },
    };
    Some(ImportSyntax {
        path,
        name,
        position: Position::of(node),
    })
}

fn unquote(literal: &str) -> String {
    literal.trim_matches(|c| c == '"' || c == '`').to_string()
}

fn lower_type_spec(node: &Node, src: &str) -> Option<DeclSyntax> {
    let alias = match node.kind() {
        "type_spec" => false,
        "type_alias" => true,
        _ => return None,
    };
    let name = node_text(&node.child_by_field_name("name")?, src).to_string();
    let expr = lower_type(&node.child_by_field_name("type")?, src);
    Some(DeclSyntax::Type {
        name,
        alias,
        type_params: type_param_names(node, src),
        expr,
        position: Position::of(node),
    })
}

fn type_param_names(node: &Node, src: &str) -> Vec<String> {
    let Some(list) = node.child_by_field_name("type_parameters") else {
        return Vec::new();
    };
    let mut names = Vec::new();
    for decl in significant_children(&list) {
        let mut cursor = decl.walk();
        for name in decl.children_by_field_name("name", &mut cursor) {
            names.push(node_text(&name, src).to_string());
        }
    }
    names
}

fn lower_function(node: &Node, src: &str) -> Option<DeclSyntax> {
    let name = node_text(&node.child_by_field_name("name")?, src).to_string();
    let signature = lower_signature(node, src)?;
    Some(DeclSyntax::Func {
        name,
        type_params: type_param_names(node, src),
        signature,
        position: Position::of(node),
    })
}

fn lower_method(node: &Node, src: &str) -> Option<DeclSyntax> {
    let name = node_text(&node.child_by_field_name("name")?, src).to_string();
    let receiver = node
        .child_by_field_name("receiver")
        .map(|list| lower_params(&list, src))
        .unwrap_or_default();
    Some(DeclSyntax::Method {
        receiver,
        name,
        signature: lower_signature(node, src),
        position: Position::of(node),
    })
}

fn lower_signature(node: &Node, src: &str) -> Option<SignatureSyntax> {
    let params = lower_params(&node.child_by_field_name("parameters")?, src);
    let results = match node.child_by_field_name("result") {
        None => Vec::new(),
        Some(result) if result.kind() == "parameter_list" => lower_params(&result, src),
        Some(result) => vec![ParamSyntax {
            name: None,
            ty: lower_type(&result, src),
            variadic: false,
        }],
    };
    Some(SignatureSyntax { params, results })
}

fn lower_params(list: &Node, src: &str) -> Vec<ParamSyntax> {
    let mut params = Vec::new();
    for decl in significant_children(list) {
        let variadic = match decl.kind() {
            "parameter_declaration" => false,
            "variadic_parameter_declaration" => true,
            _ => continue,
        };
        let Some(type_node) = decl.child_by_field_name("type") else {
            continue;
        };
        let ty = lower_type(&type_node, src);
        let mut cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut cursor)
            .map(|n| node_text(&n, src).to_string())
            .collect();
        if names.is_empty() {
            params.push(ParamSyntax {
                name: None,
                ty,
                variadic,
            });
        } else {
            for name in names {
                params.push(ParamSyntax {
                    name: Some(name),
                    ty: ty.clone(),
                    variadic,
                });
            }
        }
    }
    params
}

fn lower_values(node: &Node, src: &str, kind: ValueKind) -> DeclSyntax {
    let mut names = Vec::new();
    collect_value_names(node, src, &mut names);
    DeclSyntax::Value { kind, names }
}

fn collect_value_names(node: &Node, src: &str, names: &mut Vec<(String, Position)>) {
    for child in significant_children(node) {
        match child.kind() {
            "var_spec" | "const_spec" => {
                let mut cursor = child.walk();
                for name in child.children_by_field_name("name", &mut cursor) {
                    names.push((node_text(&name, src).to_string(), Position::of(&name)));
                }
            }
            "var_spec_list" | "const_spec_list" => collect_value_names(&child, src, names),
            _ => {}
        }
    }
}

/// Lower a type node.
pub fn lower_type(node: &Node, src: &str) -> TypeExpr {
    match node.kind() {
        "type_identifier" | "identifier" => TypeExpr::Name(node_text(node, src).to_string()),
        "qualified_type" => {
            let package = node
                .child_by_field_name("package")
                .map(|n| node_text(&n, src).to_string())
                .unwrap_or_default();
            let name = node
                .child_by_field_name("name")
                .map(|n| node_text(&n, src).to_string())
                .unwrap_or_default();
            TypeExpr::Qualified { package, name }
        }
        "pointer_type" => match first_significant(node) {
            Some(inner) => TypeExpr::Pointer(Box::new(lower_type(&inner, src))),
            None => literal(node, src, LiteralKind::Other),
        },
        "slice_type" => match node.child_by_field_name("element") {
            Some(elem) => TypeExpr::Slice(Box::new(lower_type(&elem, src))),
            None => literal(node, src, LiteralKind::Other),
        },
        "array_type" | "implicit_length_array_type" => {
            let len = node
                .child_by_field_name("length")
                .map(|n| node_text(&n, src).to_string())
                .unwrap_or_else(|| "...".to_string());
            match node.child_by_field_name("element") {
                Some(elem) => TypeExpr::Array {
                    len,
                    elem: Box::new(lower_type(&elem, src)),
                },
                None => literal(node, src, LiteralKind::Other),
            }
        }
        "map_type" => match (
            node.child_by_field_name("key"),
            node.child_by_field_name("value"),
        ) {
            (Some(key), Some(value)) => TypeExpr::Map {
                key: Box::new(lower_type(&key, src)),
                value: Box::new(lower_type(&value, src)),
            },
            _ => literal(node, src, LiteralKind::Other),
        },
        "channel_type" => match node.child_by_field_name("value") {
            Some(elem) => TypeExpr::Chan {
                dir: channel_direction(node_text(node, src)),
                elem: Box::new(lower_type(&elem, src)),
            },
            None => literal(node, src, LiteralKind::Other),
        },
        "generic_type" => {
            let Some(base) = node.child_by_field_name("type") else {
                return literal(node, src, LiteralKind::Other);
            };
            let args = node
                .child_by_field_name("type_arguments")
                .map(|list| {
                    significant_children(&list)
                        .iter()
                        .map(|arg| match arg.kind() {
                            "type_elem" => first_significant(arg)
                                .map(|inner| lower_type(&inner, src))
                                .unwrap_or_else(|| literal(arg, src, LiteralKind::Other)),
                            _ => lower_type(arg, src),
                        })
                        .collect()
                })
                .unwrap_or_default();
            TypeExpr::Generic {
                base: Box::new(lower_type(&base, src)),
                args,
            }
        }
        "parenthesized_type" => match first_significant(node) {
            Some(inner) => lower_type(&inner, src),
            None => literal(node, src, LiteralKind::Other),
        },
        "function_type" => literal(node, src, LiteralKind::Func),
        "interface_type" => literal(node, src, LiteralKind::Interface),
        "struct_type" => literal(node, src, LiteralKind::Struct),
        _ => literal(node, src, LiteralKind::Other),
    }
}

fn first_significant<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    significant_children(node).into_iter().next()
}

fn channel_direction(text: &str) -> ChanDir {
    if text.starts_with("<-") {
        return ChanDir::Recv;
    }
    let rest = text.trim_start_matches("chan").trim_start();
    if rest.starts_with("<-") {
        ChanDir::Send
    } else {
        ChanDir::Both
    }
}

/// Keep a type literal as written, splitting out the type names it mentions
/// so they can be resolved and re-qualified.
fn literal(node: &Node, src: &str, kind: LiteralKind) -> TypeExpr {
    let mut refs = Vec::new();
    collect_type_names(node, &mut refs);

    let mut segments = Vec::new();
    let mut offset = node.start_byte();
    for name in refs {
        if name.start_byte() > offset {
            segments.push(Segment::Text(src[offset..name.start_byte()].to_string()));
        }
        segments.push(Segment::Type(lower_type(&name, src)));
        offset = name.end_byte();
    }
    if node.end_byte() > offset {
        segments.push(Segment::Text(src[offset..node.end_byte()].to_string()));
    }
    TypeExpr::Literal { kind, segments }
}

fn collect_type_names<'t>(node: &Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "type_identifier" | "qualified_type" => out.push(child),
            _ => collect_type_names(&child, out),
        }
    }
}
