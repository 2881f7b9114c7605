//! Declaration-level type checking and the resolved package handle.
//!
//! [`check_package`] turns the lowered files of one directory into a
//! [`ResolvedPackage`]: a package-scope symbol table, every type declaration
//! with its resolved right-hand side, and every method declaration with a
//! resolved signature. Function bodies are not checked.

use super::syntax::{DeclSyntax, FileSyntax, ImportName, ParamSyntax, Position, SignatureSyntax};
use super::types::{BasicKind, ExternalType, LiteralKind, Segment, TypeExpr, TypeRef, Underlying};
use crate::errors::{GenError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

/// Exported identifiers start with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Type,
    Alias,
    Func,
    Var,
    Const,
}

impl SymbolKind {
    pub fn is_type(self) -> bool {
        matches!(self, Self::Type | Self::Alias)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Self::Type => "type",
            Self::Alias => "type alias",
            Self::Func => "func",
            Self::Var => "var",
            Self::Const => "const",
        };
        f.write_str(word)
    }
}

/// A package-scope declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub file: PathBuf,
    pub position: Position,
}

/// An import as bound in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundImport {
    pub path: String,
    /// Name the imported package declares for itself
    pub package_name: String,
    /// Identifier that refers to the package in this file
    pub qualifier: Option<String>,
}

/// Parsed, lowered file ready for checking
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub syntax: FileSyntax,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub alias: bool,
    pub type_params: Vec<String>,
    /// Resolved right-hand side
    pub target: TypeRef,
    pub underlying: Underlying,
    pub file: PathBuf,
    pub position: Position,
}

impl TypeDecl {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// A parameter or result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    /// `None` for unnamed and blank (`_`) variables
    pub name: Option<String>,
    pub ty: TypeRef,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Var>,
    pub results: Vec<Var>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Defined type the method belongs to
    pub receiver_type: String,
    pub pointer_receiver: bool,
    pub name: String,
    /// `None` when the declaration carries no parameter tuple
    pub signature: Option<Signature>,
    pub file: PathBuf,
    pub position: Position,
}

/// A type-checked package
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    name: String,
    dir: PathBuf,
    import_path: Option<String>,
    files: Vec<PathBuf>,
    scope: BTreeMap<String, Symbol>,
    types: BTreeMap<String, TypeDecl>,
    methods: Vec<MethodDecl>,
}

impl ResolvedPackage {
    /// Declared package name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn import_path(&self) -> Option<&str> {
        self.import_path.as_deref()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Look up a package-scope symbol.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scope.get(name)
    }

    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        self.types.get(name)
    }

    /// Append a method declaration (for testing)
    #[cfg(test)]
    pub(crate) fn insert_method(&mut self, method: MethodDecl) {
        self.methods.push(method);
    }

    /// Methods declared on a defined type, pointer and value receivers
    /// together, in declaration order.
    pub fn method_set<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a MethodDecl> {
        self.methods
            .iter()
            .filter(move |m| m.receiver_type == type_name)
    }
}

struct RawType<'a> {
    alias: bool,
    type_params: &'a [String],
    expr: &'a TypeExpr,
    file: usize,
    position: Position,
}

/// Check the files of one package directory.
///
/// `package_name_of` maps an import path to the name the imported package
/// declares; it binds imports without an explicit name.
pub fn check_package(
    dir: PathBuf,
    import_path: Option<String>,
    files: Vec<ParsedFile>,
    package_name_of: &dyn Fn(&str) -> String,
) -> Result<ResolvedPackage> {
    let name = package_clause(&files)?;

    let imports: Vec<Vec<BoundImport>> = files
        .iter()
        .map(|f| bind_imports(&f.syntax, package_name_of))
        .collect();

    let scope = build_scope(&files)?;

    let mut raw_types = BTreeMap::new();
    for (index, file) in files.iter().enumerate() {
        for decl in &file.syntax.decls {
            if let DeclSyntax::Type {
                name,
                alias,
                type_params,
                expr,
                position,
            } = decl
            {
                raw_types.insert(
                    name.clone(),
                    RawType {
                        alias: *alias,
                        type_params,
                        expr,
                        file: index,
                        position: *position,
                    },
                );
            }
        }
    }

    let underlying: BTreeMap<String, Underlying> = raw_types
        .iter()
        .map(|(name, raw)| {
            let mut visiting = vec![name.clone()];
            (name.clone(), underlying_of(raw.expr, &raw_types, &mut visiting))
        })
        .collect();

    let checker = Checker {
        files: &files,
        imports: &imports,
        scope: &scope,
        underlying: &underlying,
    };

    let mut types = BTreeMap::new();
    for (type_name, raw) in &raw_types {
        let resolver = checker.resolver(raw.file, raw.type_params, raw.position);
        let target = resolver.resolve(raw.expr)?;
        types.insert(
            type_name.clone(),
            TypeDecl {
                name: type_name.clone(),
                alias: raw.alias,
                type_params: raw.type_params.to_vec(),
                target,
                underlying: underlying[type_name],
                file: files[raw.file].path.clone(),
                position: raw.position,
            },
        );
    }

    let mut methods = Vec::new();
    let mut declared: HashMap<(String, String), (usize, Position)> = HashMap::new();
    for (index, file) in files.iter().enumerate() {
        for decl in &file.syntax.decls {
            match decl {
                DeclSyntax::Func {
                    type_params,
                    signature,
                    position,
                    ..
                } => {
                    checker
                        .resolver(index, type_params, *position)
                        .resolve_signature(signature)?;
                }
                DeclSyntax::Method {
                    receiver,
                    name: method_name,
                    signature,
                    position,
                } => {
                    let method = checker.check_method(
                        index,
                        receiver,
                        method_name,
                        signature.as_ref(),
                        *position,
                        &types,
                    )?;
                    let key = (method.receiver_type.clone(), method.name.clone());
                    if let Some((prev_file, prev)) = declared.get(&key) {
                        return Err(GenError::type_check(
                            &file.path,
                            position.line,
                            position.column,
                            format!(
                                "method {}.{} already declared at {}:{}:{}",
                                key.0,
                                key.1,
                                files[*prev_file].path.display(),
                                prev.line,
                                prev.column
                            ),
                        ));
                    }
                    declared.insert(key, (index, *position));
                    methods.push(method);
                }
                DeclSyntax::Type { .. } | DeclSyntax::Value { .. } => {}
            }
        }
    }

    Ok(ResolvedPackage {
        name,
        dir,
        import_path,
        files: files.iter().map(|f| f.path.clone()).collect(),
        scope,
        types,
        methods,
    })
}

fn package_clause(files: &[ParsedFile]) -> Result<String> {
    let mut found: Option<(&str, &Path)> = None;
    for file in files {
        let Some((name, position)) = &file.syntax.package else {
            return Err(GenError::type_check(&file.path, 1, 1, "expected 'package'"));
        };
        match found {
            None => found = Some((name, &file.path)),
            Some((first, first_file)) if first != name => {
                return Err(GenError::type_check(
                    &file.path,
                    position.line,
                    position.column,
                    format!(
                        "found packages {} ({}) and {} ({})",
                        first,
                        file_name(first_file),
                        name,
                        file_name(&file.path)
                    ),
                ));
            }
            Some(_) => {}
        }
    }
    found
        .map(|(name, _)| name.to_string())
        .ok_or_else(|| GenError::type_check(PathBuf::new(), 1, 1, "no Go files"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn bind_imports(file: &FileSyntax, package_name_of: &dyn Fn(&str) -> String) -> Vec<BoundImport> {
    file.imports
        .iter()
        .map(|import| {
            let package_name = package_name_of(&import.path);
            let qualifier = match &import.name {
                ImportName::Implicit => Some(package_name.clone()),
                ImportName::Alias(alias) => Some(alias.clone()),
                ImportName::Dot | ImportName::Blank => None,
            };
            BoundImport {
                path: import.path.clone(),
                package_name,
                qualifier,
            }
        })
        .collect()
}

fn build_scope(files: &[ParsedFile]) -> Result<BTreeMap<String, Symbol>> {
    let mut scope: BTreeMap<String, Symbol> = BTreeMap::new();
    for file in files {
        for decl in &file.syntax.decls {
            let entries: Vec<(&str, SymbolKind, Position)> = match decl {
                DeclSyntax::Type {
                    name,
                    alias,
                    position,
                    ..
                } => {
                    let kind = if *alias {
                        SymbolKind::Alias
                    } else {
                        SymbolKind::Type
                    };
                    vec![(name.as_str(), kind, *position)]
                }
                DeclSyntax::Func { name, position, .. } if name != "init" => {
                    vec![(name.as_str(), SymbolKind::Func, *position)]
                }
                DeclSyntax::Value { kind, names } => {
                    let kind = match kind {
                        super::syntax::ValueKind::Var => SymbolKind::Var,
                        super::syntax::ValueKind::Const => SymbolKind::Const,
                    };
                    names
                        .iter()
                        .map(|(name, position)| (name.as_str(), kind, *position))
                        .collect()
                }
                DeclSyntax::Func { .. } | DeclSyntax::Method { .. } => Vec::new(),
            };

            for (name, kind, position) in entries {
                if name == "_" {
                    continue;
                }
                if let Some(previous) = scope.get(name) {
                    return Err(GenError::type_check(
                        &file.path,
                        position.line,
                        position.column,
                        format!(
                            "{} redeclared in this block (other declaration at {}:{}:{})",
                            name,
                            previous.file.display(),
                            previous.position.line,
                            previous.position.column
                        ),
                    ));
                }
                scope.insert(
                    name.to_string(),
                    Symbol {
                        name: name.to_string(),
                        kind,
                        file: file.path.clone(),
                        position,
                    },
                );
            }
        }
    }
    Ok(scope)
}

fn underlying_of(
    expr: &TypeExpr,
    raw: &BTreeMap<String, RawType<'_>>,
    visiting: &mut Vec<String>,
) -> Underlying {
    match expr {
        TypeExpr::Name(name) => {
            if let Some(decl) = raw.get(name) {
                if visiting.contains(name) {
                    return Underlying::Opaque;
                }
                visiting.push(name.clone());
                let underlying = underlying_of(decl.expr, raw, visiting);
                visiting.pop();
                underlying
            } else if let Some(kind) = BasicKind::from_name(name) {
                Underlying::Basic(kind)
            } else if matches!(name.as_str(), "error" | "any" | "comparable") {
                Underlying::Interface
            } else {
                Underlying::Opaque
            }
        }
        TypeExpr::Qualified { .. } => Underlying::Opaque,
        TypeExpr::Pointer(_) => Underlying::Pointer,
        TypeExpr::Slice(_) | TypeExpr::Map { .. } | TypeExpr::Chan { .. } => Underlying::Nilable,
        TypeExpr::Array { .. } => Underlying::Composite,
        TypeExpr::Generic { base, .. } => underlying_of(base, raw, visiting),
        TypeExpr::Literal { kind, .. } => match kind {
            LiteralKind::Func => Underlying::Nilable,
            LiteralKind::Interface => Underlying::Interface,
            LiteralKind::Struct => Underlying::Composite,
            LiteralKind::Other => Underlying::Opaque,
        },
    }
}

struct Checker<'a> {
    files: &'a [ParsedFile],
    imports: &'a [Vec<BoundImport>],
    scope: &'a BTreeMap<String, Symbol>,
    underlying: &'a BTreeMap<String, Underlying>,
}

impl<'a> Checker<'a> {
    fn resolver(&self, file: usize, type_params: &[String], position: Position) -> Resolver<'a> {
        Resolver {
            scope: self.scope,
            underlying: self.underlying,
            imports: &self.imports[file],
            type_params: type_params.to_vec(),
            file: &self.files[file].path,
            position,
        }
    }

    fn check_method(
        &self,
        file: usize,
        receiver: &[ParamSyntax],
        name: &str,
        signature: Option<&SignatureSyntax>,
        position: Position,
        types: &BTreeMap<String, TypeDecl>,
    ) -> Result<MethodDecl> {
        let path = &self.files[file].path;
        let fail = |message: String| GenError::type_check(path, position.line, position.column, message);

        let recv = match receiver {
            [single] => single,
            [] => return Err(fail(format!("method {name} has no receiver"))),
            _ => return Err(fail(format!("method {name} has multiple receivers"))),
        };
        let (base, pointer_receiver) = recv
            .ty
            .base_name()
            .ok_or_else(|| fail(format!("invalid receiver type for method {name}")))?;

        match self.scope.get(base) {
            None => return Err(fail(format!("undefined: {base}"))),
            Some(symbol) if !symbol.kind.is_type() => {
                return Err(fail(format!("{base} is not a type")));
            }
            Some(_) => {}
        }

        // Aliases may chain; methods belong to the defined type at the end.
        let mut receiver_type = base.to_string();
        let mut hops = 0;
        loop {
            let decl = types
                .get(&receiver_type)
                .ok_or_else(|| fail(format!("undefined: {receiver_type}")))?;
            if !decl.alias {
                break;
            }
            let TypeRef::Local { name: next, .. } = &decl.target else {
                return Err(fail(format!(
                    "cannot define new methods on non-local type {base}"
                )));
            };
            hops += 1;
            if hops > types.len() {
                return Err(fail(format!("invalid recursive type alias {base}")));
            }
            receiver_type = next.clone();
        }

        if !self.underlying[&receiver_type].can_bear_methods() {
            return Err(fail(format!(
                "invalid receiver type {receiver_type} (pointer or interface type)"
            )));
        }

        let resolver = self.resolver(file, &receiver_type_params(&recv.ty), position);
        let signature = signature
            .map(|sig| resolver.resolve_signature(sig))
            .transpose()?;

        Ok(MethodDecl {
            receiver_type,
            pointer_receiver,
            name: name.to_string(),
            signature,
            file: path.clone(),
            position,
        })
    }
}

/// Type parameter names bound by a generic receiver such as `*List[E]`.
fn receiver_type_params(expr: &TypeExpr) -> Vec<String> {
    match expr {
        TypeExpr::Pointer(inner) => receiver_type_params(inner),
        TypeExpr::Generic { args, .. } => args
            .iter()
            .filter_map(|arg| match arg {
                TypeExpr::Name(name) if name != "_" => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

struct Resolver<'a> {
    scope: &'a BTreeMap<String, Symbol>,
    underlying: &'a BTreeMap<String, Underlying>,
    imports: &'a [BoundImport],
    type_params: Vec<String>,
    file: &'a Path,
    position: Position,
}

impl Resolver<'_> {
    fn error(&self, message: String) -> GenError {
        GenError::type_check(self.file, self.position.line, self.position.column, message)
    }

    fn resolve_signature(&self, sig: &SignatureSyntax) -> Result<Signature> {
        Ok(Signature {
            params: self.resolve_vars(&sig.params)?,
            results: self.resolve_vars(&sig.results)?,
        })
    }

    fn resolve_vars(&self, params: &[ParamSyntax]) -> Result<Vec<Var>> {
        params
            .iter()
            .map(|p| {
                Ok(Var {
                    name: p.name.clone().filter(|n| n != "_"),
                    ty: self.resolve(&p.ty)?,
                    variadic: p.variadic,
                })
            })
            .collect()
    }

    fn resolve(&self, expr: &TypeExpr) -> Result<TypeRef> {
        Ok(match expr {
            TypeExpr::Name(name) => {
                if self.type_params.iter().any(|p| p == name) {
                    return Ok(TypeRef::TypeParam(name.clone()));
                }
                match self.scope.get(name) {
                    Some(symbol) if symbol.kind.is_type() => TypeRef::Local {
                        name: name.clone(),
                        underlying: self
                            .underlying
                            .get(name)
                            .copied()
                            .unwrap_or(Underlying::Opaque),
                    },
                    Some(_) => return Err(self.error(format!("{name} is not a type"))),
                    None => {
                        universe(name).ok_or_else(|| self.error(format!("undefined: {name}")))?
                    }
                }
            }
            TypeExpr::Qualified { package, name } => {
                let import = self
                    .imports
                    .iter()
                    .find(|i| i.qualifier.as_deref() == Some(package.as_str()))
                    .ok_or_else(|| self.error(format!("undefined: {package}")))?;
                if !is_exported(name) {
                    return Err(self.error(format!(
                        "name {name} not exported by package {package}"
                    )));
                }
                TypeRef::External(ExternalType {
                    path: import.path.clone(),
                    package_name: import.package_name.clone(),
                    qualifier: package.clone(),
                    name: name.clone(),
                    underlying: None,
                })
            }
            TypeExpr::Pointer(inner) => TypeRef::Pointer(Box::new(self.resolve(inner)?)),
            TypeExpr::Slice(inner) => TypeRef::Slice(Box::new(self.resolve(inner)?)),
            TypeExpr::Array { len, elem } => TypeRef::Array {
                len: len.clone(),
                elem: Box::new(self.resolve(elem)?),
            },
            TypeExpr::Map { key, value } => TypeRef::Map {
                key: Box::new(self.resolve(key)?),
                value: Box::new(self.resolve(value)?),
            },
            TypeExpr::Chan { dir, elem } => TypeRef::Chan {
                dir: *dir,
                elem: Box::new(self.resolve(elem)?),
            },
            TypeExpr::Generic { base, args } => TypeRef::Generic {
                base: Box::new(self.resolve(base)?),
                args: args
                    .iter()
                    .map(|a| self.resolve(a))
                    .collect::<Result<Vec<_>>>()?,
            },
            TypeExpr::Literal { kind, segments } => TypeRef::Literal {
                kind: *kind,
                segments: segments
                    .iter()
                    .map(|segment| match segment {
                        Segment::Text(text) => Ok(Segment::Text(text.clone())),
                        Segment::Type(ty) => Ok(Segment::Type(self.resolve(ty)?)),
                    })
                    .collect::<Result<Vec<_>>>()?,
            },
        })
    }
}

fn universe(name: &str) -> Option<TypeRef> {
    if let Some(kind) = BasicKind::from_name(name) {
        return Some(TypeRef::Basic(kind));
    }
    match name {
        "error" => Some(TypeRef::Error),
        "any" | "comparable" => Some(TypeRef::Universe(name.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::golang::parser::parse_checked;
    use crate::golang::syntax::lower_file;
    use indoc::indoc;

    fn check(sources: &[(&str, &str)]) -> Result<ResolvedPackage> {
        let files = sources
            .iter()
            .map(|(name, src)| {
                let path = PathBuf::from(name);
                let ast = parse_checked(src, &path)?;
                Ok(ParsedFile {
                    syntax: lower_file(&ast),
                    path,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        check_package(PathBuf::from("."), None, files, &|path: &str| {
            path.rsplit('/').next().unwrap_or(path).to_string()
        })
    }

    fn message(err: GenError) -> String {
        assert_eq!(err.kind(), ErrorKind::TypeCheckError, "{err}");
        err.to_string()
    }

    #[test]
    fn test_method_set_merges_receivers_in_declaration_order() {
        let pkg = check(&[(
            "t.go",
            indoc! {r#"
                package pkg

                type T struct{}

                func (t *T) PtrMethod1() {}
                func (t T) Method2() error { return nil }
            "#},
        )])
        .unwrap();
        let methods: Vec<_> = pkg
            .method_set("T")
            .map(|m| (m.name.as_str(), m.pointer_receiver))
            .collect();
        assert_eq!(methods, vec![("PtrMethod1", true), ("Method2", false)]);
        assert_eq!(pkg.name(), "pkg");
    }

    #[test]
    fn test_methods_through_alias_chain_belong_to_defined_type() {
        let pkg = check(&[(
            "t.go",
            indoc! {r#"
                package pkg

                type T struct{}

                type B = T

                type A = B

                func (t *T) One() error { return nil }
                func (a *A) Two() error { return nil }
            "#},
        )])
        .unwrap();
        let names: Vec<_> = pkg.method_set("T").map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two"]);
        assert_eq!(pkg.method_set("A").count(), 0);
        assert_eq!(pkg.method_set("B").count(), 0);
    }

    #[test]
    fn test_method_on_alias_chain_to_foreign_type_is_rejected() {
        let err = check(&[(
            "t.go",
            indoc! {r#"
                package pkg

                import "time"

                type B = time.Time

                type A = B

                func (a A) Late() bool { return false }
            "#},
        )])
        .unwrap_err();
        assert!(message(err).ends_with("cannot define new methods on non-local type A"));
    }

    #[test]
    fn test_error_identity_respects_package_scope() {
        let pkg = check(&[(
            "t.go",
            indoc! {r#"
                package pkg

                type T struct{}

                func (t T) Close() error { return nil }
            "#},
        )])
        .unwrap();
        let close = pkg.method_set("T").next().unwrap();
        let results = &close.signature.as_ref().unwrap().results;
        assert_eq!(results[0].ty, TypeRef::Error);

        let shadowed = check(&[(
            "t.go",
            indoc! {r#"
                package pkg

                type error struct{ msg string }

                type T struct{}

                func (t T) Close() error { return error{} }
            "#},
        )])
        .unwrap();
        let close = shadowed.method_set("T").next().unwrap();
        let results = &close.signature.as_ref().unwrap().results;
        assert!(matches!(&results[0].ty, TypeRef::Local { name, .. } if name == "error"));
    }

    #[test]
    fn test_undefined_receiver_is_a_type_error() {
        let err = check(&[(
            "f.go",
            indoc! {r#"
                package pkg

                func (t *T) M() {}
            "#},
        )])
        .unwrap_err();
        assert_eq!(message(err), "f.go:3:1: undefined: T");
    }

    #[test]
    fn test_duplicate_method_across_receiver_forms() {
        let err = check(&[
            ("a.go", "package pkg\n\ntype T struct{}\n\nfunc (t *T) M() {}\n"),
            ("b.go", "package pkg\n\nfunc (t T) M() {}\n"),
        ])
        .unwrap_err();
        assert!(message(err).contains("method T.M already declared at a.go:5:1"));
    }

    #[test]
    fn test_redeclaration_and_mixed_packages() {
        let err = check(&[
            ("a.go", "package pkg\n\ntype T struct{}\n"),
            ("b.go", "package pkg\n\nvar T = 1\n"),
        ])
        .unwrap_err();
        assert!(message(err).contains("T redeclared in this block"));

        let err = check(&[("a.go", "package a\n"), ("b.go", "package b\n")]).unwrap_err();
        assert!(message(err).contains("found packages a (a.go) and b (b.go)"));
    }

    #[test]
    fn test_undefined_types_and_qualifiers() {
        let err = check(&[(
            "t.go",
            "package pkg\n\ntype T struct{}\n\nfunc (t T) M(x Missing) {}\n",
        )])
        .unwrap_err();
        assert!(message(err).ends_with("undefined: Missing"));

        let err = check(&[(
            "t.go",
            "package pkg\n\ntype T struct{}\n\nfunc (t T) M(db *sql.DB) {}\n",
        )])
        .unwrap_err();
        assert!(message(err).ends_with("undefined: sql"));

        let err = check(&[(
            "t.go",
            "package pkg\n\ntype T struct{}\n\nfunc F() {}\n\nfunc (t T) M(x F) {}\n",
        )])
        .unwrap_err();
        assert!(message(err).ends_with("F is not a type"));
    }

    #[test]
    fn test_imports_resolve_per_file() {
        let pkg = check(&[
            (
                "a.go",
                indoc! {r#"
                    package pkg

                    import sq "database/sql"

                    type T struct{}

                    func (t *T) Query(db *sq.DB) {}
                "#},
            ),
            (
                "b.go",
                indoc! {r#"
                    package pkg

                    import "context"

                    func (t *T) Run(ctx context.Context) {}
                "#},
            ),
        ])
        .unwrap();
        let externals: Vec<_> = pkg
            .method_set("T")
            .flat_map(|m| m.signature.as_ref().unwrap().params.clone())
            .map(|v| {
                let mut out = Vec::new();
                v.ty.for_each_external(&mut |e| out.push((e.qualifier.clone(), e.path.clone())));
                out
            })
            .collect();
        assert_eq!(
            externals,
            vec![
                vec![("sq".to_string(), "database/sql".to_string())],
                vec![("context".to_string(), "context".to_string())],
            ]
        );
    }

    #[test]
    fn test_invalid_receivers() {
        let err = check(&[(
            "t.go",
            "package pkg\n\ntype P *int\n\nfunc (p P) M() {}\n",
        )])
        .unwrap_err();
        assert!(message(err).contains("pointer or interface type"));

        let err = check(&[(
            "t.go",
            "package pkg\n\nimport \"strings\"\n\ntype B = strings.Builder\n\nfunc (b *B) M() {}\n",
        )])
        .unwrap_err();
        assert!(message(err).contains("non-local type B"));
    }

    #[test]
    fn test_alias_methods_attach_to_target() {
        let pkg = check(&[(
            "t.go",
            "package pkg\n\ntype T struct{}\n\ntype A = T\n\nfunc (a *A) M() {}\n",
        )])
        .unwrap();
        assert_eq!(pkg.method_set("T").count(), 1);
        assert_eq!(pkg.lookup("A").map(|s| s.kind), Some(SymbolKind::Alias));
    }

    #[test]
    fn test_generic_receivers_bind_type_params() {
        let pkg = check(&[(
            "l.go",
            indoc! {r#"
                package pkg

                type List[E any] struct{ items []E }

                func (l *List[E]) Push(v E) {}
            "#},
        )])
        .unwrap();
        assert!(pkg.type_decl("List").unwrap().is_generic());
        let push = pkg.method_set("List").next().unwrap();
        let params = &push.signature.as_ref().unwrap().params;
        assert_eq!(params[0].ty, TypeRef::TypeParam("E".into()));
    }

    #[test]
    fn test_underlying_shapes() {
        let pkg = check(&[(
            "t.go",
            indoc! {r#"
                package pkg

                type Mode int
                type Level Mode
                type Handler func()
                type Reader interface{ Read() }
                type Grid [3][3]int
                type Loop Loop2
                type Loop2 Loop
            "#},
        )])
        .unwrap();
        let shape = |name: &str| pkg.type_decl(name).unwrap().underlying;
        assert_eq!(shape("Mode"), Underlying::Basic(BasicKind::Int));
        assert_eq!(shape("Level"), Underlying::Basic(BasicKind::Int));
        assert_eq!(shape("Handler"), Underlying::Nilable);
        assert_eq!(shape("Reader"), Underlying::Interface);
        assert_eq!(shape("Grid"), Underlying::Composite);
        assert_eq!(shape("Loop"), Underlying::Opaque);
    }

    #[test]
    fn test_is_exported() {
        assert!(is_exported("T"));
        assert!(is_exported("Ärger"));
        assert!(!is_exported("t"));
        assert!(!is_exported("_T"));
        assert!(!is_exported(""));
    }
}
