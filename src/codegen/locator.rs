//! Finding the target type at package scope.

use crate::errors::{GenError, Result};
use crate::golang::{is_exported, ResolvedPackage, TypeRef, Underlying};

/// The located target type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    /// Name of the declaring package
    pub package: String,
    pub import_path: Option<String>,
    pub exported: bool,
    pub alias: bool,
    /// Right-hand side of the declaration
    pub target: TypeRef,
    pub underlying: Underlying,
}

/// Find an exported, package-level, non-generic type declaration.
///
/// Only package scope is consulted, so a type declared inside a function
/// body is reported as missing even when it carries the requested name.
pub fn locate(pkg: &ResolvedPackage, name: &str) -> Result<NamedType> {
    let not_found = || GenError::TypeNotFound {
        package: pkg.name().to_string(),
        name: name.to_string(),
    };

    let symbol = pkg.lookup(name).ok_or_else(not_found)?;
    if !symbol.kind.is_type() {
        return Err(GenError::NotANamedType {
            package: pkg.name().to_string(),
            name: name.to_string(),
            kind: symbol.kind.to_string(),
        });
    }
    if !is_exported(name) {
        return Err(not_found());
    }

    let decl = pkg.type_decl(name).ok_or_else(not_found)?;
    if decl.is_generic() {
        return Err(GenError::UnsupportedType {
            name: name.to_string(),
            reason: format!(
                "generic type with type parameters [{}]",
                decl.type_params.join(", ")
            ),
        });
    }

    Ok(NamedType {
        name: name.to_string(),
        package: pkg.name().to_string(),
        import_path: pkg.import_path().map(str::to_string),
        exported: true,
        alias: decl.alias,
        target: decl.target.clone(),
        underlying: decl.underlying,
    })
}
