//! Go front end: the type-system facade the generator queries.
//!
//! Loading goes directory → files (build constraints) → tree-sitter parse →
//! lowered declarations → declaration-level checking → [`ResolvedPackage`].

pub mod build;
pub mod loader;
pub mod package;
pub mod parser;
pub mod syntax;
pub mod types;

pub use loader::{default_package_name, LocatedPackage, PackageLoader, SourceLoader};
pub use package::{
    is_exported, MethodDecl, ResolvedPackage, Signature, Symbol, SymbolKind, TypeDecl, Var,
};
pub use types::{BasicKind, ExternalType, TypeRef, Underlying};
