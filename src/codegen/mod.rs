//! Wrapper synthesis.
//!
//! The pipeline runs in five stages over a [`ResolvedPackage`]:
//! locate the type, extract its exported methods, collect imports,
//! classify each method, render the document.

pub mod classifier;
pub mod extractor;
pub mod imports;
pub mod locator;
pub mod synthesizer;

pub use classifier::{classify, has_error_convention, WrapperMethod};
pub use extractor::{extract, MethodSignature};
pub use imports::{ImportEntry, ImportSet};
pub use locator::{locate, NamedType};
pub use synthesizer::{render, wrapper_name, WrapperSpec, GENERATED_HEADER};

use crate::config::GeneratorConfig;
use crate::errors::{GenError, Result};
use crate::golang::{is_exported, PackageLoader, ResolvedPackage, TypeRef};
use tracing::{debug, info_span};

/// Fields of the wrapper struct; a wrapped method may not share their names.
const WRAPPER_FIELDS: [&str; 2] = ["Val", "Err"];

/// Build the wrapper description for `type_name` in an already resolved
/// package.
pub fn build_spec(
    pkg: &ResolvedPackage,
    type_name: &str,
    config: &GeneratorConfig,
) -> Result<WrapperSpec> {
    let named = locate(pkg, type_name)?;
    debug!(
        package = %named.package,
        type_name = %named.name,
        alias = named.alias,
        "Located target type"
    );
    let mut methods = extract(pkg, &named)?;
    if let Some(clash) = methods
        .iter()
        .find(|m| WRAPPER_FIELDS.contains(&m.name.as_str()))
    {
        return Err(GenError::UnsupportedType {
            name: named.name.clone(),
            reason: format!(
                "method {} collides with the {} field of {}",
                clash.name,
                clash.name,
                wrapper_name(&named.name)
            ),
        });
    }

    let mut value_type = TypeRef::Local {
        name: named.name.clone(),
        underlying: named.underlying,
    };
    let elsewhere = generates_elsewhere(&named, config);
    if elsewhere {
        let path = named.import_path.as_deref().ok_or_else(|| GenError::UnsupportedType {
            name: named.name.clone(),
            reason: format!(
                "package {} has no import path, so a wrapper in another package cannot refer to it",
                named.package
            ),
        })?;
        debug!(import_path = path, "Qualifying target package types");
        value_type = value_type.qualify_locals(path, &named.package);
        for method in &mut methods {
            qualify_params(method, path, &named.package);
        }
        reject_unexported_params(&named, &methods, path)?;
    }

    let excluded = config
        .output_import_path
        .iter()
        .chain(named.import_path.iter().filter(|_| !elsewhere))
        .cloned();
    let mut imports = ImportSet::new(excluded);
    imports.record(&value_type);
    for method in &methods {
        for param in &method.params {
            imports.record(&param.ty);
        }
    }

    let wrapped: Vec<WrapperMethod> = methods.iter().map(|m| classify(m, &imports)).collect();
    debug!(
        methods = wrapped.len(),
        error_convention = wrapped.iter().filter(|m| m.error_convention).count(),
        imports = imports.len(),
        "Classified method set"
    );

    Ok(WrapperSpec {
        package: config
            .output_package
            .clone()
            .unwrap_or_else(|| named.package.clone()),
        wrapper_name: wrapper_name(&named.name),
        value_type: value_type.render(&|ext| imports.qualifier_for(ext)),
        type_name: named.name,
        imports: imports.entries(),
        methods: wrapped,
    })
}

/// Whether the generated file belongs to a package other than the target's.
/// An explicit output import path decides; otherwise a differing package
/// clause does.
fn generates_elsewhere(named: &NamedType, config: &GeneratorConfig) -> bool {
    match (&config.output_import_path, &named.import_path) {
        (Some(output), Some(target)) => output != target,
        (Some(_), None) => true,
        (None, _) => config
            .output_package
            .as_ref()
            .is_some_and(|package| *package != named.package),
    }
}

fn qualify_params(method: &mut MethodSignature, path: &str, package_name: &str) {
    for param in &mut method.params {
        param.ty = param.ty.qualify_locals(path, package_name);
    }
}

fn reject_unexported_params(named: &NamedType, methods: &[MethodSignature], path: &str) -> Result<()> {
    for method in methods {
        for param in &method.params {
            let mut hidden = None;
            param.ty.for_each_external(&mut |ext| {
                if hidden.is_none() && ext.path == path && !is_exported(&ext.name) {
                    hidden = Some(ext.name.clone());
                }
            });
            if let Some(hidden) = hidden {
                return Err(GenError::UnsupportedType {
                    name: named.name.clone(),
                    reason: format!(
                        "method {} takes unexported type {hidden}, which another package cannot name",
                        method.name
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Resolve `package` through `loader` and describe the wrapper for
/// `type_name`.
pub fn generate_spec(
    loader: &dyn PackageLoader,
    config: &GeneratorConfig,
    package: &str,
    type_name: &str,
) -> Result<WrapperSpec> {
    let _span = info_span!("generate", package, type_name).entered();
    let pkg = loader.resolve(package)?;
    build_spec(&pkg, type_name, config)
}

/// Unformatted wrapper source for `type_name` in `package`.
pub fn generate_with(
    loader: &dyn PackageLoader,
    config: &GeneratorConfig,
    package: &str,
    type_name: &str,
) -> Result<String> {
    generate_spec(loader, config, package, type_name).map(|spec| render(&spec))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::golang::package::{check_package, ParsedFile};
    use crate::golang::parser::parse_checked;
    use crate::golang::syntax::lower_file;
    use crate::golang::ResolvedPackage;
    use std::path::PathBuf;

    /// Check a single-file package from source.
    pub fn package(source: &str) -> ResolvedPackage {
        let path = PathBuf::from("t.go");
        let ast = parse_checked(source, &path).expect("fixture parses");
        let files = vec![ParsedFile {
            syntax: lower_file(&ast),
            path,
        }];
        check_package(
            PathBuf::from("."),
            Some("example.com/pkg".to_string()),
            files,
            &|path: &str| path.rsplit('/').next().unwrap_or(path).to_string(),
        )
        .expect("fixture type-checks")
    }
}
