//! Property-based tests for wrapper generation
//!
//! These tests verify invariants that should hold for all inputs:
//! - One wrapper method per exported method
//! - Only methods whose last result is `error` capture into `Err`
//! - Import paths are unique and qualifiers never collide

use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use stickygen::codegen::ImportSet;
use stickygen::golang::{ExternalType, TypeRef};
use stickygen::{FormatterKind, Generator, GeneratorConfig};
use tempfile::TempDir;

/// Exported Go method name
fn method_name() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9]{0,8}"
}

/// (non-error result count, ends with error)
fn result_shape() -> impl Strategy<Value = (usize, bool)> {
    (0usize..3, any::<bool>())
}

const PACKAGES: &[(&str, &str)] = &[
    ("math/rand", "rand"),
    ("crypto/rand", "rand"),
    ("example.com/x/rand", "rand"),
    ("text/template", "template"),
    ("html/template", "template"),
    ("context", "context"),
];

fn go_method(name: &str, plain: usize, with_error: bool) -> String {
    let mut results: Vec<&str> = vec!["int"; plain];
    if with_error {
        results.push("error");
    }
    let zeros: Vec<&str> = results
        .iter()
        .map(|r| if *r == "error" { "nil" } else { "0" })
        .collect();
    match results.len() {
        0 => format!("func (t *T) {name}() {{}}\n"),
        1 => format!("func (t *T) {name}() {} {{ return {} }}\n", results[0], zeros[0]),
        _ => format!(
            "func (t *T) {name}() ({}) {{ return {} }}\n",
            results.join(", "),
            zeros.join(", ")
        ),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: every exported method gets exactly one wrapper, and only
    /// the error-convention methods assign to `p.Err`
    #[test]
    fn prop_one_wrapper_per_method(
        methods in prop::collection::btree_map(method_name(), result_shape(), 0..8)
    ) {
        let temp = TempDir::new().unwrap();
        let mut source = String::from("package pkg\n\ntype T struct{}\n\n");
        for (name, (plain, with_error)) in &methods {
            source.push_str(&go_method(name, *plain, *with_error));
        }
        fs::write(temp.path().join("t.go"), &source).unwrap();

        let generator = Generator::new(
            GeneratorConfig::default()
                .with_base_dir(temp.path())
                .with_formatter(FormatterKind::None),
        );
        let spec = generator.spec(".", "T").unwrap();

        prop_assert_eq!(spec.methods.len(), methods.len());
        let shapes: BTreeMap<&str, &(usize, bool)> =
            methods.iter().map(|(k, v)| (k.as_str(), v)).collect();
        for wrapped in &spec.methods {
            let (plain, with_error) = shapes[wrapped.name.as_str()];
            prop_assert_eq!(wrapped.error_convention, *with_error);
            match &wrapped.returns {
                Some(targets) => {
                    prop_assert_eq!(targets.matches("_, ").count(), *plain);
                    prop_assert!(targets.ends_with("p.Err"));
                }
                None => prop_assert!(!with_error),
            }
        }

        let rendered = generator.generate(".", "T").unwrap();
        prop_assert_eq!(rendered.matches("func (p *errT) ").count(), methods.len());
    }

    /// Property: the import set has one entry per path and every entry is
    /// reachable through a distinct qualifier
    #[test]
    fn prop_imports_unique(picks in prop::collection::vec(0..PACKAGES.len(), 0..20)) {
        let mut set = ImportSet::new(Vec::<String>::new());
        for index in &picks {
            let (path, name) = PACKAGES[*index];
            set.record(&TypeRef::External(ExternalType {
                path: path.to_string(),
                package_name: name.to_string(),
                qualifier: name.to_string(),
                name: "X".to_string(),
                underlying: None,
            }));
        }

        let distinct: HashSet<usize> = picks.iter().copied().collect();
        let entries = set.entries();
        prop_assert_eq!(entries.len(), distinct.len());

        let mut qualifiers = HashSet::new();
        for entry in &entries {
            let package_name = PACKAGES
                .iter()
                .find(|(path, _)| *path == entry.path)
                .map(|(_, name)| *name)
                .unwrap();
            let qualifier = entry.alias.clone().unwrap_or_else(|| package_name.to_string());
            prop_assert!(qualifiers.insert(qualifier), "duplicate qualifier in {:?}", entries);
        }
    }
}
