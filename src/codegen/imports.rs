//! Import collection for the generated file.
//!
//! Every external named type in a wrapped method signature needs its
//! package imported. Entries are keyed by import path so each package is
//! imported once. When two different paths want the same qualifier, the
//! later one is renamed with a numeric suffix (`rand`, `rand2`).

use crate::golang::{ExternalType, TypeRef};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One line of the generated import block
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ImportEntry {
    pub path: String,
    /// Set only when the qualifier differs from the package's own name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone)]
struct Chosen {
    qualifier: String,
    package_name: String,
}

/// Deduplicated import set with collision-free qualifiers.
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    by_path: BTreeMap<String, Chosen>,
    taken: HashMap<String, String>,
    excluded: BTreeSet<String>,
}

impl ImportSet {
    /// `excluded` lists import paths that must never be imported, such as
    /// the package the generated file belongs to. Types from those packages
    /// render unqualified.
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Record every external type reachable from `ty`.
    pub fn record(&mut self, ty: &TypeRef) {
        let mut found = Vec::new();
        ty.for_each_external(&mut |ext| found.push(ext));
        for ext in found {
            self.add(ext);
        }
    }

    fn add(&mut self, ext: &ExternalType) {
        if self.excluded.contains(&ext.path) || self.by_path.contains_key(&ext.path) {
            return;
        }
        let qualifier = self.free_qualifier(ext);
        self.taken.insert(qualifier.clone(), ext.path.clone());
        self.by_path.insert(
            ext.path.clone(),
            Chosen {
                qualifier,
                package_name: ext.package_name.clone(),
            },
        );
    }

    fn free_qualifier(&self, ext: &ExternalType) -> String {
        let preferred = if ext.qualifier.is_empty() {
            &ext.package_name
        } else {
            &ext.qualifier
        };
        for candidate in [preferred, &ext.package_name] {
            if !self.taken.contains_key(candidate.as_str()) {
                return candidate.clone();
            }
        }
        (2..)
            .map(|n| format!("{preferred}{n}"))
            .find(|candidate| !self.taken.contains_key(candidate))
            .unwrap_or_else(|| preferred.clone())
    }

    /// Qualifier the generated file uses for `ext`. Empty for excluded
    /// packages.
    pub fn qualifier_for(&self, ext: &ExternalType) -> String {
        if self.excluded.contains(&ext.path) {
            return String::new();
        }
        self.by_path
            .get(&ext.path)
            .map(|chosen| chosen.qualifier.clone())
            .unwrap_or_else(|| ext.qualifier.clone())
    }

    /// Whether `name` is in use as a package qualifier.
    pub fn is_qualifier(&self, name: &str) -> bool {
        self.taken.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Import lines sorted by path.
    pub fn entries(&self) -> Vec<ImportEntry> {
        self.by_path
            .iter()
            .map(|(path, chosen)| ImportEntry {
                path: path.clone(),
                alias: (chosen.qualifier != chosen.package_name)
                    .then(|| chosen.qualifier.clone()),
            })
            .collect()
    }
}
