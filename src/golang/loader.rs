//! Package loading: locating a package's directory, selecting its files,
//! parsing and checking them.

use super::build::BuildContext;
use super::package::{check_package, ParsedFile, ResolvedPackage};
use super::parser::{parse_checked, parse_source};
use super::syntax::{lower_file, package_name};
use crate::config::LoaderConfig;
use crate::errors::{GenError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, debug_span};

/// Resolves a package identifier into a type-checked package.
///
/// Implementations either fully succeed or fail; a partially checked package
/// is never returned.
pub trait PackageLoader {
    fn resolve(&self, identifier: &str) -> Result<ResolvedPackage>;
}

/// A package directory found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedPackage {
    pub dir: PathBuf,
    pub import_path: Option<String>,
    pub files: Vec<PathBuf>,
}

/// The main module, from the nearest `go.mod`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Module {
    root: PathBuf,
    path: String,
}

/// Loads packages from Go source on disk.
pub struct SourceLoader {
    config: LoaderConfig,
    build: BuildContext,
    module: Option<Module>,
}

impl SourceLoader {
    pub fn new(config: LoaderConfig) -> Self {
        let build = BuildContext::new(config.goos.clone(), config.goarch.clone());
        let module = find_module(&absolute(&config.base_dir));
        if let Some(module) = &module {
            debug!(module = %module.path, root = %module.root.display(), "Found main module");
        }
        Self {
            config,
            build,
            module,
        }
    }

    /// Find the directory and eligible files of a package.
    pub fn locate(&self, identifier: &str) -> Result<LocatedPackage> {
        let mut searched = Vec::new();
        for (dir, import_path) in self.candidate_dirs(identifier) {
            if !dir.is_dir() {
                searched.push(dir);
                continue;
            }
            let files = self.eligible_files(&dir)?;
            if files.is_empty() {
                debug!(dir = %dir.display(), "No buildable Go files");
                searched.push(dir);
                continue;
            }
            return Ok(LocatedPackage {
                dir,
                import_path,
                files,
            });
        }
        Err(GenError::PackageNotFound {
            identifier: identifier.to_string(),
            searched,
        })
    }

    fn candidate_dirs(&self, identifier: &str) -> Vec<(PathBuf, Option<String>)> {
        if is_local_identifier(identifier) {
            let dir = self.config.base_dir.join(identifier);
            let import_path = self
                .module
                .as_ref()
                .and_then(|m| module_import_path(m, &absolute(&dir)));
            return vec![(dir, import_path)];
        }

        let mut candidates = Vec::new();
        if let Some(module) = &self.module {
            if identifier == module.path {
                candidates.push((module.root.clone(), Some(identifier.to_string())));
            } else if let Some(rest) = identifier.strip_prefix(&format!("{}/", module.path)) {
                candidates.push((module.root.join(rest), Some(identifier.to_string())));
            }
            candidates.push((
                module.root.join("vendor").join(identifier),
                Some(identifier.to_string()),
            ));
        }
        if let Some(goroot) = &self.config.goroot {
            candidates.push((goroot.join("src").join(identifier), Some(identifier.to_string())));
        }
        for gopath in &self.config.gopath {
            candidates.push((gopath.join("src").join(identifier), Some(identifier.to_string())));
        }
        candidates
    }

    /// `.go` files that belong to the package for the configured platform,
    /// sorted by name.
    pub fn eligible_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| GenError::io(dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| GenError::io(dir, e))?.path();
            if path.is_file() && self.build.matches_file_name(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Name declared by the package at an import path, if its sources can be
    /// found.
    pub fn declared_package_name(&self, import_path: &str) -> Option<String> {
        let located = self.locate(import_path).ok()?;
        located.files.iter().find_map(|file| {
            let source = fs::read_to_string(file).ok()?;
            if !self.build.matches_source(&source) {
                return None;
            }
            let ast = parse_source(&source, file).ok()?;
            package_name(&ast)
        })
    }

    fn read_files(&self, files: &[PathBuf]) -> Result<Vec<ParsedFile>> {
        let mut parsed = Vec::new();
        for path in files {
            let source = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
            if !self.build.matches_source(&source) {
                debug!(file = %path.display(), "Excluded by build constraint");
                continue;
            }
            let ast = parse_checked(&source, path)?;
            debug!(file = %path.display(), bytes = source.len(), "Parsed file");
            parsed.push(ParsedFile {
                syntax: lower_file(&ast),
                path: path.clone(),
            });
        }
        Ok(parsed)
    }
}

impl PackageLoader for SourceLoader {
    fn resolve(&self, identifier: &str) -> Result<ResolvedPackage> {
        let _span = debug_span!("resolve_package", identifier).entered();

        let located = self.locate(identifier)?;
        let files = self.read_files(&located.files)?;
        if files.is_empty() {
            return Err(GenError::PackageNotFound {
                identifier: identifier.to_string(),
                searched: vec![located.dir],
            });
        }

        let names: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
        let package_name_of = |path: &str| -> String {
            if let Some(name) = names.borrow().get(path) {
                return name.clone();
            }
            let name = self
                .declared_package_name(path)
                .unwrap_or_else(|| default_package_name(path));
            names.borrow_mut().insert(path.to_string(), name.clone());
            name
        };

        let package = check_package(
            located.dir,
            located.import_path,
            files,
            &package_name_of,
        )?;
        debug!(
            package = package.name(),
            files = package.files().len(),
            "Type-checked package"
        );
        Ok(package)
    }
}

fn is_local_identifier(identifier: &str) -> bool {
    identifier == "."
        || identifier == ".."
        || identifier.starts_with("./")
        || identifier.starts_with("../")
        || Path::new(identifier).is_absolute()
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(path)),
        Err(_) => path.to_path_buf(),
    }
}

/// Lexically remove `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn find_module(start: &Path) -> Option<Module> {
    start.ancestors().find_map(|dir| {
        let contents = fs::read_to_string(dir.join("go.mod")).ok()?;
        let path = module_path(&contents)?;
        Some(Module {
            root: dir.to_path_buf(),
            path,
        })
    })
}

fn module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest
            .split("//")
            .next()
            .unwrap_or("")
            .trim()
            .trim_matches('"');
        (!path.is_empty()).then(|| path.to_string())
    })
}

fn module_import_path(module: &Module, dir: &Path) -> Option<String> {
    let rel = dir.strip_prefix(&module.root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        Some(module.path.clone())
    } else {
        Some(format!("{}/{}", module.path, parts.join("/")))
    }
}

/// Guess a package's name from its import path: the last element (or the
/// one before a `/vN` major version suffix), without a `go-` prefix, cut at
/// the first character that cannot appear in an identifier.
pub fn default_package_name(import_path: &str) -> String {
    let mut elements: Vec<&str> = import_path.split('/').filter(|e| !e.is_empty()).collect();
    let mut base = elements.pop().unwrap_or(import_path);
    if is_major_version(base) {
        if let Some(previous) = elements.pop() {
            base = previous;
        }
    }
    let base = base.strip_prefix("go-").unwrap_or(base);
    base.chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

fn is_major_version(element: &str) -> bool {
    element
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use tempfile::TempDir;

    fn loader_for(base: &Path) -> SourceLoader {
        SourceLoader::new(LoaderConfig {
            base_dir: base.to_path_buf(),
            goroot: None,
            gopath: Vec::new(),
            goos: "linux".into(),
            goarch: "amd64".into(),
        })
    }

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_default_package_name() {
        assert_eq!(default_package_name("database/sql"), "sql");
        assert_eq!(default_package_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(default_package_name("github.com/jackc/pgx/v5"), "pgx");
        assert_eq!(default_package_name("github.com/mattn/go-sqlite3"), "sqlite3");
        assert_eq!(default_package_name("github.com/nats-io/nats.go"), "nats");
        assert_eq!(default_package_name("github.com/influxdata/influxdb-client-go"), "influxdb");
        assert_eq!(default_package_name("context"), "context");
    }

    #[test]
    fn test_module_path_parsing() {
        assert_eq!(
            module_path("// comment\nmodule example.com/app // trailing\n\ngo 1.22\n"),
            Some("example.com/app".to_string())
        );
        assert_eq!(module_path("modules foo\n"), None);
    }

    #[test]
    fn test_locate_relative_dir_skips_test_files() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("pkg");
        write(&pkg, "t.go", "package pkg\n");
        write(&pkg, "t_test.go", "package pkg\n");
        write(&pkg, "t_windows.go", "package pkg\n");
        write(&pkg, "README.md", "docs\n");

        let located = loader_for(tmp.path()).locate("./pkg").unwrap();
        let names: Vec<_> = located
            .files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["t.go".to_string()]);
        assert!(located.import_path.is_none());
    }

    #[test]
    fn test_locate_import_path_in_module() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "go.mod", "module example.com/app\n\ngo 1.22\n");
        write(&tmp.path().join("store"), "store.go", "package store\n");

        let loader = loader_for(tmp.path());
        let located = loader.locate("example.com/app/store").unwrap();
        assert_eq!(located.import_path.as_deref(), Some("example.com/app/store"));

        let relative = loader.locate("./store").unwrap();
        assert_eq!(relative.import_path.as_deref(), Some("example.com/app/store"));
    }

    #[test]
    fn test_locate_in_gopath() {
        let tmp = TempDir::new().unwrap();
        let gopath = tmp.path().join("gopath");
        write(&gopath.join("src/example.org/lib"), "lib.go", "package lib\n");
        let loader = SourceLoader::new(LoaderConfig {
            base_dir: tmp.path().to_path_buf(),
            gopath: vec![gopath],
            ..LoaderConfig::default()
        });
        assert!(loader.locate("example.org/lib").is_ok());
    }

    #[test]
    fn test_missing_package() {
        let tmp = TempDir::new().unwrap();
        let err = loader_for(tmp.path()).resolve("./nowhere").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PackageNotFound);

        write(&tmp.path().join("empty"), "notes.txt", "nothing\n");
        let err = loader_for(tmp.path()).resolve("./empty").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PackageNotFound);
    }

    #[test]
    fn test_build_ignored_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("pkg");
        write(&pkg, "t.go", "package pkg\n\ntype T struct{}\n");
        write(&pkg, "gen.go", "//go:build ignore\n\npackage main\n\ntype T int\n");

        let resolved = loader_for(tmp.path()).resolve("./pkg").unwrap();
        assert_eq!(resolved.name(), "pkg");
        assert_eq!(resolved.files().len(), 1);
    }

    #[test]
    fn test_imports_use_declared_package_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "go.mod", "module example.com/app\n");
        write(&tmp.path().join("internal/go-util"), "u.go", "package util\n\ntype Opts struct{}\n");
        write(
            &tmp.path().join("pkg"),
            "t.go",
            "package pkg\n\nimport \"example.com/app/internal/go-util\"\n\ntype T struct{}\n\nfunc (t *T) Use(o util.Opts) {}\n",
        );

        let resolved = loader_for(tmp.path()).resolve("./pkg").unwrap();
        let method = resolved.method_set("T").next().unwrap();
        let mut paths = Vec::new();
        method.signature.as_ref().unwrap().params[0]
            .ty
            .for_each_external(&mut |e| paths.push((e.package_name.clone(), e.path.clone())));
        assert_eq!(
            paths,
            vec![("util".to_string(), "example.com/app/internal/go-util".to_string())]
        );
    }

    #[test]
    fn test_syntax_errors_surface_as_type_check_errors() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("pkg"), "t.go", "package pkg\n\nfunc (t *T) M( {\n");
        let err = loader_for(tmp.path()).resolve("./pkg").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCheckError);
    }
}
