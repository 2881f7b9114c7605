//! Generator configuration.
//!
//! There is no configuration file: the binary fills [`GeneratorConfig`] from
//! command-line flags and the Go environment variables (`GOPACKAGE`, `GOOS`,
//! `GOARCH`, `GOROOT`, `GOPATH`). Library users build it directly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which formatter post-processes the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// `gofmt` when it is on PATH, syntax check otherwise
    #[default]
    Auto,
    /// Always pipe through `gofmt`
    Gofmt,
    /// Only verify that the document parses
    None,
}

/// How package identifiers are turned into source directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Directory relative identifiers and `go.mod` lookup start from
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Go installation root; `$GOROOT/src` is searched for standard packages
    #[serde(default)]
    pub goroot: Option<PathBuf>,

    /// GOPATH workspaces; `<entry>/src` is searched for import paths
    #[serde(default)]
    pub gopath: Vec<PathBuf>,

    /// Target operating system for file-name build constraints
    #[serde(default = "default_goos")]
    pub goos: String,

    /// Target architecture for file-name build constraints
    #[serde(default = "default_goarch")]
    pub goarch: String,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Map the host OS onto Go's GOOS spelling.
pub fn default_goos() -> String {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
    .to_string()
}

/// Map the host architecture onto Go's GOARCH spelling.
pub fn default_goarch() -> String {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
    .to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            goroot: None,
            gopath: Vec::new(),
            goos: default_goos(),
            goarch: default_goarch(),
        }
    }
}

impl LoaderConfig {
    /// Fill unset roots from the environment the way the go tool does:
    /// `GOROOT`, then `GOPATH` (default `$HOME/go`).
    pub fn with_env_defaults(mut self) -> Self {
        if self.goroot.is_none() {
            self.goroot = std::env::var_os("GOROOT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from);
        }
        if self.gopath.is_empty() {
            self.gopath = match std::env::var_os("GOPATH").filter(|v| !v.is_empty()) {
                Some(value) => std::env::split_paths(&value).collect(),
                None => std::env::var_os("HOME")
                    .map(|home| vec![PathBuf::from(home).join("go")])
                    .unwrap_or_default(),
            };
        }
        self
    }
}

/// Root configuration for one generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Package clause of the generated document (default: the target's package name)
    #[serde(default)]
    pub output_package: Option<String>,

    /// Import path of the package the document is generated into; never imported
    #[serde(default)]
    pub output_import_path: Option<String>,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub formatter: FormatterKind,
}

impl GeneratorConfig {
    pub fn with_output_package(mut self, name: impl Into<String>) -> Self {
        self.output_package = Some(name.into());
        self
    }

    pub fn with_output_import_path(mut self, path: impl Into<String>) -> Self {
        self.output_import_path = Some(path.into());
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.loader.base_dir = dir.into();
        self
    }

    pub fn with_formatter(mut self, formatter: FormatterKind) -> Self {
        self.formatter = formatter;
        self
    }
}
