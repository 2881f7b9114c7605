use crate::config::{FormatterKind, GeneratorConfig, LoaderConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatterArg {
    /// gofmt when installed, syntax check otherwise
    Auto,
    /// Always run gofmt
    Gofmt,
    /// Only check that the output parses
    None,
}

impl From<FormatterArg> for FormatterKind {
    fn from(arg: FormatterArg) -> Self {
        match arg {
            FormatterArg::Auto => FormatterKind::Auto,
            FormatterArg::Gofmt => FormatterKind::Gofmt,
            FormatterArg::None => FormatterKind::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmitKind {
    /// Formatted Go source
    Source,
    /// The wrapper description as JSON
    Spec,
}

#[derive(Parser, Debug)]
#[command(name = "stickygen")]
#[command(about = "Generate sticky-error wrappers for Go types", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Package to inspect: an import path or a ./relative directory
    pub package: String,

    /// Exported type whose methods are wrapped
    pub type_name: String,

    /// Package clause of the generated file (defaults to the inspected package's name)
    #[arg(short = 'p', long = "package", env = "GOPACKAGE")]
    pub output_package: Option<String>,

    /// Import path of the package the file is generated into; never imported
    #[arg(long = "import-path")]
    pub output_import_path: Option<String>,

    /// Directory to resolve relative packages and go.mod from
    #[arg(short = 'C', long = "dir", default_value = ".")]
    pub dir: PathBuf,

    /// Formatter applied to the generated source
    #[arg(long, value_enum, default_value = "auto")]
    pub formatter: FormatterArg,

    /// Target operating system for build constraints
    #[arg(long, env = "GOOS")]
    pub goos: Option<String>,

    /// Target architecture for build constraints
    #[arg(long, env = "GOARCH")]
    pub goarch: Option<String>,

    /// Go installation root
    #[arg(long, env = "GOROOT")]
    pub goroot: Option<PathBuf>,

    /// GOPATH workspace roots
    #[arg(long, env = "GOPATH", value_delimiter = ':')]
    pub gopath: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// What to write
    #[arg(long, value_enum, default_value = "source")]
    pub emit: EmitKind,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Cli {
    /// Generator configuration from flags and environment.
    pub fn generator_config(&self) -> GeneratorConfig {
        let defaults = LoaderConfig::default();
        let loader = LoaderConfig {
            base_dir: self.dir.clone(),
            goroot: self.goroot.clone(),
            gopath: self.gopath.clone(),
            goos: self.goos.clone().filter(|s| !s.is_empty()).unwrap_or(defaults.goos),
            goarch: self
                .goarch
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.goarch),
        }
        .with_env_defaults();

        GeneratorConfig {
            output_package: self.output_package.clone().filter(|s| !s.is_empty()),
            output_import_path: self.output_import_path.clone(),
            loader,
            formatter: self.formatter.into(),
        }
    }

    /// Default tracing filter directive for the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["stickygen", "./pkg", "T", "--formatter", "none"]).unwrap();
        assert_eq!(cli.package, "./pkg");
        assert_eq!(cli.type_name, "T");
        let config = cli.generator_config();
        assert_eq!(config.formatter, FormatterKind::None);
        assert_eq!(config.loader.base_dir, PathBuf::from("."));
    }

    #[test]
    fn test_flags_fill_config() {
        let cli = Cli::try_parse_from([
            "stickygen",
            "example.com/store",
            "Conn",
            "-p",
            "wrap",
            "--import-path",
            "example.com/wrap",
            "-C",
            "/src/project",
            "--goos",
            "windows",
            "--emit",
            "spec",
            "-vvv",
        ])
        .unwrap();
        let config = cli.generator_config();
        assert_eq!(config.output_package.as_deref(), Some("wrap"));
        assert_eq!(config.output_import_path.as_deref(), Some("example.com/wrap"));
        assert_eq!(config.loader.base_dir, PathBuf::from("/src/project"));
        assert_eq!(config.loader.goos, "windows");
        assert_eq!(cli.emit, EmitKind::Spec);
        assert_eq!(cli.log_level(), "trace");
    }

    #[test]
    fn test_type_name_is_required() {
        assert!(Cli::try_parse_from(["stickygen", "./pkg"]).is_err());
    }
}
