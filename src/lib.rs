//! Sticky-error wrapper generator for Go types.
//!
//! Given a Go package and the name of an exported type, stickygen emits a
//! Go source file declaring `errT`: a struct holding `Val *T` and
//! `Err error`, with one method per exported method of `T`. Each wrapper
//! method returns early once `Err` is set and otherwise forwards the call,
//! capturing a trailing `error` result into `Err`.
//!
//! ```no_run
//! let source = stickygen::generate("./testdata/pkg", "T")?;
//! print!("{source}");
//! # Ok::<(), stickygen::GenError>(())
//! ```

pub mod cli;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod format;
pub mod golang;

pub use crate::codegen::{WrapperMethod, WrapperSpec};
pub use crate::config::{FormatterKind, GeneratorConfig, LoaderConfig};
pub use crate::errors::{ErrorCode, ErrorKind, GenError, Result};
pub use crate::format::{formatter_for, Gofmt, SourceFormatter, SyntaxCheck};
pub use crate::golang::{PackageLoader, ResolvedPackage, SourceLoader};

use tracing::debug;

/// Generate the wrapper for `type_name` in `package` with the default
/// configuration. The result is unformatted but syntactically valid Go.
pub fn generate(package: &str, type_name: &str) -> Result<String> {
    Generator::new(GeneratorConfig::default()).generate(package, type_name)
}

/// Runs generation with a fixed configuration.
pub struct Generator {
    config: GeneratorConfig,
    loader: Box<dyn PackageLoader>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let loader = SourceLoader::new(config.loader.clone().with_env_defaults());
        Self {
            config,
            loader: Box::new(loader),
        }
    }

    /// Use a custom package loader instead of reading Go source from disk.
    pub fn with_loader(config: GeneratorConfig, loader: Box<dyn PackageLoader>) -> Self {
        Self { config, loader }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The wrapper description, before rendering.
    pub fn spec(&self, package: &str, type_name: &str) -> Result<WrapperSpec> {
        codegen::generate_spec(self.loader.as_ref(), &self.config, package, type_name)
    }

    /// Unformatted wrapper source.
    pub fn generate(&self, package: &str, type_name: &str) -> Result<String> {
        codegen::generate_with(self.loader.as_ref(), &self.config, package, type_name)
    }

    /// Wrapper source passed through the configured formatter.
    pub fn run(&self, package: &str, type_name: &str) -> Result<String> {
        let source = self.generate(package, type_name)?;
        let formatter = formatter_for(self.config.formatter)?;
        let formatted = formatter.format(&source)?;
        debug!(
            formatter = formatter.name(),
            bytes = formatted.len(),
            "Formatted wrapper source"
        );
        Ok(formatted)
    }
}
