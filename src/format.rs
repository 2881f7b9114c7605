//! Post-processing of the generated document.
//!
//! The rendered source must be syntactically valid Go. A formatter either
//! canonicalises it (`gofmt`) or only verifies that it parses; any rejection
//! is an internal invariant violation and surfaces as [`GenError::Format`].

use crate::config::FormatterKind;
use crate::errors::{GenError, Result};
use crate::golang::parser::{first_syntax_error, parse_source};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

const GENERATED_PATH: &str = "<generated>";

pub trait SourceFormatter {
    fn name(&self) -> &'static str;
    fn format(&self, source: &str) -> Result<String>;
}

/// Verifies that the document parses and returns it unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxCheck;

impl SourceFormatter for SyntaxCheck {
    fn name(&self) -> &'static str {
        "syntax-check"
    }

    fn format(&self, source: &str) -> Result<String> {
        let ast = parse_source(source, Path::new(GENERATED_PATH))?;
        if let Some((line, column, message)) = first_syntax_error(&ast.tree.root_node(), source) {
            return Err(GenError::Format(format!("{line}:{column}: {message}")));
        }
        Ok(source.to_string())
    }
}

/// Pipes the document through an external `gofmt`.
#[derive(Debug, Clone)]
pub struct Gofmt {
    binary: PathBuf,
}

impl Gofmt {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// `gofmt` from PATH, if installed.
    pub fn locate() -> Option<Self> {
        which::which("gofmt").ok().map(Self::new)
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl SourceFormatter for Gofmt {
    fn name(&self) -> &'static str {
        "gofmt"
    }

    fn format(&self, source: &str) -> Result<String> {
        let mut child = Command::new(&self.binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GenError::io(&self.binary, e))?;

        // Feed stdin from another thread so a full stdout pipe cannot stall us.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| GenError::io(&self.binary, io::Error::other("stdin not captured")))?;
        let input = source.to_string();
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child
            .wait_with_output()
            .map_err(|e| GenError::io(&self.binary, e))?;
        match writer.join() {
            Ok(written) => written.map_err(|e| GenError::io(&self.binary, e))?,
            Err(_) => {
                return Err(GenError::io(
                    &self.binary,
                    io::Error::other("stdin writer panicked"),
                ))
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenError::Format(stderr.trim().replace(
                "<standard input>",
                GENERATED_PATH,
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| GenError::Format(format!("gofmt produced invalid UTF-8: {e}")))
    }
}

/// Pick the formatter for `kind`.
pub fn formatter_for(kind: FormatterKind) -> Result<Box<dyn SourceFormatter>> {
    let formatter: Box<dyn SourceFormatter> = match kind {
        FormatterKind::Auto => match Gofmt::locate() {
            Some(gofmt) => Box::new(gofmt),
            None => Box::new(SyntaxCheck),
        },
        FormatterKind::Gofmt => Box::new(Gofmt::locate().ok_or_else(|| {
            GenError::io(
                "gofmt",
                io::Error::new(io::ErrorKind::NotFound, "gofmt not found in PATH"),
            )
        })?),
        FormatterKind::None => Box::new(SyntaxCheck),
    };
    debug!(formatter = formatter.name(), "Selected formatter");
    Ok(formatter)
}
