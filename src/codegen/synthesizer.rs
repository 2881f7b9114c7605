//! Rendering the wrapper source.
//!
//! Rendering is a pure function of [`WrapperSpec`]; nothing is cached
//! between invocations.

use super::classifier::WrapperMethod;
use super::imports::ImportEntry;
use serde::Serialize;
use std::fmt;

/// First line of every generated file. Go tooling recognises this form and
/// treats the file as machine-written.
pub const GENERATED_HEADER: &str = "// Code generated by stickygen. DO NOT EDIT.";

/// The full description of one generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrapperSpec {
    pub package: String,
    pub type_name: String,
    /// `type_name` as the generated file spells it, qualified when the file
    /// belongs to another package
    pub value_type: String,
    pub wrapper_name: String,
    pub imports: Vec<ImportEntry>,
    pub methods: Vec<WrapperMethod>,
}

/// Name of the wrapper type for `type_name`.
pub fn wrapper_name(type_name: &str) -> String {
    format!("err{type_name}")
}

/// Render `spec` as Go source.
pub fn render(spec: &WrapperSpec) -> String {
    Renderer { spec }.to_string()
}

struct Renderer<'a> {
    spec: &'a WrapperSpec,
}

impl Renderer<'_> {
    fn write_imports(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.spec.imports.is_empty() {
            return Ok(());
        }
        writeln!(f, "import (")?;
        for import in &self.spec.imports {
            match &import.alias {
                Some(alias) => writeln!(f, "\t{} {:?}", alias, import.path)?,
                None => writeln!(f, "\t{:?}", import.path)?,
            }
        }
        writeln!(f, ")")?;
        writeln!(f)
    }

    fn write_method(&self, f: &mut fmt::Formatter<'_>, method: &WrapperMethod) -> fmt::Result {
        let p = &method.receiver;
        writeln!(
            f,
            "func ({p} *{}) {}({}) {{",
            self.spec.wrapper_name, method.name, method.params
        )?;
        writeln!(f, "\tif {p}.Err != nil {{")?;
        writeln!(f, "\t\treturn")?;
        writeln!(f, "\t}}")?;
        match &method.returns {
            Some(targets) => writeln!(f, "\t{targets} = {p}.Val.{}({})", method.name, method.args)?,
            None => writeln!(f, "\t{p}.Val.{}({})", method.name, method.args)?,
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Renderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{GENERATED_HEADER}")?;
        writeln!(f)?;
        writeln!(f, "package {}", self.spec.package)?;
        writeln!(f)?;
        self.write_imports(f)?;
        writeln!(f, "type {} struct {{", self.spec.wrapper_name)?;
        writeln!(f, "\tVal *{}", self.spec.value_type)?;
        writeln!(f, "\tErr error")?;
        writeln!(f, "}}")?;
        for method in &self.spec.methods {
            writeln!(f)?;
            self.write_method(f, method)?;
        }
        Ok(())
    }
}
