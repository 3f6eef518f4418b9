//! Compiled templates

use tracing::trace;

use crate::error::Result;
use crate::script::{self, Program};
use crate::template::{Encoding, Source, SyntaxConfig, TemplateParser};

/// Generated code and its program for one template name
#[derive(Debug, Clone)]
pub struct CompiledArtifact {
    pub name: String,
    /// Generated program text, kept for diagnostics
    pub code: String,
    pub encoding: Encoding,
    pub program: Program,
}

/// Translate `source` and compile the generated code
pub fn compile(
    name: &str,
    source: &Source,
    syntax: &SyntaxConfig,
    trim_line_breaks: bool,
) -> Result<CompiledArtifact> {
    let generated = TemplateParser::new(source.text(), syntax)
        .with_name(name)
        .trim_line_breaks(trim_line_breaks)
        .translate()?;
    let code = generated.to_string();
    trace!(template = name, code = %code, "generated code");

    let program = script::compile(&generated, name)?;
    Ok(CompiledArtifact {
        name: name.to_string(),
        code,
        encoding: source.encoding(),
        program,
    })
}
