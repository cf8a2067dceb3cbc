//! Component 3 – the functional core.
//!
//! Two independent passes live here: rendering a validated `Document` into
//! Go source, and extracting conditional outlines back out of Go source.
pub mod assemble;
pub mod ast;
pub mod extract;
pub mod go_parser;
pub mod lexer;
pub mod literal;
pub mod render;

pub use extract::{FileReport, extract_file, extract_path, extract_source};

use crate::error::ConfigError;
use crate::model::Document;
use tracing::info;

/// Renders the complete Go program for `doc`.
pub fn render(doc: &Document) -> Result<String, ConfigError> {
    let program = assemble::assemble(doc)?;
    info!(
        id = %doc.id,
        operations = doc.operations().count(),
        bytes = program.len(),
        "rendered program"
    );
    Ok(program)
}
