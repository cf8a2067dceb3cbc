//! Document assembler: header, imports, assets, body, cleanup and entry point.
//!
//! The output is a pure function of the document. Two runs over the same
//! document produce the same bytes; the output file name is the writer's
//! business.

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::model::{Document, Import, Operation};
use crate::parser::{DEFAULT_CLEAN_FUNCTION, DEFAULT_TEST_FUNCTION};

use super::literal::{is_identifier, quote};
use super::render::{self, Fragment};

/// Body/cleanup function names and whether `main` wires them up.
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    pub test_function: String,
    pub clean_function: String,
    pub wired: bool,
}

/// Find the Start descriptor, if any. More than one is a configuration error.
pub fn lifecycle(doc: &Document) -> Result<Lifecycle, ConfigError> {
    let mut found: Option<(usize, &str, &str)> = None;
    for (i, op) in doc.endpoint_calls.iter().enumerate() {
        let Operation::Start {
            test_function,
            clean_function,
        } = op
        else {
            continue;
        };
        if let Some((first, _, _)) = found {
            return Err(ConfigError::invalid(
                format!("endpointCalls[{i}]"),
                format!("duplicate Start, already declared at endpointCalls[{first}]"),
            ));
        }
        found = Some((i, test_function.as_str(), clean_function.as_str()));
    }

    let Some((i, test_function, clean_function)) = found else {
        return Ok(Lifecycle {
            test_function: DEFAULT_TEST_FUNCTION.into(),
            clean_function: DEFAULT_CLEAN_FUNCTION.into(),
            wired: false,
        });
    };

    for (field, name) in [
        ("testFunction", test_function),
        ("cleanFunction", clean_function),
    ] {
        if !is_identifier(name) || name == "main" || name == "init" {
            return Err(ConfigError::invalid(
                format!("endpointCalls[{i}].{field}"),
                format!("`{name}` cannot name a Go function here"),
            ));
        }
    }
    if test_function == clean_function {
        return Err(ConfigError::invalid(
            format!("endpointCalls[{i}].cleanFunction"),
            "test and clean functions must differ",
        ));
    }

    Ok(Lifecycle {
        test_function: test_function.into(),
        clean_function: clean_function.into(),
        wired: true,
    })
}

/// Render the complete Go program for `doc`.
///
/// Nothing is produced unless the whole document is valid.
pub fn assemble(doc: &Document) -> Result<String, ConfigError> {
    check_imports(&doc.imports)?;
    let lifecycle = lifecycle(doc)?;

    let mut out = String::new();
    header(&mut out, doc);
    imports(&mut out, &doc.imports);

    for file in &doc.embedded_files {
        debug!(name = %file.name, "embedding asset");
        out.push_str(&file.content);
        if !file.content.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }

    body(&mut out, doc, &lifecycle.test_function);

    out.push_str(&format!("func {}() {{\n", lifecycle.clean_function));
    out.push_str("\tEndpoint.Say(\"Cleaning up\")\n");
    out.push_str("}\n\n");

    out.push_str("func main() {\n");
    if lifecycle.wired {
        out.push_str(&format!(
            "\tEndpoint.Start({}, {})\n",
            lifecycle.test_function, lifecycle.clean_function
        ));
    }
    out.push_str("}\n");

    Ok(out)
}

fn check_imports(imports: &[Import]) -> Result<(), ConfigError> {
    for (i, import) in imports.iter().enumerate() {
        if let Some(alias) = &import.alias {
            if alias != "." && !is_identifier(alias) {
                return Err(ConfigError::invalid(
                    format!("imports[{i}].alias"),
                    format!("`{alias}` is not a valid package name"),
                ));
            }
        }
    }
    Ok(())
}

fn header(out: &mut String, doc: &Document) {
    out.push_str("/*\n");
    for (label, value) in [
        ("ID", &doc.id),
        ("NAME", &doc.name),
        ("UNIT", &doc.unit),
        ("CREATED", &doc.created),
    ] {
        out.push_str(&format!("{label}: {}\n", value.replace("*/", "* /")));
    }
    out.push_str("*/\n");
    out.push_str("package main\n\n");
}

fn imports(out: &mut String, imports: &[Import]) {
    if imports.is_empty() {
        return;
    }
    out.push_str("import (\n");
    for import in imports {
        match &import.alias {
            Some(alias) => {
                out.push_str(&format!("\t{alias} {}\n", quote(&import.path)));
            }
            None => {
                out.push_str(&format!("\t{}\n", quote(&import.path)));
            }
        }
    }
    out.push_str(")\n\n");
}

fn body(out: &mut String, doc: &Document, name: &str) {
    out.push_str(&format!("func {name}() {{\n"));

    let endpoint_count = doc.endpoint_calls.len();
    let mut network_started = false;
    for (index, op) in doc.operations().enumerate() {
        if let Operation::Unknown { kind } = op {
            warn!(index, %kind, "skipping unknown operation kind");
            continue;
        }
        if op.is_lifecycle() {
            debug!(index, kind = op.kind(), "lifecycle marker");
            continue;
        }

        let fragment: Fragment = render::render(op, index);
        if index >= endpoint_count && !network_started {
            out.push_str("\n\t// Network calls\n");
            network_started = true;
        }
        for line in fragment.lines() {
            out.push_str(&format!("\t{line}\n"));
        }
    }

    out.push_str("}\n\n");
}
