//! Serialises extraction results for stdout.

use serde::Serialize;
use std::path::Path;

use crate::model::FunctionOutline;

#[derive(Serialize)]
struct FileOutline<'a> {
    file: String,
    functions: &'a [FunctionOutline],
}

/// One YAML document per file, each preceded by a `# path` comment.
pub fn to_yaml(files: &[(&Path, &[FunctionOutline])]) -> Result<String, serde_yaml::Error> {
    let mut out = String::new();
    for (path, functions) in files {
        out.push_str("---\n");
        out.push_str(&format!("# {}\n", path.display()));
        out.push_str(&serde_yaml::to_string(functions)?);
    }
    Ok(out)
}

/// A single JSON array of `{ "file": …, "functions": […] }` objects.
pub fn to_json(files: &[(&Path, &[FunctionOutline])]) -> Result<String, serde_json::Error> {
    let entries: Vec<FileOutline> = files
        .iter()
        .map(|(path, functions)| FileOutline {
            file: path.display().to_string(),
            functions,
        })
        .collect();
    let mut out = serde_json::to_string_pretty(&entries)?;
    out.push('\n');
    Ok(out)
}
