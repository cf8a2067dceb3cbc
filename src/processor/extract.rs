//! Reduces parsed Go functions to their conditional outline.
//!
//! Only `if` statements shape the outline. Bare blocks are transparent and
//! every other statement, including the bodies of loops and switches, is
//! dropped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ExtractError, SyntaxError};
use crate::model::{Alternative, Conditional, FunctionOutline};

use super::ast::{Block, Else, IfStmt, SourceFile, Stmt};
use super::go_parser;

/// Outcome for one scanned file. A failure here never affects its siblings.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<Vec<FunctionOutline>, ExtractError>,
}

/// One outline per function declaration, in declaration order.
pub fn extract(file: &SourceFile) -> Vec<FunctionOutline> {
    file.functions
        .iter()
        .map(|func| FunctionOutline {
            function: func.name.clone(),
            body: func.body.as_ref().map(reduce_block).unwrap_or_default(),
        })
        .collect()
}

pub fn extract_source(src: &str) -> Result<Vec<FunctionOutline>, SyntaxError> {
    let file = go_parser::parse_file(src)?;
    Ok(extract(&file))
}

pub fn extract_file(path: &Path) -> Result<Vec<FunctionOutline>, ExtractError> {
    let src = fs::read_to_string(path)?;
    Ok(extract_source(&src)?)
}

/// Walks `root` and extracts every `.go` file below it, sorted by path.
///
/// A `root` that is itself a file is always scanned, whatever its extension.
pub fn extract_path(root: &Path) -> Vec<FileReport> {
    let mut reports = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                warn!(path = %path.display(), "cannot walk entry: {e}");
                reports.push(FileReport {
                    path,
                    result: Err(ExtractError::Io(e.into())),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let is_go = entry.path().extension().is_some_and(|ext| ext == "go");
        if entry.depth() > 0 && !is_go {
            continue;
        }

        debug!(path = %entry.path().display(), "extracting");
        reports.push(FileReport {
            path: entry.path().to_path_buf(),
            result: extract_file(entry.path()),
        });
    }
    reports
}

fn reduce_block(block: &Block) -> Vec<Conditional> {
    let mut out = Vec::new();
    for stmt in &block.stmts {
        match stmt {
            Stmt::If(stmt) => out.push(reduce_if(stmt)),
            Stmt::Block(inner) => out.extend(reduce_block(inner)),
            Stmt::Other => {}
        }
    }
    out
}

fn reduce_if(stmt: &IfStmt) -> Conditional {
    let otherwise = stmt.otherwise.as_ref().map(|e| match e {
        Else::Block(block) => Alternative::Else(reduce_block(block)),
        Else::If(next) => Alternative::ElseIf(Box::new(reduce_if(next))),
    });
    Conditional {
        condition: stmt.condition.clone(),
        then: reduce_block(&stmt.then),
        otherwise,
    }
}
