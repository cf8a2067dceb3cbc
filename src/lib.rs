pub mod cli;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use tracing::error;

use cli::{Cli, Command, OutlineFormat};

pub fn run() -> anyhow::Result<()> {
    let args = Cli::parse();
    match args.command {
        Command::Generate { yaml, out, stdout } => generate(&yaml, &out, stdout),
        Command::Extract { path, format } => extract(&path, format),
    }
}

fn generate(yaml_path: &Path, out_dir: &Path, stdout: bool) -> anyhow::Result<()> {
    // 1. ── Parse ──────────────────────────────────────────────────────
    let yaml = std::fs::read_to_string(yaml_path)
        .with_context(|| format!("Reading {}", yaml_path.display()))?;
    let document = parser::load_from_yaml(&yaml)
        .with_context(|| format!("Loading call document {}", yaml_path.display()))?;

    // 2. ── Process ────────────────────────────────────────────────────
    let program = processor::render(&document).with_context(|| "Rendering Go program")?;

    // 3. ── Write outputs ──────────────────────────────────────────────
    if stdout {
        print!("{program}");
        return Ok(());
    }
    let path = writer::go::emit(&program, out_dir, chrono::Utc::now())
        .with_context(|| format!("Writing into {}", out_dir.display()))?;
    println!("File generated successfully: {}", path.display());

    Ok(())
}

fn extract(root: &Path, format: OutlineFormat) -> anyhow::Result<()> {
    if !root.exists() {
        anyhow::bail!("{} does not exist", root.display());
    }

    let reports = processor::extract_path(root);
    let mut outlines = Vec::new();
    let mut failed = 0;
    for report in &reports {
        match &report.result {
            Ok(functions) => outlines.push((report.path.as_path(), functions.as_slice())),
            Err(e) => {
                failed += 1;
                error!(path = %report.path.display(), "{e}");
            }
        }
    }

    let rendered = match format {
        OutlineFormat::Yaml => writer::outline::to_yaml(&outlines)?,
        OutlineFormat::Json => writer::outline::to_json(&outlines)?,
    };
    print!("{rendered}");

    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed to parse", reports.len());
    }
    Ok(())
}
