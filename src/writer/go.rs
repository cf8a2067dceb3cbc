//! Writes a rendered program into the output directory.

use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// `generated-YYYYMMDD-HHMMSS.go`, taken from the UTC wall clock.
pub fn file_name(timestamp: DateTime<Utc>) -> String {
    format!("generated-{}.go", timestamp.format("%Y%m%d-%H%M%S"))
}

/// Creates `out_dir` if needed and writes `program` there.
///
/// An existing file with the same name is overwritten.
pub fn emit(program: &str, out_dir: &Path, timestamp: DateTime<Utc>) -> io::Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(file_name(timestamp));
    let mut f = File::create(&path)?;
    f.write_all(program.as_bytes())?;
    f.flush()?;
    Ok(path)
}
