use chrono::{DateTime, Utc};
use clap::ValueEnum;
use fs_err as fs;
use std::path::{Path, PathBuf};

use crate::errors::MobiusError;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Md,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
        }
    }
}

pub fn file_name(format: ExportFormat, created_at: DateTime<Utc>) -> String {
    format!("MobiusPrime_Output_{}.{}", created_at.timestamp_millis(), format.extension())
}

/// Write `content` unchanged into `dir`; both formats carry identical bytes.
pub fn export(
    content: &str,
    format: ExportFormat,
    dir: &Path,
    created_at: DateTime<Utc>,
) -> Result<PathBuf, MobiusError> {
    if content.is_empty() {
        return Err(MobiusError::Export("nothing to export".into()));
    }
    let err = |e: std::io::Error| MobiusError::Export(e.to_string());
    fs::create_dir_all(dir).map_err(err)?;
    let path = dir.join(file_name(format, created_at));
    fs::write(&path, content).map_err(err)?;
    Ok(path)
}
