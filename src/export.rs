//! Downloadable JSON report of the latest summary.

use crate::summary::BookSummary;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write report: {0}")]
    WriteError(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct Report<'a> {
    title: &'a str,
    summary: &'a str,
}

/// A named file ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub contents: String,
}

impl DownloadArtifact {
    /// Title and narrative summary as four-space indented JSON
    pub fn from_summary(summary: &BookSummary) -> Result<Self, ExportError> {
        let report = Report {
            title: &summary.title,
            summary: &summary.summary,
        };

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        report.serialize(&mut serializer)?;

        Ok(Self {
            file_name: file_name_for(&summary.title),
            contents: String::from_utf8_lossy(&buf).into_owned(),
        })
    }

    /// Write the artifact into `dir`, returning the full path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents)?;
        tracing::info!(path = %path.display(), "summary report written");
        Ok(path)
    }
}

/// `The Old Man` -> `The_Old_Man_summary.json`
fn file_name_for(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("{}_summary.json", stem)
}
