//! Writing rendered exports to disk.
//!
//! Files are staged as `.<name>.tmp` next to the target and renamed into place,
//! so a reader never sees a half-written export.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{RenderError, RenderResult, RenderedExport};

/// Staged export file: temp path until committed, final path afterwards.
pub struct ExportFile {
    temp_path: Option<PathBuf>,
    final_path: PathBuf,
}

impl ExportFile {
    /// Stage `export` inside `output_dir`, creating the directory if needed.
    pub fn stage(output_dir: &Path, export: &RenderedExport) -> RenderResult<Self> {
        std::fs::create_dir_all(output_dir).map_err(|source| RenderError::Output {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let final_path = output_dir.join(&export.file_name);
        let temp_path = output_dir.join(format!(".{}.tmp", export.file_name));

        std::fs::write(&temp_path, &export.bytes).map_err(|source| RenderError::Output {
            path: temp_path.clone(),
            source,
        })?;

        Ok(Self {
            temp_path: Some(temp_path),
            final_path,
        })
    }

    /// Move the staged file into place, replacing any previous export.
    pub fn commit(mut self) -> RenderResult<PathBuf> {
        if let Some(temp_path) = self.temp_path.take() {
            std::fs::rename(&temp_path, &self.final_path).map_err(|source| {
                let _ = std::fs::remove_file(&temp_path);
                RenderError::Output {
                    path: self.final_path.clone(),
                    source,
                }
            })?;
            info!(path = %self.final_path.display(), "Export written");
        }
        Ok(self.final_path.clone())
    }
}

impl Drop for ExportFile {
    fn drop(&mut self) {
        if let Some(temp_path) = &self.temp_path {
            if temp_path.exists() {
                let _ = std::fs::remove_file(temp_path);
                warn!(path = %temp_path.display(), "Removed uncommitted export");
            }
        }
    }
}

/// Stage and commit in one step.
pub fn write_export(output_dir: &Path, export: &RenderedExport) -> RenderResult<PathBuf> {
    ExportFile::stage(output_dir, export)?.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn export(name: &str, bytes: &[u8]) -> RenderedExport {
        RenderedExport {
            bytes: bytes.to_vec(),
            file_name: name.to_string(),
            content_type: "text/csv",
            charset: "utf-8".to_string(),
        }
    }

    #[test]
    fn test_write_export_commits_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested");

        let path = write_export(&out, &export("answers.csv", b"form\n")).unwrap();

        assert_eq!(path, out.join("answers.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"form\n");
        assert!(!out.join(".answers.csv.tmp").exists());
    }

    #[test]
    fn test_dropped_stage_cleans_up() {
        let dir = tempdir().unwrap();
        let staged = ExportFile::stage(dir.path(), &export("x.xml", b"<a/>")).unwrap();
        assert!(dir.path().join(".x.xml.tmp").exists());

        drop(staged);

        assert!(!dir.path().join(".x.xml.tmp").exists());
        assert!(!dir.path().join("x.xml").exists());
    }

    #[test]
    fn test_commit_replaces_previous_export() {
        let dir = tempdir().unwrap();
        write_export(dir.path(), &export("a.csv", b"old")).unwrap();
        write_export(dir.path(), &export("a.csv", b"new")).unwrap();
        assert_eq!(std::fs::read(dir.path().join("a.csv")).unwrap(), b"new");
    }

    #[test]
    fn test_output_error_names_path_once() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("plain-file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = write_export(&blocker.join("sub"), &export("a.csv", b"x")).unwrap_err();
        let source = std::error::Error::source(&err).unwrap().to_string();

        assert!(matches!(err, RenderError::Output { .. }));
        assert!(err.to_string().starts_with("Failed to write export "));
        assert!(!err.to_string().contains(&source));
    }
}
