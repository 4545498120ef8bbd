//! CSV export.

use crate::error::{CleaningError, Result, ResultExt};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where and how much was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Writes the final table to CSV.
pub struct Exporter;

impl Exporter {
    /// Write `df` as CSV with a header row.
    ///
    /// An empty table is not written: a warning is logged and `Ok(None)`
    /// returned. Missing parent directories are created. Failures to create
    /// the directory or write the file are returned to the caller.
    pub fn export(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<Option<ExportOutcome>> {
        let path = path.as_ref();

        if df.height() == 0 {
            warn!("No data exported due to empty or invalid input");
            return Ok(None);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(CleaningError::from)
                .context(format!("Creating output directory {}", parent.display()))?;
        }

        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)
            .context(format!("Writing {}", path.display()))?;

        info!("Exported {} merged records to {}", df.height(), path.display());

        Ok(Some(ExportOutcome {
            path: path.to_path_buf(),
            rows: df.height(),
            columns: df.width(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/cleaned.csv");
        let mut df = df![
            "price" => [300000.0, 195000.0],
            "locality" => ["BRUSSELS", "GENT"],
        ]
        .unwrap();

        let outcome = Exporter::export(&mut df, &path).unwrap().unwrap();
        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.columns, 2);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("price,locality\n"));
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_empty_table_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cleaned.csv");
        let mut df = DataFrame::empty();

        assert!(Exporter::export(&mut df, &path).unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = TempDir::new().unwrap();
        // a file where a directory is expected
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let mut df = df!["price" => [1.0]].unwrap();

        let result = Exporter::export(&mut df, blocker.join("out.csv"));
        assert!(result.is_err());
    }
}
