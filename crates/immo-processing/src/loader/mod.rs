//! Input loading.
//!
//! Reads the raw listings file into a DataFrame. The format is picked from
//! the file extension. [`Loader::load`] never fails: a missing, empty,
//! unreadable or unsupported file is logged and yields an empty table so the
//! rest of the pipeline can decide what to do with "no data".

mod spreadsheet;
mod xml;

use crate::error::{CleaningError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Input formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Json,
    Parquet,
    Spreadsheet,
    Xml,
}

impl FileFormat {
    /// Map a path to its format, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "txt" | "tsv" => Some(Self::Tsv),
            "json" => Some(Self::Json),
            "parquet" => Some(Self::Parquet),
            "xls" | "xlsx" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

/// Reads tabular files into DataFrames.
pub struct Loader;

impl Loader {
    /// Load a file, degrading every failure to an empty DataFrame.
    pub fn load(path: impl AsRef<Path>) -> DataFrame {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(df) => df,
            Err(e) if e.is_input_error() => {
                warn!("{}", e);
                DataFrame::empty()
            }
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                DataFrame::empty()
            }
        }
    }

    /// Load a file, reporting why it could not be read.
    pub fn try_load(path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();

        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CleaningError::FileNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        if metadata.len() == 0 {
            return Err(CleaningError::EmptyFile(path.to_path_buf()));
        }

        let format = FileFormat::from_path(path).ok_or_else(|| {
            CleaningError::UnsupportedFormat(
                path.extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default(),
            )
        })?;
        debug!("Reading {} as {:?}", path.display(), format);

        let df = match format {
            FileFormat::Csv => read_delimited(path, b',')?,
            FileFormat::Tsv => read_delimited(path, b'\t')?,
            FileFormat::Json => JsonReader::new(File::open(path)?).finish()?,
            FileFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
            FileFormat::Spreadsheet => spreadsheet::read_first_sheet(path)?,
            FileFormat::Xml => xml::read_records(path)?,
        };

        if df.height() == 0 {
            return Err(CleaningError::NoRows(path.to_path_buf()));
        }

        info!("Loaded {} ({} rows)", path.display(), df.height());
        Ok(df)
    }
}

/// Read a delimited text file.
///
/// Type inference can trip on scraped columns whose first rows look numeric;
/// the fallback reads every column as text and lets the corrector coerce.
fn read_delimited(path: &Path, separator: u8) -> Result<DataFrame> {
    let read = |infer: Option<usize>| -> PolarsResult<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(infer)
            .with_parse_options(
                CsvParseOptions::default()
                    .with_separator(separator)
                    .with_quote_char(Some(b'"')),
            )
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
    };

    match read(Some(1000)) {
        Ok(df) => Ok(df),
        Err(e) => {
            debug!("Typed read failed ({}), retrying with text columns", e);
            Ok(read(Some(0))?)
        }
    }
}

/// Assemble a DataFrame of string columns from a header row and cells.
pub(crate) fn string_frame(
    headers: Vec<String>,
    columns: Vec<Vec<Option<String>>>,
) -> Result<DataFrame> {
    let columns: Vec<Column> = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Series::new(name.into(), values).into_column())
        .collect();
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path(Path::new("a.CSV")), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_path(Path::new("a.txt")), Some(FileFormat::Tsv));
        assert_eq!(
            FileFormat::from_path(Path::new("a.xlsx")),
            Some(FileFormat::Spreadsheet)
        );
        assert_eq!(FileFormat::from_path(Path::new("a.docx")), None);
        assert_eq!(FileFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_load_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "p.csv", "price,postCode\n300000,1000\n250000,1050\n");
        let df = Loader::load(&path);
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_load_tab_delimited_txt() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "p.txt", "price\tlocality\n1\tGENT\n");
        let df = Loader::load(&path);
        assert_eq!(df.height(), 1);
        assert!(df.column("locality").is_ok());
    }

    #[test]
    fn test_load_json_records() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "p.json",
            r#"[{"price": 1, "locality": "GENT"}, {"price": 2, "locality": "LIEGE"}]"#,
        );
        let df = Loader::load(&path);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let df = Loader::load("does/not/exist.csv");
        assert_eq!(df.height(), 0);
        assert!(matches!(
            Loader::try_load("does/not/exist.csv"),
            Err(CleaningError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_zero_byte_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.csv", "");
        assert_eq!(Loader::load(&path).height(), 0);
        assert!(matches!(
            Loader::try_load(&path),
            Err(CleaningError::EmptyFile(_))
        ));
    }

    #[test]
    fn test_unsupported_extension_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "p.docx", "whatever");
        assert_eq!(Loader::load(&path).height(), 0);
        assert!(matches!(
            Loader::try_load(&path),
            Err(CleaningError::UnsupportedFormat(ext)) if ext == ".docx"
        ));
    }

    #[test]
    fn test_header_only_csv_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "p.csv", "price,postCode\n");
        assert_eq!(Loader::load(&path).height(), 0);
    }

    #[test]
    fn test_load_parquet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.parquet");
        let mut df = df! {
            "price" => [300000.0, 250000.0, 199000.0],
            "locality" => ["GENT", "LIEGE", "NAMUR"],
        }
        .unwrap();
        ParquetWriter::new(File::create(&path).unwrap())
            .finish(&mut df)
            .unwrap();

        let loaded = Loader::try_load(&path).unwrap();
        assert_eq!(loaded.height(), 3);
        assert_eq!(loaded.get_column_names_str(), vec!["price", "locality"]);
        assert_eq!(
            loaded.column("locality").unwrap().as_materialized_series().str().unwrap().get(2),
            Some("NAMUR")
        );
    }

    #[test]
    fn test_load_workbook() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("properties.xlsx");
        let df = Loader::load(&path);
        assert_eq!(df.height(), 3);
        assert!(df.column("postCode").is_ok());
    }

    #[test]
    fn test_corrupt_parquet_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "p.parquet", "not parquet at all");
        assert_eq!(Loader::load(&path).height(), 0);
    }
}
