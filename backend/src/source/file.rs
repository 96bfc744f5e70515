//! File-backed record source (JSON array or CSV export).

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::checksum::calculate_checksum;
use super::error::{ErrorContext, SourceError, SourceResult};
use super::ingest::{ingest_json_bytes, ingest_rows};
use super::RecordSource;
use crate::io::read_csv_rows;
use crate::models::Dataset;

/// On-disk format of a flight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
}

impl FileFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                SourceError::configuration(format!(
                    "File {} has no extension",
                    path.display()
                ))
            })?;

        match extension.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(SourceError::configuration(format!(
                "Unsupported file format: {}",
                other
            ))),
        }
    }
}

/// Reads the whole flight table from a local file on every fetch.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: FileFormat,
}

impl FileSource {
    /// Create a source, auto-detecting JSON or CSV from the extension.
    pub fn new(path: impl Into<PathBuf>) -> SourceResult<Self> {
        let path = path.into();
        let format = FileFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }
}

#[async_trait]
impl RecordSource for FileSource {
    async fn fetch(&self) -> SourceResult<Dataset> {
        let source = self.describe();
        let payload = tokio::fs::read(&self.path).await.map_err(|e| {
            let message = format!("Failed to read {}: {}", self.path.display(), e);
            let context = ErrorContext::new("read_file").with_source(source.clone());
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::unavailable_with_context(message, context)
            } else {
                SourceError::io_with_context(message, context)
            }
        })?;

        match self.format {
            FileFormat::Json => ingest_json_bytes(&payload, &source),
            FileFormat::Csv => {
                let rows = read_csv_rows(&payload).map_err(|e| {
                    SourceError::parse_with_context(
                        format!("{:#}", e),
                        ErrorContext::new("decode_csv").with_source(source.clone()),
                    )
                })?;
                Ok(ingest_rows(rows, &source)?.with_checksum(calculate_checksum(&payload)))
            }
        }
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(suffix).unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            FileFormat::from_path(Path::new("flights.JSON")).unwrap(),
            FileFormat::Json
        );
        assert_eq!(
            FileFormat::from_path(Path::new("flights.csv")).unwrap(),
            FileFormat::Csv
        );
        assert!(FileFormat::from_path(Path::new("flights.txt")).is_err());
        assert!(FileFormat::from_path(Path::new("flights")).is_err());
    }

    #[tokio::test]
    async fn test_fetch_json_file() {
        let file = temp_file(
            ".json",
            r#"[{"FlightDate": "2024-01-05", "Airline": "AA", "Origin": "JFK", "Dest": "LAX", "ArrDelay": 4}]"#,
        );
        let source = FileSource::new(file.path()).unwrap();
        assert_eq!(source.format(), FileFormat::Json);
        let dataset = source.fetch().await.unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0].arr_delay, Some(4.0));
        assert!(dataset.source.starts_with("file://"));
    }

    #[tokio::test]
    async fn test_fetch_csv_file() {
        let file = temp_file(
            ".csv",
            "FlightDate,Airline,Origin,Dest,ArrDelay,Cancelled\n2024-01-05,AA,JFK,LAX,12.5,0\n2024-01-06,BB,ORD,ATL,,1\n",
        );
        let source = FileSource::new(file.path()).unwrap();
        let dataset = source.fetch().await.unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].arr_delay, Some(12.5));
        assert_eq!(dataset.records[1].arr_delay, None);
        assert!(dataset.records[1].cancelled);
        assert!(dataset.schema.is_missing("Diverted"));
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let source = FileSource::new("/nonexistent/flights.json").unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.json");
        std::fs::create_dir(&path).unwrap();

        let err = FileSource::new(&path).unwrap().fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::IoError { .. }));
        assert!(!err.is_unavailable());
        assert_eq!(err.context().operation.as_deref(), Some("read_file"));
    }
}
