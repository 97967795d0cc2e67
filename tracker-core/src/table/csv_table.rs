//! CSV file table.

use std::path::{Path, PathBuf};

use super::{ProjectTable, Sheet, atomic_write, decode, encode, prepare_new_file};
use crate::errors::StoreError;
use crate::project::ProjectRecord;

/// CSV file holding the project table.
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
}

impl CsvTable {
    /// Table at `path`. The file is not touched until the first read/write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write a header-only table at `path`, creating parent directories.
    ///
    /// Refuses to replace an existing file unless `force` is set.
    pub fn create_empty(path: impl Into<PathBuf>, force: bool) -> Result<Self, StoreError> {
        let mut table = Self::open(path);
        prepare_new_file(&table.path, force)?;
        table.write_all(&[])?;
        Ok(table)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectTable for CsvTable {
    fn read_all(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let file = std::fs::File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for row in reader.records() {
            rows.push(row?.iter().map(str::to_string).collect());
        }

        let records = decode(Sheet { headers, rows })?;
        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "loaded project table"
        );
        Ok(records)
    }

    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), StoreError> {
        let sheet = encode(records);
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&sheet.headers)?;
        for row in &sheet.rows {
            writer.write_record(row)?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| StoreError::Io(e.into_error()))?;

        atomic_write(&self.path, &data)?;
        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "saved project table"
        );
        Ok(())
    }
}
