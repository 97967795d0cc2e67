//! Excel workbook table: the project sheet is the first worksheet.
//!
//! Reading goes through `calamine`, writing through `rust_xlsxwriter`.
//! Dates are written as real date cells formatted `yyyy-mm-dd`; every other
//! cell is written as text.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};

use super::{
    COLUMNS, DATE_FORMAT, ProjectTable, Sheet, atomic_write, decode, extra_cell, extra_columns,
    prepare_new_file,
};
use crate::errors::StoreError;
use crate::project::ProjectRecord;

/// `.xlsx` workbook holding the project table.
#[derive(Debug, Clone)]
pub struct XlsxTable {
    path: PathBuf,
}

impl XlsxTable {
    /// Table at `path`. The file is not touched until the first read/write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write a header-only workbook at `path`, creating parent directories.
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

/// Text of a worksheet cell. Date cells become `YYYY-MM-DD`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(value) => value.as_datetime().map_or_else(
            || value.as_f64().to_string(),
            |dt| dt.date().format(DATE_FORMAT).to_string(),
        ),
        other => other.to_string(),
    }
}

fn row_index(idx: usize) -> u32 {
    // Out-of-range indices are rejected by the writer.
    u32::try_from(idx).unwrap_or(u32::MAX)
}

fn column_index(idx: usize) -> u16 {
    u16::try_from(idx).unwrap_or(u16::MAX)
}

impl ProjectTable for XlsxTable {
    fn read_all(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let file = BufReader::new(std::fs::File::open(&self.path)?);
        let mut workbook: Xlsx<_> = Xlsx::new(file)?;

        let sheet = match workbook.worksheet_range_at(0) {
            Some(range) => {
                let range = range?;
                let mut rows = range
                    .rows()
                    .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
                let headers = rows.next().unwrap_or_default();
                Sheet {
                    headers,
                    rows: rows.collect(),
                }
            }
            None => Sheet::default(),
        };

        let records = decode(sheet)?;
        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "loaded project workbook"
        );
        Ok(records)
    }

    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), StoreError> {
        let extra = extra_columns(records);
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let headers = COLUMNS
            .iter()
            .copied()
            .chain(extra.iter().map(String::as_str));
        for (col, header) in headers.enumerate() {
            worksheet.write_string(0, column_index(col), header)?;
        }

        for (idx, record) in records.iter().enumerate() {
            let row = row_index(idx + 1);
            worksheet.write_string(row, 0, &record.name)?;
            worksheet.write_string(row, 1, &record.owner)?;
            worksheet.write_string(row, 2, record.status.label())?;
            if let Some(start) = &record.start_date {
                worksheet.write_datetime_with_format(row, 3, start, &date_format)?;
            }
            if let Some(end) = &record.end_date {
                worksheet.write_datetime_with_format(row, 4, end, &date_format)?;
            }
            worksheet.write_datetime_with_format(row, 5, &record.deadline, &date_format)?;
            worksheet.write_datetime_with_format(row, 6, &record.last_updated, &date_format)?;

            for (offset, header) in extra.iter().enumerate() {
                let value = extra_cell(record, header);
                if !value.is_empty() {
                    worksheet.write_string(row, column_index(COLUMNS.len() + offset), value)?;
                }
            }
        }

        let data = workbook.save_to_buffer()?;
        atomic_write(&self.path, &data)?;
        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "saved project workbook"
        );
        Ok(())
    }
}
