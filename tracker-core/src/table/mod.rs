//! Persisted project table.
//!
//! The file format is hidden behind [`ProjectTable`]: the store only ever
//! reads the whole table and writes the whole table back.
//!
//! ## File Layout
//!
//! ```text
//! Project Name,Owner,Status,Start Date,End Date,Deadline,Last Updated
//! Atlas,alice,In Progress,2026-10-01,,2026-11-01,2026-10-18
//! ```
//!
//! The same columns are used for `.xlsx` workbooks (first worksheet, header
//! in the first row) and for CSV files (any other extension). One row per
//! project, rows in collection order. Empty start/end cells mean "absent".
//! Date cells may carry `YYYY-MM-DD HH:MM:SS` timestamps, which load as
//! their date. Older five-column files without `Start Date`/`End Date` still
//! load. Columns the tracker does not know are carried on each record and
//! written back after the known ones.

mod csv_table;
mod xlsx_table;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::errors::StoreError;
use crate::project::{ProjectRecord, ProjectStatus};

pub use csv_table::CsvTable;
pub use xlsx_table::XlsxTable;

/// Column names of the persisted table, in file order.
pub const COLUMNS: [&str; 7] = [
    "Project Name",
    "Owner",
    "Status",
    "Start Date",
    "End Date",
    "Deadline",
    "Last Updated",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whole-table access to the persisted project collection.
pub trait ProjectTable {
    /// Read every record, in stored order.
    fn read_all(&self) -> Result<Vec<ProjectRecord>, StoreError>;

    /// Replace the stored table with `records`, preserving their order.
    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Cell grid shared by the file formats
// ─────────────────────────────────────────────────────────────────────────────

/// Header row and text cells of a table file, before typing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Position of each known column in a file's header row.
struct ColumnIndex {
    name: usize,
    owner: Option<usize>,
    status: usize,
    start_date: Option<usize>,
    end_date: Option<usize>,
    deadline: usize,
    last_updated: usize,
    extra: Vec<(usize, String)>,
}

impl ColumnIndex {
    fn locate(headers: &[String]) -> Result<Self, StoreError> {
        let find = |column: &str| headers.iter().position(|h| h.trim() == column);
        let require =
            |column: &'static str| find(column).ok_or(StoreError::MissingColumn(column));

        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !COLUMNS.contains(&h.trim()))
            .map(|(idx, h)| (idx, h.clone()))
            .collect();

        Ok(Self {
            name: require("Project Name")?,
            owner: find("Owner"),
            status: require("Status")?,
            start_date: find("Start Date"),
            end_date: find("End Date"),
            deadline: require("Deadline")?,
            last_updated: require("Last Updated")?,
            extra,
        })
    }

    /// `row` is the 1-based data row number (header excluded).
    fn record(&self, cells: &[String], row: usize) -> Result<ProjectRecord, StoreError> {
        let status_cell = cell(cells, self.status);
        let status = status_cell
            .parse::<ProjectStatus>()
            .map_err(|_| StoreError::InvalidCell {
                row,
                column: "Status",
                value: status_cell.to_string(),
            })?;

        Ok(ProjectRecord {
            name: cell(cells, self.name).to_string(),
            owner: optional_cell(cells, self.owner).to_string(),
            status,
            start_date: parse_optional_date(
                optional_cell(cells, self.start_date),
                row,
                "Start Date",
            )?,
            end_date: parse_optional_date(optional_cell(cells, self.end_date), row, "End Date")?,
            deadline: parse_date(cell(cells, self.deadline), row, "Deadline")?,
            last_updated: parse_date(cell(cells, self.last_updated), row, "Last Updated")?,
            extra: self
                .extra
                .iter()
                .map(|(idx, header)| (header.clone(), cell(cells, *idx).to_string()))
                .collect(),
        })
    }
}

fn cell(cells: &[String], idx: usize) -> &str {
    cells.get(idx).map_or("", String::as_str)
}

fn optional_cell(cells: &[String], idx: Option<usize>) -> &str {
    idx.map_or("", |idx| cell(cells, idx))
}

/// Type the rows of `sheet`. Blank rows are skipped; a sheet without any
/// header is an empty table.
fn decode(sheet: Sheet) -> Result<Vec<ProjectRecord>, StoreError> {
    if sheet.headers.iter().all(|h| h.trim().is_empty()) {
        return Ok(Vec::new());
    }
    let columns = ColumnIndex::locate(&sheet.headers)?;

    let mut records = Vec::with_capacity(sheet.rows.len());
    for (idx, cells) in sheet.rows.iter().enumerate() {
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        records.push(columns.record(cells, idx + 1)?);
    }
    Ok(records)
}

/// Headers of the unknown columns carried by `records`, in first-seen order.
fn extra_columns(records: &[ProjectRecord]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for (header, _) in records.iter().flat_map(|r| &r.extra) {
        if !headers.contains(header) {
            headers.push(header.clone());
        }
    }
    headers
}

fn extra_cell<'a>(record: &'a ProjectRecord, header: &str) -> &'a str {
    record
        .extra
        .iter()
        .find(|(h, _)| h == header)
        .map_or("", |(_, value)| value.as_str())
}

/// Text grid for `records`: the known columns, then any extra columns.
fn encode(records: &[ProjectRecord]) -> Sheet {
    let extra = extra_columns(records);

    let mut headers: Vec<String> = COLUMNS.iter().map(ToString::to_string).collect();
    headers.extend(extra.iter().cloned());

    let rows = records
        .iter()
        .map(|record| {
            let mut cells = vec![
                record.name.clone(),
                record.owner.clone(),
                record.status.label().to_string(),
                format_optional_date(record.start_date),
                format_optional_date(record.end_date),
                format_date(record.deadline),
                format_date(record.last_updated),
            ];
            cells.extend(extra.iter().map(|h| extra_cell(record, h).to_string()));
            cells
        })
        .collect();

    Sheet { headers, rows }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dates
// ─────────────────────────────────────────────────────────────────────────────

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}

/// Parse a date cell. Accepts plain dates and date-time stamps
/// (`2026-10-18 00:00:00`, `2026-10-18T00:00:00`), keeping the date part.
pub fn parse_date_cell(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if let Ok(date) = NaiveDate::parse_from_str(cell, DATE_FORMAT) {
        return Some(date);
    }
    let (date_part, rest) = (cell.get(..10)?, cell.get(10..)?);
    if rest.starts_with([' ', 'T']) {
        NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
    } else {
        None
    }
}

fn parse_date(cell: &str, row: usize, column: &'static str) -> Result<NaiveDate, StoreError> {
    parse_date_cell(cell).ok_or_else(|| StoreError::InvalidCell {
        row,
        column,
        value: cell.to_string(),
    })
}

fn parse_optional_date(
    cell: &str,
    row: usize,
    column: &'static str,
) -> Result<Option<NaiveDate>, StoreError> {
    if cell.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(cell, row, column).map(Some)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Files
// ─────────────────────────────────────────────────────────────────────────────

/// Atomically write `data` to `path` via a `.tmp` sibling.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Refuse an existing file unless `force`, and create parent directories.
fn prepare_new_file(path: &Path, force: bool) -> Result<(), StoreError> {
    if path.exists() && !force {
        return Err(StoreError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// On-disk format of a table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// `.xlsx` (any case) is a workbook; every other path is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => TableFormat::Xlsx,
            _ => TableFormat::Csv,
        }
    }
}

/// Table file whose format is picked from its extension.
#[derive(Debug, Clone)]
pub enum FileTable {
    Csv(CsvTable),
    Xlsx(XlsxTable),
}

impl FileTable {
    /// Table at `path`. The file is not touched until the first read/write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match TableFormat::from_path(&path) {
            TableFormat::Csv => FileTable::Csv(CsvTable::open(path)),
            TableFormat::Xlsx => FileTable::Xlsx(XlsxTable::open(path)),
        }
    }

    /// Write a header-only table at `path`, creating parent directories.
    ///
    /// Refuses to replace an existing file unless `force` is set.
    pub fn create_empty(path: impl Into<PathBuf>, force: bool) -> Result<Self, StoreError> {
        let path = path.into();
        Ok(match TableFormat::from_path(&path) {
            TableFormat::Csv => FileTable::Csv(CsvTable::create_empty(path, force)?),
            TableFormat::Xlsx => FileTable::Xlsx(XlsxTable::create_empty(path, force)?),
        })
    }

    pub fn format(&self) -> TableFormat {
        match self {
            FileTable::Csv(_) => TableFormat::Csv,
            FileTable::Xlsx(_) => TableFormat::Xlsx,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileTable::Csv(table) => table.path(),
            FileTable::Xlsx(table) => table.path(),
        }
    }
}

impl ProjectTable for FileTable {
    fn read_all(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        match self {
            FileTable::Csv(table) => table.read_all(),
            FileTable::Xlsx(table) => table.read_all(),
        }
    }

    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), StoreError> {
        match self {
            FileTable::Csv(table) => table.write_all(records),
            FileTable::Xlsx(table) => table.write_all(records),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory table
// ─────────────────────────────────────────────────────────────────────────────

/// Table kept in memory. Counts writes so callers can check that an
/// operation did or did not save.
#[derive(Debug, Default)]
pub struct MemoryTable {
    records: Vec<ProjectRecord>,
    writes: usize,
}

impl MemoryTable {
    pub fn new(records: Vec<ProjectRecord>) -> Self {
        Self { records, writes: 0 }
    }

    /// Number of `write_all` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn snapshot(&self) -> Vec<ProjectRecord> {
        self.records.clone()
    }
}

impl ProjectTable for MemoryTable {
    fn read_all(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        Ok(self.snapshot())
    }

    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), StoreError> {
        self.records = records.to_vec();
        self.writes += 1;
        Ok(())
    }
}
