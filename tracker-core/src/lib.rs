//! `tracker-core`: project table store and query/aggregation layer.
//!
//! The tracker keeps one flat table of projects on disk. Every mutating
//! operation is a full load → mutate → rewrite cycle over that table:
//!
//! - [`table`]: the persisted table behind the [`table::ProjectTable`] trait
//!   (`.xlsx` workbook or CSV file, or in-memory for tests)
//! - [`store`]: add / update-status / delete over a table
//! - [`query`]: filters, days-left, highlight policy and aggregates
//! - [`config`]: `tracker.toml` loading and data-file resolution
//!
//! There is no locking: two writers racing on the same file lose updates
//! (last writer wins). The tool is single-user.

pub mod clock;
pub mod config;
pub mod errors;
pub mod project;
pub mod query;
pub mod store;
pub mod table;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::TrackerConfig;
pub use errors::{ConfigError, StoreError, ValidationError};
pub use project::{NewProject, ProjectRecord, ProjectStatus};
pub use query::{Analytics, Highlight, ProjectFilter, ProjectRow};
pub use store::{Outcome, ProjectStore};
pub use table::{
    COLUMNS, CsvTable, FileTable, MemoryTable, ProjectTable, TableFormat, XlsxTable,
};
