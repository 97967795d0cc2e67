//! Record store: add / update-status / delete over a [`ProjectTable`].
//!
//! Every mutation reloads the entire table, changes the in-memory copy and
//! rewrites the entire table. Lookups match `name` exactly and act on every
//! matching record, so duplicate names are updated or deleted together.

use chrono::NaiveDate;

use crate::clock::{Clock, SystemClock};
use crate::errors::StoreError;
use crate::project::{NewProject, ProjectRecord, ProjectStatus};
use crate::table::ProjectTable;

/// Result of a name-keyed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The mutation hit this many records and the table was saved.
    Applied(usize),
    /// No record had the name. Nothing was written.
    NotFound,
}

impl Outcome {
    pub fn is_found(self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

pub struct ProjectStore<T, C = SystemClock> {
    table: T,
    clock: C,
}

impl<T: ProjectTable> ProjectStore<T, SystemClock> {
    pub fn new(table: T) -> Self {
        Self::with_clock(table, SystemClock)
    }
}

impl<T: ProjectTable, C: Clock> ProjectStore<T, C> {
    pub fn with_clock(table: T, clock: C) -> Self {
        Self { table, clock }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Read the whole table.
    pub fn load(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        self.table.read_all()
    }

    /// Overwrite the whole table with `records`, in order.
    pub fn save(&mut self, records: &[ProjectRecord]) -> Result<(), StoreError> {
        self.table.write_all(records)
    }

    /// Validate and append a project stamped with today's date.
    ///
    /// Duplicate names are accepted.
    pub fn add(&mut self, project: NewProject) -> Result<ProjectRecord, StoreError> {
        project.validate()?;

        let mut records = self.load()?;
        let record = project.into_record(self.today());
        records.push(record.clone());
        self.save(&records)?;

        tracing::info!(
            name = %record.name,
            owner = %record.owner,
            status = %record.status,
            "project added"
        );
        Ok(record)
    }

    /// Set `status` on every record named `name` and stamp today's date.
    pub fn update_status(
        &mut self,
        name: &str,
        status: ProjectStatus,
    ) -> Result<Outcome, StoreError> {
        let mut records = self.load()?;
        let today = self.today();

        let mut matched = 0;
        for record in records.iter_mut().filter(|r| r.name == name) {
            record.status = status;
            record.last_updated = today;
            matched += 1;
        }

        if matched == 0 {
            tracing::info!(name, "status update: project not found");
            return Ok(Outcome::NotFound);
        }

        self.save(&records)?;
        tracing::info!(name, %status, matched, "project status updated");
        Ok(Outcome::Applied(matched))
    }

    /// Remove every record named `name`.
    pub fn delete(&mut self, name: &str) -> Result<Outcome, StoreError> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.name != name);
        let removed = before - records.len();

        if removed == 0 {
            tracing::info!(name, "delete: project not found");
            return Ok(Outcome::NotFound);
        }

        self.save(&records)?;
        tracing::info!(name, removed, "project deleted");
        Ok(Outcome::Applied(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::errors::ValidationError;
    use crate::table::{CsvTable, MemoryTable};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2026, 10, 18)
    }

    fn record(name: &str, owner: &str, status: ProjectStatus) -> ProjectRecord {
        ProjectRecord {
            name: name.to_string(),
            owner: owner.to_string(),
            status,
            start_date: None,
            end_date: None,
            deadline: date(2026, 11, 1),
            last_updated: date(2026, 9, 1),
            extra: Vec::new(),
        }
    }

    fn seeded_store() -> ProjectStore<MemoryTable, FixedClock> {
        let table = MemoryTable::new(vec![
            record("Atlas", "alice", ProjectStatus::NotStarted),
            record("Beacon", "bob", ProjectStatus::InProgress),
            record("Atlas", "carol", ProjectStatus::Completed),
        ]);
        ProjectStore::with_clock(table, FixedClock(today()))
    }

    #[test]
    fn add_appends_one_record_stamped_today() {
        let mut store = seeded_store();
        let before = store.load().unwrap().len();

        let added = store
            .add(NewProject::new("Comet", "dave", date(2026, 12, 1)))
            .unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), before + 1);
        assert_eq!(records.last(), Some(&added));
        assert_eq!(added.last_updated, today());
    }

    #[test]
    fn add_accepts_duplicate_names() {
        let mut store = seeded_store();
        store
            .add(NewProject::new("Beacon", "erin", date(2026, 12, 1)))
            .unwrap();
        let beacons = store
            .load()
            .unwrap()
            .into_iter()
            .filter(|r| r.name == "Beacon")
            .count();
        assert_eq!(beacons, 2);
    }

    #[test]
    fn add_rejects_missing_fields_without_writing() {
        let mut store = seeded_store();
        let err = store
            .add(NewProject::new("Comet", " ", date(2026, 12, 1)))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::MissingField("Owner"))
        ));
        assert_eq!(store.table().writes(), 0);
        assert_eq!(store.load().unwrap().len(), 3);
    }

    #[test]
    fn update_status_touches_only_matching_records() {
        let mut store = seeded_store();
        let before = store.load().unwrap();

        let outcome = store
            .update_status("Beacon", ProjectStatus::Completed)
            .unwrap();
        assert_eq!(outcome, Outcome::Applied(1));

        let after = store.load().unwrap();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
        assert_eq!(
            after[1],
            ProjectRecord {
                status: ProjectStatus::Completed,
                last_updated: today(),
                ..before[1].clone()
            }
        );
    }

    #[test]
    fn update_status_applies_to_every_duplicate() {
        let mut store = seeded_store();
        let outcome = store
            .update_status("Atlas", ProjectStatus::InProgress)
            .unwrap();
        assert_eq!(outcome, Outcome::Applied(2));

        let statuses: Vec<ProjectStatus> = store
            .load()
            .unwrap()
            .into_iter()
            .filter(|r| r.name == "Atlas")
            .map(|r| r.status)
            .collect();
        assert_eq!(
            statuses,
            vec![ProjectStatus::InProgress, ProjectStatus::InProgress]
        );
    }

    #[test]
    fn update_status_missing_name_changes_nothing() {
        let mut store = seeded_store();
        let before = store.load().unwrap();

        let outcome = store
            .update_status("atlas", ProjectStatus::Completed)
            .unwrap();
        assert_eq!(outcome, Outcome::NotFound);
        assert!(!outcome.is_found());
        assert_eq!(store.load().unwrap(), before);
        assert_eq!(store.table().writes(), 0);
    }

    #[test]
    fn delete_removes_all_matches_and_nothing_else() {
        let mut store = seeded_store();
        let outcome = store.delete("Atlas").unwrap();
        assert_eq!(outcome, Outcome::Applied(2));
        assert_eq!(
            store.load().unwrap(),
            vec![record("Beacon", "bob", ProjectStatus::InProgress)]
        );
    }

    #[test]
    fn delete_missing_name_changes_nothing() {
        let mut store = seeded_store();
        let before = store.load().unwrap();
        assert_eq!(store.delete("Nova").unwrap(), Outcome::NotFound);
        assert_eq!(store.load().unwrap(), before);
        assert_eq!(store.table().writes(), 0);
    }

    #[test]
    fn save_of_load_is_identity_on_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("projects.csv");
        let table = CsvTable::create_empty(&path, false).unwrap();
        let mut store = ProjectStore::with_clock(table, FixedClock(today()));
        store
            .add(NewProject::new("Atlas", "alice", date(2026, 11, 1)))
            .unwrap();
        store
            .add(
                NewProject::new("Beacon", "bob", date(2026, 10, 20))
                    .with_status(ProjectStatus::InProgress)
                    .with_dates(Some(date(2026, 10, 1)), Some(date(2026, 10, 25))),
            )
            .unwrap();

        let bytes_before = std::fs::read(&path).unwrap();
        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), bytes_before);
        assert_eq!(store.load().unwrap(), loaded);
    }

    #[test]
    fn status_update_keeps_unrecognised_columns() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("projects.csv");
        std::fs::write(
            &path,
            "Project Name,Owner,Status,Start Date,End Date,Deadline,Last Updated,Notes\n\
             Atlas,alice,Not Started,,,2026-11-01,2026-10-01,keep me\n",
        )
        .unwrap();

        let mut store = ProjectStore::with_clock(CsvTable::open(&path), FixedClock(today()));
        let outcome = store
            .update_status("Atlas", ProjectStatus::Completed)
            .unwrap();
        assert_eq!(outcome, Outcome::Applied(1));
        store
            .add(NewProject::new("Beacon", "bob", date(2026, 12, 1)))
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "Project Name,Owner,Status,Start Date,End Date,Deadline,Last Updated,Notes",
                "Atlas,alice,Completed,,,2026-11-01,2026-10-18,keep me",
                "Beacon,bob,Not Started,,,2026-12-01,2026-10-18,",
            ]
        );
    }

    #[test]
    fn load_propagates_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = ProjectStore::new(CsvTable::open(tmp.path().join("absent.csv")));
        assert!(matches!(store.load(), Err(StoreError::Io(_))));
        assert!(matches!(store.delete("Atlas"), Err(StoreError::Io(_))));
    }
}
