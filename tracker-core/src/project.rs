//! Project records and the add-form payload.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Lifecycle status of a project.
///
/// Ordered by progress, which keeps aggregate output stable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProjectStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::NotStarted,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
    ];

    /// Label used in the persisted table and in output.
    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProjectStatus {
    type Err = ValidationError;

    /// Accepts the table labels plus snake/kebab spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "notstarted" => Ok(ProjectStatus::NotStarted),
            "inprogress" => Ok(ProjectStatus::InProgress),
            "completed" | "done" => Ok(ProjectStatus::Completed),
            _ => Err(ValidationError::InvalidStatus(s.to_string())),
        }
    }
}

/// One row of the project table.
///
/// `name` is the lookup key. Uniqueness is assumed by lookups but never
/// enforced on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRecord {
    pub name: String,
    pub owner: String,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub deadline: NaiveDate,
    pub last_updated: NaiveDate,
    /// Cells of columns the tracker does not manage, as `(header, value)` in
    /// file order. Kept so a save writes them back untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, String)>,
}

/// Input for adding a project. `last_updated` is stamped by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub owner: String,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub deadline: NaiveDate,
}

impl NewProject {
    pub fn new(name: impl Into<String>, owner: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            status: ProjectStatus::NotStarted,
            start_date: None,
            end_date: None,
            deadline,
        }
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Name and owner must be non-blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("Project Name"));
        }
        if self.owner.trim().is_empty() {
            return Err(ValidationError::MissingField("Owner"));
        }
        Ok(())
    }

    pub(crate) fn into_record(self, today: NaiveDate) -> ProjectRecord {
        ProjectRecord {
            name: self.name,
            owner: self.owner,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            deadline: self.deadline,
            last_updated: today,
            extra: Vec::new(),
        }
    }
}
