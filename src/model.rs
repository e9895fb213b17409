//! Board data model: tasks, columns and the board itself.
//!
//! The serialized form is a JSON array of column records with camelCase keys,
//! which is what the persistence slot holds.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{Error, Result};

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Local date-time shapes accepted from older slots; only the date is kept.
const DEADLINE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Titles and ids of the seed columns, in board order.
pub const DEFAULT_COLUMNS: [(&str, &str); 3] = [("1", "To Do"), ("2", "In Progress"), ("3", "Done")];

/// Generate a fresh opaque identifier for a task or column.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A task due date.
///
/// Stored as `YYYY-MM-DD`. Parsing also accepts RFC 3339 timestamps and local
/// date-times without an offset, keeping only their calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(NaiveDate);

impl FromStr for Deadline {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DEADLINE_FORMAT) {
            return Ok(Self(date));
        }
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(timestamp.date_naive()));
        }
        if let Some(local) = DEADLINE_DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        {
            return Ok(Self(local.date()));
        }
        Err(Error::InvalidInput(format!(
            "deadline: invalid date '{trimmed}' (expected YYYY-MM-DD)"
        )))
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DEADLINE_FORMAT))
    }
}

impl Serialize for Deadline {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Deadline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A unit of work owned by exactly one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deadline: Deadline,
    pub column: String,
    #[serde(default)]
    pub favorite: bool,
    /// Attachment as a `data:` URL, or bare base64 from older slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Everything a new task needs except its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub name: String,
    pub description: Option<String>,
    pub deadline: Deadline,
    pub column: String,
    pub favorite: bool,
    pub image: Option<String>,
}

impl TaskInput {
    pub fn new(name: impl Into<String>, deadline: Deadline, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deadline,
            column: column.into(),
            favorite: false,
            image: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    /// Turn the input into a task with a freshly generated id.
    pub fn into_task(self) -> Task {
        Task {
            id: new_id(),
            name: self.name,
            description: self.description,
            deadline: self.deadline,
            column: self.column,
            favorite: self.favorite,
            image: self.image,
        }
    }
}

/// A named, ordered bucket of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub is_default: bool,
}

impl Column {
    /// A user-created, deletable column with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            tasks: Vec::new(),
            is_default: false,
        }
    }

    fn seed(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            tasks: Vec::new(),
            is_default: true,
        }
    }

    pub fn task_position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == task_id)
    }
}

/// A task whose `column` field disagrees with the column that holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityViolation {
    pub task_id: String,
    pub recorded_column: String,
    pub owner_column: String,
}

/// The full ordered collection of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    pub columns: Vec<Column>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS
                .iter()
                .map(|(id, title)| Column::seed(id, title))
                .collect(),
        }
    }
}

impl Board {
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    pub(crate) fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.id == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.id == column_id)
    }

    /// Locate a task; returns `(column index, task index)`.
    pub fn locate_task(&self, task_id: &str) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(col_idx, column)| column.task_position(task_id).map(|idx| (col_idx, idx)))
    }

    /// The task and the column that holds it.
    pub fn find_task(&self, task_id: &str) -> Option<(&Task, &Column)> {
        let (col_idx, task_idx) = self.locate_task(task_id)?;
        let column = &self.columns[col_idx];
        Some((&column.tasks[task_idx], column))
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|column| column.tasks.len()).sum()
    }

    /// Tasks whose `column` field does not name their owning column.
    pub fn check_integrity(&self) -> Vec<IntegrityViolation> {
        self.columns
            .iter()
            .flat_map(|column| {
                column
                    .tasks
                    .iter()
                    .filter(move |task| task.column != column.id)
                    .map(move |task| IntegrityViolation {
                        task_id: task.id.clone(),
                        recorded_column: task.column.clone(),
                        owner_column: column.id.clone(),
                    })
            })
            .collect()
    }

    /// Rewrite every task's `column` to its owner's id. Returns how many changed.
    pub fn repair_integrity(&mut self) -> usize {
        let mut repaired = 0;
        for column in &mut self.columns {
            for task in &mut column.tasks {
                if task.column != column.id {
                    task.column = column.id.clone();
                    repaired += 1;
                }
            }
        }
        repaired
    }

    /// Drop every task whose id already appeared earlier on the board,
    /// scanning columns in order. Returns how many were dropped.
    pub fn dedupe_tasks(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut dropped = 0;
        for column in &mut self.columns {
            let before = column.tasks.len();
            column.tasks.retain(|task| seen.insert(task.id.clone()));
            dropped += before - column.tasks.len();
        }
        dropped
    }
}
