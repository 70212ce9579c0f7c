//! Subject/task domain model.
//!
//! # Responsibility
//! - Define `Subject`, `Task` and the root `HomeworkData` record.
//! - Normalize raw form input into validated task fields.
//!
//! # Invariants
//! - `Task::name` is non-empty after trimming for every task created or
//!   updated through `TaskInput::normalize`.
//! - `DueDate::Unset` is persisted as the `ไม่มี` sentinel string.
//! - Ids are plain `i64` values and are compared strictly.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of a subject.
pub type SubjectId = i64;

/// Stable identifier of a task.
pub type TaskId = i64;

/// Persisted sentinel for "no due date".
pub const NO_DUE_DATE: &str = "ไม่มี";

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})$")
        .expect("valid date regex")
});

/// Task severity level.
///
/// Serialized with the labels used by the stored record; English names are
/// accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Importance {
    #[serde(rename = "มาก", alias = "high")]
    High,
    #[serde(rename = "ปานกลาง", alias = "medium")]
    Medium,
    #[serde(rename = "น้อย", alias = "low")]
    Low,
}

impl Importance {
    /// Returns the persisted label.
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "มาก",
            Self::Medium => "ปานกลาง",
            Self::Low => "น้อย",
        }
    }

    /// Returns the stable English name (`high|medium|low`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parses either the persisted label or the English name.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "high" => return Some(Self::High),
            "medium" => return Some(Self::Medium),
            "low" => return Some(Self::Low),
            _ => {}
        }
        [Self::High, Self::Medium, Self::Low]
            .into_iter()
            .find(|level| level.label() == trimmed)
    }
}

/// Task due date: either unset or a date string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DueDate {
    #[default]
    Unset,
    On(String),
}

impl DueDate {
    /// Normalizes date-input text.
    ///
    /// Blank input maps to `Unset`; anything else must be `YYYY-MM-DD`.
    pub fn from_input(raw: &str) -> Result<Self, TaskValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::Unset);
        }
        if !is_calendar_date(trimmed) {
            return Err(TaskValidationError::InvalidDueDate(trimmed.to_string()));
        }
        Ok(Self::On(trimmed.to_string()))
    }

    /// Returns the value for a date input field (`""` when unset).
    pub fn as_input(&self) -> &str {
        match self {
            Self::Unset => "",
            Self::On(value) => value.as_str(),
        }
    }

    /// Returns the persisted/display form (sentinel when unset).
    pub fn as_stored(&self) -> &str {
        match self {
            Self::Unset => NO_DUE_DATE,
            Self::On(value) => value.as_str(),
        }
    }

}

/// ASCII `YYYY-MM-DD` naming a day that exists in the Gregorian calendar.
fn is_calendar_date(value: &str) -> bool {
    let Some(caps) = ISO_DATE_RE.captures(value) else {
        return false;
    };
    let field = |name: &str| caps[name].parse::<u32>().ok();
    let (Some(year), Some(month), Some(day)) = (field("year"), field("month"), field("day")) else {
        return false;
    };
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days_in_month).contains(&day)
}

impl From<String> for DueDate {
    fn from(value: String) -> Self {
        if value.is_empty() || value == NO_DUE_DATE {
            Self::Unset
        } else {
            Self::On(value)
        }
    }
}

impl From<DueDate> for String {
    fn from(value: DueDate) -> Self {
        match value {
            DueDate::Unset => NO_DUE_DATE.to_string(),
            DueDate::On(date) => date,
        }
    }
}

/// One unit of homework owned by a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub due_date: DueDate,
    pub importance: Importance,
    #[serde(default)]
    pub completed: bool,
    /// Data-URL encoded attachments, in display order.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Task {
    /// Creates a pending task from normalized fields.
    pub fn new(id: TaskId, fields: TaskFields, images: Vec<String>) -> Self {
        Self {
            id,
            name: fields.name,
            due_date: fields.due_date,
            importance: fields.importance,
            completed: false,
            images,
        }
    }

    /// Replaces editable fields; `id` and `completed` are untouched.
    pub fn apply(&mut self, fields: TaskFields, images: Vec<String>) {
        self.name = fields.name;
        self.due_date = fields.due_date;
        self.importance = fields.importance;
        self.images = images;
    }
}

/// Named group of tasks (for example one school course).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Subject {
    pub fn new(id: SubjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }
}

/// Root persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HomeworkData {
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl HomeworkData {
    /// Largest subject or task id present, if any.
    pub fn max_id(&self) -> Option<i64> {
        self.subjects
            .iter()
            .flat_map(|subject| {
                std::iter::once(subject.id).chain(subject.tasks.iter().map(|task| task.id))
            })
            .max()
    }
}

/// Raw task form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub name: String,
    /// Date-input text; blank means no due date.
    pub due_date: String,
    pub importance: Importance,
}

impl TaskInput {
    pub fn new(name: impl Into<String>, due_date: impl Into<String>, importance: Importance) -> Self {
        Self {
            name: name.into(),
            due_date: due_date.into(),
            importance,
        }
    }

    /// Trims and validates the form input.
    pub fn normalize(&self) -> Result<TaskFields, TaskValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TaskValidationError::EmptyTaskName);
        }
        Ok(TaskFields {
            name: name.to_string(),
            due_date: DueDate::from_input(&self.due_date)?,
            importance: self.importance,
        })
    }
}

/// Validated editable task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub name: String,
    pub due_date: DueDate,
    pub importance: Importance,
}

/// Trims a subject name, rejecting blank values.
pub fn normalize_subject_name(raw: &str) -> Result<String, TaskValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptySubjectName);
    }
    Ok(trimmed.to_string())
}

/// Input rejected before any mutation happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTaskName,
    EmptySubjectName,
    InvalidDueDate(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTaskName => write!(f, "task name must not be blank"),
            Self::EmptySubjectName => write!(f, "subject name must not be blank"),
            Self::InvalidDueDate(value) => {
                write!(f, "due date `{value}` is not a YYYY-MM-DD date")
            }
        }
    }
}

impl Error for TaskValidationError {}
