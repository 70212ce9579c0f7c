//! Query + status filter over nested subjects/tasks.
//!
//! # Responsibility
//! - Select matching subjects and tasks for one query/filter pair.
//! - Expose which of them the view should actually display.
//!
//! # Invariants
//! - Subject order and task order follow the source tree.
//! - Output owns copies of the selected tasks; the source is read-only.
//! - A zero-task subject is displayed only for an empty query with `All`.

use crate::model::homework::{Subject, SubjectId, Task};
use serde::{Deserialize, Serialize};

/// Completion-state filter selected by the view tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parses `all|pending|completed` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn accepts(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// One subject selected by `compute_visible`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleSubject {
    pub id: SubjectId,
    pub name: String,
    /// Whether the subject name itself matched the query.
    pub name_matched: bool,
    pub tasks: Vec<Task>,
}

/// Why nothing is listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyState {
    /// No subject matched the active query under `filter`; `query` is the
    /// text as typed.
    NoMatches { query: String, filter: StatusFilter },
    /// No query; nothing exists under `filter`.
    NoTasks { filter: StatusFilter },
}

/// Result of one filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleSet {
    raw_query: String,
    query: String,
    filter: StatusFilter,
    subjects: Vec<VisibleSubject>,
}

impl VisibleSet {
    /// Normalized (trimmed, lowercased) query used for matching.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Query text exactly as the caller passed it.
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    /// Every selected subject, including name-only matches with no tasks.
    pub fn subjects(&self) -> &[VisibleSubject] {
        &self.subjects
    }

    pub fn into_subjects(self) -> Vec<VisibleSubject> {
        self.subjects
    }

    /// Whether query and filter are both at their defaults.
    pub fn is_unfiltered(&self) -> bool {
        self.query.is_empty() && self.filter == StatusFilter::All
    }

    /// Subjects the view should render.
    pub fn displayed(&self) -> impl Iterator<Item = &VisibleSubject> + '_ {
        let show_empty = self.is_unfiltered();
        self.subjects
            .iter()
            .filter(move |subject| show_empty || !subject.tasks.is_empty())
    }

    /// Set only when no subject was selected at all.
    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.subjects.is_empty() {
            return None;
        }
        if self.query.is_empty() {
            Some(EmptyState::NoTasks {
                filter: self.filter,
            })
        } else {
            Some(EmptyState::NoMatches {
                query: self.raw_query.clone(),
                filter: self.filter,
            })
        }
    }
}

/// Case-insensitive, trimmed query form.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Selects subjects/tasks matching `query` under `filter`.
///
/// A task is kept when its name or its subject's name contains the query
/// and its completion state passes `filter`. A subject is kept when it has
/// kept tasks or its name matched.
pub fn compute_visible(subjects: &[Subject], raw_query: &str, filter: StatusFilter) -> VisibleSet {
    let query = normalize_query(raw_query);

    let visible = subjects
        .iter()
        .filter_map(|subject| {
            let name_matched = subject.name.to_lowercase().contains(&query);
            let tasks = subject
                .tasks
                .iter()
                .filter(|task| {
                    (name_matched || task.name.to_lowercase().contains(&query))
                        && filter.accepts(task)
                })
                .cloned()
                .collect::<Vec<_>>();

            (name_matched || !tasks.is_empty()).then(|| VisibleSubject {
                id: subject.id,
                name: subject.name.clone(),
                name_matched,
                tasks,
            })
        })
        .collect();

    VisibleSet {
        raw_query: raw_query.to_string(),
        query,
        filter,
        subjects: visible,
    }
}
