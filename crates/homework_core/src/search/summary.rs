//! Header counters shown above the subject list.

use crate::model::homework::Subject;

/// Counts over the full (unfiltered) tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HomeworkSummary {
    pub pending_tasks: usize,
    pub subjects: usize,
}

pub fn summarize(subjects: &[Subject]) -> HomeworkSummary {
    HomeworkSummary {
        pending_tasks: subjects.iter().map(Subject::pending_count).sum(),
        subjects: subjects.len(),
    }
}
