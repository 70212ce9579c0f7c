//! Edit-form state for one task.

use crate::attachment::edit::ImageEditSession;
use crate::model::homework::{Importance, SubjectId, Task, TaskId, TaskInput};

/// Prefilled, uncommitted edit of an existing task.
///
/// Dropping the session is the cancel path: nothing is written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEditSession {
    subject_id: SubjectId,
    task_id: TaskId,
    pub name: String,
    /// Date-input text (`""` when the task has no due date).
    pub due_date: String,
    pub importance: Importance,
    pub images: ImageEditSession,
}

impl TaskEditSession {
    pub fn open(subject_id: SubjectId, task: &Task) -> Self {
        Self {
            subject_id,
            task_id: task.id,
            name: task.name.clone(),
            due_date: task.due_date.as_input().to_string(),
            importance: task.importance,
            images: ImageEditSession::new(&task.images),
        }
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn input(&self) -> TaskInput {
        TaskInput::new(self.name.clone(), self.due_date.clone(), self.importance)
    }
}
