//! In-memory subject/task repository.
//!
//! # Responsibility
//! - Own the homework tree and apply CRUD mutations to it.
//! - Generate subject/task ids that never collide with existing ones.
//!
//! # Invariants
//! - Lookup misses are reported as `None`/`false`, never as errors.
//! - Task deletion is two steps: `remove_task`, then `prune_if_empty`.
//! - Subjects keep insertion order; tasks keep insertion order.

use crate::model::homework::{HomeworkData, Subject, SubjectId, Task, TaskFields, TaskId};
use std::time::{SystemTime, UNIX_EPOCH};

/// Monotonic id source seeded from wall-clock milliseconds.
///
/// Every id is `max(now_ms, last + 1)`, so ids keep the timestamp shape of
/// older records while staying unique under bulk creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Starts above every id already present in `data`.
    pub fn seeded_from(data: &HomeworkData) -> Self {
        Self {
            last: data.max_id().unwrap_or(0),
        }
    }

    pub fn next_id(&mut self) -> i64 {
        let next = now_epoch_ms().max(self.last.saturating_add(1));
        self.last = next;
        next
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Borrowed result of a task lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLookup<'a> {
    pub subject: &'a Subject,
    pub task: &'a Task,
}

/// Result of `create_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTask {
    pub subject_id: SubjectId,
    /// Whether a new subject was appended to hold the task.
    pub subject_created: bool,
    pub task: Task,
}

/// Result of `delete_task` when the subject exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDeletion {
    pub task_removed: bool,
    pub subject_pruned: bool,
}

/// Owner of the in-memory homework tree.
#[derive(Debug, Clone)]
pub struct HomeworkRepository {
    data: HomeworkData,
    ids: IdGenerator,
}

impl HomeworkRepository {
    pub fn new(data: HomeworkData) -> Self {
        let ids = IdGenerator::seeded_from(&data);
        Self { data, ids }
    }

    pub fn data(&self) -> &HomeworkData {
        &self.data
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.data.subjects
    }

    pub fn find_subject(&self, subject_id: SubjectId) -> Option<&Subject> {
        self.data
            .subjects
            .iter()
            .find(|subject| subject.id == subject_id)
    }

    /// Exact, case-sensitive name match.
    pub fn find_subject_by_name(&self, name: &str) -> Option<&Subject> {
        self.data
            .subjects
            .iter()
            .find(|subject| subject.name == name)
    }

    pub fn find_task(&self, subject_id: SubjectId, task_id: TaskId) -> Option<TaskLookup<'_>> {
        let subject = self.find_subject(subject_id)?;
        let task = subject.task(task_id)?;
        Some(TaskLookup { subject, task })
    }

    fn subject_mut(&mut self, subject_id: SubjectId) -> Option<&mut Subject> {
        self.data
            .subjects
            .iter_mut()
            .find(|subject| subject.id == subject_id)
    }

    fn task_mut(&mut self, subject_id: SubjectId, task_id: TaskId) -> Option<&mut Task> {
        self.subject_mut(subject_id)?
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id)
    }

    /// Appends a task to the subject named `subject_name`, creating the
    /// subject when no exact match exists.
    ///
    /// `subject_name` is expected to be normalized already.
    pub fn create_task(
        &mut self,
        subject_name: &str,
        fields: TaskFields,
        images: Vec<String>,
    ) -> CreatedTask {
        let task = Task::new(self.ids.next_id(), fields, images);

        let existing = self
            .data
            .subjects
            .iter()
            .position(|subject| subject.name == subject_name);
        let (index, subject_created) = match existing {
            Some(index) => (index, false),
            None => {
                let subject = Subject::new(self.ids.next_id(), subject_name);
                self.data.subjects.push(subject);
                (self.data.subjects.len() - 1, true)
            }
        };

        let subject = &mut self.data.subjects[index];
        subject.tasks.push(task.clone());
        CreatedTask {
            subject_id: subject.id,
            subject_created,
            task,
        }
    }

    /// Replaces name, due date, importance and images of an existing task.
    pub fn update_task(
        &mut self,
        subject_id: SubjectId,
        task_id: TaskId,
        fields: TaskFields,
        images: Vec<String>,
    ) -> bool {
        match self.task_mut(subject_id, task_id) {
            Some(task) => {
                task.apply(fields, images);
                true
            }
            None => false,
        }
    }

    pub fn set_completed(&mut self, subject_id: SubjectId, task_id: TaskId, value: bool) -> bool {
        match self.task_mut(subject_id, task_id) {
            Some(task) => {
                task.completed = value;
                true
            }
            None => false,
        }
    }

    /// Removes one task from its subject without touching the subject list.
    pub fn remove_task(&mut self, subject_id: SubjectId, task_id: TaskId) -> Option<Task> {
        let subject = self.subject_mut(subject_id)?;
        let index = subject.tasks.iter().position(|task| task.id == task_id)?;
        Some(subject.tasks.remove(index))
    }

    /// Drops the subject when it has no tasks left.
    pub fn prune_if_empty(&mut self, subject_id: SubjectId) -> bool {
        let Some(index) = self
            .data
            .subjects
            .iter()
            .position(|subject| subject.id == subject_id)
        else {
            return false;
        };
        if !self.data.subjects[index].tasks.is_empty() {
            return false;
        }
        self.data.subjects.remove(index);
        true
    }

    /// Deletes a task and prunes its subject if that emptied it.
    ///
    /// Returns `None` when the subject does not exist.
    pub fn delete_task(&mut self, subject_id: SubjectId, task_id: TaskId) -> Option<TaskDeletion> {
        self.find_subject(subject_id)?;
        let task_removed = self.remove_task(subject_id, task_id).is_some();
        let subject_pruned = self.prune_if_empty(subject_id);
        Some(TaskDeletion {
            task_removed,
            subject_pruned,
        })
    }

    /// Renames a subject; blank or unchanged names are ignored.
    pub fn rename_subject(&mut self, subject_id: SubjectId, new_name: &str) -> bool {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return false;
        }
        match self.subject_mut(subject_id) {
            Some(subject) if subject.name != trimmed => {
                subject.name = trimmed.to_string();
                true
            }
            _ => false,
        }
    }

    /// Removes a subject together with all of its tasks.
    pub fn delete_subject(&mut self, subject_id: SubjectId) -> Option<Subject> {
        let index = self
            .data
            .subjects
            .iter()
            .position(|subject| subject.id == subject_id)?;
        Some(self.data.subjects.remove(index))
    }

    /// Attachments of one task, for the image viewer.
    pub fn task_images(&self, subject_id: SubjectId, task_id: TaskId) -> Option<&[String]> {
        self.find_task(subject_id, task_id)
            .map(|lookup| lookup.task.images.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::{HomeworkRepository, IdGenerator};
    use crate::model::homework::{HomeworkData, Importance, Subject, TaskFields, TaskInput};

    fn fields(name: &str) -> TaskFields {
        TaskInput::new(name, "", Importance::Medium)
            .normalize()
            .unwrap()
    }

    #[test]
    fn id_generator_is_strictly_increasing() {
        let mut ids = IdGenerator::seeded_from(&HomeworkData::default());
        let first = ids.next_id();
        let second = ids.next_id();
        let third = ids.next_id();
        assert!(first < second && second < third);
    }

    #[test]
    fn id_generator_starts_above_future_ids() {
        let data = HomeworkData {
            subjects: vec![Subject::new(i64::MAX - 10, "Future")],
        };
        let mut ids = IdGenerator::seeded_from(&data);
        assert_eq!(ids.next_id(), i64::MAX - 9);
    }

    #[test]
    fn prune_if_empty_keeps_non_empty_subject() {
        let mut repo = HomeworkRepository::new(HomeworkData::default());
        let created = repo.create_task("Math", fields("a"), Vec::new());
        assert!(!repo.prune_if_empty(created.subject_id));
        assert!(repo.find_subject(created.subject_id).is_some());
    }

    #[test]
    fn remove_task_does_not_prune() {
        let mut repo = HomeworkRepository::new(HomeworkData::default());
        let created = repo.create_task("Math", fields("a"), Vec::new());
        let removed = repo.remove_task(created.subject_id, created.task.id).unwrap();
        assert_eq!(removed.id, created.task.id);
        assert!(repo.find_subject(created.subject_id).unwrap().tasks.is_empty());
        assert!(repo.prune_if_empty(created.subject_id));
        assert!(repo.subjects().is_empty());
    }

    #[test]
    fn subject_and_task_ids_are_distinct() {
        let mut repo = HomeworkRepository::new(HomeworkData::default());
        let created = repo.create_task("Math", fields("a"), Vec::new());
        assert!(created.subject_created);
        assert_ne!(created.subject_id, created.task.id);
    }
}
