//! Homework use-case service.
//!
//! # Responsibility
//! - Provide the collaborator-facing mutation and read API.
//! - Persist the full tree after every applied mutation.
//! - Encode new attachments before touching the tree.
//!
//! # Invariants
//! - Lookup misses and validation failures are no-ops (`None`/`false`), and
//!   nothing is saved for them.
//! - A failed attachment read leaves memory and storage untouched.
//! - A failed save restores the pre-mutation tree, so memory always equals
//!   the last successfully stored tree.

use crate::attachment::encode::{encode_attachments, AttachmentError, AttachmentFile};
use crate::model::homework::{
    normalize_subject_name, HomeworkData, SubjectId, TaskFields, TaskId, TaskInput,
    TaskValidationError,
};
use crate::repo::homework_repo::{CreatedTask, HomeworkRepository, TaskDeletion, TaskLookup};
use crate::search::filter::{compute_visible, StatusFilter, VisibleSet};
use crate::search::summary::{summarize, HomeworkSummary};
use crate::service::edit_session::TaskEditSession;
use crate::store::homework_store::HomeworkStore;
use crate::store::{KeyValueStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level failure. Validation and lookup misses are not errors.
#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    Attachment(AttachmentError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Attachment(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Attachment(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<AttachmentError> for ServiceError {
    fn from(value: AttachmentError) -> Self {
        Self::Attachment(value)
    }
}

/// Owned homework tree plus its persistence handle.
pub struct HomeworkService<S: KeyValueStore> {
    store: HomeworkStore<S>,
    repo: HomeworkRepository,
}

impl<S: KeyValueStore> HomeworkService<S> {
    /// Loads the stored tree (empty when absent).
    pub fn open(store: HomeworkStore<S>) -> ServiceResult<Self> {
        let data = store.load()?;
        Ok(Self {
            store,
            repo: HomeworkRepository::new(data),
        })
    }

    pub fn data(&self) -> &HomeworkData {
        self.repo.data()
    }

    pub fn store(&self) -> &HomeworkStore<S> {
        &self.store
    }

    /// Replaces the in-memory tree with the stored one.
    pub fn reload(&mut self) -> ServiceResult<()> {
        let data = self.store.load()?;
        self.repo = HomeworkRepository::new(data);
        Ok(())
    }

    /// Writes the current tree.
    pub fn save(&self) -> ServiceResult<()> {
        self.store.save(self.repo.data())?;
        Ok(())
    }

    pub fn find_task(&self, subject_id: SubjectId, task_id: TaskId) -> Option<TaskLookup<'_>> {
        self.repo.find_task(subject_id, task_id)
    }

    pub fn task_images(&self, subject_id: SubjectId, task_id: TaskId) -> Option<&[String]> {
        self.repo.task_images(subject_id, task_id)
    }

    pub fn compute_visible(&self, query: &str, filter: StatusFilter) -> VisibleSet {
        compute_visible(self.repo.subjects(), query, filter)
    }

    pub fn summary(&self) -> HomeworkSummary {
        summarize(self.repo.subjects())
    }

    /// Creates a task, encoding `files` first.
    ///
    /// Returns `Ok(None)` when the input is invalid.
    ///
    /// # Errors
    /// - `ServiceError::Attachment` when any file cannot be read; nothing is
    ///   created or saved.
    /// - `ServiceError::Store` when the save fails; the tree is rolled back.
    pub async fn create_task(
        &mut self,
        subject_name: &str,
        input: &TaskInput,
        files: &[Option<AttachmentFile>],
    ) -> ServiceResult<Option<CreatedTask>> {
        let Some((subject_name, fields)) = validate_create(subject_name, input) else {
            return Ok(None);
        };
        let images = encode_attachments(files).await?;
        self.commit("task_create", |repo| {
            Some(repo.create_task(&subject_name, fields, images))
        })
    }

    /// Creates a task from already-encoded images.
    pub fn create_task_with_images(
        &mut self,
        subject_name: &str,
        input: &TaskInput,
        images: Vec<String>,
    ) -> ServiceResult<Option<CreatedTask>> {
        let Some((subject_name, fields)) = validate_create(subject_name, input) else {
            return Ok(None);
        };
        self.commit("task_create", |repo| {
            Some(repo.create_task(&subject_name, fields, images))
        })
    }

    /// Opens an edit form for an existing task.
    pub fn begin_edit(&self, subject_id: SubjectId, task_id: TaskId) -> Option<TaskEditSession> {
        self.repo
            .find_task(subject_id, task_id)
            .map(|lookup| TaskEditSession::open(lookup.subject.id, lookup.task))
    }

    /// Commits an edit session; new files are appended after the surviving
    /// images.
    ///
    /// Returns `Ok(false)` when the task vanished or the input is invalid.
    pub async fn commit_edit(
        &mut self,
        session: TaskEditSession,
        files: &[Option<AttachmentFile>],
    ) -> ServiceResult<bool> {
        let subject_id = session.subject_id();
        let task_id = session.task_id();
        let input = session.input();
        let kept = session.images.images().to_vec();
        self.update_task(subject_id, task_id, &input, kept, files)
            .await
    }

    /// Updates a task with `kept_images` followed by the encoded `files`.
    ///
    /// Returns `Ok(false)` when the task is missing or the input is invalid.
    pub async fn update_task(
        &mut self,
        subject_id: SubjectId,
        task_id: TaskId,
        input: &TaskInput,
        kept_images: Vec<String>,
        files: &[Option<AttachmentFile>],
    ) -> ServiceResult<bool> {
        if self.repo.find_task(subject_id, task_id).is_none() {
            log_skip("task_update", "not_found");
            return Ok(false);
        }
        let Some(fields) = validate_fields("task_update", input) else {
            return Ok(false);
        };
        let mut images = kept_images;
        images.extend(encode_attachments(files).await?);
        self.apply_update(subject_id, task_id, fields, images)
    }

    /// Updates a task with a final, already-encoded image list.
    pub fn update_task_with_images(
        &mut self,
        subject_id: SubjectId,
        task_id: TaskId,
        input: &TaskInput,
        images: Vec<String>,
    ) -> ServiceResult<bool> {
        let Some(fields) = validate_fields("task_update", input) else {
            return Ok(false);
        };
        self.apply_update(subject_id, task_id, fields, images)
    }

    fn apply_update(
        &mut self,
        subject_id: SubjectId,
        task_id: TaskId,
        fields: TaskFields,
        images: Vec<String>,
    ) -> ServiceResult<bool> {
        let applied = self.commit("task_update", |repo| {
            repo.update_task(subject_id, task_id, fields, images)
                .then_some(())
        })?;
        Ok(applied.is_some())
    }

    pub fn toggle_completed(
        &mut self,
        subject_id: SubjectId,
        task_id: TaskId,
        value: bool,
    ) -> ServiceResult<bool> {
        let applied = self.commit("task_toggle", |repo| {
            repo.set_completed(subject_id, task_id, value).then_some(())
        })?;
        Ok(applied.is_some())
    }

    /// Deletes a task and prunes its subject when emptied.
    ///
    /// Returns `Ok(None)` when the subject does not exist.
    pub fn delete_task(
        &mut self,
        subject_id: SubjectId,
        task_id: TaskId,
    ) -> ServiceResult<Option<TaskDeletion>> {
        self.commit("task_delete", |repo| repo.delete_task(subject_id, task_id))
    }

    pub fn rename_subject(&mut self, subject_id: SubjectId, new_name: &str) -> ServiceResult<bool> {
        let applied = self.commit("subject_rename", |repo| {
            repo.rename_subject(subject_id, new_name).then_some(())
        })?;
        Ok(applied.is_some())
    }

    /// Removes a subject and every task in it.
    pub fn delete_subject(&mut self, subject_id: SubjectId) -> ServiceResult<bool> {
        let removed = self.commit("subject_delete", |repo| repo.delete_subject(subject_id))?;
        Ok(removed.is_some())
    }

    /// Runs `mutate` on a snapshot-protected tree and saves when it applied.
    fn commit<T>(
        &mut self,
        event: &str,
        mutate: impl FnOnce(&mut HomeworkRepository) -> Option<T>,
    ) -> ServiceResult<Option<T>> {
        let snapshot = self.repo.clone();
        let Some(outcome) = mutate(&mut self.repo) else {
            log_skip(event, "not_applied");
            return Ok(None);
        };

        if let Err(err) = self.store.save(self.repo.data()) {
            self.repo = snapshot;
            warn!("event={event} module=service status=error error_code=save_failed rolled_back=true");
            return Err(err.into());
        }

        info!(
            "event={event} module=service status=ok subjects={}",
            self.repo.subjects().len()
        );
        Ok(Some(outcome))
    }
}

fn validate_create(subject_name: &str, input: &TaskInput) -> Option<(String, TaskFields)> {
    let subject_name = match normalize_subject_name(subject_name) {
        Ok(name) => name,
        Err(err) => {
            log_validation_skip("task_create", &err);
            return None;
        }
    };
    let fields = validate_fields("task_create", input)?;
    Some((subject_name, fields))
}

fn validate_fields(event: &str, input: &TaskInput) -> Option<TaskFields> {
    match input.normalize() {
        Ok(fields) => Some(fields),
        Err(err) => {
            log_validation_skip(event, &err);
            None
        }
    }
}

fn log_validation_skip(event: &str, err: &TaskValidationError) {
    let reason = match err {
        TaskValidationError::EmptyTaskName => "empty_task_name",
        TaskValidationError::EmptySubjectName => "empty_subject_name",
        TaskValidationError::InvalidDueDate(_) => "invalid_due_date",
    };
    log_skip(event, reason);
}

fn log_skip(event: &str, reason: &str) {
    info!("event={event} module=service status=skip reason={reason}");
}
