//! Core domain logic for the homework tracker.
//! This crate is the single source of truth for subject/task invariants.

pub mod attachment;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use attachment::edit::{reconcile_on_edit, ImageEditSession};
pub use attachment::encode::{
    encode_attachments, encode_data_url, AttachmentError, AttachmentFile, AttachmentResult,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::homework::{
    DueDate, HomeworkData, Importance, Subject, SubjectId, Task, TaskFields, TaskId, TaskInput,
    TaskValidationError, NO_DUE_DATE,
};
pub use repo::homework_repo::{
    CreatedTask, HomeworkRepository, IdGenerator, TaskDeletion, TaskLookup,
};
pub use search::filter::{
    compute_visible, EmptyState, StatusFilter, VisibleSet, VisibleSubject,
};
pub use search::summary::{summarize, HomeworkSummary};
pub use service::edit_session::TaskEditSession;
pub use service::homework_service::{HomeworkService, ServiceError, ServiceResult};
pub use store::homework_store::{HomeworkStore, DEFAULT_STORAGE_KEY};
pub use store::sqlite_kv::SqliteKvStore;
pub use store::{KeyValueStore, MemoryKvStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
