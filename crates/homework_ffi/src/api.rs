//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the homework core operations to Dart via FRB.
//! - Serialize every call on one process-wide lock so that the tree and its
//!   persistence write are never touched by two host threads at once.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call reloads the stored tree, so Dart never sees stale state.

use homework_core::db::open_db;
use homework_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    reconcile_on_edit, AttachmentFile, EmptyState, HomeworkService, HomeworkStore, Importance,
    ServiceError, ServiceResult, SqliteKvStore, StatusFilter, StoreError, Task, TaskInput,
    VisibleSubject,
};
use log::warn;
use once_cell::sync::{Lazy, OnceCell};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tokio::runtime::Runtime;

const DEFAULT_DB_FILE_NAME: &str = "homework.sqlite3";
static DB_PATH: OnceCell<PathBuf> = OnceCell::new();
static CALL_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Sets the database file used by every later call.
///
/// # FFI contract
/// - Must be called before the first data call; later calls with a
///   different path are rejected.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    String::new()
}

/// One task row for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTaskItem {
    pub task_id: i64,
    pub name: String,
    /// Stored due date (`ไม่มี` when unset).
    pub due_date: String,
    /// `high|medium|low`.
    pub importance: String,
    pub completed: bool,
    pub image_count: u32,
    /// First attachment for the list thumbnail.
    pub preview_image: Option<String>,
}

/// One subject card for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySubjectItem {
    pub subject_id: i64,
    pub name: String,
    pub tasks: Vec<EntryTaskItem>,
}

/// Rendered view for one query/filter pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryViewResponse {
    pub subjects: Vec<EntrySubjectItem>,
    pub pending_count: u32,
    pub subject_count: u32,
    /// Set when nothing matched.
    pub empty_message: Option<String>,
    /// Diagnostics message; empty on success.
    pub message: String,
}

impl EntryViewResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            subjects: Vec::new(),
            pending_count: 0,
            subject_count: 0,
            empty_message: None,
            message: message.into(),
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    /// Whether the call completed without error.
    pub ok: bool,
    /// Whether the tree changed (false for no-ops).
    pub applied: bool,
    pub subject_id: Option<i64>,
    pub task_id: Option<i64>,
    pub message: String,
}

impl EntryActionResponse {
    fn applied(message: impl Into<String>, subject_id: Option<i64>, task_id: Option<i64>) -> Self {
        Self {
            ok: true,
            applied: true,
            subject_id,
            task_id,
            message: message.into(),
        }
    }

    fn skipped(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            applied: false,
            subject_id: None,
            task_id: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            applied: false,
            subject_id: None,
            task_id: None,
            message: message.into(),
        }
    }

    fn from_flag(result: Result<bool, String>, done: &str, skipped: &str) -> Self {
        match result {
            Ok(true) => Self::applied(done, None, None),
            Ok(false) => Self::skipped(skipped),
            Err(err) => Self::failure(err),
        }
    }
}

/// Computes the visible subjects for a search query and status tab.
///
/// `filter` is `all|pending|completed`; unknown values fall back to `all`.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_view(query: String, filter: String) -> EntryViewResponse {
    let status = StatusFilter::parse(&filter).unwrap_or_default();
    let result = with_service(|service| {
        let visible = service.compute_visible(&query, status);
        let summary = service.summary();
        Ok(EntryViewResponse {
            subjects: visible.displayed().map(to_subject_item).collect(),
            pending_count: to_u32(summary.pending_tasks),
            subject_count: to_u32(summary.subjects),
            empty_message: visible.empty_state().map(|state| empty_message(&state)),
            message: String::new(),
        })
    });
    result.unwrap_or_else(|err| EntryViewResponse::failure(format!("entry_view failed: {err}")))
}

/// Adds a task, creating the subject when the name is new.
///
/// Runs on a worker thread: attachment files are read before anything is
/// committed, and one unreadable file aborts the whole call.
pub fn entry_create_task(
    subject_name: String,
    task_name: String,
    due_date: String,
    importance: String,
    image_paths: Vec<String>,
) -> EntryActionResponse {
    let Some(importance) = Importance::parse(&importance) else {
        return EntryActionResponse::failure(format!("unknown importance `{importance}`"));
    };
    let input = TaskInput::new(task_name, due_date, importance);
    let files = to_attachment_files(image_paths);

    let result = with_service(|service| {
        block_on_runtime(service.create_task(&subject_name, &input, &files))?
    });
    match result {
        Ok(Some(created)) => EntryActionResponse::applied(
            "Task created.",
            Some(created.subject_id),
            Some(created.task.id),
        ),
        Ok(None) => EntryActionResponse::skipped("Task input is incomplete."),
        Err(err) => EntryActionResponse::failure(format!("entry_create_task failed: {err}")),
    }
}

/// Saves an edit form.
///
/// `removed_image_indices` are applied in order against the shrinking
/// working copy of the current images; new files are appended afterwards.
pub fn entry_update_task(
    subject_id: i64,
    task_id: i64,
    task_name: String,
    due_date: String,
    importance: String,
    removed_image_indices: Vec<u32>,
    image_paths: Vec<String>,
) -> EntryActionResponse {
    let Some(importance) = Importance::parse(&importance) else {
        return EntryActionResponse::failure(format!("unknown importance `{importance}`"));
    };
    let input = TaskInput::new(task_name, due_date, importance);
    let files = to_attachment_files(image_paths);
    let removed = removed_image_indices
        .into_iter()
        .map(|index| index as usize)
        .collect::<Vec<_>>();

    let result = with_service(|service| {
        let Some(current) = service.task_images(subject_id, task_id) else {
            return Ok(false);
        };
        let kept = reconcile_on_edit(current, &removed, Vec::new());
        block_on_runtime(service.update_task(subject_id, task_id, &input, kept, &files))?
    });
    match result {
        Ok(true) => EntryActionResponse::applied("Task updated.", Some(subject_id), Some(task_id)),
        Ok(false) => EntryActionResponse::skipped("Task not found or input incomplete."),
        Err(err) => EntryActionResponse::failure(format!("entry_update_task failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn entry_toggle_completed(subject_id: i64, task_id: i64, completed: bool) -> EntryActionResponse {
    let result = with_service(|service| service.toggle_completed(subject_id, task_id, completed));
    EntryActionResponse::from_flag(result, "Task updated.", "Task not found.")
}

/// Deletes a task; its subject goes too when it was the last task.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_delete_task(subject_id: i64, task_id: i64) -> EntryActionResponse {
    match with_service(|service| service.delete_task(subject_id, task_id)) {
        Ok(Some(deletion)) if deletion.subject_pruned => {
            EntryActionResponse::applied("Task and empty subject deleted.", None, None)
        }
        Ok(Some(_)) => EntryActionResponse::applied("Task deleted.", Some(subject_id), None),
        Ok(None) => EntryActionResponse::skipped("Subject not found."),
        Err(err) => EntryActionResponse::failure(format!("entry_delete_task failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn entry_rename_subject(subject_id: i64, new_name: String) -> EntryActionResponse {
    let result = with_service(|service| service.rename_subject(subject_id, &new_name));
    EntryActionResponse::from_flag(result, "Subject renamed.", "Subject name unchanged.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn entry_delete_subject(subject_id: i64) -> EntryActionResponse {
    let result = with_service(|service| service.delete_subject(subject_id));
    EntryActionResponse::from_flag(result, "Subject deleted.", "Subject not found.")
}

/// Full attachment list of one task, for the image viewer.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_task_images(subject_id: i64, task_id: i64) -> Vec<String> {
    with_service(|service| {
        Ok(service
            .task_images(subject_id, task_id)
            .map(<[String]>::to_vec)
            .unwrap_or_default())
    })
    .unwrap_or_default()
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
        .clone()
}

fn lock_calls() -> MutexGuard<'static, ()> {
    CALL_LOCK.lock().unwrap_or_else(|poisoned| {
        warn!("event=ffi_lock module=ffi status=error error_code=lock_poisoned recovered=true");
        poisoned.into_inner()
    })
}

fn with_service<T>(
    f: impl FnOnce(&mut HomeworkService<SqliteKvStore<'_>>) -> ServiceResult<T>,
) -> Result<T, String> {
    let _guard = lock_calls();
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let kv = SqliteKvStore::try_new(&conn).map_err(|err| format!("store init failed: {err}"))?;
    let mut service =
        HomeworkService::open(HomeworkStore::new(kv)).map_err(|err| err.to_string())?;
    f(&mut service).map_err(|err| err.to_string())
}

/// Drives an attachment-bearing future to completion on the shared runtime.
fn block_on_runtime<F: std::future::Future>(future: F) -> ServiceResult<F::Output> {
    let runtime = RUNTIME.get_or_try_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
    });
    match runtime {
        Ok(runtime) => Ok(runtime.block_on(future)),
        Err(err) => Err(ServiceError::Store(StoreError::Unavailable(format!(
            "async runtime unavailable: {err}"
        )))),
    }
}

fn to_attachment_files(paths: Vec<String>) -> Vec<Option<AttachmentFile>> {
    paths
        .into_iter()
        .map(|path| {
            let trimmed = path.trim();
            (!trimmed.is_empty()).then(|| AttachmentFile::new(trimmed))
        })
        .collect()
}

fn to_subject_item(subject: &VisibleSubject) -> EntrySubjectItem {
    EntrySubjectItem {
        subject_id: subject.id,
        name: subject.name.clone(),
        tasks: subject.tasks.iter().map(to_task_item).collect(),
    }
}

fn to_task_item(task: &Task) -> EntryTaskItem {
    EntryTaskItem {
        task_id: task.id,
        name: task.name.clone(),
        due_date: task.due_date.as_stored().to_string(),
        importance: task.importance.as_str().to_string(),
        completed: task.completed,
        image_count: to_u32(task.images.len()),
        preview_image: task.images.first().cloned(),
    }
}

fn empty_message(state: &EmptyState) -> String {
    match state {
        EmptyState::NoMatches { query, filter } => {
            format!("No tasks match '{query}' in '{}'.", filter.as_str())
        }
        EmptyState::NoTasks { filter } => format!("No tasks in '{}'.", filter.as_str()),
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
