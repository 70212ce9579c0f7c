use homework_core::{
    encode_attachments, reconcile_on_edit, AttachmentError, AttachmentFile, HomeworkService,
    HomeworkStore, Importance, KeyValueStore, MemoryKvStore, ServiceError, TaskInput,
    DEFAULT_STORAGE_KEY,
};
use std::path::PathBuf;

fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn encodes_files_in_input_order_and_skips_absent_entries() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_file(&dir, "first.png", b"one");
    let second = write_file(&dir, "second.gif", b"two");

    let encoded = encode_attachments(&[
        Some(AttachmentFile::new(&first)),
        None,
        Some(AttachmentFile::new(&second)),
    ])
    .await
    .unwrap();

    assert_eq!(
        encoded,
        vec![
            "data:image/png;base64,b25l".to_string(),
            "data:image/gif;base64,dHdv".to_string(),
        ]
    );
}

#[tokio::test]
async fn one_unreadable_file_fails_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let readable = write_file(&dir, "ok.png", b"ok");
    let missing = dir.path().join("missing.png");

    let err = encode_attachments(&[
        Some(AttachmentFile::new(&missing)),
        Some(AttachmentFile::new(&readable)),
    ])
    .await
    .unwrap_err();

    let AttachmentError::Read { path, .. } = err;
    assert_eq!(path, missing);
}

#[tokio::test]
async fn create_with_unreadable_attachment_commits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let readable = write_file(&dir, "ok.png", b"ok");
    let missing = dir.path().join("missing.png");

    let kv = MemoryKvStore::new();
    let mut service = HomeworkService::open(HomeworkStore::new(&kv)).unwrap();
    let err = service
        .create_task(
            "Math",
            &TaskInput::new("A", "", Importance::High),
            &[
                Some(AttachmentFile::new(&missing)),
                Some(AttachmentFile::new(&readable)),
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Attachment(_)));
    assert!(service.data().subjects.is_empty());
    assert_eq!(kv.get(DEFAULT_STORAGE_KEY).unwrap(), None);
}

#[tokio::test]
async fn update_with_unreadable_attachment_leaves_task_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png");

    let kv = MemoryKvStore::new();
    let mut service = HomeworkService::open(HomeworkStore::new(&kv)).unwrap();
    let created = service
        .create_task(
            "Math",
            &TaskInput::new("A", "", Importance::High),
            &[],
        )
        .await
        .unwrap()
        .unwrap();
    let stored_before = kv.get(DEFAULT_STORAGE_KEY).unwrap();
    let tree_before = service.data().clone();

    let err = service
        .update_task(
            created.subject_id,
            created.task.id,
            &TaskInput::new("B", "", Importance::Low),
            Vec::new(),
            &[Some(AttachmentFile::new(&missing))],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Attachment(_)));
    assert_eq!(service.data(), &tree_before);
    assert_eq!(kv.get(DEFAULT_STORAGE_KEY).unwrap(), stored_before);
}

#[tokio::test]
async fn edit_session_keeps_survivors_then_appends_new_images() {
    let dir = tempfile::tempdir().unwrap();
    let added = write_file(&dir, "img3.png", b"3");

    let kv = MemoryKvStore::new();
    let mut service = HomeworkService::open(HomeworkStore::new(&kv)).unwrap();
    let created = service
        .create_task_with_images(
            "Math",
            &TaskInput::new("A", "2026-10-20", Importance::High),
            vec!["img0".to_string(), "img1".to_string(), "img2".to_string()],
        )
        .unwrap()
        .unwrap();

    let mut session = service
        .begin_edit(created.subject_id, created.task.id)
        .unwrap();
    assert_eq!(session.due_date, "2026-10-20");
    session.images.remove(1);
    session.name = "A revised".to_string();

    let committed_images = &service
        .find_task(created.subject_id, created.task.id)
        .unwrap()
        .task
        .images;
    assert_eq!(committed_images.len(), 3);

    let applied = service
        .commit_edit(session, &[Some(AttachmentFile::new(&added))])
        .await
        .unwrap();
    assert!(applied);

    let task = service
        .find_task(created.subject_id, created.task.id)
        .unwrap()
        .task;
    assert_eq!(task.name, "A revised");
    assert_eq!(
        task.images,
        vec![
            "img0".to_string(),
            "img2".to_string(),
            "data:image/png;base64,Mw==".to_string(),
        ]
    );
}

#[tokio::test]
async fn cancelled_edit_session_changes_nothing() {
    let kv = MemoryKvStore::new();
    let mut service = HomeworkService::open(HomeworkStore::new(&kv)).unwrap();
    let created = service
        .create_task_with_images(
            "Math",
            &TaskInput::new("A", "", Importance::High),
            vec!["img0".to_string()],
        )
        .unwrap()
        .unwrap();
    let before = service.data().clone();

    let mut session = service
        .begin_edit(created.subject_id, created.task.id)
        .unwrap();
    session.images.remove(0);
    drop(session);

    assert_eq!(service.data(), &before);
}

#[test]
fn reconcile_matches_repeated_positional_deletes() {
    let existing = vec!["img0".to_string(), "img1".to_string(), "img2".to_string()];
    assert_eq!(
        reconcile_on_edit(&existing, &[1], vec!["img3".to_string()]),
        vec!["img0", "img2", "img3"]
    );
    assert_eq!(
        reconcile_on_edit(&existing, &[1, 1], vec!["img3".to_string()]),
        vec!["img0", "img3"]
    );
}
