use homework_core::{
    compute_visible, HomeworkService, HomeworkStore, Importance, MemoryKvStore, StatusFilter,
    Subject, Task, TaskInput,
};

fn task(id: i64, name: &str, completed: bool) -> Task {
    let fields = TaskInput::new(name, "", Importance::Medium)
        .normalize()
        .unwrap();
    let mut task = Task::new(id, fields, Vec::new());
    task.completed = completed;
    task
}

fn sample_tree() -> Vec<Subject> {
    vec![
        Subject {
            id: 1,
            name: "Math".to_string(),
            tasks: vec![task(11, "A", false), task(12, "B", true)],
        },
        Subject {
            id: 2,
            name: "English".to_string(),
            tasks: vec![task(21, "Math vocabulary", false), task(22, "Essay", true)],
        },
        Subject {
            id: 3,
            name: "Empty club".to_string(),
            tasks: Vec::new(),
        },
    ]
}

fn task_ids(subject: &homework_core::VisibleSubject) -> Vec<i64> {
    subject.tasks.iter().map(|task| task.id).collect()
}

#[test]
fn empty_query_with_all_returns_everything_in_order() {
    let tree = sample_tree();
    let visible = compute_visible(&tree, "", StatusFilter::All);

    let subject_ids = visible
        .subjects()
        .iter()
        .map(|subject| subject.id)
        .collect::<Vec<_>>();
    assert_eq!(subject_ids, vec![1, 2, 3]);
    for (visible_subject, source) in visible.subjects().iter().zip(&tree) {
        assert_eq!(visible_subject.tasks, source.tasks);
    }
    assert_eq!(visible.displayed().count(), 3);
}

#[test]
fn subject_match_and_pending_filter_compose() {
    let tree = vec![Subject {
        id: 1,
        name: "Math".to_string(),
        tasks: vec![task(11, "A", false), task(12, "B", true)],
    }];
    let visible = compute_visible(&tree, "math", StatusFilter::Pending);

    assert_eq!(visible.subjects().len(), 1);
    assert_eq!(visible.subjects()[0].name, "Math");
    assert_eq!(task_ids(&visible.subjects()[0]), vec![11]);
}

#[test]
fn query_matches_subject_names_and_task_names() {
    let tree = sample_tree();
    let visible = compute_visible(&tree, "  MATH ", StatusFilter::All);

    assert_eq!(visible.subjects().len(), 2);
    assert_eq!(task_ids(&visible.subjects()[0]), vec![11, 12]);
    assert!(visible.subjects()[0].name_matched);
    assert_eq!(task_ids(&visible.subjects()[1]), vec![21]);
    assert!(!visible.subjects()[1].name_matched);
}

#[test]
fn completed_filter_keeps_only_completed_tasks() {
    let tree = sample_tree();
    let visible = compute_visible(&tree, "", StatusFilter::Completed);

    assert_eq!(visible.subjects().len(), 3);
    assert_eq!(task_ids(&visible.subjects()[0]), vec![12]);
    assert_eq!(task_ids(&visible.subjects()[1]), vec![22]);
    let displayed = visible
        .displayed()
        .map(|subject| subject.id)
        .collect::<Vec<_>>();
    assert_eq!(displayed, vec![1, 2]);
}

#[test]
fn name_matched_empty_subject_is_hidden_under_a_query() {
    let tree = sample_tree();
    let visible = compute_visible(&tree, "club", StatusFilter::All);

    assert_eq!(visible.subjects().len(), 1);
    assert!(visible.subjects()[0].name_matched);
    assert_eq!(visible.displayed().count(), 0);
}

#[test]
fn compute_visible_does_not_mutate_source() {
    let tree = sample_tree();
    let before = tree.clone();
    let mut visible = compute_visible(&tree, "essay", StatusFilter::Pending).into_subjects();
    for subject in &mut visible {
        subject.tasks.clear();
    }
    assert_eq!(tree, before);
}

#[test]
fn service_recomputes_after_mutation() {
    let kv = MemoryKvStore::new();
    let mut service = HomeworkService::open(HomeworkStore::new(&kv)).unwrap();
    let created = service
        .create_task_with_images(
            "Math",
            &TaskInput::new("A", "", Importance::High),
            Vec::new(),
        )
        .unwrap()
        .unwrap();

    assert_eq!(
        service
            .compute_visible("", StatusFilter::Pending)
            .subjects()
            .len(),
        1
    );
    service
        .toggle_completed(created.subject_id, created.task.id, true)
        .unwrap();
    let pending = service.compute_visible("", StatusFilter::Pending);
    assert_eq!(pending.subjects()[0].tasks.len(), 0);
    assert_eq!(pending.displayed().count(), 0);
}
